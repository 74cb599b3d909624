//! Single source of truth for ALL filesystem layout the tool touches.
//!
//! This module defines WHERE things live. It has no I/O, no validation,
//! no business logic. One file shows the entire layout.
//!
//! # Machine-Level Paths
//!
//! ```text
//! ~/Library/Application Support/io.puma.dev/cert.pem   # puma-dev CA cert
//! ~/Library/Keychains/login.keychain-db                # keychain candidates,
//! ~/Library/Keychains/login.keychain                   #   in priority order
//! ~/.ssh/pumadev.pem                                   # combined CA bundle
//! ~/.puma-dev/<domain>                                 # per-app proxy link
//! /usr/local/etc/openssl/cert.pem                      # OS root cert
//! ```
//!
//! # Project-Level Paths
//!
//! ```text
//! project/.env                                         # app environment file
//! project/.powrc                                       # per-project shell rc
//! ```

use std::env;
use std::path::{Path, PathBuf};

/// OS root certificate bundle the combined cert is built from.
pub const BASE_CERT: &str = "/usr/local/etc/openssl/cert.pem";

/// Default chruby init script, overridable through `CHRUBY_PATH`.
pub const DEFAULT_CHRUBY: &str = "/usr/local/opt/chruby/share/chruby/chruby.sh";

/// Puma-dev CA certificate: `~/Library/Application Support/io.puma.dev/cert.pem`
pub fn cert(home: &Path) -> PathBuf {
    home.join("Library/Application Support/io.puma.dev/cert.pem")
}

/// Combined CA bundle written by the tool: `~/.ssh/pumadev.pem`
pub fn combined_cert(home: &Path) -> PathBuf {
    home.join(".ssh/pumadev.pem")
}

/// Known keychain locations, in the order they are searched.
pub fn keychain_candidates(home: &Path) -> Vec<PathBuf> {
    vec![
        home.join("Library/Keychains/login.keychain-db"),
        home.join("Library/Keychains/login.keychain"),
    ]
}

/// Puma-dev's link directory: `~/.puma-dev/`
pub fn link_dir(home: &Path) -> PathBuf {
    home.join(".puma-dev")
}

/// Per-app link inside the link directory: `~/.puma-dev/<domain>`
pub fn app_link(home: &Path, domain: &str) -> PathBuf {
    link_dir(home).join(domain)
}

/// The chruby init script, honoring the `CHRUBY_PATH` override.
/// The override is tilde-expanded so `CHRUBY_PATH=~/chruby.sh` works.
pub fn chruby_script() -> PathBuf {
    match env::var("CHRUBY_PATH") {
        Ok(custom) => PathBuf::from(shellexpand::tilde(&custom).into_owned()),
        Err(_) => PathBuf::from(DEFAULT_CHRUBY),
    }
}

/// Project-level paths, relative to the app root.
pub mod project {
    use super::*;

    /// App environment file: `.env`
    pub fn env_file(root: &Path) -> PathBuf {
        root.join(".env")
    }

    /// Per-project shell rc consumed by puma-dev: `.powrc`
    pub fn powrc(root: &Path) -> PathBuf {
        root.join(".powrc")
    }
}
