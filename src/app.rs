//! Project discovery: where the current app lives and what domain it serves.

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Walk up from `start` to the nearest directory containing a `Gemfile`.
/// Resolved once at startup; every later step works relative to it.
pub fn find_app_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join("Gemfile").exists())
        .map(Path::to_path_buf)
}

/// App root for the current working directory, as a hard requirement.
pub fn app_root() -> Result<PathBuf> {
    let cwd = env::current_dir().context("Unable to determine working directory")?;
    find_app_root(&cwd).with_context(|| {
        format!(
            "Unable to locate app root: no Gemfile found in {} or any parent directory",
            cwd.display()
        )
    })
}

/// Subdomain the app is served under, from `APP_DOMAIN`.
/// Read lazily so a `.env` load earlier in the run can supply it.
pub fn app_domain() -> Result<String> {
    env::var("APP_DOMAIN").context("APP_DOMAIN is not set (set it in the environment or .env)")
}
