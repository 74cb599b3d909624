//! Line-oriented handling of the app's `.env` file.
//!
//! Two concerns live here: a best-effort load of `.env` into the process
//! environment, and the text rewrites the setup pipeline applies to it
//! (pinning `SSL_CERT_FILE`, flipping `http://*.test` URLs to https).
//! Rewrites are pure string transforms so they can be tested directly.

use anyhow::Result;
use regex::{NoExpand, Regex};
use std::env;
use std::fs;
use std::path::Path;

/// Load `KEY=VALUE` lines from `path` into the process environment.
/// Variables already present in the environment win. A missing file is
/// not an error; the app may simply not have a `.env` yet.
pub fn load(path: &Path) -> Result<()> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return Ok(()),
    };

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim_start_matches("export ").trim();
        if key.is_empty() || env::var_os(key).is_some() {
            continue;
        }
        env::set_var(key, unquote(value.trim()));
    }
    Ok(())
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Whether the rewrite replaced an existing entry or appended a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SslCertEntry {
    Replaced,
    Appended,
}

/// Point `SSL_CERT_FILE` at `bundle`. Any line mentioning the key is
/// replaced wholesale; otherwise a new line is appended at the end.
pub fn set_ssl_cert_file(contents: &str, bundle: &Path) -> Result<(String, SslCertEntry)> {
    let entry = format!("SSL_CERT_FILE=\"{}\"", bundle.display());
    if contents.contains("SSL_CERT_FILE") {
        let line = Regex::new(r"(?m)^.*SSL_CERT_FILE.*$")?;
        let rewritten = line.replace_all(contents, NoExpand(&entry)).into_owned();
        Ok((rewritten, SslCertEntry::Replaced))
    } else {
        Ok((format!("{contents}\n{entry}"), SslCertEntry::Appended))
    }
}

/// Switch local dev URLs to https and re-enable forced SSL.
/// Idempotent: https URLs and an already-false flag are left alone.
pub fn force_ssl(contents: &str) -> Result<String> {
    let url = Regex::new(r"http://(?P<subdomain>[\w.]+)\.test")?;
    let rewritten = url.replace_all(contents, "https://$subdomain.test");

    let flag = Regex::new(r#"(?m)^.*DISABLE_FORCE_SSL=".*""#)?;
    Ok(flag
        .replace_all(&rewritten, NoExpand(r#"DISABLE_FORCE_SSL="false""#))
        .into_owned())
}
