//! Subprocess seam for everything the tool shells out to.
//!
//! All external commands (puma-dev itself, `security`, `sudo`) and PATH
//! probes go through the [`Exec`] trait so tests can script them. The
//! real implementation inherits stdio, so sudo password prompts and
//! command output reach the terminal untouched.

use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

/// How the pipeline runs external commands and probes PATH.
pub trait Exec {
    /// Resolve `program` on PATH. `None` means not installed.
    fn lookup(&self, program: &str) -> Option<PathBuf>;

    /// Run `program` with `args`, waiting for it to finish.
    /// Returns whether it exited successfully; failing to spawn is an error.
    fn status(&mut self, program: &Path, args: &[&OsStr]) -> Result<bool>;
}

/// Real implementation backed by `which` and `std::process::Command`.
pub struct SystemExec;

impl Exec for SystemExec {
    fn lookup(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    fn status(&mut self, program: &Path, args: &[&OsStr]) -> Result<bool> {
        let status = Command::new(program)
            .args(args)
            .status()
            .with_context(|| format!("Failed to run {}", program.display()))?;
        Ok(status.success())
    }
}

/// Render a command line for failure messages, `system!`-style.
pub fn render_argv(program: &Path, args: &[&OsStr]) -> String {
    let mut argv = vec![program.display().to_string()];
    argv.extend(args.iter().map(|a| a.to_string_lossy().into_owned()));
    argv.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_finds_common_binary() {
        // `sh` exists on any unix box this tool targets
        assert!(SystemExec.lookup("sh").is_some());
        assert!(SystemExec
            .lookup("definitely-not-a-real-binary-9f2e")
            .is_none());
    }

    #[test]
    fn test_status_reports_exit_code() {
        let mut exec = SystemExec;
        let ok = exec
            .status(Path::new("sh"), &[OsStr::new("-c"), OsStr::new("exit 0")])
            .unwrap();
        assert!(ok);
        let failed = exec
            .status(Path::new("sh"), &[OsStr::new("-c"), OsStr::new("exit 3")])
            .unwrap();
        assert!(!failed);
    }

    #[test]
    fn test_render_argv() {
        let rendered = render_argv(Path::new("puma-dev"), &[OsStr::new("-stop")]);
        assert_eq!(rendered, "puma-dev -stop");
    }
}
