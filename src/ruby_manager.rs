//! Ruby version-manager detection for `.powrc` generation.
//!
//! puma-dev sources `.powrc` before booting the app, so the file has to
//! activate whichever Ruby manager the machine uses. Checked in a fixed
//! priority order: chruby, then rbenv, then rvm.

use crate::exec::Exec;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RubyManager {
    Chruby,
    Rbenv,
    Rvm,
}

/// Detect the active Ruby manager. chruby is recognized by its init
/// script existing on disk; rbenv and rvm by being on PATH.
pub fn detect(exec: &dyn Exec, chruby_script: &Path) -> Option<RubyManager> {
    if chruby_script.exists() {
        Some(RubyManager::Chruby)
    } else if exec.lookup("rbenv").is_some() {
        Some(RubyManager::Rbenv)
    } else if exec.lookup("rvm").is_some() {
        Some(RubyManager::Rvm)
    } else {
        None
    }
}

impl RubyManager {
    /// `.powrc` content for this manager. rbenv shims resolve through
    /// PATH already, so no rc content is needed there.
    pub fn powrc_content(self, chruby_script: &Path) -> Option<String> {
        match self {
            RubyManager::Chruby => Some(format!(
                "source {}\nchruby $(cat .ruby-version)\n",
                chruby_script.display()
            )),
            RubyManager::Rbenv => None,
            RubyManager::Rvm => Some(
                "if [ -f \"$rvm_path/scripts/rvm\" ] && [ -f \".ruby-version\" ]; then\n  \
                 source \"$rvm_path/scripts/rvm\"\n  \
                 rvm use `cat .ruby-version`@`cat .ruby-gemset`\nfi\n"
                    .to_string(),
            ),
        }
    }
}
