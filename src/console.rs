//! Verbosity-gated console output.
//!
//! The original behavior: unless `--verbose`, progress output is
//! suppressed for the whole run. Warnings always reach stderr.

use colored::Colorize;

#[derive(Debug, Clone, Copy)]
pub struct Console {
    verbose: bool,
}

impl Console {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Progress line; dropped entirely unless running verbose.
    pub fn say(&self, message: &str) {
        if self.verbose {
            println!("{message}");
        }
    }

    /// Warning; always printed, regardless of verbosity.
    pub fn warn(&self, message: &str) {
        eprintln!("{}", message.yellow());
    }
}
