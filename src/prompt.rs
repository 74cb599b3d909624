//! Interactive confirmation, kept behind a trait so tests can answer
//! without a terminal.

use anyhow::Result;
use std::io::{self, BufRead, Write};

/// One-line yes/no question.
pub trait Prompt {
    /// Ask `question`, returning true for a "y..." answer.
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Real prompt: write the question, read one line from stdin.
/// Anything starting with `y`/`Y` is a yes; everything else is a no.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        print!("{question} (y/n) ");
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(answer.trim().to_lowercase().starts_with('y'))
    }
}
