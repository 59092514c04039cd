//! Live prompt adapter reading a line from stdin.

use std::io::{self, BufRead, Write};

use crate::ports::Prompt;

/// Asks on stdout and reads the answer from stdin.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm(&self, question: &str) -> bool {
        print!("{question} [y/N] ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        is_yes(&line)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
