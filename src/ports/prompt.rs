//! Prompt port for interactive confirmation.

/// Asks the operator a yes/no question.
pub trait Prompt: Send + Sync {
    /// Displays `question` and returns `true` only on an explicit yes.
    fn confirm(&self, question: &str) -> bool;
}
