/// Blocking yes/no question shown before discarding the user's input.
#[cfg_attr(test, mockall::automock)]
pub trait ConfirmationPrompt {
    /// Ask the user; `true` means proceed
    fn confirm(&self, message: &str) -> bool;
}

/// Prompt that always gives the same answer (useful for unattended front ends)
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl ConfirmationPrompt for FixedAnswer {
    fn confirm(&self, message: &str) -> bool {
        tracing::debug!("Auto-answering {:?} to: {}", self.0, message);
        self.0
    }
}
