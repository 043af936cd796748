//! Interactive questions asked during submit and sync
//!
//! Orchestrators only see the [`Prompter`] trait; the binary answers through
//! dialoguer and tests answer from a script.

use crate::error::Result;
use crate::types::SubmitMode;

/// Source of answers to interactive questions
pub trait Prompter: Send + Sync {
    /// Ask a yes/no question
    fn confirm(&self, message: &str, default: bool) -> Result<bool>;

    /// Ask which part of the stack to submit
    fn select_mode(&self) -> Result<SubmitMode>;
}

/// Answers every question the same way without asking
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswers {
    /// Answer to every confirmation
    pub confirm: bool,
    /// Answer to mode selection
    pub mode: SubmitMode,
}

impl Default for FixedAnswers {
    fn default() -> Self {
        Self {
            confirm: true,
            mode: SubmitMode::WholeStack,
        }
    }
}

impl Prompter for FixedAnswers {
    fn confirm(&self, _message: &str, _default: bool) -> Result<bool> {
        Ok(self.confirm)
    }

    fn select_mode(&self) -> Result<SubmitMode> {
        Ok(self.mode)
    }
}
