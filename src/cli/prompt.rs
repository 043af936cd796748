//! Terminal prompts via dialoguer

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};
use gt_stack::error::{Error, Result};
use gt_stack::prompt::Prompter;
use gt_stack::types::SubmitMode;

const MODES: [(SubmitMode, &str); 4] = [
    (SubmitMode::Single, "single      - only the current branch"),
    (SubmitMode::Upstack, "upstack     - this branch and all branches above it"),
    (SubmitMode::Downstack, "downstack   - this branch and all branches below it"),
    (SubmitMode::WholeStack, "whole-stack - every branch in the stack"),
];

/// Prompter that asks on the terminal
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .default(default)
            .interact()
            .map_err(|e| Error::Prompt(e.to_string()))
    }

    fn select_mode(&self) -> Result<SubmitMode> {
        let labels: Vec<&str> = MODES.iter().map(|(_, label)| *label).collect();
        let index = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Submit mode")
            .items(&labels)
            .default(0)
            .interact()
            .map_err(|e| Error::Prompt(e.to_string()))?;
        Ok(MODES[index].0)
    }
}
