//! Interactive event-path prompt.

use crate::runtime::loader::{validate_event_path, DEFAULT_EVENT_PATH};
use crate::{MockError, Result};
use inquire::error::CustomUserError;
use inquire::validator::Validation;
use inquire::Text;
use std::path::Path;

/// Asks the user for an event path.
pub trait EventPrompt: Send + Sync {
    fn ask_event_path(&self, resource_dir: &Path) -> Result<String>;
}

/// Terminal prompt backed by `inquire`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InquireEventPrompt;

impl EventPrompt for InquireEventPrompt {
    fn ask_event_path(&self, resource_dir: &Path) -> Result<String> {
        let message = format!(
            "Provide the path to the event JSON object relative to {}",
            resource_dir.display()
        );
        let answer = Text::new(&message)
            .with_default(DEFAULT_EVENT_PATH)
            .with_validator(|input: &str| -> std::result::Result<Validation, CustomUserError> {
                Ok(match validate_event_path(input) {
                    Ok(()) => Validation::Valid,
                    Err(message) => Validation::Invalid(message.into()),
                })
            })
            .prompt()
            .map_err(|e| MockError::Prompt(e.to_string()))?;
        Ok(answer)
    }
}
