//! Event locating and loading.
//!
//! An event path is a project-relative, unix-like path to a `.json` file. A
//! supplied path that does not match [`EVENT_PATH_PATTERN`] is not an error:
//! the caller warns and asks for one interactively, validating the answer with
//! the same predicate.

use crate::{MockError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const EVENT_PATH_PATTERN: &str = r"^[a-zA-Z0-9/._-]+?\.json$";

pub const DEFAULT_EVENT_PATH: &str = "src/event.json";

pub const INVALID_EVENT_PATH_MESSAGE: &str = "Provide a valid unix-like path to a .json file";

static EVENT_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(EVENT_PATH_PATTERN).expect("event path pattern is a valid regex"));

pub fn is_valid_event_path(candidate: &str) -> bool {
    EVENT_PATH_RE.is_match(candidate)
}

/// Validation result in the form the prompt expects.
pub fn validate_event_path(candidate: &str) -> std::result::Result<(), &'static str> {
    if is_valid_event_path(candidate) {
        Ok(())
    } else {
        Err(INVALID_EVENT_PATH_MESSAGE)
    }
}

/// Where the event path for a run comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPathSource {
    /// The `--event` value passed validation.
    Supplied(String),
    /// No usable value was given; `rejected` holds an invalid supplied value.
    Prompt { rejected: Option<String> },
}

impl EventPathSource {
    pub fn choose(supplied: Option<&str>) -> Self {
        match supplied {
            Some(path) if is_valid_event_path(path) => EventPathSource::Supplied(path.to_string()),
            Some(path) if !path.is_empty() => EventPathSource::Prompt {
                rejected: Some(path.to_string()),
            },
            _ => EventPathSource::Prompt { rejected: None },
        }
    }
}

/// Absolute location of `event_path` inside a resource directory.
pub fn event_file_path(resource_dir: &Path, event_path: &str) -> PathBuf {
    resource_dir.join(event_path)
}

/// Read and parse an event file.
pub fn load_event(path: &Path) -> Result<Value> {
    debug!(path = %path.display(), "Loading event");
    let raw = fs::read_to_string(path).map_err(|e| MockError::EventLoad {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let event = serde_json::from_str(&raw).map_err(|e| MockError::EventLoad {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(event)
}
