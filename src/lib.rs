//! Local invocation of serverless function handlers.
//!
//! `funcmock` resolves a function resource inside a project checkout, loads a
//! sample event, hydrates the handler's environment from the provisioned
//! resources and runs the handler once under a timeout.

pub mod cli;
pub mod config;
pub mod output;
pub mod project;
pub mod prompt;
pub mod runtime;

use thiserror::Error;

/// Errors that abort a run before the handler produces an outcome.
///
/// Failures raised by the handler itself, and timeouts, are not represented
/// here: they are reported as a [`runtime::InvocationError`] and the run still
/// completes.
#[derive(Debug, Error)]
pub enum MockError {
    #[error("Unable to mock {resource}. {reason}")]
    NotMockable { resource: String, reason: String },

    #[error("Could not parse handler for {0} from cloudformation file")]
    HandlerMissing(String),

    #[error("Failed to load event from {path}: {message}")]
    EventLoad { path: String, message: String },

    #[error(
        "Environment variable {variable} references '{reference}', which no provisioned resource provides"
    )]
    UnresolvedReference { variable: String, reference: String },

    #[error("Unable to prepare an invoker for {resource}: {message}")]
    InvokerUnavailable { resource: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),
}

pub type Result<T> = anyhow::Result<T>;
