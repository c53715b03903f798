//! Invocation outcome types and result formatting.

use super::invoker::HandlerError;
use serde_json::Value;
use thiserror::Error;

/// Upper bound on a deployed function's run time, quoted in timeout errors.
pub const PLATFORM_MAX_MINUTES: u64 = 15;

/// Why an invocation did not produce a value.
///
/// Both variants are reported the same way today; they stay distinct so a
/// caller can tell a slow handler from a failing one.
#[derive(Debug, Clone, Error)]
pub enum InvocationError {
    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error("{}", timeout_message(*seconds))]
    Timeout { seconds: u64 },
}

impl InvocationError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, InvocationError::Timeout { .. })
    }
}

/// Result of one run. `Ok(None)` means the handler returned nothing.
pub type InvocationOutcome = std::result::Result<Option<Value>, InvocationError>;

fn timeout_message(seconds: u64) -> String {
    format!(
        "Lambda execution timed out after {seconds} seconds.\n\
         To increase the lambda timeout use the --timeout parameter to set a value in seconds.\n\
         Note that the maximum Lambda execution time is {PLATFORM_MAX_MINUTES} minutes:\n\
         https://aws.amazon.com/about-aws/whats-new/2018/10/aws-lambda-supports-functions-that-can-run-up-to-15-minutes/"
    )
}

/// Render a handler's return value for display.
///
/// Objects, arrays and `null` become compact JSON; strings, numbers and
/// booleans print as their plain text; no value prints as an empty string.
pub fn format_result(result: Option<&Value>) -> String {
    match result {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}
