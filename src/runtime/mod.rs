//! Local execution sub-system.
//!
//! Sub-modules:
//! - [`executor`] — Coordinates one run from validation to report.
//! - [`loader`]   — Event path validation and event loading.
//! - [`parser`]   — Minimal Lambda configuration from the resource template.
//! - [`hydrate`]  — Resolves environment variable references.
//! - [`invoker`]  — Invoker traits and the subprocess-backed implementation.
//! - [`timeout`]  — Races an invocation against a deadline.
//! - [`result`]   — Outcome types and result formatting.

pub mod executor;
pub mod hydrate;
pub mod invoker;
pub mod loader;
pub mod parser;
pub mod result;
pub mod timeout;

pub use executor::{FunctionExecutor, FunctionRequest};
pub use hydrate::{hydrate_env_vars, HydratedEnvironment};
pub use invoker::{
    HandlerError, InvocationFuture, Invoker, InvokerFactory, InvokerRequest, ProcessInvokerFactory,
};
pub use loader::{is_valid_event_path, EventPathSource, DEFAULT_EVENT_PATH};
pub use parser::{ConfigResolver, EnvValue, LambdaConfig, TemplateConfigResolver};
pub use result::{format_result, InvocationError, InvocationOutcome};
pub use timeout::{effective_timeout, race_with_timeout, DEFAULT_TIMEOUT_SECONDS};
