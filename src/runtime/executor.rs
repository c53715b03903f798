//! One local run of a function, from validation to report.
//!
//! The executor owns no I/O of its own: project metadata, configuration,
//! invocation and prompting are injected, so the whole flow can be driven
//! from tests.

use super::hydrate::hydrate_env_vars;
use super::invoker::{InvokerFactory, InvokerRequest};
use super::loader::{event_file_path, load_event, EventPathSource, INVALID_EVENT_PATH_MESSAGE};
use super::parser::ConfigResolver;
use super::result::InvocationOutcome;
use super::timeout::race_with_timeout;
use crate::config::resource_dir;
use crate::output::Reporter;
use crate::project::{Mockability, ResourceCatalog};
use crate::prompt::EventPrompt;
use crate::{MockError, Result};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Inputs of one run, built from the command line.
#[derive(Debug, Clone, Default)]
pub struct FunctionRequest {
    pub resource_name: String,
    pub event: Option<String>,
    pub timeout: Option<String>,
    pub env_name: String,
}

pub struct FunctionExecutor<'a> {
    backend_dir: PathBuf,
    catalog: &'a dyn ResourceCatalog,
    resolver: &'a dyn ConfigResolver,
    factory: &'a dyn InvokerFactory,
    prompt: &'a dyn EventPrompt,
}

impl<'a> FunctionExecutor<'a> {
    pub fn new(
        backend_dir: impl Into<PathBuf>,
        catalog: &'a dyn ResourceCatalog,
        resolver: &'a dyn ConfigResolver,
        factory: &'a dyn InvokerFactory,
        prompt: &'a dyn EventPrompt,
    ) -> Self {
        Self {
            backend_dir: backend_dir.into(),
            catalog,
            resolver,
            factory,
            prompt,
        }
    }

    /// Run the function once.
    ///
    /// Validation and configuration failures are returned as errors. Handler
    /// failures and timeouts are reported and returned as the outcome.
    #[tracing::instrument(skip_all, fields(resource = %request.resource_name))]
    pub async fn run<W: Write>(
        &self,
        request: &FunctionRequest,
        reporter: &mut Reporter<W>,
    ) -> Result<InvocationOutcome> {
        let resource_name = request.resource_name.as_str();

        if let Mockability::NotMockable { reason } = self.catalog.mockability(resource_name)? {
            return Err(MockError::NotMockable {
                resource: resource_name.to_string(),
                reason,
            }
            .into());
        }

        let resource_dir = resource_dir(&self.backend_dir, resource_name);
        let event_path = match EventPathSource::choose(request.event.as_deref()) {
            EventPathSource::Supplied(path) => path,
            EventPathSource::Prompt { rejected } => {
                if rejected.is_some() {
                    reporter.warning(INVALID_EVENT_PATH_MESSAGE)?;
                }
                self.prompt.ask_event_path(&resource_dir)?
            }
        };
        let event = load_event(&event_file_path(&resource_dir, &event_path))?;

        let config = self.resolver.resolve(resource_name, &request.env_name)?;
        let handler = config
            .handler()
            .ok_or_else(|| MockError::HandlerMissing(resource_name.to_string()))?
            .to_string();

        let status = self.catalog.resource_status()?;
        let env_vars = hydrate_env_vars(&status, &config.environment)?;

        let invoker = self.factory.invoker(InvokerRequest {
            resource_name: resource_name.to_string(),
            handler,
            runtime: config.runtime.clone(),
            env_vars,
            resource_dir,
        })?;

        reporter.starting()?;
        info!(event = %event_path, "Invoking handler");
        let outcome = race_with_timeout(invoker.invoke(event), request.timeout.as_deref()).await;
        // The finish marker follows every invocation, even if the outcome
        // could not be written.
        let reported = reporter.outcome(resource_name, &outcome);
        reporter.finished()?;
        reported?;

        Ok(outcome)
    }
}
