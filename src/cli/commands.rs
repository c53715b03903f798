use crate::cli::FunctionArgs;
use crate::config::Settings;
use crate::output::Reporter;
use crate::project::ProjectMeta;
use crate::prompt::InquireEventPrompt;
use crate::runtime::{FunctionExecutor, FunctionRequest, ProcessInvokerFactory, TemplateConfigResolver};
use crate::Result;
use tracing::info;

/// Execute the `function` command.
///
/// Errors returned here are fatal to the process. A handler that fails or
/// times out is reported on stdout and the command still succeeds.
pub async fn function(args: FunctionArgs) -> Result<()> {
    let settings = Settings::load(&args.project_dir, args.env.as_deref())?;
    let meta = ProjectMeta::load(&settings.meta_path())?;
    let resolver = TemplateConfigResolver::new(settings.backend_dir());
    let factory = ProcessInvokerFactory::new(settings.runtime.clone());
    let prompt = InquireEventPrompt;

    let executor = FunctionExecutor::new(
        settings.backend_dir(),
        &meta,
        &resolver,
        &factory,
        &prompt,
    );
    let request = FunctionRequest {
        resource_name: args.name,
        event: args.event,
        timeout: args.timeout,
        env_name: settings.env_name.clone(),
    };

    info!(resource = %request.resource_name, env = %request.env_name, "Mocking function");
    let mut reporter = Reporter::stdout();
    executor.run(&request, &mut reporter).await?;
    Ok(())
}
