use anyhow::Result;
use clap::Parser;
use funcmock::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    let verbosity = cli.verbosity();

    // Logs go to stderr; stdout carries the execution report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| verbosity.to_log_level().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Function(args) => {
            funcmock::cli::commands::function(args).await?;
        }
    }

    Ok(())
}
