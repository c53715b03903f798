//! Command-line surface.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "funcmock",
    version,
    about = "Invoke a serverless function handler locally against a sample event"
)]
pub struct Cli {
    /// Only print errors from the logger
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    /// Default filter directive when `RUST_LOG` is not set.
    pub fn to_log_level(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "debug",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a function handler locally with a sample event
    Function(FunctionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct FunctionArgs {
    /// Name of the function resource to invoke
    pub name: String,

    /// Path to the event JSON, relative to the function's resource directory
    #[arg(long)]
    pub event: Option<String>,

    /// Seconds to wait for the handler before giving up (default 10)
    #[arg(long)]
    pub timeout: Option<String>,

    /// Environment name used to resolve the function's configuration
    #[arg(long)]
    pub env: Option<String>,

    /// Project root containing the `amplify/` directory
    #[arg(long, env = "FUNCMOCK_PROJECT_DIR", default_value = ".")]
    pub project_dir: PathBuf,
}
