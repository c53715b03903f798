//! User-facing run report.

use crate::runtime::result::{format_result, InvocationOutcome};
use colored::Colorize;
use std::io::{self, Stdout, Write};

/// Prints the progress and outcome of a run.
pub struct Reporter<W: Write> {
    out: W,
}

impl Reporter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn warning(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", message.yellow())
    }

    pub fn starting(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "Starting execution...".green())
    }

    pub fn outcome(&mut self, resource_name: &str, outcome: &InvocationOutcome) -> io::Result<()> {
        match outcome {
            Ok(result) => {
                writeln!(self.out, "{}", "Result:".green())?;
                writeln!(self.out, "{}", format_result(result.as_ref()))
            }
            Err(error) => {
                writeln!(
                    self.out,
                    "{}",
                    format!("{} failed with the following error:", resource_name).red()
                )?;
                writeln!(self.out, "{}", error)
            }
        }
    }

    /// Printed after every invocation, successful or not.
    pub fn finished(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "Finished execution.".green())?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
