//! Handler invocation.
//!
//! An [`InvokerFactory`] turns a resolved function (handler, runtime and
//! hydrated environment) into an [`Invoker`]; the invoker runs the handler
//! against one event. The process-backed implementation starts the handler in
//! a child process that speaks a line protocol on stdout:
//!
//! ```text
//! __FUNCMOCK_RESULT__{"statusCode":200}   handler returned a value
//! __FUNCMOCK_RESULT__                     handler returned nothing
//! __FUNCMOCK_ERROR__"TypeError: ..."      handler failed (JSON string or raw text)
//! ```
//!
//! Every other stdout line is handler output and is echoed as it arrives. The
//! first marker settles the invocation even if the handler process keeps
//! running; anything it prints afterwards is echoed as plain output.

use super::hydrate::HydratedEnvironment;
use crate::config::RuntimeSettings;
use crate::{MockError, Result};
use futures_util::future::BoxFuture;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, info, warn};

pub const RESULT_PREFIX: &str = "__FUNCMOCK_RESULT__";
pub const ERROR_PREFIX: &str = "__FUNCMOCK_ERROR__";

/// An error raised by the handler itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type InvocationFuture = BoxFuture<'static, std::result::Result<Option<Value>, HandlerError>>;

/// Runs a handler against an event.
pub trait Invoker: Send + Sync {
    /// Start one invocation. The returned future owns everything it needs.
    fn invoke(&self, event: Value) -> InvocationFuture;

    /// Whether dropping an in-flight invocation stops the underlying work.
    ///
    /// Callers must not rely on it; the timeout guard never does.
    fn supports_cancellation(&self) -> bool {
        false
    }
}

/// Everything an invoker needs to know about the function.
#[derive(Debug, Clone)]
pub struct InvokerRequest {
    pub resource_name: String,
    pub handler: String,
    pub runtime: Option<String>,
    pub env_vars: HydratedEnvironment,
    pub resource_dir: PathBuf,
}

pub trait InvokerFactory: Send + Sync {
    fn invoker(&self, request: InvokerRequest) -> Result<Box<dyn Invoker>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeKind {
    Node,
    Python,
    Custom,
}

impl RuntimeKind {
    /// Classify a template runtime identifier such as `nodejs18.x`.
    pub fn detect(runtime: Option<&str>) -> Self {
        match runtime {
            Some(r) if r.starts_with("nodejs") => RuntimeKind::Node,
            Some(r) if r.starts_with("python") => RuntimeKind::Python,
            // Templates without a runtime are node functions.
            None => RuntimeKind::Node,
            Some(_) => RuntimeKind::Custom,
        }
    }
}

const NODE_BOOTSTRAP: &str = r#"
const path = require('path');
const spec = process.env._HANDLER;
const dot = spec.lastIndexOf('.');
const modulePath = path.resolve(process.cwd(), spec.slice(0, dot));
const exportName = spec.slice(dot + 1);
const report = (prefix, body) => process.stdout.write(prefix + body + '\n');
let input = '';
process.stdin.setEncoding('utf8');
process.stdin.on('data', (chunk) => { input += chunk; });
process.stdin.on('end', async () => {
  try {
    const handler = require(modulePath)[exportName];
    if (typeof handler !== 'function') {
      throw new Error(`${spec} is not a function`);
    }
    const event = JSON.parse(input);
    const context = {
      functionName: process.env.AWS_LAMBDA_FUNCTION_NAME,
      getRemainingTimeInMillis: () => 0,
    };
    const result = await new Promise((resolve, reject) => {
      const returned = handler(event, context, (err, value) => (err ? reject(err) : resolve(value)));
      if (returned && typeof returned.then === 'function') {
        returned.then(resolve, reject);
      }
    });
    report('__FUNCMOCK_RESULT__', result === undefined ? '' : JSON.stringify(result));
  } catch (err) {
    report('__FUNCMOCK_ERROR__', JSON.stringify(err && err.stack ? err.stack : String(err)));
    process.exitCode = 1;
  }
});
"#;

const PYTHON_BOOTSTRAP: &str = r#"
import importlib, json, os, sys, traceback
spec = os.environ["_HANDLER"]
module_name, _, func_name = spec.rpartition(".")
sys.path.insert(0, os.getcwd())
try:
    handler = getattr(importlib.import_module(module_name.replace("/", ".")), func_name)
    result = handler(json.loads(sys.stdin.read()), None)
    body = "" if result is None else json.dumps(result, separators=(",", ":"))
    sys.stdout.write("__FUNCMOCK_RESULT__" + body + "\n")
except Exception:
    sys.stdout.write("__FUNCMOCK_ERROR__" + json.dumps(traceback.format_exc()) + "\n")
    sys.exit(1)
"#;

/// Creates [`ProcessInvoker`]s from the project's runtime settings.
#[derive(Debug, Clone, Default)]
pub struct ProcessInvokerFactory {
    runtimes: RuntimeSettings,
}

impl ProcessInvokerFactory {
    pub fn new(runtimes: RuntimeSettings) -> Self {
        Self { runtimes }
    }

    fn command_for(&self, request: &InvokerRequest) -> Result<(String, Vec<String>)> {
        match RuntimeKind::detect(request.runtime.as_deref()) {
            RuntimeKind::Node => Ok((
                self.runtimes.node.clone().unwrap_or_else(|| "node".to_string()),
                vec!["-e".to_string(), NODE_BOOTSTRAP.to_string()],
            )),
            RuntimeKind::Python => Ok((
                self.runtimes
                    .python
                    .clone()
                    .unwrap_or_else(|| "python3".to_string()),
                vec!["-c".to_string(), PYTHON_BOOTSTRAP.to_string()],
            )),
            RuntimeKind::Custom => {
                let mut command = self.runtimes.custom.clone().unwrap_or_default().into_iter();
                let program = command.next().ok_or_else(|| MockError::InvokerUnavailable {
                    resource: request.resource_name.clone(),
                    message: format!(
                        "no local command configured for runtime '{}'; set [runtime] custom in funcmock.toml",
                        request.runtime.as_deref().unwrap_or_default()
                    ),
                })?;
                Ok((program, command.collect()))
            }
        }
    }
}

impl InvokerFactory for ProcessInvokerFactory {
    fn invoker(&self, request: InvokerRequest) -> Result<Box<dyn Invoker>> {
        let (program, args) = self.command_for(&request)?;
        let working_dir = request.resource_dir.join("src");
        if !working_dir.is_dir() {
            return Err(MockError::InvokerUnavailable {
                resource: request.resource_name,
                message: format!("source directory {} does not exist", working_dir.display()),
            }
            .into());
        }

        let mut env = request.env_vars;
        env.insert("_HANDLER".to_string(), request.handler.clone());
        env.insert(
            "AWS_LAMBDA_FUNCTION_NAME".to_string(),
            request.resource_name.clone(),
        );

        info!(program = %program, handler = %request.handler, "Prepared process invoker");
        Ok(Box::new(ProcessInvoker {
            launch: LaunchSpec {
                program,
                args,
                working_dir,
                env,
            },
        }))
    }
}

#[derive(Debug, Clone)]
struct LaunchSpec {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
    env: HydratedEnvironment,
}

/// Runs a handler in a child process.
///
/// Does not support cancellation: an abandoned invocation keeps its child
/// alive until the command exits, at which point the child is killed.
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    launch: LaunchSpec,
}

impl Invoker for ProcessInvoker {
    fn invoke(&self, event: Value) -> InvocationFuture {
        let launch = self.launch.clone();
        Box::pin(async move { launch.run(event).await })
    }
}

/// One parsed stdout line.
#[derive(Debug, Clone, PartialEq)]
enum ProtocolLine<'a> {
    Output(&'a str),
    /// Handler output that preceded a marker on the same line, then the marker.
    Marker {
        output: &'a str,
        outcome: std::result::Result<Option<Value>, HandlerError>,
    },
}

fn parse_line(line: &str) -> ProtocolLine<'_> {
    if let Some(idx) = line.find(RESULT_PREFIX) {
        let body = line[idx + RESULT_PREFIX.len()..].trim();
        let outcome = if body.is_empty() {
            Ok(None)
        } else {
            serde_json::from_str(body).map(Some).map_err(|e| {
                HandlerError::new(format!("Handler returned a value that is not JSON: {}", e))
            })
        };
        return ProtocolLine::Marker {
            output: &line[..idx],
            outcome,
        };
    }
    if let Some(idx) = line.find(ERROR_PREFIX) {
        let body = line[idx + ERROR_PREFIX.len()..].trim();
        let message = match serde_json::from_str::<Value>(body) {
            Ok(Value::String(s)) => s,
            _ => body.to_string(),
        };
        return ProtocolLine::Marker {
            output: &line[..idx],
            outcome: Err(HandlerError::new(message)),
        };
    }
    ProtocolLine::Output(line)
}

impl LaunchSpec {
    #[tracing::instrument(skip_all, fields(program = %self.program))]
    async fn run(self, event: Value) -> std::result::Result<Option<Value>, HandlerError> {
        let payload = serde_json::to_vec(&event)
            .map_err(|e| HandlerError::new(format!("Failed to serialise event: {}", e)))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .envs(&self.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| HandlerError::new(format!("Failed to start {}: {}", self.program, e)))?;
        debug!(pid = ?child.id(), "Handler process started");

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(&payload).await {
                // The handler may exit without reading its event.
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(HandlerError::new(format!("Failed to send event: {}", e)));
                }
            }
        }

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HandlerError::new("Handler stdout was not captured"))?;
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| HandlerError::new(format!("Failed to read handler output: {}", e)))?
        {
            match parse_line(&line) {
                ProtocolLine::Output(text) => println!("{}", text),
                ProtocolLine::Marker { output, outcome } => {
                    if !output.is_empty() {
                        println!("{}", output);
                    }
                    // The first marker settles the invocation; the handler may
                    // still hold open handles, so the rest is drained detached.
                    tokio::spawn(drain(lines, child));
                    return outcome;
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| HandlerError::new(format!("Failed to wait for handler: {}", e)))?;
        warn!(%status, "Handler exited without reporting an outcome");
        Err(HandlerError::new(format!(
            "Handler process exited ({}) without returning a result",
            status
        )))
    }
}

/// Echo whatever the handler prints after settling, then reap it.
///
/// Later marker lines are plain output. The child is killed if the runtime
/// shuts down first.
async fn drain(mut lines: Lines<BufReader<ChildStdout>>, mut child: Child) {
    while let Ok(Some(line)) = lines.next_line().await {
        println!("{}", line);
    }
    match child.wait().await {
        Ok(status) => debug!(%status, "Handler process exited"),
        Err(e) => warn!("Failed to wait for handler: {}", e),
    }
}
