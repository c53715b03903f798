//! Minimal Lambda configuration from a function's CloudFormation template.
//!
//! Only the pieces needed to run the handler locally are read: the handler
//! entry point, the runtime, and the declared environment variables. `Ref`s
//! that can be answered from the environment name or the resource's
//! `parameters.json` are resolved here; every other `Ref` is kept symbolic for
//! [`super::hydrate`].

use crate::config::resource_dir;
use crate::{MockError, Result};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const LAMBDA_FUNCTION_TYPE: &str = "AWS::Lambda::Function";
const PREFERRED_LOGICAL_ID: &str = "LambdaFunction";

/// A declared environment variable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Literal(String),
    /// Name of a template parameter still to be resolved.
    Ref(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LambdaConfig {
    pub handler: Option<String>,
    pub runtime: Option<String>,
    pub environment: BTreeMap<String, EnvValue>,
}

impl LambdaConfig {
    /// The handler, if present and non-empty.
    pub fn handler(&self) -> Option<&str> {
        self.handler
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }
}

/// Resolves a function's configuration for an environment.
pub trait ConfigResolver: Send + Sync {
    fn resolve(&self, resource_name: &str, env_name: &str) -> Result<LambdaConfig>;
}

/// Reads `<backend>/function/<name>/<name>-cloudformation-template.json`.
#[derive(Debug, Clone)]
pub struct TemplateConfigResolver {
    backend_dir: PathBuf,
}

impl TemplateConfigResolver {
    pub fn new(backend_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend_dir: backend_dir.into(),
        }
    }

    pub fn template_path(&self, resource_name: &str) -> PathBuf {
        resource_dir(&self.backend_dir, resource_name)
            .join(format!("{}-cloudformation-template.json", resource_name))
    }
}

impl ConfigResolver for TemplateConfigResolver {
    #[tracing::instrument(skip(self))]
    fn resolve(&self, resource_name: &str, env_name: &str) -> Result<LambdaConfig> {
        let template_path = self.template_path(resource_name);
        if !template_path.exists() {
            warn!("No template found at {}", template_path.display());
            return Ok(LambdaConfig::default());
        }

        let template = read_json(&template_path)?;
        let parameters_path = resource_dir(&self.backend_dir, resource_name).join("parameters.json");
        let parameters = if parameters_path.exists() {
            match read_json(&parameters_path)? {
                JsonValue::Object(map) => map,
                _ => Map::new(),
            }
        } else {
            Map::new()
        };

        Ok(parse_lambda_config(&template, &parameters, env_name))
    }
}

fn read_json(path: &Path) -> Result<JsonValue> {
    let raw = fs::read_to_string(path).map_err(|e| {
        MockError::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&raw)
        .map_err(|e| MockError::Config(format!("Invalid JSON in {}: {}", path.display(), e)).into())
}

/// Extract the Lambda configuration from a parsed template.
pub fn parse_lambda_config(
    template: &JsonValue,
    parameters: &Map<String, JsonValue>,
    env_name: &str,
) -> LambdaConfig {
    let Some(properties) = find_function(template).and_then(|f| f.get("Properties")) else {
        debug!("Template declares no {}", LAMBDA_FUNCTION_TYPE);
        return LambdaConfig::default();
    };

    let handler = properties
        .get("Handler")
        .and_then(JsonValue::as_str)
        .map(str::to_string);
    let runtime = properties
        .get("Runtime")
        .and_then(JsonValue::as_str)
        .map(str::to_string);

    let mut environment = BTreeMap::new();
    if let Some(JsonValue::Object(vars)) = properties.pointer("/Environment/Variables") {
        for (name, value) in vars {
            match parse_env_value(value, parameters, env_name) {
                Some(parsed) => {
                    environment.insert(name.clone(), parsed);
                }
                None => warn!(
                    "Skipping environment variable {}: unsupported value {}",
                    name, value
                ),
            }
        }
    }

    LambdaConfig {
        handler,
        runtime,
        environment,
    }
}

fn find_function(template: &JsonValue) -> Option<&JsonValue> {
    let resources = template.get("Resources")?.as_object()?;
    let is_function =
        |r: &&JsonValue| r.get("Type").and_then(JsonValue::as_str) == Some(LAMBDA_FUNCTION_TYPE);

    resources
        .get(PREFERRED_LOGICAL_ID)
        .filter(is_function)
        .or_else(|| resources.values().find(is_function))
}

fn parse_env_value(
    value: &JsonValue,
    parameters: &Map<String, JsonValue>,
    env_name: &str,
) -> Option<EnvValue> {
    match value {
        JsonValue::String(s) => Some(EnvValue::Literal(s.clone())),
        JsonValue::Number(n) => Some(EnvValue::Literal(n.to_string())),
        JsonValue::Bool(b) => Some(EnvValue::Literal(b.to_string())),
        JsonValue::Object(obj) if obj.len() == 1 => {
            let reference = obj.get("Ref")?.as_str()?;
            if reference == "env" {
                return Some(EnvValue::Literal(env_name.to_string()));
            }
            match parameters.get(reference) {
                Some(JsonValue::String(s)) => Some(EnvValue::Literal(s.clone())),
                Some(JsonValue::Null) | None => Some(EnvValue::Ref(reference.to_string())),
                Some(other) => Some(EnvValue::Literal(other.to_string())),
            }
        }
        _ => None,
    }
}
