//! Project settings.
//!
//! Settings come from three places: CLI flags, the project's local
//! environment file (`amplify/.config/local-env-info.json`) and an optional
//! `funcmock.toml` at the project root that overrides how runtimes are
//! launched.

use crate::{MockError, Result};
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Category segment under the backend directory that holds functions.
pub const FUNCTION_CATEGORY: &str = "function";

pub const CONFIG_FILE_NAME: &str = "funcmock.toml";

/// Interpreter overrides for local handler execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeSettings {
    /// Program used for `nodejs*` runtimes. Defaults to `node`.
    pub node: Option<String>,
    /// Program used for `python*` runtimes. Defaults to `python3`.
    pub python: Option<String>,
    /// Command (program and arguments) used for any other runtime.
    pub custom: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    runtime: RuntimeSettings,
}

#[derive(Debug, Deserialize)]
struct LocalEnvInfo {
    #[serde(rename = "envName")]
    env_name: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub project_root: PathBuf,
    pub env_name: String,
    pub runtime: RuntimeSettings,
}

impl Settings {
    /// Load settings for the project at `project_root`.
    ///
    /// `env_override` wins over the environment recorded in the project.
    pub fn load(project_root: &Path, env_override: Option<&str>) -> Result<Self> {
        let project_root = if project_root.is_absolute() {
            project_root.to_path_buf()
        } else {
            std::env::current_dir()
                .context("Failed to determine the current directory")?
                .join(project_root)
        };

        let env_name = match env_override {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => read_env_name(&project_root)?,
        };

        let runtime = read_file_config(&project_root)?.runtime;
        debug!(
            project_root = %project_root.display(),
            env = %env_name,
            "Loaded project settings"
        );

        Ok(Self {
            project_root,
            env_name,
            runtime,
        })
    }

    /// `<project>/amplify/backend`
    pub fn backend_dir(&self) -> PathBuf {
        self.project_root.join("amplify").join("backend")
    }

    pub fn meta_path(&self) -> PathBuf {
        self.backend_dir().join("amplify-meta.json")
    }

    pub fn resource_dir(&self, resource_name: &str) -> PathBuf {
        resource_dir(&self.backend_dir(), resource_name)
    }
}

/// Directory of a function resource below `backend_dir`.
pub fn resource_dir(backend_dir: &Path, resource_name: &str) -> PathBuf {
    backend_dir.join(FUNCTION_CATEGORY).join(resource_name)
}

fn read_env_name(project_root: &Path) -> Result<String> {
    let path = project_root
        .join("amplify")
        .join(".config")
        .join("local-env-info.json");
    let raw = fs::read_to_string(&path).map_err(|e| {
        MockError::Config(format!(
            "No environment selected: could not read {} ({}). Pass --env to choose one.",
            path.display(),
            e
        ))
    })?;
    let info: LocalEnvInfo = serde_json::from_str(&raw)
        .map_err(|e| MockError::Config(format!("Invalid {}: {}", path.display(), e)))?;
    Ok(info.env_name)
}

fn read_file_config(project_root: &Path) -> Result<FileConfig> {
    let path = project_root.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&raw)
        .map_err(|e| MockError::Config(format!("Invalid {}: {}", path.display(), e)).into())
}
