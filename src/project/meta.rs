//! Reading `amplify/backend/amplify-meta.json`.
//!
//! The metadata file maps each category to its resources:
//!
//! ```json
//! {
//!   "providers": { "awscloudformation": { "Region": "us-east-1" } },
//!   "function": {
//!     "myFunction": {
//!       "service": "Lambda",
//!       "dependsOn": [{ "category": "storage", "resourceName": "users" }],
//!       "output": { "Arn": "arn:aws:lambda:..." }
//!     }
//!   }
//! }
//! ```

use crate::config::FUNCTION_CATEGORY;
use crate::{MockError, Result};
use anyhow::Context;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const LAYER_SERVICE: &str = "LambdaLayer";

/// Whether a function resource can be invoked locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mockability {
    Mockable,
    NotMockable { reason: String },
}

/// One provisioned resource, as seen by the environment hydrator.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionedResource {
    pub category: String,
    pub resource_name: String,
    pub service: Option<String>,
    pub output: Map<String, Value>,
}

/// Snapshot of every provisioned resource in the project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceStatus {
    pub resources: Vec<ProvisionedResource>,
    pub region: Option<String>,
}

/// Source of resource information for a run.
pub trait ResourceCatalog: Send + Sync {
    fn mockability(&self, resource_name: &str) -> Result<Mockability>;
    fn resource_status(&self) -> Result<ResourceStatus>;
}

#[derive(Debug, Clone, Deserialize)]
struct ResourceEntry {
    #[serde(default)]
    service: Option<String>,
    #[serde(default, rename = "dependsOn")]
    depends_on: Vec<Dependency>,
    #[serde(default)]
    output: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct Dependency {
    category: String,
    #[serde(rename = "resourceName")]
    resource_name: String,
}

/// Parsed project metadata.
#[derive(Debug, Clone, Default)]
pub struct ProjectMeta {
    categories: BTreeMap<String, BTreeMap<String, ResourceEntry>>,
    region: Option<String>,
}

impl ProjectMeta {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            MockError::Config(format!(
                "Could not read project metadata at {}: {}",
                path.display(),
                e
            ))
        })?;
        let doc: Value = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;
        Self::from_value(doc)
    }

    pub fn from_value(doc: Value) -> Result<Self> {
        let Value::Object(top) = doc else {
            return Err(
                MockError::Config("Project metadata must be a JSON object".to_string()).into(),
            );
        };

        let mut meta = ProjectMeta::default();
        for (category, resources) in top {
            if category == "providers" {
                meta.region = resources
                    .pointer("/awscloudformation/Region")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                continue;
            }
            let Value::Object(resources) = resources else {
                continue;
            };

            let mut entries = BTreeMap::new();
            for (name, entry) in resources {
                match serde_json::from_value::<ResourceEntry>(entry) {
                    Ok(entry) => {
                        entries.insert(name, entry);
                    }
                    Err(e) => warn!("Skipping malformed metadata for {}/{}: {}", category, name, e),
                }
            }
            meta.categories.insert(category, entries);
        }

        debug!(categories = meta.categories.len(), "Parsed project metadata");
        Ok(meta)
    }

    fn function(&self, name: &str) -> Option<&ResourceEntry> {
        self.categories.get(FUNCTION_CATEGORY)?.get(name)
    }

    fn is_layer(&self, name: &str) -> bool {
        self.function(name)
            .and_then(|entry| entry.service.as_deref())
            == Some(LAYER_SERVICE)
    }

    pub fn check_mockable(&self, resource_name: &str) -> Mockability {
        let Some(entry) = self.function(resource_name) else {
            return Mockability::NotMockable {
                reason: format!(
                    "Could not find the specified {}: {}",
                    FUNCTION_CATEGORY, resource_name
                ),
            };
        };

        if entry.service.as_deref() == Some(LAYER_SERVICE) {
            return Mockability::NotMockable {
                reason: "Lambda layers cannot be mocked locally.".to_string(),
            };
        }

        let uses_layers = entry
            .depends_on
            .iter()
            .any(|dep| dep.category == FUNCTION_CATEGORY && self.is_layer(&dep.resource_name));
        if uses_layers {
            return Mockability::NotMockable {
                reason: "Mocking a function with layers is not supported. \
                         Deploy the function and test it in the cloud instead."
                    .to_string(),
            };
        }

        Mockability::Mockable
    }

    pub fn status(&self) -> ResourceStatus {
        let resources = self
            .categories
            .iter()
            .flat_map(|(category, entries)| {
                entries.iter().map(move |(name, entry)| ProvisionedResource {
                    category: category.clone(),
                    resource_name: name.clone(),
                    service: entry.service.clone(),
                    output: entry.output.clone(),
                })
            })
            .collect();

        ResourceStatus {
            resources,
            region: self.region.clone(),
        }
    }
}

impl ResourceCatalog for ProjectMeta {
    fn mockability(&self, resource_name: &str) -> Result<Mockability> {
        Ok(self.check_mockable(resource_name))
    }

    fn resource_status(&self) -> Result<ResourceStatus> {
        Ok(self.status())
    }
}
