//! Environment hydration.
//!
//! Symbolic references left in a [`LambdaConfig`](super::LambdaConfig)'s
//! environment are answered from the provisioned resources. A reference named
//! `<category><resourceName><outputKey>` resolves to that resource's output;
//! `AWS::Region` resolves to the project region.

use super::parser::EnvValue;
use crate::project::ResourceStatus;
use crate::MockError;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

pub type HydratedEnvironment = BTreeMap<String, String>;

const REGION_REF: &str = "AWS::Region";

pub fn hydrate_env_vars(
    status: &ResourceStatus,
    declared: &BTreeMap<String, EnvValue>,
) -> Result<HydratedEnvironment, MockError> {
    let mut hydrated = HydratedEnvironment::new();
    for (variable, value) in declared {
        let resolved = match value {
            EnvValue::Literal(literal) => literal.clone(),
            EnvValue::Ref(reference) => {
                lookup(status, reference).ok_or_else(|| MockError::UnresolvedReference {
                    variable: variable.clone(),
                    reference: reference.clone(),
                })?
            }
        };
        hydrated.insert(variable.clone(), resolved);
    }
    debug!(count = hydrated.len(), "Hydrated environment variables");
    Ok(hydrated)
}

fn lookup(status: &ResourceStatus, reference: &str) -> Option<String> {
    if reference == REGION_REF {
        return status.region.clone();
    }

    status.resources.iter().find_map(|resource| {
        let key = reference
            .strip_prefix(resource.category.as_str())?
            .strip_prefix(resource.resource_name.as_str())?;
        resource.output.get(key).map(stringify)
    })
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
