#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const FUNCTION: &str = "myFunction";

/// Build a `funcmock` command rooted at `project`.
pub fn funcmock(project: &Path) -> Command {
    let mut cmd = Command::cargo_bin("funcmock").unwrap();
    cmd.env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("function")
        .arg(FUNCTION)
        .arg("--project-dir")
        .arg(project);
    cmd
}

pub fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn function_dir(rel: &str) -> String {
    format!("amplify/backend/function/{}/{}", FUNCTION, rel)
}

pub fn template(handler: Option<&str>) -> Value {
    let mut properties = json!({
        "Runtime": "provided.al2",
        "Environment": {
            "Variables": {
                "ENV": { "Ref": "env" },
                "TABLE": { "Ref": "storageusersName" }
            }
        }
    });
    if let Some(handler) = handler {
        properties["Handler"] = json!(handler);
    }
    json!({
        "Resources": {
            "LambdaFunction": { "Type": "AWS::Lambda::Function", "Properties": properties }
        }
    })
}

/// A project with one function backed by a shell bootstrap.
pub fn project(bootstrap: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(root, "amplify/.config/local-env-info.json", r#"{"envName": "dev"}"#);
    write(
        root,
        "amplify/backend/amplify-meta.json",
        &json!({
            "providers": { "awscloudformation": { "Region": "us-east-1" } },
            "function": {
                "myFunction": {
                    "service": "Lambda",
                    "dependsOn": [{ "category": "storage", "resourceName": "users", "attributes": ["Name"] }]
                }
            },
            "storage": { "users": { "service": "DynamoDB", "output": { "Name": "users-dev" } } }
        })
        .to_string(),
    );
    write(
        root,
        &function_dir(&format!("{}-cloudformation-template.json", FUNCTION)),
        &template(Some("index.handler")).to_string(),
    );
    write(root, &function_dir("sample.json"), r#"{"key":"value"}"#);
    write(root, &function_dir("src/bootstrap.sh"), bootstrap);
    write(root, "funcmock.toml", "[runtime]\ncustom = [\"sh\", \"bootstrap.sh\"]\n");

    dir
}

pub fn replace_template(project: &Path, template: &Value) {
    write(
        project,
        &function_dir(&format!("{}-cloudformation-template.json", FUNCTION)),
        &template.to_string(),
    );
}
