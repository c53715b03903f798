use crate::common::{funcmock, project, replace_template, template, write, FUNCTION};
use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn unknown_function_is_not_mockable() {
    let project = project("exit 0\n");
    Command::cargo_bin("funcmock")
        .unwrap()
        .env("NO_COLOR", "1")
        .args(["function", "ghost", "--event", "sample.json", "--project-dir"])
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Unable to mock ghost. Could not find the specified function: ghost",
        ));
}

#[test]
fn missing_handler_fails_before_running() {
    let project = project("echo ran\n");
    replace_template(project.path(), &template(None));

    funcmock(project.path())
        .args(["--event", "sample.json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Starting execution...").not())
        .stderr(predicate::str::contains(format!(
            "Could not parse handler for {} from cloudformation file",
            FUNCTION
        )));
}

#[test]
fn missing_environment_is_reported() {
    let project = project("exit 0\n");
    std::fs::remove_file(project.path().join("amplify/.config/local-env-info.json")).unwrap();

    funcmock(project.path())
        .args(["--event", "sample.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No environment selected"));
}

#[test]
fn missing_event_file_is_fatal() {
    let project = project("exit 0\n");
    funcmock(project.path())
        .args(["--event", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load event"));
}

#[test]
fn layered_function_is_not_mockable() {
    let project = project("exit 0\n");
    write(
        project.path(),
        "amplify/backend/amplify-meta.json",
        r#"{
            "function": {
                "myFunction": {
                    "service": "Lambda",
                    "dependsOn": [{ "category": "function", "resourceName": "shared" }]
                },
                "shared": { "service": "LambdaLayer" }
            }
        }"#,
    );

    funcmock(project.path())
        .args(["--event", "sample.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("layers is not supported"));
}
