#![cfg(unix)]

use crate::common::funcmock;
use crate::common::project;
use predicates::prelude::*;
use std::time::{Duration, Instant};

#[test]
fn prints_result_then_finish_marker() {
    let project = project(
        "read -r event\n\
         echo \"event=$event table=$TABLE env=$ENV handler=$_HANDLER\"\n\
         echo '__FUNCMOCK_RESULT__{\"statusCode\": 200}'\n",
    );

    let output = funcmock(project.path())
        .args(["--event", "sample.json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("event={\"key\":\"value\"} table=users-dev env=dev handler=index.handler"));
    let result_at = stdout.find("Result:\n{\"statusCode\":200}").unwrap();
    let finished_at = stdout.find("Finished execution.").unwrap();
    assert!(result_at < finished_at);
}

#[test]
fn timeout_is_reported_and_run_completes() {
    let project = project("exec sleep 30\n");

    let started = Instant::now();
    funcmock(project.path())
        .args(["--event", "sample.json", "--timeout", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("myFunction failed with the following error:"))
        .stdout(predicate::str::contains("timed out after 1 seconds"))
        .stdout(predicate::str::contains("Finished execution."));
    assert!(started.elapsed() < Duration::from_secs(20));
}

#[test]
fn handler_error_is_not_fatal() {
    let project = project("echo '__FUNCMOCK_ERROR__\"Error: table not found\"'\nexit 1\n");

    funcmock(project.path())
        .args(["--event", "sample.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Error: table not found"))
        .stdout(predicate::str::contains("Finished execution."));
}

#[test]
fn undefined_result_prints_empty_line() {
    let project = project("echo '__FUNCMOCK_RESULT__'\n");

    funcmock(project.path())
        .args(["--event", "sample.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Result:\n\nFinished execution."));
}
