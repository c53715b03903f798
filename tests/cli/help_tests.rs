use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn top_level_help_lists_function_command() {
    Command::cargo_bin("funcmock")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("function"));
}

#[test]
fn function_help_documents_flags() {
    Command::cargo_bin("funcmock")
        .unwrap()
        .args(["function", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--event"))
        .stdout(predicate::str::contains("--timeout"));
}

#[test]
fn function_requires_resource_name() {
    Command::cargo_bin("funcmock")
        .unwrap()
        .arg("function")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<NAME>"));
}
