use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_facadex_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("facadex")
}

fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(filename)
}

#[test]
fn test_facades_json_output() {
    let mut cmd = Command::new(get_facadex_bin());
    cmd.arg("facades")
        .arg(fixture_path("page.har"))
        .arg("--tasks")
        .arg(fixture_path("tasks.json"))
        .arg("--format")
        .arg("json")
        .env_remove("FACADEX_ENTITIES");

    let output = cmd.assert().success().get_output().stdout.clone();
    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(report["not_applicable"], false);
    assert_eq!(report["wasted_bytes"], 691_500);
    assert_eq!(report["wasted_ms"], 280.0);
    assert_eq!(report["rows"].as_array().unwrap().len(), 2);
}

#[test]
fn test_facades_reads_tasks_from_env() {
    let mut cmd = Command::new(get_facadex_bin());
    cmd.arg("facades")
        .arg(fixture_path("page.har"))
        .arg("--format")
        .arg("json")
        .env("FACADEX_TASKS", fixture_path("tasks.json"))
        .env_remove("FACADEX_ENTITIES");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"wasted_ms\": 280.0"));
}

#[test]
fn test_facades_table_output() {
    let mut cmd = Command::new(get_facadex_bin());
    cmd.arg("facades")
        .arg(fixture_path("page.har"))
        .arg("--format")
        .arg("table")
        .env_remove("FACADEX_ENTITIES");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Product,Entity,URL,Transfer Size (bytes),Blocking Time (ms)",
        ))
        .stdout(predicate::str::contains(
            "YouTube Embedded Player (Video),YouTube,,529500,0",
        ));
}

#[test]
fn test_facades_pretty_output_not_applicable() {
    let mut cmd = Command::new(get_facadex_bin());
    cmd.arg("facades")
        .arg(fixture_path("first-party-only.har"))
        .env_remove("FACADEX_ENTITIES");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Third-Party Facades"))
        .stdout(predicate::str::contains("No third-party embeds"));
}

#[test]
fn test_facades_missing_file_fails() {
    let mut cmd = Command::new(get_facadex_bin());
    cmd.arg("facades").arg(fixture_path("missing.har"));

    cmd.assert().failure();
}

#[test]
fn test_entities_facadable_only_table() {
    let mut cmd = Command::new(get_facadex_bin());
    cmd.arg("entities")
        .arg("--facadable-only")
        .arg("--format")
        .arg("table")
        .env_remove("FACADEX_ENTITIES");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Entity,Product,Label,Facades"))
        .stdout(predicate::str::contains("Intercom,Intercom Widget"))
        .stdout(predicate::str::contains("Google Analytics").not());
}

#[test]
fn test_entities_from_custom_file() {
    let mut cmd = Command::new(get_facadex_bin());
    cmd.arg("entities")
        .arg("--format")
        .arg("json")
        .arg("--entities")
        .arg(fixture_path("entities.json"));

    let output = cmd.assert().success().get_output().stdout.clone();
    let entities: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(entities.as_array().unwrap().len(), 2);
}

#[test]
fn test_completion_bash_generates_script() {
    let mut cmd = Command::new(get_facadex_bin());
    cmd.arg("completion").arg("--shell").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("_facadex()"))
        .stdout(predicate::str::contains("complete -F _facadex"));
}

#[test]
fn test_completion_help_lists_shells() {
    let mut cmd = Command::new(get_facadex_bin());
    cmd.arg("completion").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Generate shell completion scripts"))
        .stdout(predicate::str::contains("SUPPORTED SHELLS"))
        .stdout(predicate::str::contains("~/.bashrc"));
}
