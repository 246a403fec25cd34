use std::fs;

use predicates::prelude::{PredicateBooleanExt, predicate};
use serde_json::{Value, json};
use tempfile::tempdir;

const CONTRACT: &str = r#"{
    "body": {"id": 5, "tags": ["a", "b"], "name": {"$regex": "[a-z]+"}},
    "matchers": [{"path": "$.id", "type": "by_equality"}]
}"#;

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout is json")
}

#[test]
fn compiles_contract_from_stdin() {
    let assert = assert_cmd::cargo::cargo_bin_cmd!("jsonpaths")
        .arg("compile")
        .env_remove("JSONPATHS_ASSERT_ARRAY_SIZE")
        .write_stdin(CONTRACT)
        .assert()
        .code(0);
    let payload = stdout_json(&assert.get_output().stdout);

    assert_eq!(payload["matchers"][0]["expression"], json!("$[?(@.id == 5)]"));
    let json_paths: Vec<&str> = payload["assertions"]
        .as_array()
        .expect("assertions")
        .iter()
        .filter_map(|assertion| assertion["json_path"].as_str())
        .collect();
    assert!(json_paths.contains(&"$[?(@.tags.size() == 2)]"));
    assert!(json_paths.contains(&"$[?(@.name =~ /([a-z]+)/)]"));
    assert!(!json_paths.iter().any(|path| path.contains("@.id")));
}

#[test]
fn reads_yaml_contract_file() {
    let dir = tempdir().expect("temp dir");
    let contract = dir.path().join("contract.yaml");
    fs::write(
        &contract,
        "body:\n  tags: [x]\nmatchers:\n  - path: $.tags\n    type: by_type\n    min_occurrence: 1\n",
    )
    .expect("write contract");

    assert_cmd::cargo::cargo_bin_cmd!("jsonpaths")
        .arg("compile")
        .arg("--contract")
        .arg(&contract)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("$[?(@.tags.size() >= 1)]"));
}

#[test]
fn environment_override_disables_size_checks() {
    assert_cmd::cargo::cargo_bin_cmd!("jsonpaths")
        .args(["compile", "--assert-array-size", "true"])
        .env("JSONPATHS_ASSERT_ARRAY_SIZE", "false")
        .write_stdin(CONTRACT)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("has_size").not());
}

#[test]
fn config_file_disables_size_checks() {
    let dir = tempdir().expect("temp dir");
    let config = dir.path().join("jsonpaths.toml");
    fs::write(&config, "[compiler]\nassert_array_size = false\n").expect("write config");

    assert_cmd::cargo::cargo_bin_cmd!("jsonpaths")
        .arg("compile")
        .arg("--config")
        .arg(&config)
        .env_remove("JSONPATHS_ASSERT_ARRAY_SIZE")
        .write_stdin(CONTRACT)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("has_size").not());
}

#[test]
fn invalid_environment_override_is_rejected() {
    assert_cmd::cargo::cargo_bin_cmd!("jsonpaths")
        .arg("compile")
        .env("JSONPATHS_ASSERT_ARRAY_SIZE", "sometimes")
        .write_stdin(CONTRACT)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("JSONPATHS_ASSERT_ARRAY_SIZE"));
}

#[test]
fn unresolved_equality_path_reports_document() {
    assert_cmd::cargo::cargo_bin_cmd!("jsonpaths")
        .arg("compile")
        .env_remove("JSONPATHS_ASSERT_ARRAY_SIZE")
        .write_stdin(r#"{"body": {"a": 1}, "matchers": [{"path": "$.b", "type": "by_equality"}]}"#)
        .assert()
        .code(3)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("matcher_error"))
        .stderr(predicate::str::contains(r#"{\"a\":1}"#));
}

#[test]
fn missing_contract_file_is_input_usage_error() {
    let dir = tempdir().expect("temp dir");
    assert_cmd::cargo::cargo_bin_cmd!("jsonpaths")
        .arg("compile")
        .arg("--contract")
        .arg(dir.path().join("absent.json"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("input_usage_error"));
}
