use predicates::prelude::predicate;

#[test]
fn prints_pruned_body_as_json() {
    assert_cmd::cargo::cargo_bin_cmd!("jsonpaths")
        .args(["prune", "--contract", "-"])
        .write_stdin(
            r#"{"body": {"items": [{"id": 1}], "name": "n"},
                "matchers": [{"path": "$.items[0].id", "type": "by_regex", "value": "[0-9]+"}]}"#,
        )
        .assert()
        .code(0)
        .stdout(predicate::str::diff("{\"name\":\"n\"}\n"));
}

#[test]
fn prints_pruned_body_as_yaml() {
    assert_cmd::cargo::cargo_bin_cmd!("jsonpaths")
        .args(["prune", "--to", "yaml"])
        .write_stdin(r#"{"body": {"id": 1, "name": "n"}, "matchers": [{"path": "$.id", "type": "by_equality"}]}"#)
        .assert()
        .code(0)
        .stdout(predicate::str::diff("name: n\n"));
}

#[test]
fn contract_without_body_is_rejected() {
    assert_cmd::cargo::cargo_bin_cmd!("jsonpaths")
        .arg("prune")
        .write_stdin(r#"{"matchers": []}"#)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("contract has no body"));
}
