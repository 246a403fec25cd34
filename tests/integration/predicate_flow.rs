use jsonpaths::domain::error::MatcherError;
use jsonpaths::domain::matcher::Matcher;
use jsonpaths::domain::value::Value;
use jsonpaths::engine::predicate::compile_predicate;
use serde_json::json;

#[test]
fn equality_matcher_leaves_numbers_unquoted() {
    let body = Value::from_json(json!({"id": 5})).expect("decode");
    let expression =
        compile_predicate(&Matcher::by_equality("$.id"), Some(&body)).expect("compile");
    assert_eq!(expression, "$[?(@.id == 5)]");
}

#[test]
fn occurrence_bounds_are_joined() {
    let expression = compile_predicate(&Matcher::by_type("$.tags", Some(1), Some(3)), None)
        .expect("compile");
    assert_eq!(expression, "$[?(@.tags.size() >= 1 && @.tags.size() <= 3)]");
}

#[test]
fn bracketed_keys_stay_whole() {
    let body = Value::from_json(json!({"meta": {"a.b": "x"}})).expect("decode");
    let expression =
        compile_predicate(&Matcher::by_equality("$.meta['a.b']"), Some(&body)).expect("compile");
    assert_eq!(expression, "$.meta[?(@['a.b'] == 'x')]");
}

#[test]
fn nested_equality_reads_array_members() {
    let body = Value::from_json(json!({"items": [{"id": "a"}, {"id": "b"}]})).expect("decode");
    let expression = compile_predicate(&Matcher::by_equality("$.items[1].id"), Some(&body))
        .expect("compile");
    assert_eq!(expression, "$.items[1][?(@.id == 'b')]");
}

#[test]
fn container_values_are_not_comparable() {
    let body = Value::from_json(json!({"items": [1]})).expect("decode");
    let error = compile_predicate(&Matcher::by_equality("$.items"), Some(&body))
        .expect_err("must fail");
    assert!(matches!(
        error,
        MatcherError::UnsupportedValue { kind: "array", .. }
    ));
}

#[test]
fn malformed_paths_are_configuration_errors() {
    let error = compile_predicate(&Matcher::by_regex("items", "x"), None).expect_err("must fail");
    assert!(matches!(error, MatcherError::InvalidPath(_)));
    assert!(error.is_configuration());
}
