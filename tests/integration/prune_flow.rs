use jsonpaths::domain::matcher::Matcher;
use jsonpaths::domain::value::Value;
use jsonpaths::engine::prune::remove_matching_paths;
use serde_json::json;

fn doc(raw: serde_json::Value) -> Value {
    Value::from_json(raw).expect("decode body")
}

fn regex_matchers(paths: &[&str]) -> Vec<Matcher> {
    paths
        .iter()
        .map(|path| Matcher::by_regex(*path, ".+"))
        .collect()
}

#[test]
fn pruning_twice_gives_the_same_result() {
    let original = doc(json!({
        "orders": [{"id": 1, "lines": [{"sku": "a"}]}, {"id": 2, "lines": []}],
        "meta": {"trace": "x", "at": 1}
    }));
    let matchers = regex_matchers(&["$.orders[*].lines[*].sku", "$.meta.trace", "$.orders[1]"]);

    let first = remove_matching_paths(&original, &matchers);
    let second = remove_matching_paths(&original, &matchers);
    assert_eq!(first.document, second.document);
    assert_eq!(first.deleted_paths, second.deleted_paths);
}

#[test]
fn later_indexes_are_removed_first() {
    let pruned = remove_matching_paths(
        &doc(json!({"a": ["x", "y", "z"]})),
        &regex_matchers(&["$.a[0]", "$.a[1]"]),
    );
    assert_eq!(pruned.document.to_json(), json!({"a": ["z"]}));
    let order: Vec<String> = pruned
        .deleted_paths
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(order, vec!["$.a[1]".to_string(), "$.a[0]".to_string()]);
}

#[test]
fn double_digit_indexes_sort_numerically() {
    let items: Vec<serde_json::Value> = (0..12).map(|index| json!(index)).collect();
    let pruned = remove_matching_paths(
        &doc(json!({ "a": items })),
        &regex_matchers(&["$.a[2]", "$.a[10]"]),
    );
    let remaining = pruned.document.to_json();
    assert_eq!(remaining["a"].as_array().map(Vec::len), Some(10));
    assert!(!remaining["a"].as_array().expect("array").contains(&json!(10)));
    assert!(!remaining["a"].as_array().expect("array").contains(&json!(2)));
}

#[test]
fn root_is_never_deleted() {
    for (body, path) in [
        (json!({"a": 1}), "$.a"),
        (json!([{"a": 1}]), "$[0].a"),
        (json!([[1]]), "$[0][0]"),
        (json!({"a": {"b": 1}}), "$..b"),
    ] {
        let pruned = remove_matching_paths(&doc(body), &regex_matchers(&[path]));
        assert!(
            pruned.document.is_container(),
            "root vanished for {path}: {:?}",
            pruned.document
        );
        assert!(pruned.document.is_empty_container(), "root not cleared for {path}");
    }
}

#[test]
fn root_matcher_is_skipped() {
    let original = doc(json!({"a": 1}));
    let pruned = remove_matching_paths(&original, &regex_matchers(&["$"]));
    assert_eq!(pruned.document, original);
    assert!(pruned.deleted_paths.is_empty());
}
