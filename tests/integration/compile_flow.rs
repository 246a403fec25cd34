use jsonpaths::config::CompilerConfig;
use jsonpaths::domain::assertion::Check;
use jsonpaths::domain::matcher::Matcher;
use jsonpaths::domain::value::{Template, Value};
use jsonpaths::engine::template::TemplateResolver;
use jsonpaths::engine::{CompileOptions, compile_body, compile_body_with_resolver};
use serde_json::json;

fn doc(raw: serde_json::Value) -> Value {
    Value::from_json(raw).expect("decode body")
}

fn json_paths(body: &Value, matchers: &[Matcher], options: CompileOptions) -> Vec<String> {
    compile_body(Some(body), matchers, options)
        .expect("compile body")
        .assertions
        .iter()
        .map(|assertion| assertion.json_path())
        .collect()
}

#[test]
fn compiles_nested_document() {
    let body = doc(json!({
        "id": 5,
        "customer": {"name": "ada", "vip": true},
        "lines": [{"sku": "a1", "qty": 2}, {"sku": "b2", "qty": 1}],
        "tags": ["new", "gift"]
    }));
    let paths = json_paths(&body, &[], CompileOptions::default());

    for expected in [
        "$[?(@.id == 5)]",
        "$.customer[?(@.name == 'ada')]",
        "$.customer[?(@.vip == true)]",
        "$.lines[*][?(@.sku == 'a1')]",
        "$.lines[*][?(@.qty == 1)]",
        "$[?(@.tags.size() == 2)]",
        "$.tags[?(@ == 'gift')]",
    ] {
        assert!(
            paths.contains(&expected.to_string()),
            "missing {expected} in {paths:?}"
        );
    }
}

#[test]
fn size_toggle_controls_has_size() {
    let body = doc(json!({"items": ["a", "b", "c"], "n": 0}));
    let enabled = compile_body(Some(&body), &[], CompileOptions::default()).expect("compile");
    assert_eq!(
        enabled
            .assertions
            .at_path("$.items")
            .map(|assertion| assertion.check().clone())
            .collect::<Vec<_>>(),
        vec![Check::HasSize(3)]
    );

    let disabled = CompileOptions {
        config: CompilerConfig {
            assert_array_size: false,
        },
        size_override: None,
    };
    let compiled = compile_body(Some(&body), &[], disabled).expect("compile");
    assert_eq!(compiled.assertions.at_path("$.items").count(), 0);
}

#[test]
fn empty_containers_assert_emptiness_only_when_genuine() {
    let body = doc(json!({"items": []}));
    let compiled = compile_body(Some(&body), &[], CompileOptions::default()).expect("compile");
    assert_eq!(compiled.assertions.len(), 1);
    let only = compiled.assertions.iter().next().expect("one assertion");
    assert_eq!(only.path().to_string(), "$.items");
    assert_eq!(only.check(), &Check::IsEmpty);

    let body = doc(json!({"items": [{"x": 1}], "id": 1}));
    let compiled = compile_body(
        Some(&body),
        &[Matcher::by_type("$.items[0]", Some(1), None)],
        CompileOptions::default(),
    )
    .expect("compile");
    assert_eq!(compiled.assertions.at_path("$.items").count(), 0);

    let body = doc(json!({"items": [], "other": [{"x": 1}]}));
    let compiled = compile_body(
        Some(&body),
        &[Matcher::by_regex("$.other[0].x", "[0-9]")],
        CompileOptions::default(),
    )
    .expect("compile");
    let items: Vec<Check> = compiled
        .assertions
        .at_path("$.items")
        .map(|assertion| assertion.check().clone())
        .collect();
    assert_eq!(items, vec![Check::IsEmpty]);
    assert_eq!(compiled.assertions.at_path("$.other").count(), 0);
}

#[test]
fn matcher_covering_the_only_element_leaves_nothing_to_assert() {
    let body = doc(json!({"items": [{"x": 1}]}));
    let compiled = compile_body(
        Some(&body),
        &[Matcher::by_type("$.items[0]", Some(1), None)],
        CompileOptions::default(),
    )
    .expect("compile");
    assert!(
        compiled
            .assertions
            .iter()
            .all(|assertion| assertion.check() != &Check::IsEmpty)
    );
    assert!(compiled.assertions.is_empty());
    assert_eq!(compiled.matchers.len(), 1);
}

#[test]
fn deferred_values_never_produce_assertions() {
    let body = doc(json!({
        "token": {"$deferred": "assertToken($it)"},
        "nested": {"inner": {"$deferred": "check()"}, "n": 1}
    }));
    let compiled = compile_body(Some(&body), &[], CompileOptions::default()).expect("compile");
    assert!(compiled.assertions.at_path("$.token").next().is_none());
    assert!(compiled.assertions.at_path("$.nested.inner").next().is_none());
    assert_eq!(compiled.assertions.at_path("$.nested.n").count(), 1);
}

#[test]
fn stringified_json_is_traversed_as_nested_object() {
    let body = doc(json!({"payload": "{\"a\":1}", "id": 3}));
    let paths = json_paths(&body, &[], CompileOptions::default());
    assert!(paths.contains(&"$.payload[?(@.a == 1)]".to_string()));
    assert!(!paths.iter().any(|path| path.contains("@.payload ==")));
}

#[test]
fn placeholders_become_regex_checks() {
    let body = doc(json!({
        "id": {"$regex": "[0-9]+"},
        "note": {"$optional": "[a-z]+"},
        "ref": {"$template": ["id:", {"$regex": "[0-9]+"}]}
    }));
    let compiled = compile_body(Some(&body), &[], CompileOptions::default()).expect("compile");
    let check_at = |path: &str| {
        compiled
            .assertions
            .at_path(path)
            .map(|assertion| assertion.check().clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(check_at("$.id"), vec![Check::MatchesRegex("[0-9]+".to_string())]);
    assert_eq!(
        check_at("$.note"),
        vec![Check::MatchesRegex("([a-z]+)?".to_string())]
    );
    assert_eq!(
        check_at("$.ref"),
        vec![Check::MatchesRegex("id:[0-9]+".to_string())]
    );
}

struct AnyValueResolver;

impl TemplateResolver for AnyValueResolver {
    fn to_regex(&self, _template: &Template) -> String {
        ".+".to_string()
    }
}

#[test]
fn template_resolution_is_pluggable() {
    let body = doc(json!({"ref": {"$template": ["id:", {"$regex": "[0-9]+"}]}}));
    let compiled =
        compile_body_with_resolver(Some(&body), &[], CompileOptions::default(), &AnyValueResolver)
            .expect("compile");
    let checks: Vec<Check> = compiled
        .assertions
        .iter()
        .map(|assertion| assertion.check().clone())
        .collect();
    assert_eq!(checks, vec![Check::MatchesRegex(".+".to_string())]);
}

#[test]
fn serialized_output_lists_assertions_and_matchers() {
    let body = doc(json!({"id": 5, "name": "n"}));
    let compiled = compile_body(
        Some(&body),
        &[Matcher::by_equality("$.id")],
        CompileOptions::default(),
    )
    .expect("compile");
    assert_eq!(
        serde_json::to_value(&compiled).expect("serialize"),
        json!({
            "assertions": [{
                "path": "$.name",
                "check": "equals",
                "value": "n",
                "json_path": "$[?(@.name == 'n')]"
            }],
            "matchers": [{
                "path": "$.id",
                "type": "by_equality",
                "expression": "$[?(@.id == 5)]"
            }]
        })
    );
}
