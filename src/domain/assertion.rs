use std::collections::BTreeMap;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::domain::json_path::{self, JsonPath};
use crate::domain::value::Value;

/// Concrete check attached to a finished path.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    Equals(Value),
    MatchesRegex(String),
    HasSize(usize),
    IsEmpty,
    Contains(Value),
}

impl Check {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Equals(_) => "equals",
            Self::MatchesRegex(_) => "matches_regex",
            Self::HasSize(_) => "has_size",
            Self::IsEmpty => "is_empty",
            Self::Contains(_) => "contains",
        }
    }

    /// Argument of the check in JSON form; `None` for `IsEmpty`.
    pub fn argument(&self) -> Option<serde_json::Value> {
        match self {
            Self::Equals(value) | Self::Contains(value) => Some(value.to_json()),
            Self::MatchesRegex(pattern) => Some(serde_json::Value::String(pattern.clone())),
            Self::HasSize(size) => Some(serde_json::Value::from(*size)),
            Self::IsEmpty => None,
        }
    }

    /// Whether one addressed node satisfies the check.
    pub fn accepts(&self, node: &Value) -> bool {
        match self {
            Self::Equals(expected) | Self::Contains(expected) => node == expected,
            Self::MatchesRegex(pattern) => {
                let Some(text) = scalar_text(node) else {
                    return false;
                };
                Regex::new(&format!("^(?:{pattern})$")).is_ok_and(|regex| regex.is_match(&text))
            }
            Self::HasSize(size) => matches!(node, Value::Array(items) if items.len() == *size),
            Self::IsEmpty => node.is_empty_container(),
        }
    }

    fn predicate(&self) -> String {
        match self {
            Self::Equals(value) | Self::Contains(value) => format!(" == {}", literal(value)),
            Self::MatchesRegex(pattern) => format!(" =~ {}", json_path::regex_literal(pattern)),
            Self::HasSize(size) => format!(".size() == {size}"),
            Self::IsEmpty => " empty true".to_string(),
        }
    }
}

/// A path paired with the check that verifies it.
///
/// Only built by finishing a pending path, so every value of this type is a
/// finished assertion.
#[derive(Debug, Clone, PartialEq)]
pub struct PathAssertion {
    path: JsonPath,
    check: Check,
}

impl PathAssertion {
    pub(crate) fn new(path: JsonPath, check: Check) -> Self {
        Self { path, check }
    }

    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    pub fn check(&self) -> &Check {
        &self.check
    }

    /// Filter-query form: `$.a[?(@.b == 'x')]`, `$.items[?(@ == 1)]`.
    ///
    /// Element checks on `…[*]` filter the owning array directly.
    pub fn json_path(&self) -> String {
        let (owner, subject) = match self.path.parent() {
            Some(owner) if self.path.ends_with_wildcard() => (owner, "@".to_string()),
            _ => self.path.split_property(),
        };
        format!("{owner}[?({subject}{})]", self.check.predicate())
    }
}

impl Serialize for PathAssertion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Record<'a> {
            path: &'a JsonPath,
            check: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            value: Option<serde_json::Value>,
            json_path: String,
        }

        Record {
            path: &self.path,
            check: self.check.kind(),
            value: self.check.argument(),
            json_path: self.json_path(),
        }
        .serialize(serializer)
    }
}

/// Finished assertions keyed by their filter-query identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssertionSet {
    entries: BTreeMap<String, PathAssertion>,
}

impl AssertionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assertion; an existing entry with the same identity is replaced.
    pub fn insert(&mut self, assertion: PathAssertion) {
        self.entries.insert(assertion.json_path(), assertion);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathAssertion> {
        self.entries.values()
    }

    /// Keeps only the assertions for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&PathAssertion) -> bool) {
        self.entries.retain(|_, assertion| keep(assertion));
    }

    /// All assertions addressing `path`, whatever their check.
    pub fn at_path<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a PathAssertion> {
        self.iter()
            .filter(move |assertion| assertion.path().to_string() == path)
    }
}

impl Serialize for AssertionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(text) => json_path::quote(text),
        other => other.to_json().to_string(),
    }
}

fn scalar_text(node: &Value) -> Option<String> {
    match node {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null => Some("null".to_string()),
        _ => None,
    }
}
