use std::collections::BTreeMap;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, trace};

use crate::domain::assertion::{AssertionSet, PathAssertion};
use crate::domain::json_path::Segment;
use crate::domain::value::Value;
use crate::engine::builder::PendingPath;
use crate::engine::template::TemplateResolver;

/// Outcome of attaching a value check to a pending path.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    Finished(PathAssertion),
    /// Deferred values are verified elsewhere; the path is handed back unfinished.
    Deferred(PendingPath),
}

#[derive(Debug, Error)]
pub enum LeafError {
    #[error("template at `{path}` resolves to invalid regex `{pattern}`: {source}")]
    InvalidTemplate {
        path: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Picks the value check for a leaf.
pub fn value_to_asserter(
    path: PendingPath,
    value: &Value,
    resolver: &dyn TemplateResolver,
) -> Result<Emission, LeafError> {
    let assertion = match value {
        Value::Pattern(pattern) => path.matches(pattern.as_str()),
        Value::Optional(pattern) => path.matches(pattern.optional_source()),
        Value::Template(template) => {
            let pattern = resolver.to_regex(template);
            if let Err(source) = Regex::new(&pattern) {
                return Err(LeafError::InvalidTemplate {
                    path: path.to_string(),
                    pattern,
                    source,
                });
            }
            path.matches(pattern)
        }
        Value::Deferred(_) => return Ok(Emission::Deferred(path)),
        other if path.is_member() => path.contains(other.clone()),
        other => path.is_equal_to(other.clone()),
    };
    Ok(Emission::Finished(assertion))
}

/// Walks a document and emits one finished assertion per leaf.
pub fn collect_assertions(
    document: &Value,
    size_check: bool,
    resolver: &dyn TemplateResolver,
) -> AssertionSet {
    let traversal = Traversal {
        size_check,
        resolver,
    };
    let mut out = AssertionSet::new();
    traversal.traverse(PendingPath::root(), document, &mut out);
    out
}

/// Node shapes in dispatch priority order; the first that applies wins.
enum Shape<'v> {
    /// String holding a serialized JSON object.
    EmbeddedObject(BTreeMap<String, Value>),
    /// One non-collection entry, or only string/number/boolean values.
    FlatRecord(&'v BTreeMap<String, Value>),
    Object(&'v BTreeMap<String, Value>),
    EmptyObject,
    NamelessPrimitiveArray(&'v [Value]),
    PrimitiveArray(&'v [Value]),
    CompositeArray(&'v [Value]),
    EmptyArray,
    IteratedScalar,
    Leaf,
}

struct Traversal<'r> {
    size_check: bool,
    resolver: &'r dyn TemplateResolver,
}

impl Traversal<'_> {
    fn traverse(&self, path: PendingPath, value: &Value, out: &mut AssertionSet) {
        match classify(&path, value) {
            Shape::EmbeddedObject(map) => self.traverse(path, &Value::Object(map), out),
            Shape::FlatRecord(map) => {
                for (key, child) in map {
                    self.traverse(path.field(key), child, out);
                }
            }
            Shape::Object(map) => {
                for (key, child) in map {
                    self.traverse(entry_path(&path, key, child), child, out);
                }
            }
            Shape::EmptyObject | Shape::EmptyArray => out.insert(path.is_empty()),
            Shape::NamelessPrimitiveArray(items) => {
                self.check_size(&path, items, out);
                let member = path.element();
                for item in items {
                    self.traverse(member.clone(), item, out);
                }
            }
            Shape::PrimitiveArray(items) => {
                self.check_size(&path, items, out);
                let member = path.element();
                for item in items {
                    self.emit(member.clone(), item, out);
                }
            }
            Shape::CompositeArray(items) => {
                let iteration = composite_iteration(&path, items);
                for item in items {
                    self.traverse(iteration.clone(), item, out);
                }
            }
            Shape::IteratedScalar => self.emit(path.as_member(), value, out),
            Shape::Leaf => self.emit(path, value, out),
        }
    }

    fn check_size(&self, path: &PendingPath, items: &[Value], out: &mut AssertionSet) {
        if self.size_check
            && (path.is_root() || path.asserts_concrete_value())
            && !items.is_empty()
        {
            out.insert(path.clone().has_size(items.len()));
        }
    }

    fn emit(&self, path: PendingPath, value: &Value, out: &mut AssertionSet) {
        match value_to_asserter(path, value, self.resolver) {
            Ok(Emission::Finished(assertion)) => out.insert(assertion),
            Ok(Emission::Deferred(path)) => {
                trace!(path = %path, "deferred value, no assertion emitted");
            }
            Err(error) => debug!(%error, "skipping leaf"),
        }
    }
}

fn classify<'v>(path: &PendingPath, value: &'v Value) -> Shape<'v> {
    match value {
        Value::String(text) => match parse_embedded_object(text) {
            Some(map) => Shape::EmbeddedObject(map),
            None => scalar_shape(path),
        },
        Value::Object(map) if map.len() == 1 && map.values().all(Value::is_primitive) => {
            Shape::FlatRecord(map)
        }
        Value::Object(map) if !map.is_empty() && map.values().all(Value::is_scalar) => {
            Shape::FlatRecord(map)
        }
        Value::Object(map) if !map.is_empty() => Shape::Object(map),
        Value::Object(_) => Shape::EmptyObject,
        Value::Array(items)
            if (path.is_root() || path.is_nameless_iteration()) && is_primitive_list(items) =>
        {
            Shape::NamelessPrimitiveArray(items)
        }
        Value::Array(items) if is_primitive_list(items) => Shape::PrimitiveArray(items),
        Value::Array(items) if !items.is_empty() => Shape::CompositeArray(items),
        Value::Array(_) => Shape::EmptyArray,
        _ => scalar_shape(path),
    }
}

fn scalar_shape<'v>(path: &PendingPath) -> Shape<'v> {
    if path.is_iterating() {
        Shape::IteratedScalar
    } else {
        Shape::Leaf
    }
}

fn entry_path(parent: &PendingPath, key: &str, child: &Value) -> PendingPath {
    match child {
        Value::Array(items) if is_primitive_list(items) => parent.array_field(key),
        _ => parent.field(key),
    }
}

fn composite_iteration(path: &PendingPath, items: &[Value]) -> PendingPath {
    let nameless = !matches!(path.path().last(), Some(Segment::Key(_)));
    let heterogeneous =
        items.iter().any(Value::is_primitive) && items.iter().any(Value::is_container);
    if nameless || heterogeneous {
        path.array(None)
    } else {
        path.iterate()
    }
}

fn is_primitive_list(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(Value::is_primitive)
}

fn parse_embedded_object(text: &str) -> Option<BTreeMap<String, Value>> {
    if !text.trim_start().starts_with('{') {
        return None;
    }
    let raw = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(raw) => raw,
        Err(error) => {
            trace!(%error, "string is not an embedded JSON document");
            return None;
        }
    };
    match Value::from_json(raw) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => None,
        Err(error) => {
            trace!(%error, "embedded JSON document could not be decoded");
            None
        }
    }
}
