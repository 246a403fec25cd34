//! Read and delete sub-documents addressed by a [`JsonPath`].

use thiserror::Error;

use crate::domain::assertion::PathAssertion;
use crate::domain::json_path::{JsonPath, Segment};
use crate::domain::value::Value;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("no value found at `{path}`")]
    NotFound { path: String },

    #[error("the document root cannot be deleted")]
    RootDeletion,
}

/// Concrete address of one node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Step {
    Key(String),
    Index(usize),
}

/// Returns every node matched by `path`, in document order.
pub fn read<'a>(document: &'a Value, path: &JsonPath) -> Result<Vec<&'a Value>, QueryError> {
    let matched: Vec<&Value> = locate(document, path)
        .into_iter()
        .map(|(_, node)| node)
        .collect();
    if matched.is_empty() {
        return Err(not_found(path));
    }
    Ok(matched)
}

pub fn read_root(document: &Value) -> &Value {
    document
}

/// Removes every node matched by `path` and returns how many were removed.
///
/// Array elements are removed from the highest index down so that earlier
/// siblings keep their positions.
pub fn delete(document: &mut Value, path: &JsonPath) -> Result<usize, QueryError> {
    if path.is_root() {
        return Err(QueryError::RootDeletion);
    }
    let mut locations: Vec<Vec<Step>> = locate(document, path)
        .into_iter()
        .map(|(location, _)| location)
        .collect();
    if locations.is_empty() {
        return Err(not_found(path));
    }
    locations.sort();
    locations.dedup();

    let mut removed = 0;
    for location in locations.iter().rev() {
        if remove_at(document, location) {
            removed += 1;
        }
    }
    Ok(removed)
}

/// Empties the root container in place (`$[*]` deletion).
pub fn clear_children(document: &mut Value) {
    match document {
        Value::Array(items) => items.clear(),
        Value::Object(map) => map.clear(),
        _ => {}
    }
}

/// Evaluates an assertion against a document: at least one addressed node
/// must satisfy the check.
pub fn verify(assertion: &PathAssertion, document: &Value) -> bool {
    read(document, assertion.path())
        .map(|nodes| nodes.into_iter().any(|node| assertion.check().accepts(node)))
        .unwrap_or(false)
}

fn not_found(path: &JsonPath) -> QueryError {
    QueryError::NotFound {
        path: path.to_string(),
    }
}

fn locate<'a>(document: &'a Value, path: &JsonPath) -> Vec<(Vec<Step>, &'a Value)> {
    let mut current = vec![(Vec::new(), document)];

    for segment in path.segments() {
        let mut next = Vec::new();
        for (location, node) in current {
            match segment {
                Segment::Key(key) => {
                    if let Value::Object(map) = node
                        && let Some(child) = map.get(key)
                    {
                        next.push((extend(&location, Step::Key(key.clone())), child));
                    }
                }
                Segment::Index(index) => {
                    if let Value::Array(items) = node
                        && let Some(child) = items.get(*index)
                    {
                        next.push((extend(&location, Step::Index(*index)), child));
                    }
                }
                Segment::Wildcard => match node {
                    Value::Array(items) => {
                        for (index, child) in items.iter().enumerate() {
                            next.push((extend(&location, Step::Index(index)), child));
                        }
                    }
                    Value::Object(map) => {
                        for (key, child) in map {
                            next.push((extend(&location, Step::Key(key.clone())), child));
                        }
                    }
                    _ => {}
                },
                Segment::Descendant(key) => collect_descendants(node, key, location, &mut next),
            }
        }
        current = next;
    }

    current
}

fn collect_descendants<'a>(
    node: &'a Value,
    key: &str,
    location: Vec<Step>,
    out: &mut Vec<(Vec<Step>, &'a Value)>,
) {
    match node {
        Value::Object(map) => {
            if let Some(child) = map.get(key) {
                out.push((extend(&location, Step::Key(key.to_string())), child));
            }
            for (child_key, child) in map {
                collect_descendants(child, key, extend(&location, Step::Key(child_key.clone())), out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                collect_descendants(child, key, extend(&location, Step::Index(index)), out);
            }
        }
        _ => {}
    }
}

fn extend(location: &[Step], step: Step) -> Vec<Step> {
    let mut extended = location.to_vec();
    extended.push(step);
    extended
}

fn remove_at(document: &mut Value, location: &[Step]) -> bool {
    let Some((last, parents)) = location.split_last() else {
        return false;
    };
    let mut node = document;
    for step in parents {
        let next = match (step, node) {
            (Step::Key(key), Value::Object(map)) => map.get_mut(key),
            (Step::Index(index), Value::Array(items)) => items.get_mut(*index),
            _ => None,
        };
        let Some(next) = next else {
            return false;
        };
        node = next;
    }
    match (last, node) {
        (Step::Key(key), Value::Object(map)) => map.remove(key).is_some(),
        (Step::Index(index), Value::Array(items)) if *index < items.len() => {
            items.remove(*index);
            true
        }
        _ => false,
    }
}
