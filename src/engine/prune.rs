use tracing::{debug, trace};

use crate::domain::json_path::JsonPath;
use crate::domain::matcher::Matcher;
use crate::domain::value::Value;
use crate::engine::query;

/// Body copy with every matcher-covered subtree removed.
#[derive(Debug, Clone, PartialEq)]
pub struct PrunedBody {
    pub document: Value,
    /// Matcher paths that were present and deleted, in processing order.
    pub deleted_paths: Vec<JsonPath>,
}

/// Deletes matcher paths from a copy of `document`, then contracts any
/// container those deletions left holding nothing but empty containers.
///
/// Paths are processed in reverse order so that a later array index is
/// removed before an earlier one and children before their ancestors.
pub fn remove_matching_paths(document: &Value, matchers: &[Matcher]) -> PrunedBody {
    let mut copy = document.clone();

    let mut paths: Vec<JsonPath> = matchers
        .iter()
        .filter_map(|matcher| match JsonPath::parse(&matcher.path) {
            Ok(path) => Some(path),
            Err(error) => {
                trace!(%error, "skipping unparsable matcher path");
                None
            }
        })
        .collect();
    paths.sort();
    paths.dedup();
    paths.reverse();

    let mut deleted_paths = Vec::with_capacity(paths.len());
    for path in paths {
        if let Err(error) = query::read(&copy, &path) {
            trace!(%error, path = %path, "matcher path absent from body");
            continue;
        }
        match query::delete(&mut copy, &path) {
            Ok(removed) => {
                trace!(path = %path, removed, "deleted matcher path");
                deleted_paths.push(path);
            }
            Err(error) => trace!(%error, path = %path, "failed to delete matcher path"),
        }
    }

    for path in &deleted_paths {
        contract(&mut copy, path);
    }
    debug!(deleted = deleted_paths.len(), "pruned matcher paths");

    PrunedBody {
        document: copy,
        deleted_paths,
    }
}

/// Removes the container of `deleted` when everything left in it is an empty
/// container, then repeats one level up. The root is never removed.
fn contract(document: &mut Value, deleted: &JsonPath) {
    if deleted.has_descendant() {
        clear_root_if_only_empty(document);
        return;
    }
    let Some(container) = deleted.parent() else {
        return;
    };
    if container.is_root() {
        if matches!(query::read_root(document), Value::Array(_)) {
            clear_root_if_only_empty(document);
        }
        return;
    }

    let holds_only_empty = match query::read(document, &container) {
        Ok(nodes) => holds_only_empty_containers(&container, &nodes),
        Err(error) => {
            trace!(%error, "container already gone");
            return;
        }
    };
    if !holds_only_empty {
        return;
    }

    match query::delete(document, &container) {
        Ok(_) => contract(document, &container),
        Err(error) => trace!(%error, path = %container, "failed to contract container"),
    }
}

/// A definite container is read as the node itself; an indefinite one as the
/// list of nodes it matched.
fn holds_only_empty_containers(container: &JsonPath, nodes: &[&Value]) -> bool {
    if container.is_definite() {
        return match nodes {
            [node] if node.is_container() => only_empty_children(node),
            _ => false,
        };
    }
    nodes.iter().all(|node| node.is_empty_container())
}

fn only_empty_children(node: &Value) -> bool {
    node.children().into_iter().all(Value::is_empty_container)
}

fn clear_root_if_only_empty(document: &mut Value) {
    let root = query::read_root(document);
    if root.is_container() && only_empty_children(root) {
        query::clear_children(document);
    }
}
