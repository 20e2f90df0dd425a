//! Path-provisioning tree builder and its inverse.

use crate::error::BindError;
use formwire_protocol::{is_index_segment, normalize_path, split_path};
use serde_json::{Map, Value};

/// Largest sequence index a path may address.
const MAX_SEQUENCE_INDEX: usize = 10_000;

/// Write `value` at `path` inside `root`, creating intermediate containers.
///
/// Intermediate nodes are created as sequences when the following segment
/// is numeric and as maps otherwise; existing nodes keep their shape. An
/// absent value leaves an existing terminal value in place and writes `null`
/// when nothing is there yet. Gaps in sequences are padded with `null`.
///
/// The root is returned because an empty root map is replaced by a sequence
/// when the first segment is numeric.
pub fn set_path(root: Value, path: &str, value: Option<Value>) -> Result<Value, BindError> {
    let normalized = normalize_path(path);
    let segments = split_path(&normalized);
    let Some(first) = segments.first() else {
        return Err(BindError::EmptyPath);
    };

    let mut root = root;
    if is_index_segment(first) && root.as_object().is_some_and(|map| map.is_empty()) {
        root = Value::Array(Vec::new());
    }

    let mut value = value;
    let mut node = &mut root;
    for (pos, segment) in segments.iter().enumerate() {
        let slot = child_slot(node, segment, &normalized)?;
        match segments.get(pos + 1) {
            Some(next) => {
                if slot.is_null() {
                    *slot = if is_index_segment(next) {
                        Value::Array(Vec::new())
                    } else {
                        Value::Object(Map::new())
                    };
                }
                node = slot;
            }
            None => {
                if let Some(value) = value.take() {
                    *slot = value;
                }
                break;
            }
        }
    }
    Ok(root)
}

/// Flatten a tree into `(dotted path, leaf)` pairs in encounter order.
///
/// Empty containers produce no entries; a scalar root has no path.
pub fn get_paths(tree: &Value) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    collect_paths(tree, "", &mut out);
    out
}

/// Read the value stored at `path`, if any.
pub fn get_path<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    let normalized = normalize_path(path);
    let segments = split_path(&normalized);
    if segments.is_empty() {
        return None;
    }
    let mut node = tree;
    for segment in segments {
        node = match node {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(node)
}

/// Borrow (creating as `null` when missing) the child addressed by `segment`.
fn child_slot<'a>(
    node: &'a mut Value,
    segment: &str,
    path: &str,
) -> Result<&'a mut Value, BindError> {
    match node {
        Value::Object(map) => Ok(map.entry(segment.to_string()).or_insert(Value::Null)),
        Value::Array(items) if is_index_segment(segment) => {
            let index = segment
                .parse::<usize>()
                .ok()
                .filter(|index| *index <= MAX_SEQUENCE_INDEX)
                .ok_or_else(|| BindError::IndexTooLarge {
                    path: path.to_string(),
                    segment: segment.to_string(),
                })?;
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            Ok(&mut items[index])
        }
        _ => Err(BindError::ShapeConflict {
            path: path.to_string(),
            segment: segment.to_string(),
        }),
    }
}

fn collect_paths(node: &Value, prefix: &str, out: &mut Vec<(String, Value)>) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                collect_paths(child, &join_segment(prefix, key), out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                collect_paths(child, &join_segment(prefix, &index.to_string()), out);
            }
        }
        leaf => {
            if !prefix.is_empty() {
                out.push((prefix.to_string(), leaf.clone()));
            }
        }
    }
}

fn join_segment(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}
