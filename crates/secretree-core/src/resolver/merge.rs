//! Tree merger: flat delimited keys to nested maps and back

use serde_json::{Map, Value};

use super::fetch::FlatValues;
use crate::error::{ResolveError, ResolveResult};

/// Expand flat delimited keys into a nested tree
///
/// A key that would be both a leaf and a composite (`a` and `a.b`) is a
/// conflict, whichever order the keys arrive in.
pub fn unflatten(values: &FlatValues, delimiter: &str) -> ResolveResult<Map<String, Value>> {
    let mut root = Map::new();

    for (key, value) in values {
        let segments: Vec<&str> = key.split(delimiter).collect();
        let (leaf, parents) = match segments.split_last() {
            Some(split) => split,
            None => continue,
        };

        let mut node = &mut root;
        for (depth, segment) in parents.iter().enumerate() {
            let entry = node
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            match entry {
                Value::Object(child) => node = child,
                _ => {
                    let existing = segments[..=depth].join(delimiter);
                    return Err(ResolveError::conflict_leaf(key.as_str(), existing));
                }
            }
        }

        if matches!(node.get(*leaf), Some(Value::Object(_))) {
            return Err(ResolveError::conflict_composite(key.as_str(), key.as_str()));
        }
        node.insert(leaf.to_string(), Value::String(value.clone()));
    }

    Ok(root)
}

/// Collapse a nested tree into flat delimited keys
///
/// Non-string leaves are rendered as JSON; empty objects vanish.
pub fn flatten(tree: &Map<String, Value>, delimiter: &str) -> FlatValues {
    let mut flat = FlatValues::new();
    flatten_into(tree, "", delimiter, &mut flat);
    flat
}

fn flatten_into(tree: &Map<String, Value>, prefix: &str, delimiter: &str, flat: &mut FlatValues) {
    for (key, value) in tree {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}{}{}", prefix, delimiter, key)
        };
        match value {
            Value::Object(child) => flatten_into(child, &path, delimiter, flat),
            Value::String(s) => {
                flat.insert(path, s.clone());
            }
            other => {
                flat.insert(path, other.to_string());
            }
        }
    }
}

/// Fold `overlay` into `base`; objects merge recursively, anything else replaces
pub fn deep_merge(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match value {
            Value::Object(incoming) => {
                if let Some(Value::Object(existing)) = base.get_mut(&key) {
                    deep_merge(existing, incoming);
                    continue;
                }
                base.insert(key, Value::Object(incoming));
            }
            other => {
                base.insert(key, other);
            }
        }
    }
}
