//! Nested configuration tree with dotted-path access

use serde_json::{Map, Value};

use crate::resolver::{deep_merge, flatten, DEFAULT_DELIMITER};

/// The configuration assembled by the loader, one layer at a time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
    root: Map<String, Value>,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(root: Map<String, Value>) -> Self {
        Self { root }
    }

    /// Value at a dotted path
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split(DEFAULT_DELIMITER);
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Set a value at a dotted path, replacing any leaf in the way
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let segments: Vec<&str> = path.split(DEFAULT_DELIMITER).collect();
        let Some((leaf, parents)) = segments.split_last() else {
            return;
        };

        let mut node = &mut self.root;
        for segment in parents {
            let entry = node
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            let Value::Object(child) = entry else {
                return;
            };
            node = child;
        }
        node.insert(leaf.to_string(), value.into());
    }

    /// Merge another tree on top of this one
    pub fn merge(&mut self, overlay: Map<String, Value>) {
        deep_merge(&mut self.root, overlay);
    }

    /// Every leaf path, sorted
    pub fn keys(&self) -> Vec<String> {
        flatten(&self.root, DEFAULT_DELIMITER).into_keys().collect()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.root
    }
}
