//! Key remapping applied to resolved paths before merge

use std::fmt;
use std::sync::Arc;

use super::fetch::FlatValues;
use crate::error::{ResolveError, ResolveResult};

type RemapFn = dyn Fn(&str) -> Option<String> + Send + Sync;

/// A pure function over configuration paths
///
/// Returning `None` (or an empty key) rejects the key and fails resolution.
#[derive(Clone, Default)]
pub struct KeyRemapper {
    remap: Option<Arc<RemapFn>>,
}

impl fmt::Debug for KeyRemapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRemapper")
            .field("identity", &self.remap.is_none())
            .finish()
    }
}

impl KeyRemapper {
    /// Leave keys unchanged
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn new<F>(remap: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            remap: Some(Arc::new(remap)),
        }
    }

    pub fn lowercase() -> Self {
        Self::new(|key| Some(key.to_lowercase()))
    }

    /// Replace every occurrence of `from` with `to`
    pub fn replace(from: impl Into<String>, to: impl Into<String>) -> Self {
        let from = from.into();
        let to = to.into();
        Self::new(move |key| Some(key.replace(&from, &to)))
    }

    pub fn is_identity(&self) -> bool {
        self.remap.is_none()
    }

    /// Remap a single key
    pub fn map_key(&self, key: &str) -> ResolveResult<String> {
        let Some(remap) = &self.remap else {
            return Ok(key.to_string());
        };
        match remap(key) {
            Some(mapped) if !mapped.is_empty() => Ok(mapped),
            _ => Err(ResolveError::KeyRemapFailure { key: key.to_string() }),
        }
    }

    /// Remap every key of a flat value map
    ///
    /// Two keys landing on the same remapped key is a conflict.
    pub fn apply(&self, values: FlatValues) -> ResolveResult<FlatValues> {
        if self.is_identity() {
            return Ok(values);
        }

        let mut remapped = FlatValues::new();
        let mut origins: Vec<(String, String)> = Vec::with_capacity(values.len());
        for (key, value) in values {
            let mapped = self.map_key(&key)?;
            if remapped.contains_key(&mapped) {
                let existing = origins
                    .iter()
                    .find(|(_, m)| *m == mapped)
                    .map(|(original, _)| original.clone())
                    .unwrap_or_default();
                return Err(ResolveError::conflict_leaf(mapped, existing));
            }
            origins.push((key, mapped.clone()));
            remapped.insert(mapped, value);
        }
        Ok(remapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(entries: &[(&str, &str)]) -> FlatValues {
        entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_identity() {
        let values = flat(&[("Db.Url", "x")]);
        assert_eq!(KeyRemapper::identity().apply(values.clone()).unwrap(), values);
    }

    #[test]
    fn test_lowercase_and_replace() {
        let out = KeyRemapper::lowercase().apply(flat(&[("Db.Url", "x")])).unwrap();
        assert_eq!(out["db.url"], "x");

        let out = KeyRemapper::replace("_", ".").apply(flat(&[("db_url", "x")])).unwrap();
        assert_eq!(out["db.url"], "x");
    }

    #[test]
    fn test_rejected_key() {
        let remapper = KeyRemapper::new(|key| (!key.starts_with("bad")).then(|| key.to_string()));
        let err = remapper.apply(flat(&[("good", "1"), ("bad.key", "2")])).unwrap_err();
        assert!(matches!(err, ResolveError::KeyRemapFailure { ref key } if key == "bad.key"));
    }

    #[test]
    fn test_empty_output_is_rejected() {
        let remapper = KeyRemapper::new(|_| Some(String::new()));
        assert!(matches!(remapper.map_key("a"), Err(ResolveError::KeyRemapFailure { .. })));
    }

    #[test]
    fn test_collision_is_conflict() {
        let err = KeyRemapper::lowercase()
            .apply(flat(&[("A", "1"), ("a", "2")]))
            .unwrap_err();
        assert!(matches!(err, ResolveError::ConflictingPath { ref path, ref existing, .. } if path == "a" && existing == "A"));
    }
}
