//! File-based configuration layer (YAML)

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use super::error::{ConfigError, ConfigResult};

/// Default config file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// A YAML file merged on top of the defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLayer {
    path: PathBuf,
}

impl Default for FileLayer {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_FILE)
    }
}

impl FileLayer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the file as a nested map
    ///
    /// A missing file yields `None`. An empty file is an empty map. Anything
    /// that does not parse as a YAML mapping is an error.
    pub fn load(&self) -> ConfigResult<Option<Map<String, Value>>> {
        if !self.exists() {
            debug!(path = %self.path.display(), "config file not found, skipping");
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Some(Map::new()));
        }

        let value: Value = serde_yaml::from_str(&content).map_err(|source| ConfigError::File {
            path: self.path.clone(),
            source,
        })?;

        match value {
            Value::Object(map) => {
                debug!(path = %self.path.display(), keys = map.len(), "loaded config file");
                Ok(Some(map))
            }
            Value::Null => Ok(Some(Map::new())),
            _ => Err(ConfigError::NotAMapping {
                path: self.path.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &TempDir, content: &str) -> FileLayer {
        let path = dir.path().join("config.yaml");
        fs::write(&path, content).unwrap();
        FileLayer::new(path)
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let layer = FileLayer::new(dir.path().join("absent.yaml"));
        assert!(layer.load().unwrap().is_none());
    }

    #[test]
    fn test_load_nested_yaml() {
        let dir = TempDir::new().unwrap();
        let layer = write(&dir, "db:\n  url: postgres://local\nport: 5432\n");

        let map = layer.load().unwrap().unwrap();
        assert_eq!(Value::Object(map), json!({"db": {"url": "postgres://local"}, "port": 5432}));
    }

    #[test]
    fn test_empty_file_is_empty_map() {
        let dir = TempDir::new().unwrap();
        assert!(write(&dir, "\n").load().unwrap().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = write(&dir, "db: [unclosed\n").load().unwrap_err();
        assert!(matches!(err, ConfigError::File { .. }));

        let err = write(&dir, "- a\n- b\n").load().unwrap_err();
        assert!(matches!(err, ConfigError::NotAMapping { .. }));
    }

    #[test]
    fn test_default_path() {
        assert_eq!(FileLayer::default().path(), Path::new("config.yaml"));
        assert!(!FileLayer::new("/nonexistent/config.yaml").exists());
    }
}
