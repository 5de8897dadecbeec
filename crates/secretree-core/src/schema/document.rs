//! Serializable schema descriptions
//!
//! Lets a schema be declared in YAML or JSON instead of code:
//!
//! ```yaml
//! name: Config
//! fields:
//!   - name: Simple
//!     path: simple
//!     secret: S1
//!   - name: Nested
//!     path: nested
//!     fields:
//!       - name: Inner
//!         path: inner
//!         secret: S2
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::node::{Composite, Field, SchemaNode, SecretSchema};

#[derive(Error, Debug)]
pub enum SchemaDocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Kind of a leaf in a schema document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Scalar,
    Sequence,
    Map,
}

/// One field of a schema document
///
/// A field with `fields` is a composite; otherwise `kind` decides the leaf type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldDocument>>,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default = "default_assignable")]
    pub assignable: bool,
}

fn default_assignable() -> bool {
    true
}

/// Root of a schema document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDocument>,
}

fn default_name() -> String {
    "Config".to_string()
}

impl SchemaDocument {
    /// Parse a document from YAML (JSON is accepted too)
    pub fn from_yaml(content: &str) -> Result<Self, SchemaDocumentError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaDocumentError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn to_composite(&self) -> Composite {
        build_composite(&self.name, &self.fields)
    }
}

fn build_composite(name: &str, fields: &[FieldDocument]) -> Composite {
    let mut composite = Composite::new(name);
    for doc in fields {
        composite.push(build_field(doc));
    }
    composite
}

fn build_field(doc: &FieldDocument) -> Field {
    let mut field = match (&doc.fields, doc.kind) {
        (Some(children), _) => Field::composite(&doc.name, build_composite(&doc.name, children)),
        (None, FieldKind::Scalar) => Field::scalar(&doc.name),
        (None, FieldKind::Sequence) => Field::sequence(&doc.name),
        (None, FieldKind::Map) => Field::map(&doc.name),
    };
    if let Some(path) = &doc.path {
        field = field.path(path);
    }
    if let Some(secret) = &doc.secret {
        field = field.secret(secret);
    }
    if !doc.assignable {
        field = field.unassignable();
    }
    field
}

impl SecretSchema for SchemaDocument {
    fn schema(&self) -> SchemaNode {
        SchemaNode::Composite(self.to_composite())
    }
}
