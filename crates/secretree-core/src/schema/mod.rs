//! Schema description and secret-field discovery
//!
//! Configuration types register their fields explicitly through
//! [`SecretSchema`]; [`walk`] turns that description into the flat map of
//! configuration paths to secret identifiers the resolver fetches.

mod document;
mod node;
mod walker;

pub use document::{FieldDocument, FieldKind, SchemaDocument, SchemaDocumentError};
pub use node::{Composite, Field, SchemaNode, SecretSchema};
pub use walker::{walk, SecretRequests};
