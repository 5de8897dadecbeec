//! Schema nodes and the field registration API
//!
//! Configuration types describe their shape by implementing [`SecretSchema`]
//! and returning a tree of [`SchemaNode`]s. Each [`Field`] carries the two
//! annotations the walker reads: a path segment and a secret identifier.
//!
//! ```rust
//! use secretree_core::schema::{Composite, Field, SchemaNode, SecretSchema};
//!
//! struct Database {
//!     url: String,
//!     password: String,
//! }
//!
//! impl SecretSchema for Database {
//!     fn schema(&self) -> SchemaNode {
//!         Composite::new("Database")
//!             .field(Field::scalar("url").path("url"))
//!             .field(Field::scalar("password").path("password").secret("DB_PASSWORD"))
//!             .into()
//!     }
//! }
//! ```

/// One node of a schema tree
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// Struct-like value with named fields
    Composite(Composite),
    /// Leaf value
    Scalar,
    /// Array-like value; never traversed
    Sequence,
    /// Map-like value; never traversed
    Map,
    /// Unset optional composite
    Absent,
}

impl SchemaNode {
    /// Short name of the node kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaNode::Composite(_) => "composite",
            SchemaNode::Scalar => "scalar",
            SchemaNode::Sequence => "sequence",
            SchemaNode::Map => "map",
            SchemaNode::Absent => "absent",
        }
    }

    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            SchemaNode::Composite(c) => Some(c),
            _ => None,
        }
    }
}

impl From<Composite> for SchemaNode {
    fn from(composite: Composite) -> Self {
        SchemaNode::Composite(composite)
    }
}

/// A struct-like schema value: a type name and its fields in declaration order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Composite {
    name: String,
    fields: Vec<Field>,
}

impl Composite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// A declared field and its annotations
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    path: Option<String>,
    secret: Option<String>,
    assignable: bool,
    node: SchemaNode,
}

impl Field {
    fn with_node(name: impl Into<String>, node: SchemaNode) -> Self {
        Self {
            name: name.into(),
            path: None,
            secret: None,
            assignable: true,
            node,
        }
    }

    /// Leaf field
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::with_node(name, SchemaNode::Scalar)
    }

    /// Nested composite field
    pub fn composite(name: impl Into<String>, composite: Composite) -> Self {
        Self::with_node(name, SchemaNode::Composite(composite))
    }

    /// Optional composite field; `None` contributes nothing to a walk
    pub fn optional(name: impl Into<String>, composite: Option<Composite>) -> Self {
        let node = composite.map(SchemaNode::Composite).unwrap_or(SchemaNode::Absent);
        Self::with_node(name, node)
    }

    /// Field whose shape comes from another schema type
    pub fn nested<S: SecretSchema + ?Sized>(name: impl Into<String>, value: &S) -> Self {
        Self::with_node(name, value.schema())
    }

    pub fn sequence(name: impl Into<String>) -> Self {
        Self::with_node(name, SchemaNode::Sequence)
    }

    pub fn map(name: impl Into<String>) -> Self {
        Self::with_node(name, SchemaNode::Map)
    }

    /// Set the path-segment annotation
    pub fn path(mut self, segment: impl Into<String>) -> Self {
        self.path = Some(segment.into());
        self
    }

    /// Set the secret-identifier annotation
    pub fn secret(mut self, identifier: impl Into<String>) -> Self {
        self.secret = Some(identifier.into());
        self
    }

    /// Mark the field as one the configuration pipeline cannot write to
    pub fn unassignable(mut self) -> Self {
        self.assignable = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path segment, if annotated and non-empty
    pub fn path_segment(&self) -> Option<&str> {
        self.path.as_deref().filter(|p| !p.is_empty())
    }

    /// Secret identifier, if annotated and non-empty
    pub fn secret_identifier(&self) -> Option<&str> {
        self.secret.as_deref().filter(|s| !s.is_empty())
    }

    pub fn is_assignable(&self) -> bool {
        self.assignable
    }

    pub fn node(&self) -> &SchemaNode {
        &self.node
    }
}

/// Types that can describe their configuration shape
pub trait SecretSchema {
    fn schema(&self) -> SchemaNode;
}

impl SecretSchema for SchemaNode {
    fn schema(&self) -> SchemaNode {
        self.clone()
    }
}

impl SecretSchema for Composite {
    fn schema(&self) -> SchemaNode {
        SchemaNode::Composite(self.clone())
    }
}

impl<T: SecretSchema> SecretSchema for Option<T> {
    fn schema(&self) -> SchemaNode {
        match self {
            Some(value) => value.schema(),
            None => SchemaNode::Absent,
        }
    }
}

impl<T: SecretSchema + ?Sized> SecretSchema for Box<T> {
    fn schema(&self) -> SchemaNode {
        (**self).schema()
    }
}

impl<T: SecretSchema + ?Sized> SecretSchema for &T {
    fn schema(&self) -> SchemaNode {
        (**self).schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Inner;

    impl SecretSchema for Inner {
        fn schema(&self) -> SchemaNode {
            Composite::new("Inner")
                .field(Field::scalar("value").path("value").secret("S"))
                .into()
        }
    }

    #[test]
    fn test_field_builders() {
        let field = Field::scalar("Password").path("password").secret("DB_PASSWORD");
        assert_eq!(field.name(), "Password");
        assert_eq!(field.path_segment(), Some("password"));
        assert_eq!(field.secret_identifier(), Some("DB_PASSWORD"));
        assert!(field.is_assignable());
        assert_eq!(field.node().kind(), "scalar");

        assert!(!Field::scalar("x").unassignable().is_assignable());
    }

    #[test]
    fn test_empty_annotations_are_none() {
        let field = Field::scalar("x").path("").secret("");
        assert_eq!(field.path_segment(), None);
        assert_eq!(field.secret_identifier(), None);
    }

    #[test]
    fn test_optional_and_nested() {
        assert_eq!(Field::optional("o", None).node(), &SchemaNode::Absent);

        let field = Field::nested("inner", &Inner);
        assert_eq!(field.node().as_composite().unwrap().name(), "Inner");

        let none: Option<Inner> = None;
        assert_eq!(Field::nested("inner", &none).node(), &SchemaNode::Absent);
        assert_eq!(Some(Inner).schema().kind(), "composite");
        assert_eq!(Box::new(Inner).schema().kind(), "composite");
    }

    #[test]
    fn test_composite_preserves_declaration_order() {
        let mut composite = Composite::new("Root")
            .field(Field::scalar("b"))
            .field(Field::scalar("a"));
        composite.push(Field::sequence("list"));

        let names: Vec<_> = composite.fields().iter().map(Field::name).collect();
        assert_eq!(names, vec!["b", "a", "list"]);
    }
}
