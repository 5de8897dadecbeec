//! Schema walker: discovers which configuration paths are backed by secrets

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::node::{Composite, SchemaNode, SecretSchema};
use crate::error::{ResolveError, ResolveResult};

/// Configuration path to secret identifier
pub type SecretRequests = BTreeMap<String, String>;

/// Walk a schema and build its Secret Request Map
///
/// The root must be a composite. Every reachable field is first checked for
/// assignability; the first unassignable field in depth-first order fails the
/// walk before any entry is collected. Sequence and map nodes are skipped, as
/// are composites without a path segment (together with their subtree).
pub fn walk<S: SecretSchema + ?Sized>(root: &S, delimiter: &str) -> ResolveResult<SecretRequests> {
    let node = root.schema();
    let composite = match &node {
        SchemaNode::Composite(composite) => composite,
        other => {
            return Err(ResolveError::InvalidSchemaKind {
                kind: other.kind().to_string(),
            })
        }
    };

    check_assignable(composite, composite.name())?;

    let mut requests = SecretRequests::new();
    let mut prefix = Vec::new();
    collect(composite, &mut prefix, delimiter, &mut requests);

    debug!(count = requests.len(), schema = composite.name(), "discovered secret fields");
    Ok(requests)
}

fn check_assignable(composite: &Composite, owner: &str) -> ResolveResult<()> {
    for field in composite.fields() {
        let qualified = format!("{}.{}", owner, field.name());
        if !field.is_assignable() {
            return Err(ResolveError::FieldNotAssignable { field: qualified });
        }
        if let SchemaNode::Composite(child) = field.node() {
            check_assignable(child, &qualified)?;
        }
    }
    Ok(())
}

fn collect<'a>(
    composite: &'a Composite,
    prefix: &mut Vec<&'a str>,
    delimiter: &str,
    requests: &mut SecretRequests,
) {
    for field in composite.fields() {
        match field.node() {
            SchemaNode::Composite(child) => {
                let Some(segment) = field.path_segment() else {
                    debug!(field = field.name(), "composite field has no path segment, skipping");
                    continue;
                };
                prefix.push(segment);
                collect(child, prefix, delimiter, requests);
                prefix.pop();
            }
            SchemaNode::Absent => {}
            SchemaNode::Sequence | SchemaNode::Map => {
                debug!(field = field.name(), kind = field.node().kind(), "unsupported schema node, skipping");
            }
            SchemaNode::Scalar => {
                let Some(identifier) = field.secret_identifier() else {
                    continue;
                };
                let Some(segment) = field.path_segment() else {
                    warn!(field = field.name(), secret = identifier, "secret field has no path segment, skipping");
                    continue;
                };
                let mut path = prefix.join(delimiter);
                if !path.is_empty() {
                    path.push_str(delimiter);
                }
                path.push_str(segment);
                requests.insert(path, identifier.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;

    fn simple_nested() -> Composite {
        Composite::new("Config")
            .field(Field::scalar("Simple").path("simple").secret("S1"))
            .field(Field::composite(
                "Nested",
                Composite::new("Nested").field(Field::scalar("Inner").path("inner").secret("S2")),
            ).path("nested"))
    }

    fn chain(depth: usize) -> Composite {
        let mut node = Composite::new(format!("Level{}", depth))
            .field(Field::scalar("Value").path(format!("l{}", depth)).secret(format!("S{}", depth)));
        if depth > 1 {
            node.push(Field::composite("Child", chain(depth - 1)).path(format!("c{}", depth)));
        }
        node
    }

    #[test]
    fn test_simple_and_nested() {
        let requests = walk(&simple_nested(), ".").unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests["simple"], "S1");
        assert_eq!(requests["nested.inner"], "S2");
    }

    #[test]
    fn test_depth_produces_one_entry_per_level() {
        let requests = walk(&chain(4), ".").unwrap();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests["l4"], "S4");
        assert_eq!(requests["c4.c3.c2.l1"], "S1");
    }

    #[test]
    fn test_custom_delimiter() {
        let requests = walk(&simple_nested(), "__").unwrap();
        assert!(requests.contains_key("nested__inner"));
    }

    #[test]
    fn test_path_without_secret_is_prefix_only() {
        let root = Composite::new("Root")
            .field(Field::scalar("Host").path("host"))
            .field(Field::composite(
                "Db",
                Composite::new("Db").field(Field::scalar("Password").path("password").secret("PW")),
            ).path("db"));

        let requests = walk(&root, ".").unwrap();
        assert!(!requests.contains_key("host"));
        assert!(!requests.contains_key("db"));
        assert_eq!(requests["db.password"], "PW");
    }

    #[test]
    fn test_absent_optional_contributes_nothing() {
        let root = Composite::new("Root")
            .field(Field::scalar("A").path("a").secret("A"))
            .field(Field::optional("Opt", None).path("opt"));

        let requests = walk(&root, ".").unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[test]
    fn test_present_optional_is_traversed() {
        let inner = Composite::new("Opt").field(Field::scalar("Key").path("key").secret("K"));
        let root = Composite::new("Root").field(Field::optional("Opt", Some(inner)).path("opt"));

        assert_eq!(walk(&root, ".").unwrap()["opt.key"], "K");
    }

    #[test]
    fn test_composite_without_path_is_skipped() {
        let root = Composite::new("Root").field(Field::composite(
            "Hidden",
            Composite::new("Hidden").field(Field::scalar("X").path("x").secret("X")),
        ));
        assert!(walk(&root, ".").unwrap().is_empty());
    }

    #[test]
    fn test_secret_without_path_is_skipped() {
        let root = Composite::new("Root").field(Field::scalar("X").secret("X"));
        assert!(walk(&root, ".").unwrap().is_empty());
    }

    #[test]
    fn test_sequences_and_maps_are_skipped() {
        let root = Composite::new("Root")
            .field(Field::sequence("List").path("list").secret("L"))
            .field(Field::map("Table").path("table").secret("T"))
            .field(Field::scalar("Key").path("key").secret("K"));

        let requests = walk(&root, ".").unwrap();
        assert_eq!(requests.keys().collect::<Vec<_>>(), vec!["key"]);
    }

    #[test]
    fn test_non_composite_root() {
        let err = walk(&SchemaNode::Scalar, ".").unwrap_err();
        assert!(matches!(err, ResolveError::InvalidSchemaKind { ref kind } if kind == "scalar"));

        let none: Option<Composite> = None;
        let err = walk(&none, ".").unwrap_err();
        assert!(matches!(err, ResolveError::InvalidSchemaKind { ref kind } if kind == "absent"));
    }

    #[test]
    fn test_unassignable_field_fails_walk() {
        let root = Composite::new("Root")
            .field(Field::scalar("Ok").path("ok").secret("OK"))
            .field(Field::composite(
                "Db",
                Composite::new("Db").field(Field::scalar("secret").path("secret").unassignable()),
            ).path("db"));

        let err = walk(&root, ".").unwrap_err();
        assert!(matches!(err, ResolveError::FieldNotAssignable { ref field } if field == "Root.Db.secret"));
    }

    #[test]
    fn test_unassignable_checked_even_without_path() {
        let root = Composite::new("Root").field(Field::composite(
            "Hidden",
            Composite::new("Hidden").field(Field::scalar("x").unassignable()),
        ));
        assert!(matches!(walk(&root, "."), Err(ResolveError::FieldNotAssignable { .. })));
    }

    #[test]
    fn test_walk_does_not_mutate_schema() {
        let root = simple_nested();
        let before = root.clone();
        walk(&root, ".").unwrap();
        assert_eq!(root, before);
    }
}
