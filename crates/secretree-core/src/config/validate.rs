//! Post-population validation
//!
//! Configuration types derive `validator::Validate`; the loader flattens the
//! nested `ValidationErrors` into one `ValidationError` per violated rule.

use std::fmt;

use validator::{ValidationErrors, ValidationErrorsKind};

pub use validator::Validate;

/// A single rule violation at a configuration path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Flatten `errors` into dotted-path violations, sorted by path
///
/// A rule without a custom message is reported by its code (`length`,
/// `range`, ...).
pub fn violations(errors: &ValidationErrors) -> Vec<ValidationError> {
    let mut out = Vec::new();
    collect("", errors, &mut out);
    out.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.message.cmp(&b.message)));
    out
}

fn collect(prefix: &str, errors: &ValidationErrors, out: &mut Vec<ValidationError>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(rules) => {
                for rule in rules {
                    let message = rule
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| rule.code.to_string());
                    out.push(ValidationError::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(&format!("{}.{}", path, index), inner, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Db {
        #[validate(length(min = 1, message = "is required"))]
        url: String,
        #[validate(range(min = 1))]
        pool: u32,
    }

    #[derive(Validate)]
    struct AppConfig {
        #[validate(length(min = 1))]
        name: String,
        #[validate(nested)]
        db: Db,
    }

    #[test]
    fn test_nested_violations_are_flattened() {
        let config = AppConfig {
            name: String::new(),
            db: Db { url: String::new(), pool: 0 },
        };

        let errors = config.validate().unwrap_err();
        assert_eq!(
            violations(&errors),
            vec![
                ValidationError::new("db.pool", "range"),
                ValidationError::new("db.url", "is required"),
                ValidationError::new("name", "length"),
            ]
        );
    }

    #[test]
    fn test_valid_config_has_no_violations() {
        let config = AppConfig {
            name: "api".into(),
            db: Db { url: "postgres://".into(), pool: 4 },
        };
        assert!(config.validate().is_ok());
    }
}
