//! Resolution error types

use std::fmt;

use thiserror::Error;

use crate::secrets::SecretStoreError;

/// Errors that can occur during a resolution call
///
/// Every variant is fatal for the call: a resolution either returns a
/// complete tree or exactly one of these.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The schema root is not a composite (or is absent)
    #[error("schema root must be a composite, got: {kind}")]
    InvalidSchemaKind { kind: String },

    /// A discovered field cannot be written to
    #[error("field {field} is not assignable - check that it is settable from the config pipeline")]
    FieldNotAssignable { field: String },

    /// One or more remote lookups failed
    #[error(transparent)]
    SecretFetchFailure(#[from] FetchFailures),

    /// The key remap function rejected a key
    #[error("key remap rejected key '{key}'")]
    KeyRemapFailure { key: String },

    /// Two resolved keys collide structurally
    #[error("conflicting path '{path}': '{existing}' is already {existing_kind}")]
    ConflictingPath {
        path: String,
        existing: String,
        existing_kind: &'static str,
    },

    /// The blocking resolution task did not complete
    #[error("resolution task failed: {0}")]
    Task(String),
}

impl ResolveError {
    pub(crate) fn conflict_leaf(path: impl Into<String>, existing: impl Into<String>) -> Self {
        Self::ConflictingPath {
            path: path.into(),
            existing: existing.into(),
            existing_kind: "a leaf",
        }
    }

    pub(crate) fn conflict_composite(path: impl Into<String>, existing: impl Into<String>) -> Self {
        Self::ConflictingPath {
            path: path.into(),
            existing: existing.into(),
            existing_kind: "a composite",
        }
    }

    /// Per-secret failures, when this is an aggregate fetch failure
    pub fn fetch_failures(&self) -> Option<&FetchFailures> {
        match self {
            Self::SecretFetchFailure(failures) => Some(failures),
            _ => None,
        }
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// A single failed remote lookup
#[derive(Debug)]
pub struct FetchFailure {
    /// Secret identifier that was requested
    pub identifier: String,
    /// Configuration path the secret was destined for
    pub path: String,
    /// Underlying store error
    pub error: SecretStoreError,
}

/// Aggregate of every failed lookup in one fetch phase
///
/// Failures are kept sorted by identifier, then path, so the rendered
/// message is stable for a fixed failing set regardless of completion order.
#[derive(Debug, Default)]
pub struct FetchFailures {
    failures: Vec<FetchFailure>,
}

impl FetchFailures {
    pub(crate) fn new(mut failures: Vec<FetchFailure>) -> Self {
        failures.sort_by(|a, b| {
            a.identifier
                .cmp(&b.identifier)
                .then_with(|| a.path.cmp(&b.path))
        });
        Self { failures }
    }

    /// Individual failures, sorted by identifier then path
    pub fn failures(&self) -> &[FetchFailure] {
        &self.failures
    }

    /// Identifiers that failed, sorted
    pub fn identifiers(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.identifier.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for FetchFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error when fetching secrets: ")?;
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", failure.identifier, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for FetchFailures {}
