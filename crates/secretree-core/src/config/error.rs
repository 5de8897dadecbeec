//! Configuration pipeline errors

use std::path::PathBuf;

use thiserror::Error;

use super::validate::ValidationError;
use crate::error::ResolveError;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not resolve secrets: {0}")]
    Resolve(#[from] ResolveError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config file {path} must contain a mapping at the top level")]
    NotAMapping { path: PathBuf },

    #[error("could not unmarshal config: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("could not validate config: {}", join_violations(.0))]
    Validation(Vec<ValidationError>),

    #[error("failed to get platform metadata: {0}")]
    Metadata(String),

    #[error("setting not available: {0}")]
    MissingSetting(String),

    #[error("invalid value '{value}' for {kind}")]
    InvalidValue { kind: &'static str, value: String },

    #[error("{0}")]
    Other(String),
}

fn join_violations(violations: &[ValidationError]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type ConfigResult<T> = Result<T, ConfigError>;
