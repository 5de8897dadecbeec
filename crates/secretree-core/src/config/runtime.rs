//! Runtime and environment classification
//!
//! Decides where the process runs (local machine, CI, test, cloud) and
//! which deployment environment it belongs to.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};

/// Where the process is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
    Local,
    Ci,
    Test,
    Cloud,
}

impl Runtime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Runtime::Local => "local",
            Runtime::Ci => "ci",
            Runtime::Test => "test",
            Runtime::Cloud => "cloud",
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Runtime {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Runtime::Local),
            "ci" => Ok(Runtime::Ci),
            "test" => Ok(Runtime::Test),
            "cloud" => Ok(Runtime::Cloud),
            _ => Err(ConfigError::InvalidValue {
                kind: "runtime",
                value: s.to_string(),
            }),
        }
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Staging => "staging",
            Environment::Prod => "prod",
        }
    }

    /// Infer the environment from a cloud project name
    pub fn from_project_name(project: &str) -> Self {
        if project.contains("prod") {
            Environment::Prod
        } else if project.contains("staging") {
            Environment::Staging
        } else {
            Environment::Dev
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "staging" => Ok(Environment::Staging),
            "prod" => Ok(Environment::Prod),
            _ => Err(ConfigError::InvalidValue {
                kind: "environment",
                value: s.to_string(),
            }),
        }
    }
}

/// Source of cloud platform facts
pub trait PlatformMetadata: Send + Sync {
    /// Whether the process runs on the cloud platform
    fn on_cloud(&self) -> bool;

    fn project_id(&self) -> ConfigResult<String>;

    /// Compute zone, e.g. `us-central1-a`
    fn zone(&self) -> ConfigResult<String>;
}

const PROJECT_VARS: &[&str] = &["GOOGLE_CLOUD_PROJECT", "GCP_PROJECT"];
const ZONE_VARS: &[&str] = &["GCE_ZONE", "CLOUDSDK_COMPUTE_ZONE"];
const CLOUD_MARKER_VARS: &[&str] = &["K_SERVICE", "GCE_METADATA_HOST"];

/// Platform metadata read from environment variables
///
/// Reads the process environment unless built with [`EnvMetadata::from_vars`].
#[derive(Debug, Clone, Default)]
pub struct EnvMetadata {
    vars: Option<HashMap<String, String>>,
}

impl EnvMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed set of variables instead of the process environment
    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        Self { vars: Some(vars) }
    }

    fn var(&self, name: &str) -> Option<String> {
        let value = match &self.vars {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.filter(|v| !v.is_empty())
    }

    fn first(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| self.var(name))
    }
}

impl PlatformMetadata for EnvMetadata {
    fn on_cloud(&self) -> bool {
        self.first(CLOUD_MARKER_VARS).is_some()
    }

    fn project_id(&self) -> ConfigResult<String> {
        self.first(PROJECT_VARS)
            .ok_or_else(|| ConfigError::Metadata("failed to get project id".to_string()))
    }

    fn zone(&self) -> ConfigResult<String> {
        self.first(ZONE_VARS)
            .ok_or_else(|| ConfigError::Metadata("failed to get compute zone".to_string()))
    }
}

/// Region of a compute zone: everything before the last `-`
pub fn region_from_zone(zone: &str) -> ConfigResult<String> {
    match zone.rfind('-') {
        Some(index) if index > 0 => Ok(zone[..index].to_string()),
        _ => Err(ConfigError::Metadata(format!("failed to get region from zone '{}'", zone))),
    }
}

fn classify(ci: bool, on_cloud: bool) -> Runtime {
    if ci {
        Runtime::Ci
    } else if on_cloud {
        Runtime::Cloud
    } else {
        Runtime::Local
    }
}

/// Detect the runtime: `CI=true` wins, then the cloud platform, else local
pub fn detect_runtime(metadata: &dyn PlatformMetadata) -> Runtime {
    let ci = std::env::var("CI").map(|v| v == "true").unwrap_or(false);
    classify(ci, metadata.on_cloud())
}

/// Whether the process runs on any cloud platform, including AWS
pub fn running_on_cloud(metadata: &dyn PlatformMetadata) -> bool {
    std::env::var_os("AWS_EXECUTION_ENV").is_some() || metadata.on_cloud()
}
