//! Configuration pipeline
//!
//! Builds a configuration tree in layers and populates a typed value from it:
//! - runtime and environment detection (`Runtime`, `Environment`, `PlatformMetadata`)
//! - per-environment defaults (`Defaults`, `ProjectSet`)
//! - a YAML file layer (`FileLayer`)
//! - secrets resolved through `SecretResolver` for paths no layer populated
//! - validation of the populated value (`validator::Validate`)
//!
//! ```rust,ignore
//! let mut loader = ConfigLoader::new(
//!     ProjectSet::new("acme-dev".into(), "acme-staging".into(), "acme-prod".into()),
//!     "us-central1",
//!     Arc::new(EnvSecretStore::new()),
//! )
//! .with_defaults(Defaults::new().per_env("db.host", "localhost", "db.staging", "db.prod"));
//!
//! let mut config = AppConfig::default();
//! loader.initialize(&mut config)?;
//! ```

mod defaults;
mod error;
mod file;
mod loader;
mod runtime;
mod tree;
mod validate;

pub use defaults::{DefaultValue, Defaults, EnvSet, ProjectSet};
pub use error::{ConfigError, ConfigResult};
pub use file::{FileLayer, DEFAULT_CONFIG_FILE};
pub use loader::{ConfigLoader, RuntimeOverride, ENV_KEY, PROJECT_KEY, REGION_KEY, RUNTIME_KEY};
pub use runtime::{
    detect_runtime, region_from_zone, running_on_cloud, EnvMetadata, Environment, PlatformMetadata,
    Runtime,
};
pub use tree::ConfigTree;
pub use validate::{violations, Validate, ValidationError};
