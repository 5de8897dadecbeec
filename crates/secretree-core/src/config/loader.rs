//! Layered configuration loader
//!
//! Layers, lowest priority first:
//! 1. runtime, environment, project and region
//! 2. defaults for the active environment
//! 3. runtime overrides
//! 4. the config file (never on a cloud runtime)
//! 5. secrets, for every secret path no earlier layer populated
//!
//! The merged tree is then deserialized into the target type and validated.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use super::defaults::{Defaults, ProjectSet};
use super::error::{ConfigError, ConfigResult};
use super::file::FileLayer;
use super::runtime::{
    detect_runtime, region_from_zone, running_on_cloud, EnvMetadata, Environment, PlatformMetadata,
    Runtime,
};
use super::tree::ConfigTree;
use super::validate::{violations, Validate};
use crate::resolver::{KeyRemapper, SecretResolver};
use crate::schema::SecretSchema;
use crate::secrets::SecretStore;

pub const ENV_KEY: &str = "env";
pub const RUNTIME_KEY: &str = "runtime";
pub const PROJECT_KEY: &str = "project";
pub const REGION_KEY: &str = "region";

/// Mutates the tree when the loader runs under a given runtime
pub type RuntimeOverride = Box<dyn Fn(&mut ConfigTree) -> ConfigResult<()> + Send + Sync>;

pub struct ConfigLoader {
    projects: ProjectSet,
    default_region: String,
    store: Arc<dyn SecretStore>,
    metadata: Arc<dyn PlatformMetadata>,
    defaults: Defaults,
    overrides: Vec<(Runtime, RuntimeOverride)>,
    file: FileLayer,
    runtime: Option<Runtime>,
    environment: Option<Environment>,
    concurrency: usize,
    remapper: KeyRemapper,
    debug: bool,
    tree: ConfigTree,
}

impl ConfigLoader {
    pub fn new(projects: ProjectSet, default_region: impl Into<String>, store: Arc<dyn SecretStore>) -> Self {
        Self {
            projects,
            default_region: default_region.into(),
            store,
            metadata: Arc::new(EnvMetadata::new()),
            defaults: Defaults::new(),
            overrides: Vec::new(),
            file: FileLayer::default(),
            runtime: None,
            environment: None,
            concurrency: 0,
            remapper: KeyRemapper::identity(),
            debug: false,
            tree: ConfigTree::new(),
        }
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Run `apply` after the defaults when the runtime matches
    pub fn with_runtime_override<F>(mut self, runtime: Runtime, apply: F) -> Self
    where
        F: Fn(&mut ConfigTree) -> ConfigResult<()> + Send + Sync + 'static,
    {
        self.overrides.push((runtime, Box::new(apply)));
        self
    }

    pub fn with_config_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.file = FileLayer::new(path);
        self
    }

    pub fn with_file_layer(mut self, file: FileLayer) -> Self {
        self.file = file;
        self
    }

    pub fn with_metadata(mut self, metadata: Arc<dyn PlatformMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Skip runtime detection
    pub fn with_runtime(mut self, runtime: Runtime) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Environment to use off-cloud; defaults to dev
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_remapper(mut self, remapper: KeyRemapper) -> Self {
        self.remapper = remapper;
        self
    }

    /// Mark the configuration as debug; survives later `initialize` calls
    pub fn set_debug(&mut self) {
        self.debug = true;
        self.tree.set("debug", true);
    }

    pub fn debug(&self) -> bool {
        self.tree.get("debug").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn tree(&self) -> &ConfigTree {
        &self.tree
    }

    pub fn runtime(&self) -> Option<Runtime> {
        self.tree.get_str(RUNTIME_KEY).and_then(|s| s.parse().ok())
    }

    pub fn environment(&self) -> Option<Environment> {
        self.tree.get_str(ENV_KEY).and_then(|s| s.parse().ok())
    }

    pub fn project(&self) -> Option<&str> {
        self.tree.get_str(PROJECT_KEY)
    }

    pub fn region(&self) -> Option<&str> {
        self.tree.get_str(REGION_KEY)
    }

    /// Build the configuration and write it into `target`
    ///
    /// `target` supplies the schema (its current optional sections decide
    /// which secrets are looked up) and is replaced only when every layer
    /// loaded and the result validated. Each call rebuilds the tree from
    /// scratch, so secrets resolved by an earlier call are fetched again.
    pub fn initialize<T>(&mut self, target: &mut T) -> ConfigResult<()>
    where
        T: SecretSchema + DeserializeOwned + Validate,
    {
        self.tree = ConfigTree::new();
        if self.debug {
            self.tree.set("debug", true);
        }

        let runtime = self.initialize_runtime()?;

        let env = self
            .environment()
            .ok_or_else(|| ConfigError::MissingSetting(ENV_KEY.to_string()))?;
        self.defaults.apply(env, &mut self.tree);

        for (_, apply) in self.overrides.iter().filter(|(r, _)| *r == runtime) {
            apply(&mut self.tree)?;
        }

        if !running_on_cloud(self.metadata.as_ref()) {
            if let Some(layer) = self.file.load()? {
                self.tree.merge(layer);
            }
        }

        let project = self
            .project()
            .ok_or_else(|| ConfigError::MissingSetting(PROJECT_KEY.to_string()))?
            .to_string();

        let resolver = SecretResolver::new(self.store.clone(), project)
            .with_concurrency(self.concurrency)
            .with_remapper(self.remapper.clone());
        let skip = self.populated_paths(&resolver, &*target)?;
        let secrets = resolver.with_skip_keys(skip).resolve(&*target)?;
        self.tree.merge(secrets);

        let value: T = serde_json::from_value(Value::Object(self.tree.as_map().clone()))?;
        value
            .validate()
            .map_err(|errors| ConfigError::Validation(violations(&errors)))?;

        *target = value;
        info!(%runtime, %env, project = ?self.project(), "configuration initialized");
        Ok(())
    }

    /// Secret paths whose remapped key an earlier layer already set
    ///
    /// Tree keys live in the remapped namespace while the skip filter sees
    /// walker paths, so each discovered path is compared after remapping.
    /// A path the remapper rejects is kept so resolution reports it.
    fn populated_paths<S: SecretSchema + ?Sized>(
        &self,
        resolver: &SecretResolver,
        schema: &S,
    ) -> ConfigResult<Vec<String>> {
        let populated: BTreeSet<String> = self.tree.keys().into_iter().collect();
        let requests = resolver.discover(schema)?;
        Ok(requests
            .into_keys()
            .filter(|path| {
                self.remapper
                    .map_key(path)
                    .map(|key| populated.contains(&key))
                    .unwrap_or(false)
            })
            .collect())
    }

    fn initialize_runtime(&mut self) -> ConfigResult<Runtime> {
        let runtime = self
            .runtime
            .unwrap_or_else(|| detect_runtime(self.metadata.as_ref()));
        self.tree.set(RUNTIME_KEY, runtime.as_str());

        match runtime {
            Runtime::Local | Runtime::Ci | Runtime::Test => {
                let env = self.environment.unwrap_or_default();
                self.tree.set(ENV_KEY, env.as_str());
                self.tree.set(PROJECT_KEY, self.projects.for_env(env).as_str());
                self.tree.set(REGION_KEY, self.default_region.as_str());
            }
            Runtime::Cloud => {
                let project = self.metadata.project_id()?;
                if self.projects.contains(&project) {
                    let region = region_from_zone(&self.metadata.zone()?)?;
                    let env = Environment::from_project_name(&project);
                    self.tree.set(ENV_KEY, env.as_str());
                    self.tree.set(REGION_KEY, region);
                    self.tree.set(PROJECT_KEY, project);
                } else {
                    debug!(%project, "cloud project is not one of ours, leaving env unset");
                }
            }
        }

        debug!(%runtime, env = ?self.environment(), project = ?self.project(), "runtime initialized");
        Ok(runtime)
    }
}

impl fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("projects", &self.projects)
            .field("default_region", &self.default_region)
            .field("store", &self.store.name())
            .field("file", &self.file)
            .field("runtime", &self.runtime)
            .field("environment", &self.environment)
            .field("overrides", &self.overrides.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Composite, Field, SchemaNode};
    use crate::secrets::MemorySecretStore;
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Debug, Default, Deserialize, PartialEq, Validate)]
    struct Db {
        #[serde(default)]
        host: String,
        #[serde(default)]
        #[validate(length(min = 1, message = "is required"))]
        password: String,
    }

    #[derive(Debug, Default, Deserialize, PartialEq, Validate)]
    struct AppConfig {
        #[serde(default)]
        env: String,
        #[serde(default)]
        project: String,
        #[serde(default)]
        region: String,
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        #[validate(nested)]
        db: Db,
    }

    impl SecretSchema for AppConfig {
        fn schema(&self) -> SchemaNode {
            Composite::new("AppConfig")
                .field(Field::scalar("env").path("env"))
                .field(Field::scalar("api_key").path("api_key").secret("API_KEY"))
                .field(
                    Field::composite(
                        "db",
                        Composite::new("Db")
                            .field(Field::scalar("host").path("host"))
                            .field(Field::scalar("password").path("password").secret("DB_PASSWORD")),
                    )
                    .path("db"),
                )
                .into()
        }
    }

    struct OffCloud;

    impl PlatformMetadata for OffCloud {
        fn on_cloud(&self) -> bool {
            false
        }
        fn project_id(&self) -> ConfigResult<String> {
            Err(ConfigError::Metadata("not on cloud".into()))
        }
        fn zone(&self) -> ConfigResult<String> {
            Err(ConfigError::Metadata("not on cloud".into()))
        }
    }

    fn projects() -> ProjectSet {
        ProjectSet::new("acme-dev".into(), "acme-staging".into(), "acme-prod".into())
    }

    fn store() -> Arc<MemorySecretStore> {
        Arc::new(
            MemorySecretStore::new()
                .with_secret("acme-dev", "API_KEY", "dev-key")
                .with_secret("acme-dev", "DB_PASSWORD", "dev-pw")
                .with_secret("acme-prod", "API_KEY", "prod-key")
                .with_secret("acme-prod", "DB_PASSWORD", "prod-pw"),
        )
    }

    fn local_loader(dir: &TempDir) -> ConfigLoader {
        ConfigLoader::new(projects(), "us-central1", store())
            .with_metadata(Arc::new(OffCloud))
            .with_runtime(Runtime::Local)
            .with_config_path(dir.path().join("config.yaml"))
    }

    #[test]
    fn test_local_defaults_and_secrets() {
        let dir = TempDir::new().unwrap();
        let mut loader = local_loader(&dir)
            .with_defaults(Defaults::new().per_env("db.host", "localhost", "db.staging", "db.prod"));

        let mut config = AppConfig::default();
        loader.initialize(&mut config).unwrap();

        assert_eq!(config.env, "dev");
        assert_eq!(config.project, "acme-dev");
        assert_eq!(config.region, "us-central1");
        assert_eq!(config.api_key, "dev-key");
        assert_eq!(config.db, Db { host: "localhost".into(), password: "dev-pw".into() });
        assert_eq!(loader.runtime(), Some(Runtime::Local));
    }

    #[test]
    fn test_environment_selects_project() {
        let dir = TempDir::new().unwrap();
        let mut loader = local_loader(&dir).with_environment(Environment::Prod);

        let mut config = AppConfig::default();
        loader.initialize(&mut config).unwrap();
        assert_eq!(config.project, "acme-prod");
        assert_eq!(config.api_key, "prod-key");
    }

    #[test]
    fn test_file_layer_values_are_not_fetched() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.yaml"), "api_key: from-file\n").unwrap();

        // No API_KEY in the store: it must come from the file
        let store = Arc::new(MemorySecretStore::new().with_secret("acme-dev", "DB_PASSWORD", "pw"));
        let mut loader = ConfigLoader::new(projects(), "us-central1", store)
            .with_metadata(Arc::new(OffCloud))
            .with_runtime(Runtime::Local)
            .with_config_path(dir.path().join("config.yaml"));

        let mut config = AppConfig::default();
        loader.initialize(&mut config).unwrap();
        assert_eq!(config.api_key, "from-file");
        assert_eq!(config.db.password, "pw");
    }

    #[test]
    fn test_runtime_override_applies_only_to_its_runtime() {
        let dir = TempDir::new().unwrap();
        let mut loader = local_loader(&dir)
            .with_runtime_override(Runtime::Local, |tree| {
                tree.set("db.host", "override-host");
                Ok(())
            })
            .with_runtime_override(Runtime::Ci, |tree| {
                tree.set("db.host", "ci-host");
                Ok(())
            });

        let mut config = AppConfig::default();
        loader.initialize(&mut config).unwrap();
        assert_eq!(config.db.host, "override-host");
    }

    #[test]
    fn test_fetch_failure_leaves_target_untouched() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MemorySecretStore::new().with_secret("acme-dev", "API_KEY", "k"));
        let mut loader = ConfigLoader::new(projects(), "us-central1", store)
            .with_metadata(Arc::new(OffCloud))
            .with_runtime(Runtime::Test)
            .with_config_path(dir.path().join("config.yaml"));

        let mut config = AppConfig::default();
        let err = loader.initialize(&mut config).unwrap_err();
        assert!(matches!(err, ConfigError::Resolve(_)));
        assert!(err.to_string().contains("DB_PASSWORD"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_validation_failure() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.yaml"), "db:\n  password: \"\"\n").unwrap();

        let mut config = AppConfig::default();
        let err = local_loader(&dir).initialize(&mut config).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref v) if v[0].path == "db.password"));
        assert_eq!(err.to_string(), "could not validate config: db.password: is required");
    }

    #[derive(Debug, Default, Deserialize, Validate)]
    struct UpperConfig {
        #[serde(default)]
        api_key: String,
    }

    impl SecretSchema for UpperConfig {
        fn schema(&self) -> SchemaNode {
            Composite::new("UpperConfig")
                .field(Field::scalar("ApiKey").path("API_KEY").secret("API_KEY"))
                .into()
        }
    }

    #[test]
    fn test_file_values_are_not_fetched_with_remapper() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.yaml"), "api_key: from-file\n").unwrap();

        let mut loader = ConfigLoader::new(projects(), "us-central1", Arc::new(MemorySecretStore::new()))
            .with_metadata(Arc::new(OffCloud))
            .with_runtime(Runtime::Local)
            .with_remapper(KeyRemapper::lowercase())
            .with_config_path(dir.path().join("config.yaml"));

        let mut config = UpperConfig::default();
        loader.initialize(&mut config).unwrap();
        assert_eq!(config.api_key, "from-file");
    }

    #[test]
    fn test_remapped_secret_is_fetched_when_missing() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MemorySecretStore::new().with_secret("acme-dev", "API_KEY", "remote"));
        let mut loader = ConfigLoader::new(projects(), "us-central1", store)
            .with_metadata(Arc::new(OffCloud))
            .with_runtime(Runtime::Local)
            .with_remapper(KeyRemapper::lowercase())
            .with_config_path(dir.path().join("config.yaml"));

        let mut config = UpperConfig::default();
        loader.initialize(&mut config).unwrap();
        assert_eq!(config.api_key, "remote");
    }

    #[test]
    fn test_initialize_twice_fetches_again() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(
            MemorySecretStore::new()
                .with_secret("acme-dev", "API_KEY", "first")
                .with_secret("acme-dev", "DB_PASSWORD", "pw"),
        );
        let mut loader = ConfigLoader::new(projects(), "us-central1", store.clone())
            .with_metadata(Arc::new(OffCloud))
            .with_runtime(Runtime::Local)
            .with_config_path(dir.path().join("config.yaml"));
        loader.set_debug();

        let mut config = AppConfig::default();
        loader.initialize(&mut config).unwrap();
        assert_eq!(config.api_key, "first");

        store.insert("acme-dev", "API_KEY", "rotated");
        loader.initialize(&mut config).unwrap();
        assert_eq!(config.api_key, "rotated");
        assert!(loader.debug());
    }

    #[test]
    fn test_cloud_uses_metadata() {
        let meta = EnvMetadata::from_vars(HashMap::from([
            ("K_SERVICE".to_string(), "api".to_string()),
            ("GOOGLE_CLOUD_PROJECT".to_string(), "acme-prod".to_string()),
            ("GCE_ZONE".to_string(), "europe-west1-b".to_string()),
        ]));
        let mut loader = ConfigLoader::new(projects(), "us-central1", store())
            .with_metadata(Arc::new(meta))
            .with_runtime(Runtime::Cloud)
            .with_config_path("/nonexistent/config.yaml");

        let mut config = AppConfig::default();
        loader.initialize(&mut config).unwrap();
        assert_eq!(config.env, "prod");
        assert_eq!(config.region, "europe-west1");
        assert_eq!(config.api_key, "prod-key");
    }

    #[test]
    fn test_unknown_cloud_project_leaves_env_unset() {
        let meta = EnvMetadata::from_vars(HashMap::from([
            ("K_SERVICE".to_string(), "api".to_string()),
            ("GOOGLE_CLOUD_PROJECT".to_string(), "someone-else".to_string()),
        ]));
        let mut loader = ConfigLoader::new(projects(), "us-central1", store())
            .with_metadata(Arc::new(meta))
            .with_runtime(Runtime::Cloud);

        let mut config = AppConfig::default();
        let err = loader.initialize(&mut config).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSetting(ref key) if key == "env"));
        assert!(loader.environment().is_none());
        assert!(loader.project().is_none());
    }

    #[test]
    fn test_debug_flag() {
        let dir = TempDir::new().unwrap();
        let mut loader = local_loader(&dir);
        assert!(!loader.debug());
        loader.set_debug();
        assert!(loader.debug());
    }
}
