//! Resolution entry point
//!
//! Runs the whole pipeline for one schema: walk, skip, fetch, remap, merge.
//! A call either returns the complete nested tree or a single error.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::fetch::fetch_secrets;
use super::merge::unflatten;
use super::remap::KeyRemapper;
use super::skip::skip_keys;
use crate::error::{ResolveError, ResolveResult};
use crate::pool::WorkerPool;
use crate::schema::{walk, SecretRequests, SecretSchema};
use crate::secrets::SecretStore;

/// Path delimiter used unless configured otherwise
pub const DEFAULT_DELIMITER: &str = ".";

/// Resolves the secret fields of a schema into a nested tree
///
/// ```rust
/// use std::sync::Arc;
/// use secretree_core::{Composite, Field, MemorySecretStore, SecretResolver};
///
/// let store = MemorySecretStore::new().with_secret("acme-dev", "DB_PASSWORD", "hunter2");
/// let schema = Composite::new("Config").field(
///     Field::composite(
///         "Db",
///         Composite::new("Db").field(Field::scalar("Password").path("password").secret("DB_PASSWORD")),
///     )
///     .path("db"),
/// );
///
/// let tree = SecretResolver::new(Arc::new(store), "acme-dev").resolve(&schema).unwrap();
/// assert_eq!(tree["db"]["password"], "hunter2");
/// ```
#[derive(Clone)]
pub struct SecretResolver {
    store: Arc<dyn SecretStore>,
    project: String,
    delimiter: String,
    pool: WorkerPool,
    skip: BTreeSet<String>,
    remapper: KeyRemapper,
}

impl SecretResolver {
    pub fn new(store: Arc<dyn SecretStore>, project: impl Into<String>) -> Self {
        Self {
            store,
            project: project.into(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            pool: WorkerPool::default(),
            skip: BTreeSet::new(),
            remapper: KeyRemapper::identity(),
        }
    }

    /// Set the path delimiter; an empty delimiter keeps the default
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        let delimiter = delimiter.into();
        if !delimiter.is_empty() {
            self.delimiter = delimiter;
        }
        self
    }

    /// Maximum number of store calls in flight; 0 means the default
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.pool = WorkerPool::new(concurrency);
        self
    }

    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = pool;
        self
    }

    /// Paths that are already populated and must not be fetched
    pub fn with_skip_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.skip.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn with_remapper(mut self, remapper: KeyRemapper) -> Self {
        self.remapper = remapper;
        self
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn store(&self) -> &Arc<dyn SecretStore> {
        &self.store
    }

    /// Secret requests that a resolution would fetch, after skip keys
    pub fn discover<S: SecretSchema + ?Sized>(&self, target: &S) -> ResolveResult<SecretRequests> {
        let requests = walk(target, &self.delimiter)?;
        Ok(skip_keys(requests, &self.skip))
    }

    /// Resolve every secret field of `target` into a nested tree
    pub fn resolve<S: SecretSchema + ?Sized>(&self, target: &S) -> ResolveResult<Map<String, Value>> {
        let requests = self.discover(target)?;
        if requests.is_empty() {
            debug!(project = %self.project, "no secrets to resolve");
            return Ok(Map::new());
        }

        let values = fetch_secrets(self.store.as_ref(), &self.project, &requests, &self.pool)?;
        let values = self.remapper.apply(values)?;
        let tree = unflatten(&values, &self.delimiter)?;

        info!(
            project = %self.project,
            store = self.store.name(),
            count = values.len(),
            "resolved secrets"
        );
        Ok(tree)
    }

    /// Resolve on tokio's blocking pool, for async callers
    pub async fn resolve_async<S: SecretSchema + ?Sized>(
        &self,
        target: &S,
    ) -> ResolveResult<Map<String, Value>> {
        let schema = target.schema();
        let resolver = self.clone();
        tokio::task::spawn_blocking(move || resolver.resolve(&schema))
            .await
            .map_err(|e| ResolveError::Task(e.to_string()))?
    }
}

impl std::fmt::Debug for SecretResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretResolver")
            .field("store", &self.store.name())
            .field("project", &self.project)
            .field("delimiter", &self.delimiter)
            .field("pool", &self.pool)
            .field("skip", &self.skip)
            .field("remapper", &self.remapper)
            .finish()
    }
}
