//! Per-environment values and the defaults layer

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::runtime::Environment;
use super::tree::ConfigTree;

/// One value for each deployment environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvSet<T> {
    pub dev: T,
    pub staging: T,
    pub prod: T,
}

impl<T> EnvSet<T> {
    pub fn new(dev: T, staging: T, prod: T) -> Self {
        Self { dev, staging, prod }
    }

    pub fn for_env(&self, env: Environment) -> &T {
        match env {
            Environment::Dev => &self.dev,
            Environment::Staging => &self.staging,
            Environment::Prod => &self.prod,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        [&self.dev, &self.staging, &self.prod].into_iter()
    }
}

/// The cloud projects that belong to this service, one per environment
pub type ProjectSet = EnvSet<String>;

impl ProjectSet {
    /// Whether `project` is one of this service's own projects
    pub fn contains(&self, project: &str) -> bool {
        self.iter().any(|p| p == project)
    }
}

/// A default that is either fixed or chosen by environment
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Fixed(Value),
    PerEnv(EnvSet<Value>),
}

impl DefaultValue {
    pub fn for_env(&self, env: Environment) -> &Value {
        match self {
            DefaultValue::Fixed(value) => value,
            DefaultValue::PerEnv(set) => set.for_env(env),
        }
    }
}

/// Default settings keyed by dotted path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Defaults {
    entries: BTreeMap<String, DefaultValue>,
}

impl Defaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same value in every environment
    pub fn fixed(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), DefaultValue::Fixed(value.into()));
        self
    }

    pub fn per_env(
        mut self,
        key: impl Into<String>,
        dev: impl Into<Value>,
        staging: impl Into<Value>,
        prod: impl Into<Value>,
    ) -> Self {
        self.entries.insert(
            key.into(),
            DefaultValue::PerEnv(EnvSet::new(dev.into(), staging.into(), prod.into())),
        );
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: DefaultValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write every default for `env` into the tree
    pub fn apply(&self, env: Environment, tree: &mut ConfigTree) {
        for (key, value) in &self.entries {
            tree.set(key, value.for_env(env).clone());
        }
    }
}
