//! Booters discover artifacts under the project root and stage bindings for them.
//! Boot runs every booter's `discover` phase, then every `load` phase; staged bindings are
//! committed by the application only when all booters succeed.

mod model;
mod model_api;

pub use model::ModelBooter;
pub use model_api::ModelApiBooter;

use crate::builder::ModelApiBuilder;
use crate::config::ModelDefinition;
use crate::datasource::DataSource;
use crate::error::ConfigError;
use crate::registry::{Binding, BindingKey, BoundValue, Registry};
use crate::repository::EntityRepository;
use crate::settings::BootOptions;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

#[async_trait]
pub trait Booter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Find the files this booter will load.
    async fn discover(&mut self, ctx: &BootContext<'_>) -> Result<(), ConfigError>;

    /// Load discovered files and stage their bindings.
    async fn load(&mut self, ctx: &mut BootContext<'_>) -> Result<(), ConfigError>;
}

/// Shared state for one boot: read access to committed bindings plus the bindings staged so far.
pub struct BootContext<'a> {
    pub project_root: &'a Path,
    pub options: &'a BootOptions,
    registry: &'a Registry,
    builders: &'a [Arc<dyn ModelApiBuilder>],
    staged: Vec<Binding>,
}

impl<'a> BootContext<'a> {
    pub fn new(
        project_root: &'a Path,
        options: &'a BootOptions,
        registry: &'a Registry,
        builders: &'a [Arc<dyn ModelApiBuilder>],
    ) -> Self {
        BootContext {
            project_root,
            options,
            registry,
            builders,
            staged: Vec::new(),
        }
    }

    pub fn stage(&mut self, bindings: impl IntoIterator<Item = Binding>) {
        self.staged.extend(bindings);
    }

    pub fn into_staged(self) -> Vec<Binding> {
        self.staged
    }

    /// Staged bindings shadow committed ones.
    fn lookup(&self, key: &BindingKey) -> Option<&BoundValue> {
        self.staged
            .iter()
            .rev()
            .find(|b| &b.key == key)
            .or_else(|| self.registry.get(key))
            .map(|b| &b.value)
    }

    pub fn model(&self, name: &str) -> Option<Arc<ModelDefinition>> {
        match self.lookup(&BindingKey::model(name)) {
            Some(BoundValue::Model(m)) => Some(m.clone()),
            _ => None,
        }
    }

    pub fn repository(&self, model: &str) -> Option<Arc<dyn EntityRepository>> {
        match self.lookup(&BindingKey::repository(model)) {
            Some(BoundValue::Repository(r)) => Some(r.clone()),
            _ => None,
        }
    }

    pub fn data_source(&self, name: &str) -> Option<&DataSource> {
        match self.lookup(&BindingKey::data_source(name)) {
            Some(BoundValue::DataSource(ds)) => Some(ds),
            _ => None,
        }
    }

    pub fn builder(&self, pattern: &str) -> Option<&Arc<dyn ModelApiBuilder>> {
        self.builders.iter().find(|b| b.pattern() == pattern)
    }
}
