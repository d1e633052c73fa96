//! Model API builders: turn a model endpoint config into bindings. Selected by the config's `pattern`.

mod crud_rest;

pub use crud_rest::{CrudRestApiBuilder, CRUD_REST_PATTERN};

use crate::boot::BootContext;
use crate::config::{ModelDefinition, ModelEndpointConfig, ResolvedEndpoint};
use crate::error::ConfigError;
use crate::registry::Binding;
use std::sync::Arc;

/// What a builder produced for one endpoint config. Bindings are staged, not yet committed.
#[derive(Debug)]
pub struct BuildOutput {
    pub endpoint: ResolvedEndpoint,
    pub bindings: Vec<Binding>,
}

pub trait ModelApiBuilder: Send + Sync {
    /// Value of `pattern` this builder handles, e.g. "CrudRest".
    fn pattern(&self) -> &str;

    fn build(
        &self,
        ctx: &BootContext<'_>,
        model: Arc<ModelDefinition>,
        config: &ModelEndpointConfig,
    ) -> Result<BuildOutput, ConfigError>;
}
