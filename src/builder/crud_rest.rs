//! CRUD REST scaffolding: one repository and one controller binding per entity.

use crate::boot::BootContext;
use crate::builder::{BuildOutput, ModelApiBuilder};
use crate::config::{resolve_endpoint, ModelDefinition, ModelEndpointConfig};
use crate::controller::CrudRestController;
use crate::error::ConfigError;
use crate::registry::{Binding, BindingKey, BoundValue};
use crate::repository::{DefaultCrudRepository, EntityRepository};
use std::sync::Arc;

pub const CRUD_REST_PATTERN: &str = "CrudRest";

#[derive(Clone, Copy, Debug, Default)]
pub struct CrudRestApiBuilder;

impl ModelApiBuilder for CrudRestApiBuilder {
    fn pattern(&self) -> &str {
        CRUD_REST_PATTERN
    }

    fn build(
        &self,
        ctx: &BootContext<'_>,
        model: Arc<ModelDefinition>,
        config: &ModelEndpointConfig,
    ) -> Result<BuildOutput, ConfigError> {
        let endpoint = resolve_endpoint(config, model.clone())?;
        let data_source = ctx
            .data_source(&endpoint.data_source)
            .ok_or_else(|| ConfigError::UnboundDataSource(endpoint.data_source.clone()))?;

        let mut bindings = Vec::with_capacity(2);
        let repository: Arc<dyn EntityRepository> = match ctx.repository(&model.name) {
            Some(existing) => {
                tracing::info!(model = %model.name, "using the existing repository");
                existing
            }
            None => {
                let repo: Arc<dyn EntityRepository> =
                    Arc::new(DefaultCrudRepository::new(model.clone(), data_source.clone()));
                bindings.push(Binding::new(
                    BindingKey::repository(&model.name),
                    BoundValue::Repository(repo.clone()),
                ));
                repo
            }
        };

        let controller = Arc::new(CrudRestController::new(
            endpoint.base_path.clone(),
            endpoint.readonly,
            repository,
        ));
        bindings.push(Binding::new(
            BindingKey::controller(&model.name),
            BoundValue::Controller(controller),
        ));
        tracing::info!(
            model = %model.name,
            base_path = %endpoint.base_path,
            data_source = %endpoint.data_source,
            readonly = endpoint.readonly,
            "scaffolded CRUD REST endpoint"
        );
        Ok(BuildOutput { endpoint, bindings })
    }
}
