use crate::boot::{BootContext, Booter};
use crate::config::{discover_files, load_model, DiscoveredFile};
use crate::error::ConfigError;
use crate::registry::{Binding, BindingKey, BoundValue};
use async_trait::async_trait;
use std::sync::Arc;

/// Loads `models/*.model.json` into `models.<Name>` bindings.
#[derive(Debug, Default)]
pub struct ModelBooter {
    discovered: Vec<DiscoveredFile>,
}

impl ModelBooter {
    pub fn new() -> Self {
        ModelBooter::default()
    }
}

#[async_trait]
impl Booter for ModelBooter {
    fn name(&self) -> &'static str {
        "ModelBooter"
    }

    async fn discover(&mut self, ctx: &BootContext<'_>) -> Result<(), ConfigError> {
        self.discovered = discover_files(ctx.project_root, &ctx.options.models)?;
        tracing::debug!(count = self.discovered.len(), "discovered model files");
        Ok(())
    }

    async fn load(&mut self, ctx: &mut BootContext<'_>) -> Result<(), ConfigError> {
        for file in &self.discovered {
            let model = load_model(file).await?;
            if ctx.model(&model.name).is_some() {
                return Err(ConfigError::DuplicateModelDefinition(model.name));
            }
            tracing::debug!(model = %model.name, file = %file.display, entity = model.is_entity(), "loaded model");
            ctx.stage([Binding::new(
                BindingKey::model(&model.name),
                BoundValue::Model(Arc::new(model)),
            )]);
        }
        Ok(())
    }
}
