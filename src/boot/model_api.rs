use crate::boot::{BootContext, Booter};
use crate::config::{discover_files, load_endpoint_config, validate_file_fields, validate_unique, DiscoveredFile};
use crate::error::ConfigError;
use async_trait::async_trait;

/// Loads `model-endpoints/*-config.json` and hands each config to the builder registered for its pattern.
#[derive(Debug, Default)]
pub struct ModelApiBooter {
    discovered: Vec<DiscoveredFile>,
}

impl ModelApiBooter {
    pub fn new() -> Self {
        ModelApiBooter::default()
    }
}

#[async_trait]
impl Booter for ModelApiBooter {
    fn name(&self) -> &'static str {
        "ModelApiBooter"
    }

    async fn discover(&mut self, ctx: &BootContext<'_>) -> Result<(), ConfigError> {
        self.discovered = discover_files(ctx.project_root, &ctx.options.model_endpoints)?;
        tracing::debug!(count = self.discovered.len(), "discovered model endpoint configs");
        Ok(())
    }

    async fn load(&mut self, ctx: &mut BootContext<'_>) -> Result<(), ConfigError> {
        let mut endpoints = Vec::with_capacity(self.discovered.len());
        let mut staged = Vec::new();
        for file in &self.discovered {
            let config = load_endpoint_config(file).await?;
            let (model_name, pattern) = validate_file_fields(&config, &file.display)?;
            let builder = ctx
                .builder(pattern)
                .ok_or_else(|| ConfigError::UnsupportedPattern(pattern.to_string()))?;
            let model = ctx.model(model_name).ok_or_else(|| ConfigError::UnknownModel {
                name: model_name.to_string(),
                file: file.display.clone(),
            })?;
            let output = builder.build(ctx, model, &config)?;
            endpoints.push(output.endpoint);
            validate_unique(&endpoints)?;
            staged.extend(output.bindings);
        }
        ctx.stage(staged);
        Ok(())
    }
}
