//! Entity repositories: the CRUD seam between controllers and data sources.

use crate::config::ModelDefinition;
use crate::datasource::{DataSource, Filter};
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

#[async_trait]
pub trait EntityRepository: Send + Sync {
    fn model(&self) -> &ModelDefinition;

    async fn create(&self, data: Map<String, Value>) -> Result<Value, AppError>;

    async fn find(&self, filter: &Filter) -> Result<Vec<Value>, AppError>;

    async fn count(&self, filter: &Filter) -> Result<u64, AppError>;

    async fn find_by_id(&self, id: &Value) -> Result<Option<Value>, AppError>;

    /// Partial update. Returns None when no row has this id.
    async fn update_by_id(&self, id: &Value, data: Map<String, Value>) -> Result<Option<Value>, AppError>;

    async fn replace_by_id(&self, id: &Value, data: Map<String, Value>) -> Result<Option<Value>, AppError>;

    /// Returns whether a row was deleted.
    async fn delete_by_id(&self, id: &Value) -> Result<bool, AppError>;
}

/// Repository created for each scaffolded model unless one is already bound.
pub struct DefaultCrudRepository {
    model: Arc<ModelDefinition>,
    data_source: DataSource,
}

impl DefaultCrudRepository {
    pub fn new(model: Arc<ModelDefinition>, data_source: DataSource) -> Self {
        DefaultCrudRepository { model, data_source }
    }

    pub fn data_source(&self) -> &DataSource {
        &self.data_source
    }
}

#[async_trait]
impl EntityRepository for DefaultCrudRepository {
    fn model(&self) -> &ModelDefinition {
        &self.model
    }

    async fn create(&self, data: Map<String, Value>) -> Result<Value, AppError> {
        self.data_source.store().insert(&self.model, data).await
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Value>, AppError> {
        tracing::debug!(model = %self.model.name, filter = ?filter, "find");
        Ok(self.data_source.store().find(&self.model, filter).await)
    }

    async fn count(&self, filter: &Filter) -> Result<u64, AppError> {
        Ok(self.data_source.store().count(&self.model, filter).await)
    }

    async fn find_by_id(&self, id: &Value) -> Result<Option<Value>, AppError> {
        self.data_source.store().find_by_id(&self.model, id).await
    }

    async fn update_by_id(&self, id: &Value, data: Map<String, Value>) -> Result<Option<Value>, AppError> {
        self.data_source.store().update_by_id(&self.model, id, data, false).await
    }

    async fn replace_by_id(&self, id: &Value, data: Map<String, Value>) -> Result<Option<Value>, AppError> {
        self.data_source.store().update_by_id(&self.model, id, data, true).await
    }

    async fn delete_by_id(&self, id: &Value) -> Result<bool, AppError> {
        self.data_source.store().delete_by_id(&self.model, id).await
    }
}
