//! Data sources bound under `datasources.<name>`. Only the in-memory connector ships.

use crate::config::{ModelDefinition, PropertyType};
use crate::error::AppError;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Debug)]
pub enum Connector {
    Memory(MemoryStore),
}

impl Connector {
    pub fn name(&self) -> &'static str {
        match self {
            Connector::Memory(_) => "memory",
        }
    }
}

#[derive(Clone, Debug)]
pub struct DataSource {
    pub name: String,
    pub connector: Connector,
}

impl DataSource {
    pub fn memory(name: impl Into<String>) -> Self {
        DataSource {
            name: name.into(),
            connector: Connector::Memory(MemoryStore::default()),
        }
    }

    pub fn store(&self) -> &MemoryStore {
        match &self.connector {
            Connector::Memory(store) => store,
        }
    }
}

/// Exact-match filters with paging.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    pub where_: Vec<(String, Value)>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Filter {
    fn matches(&self, row: &Map<String, Value>) -> bool {
        self.where_
            .iter()
            .all(|(k, v)| row.get(k).map(|r| value_eq(r, v)).unwrap_or(false))
    }
}

#[derive(Debug, Default)]
struct Collection {
    next_id: i64,
    rows: Vec<Map<String, Value>>,
}

impl Collection {
    fn position(&self, id_prop: &str, id: &Value) -> Option<usize> {
        self.rows
            .iter()
            .position(|r| r.get(id_prop).map(|v| value_eq(v, id)).unwrap_or(false))
    }
}

/// In-process storage: one collection per model name, rows kept in insertion order.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

fn id_prop(model: &ModelDefinition) -> Result<&str, AppError> {
    model
        .id_property
        .as_deref()
        .ok_or_else(|| AppError::BadRequest(format!("model {} has no id property", model.name)))
}

impl MemoryStore {
    /// Insert a row, assigning an id when absent: sequential for numeric ids, uuid v4 for string ids.
    pub async fn insert(&self, model: &ModelDefinition, mut row: Map<String, Value>) -> Result<Value, AppError> {
        let id_prop = id_prop(model)?;
        let mut guard = self.collections.write().await;
        let coll = guard.entry(model.name.clone()).or_default();
        match row.get(id_prop).filter(|v| !v.is_null()) {
            Some(id) => {
                if coll.position(id_prop, id).is_some() {
                    return Err(AppError::Conflict(format!("{} with id {} already exists", model.name, id)));
                }
                if let Some(n) = id.as_i64() {
                    coll.next_id = coll.next_id.max(n);
                }
            }
            None => {
                let id = match model.id_property().map(|p| p.type_) {
                    Some(PropertyType::String) => Value::String(uuid::Uuid::new_v4().to_string()),
                    _ => {
                        coll.next_id = coll.next_id.checked_add(1).ok_or_else(|| {
                            AppError::Conflict(format!("{} id sequence is exhausted", model.name))
                        })?;
                        Value::Number(coll.next_id.into())
                    }
                };
                row.insert(id_prop.to_string(), id);
            }
        }
        coll.rows.push(row.clone());
        tracing::debug!(model = %model.name, "memory insert");
        Ok(Value::Object(row))
    }

    pub async fn find(&self, model: &ModelDefinition, filter: &Filter) -> Vec<Value> {
        const DEFAULT_LIMIT: u32 = 100;
        let limit = filter.limit.unwrap_or(DEFAULT_LIMIT).min(1000) as usize;
        let offset = filter.offset.unwrap_or(0) as usize;
        let guard = self.collections.read().await;
        let Some(coll) = guard.get(&model.name) else {
            return Vec::new();
        };
        coll.rows
            .iter()
            .filter(|r| filter.matches(r))
            .skip(offset)
            .take(limit)
            .map(|r| Value::Object(r.clone()))
            .collect()
    }

    pub async fn count(&self, model: &ModelDefinition, filter: &Filter) -> u64 {
        let guard = self.collections.read().await;
        guard
            .get(&model.name)
            .map(|c| c.rows.iter().filter(|r| filter.matches(r)).count() as u64)
            .unwrap_or(0)
    }

    pub async fn find_by_id(&self, model: &ModelDefinition, id: &Value) -> Result<Option<Value>, AppError> {
        let id_prop = id_prop(model)?;
        let guard = self.collections.read().await;
        Ok(guard
            .get(&model.name)
            .and_then(|c| c.position(id_prop, id).map(|i| Value::Object(c.rows[i].clone()))))
    }

    /// Merge `patch` into the row (`replace` swaps the whole row). The id property is never changed.
    pub async fn update_by_id(
        &self,
        model: &ModelDefinition,
        id: &Value,
        patch: Map<String, Value>,
        replace: bool,
    ) -> Result<Option<Value>, AppError> {
        let id_prop = id_prop(model)?;
        let mut guard = self.collections.write().await;
        let Some(coll) = guard.get_mut(&model.name) else {
            return Ok(None);
        };
        let Some(i) = coll.position(id_prop, id) else {
            return Ok(None);
        };
        let row = &mut coll.rows[i];
        let stored_id = row.get(id_prop).cloned().unwrap_or(Value::Null);
        if replace {
            row.clear();
        }
        for (k, v) in patch {
            if k != id_prop {
                row.insert(k, v);
            }
        }
        row.insert(id_prop.to_string(), stored_id);
        Ok(Some(Value::Object(row.clone())))
    }

    pub async fn delete_by_id(&self, model: &ModelDefinition, id: &Value) -> Result<bool, AppError> {
        let id_prop = id_prop(model)?;
        let mut guard = self.collections.write().await;
        let Some(coll) = guard.get_mut(&model.name) else {
            return Ok(false);
        };
        match coll.position(id_prop, id) {
            Some(i) => {
                coll.rows.remove(i);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

pub(crate) fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(s), Value::String(t)) => s == t,
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelDefinitionConfig;
    use serde_json::json;

    fn model(id_type: &str) -> ModelDefinition {
        let cfg: ModelDefinitionConfig = serde_json::from_value(json!({
            "name": "Product",
            "base": "Entity",
            "properties": { "id": { "type": id_type, "id": true }, "name": { "type": "string" } }
        }))
        .unwrap();
        ModelDefinition::from_config(cfg, "product").unwrap()
    }

    fn row(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn numeric_ids_are_sequential() {
        let ds = DataSource::memory("db");
        let m = model("number");
        let a = ds.store().insert(&m, row(json!({"name": "a"}))).await.unwrap();
        let b = ds.store().insert(&m, row(json!({"name": "b"}))).await.unwrap();
        assert_eq!(a["id"], json!(1));
        assert_eq!(b["id"], json!(2));
        assert_eq!(ds.store().count(&m, &Filter::default()).await, 2);
    }

    #[tokio::test]
    async fn string_ids_are_generated() {
        let ds = DataSource::memory("db");
        let m = model("string");
        let a = ds.store().insert(&m, row(json!({"name": "a"}))).await.unwrap();
        assert!(uuid::Uuid::parse_str(a["id"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn duplicate_id_conflicts() {
        let ds = DataSource::memory("db");
        let m = model("number");
        ds.store().insert(&m, row(json!({"id": 7}))).await.unwrap();
        let err = ds.store().insert(&m, row(json!({"id": 7}))).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        let next = ds.store().insert(&m, row(json!({}))).await.unwrap();
        assert_eq!(next["id"], json!(8));
    }

    #[tokio::test]
    async fn exhausted_id_sequence_conflicts() {
        let ds = DataSource::memory("db");
        let m = model("number");
        ds.store().insert(&m, row(json!({"id": i64::MAX}))).await.unwrap();
        let err = ds.store().insert(&m, row(json!({"name": "b"}))).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(ds.store().count(&m, &Filter::default()).await, 1);
    }

    #[tokio::test]
    async fn filter_and_paging() {
        let ds = DataSource::memory("db");
        let m = model("number");
        for name in ["a", "b", "a", "a"] {
            ds.store().insert(&m, row(json!({"name": name}))).await.unwrap();
        }
        let filter = Filter {
            where_: vec![("name".into(), json!("a"))],
            limit: Some(2),
            offset: Some(1),
        };
        let rows = ds.store().find(&m, &filter).await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], json!(3));
    }

    #[tokio::test]
    async fn update_keeps_id() {
        let ds = DataSource::memory("db");
        let m = model("number");
        ds.store().insert(&m, row(json!({"name": "a", "extra": 1}))).await.unwrap();
        let updated = ds
            .store()
            .update_by_id(&m, &json!(1), row(json!({"id": 99, "name": "b"})), true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated, json!({"id": 1, "name": "b"}));
        assert!(ds.store().delete_by_id(&m, &json!(1)).await.unwrap());
        assert!(!ds.store().delete_by_id(&m, &json!(1)).await.unwrap());
    }
}
