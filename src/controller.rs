//! CRUD REST controller scaffolded per model endpoint: create, find, count, read, update, replace, delete.

use crate::config::{ModelDefinition, PropertyType};
use crate::datasource::Filter;
use crate::error::AppError;
use crate::repository::EntityRepository;
use crate::response::{success_count, success_many, success_one, success_one_ok};
use crate::service::RequestValidator;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

pub struct CrudRestController {
    name: String,
    base_path: String,
    readonly: bool,
    repository: Arc<dyn EntityRepository>,
}

impl CrudRestController {
    pub fn new(base_path: impl Into<String>, readonly: bool, repository: Arc<dyn EntityRepository>) -> Self {
        CrudRestController {
            name: format!("{}Controller", repository.model().name),
            base_path: base_path.into(),
            readonly,
            repository,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn readonly(&self) -> bool {
        self.readonly
    }

    pub fn repository(&self) -> &Arc<dyn EntityRepository> {
        &self.repository
    }

    fn model(&self) -> &ModelDefinition {
        self.repository.model()
    }

    /// Routes under the base path. Readonly controllers only get the GET routes, so writes answer 405.
    pub fn router(self: Arc<Self>) -> Router {
        let prefix = self.base_path.trim_end_matches('/');
        let root = if prefix.is_empty() { "/".to_string() } else { prefix.to_string() };
        let count_path = format!("{}/count", prefix);
        let item_path = format!("{}/:id", prefix);
        let router = if self.readonly {
            Router::new()
                .route(&root, get(find))
                .route(&count_path, get(count))
                .route(&item_path, get(find_by_id))
        } else {
            Router::new()
                .route(&root, get(find).post(create))
                .route(&count_path, get(count))
                .route(
                    &item_path,
                    get(find_by_id).patch(update_by_id).put(replace_by_id).delete(delete_by_id),
                )
        };
        router.with_state(self)
    }
}

fn parse_id(model: &ModelDefinition, id_str: &str) -> Result<Value, AppError> {
    match model.id_property().map(|p| p.type_) {
        Some(PropertyType::Number) => {
            if let Ok(n) = id_str.parse::<i64>() {
                return Ok(Value::Number(n.into()));
            }
            id_str
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| AppError::BadRequest("invalid id".into()))
        }
        _ => Ok(Value::String(id_str.to_string())),
    }
}

fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

fn query_value_for_property(model: &ModelDefinition, prop: &str, s: &str) -> Value {
    match model.properties.get(prop).map(|p| p.type_) {
        Some(PropertyType::Number) => {
            if let Ok(n) = s.parse::<i64>() {
                return Value::Number(n.into());
            }
            if let Some(n) = s.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                return Value::Number(n);
            }
        }
        Some(PropertyType::Boolean) => {
            if s.eq_ignore_ascii_case("true") {
                return Value::Bool(true);
            }
            if s.eq_ignore_ascii_case("false") {
                return Value::Bool(false);
            }
        }
        _ => {}
    }
    Value::String(s.to_string())
}

/// `limit` and `offset` page; any other key naming a model property filters by exact match. Unknown keys are ignored.
fn filter_from_query(model: &ModelDefinition, params: HashMap<String, String>) -> Filter {
    let mut filter = Filter::default();
    for (k, v) in params {
        match k.as_str() {
            "limit" => filter.limit = v.parse().ok(),
            "offset" => filter.offset = v.parse().ok(),
            _ => {
                if model.properties.contains_key(&k) {
                    let val = query_value_for_property(model, &k, &v);
                    filter.where_.push((k, val));
                }
            }
        }
    }
    filter.where_.sort_by(|a, b| a.0.cmp(&b.0));
    filter
}

async fn create(
    State(ctrl): State<Arc<CrudRestController>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_map(body)?;
    RequestValidator::validate(&body, ctrl.model())?;
    let row = ctrl.repository.create(body).await?;
    Ok(success_one(row))
}

async fn find(
    State(ctrl): State<Arc<CrudRestController>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let filter = filter_from_query(ctrl.model(), params);
    let rows = ctrl.repository.find(&filter).await?;
    Ok(success_many(rows))
}

async fn count(
    State(ctrl): State<Arc<CrudRestController>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let filter = filter_from_query(ctrl.model(), params);
    let count = ctrl.repository.count(&filter).await?;
    Ok(success_count(count))
}

async fn find_by_id(
    State(ctrl): State<Arc<CrudRestController>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(ctrl.model(), &id_str)?;
    let row = ctrl
        .repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", ctrl.model().name, id_str)))?;
    Ok(success_one_ok(row))
}

async fn update_by_id(
    State(ctrl): State<Arc<CrudRestController>>,
    Path(id_str): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(ctrl.model(), &id_str)?;
    let body = body_to_map(body)?;
    RequestValidator::validate_partial(&body, ctrl.model())?;
    let row = ctrl
        .repository
        .update_by_id(&id, body)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", ctrl.model().name, id_str)))?;
    Ok(success_one_ok(row))
}

async fn replace_by_id(
    State(ctrl): State<Arc<CrudRestController>>,
    Path(id_str): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(ctrl.model(), &id_str)?;
    let body = body_to_map(body)?;
    RequestValidator::validate(&body, ctrl.model())?;
    let row = ctrl
        .repository
        .replace_by_id(&id, body)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", ctrl.model().name, id_str)))?;
    Ok(success_one_ok(row))
}

async fn delete_by_id(
    State(ctrl): State<Arc<CrudRestController>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(ctrl.model(), &id_str)?;
    if !ctrl.repository.delete_by_id(&id).await? {
        return Err(AppError::NotFound(format!("{} {}", ctrl.model().name, id_str)));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelDefinitionConfig;
    use serde_json::json;

    fn product() -> ModelDefinition {
        let cfg: ModelDefinitionConfig = serde_json::from_value(json!({
            "name": "Product",
            "base": "Entity",
            "properties": {
                "id": { "type": "number", "id": true },
                "name": { "type": "string" },
                "inStock": { "type": "boolean" }
            }
        }))
        .unwrap();
        ModelDefinition::from_config(cfg, "product").unwrap()
    }

    #[test]
    fn numeric_ids_parsed() {
        let m = product();
        assert_eq!(parse_id(&m, "42").unwrap(), json!(42));
        assert!(matches!(parse_id(&m, "abc"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn query_builds_typed_filter() {
        let params: HashMap<String, String> = [
            ("limit", "5"),
            ("inStock", "true"),
            ("id", "3"),
            ("unknown", "x"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let filter = filter_from_query(&product(), params);
        assert_eq!(filter.limit, Some(5));
        assert_eq!(
            filter.where_,
            vec![("id".to_string(), json!(3)), ("inStock".to_string(), json!(true))]
        );
    }
}
