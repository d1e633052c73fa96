//! Config validation: required fields and model compatibility.

use crate::config::{ModelDefinition, ModelEndpointConfig, ResolvedEndpoint};
use crate::error::ConfigError;
use crate::routes::COMMON_PATHS;
use std::collections::HashSet;
use std::sync::Arc;

/// Fields needed before an endpoint config can be dispatched to a builder.
/// Returns (model name, pattern).
pub fn validate_file_fields<'a>(config: &'a ModelEndpointConfig, file: &str) -> Result<(&'a str, &'a str), ConfigError> {
    let model = present(config.model.as_deref()).ok_or_else(|| ConfigError::MissingFileField {
        field: "model",
        file: file.to_string(),
    })?;
    let pattern = present(config.pattern.as_deref()).ok_or_else(|| ConfigError::MissingFileField {
        field: "pattern",
        file: file.to_string(),
    })?;
    Ok((model, pattern))
}

/// Validate a CRUD REST endpoint config against its model. Checks basePath, then entity semantics, then dataSource.
pub fn validate(config: &ModelEndpointConfig, model: &ModelDefinition) -> Result<(), ConfigError> {
    let base_path = present(config.base_path.as_deref()).ok_or_else(|| ConfigError::MissingField {
        field: "basePath",
        model: model.name.clone(),
    })?;
    if !model.is_entity() {
        return Err(ConfigError::EntityRequired {
            model: model.name.clone(),
        });
    }
    if present(config.data_source.as_deref()).is_none() {
        return Err(ConfigError::MissingField {
            field: "dataSource",
            model: model.name.clone(),
        });
    }
    if !base_path.starts_with('/') || base_path.split('/').any(|seg| seg.contains([':', '*'])) {
        return Err(ConfigError::InvalidBasePath {
            base_path: base_path.to_string(),
            model: model.name.clone(),
        });
    }
    if COMMON_PATHS.contains(&base_path.trim_end_matches('/')) {
        return Err(ConfigError::ReservedBasePath {
            base_path: base_path.to_string(),
            model: model.name.clone(),
        });
    }
    Ok(())
}

/// Validate, then flatten into a [`ResolvedEndpoint`].
pub fn resolve_endpoint(config: &ModelEndpointConfig, model: Arc<ModelDefinition>) -> Result<ResolvedEndpoint, ConfigError> {
    validate(config, &model)?;
    let base_path = config.base_path.as_deref().unwrap_or_default().trim_end_matches('/');
    Ok(ResolvedEndpoint {
        model,
        pattern: config.pattern.clone().unwrap_or_default(),
        data_source: config.data_source.clone().unwrap_or_default(),
        base_path: if base_path.is_empty() { "/".into() } else { base_path.to_string() },
        readonly: config.readonly,
    })
}

/// Reject two endpoints for one model or one base path, and base paths that land on
/// another endpoint's `/count` or `/:id` route.
pub fn validate_unique(endpoints: &[ResolvedEndpoint]) -> Result<(), ConfigError> {
    let mut models = HashSet::new();
    let mut paths = HashSet::new();
    for e in endpoints {
        if !models.insert(e.model.name.as_str()) {
            return Err(ConfigError::DuplicateModel(e.model.name.clone()));
        }
        if !paths.insert(e.base_path.as_str()) {
            return Err(ConfigError::DuplicateBasePath(e.base_path.clone()));
        }
    }
    for e in endpoints {
        if let Some(other) = endpoints.iter().find(|o| is_item_route_of(&o.base_path, &e.base_path)) {
            return Err(ConfigError::ConflictingBasePath {
                base_path: e.base_path.clone(),
                other: other.base_path.clone(),
            });
        }
    }
    Ok(())
}

/// True when `path` sits exactly one segment below `base`.
fn is_item_route_of(base: &str, path: &str) -> bool {
    path.strip_prefix(base.trim_end_matches('/'))
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|seg| !seg.is_empty() && !seg.contains('/'))
}

fn present(v: Option<&str>) -> Option<&str> {
    v.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelDefinitionConfig;

    fn model(json: &str) -> Arc<ModelDefinition> {
        let cfg: ModelDefinitionConfig = serde_json::from_str(json).unwrap();
        Arc::new(ModelDefinition::from_config(cfg, "m").unwrap())
    }

    fn product() -> Arc<ModelDefinition> {
        model(r#"{"name":"Product","base":"Entity","properties":{"id":{"type":"number","id":true}}}"#)
    }

    fn config(base_path: Option<&str>) -> ModelEndpointConfig {
        ModelEndpointConfig {
            model: Some("Product".into()),
            pattern: Some("CrudRest".into()),
            data_source: Some("db".into()),
            base_path: base_path.map(String::from),
            readonly: false,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(validate(&config(Some("/products")), &product()).is_ok());
    }

    #[test]
    fn missing_base_path_checked_before_entity() {
        let no_entity = model(r#"{"name":"NoEntity","properties":{}}"#);
        let err = validate(&config(None), &no_entity).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required field \"basePath\" in configuration for model NoEntity."
        );
    }

    #[test]
    fn plain_model_rejected() {
        let no_entity = model(r#"{"name":"NoEntity","properties":{}}"#);
        let err = validate(&config(Some("/no-entities")), &no_entity).unwrap_err();
        assert!(matches!(err, ConfigError::EntityRequired { .. }));
    }

    #[test]
    fn missing_data_source_rejected() {
        let mut cfg = config(Some("/products"));
        cfg.data_source = Some(" ".into());
        let err = validate(&cfg, &product()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required field \"dataSource\" in configuration for model Product."
        );
    }

    #[test]
    fn relative_base_path_rejected() {
        let err = validate(&config(Some("products")), &product()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBasePath { .. }));
    }

    #[test]
    fn file_fields_required() {
        let mut cfg = config(Some("/products"));
        cfg.pattern = None;
        let err = validate_file_fields(&cfg, "product.rest-config.json").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required field \"pattern\" in configuration file product.rest-config.json."
        );
    }

    #[test]
    fn trailing_slash_trimmed() {
        let e = resolve_endpoint(&config(Some("/products/")), product()).unwrap();
        assert_eq!(e.base_path, "/products");
    }

    #[test]
    fn route_syntax_and_reserved_paths_rejected() {
        for p in ["/products/:id", "/files/*rest", "/a:b"] {
            let err = validate(&config(Some(p)), &product()).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidBasePath { .. }), "{p}");
        }
        for p in ["/health", "/ready/", "/version", "/info"] {
            let err = validate(&config(Some(p)), &product()).unwrap_err();
            assert!(matches!(err, ConfigError::ReservedBasePath { .. }), "{p}");
        }
        assert!(validate(&config(Some("/health/products")), &product()).is_ok());
    }

    #[test]
    fn item_route_collisions_rejected() {
        let item = model(r#"{"name":"Item","base":"Entity","properties":{"id":{"type":"number","id":true}}}"#);
        let a = resolve_endpoint(&config(Some("/products")), product()).unwrap();
        let b = resolve_endpoint(&config(Some("/products/count")), item.clone()).unwrap();
        let err = validate_unique(&[a.clone(), b]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "base path \"/products/count\" collides with the routes under \"/products\""
        );

        let nested = resolve_endpoint(&config(Some("/products/1/items")), item.clone()).unwrap();
        assert!(validate_unique(&[a, nested]).is_ok());

        let root = resolve_endpoint(&config(Some("/")), product()).unwrap();
        let top = resolve_endpoint(&config(Some("/items")), item).unwrap();
        assert!(matches!(
            validate_unique(&[root, top]),
            Err(ConfigError::ConflictingBasePath { ref other, .. }) if other == "/"
        ));
    }

    #[test]
    fn duplicates_rejected() {
        let a = resolve_endpoint(&config(Some("/products")), product()).unwrap();
        let b = resolve_endpoint(&config(Some("/items")), product()).unwrap();
        assert!(matches!(validate_unique(&[a, b]), Err(ConfigError::DuplicateModel(_))));
    }
}
