//! Resolved model and endpoint definitions: config validated and flattened for runtime use.

use crate::case::to_pascal_case;
use crate::config::types::{ModelBase, ModelDefinitionConfig, PropertyDefinition, PropertyType};
use crate::error::ConfigError;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct ModelDefinition {
    pub name: String,
    pub base: ModelBase,
    pub properties: BTreeMap<String, PropertyDefinition>,
    /// Set for entities only.
    pub id_property: Option<String>,
    /// Compiled `pattern` rules, keyed by property name.
    pub patterns: HashMap<String, Regex>,
}

impl ModelDefinition {
    /// Build a model definition from its file config. `file_stem` names the model when the config has no `name`.
    pub fn from_config(config: ModelDefinitionConfig, file_stem: &str) -> Result<Self, ConfigError> {
        let name = match config.name {
            Some(n) if !n.trim().is_empty() => n,
            _ => to_pascal_case(file_stem),
        };
        if name.is_empty() {
            return Err(ConfigError::InvalidModel {
                model: file_stem.to_string(),
                reason: "model name is empty".into(),
            });
        }

        let ids: Vec<&String> = config
            .properties
            .iter()
            .filter(|(_, p)| p.id)
            .map(|(k, _)| k)
            .collect();
        let id_property = match config.base {
            ModelBase::Entity => {
                if ids.len() != 1 {
                    return Err(ConfigError::InvalidModel {
                        model: name,
                        reason: format!("an Entity needs exactly one id property, found {}", ids.len()),
                    });
                }
                let id = ids[0].clone();
                let id_type = config.properties[&id].type_;
                if !matches!(id_type, PropertyType::String | PropertyType::Number) {
                    return Err(ConfigError::InvalidModel {
                        model: name,
                        reason: format!("id property {} must be a string or number", id),
                    });
                }
                Some(id)
            }
            ModelBase::Model => None,
        };

        let mut patterns = HashMap::new();
        for (prop, def) in &config.properties {
            if let Some(pattern) = &def.pattern {
                let re = Regex::new(pattern).map_err(|e| ConfigError::InvalidModel {
                    model: name.clone(),
                    reason: format!("invalid pattern for {}: {}", prop, e),
                })?;
                patterns.insert(prop.clone(), re);
            }
        }

        Ok(ModelDefinition {
            name,
            base: config.base,
            properties: config.properties,
            id_property,
            patterns,
        })
    }

    pub fn is_entity(&self) -> bool {
        self.base == ModelBase::Entity
    }

    pub fn id_property(&self) -> Option<&PropertyDefinition> {
        self.id_property.as_ref().and_then(|id| self.properties.get(id))
    }
}

/// A model endpoint whose config passed validation.
#[derive(Clone, Debug)]
pub struct ResolvedEndpoint {
    pub model: Arc<ModelDefinition>,
    pub pattern: String,
    pub data_source: String,
    pub base_path: String,
    pub readonly: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ModelDefinitionConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn name_falls_back_to_file_stem() {
        let def = ModelDefinition::from_config(parse(r#"{"properties":{}}"#), "no-entity").unwrap();
        assert_eq!(def.name, "NoEntity");
        assert!(!def.is_entity());
    }

    #[test]
    fn entity_requires_single_id() {
        let err = ModelDefinition::from_config(
            parse(r#"{"name":"Product","base":"Entity","properties":{"name":{"type":"string"}}}"#),
            "product",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidModel { .. }));
    }

    #[test]
    fn entity_id_property_resolved() {
        let def = ModelDefinition::from_config(
            parse(r#"{"name":"Product","base":"Entity","properties":{"id":{"type":"number","id":true,"generated":true}}}"#),
            "product",
        )
        .unwrap();
        assert_eq!(def.id_property.as_deref(), Some("id"));
        assert!(def.id_property().unwrap().generated);
    }

    #[test]
    fn bad_pattern_rejected() {
        let err = ModelDefinition::from_config(
            parse(r#"{"properties":{"sku":{"type":"string","pattern":"("}}}"#),
            "thing",
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid pattern for sku"));
    }
}
