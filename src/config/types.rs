//! Raw config types matching the on-disk JSON files (models/*.model.json and model-endpoints/*.rest-config.json).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Model endpoint configuration. Every field is optional at parse time so missing ones surface as
/// descriptive validation errors instead of serde errors.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelEndpointConfig {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub data_source: Option<String>,
    #[serde(default)]
    pub base_path: Option<String>,
    /// Only expose read routes.
    #[serde(default)]
    pub readonly: bool,
}

/// Base class of a model definition.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ModelBase {
    /// Has identity (an id property) and can be persisted.
    Entity,
    /// Value-only model.
    #[default]
    Model,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Number,
    Boolean,
    Date,
    Object,
    Array,
    Any,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    #[serde(rename = "type")]
    pub type_: PropertyType,
    #[serde(default)]
    pub id: bool,
    #[serde(default)]
    pub required: bool,
    /// Value is assigned by the data source when omitted on create.
    #[serde(default)]
    pub generated: bool,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ModelDefinitionConfig {
    /// Defaults to the file stem in PascalCase.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub base: ModelBase,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyDefinition>,
}
