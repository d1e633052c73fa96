//! Typed errors and HTTP mapping.

use crate::application::ApplicationState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while discovering, validating and scaffolding model endpoints. Any of these rejects the boot.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field \"{field}\" in configuration for model {model}.")]
    MissingField { field: &'static str, model: String },
    #[error("Missing required field \"{field}\" in configuration file {file}.")]
    MissingFileField { field: &'static str, file: String },
    #[error("CrudRestController requires an Entity, Models are not supported")]
    EntityRequired { model: String },
    #[error("Unsupported API pattern \"{0}\"")]
    UnsupportedPattern(String),
    #[error("Model \"{name}\" referenced in {file} was not found")]
    UnknownModel { name: String, file: String },
    #[error("Data source \"{0}\" is not bound")]
    UnboundDataSource(String),
    #[error("duplicate model endpoint for model {0}")]
    DuplicateModel(String),
    #[error("duplicate base path: {0}")]
    DuplicateBasePath(String),
    #[error("invalid base path \"{base_path}\" for model {model}: must start with '/' and have no ':' or '*' segments")]
    InvalidBasePath { base_path: String, model: String },
    #[error("base path \"{base_path}\" for model {model} is reserved")]
    ReservedBasePath { base_path: String, model: String },
    #[error("base path \"{base_path}\" collides with the routes under \"{other}\"")]
    ConflictingBasePath { base_path: String, other: String },
    #[error("duplicate model definition: {0}")]
    DuplicateModelDefinition(String),
    #[error("invalid model {model}: {reason}")]
    InvalidModel { model: String, reason: String },
    #[error("config load: {path}: {message}")]
    Load { path: String, message: String },
}

impl ConfigError {
    pub(crate) fn load(path: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        ConfigError::Load {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

/// Application lifecycle failures.
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Cannot {op} the application as it is {state}")]
    InvalidState { op: &'static str, state: ApplicationState },
    #[error(transparent)]
    Boot(#[from] ConfigError),
    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("malformed binding key: {0}")]
    MalformedKey(String),
    #[error("The key '{0}' is not bound to any value")]
    NotBound(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_base_path_message_names_model() {
        let err = ConfigError::MissingField {
            field: "basePath",
            model: "Product".into(),
        };
        assert_eq!(
            err.to_string(),
            "Missing required field \"basePath\" in configuration for model Product."
        );
    }

    #[test]
    fn entity_required_message() {
        let err = ConfigError::EntityRequired { model: "NoEntity".into() };
        assert_eq!(err.to_string(), "CrudRestController requires an Entity, Models are not supported");
    }

    #[test]
    fn invalid_state_message() {
        let err = LifecycleError::InvalidState {
            op: "stop",
            state: ApplicationState::Booting,
        };
        assert_eq!(err.to_string(), "Cannot stop the application as it is booting");
    }
}
