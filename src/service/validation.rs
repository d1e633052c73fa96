//! Request validation from model property definitions.

use crate::config::{ModelDefinition, PropertyDefinition, PropertyType};
use crate::error::AppError;
use serde_json::{Map, Value};

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a full body (create / replace). All required properties must be present; generated ids may be omitted.
    pub fn validate(body: &Map<String, Value>, model: &ModelDefinition) -> Result<(), AppError> {
        reject_unknown(body, model)?;
        for (prop, def) in &model.properties {
            let val = body.get(prop);
            let missing = val.is_none() || val == Some(&Value::Null);
            if missing && def.required && !def.generated {
                return Err(AppError::Validation(format!("{} is required", prop)));
            }
            if let Some(v) = val {
                validate_field(prop, v, def, model)?;
            }
        }
        Ok(())
    }

    /// Validate only the fields present in body (for PATCH). Required is not enforced for missing fields.
    pub fn validate_partial(body: &Map<String, Value>, model: &ModelDefinition) -> Result<(), AppError> {
        reject_unknown(body, model)?;
        for (prop, v) in body {
            if let Some(def) = model.properties.get(prop) {
                if v.is_null() && def.required {
                    return Err(AppError::Validation(format!("{} is required", prop)));
                }
                validate_field(prop, v, def, model)?;
            }
        }
        Ok(())
    }
}

fn reject_unknown(body: &Map<String, Value>, model: &ModelDefinition) -> Result<(), AppError> {
    match body.keys().find(|k| !model.properties.contains_key(*k)) {
        Some(k) => Err(AppError::Validation(format!("unknown property {} for model {}", k, model.name))),
        None => Ok(()),
    }
}

fn validate_field(prop: &str, v: &Value, def: &PropertyDefinition, model: &ModelDefinition) -> Result<(), AppError> {
    if v.is_null() {
        return Ok(());
    }
    validate_type(prop, v, def.type_)?;
    if let Some(max) = def.max_length {
        if let Some(s) = v.as_str() {
            if s.chars().count() > max as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at most {} characters",
                    prop, max
                )));
            }
        }
    }
    if let Some(min) = def.min_length {
        if let Some(s) = v.as_str() {
            if s.chars().count() < min as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at least {} characters",
                    prop, min
                )));
            }
        }
    }
    if let Some(re) = model.patterns.get(prop) {
        if let Some(s) = v.as_str() {
            if !re.is_match(s) {
                return Err(AppError::Validation(format!("{} does not match required pattern", prop)));
            }
        }
    }
    if let Some(min) = def.minimum {
        if let Some(n) = v.as_f64() {
            if n < min {
                return Err(AppError::Validation(format!("{} must be at least {}", prop, min)));
            }
        }
    }
    if let Some(max) = def.maximum {
        if let Some(n) = v.as_f64() {
            if n > max {
                return Err(AppError::Validation(format!("{} must be at most {}", prop, max)));
            }
        }
    }
    Ok(())
}

fn validate_type(prop: &str, v: &Value, ty: PropertyType) -> Result<(), AppError> {
    let ok = match ty {
        PropertyType::String => v.is_string(),
        PropertyType::Number => v.is_number(),
        PropertyType::Boolean => v.is_boolean(),
        PropertyType::Object => v.is_object(),
        PropertyType::Array => v.is_array(),
        PropertyType::Any => true,
        PropertyType::Date => v.as_str().map(is_date).unwrap_or(false),
    };
    if ok {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{} must be of type {}",
            prop,
            format!("{:?}", ty).to_lowercase()
        )))
    }
}

fn is_date(s: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(s).is_ok() || chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
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
                "id": { "type": "number", "id": true, "generated": true, "required": true },
                "name": { "type": "string", "required": true, "maxLength": 5 },
                "sku": { "type": "string", "pattern": "^[A-Z]{3}$" },
                "price": { "type": "number", "minimum": 0 },
                "releasedAt": { "type": "date" }
            }
        }))
        .unwrap();
        ModelDefinition::from_config(cfg, "product").unwrap()
    }

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn generated_id_may_be_omitted() {
        assert!(RequestValidator::validate(&body(json!({"name": "pen"})), &product()).is_ok());
    }

    #[test]
    fn required_enforced_on_full_body_only() {
        let m = product();
        assert!(RequestValidator::validate(&body(json!({"price": 1})), &m).is_err());
        assert!(RequestValidator::validate_partial(&body(json!({"price": 1})), &m).is_ok());
        assert!(RequestValidator::validate_partial(&body(json!({"name": null})), &m).is_err());
    }

    #[test]
    fn rules_checked() {
        let m = product();
        for bad in [
            json!({"name": "toolong"}),
            json!({"name": "pen", "sku": "abc"}),
            json!({"name": "pen", "price": -1}),
            json!({"name": "pen", "price": "free"}),
            json!({"name": "pen", "releasedAt": "yesterday"}),
            json!({"name": "pen", "color": "red"}),
        ] {
            assert!(RequestValidator::validate(&body(bad.clone()), &m).is_err(), "{}", bad);
        }
        assert!(RequestValidator::validate(
            &body(json!({"name": "pen", "sku": "PEN", "releasedAt": "2024-05-01"})),
            &m
        )
        .is_ok());
    }

    #[test]
    fn type_message() {
        let err = RequestValidator::validate(&body(json!({"name": 3})), &product()).unwrap_err();
        assert_eq!(err.to_string(), "validation: name must be of type string");
    }
}
