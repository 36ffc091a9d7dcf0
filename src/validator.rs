//! Validation marker pass-through.
//!
//! The engine never computes validation semantics itself. This adapter
//! hands a raw schema and instance to the `jsonschema` crate and converts
//! its output into ordered display markers.

use serde_json::Value;

use crate::error::{ValidateError, ValidationMarker};

/// Collect validation markers for an instance against a raw schema.
///
/// An empty list means the instance is valid.
///
/// # Errors
///
/// Returns `ValidateError::InvalidSchema` if the schema itself cannot be
/// compiled.
pub fn collect_markers(schema: &Value, instance: &Value) -> Result<Vec<ValidationMarker>, ValidateError> {
    let validator = jsonschema::validator_for(schema).map_err(|e| ValidateError::InvalidSchema {
        message: e.to_string(),
    })?;

    Ok(validator
        .iter_errors(instance)
        .map(|e| ValidationMarker {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect())
}

/// Validate an instance against a raw schema.
///
/// # Errors
///
/// Returns `ValidateError::Invalid` carrying the markers when the instance
/// doesn't match, or `ValidateError::InvalidSchema` if the schema cannot be
/// compiled.
pub fn validate_instance(schema: &Value, instance: &Value) -> Result<(), ValidateError> {
    let markers = collect_markers(schema, instance)?;
    if markers.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { markers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_instance_passes() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" }
            },
            "required": ["name"]
        });
        let instance = json!({ "name": "test" });

        assert!(validate_instance(&schema, &instance).is_ok());
    }

    #[test]
    fn missing_required_field_is_marked() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" }
            },
            "required": ["name"]
        });
        let instance = json!({});

        let result = validate_instance(&schema, &instance);
        assert!(matches!(result, Err(ValidateError::Invalid { .. })));
    }

    #[test]
    fn markers_collect_for_every_failure() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "age": { "type": "number" }
            },
            "required": ["name", "age"]
        });
        let instance = json!({});

        let markers = collect_markers(&schema, &instance).unwrap();
        assert_eq!(markers.len(), 2);
    }

    #[test]
    fn wrong_type_is_marked_with_path() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" }
            }
        });
        let instance = json!({ "name": 123 });

        let markers = collect_markers(&schema, &instance).unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].path, "/name");
    }

    #[test]
    fn uncompilable_schema_is_reported() {
        let schema = json!({ "type": "not-a-type" });
        let result = validate_instance(&schema, &json!({}));
        assert!(matches!(result, Err(ValidateError::InvalidSchema { .. })));
    }
}
