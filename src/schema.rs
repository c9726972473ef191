//! The fixed `vikunja_request` function the model is forced to call.

use crate::request::ValidationError;
use crate::types::FunctionDefinition;
use crate::{Error, ErrorContext, Result};
use jsonschema::{Draft, JSONSchema};
use serde_json::{json, Value};

pub const FUNCTION_NAME: &str = "vikunja_request";

pub const FUNCTION_DESCRIPTION: &str = "Vikunja API request to perform";

pub const SYSTEM_PROMPT: &str =
    "Translate the user instruction to a Vikunja API request. Respond using the function calling format.";

/// JSON Schema of the `vikunja_request` arguments object.
pub fn parameters_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "method": {
                "type": "string",
                "enum": ["GET", "POST", "PUT", "DELETE"]
            },
            "endpoint": { "type": "string" },
            "body": { "type": "object" },
            "query": { "type": "object" }
        },
        "required": ["method", "endpoint"]
    })
}

pub fn vikunja_request_function() -> FunctionDefinition {
    FunctionDefinition::new(FUNCTION_NAME, FUNCTION_DESCRIPTION, parameters_schema())
}

/// Compiled validator for the arguments object.
pub struct ArgumentSchema {
    schema: JSONSchema,
}

impl ArgumentSchema {
    pub fn new() -> Result<Self> {
        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&parameters_schema())
            .map_err(|e| {
                Error::configuration_with_context(
                    "failed to compile function schema",
                    ErrorContext::new()
                        .with_details(e.to_string())
                        .with_source("argument_schema"),
                )
            })?;
        Ok(Self { schema })
    }

    /// Collects every schema violation in `arguments`.
    pub fn check(&self, arguments: &Value) -> Vec<ValidationError> {
        match self.schema.validate(arguments) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    let path = if path.is_empty() { None } else { Some(path) };
                    ValidationError::new(e.to_string(), path)
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_definition_is_fixed() {
        let f = vikunja_request_function();
        assert_eq!(f.name, "vikunja_request");
        assert_eq!(f.description.as_deref(), Some("Vikunja API request to perform"));
        assert_eq!(f.parameters["required"], json!(["method", "endpoint"]));
        assert_eq!(
            f.parameters["properties"]["method"]["enum"],
            json!(["GET", "POST", "PUT", "DELETE"])
        );
        assert_eq!(f, vikunja_request_function());
    }

    #[test]
    fn accepts_well_formed_arguments() {
        let schema = ArgumentSchema::new().unwrap();
        let errors = schema.check(&json!({
            "method": "PUT",
            "endpoint": "/projects",
            "body": {"title": "Groceries"}
        }));
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn reports_enum_and_type_violations() {
        let schema = ArgumentSchema::new().unwrap();
        let errors = schema.check(&json!({
            "method": "PATCH",
            "endpoint": "/tasks/1",
            "body": "title=x"
        }));
        assert_eq!(errors.len(), 2, "{errors:?}");
        let paths: Vec<_> = errors.iter().filter_map(|e| e.path.as_deref()).collect();
        assert!(paths.contains(&"/method"));
        assert!(paths.contains(&"/body"));
    }

    #[test]
    fn reports_missing_required_fields() {
        let schema = ArgumentSchema::new().unwrap();
        let errors = schema.check(&json!({"method": "GET"}));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("endpoint"));
    }
}
