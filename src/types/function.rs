//! Function-calling definitions (the pre-`tools` OpenAI format).

use serde::{Deserialize, Serialize};

/// Function declared to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema of the arguments object.
    pub parameters: serde_json::Value,
}

impl FunctionDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            parameters,
        }
    }
}

/// Function invocation emitted by the model.
///
/// `arguments` is kept as a raw JSON value because the model is supposed to
/// send a string holding JSON text, and anything else is treated as no call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Value>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            arguments: Some(serde_json::Value::String(arguments.into())),
        }
    }

    /// The string-encoded argument payload, if the model produced one.
    pub fn arguments_text(&self) -> Option<&str> {
        self.arguments.as_ref().and_then(|v| v.as_str())
    }
}
