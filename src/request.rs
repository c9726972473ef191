//! Parsed Vikunja request and the validation step that produces it.
//!
//! The model's argument text goes through three gates before anything is
//! sent downstream:
//!
//! 1. JSON parsing ([`crate::Error::MalformedArguments`] on failure)
//! 2. the function's JSON Schema (method enum, required fields, object types)
//! 3. request checks the schema cannot express (non-blank, relative endpoint)
//!
//! Gates 2 and 3 report together as [`crate::Error::InvalidRequest`].

use crate::schema::ArgumentSchema;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// HTTP methods the model may choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 4] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether a JSON body is sent with this method.
    pub fn allows_body(&self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("Unknown HTTP method: {}", s))
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One rejected aspect of the model's arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
    /// JSON pointer into the arguments object (e.g. "/method")
    pub path: Option<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, path: Option<String>) -> Self {
        Self {
            message: message.into(),
            path,
        }
    }

    pub fn at(path: &str, message: impl Into<String>) -> Self {
        Self::new(message, Some(path.to_string()))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// A validated `{method, endpoint, body?, query?}` ready to send to Vikunja.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRequest {
    pub method: HttpMethod,
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Map<String, Value>>,
}

impl ParsedRequest {
    /// Parse and validate the model's function-call argument text.
    pub fn from_arguments(arguments: &str, schema: &ArgumentSchema) -> Result<Self> {
        let value: Value = serde_json::from_str(arguments).map_err(Error::MalformedArguments)?;

        let mut errors = schema.check(&value);
        if errors.is_empty() {
            errors.extend(check_endpoint(&value));
        }
        if !errors.is_empty() {
            return Err(Error::InvalidRequest(errors));
        }

        serde_json::from_value(value)
            .map_err(|e| Error::InvalidRequest(vec![ValidationError::new(e.to_string(), None)]))
    }

    /// Query parameters flattened into string pairs.
    ///
    /// Strings are sent verbatim, other scalars as their JSON text, arrays
    /// repeat the key per element, `null` is dropped and nested objects are
    /// sent as JSON text.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(query) = &self.query {
            for (key, value) in query {
                match value {
                    Value::Array(items) => {
                        for item in items {
                            if let Some(s) = scalar_text(item) {
                                pairs.push((key.clone(), s));
                            }
                        }
                    }
                    other => {
                        if let Some(s) = scalar_text(other) {
                            pairs.push((key.clone(), s));
                        }
                    }
                }
            }
        }
        pairs
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn check_endpoint(value: &Value) -> Option<ValidationError> {
    let endpoint = value.get("endpoint").and_then(|v| v.as_str())?;
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Some(ValidationError::at("/endpoint", "endpoint must not be empty"));
    }
    // The API token must only ever reach the configured Vikunja host.
    let path = endpoint.split('?').next().unwrap_or(endpoint);
    if path.contains("://") || path.starts_with("//") {
        return Some(ValidationError::at(
            "/endpoint",
            format!("endpoint must be a path relative to the API base, got {}", endpoint),
        ));
    }
    None
}
