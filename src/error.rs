use crate::error_class::ErrorClass;
use crate::request::ValidationError;
use crate::transport::TransportError;
use std::fmt;
use thiserror::Error;

/// Structured error context for configuration and setup failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "openai.api_key")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config_loader", "translator_builder")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Remote service an HTTP error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    OpenAi,
    Vikunja,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::OpenAi => f.write_str("OpenAI"),
            Service::Vikunja => f.write_str("Vikunja"),
        }
    }
}

/// Unified error type for the translator.
///
/// Every variant is terminal for a single invocation. Only the three
/// model-output variants ([`Error::MissingFunctionCall`],
/// [`Error::MalformedArguments`], [`Error::InvalidRequest`]) can be answered
/// with a fresh model call, and only when re-prompting is enabled.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    /// The model answered in prose, called another function, or returned an unexpected shape.
    #[error("No function arguments returned from AI")]
    MissingFunctionCall,

    /// The function-call arguments were not valid JSON.
    #[error("Failed to parse AI response")]
    MalformedArguments(#[source] serde_json::Error),

    /// The arguments parsed but do not describe a usable Vikunja request.
    #[error("AI response is not a valid Vikunja request: {}", format_validation(.0))]
    InvalidRequest(Vec<ValidationError>),

    #[error("Remote error from {service}: HTTP {status} ({class}): {message}")]
    Remote {
        service: Service,
        status: u16,
        class: ErrorClass,
        message: String,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Build a remote error from a non-2xx status and the raw response body.
    pub fn remote(service: Service, status: u16, body: impl Into<String>) -> Self {
        let message = body.into();
        let class = match service {
            Service::OpenAi => ErrorClass::from_openai_body(&message),
            Service::Vikunja => None,
        }
        .unwrap_or_else(|| ErrorClass::from_http_status(status));
        Error::Remote {
            service,
            status,
            class,
            message,
        }
    }

    /// Whether this error describes unusable model output rather than a failed call.
    pub fn is_model_output_error(&self) -> bool {
        matches!(
            self,
            Error::MissingFunctionCall | Error::MalformedArguments(_) | Error::InvalidRequest(_)
        )
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }

    /// HTTP status for remote errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classification of remote errors.
    pub fn class(&self) -> Option<ErrorClass> {
        match self {
            Error::Remote { class, .. } => Some(*class),
            _ => None,
        }
    }

    /// Whether the same invocation may succeed if repeated later.
    ///
    /// Only remote errors of a transient class qualify; the translator itself
    /// never repeats a call.
    pub fn is_transient(&self) -> bool {
        self.class().is_some_and(|c| c.retryable())
    }
}
