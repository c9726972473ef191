//! HTTP error classes for remote failures.
//!
//! Both outbound calls report non-2xx responses as [`crate::Error::Remote`]
//! with one of these classes attached. The translator itself never acts on the
//! class; it is there so hosts can decide what to surface or retry.
//!
//! ## Categories
//!
//! | Category      | Classes                                                   |
//! |---------------|-----------------------------------------------------------|
//! | `client`      | invalid_request, authentication, permission_denied, not_found, request_too_large |
//! | `rate`        | rate_limited, quota_exhausted                             |
//! | `server`      | server_error, overloaded, timeout                         |
//! | `operational` | conflict                                                  |
//! | `unknown`     | unknown                                                   |
//!
//! ## Example
//!
//! ```rust
//! use vikunja_ai::error_class::ErrorClass;
//!
//! let class = ErrorClass::from_http_status(429);
//! assert_eq!(class.name(), "rate_limited");
//! assert!(class.retryable());
//! assert_eq!(class.category(), "rate");
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Malformed request, invalid parameters, or missing required fields
    InvalidRequest,
    /// Invalid, expired, or missing API key or token
    Authentication,
    /// Valid credentials but insufficient permissions
    PermissionDenied,
    /// Requested model, endpoint, or resource does not exist
    NotFound,
    /// Payload exceeds the service's limits
    RequestTooLarge,
    RateLimited,
    /// Account usage quota or billing limit reached
    QuotaExhausted,
    ServerError,
    Overloaded,
    Timeout,
    /// State conflict (e.g., concurrent modification)
    Conflict,
    Unknown,
}

impl ErrorClass {
    /// Returns the standard name (e.g., `"invalid_request"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Authentication => "authentication",
            Self::PermissionDenied => "permission_denied",
            Self::NotFound => "not_found",
            Self::RequestTooLarge => "request_too_large",
            Self::RateLimited => "rate_limited",
            Self::QuotaExhausted => "quota_exhausted",
            Self::ServerError => "server_error",
            Self::Overloaded => "overloaded",
            Self::Timeout => "timeout",
            Self::Conflict => "conflict",
            Self::Unknown => "unknown",
        }
    }

    /// Whether a caller may reasonably repeat the same call later.
    #[inline]
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::ServerError | Self::Overloaded | Self::Timeout | Self::Conflict
        )
    }

    /// Returns the category: `"client"`, `"rate"`, `"server"`, `"operational"`, or `"unknown"`.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidRequest
            | Self::Authentication
            | Self::PermissionDenied
            | Self::NotFound
            | Self::RequestTooLarge => "client",
            Self::RateLimited | Self::QuotaExhausted => "rate",
            Self::ServerError | Self::Overloaded | Self::Timeout => "server",
            Self::Conflict => "operational",
            Self::Unknown => "unknown",
        }
    }

    /// Maps an OpenAI error `type`/`code` string to a class.
    pub fn from_provider_code(provider_code: &str) -> Option<Self> {
        let class = match provider_code {
            "invalid_request" | "invalid_request_error" => Self::InvalidRequest,
            "authentication" | "invalid_api_key" | "authentication_error" => Self::Authentication,
            "permission_denied" | "permission_error" => Self::PermissionDenied,
            "not_found" | "model_not_found" => Self::NotFound,
            "request_too_large" | "context_length_exceeded" => Self::RequestTooLarge,
            "rate_limited" | "rate_limit_exceeded" => Self::RateLimited,
            "quota_exhausted" | "insufficient_quota" => Self::QuotaExhausted,
            "server_error" => Self::ServerError,
            "overloaded" | "overloaded_error" => Self::Overloaded,
            "timeout" => Self::Timeout,
            "conflict" => Self::Conflict,
            _ => return None,
        };
        Some(class)
    }

    /// Extracts a class from an OpenAI error body (`{"error": {"code": .., "type": ..}}`).
    ///
    /// `code` is more specific than `type`, so it wins when both are known.
    pub fn from_openai_body(body: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        let error = value.get("error")?;
        ["code", "type"]
            .iter()
            .filter_map(|key| error.get(*key).and_then(|v| v.as_str()))
            .find_map(Self::from_provider_code)
    }

    /// Maps an HTTP status code to the most likely class.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 | 422 => Self::InvalidRequest,
            401 => Self::Authentication,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            408 => Self::Timeout,
            409 => Self::Conflict,
            412 => Self::Conflict,
            413 => Self::RequestTooLarge,
            429 => Self::RateLimited,
            500 | 502 => Self::ServerError,
            503 => Self::Overloaded,
            504 => Self::Timeout,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ErrorClass::from_http_status(401), ErrorClass::Authentication);
        assert_eq!(ErrorClass::from_http_status(403), ErrorClass::PermissionDenied);
        assert_eq!(ErrorClass::from_http_status(412), ErrorClass::Conflict);
        assert_eq!(ErrorClass::from_http_status(418), ErrorClass::Unknown);
    }

    #[test]
    fn openai_body_prefers_code_over_type() {
        let body = r#"{"error":{"message":"bad key","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        assert_eq!(
            ErrorClass::from_openai_body(body),
            Some(ErrorClass::Authentication)
        );
    }

    #[test]
    fn openai_body_falls_back_to_type() {
        let body = r#"{"error":{"message":"x","type":"server_error","code":null}}"#;
        assert_eq!(ErrorClass::from_openai_body(body), Some(ErrorClass::ServerError));
        assert_eq!(ErrorClass::from_openai_body("<html>"), None);
    }

    #[test]
    fn categories() {
        assert_eq!(ErrorClass::NotFound.category(), "client");
        assert_eq!(ErrorClass::Overloaded.category(), "server");
        assert!(!ErrorClass::Authentication.retryable());
    }
}
