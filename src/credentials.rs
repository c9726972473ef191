//! Credentials for the two outbound services.
//!
//! Both are plain values handed to the translator; nothing here looks up
//! secrets on its own. `Debug` output redacts the secret parts.

use crate::error::Service;
use crate::transport::{join_url, HttpTransport};
use crate::{Error, ErrorContext, Result};
use std::fmt;
use tracing::info;
use url::Url;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Bearer key for the OpenAI API.
#[derive(Clone, PartialEq, Eq)]
pub struct OpenAiCredentials {
    api_key: String,
    base_url: Url,
}

impl OpenAiCredentials {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_OPENAI_BASE_URL)
    }

    /// Use a compatible endpoint other than api.openai.com (proxies, mock servers).
    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "OpenAI API key is empty",
                ErrorContext::new()
                    .with_field_path("openai.api_key")
                    .with_source("credentials"),
            ));
        }
        Ok(Self {
            api_key,
            base_url: parse_url(base_url, "openai.base_url")?,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        join_url(&self.base_url, path)
    }

    /// Check the key with `GET /models`. Not part of the translation path.
    pub async fn test(&self, transport: &HttpTransport) -> Result<()> {
        let url = self.endpoint("/models")?;
        transport
            .send_json(
                Service::OpenAi,
                reqwest::Method::GET,
                url,
                &self.api_key,
                None::<&serde_json::Value>,
                &[],
                None,
            )
            .await?;
        info!("OpenAI credentials accepted");
        Ok(())
    }
}

impl fmt::Debug for OpenAiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCredentials")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// API base and token for a Vikunja instance.
///
/// `api_url` is the REST base including its version prefix, e.g.
/// `https://tasks.example.com/api/v1`.
#[derive(Clone, PartialEq, Eq)]
pub struct VikunjaCredentials {
    api_url: Url,
    token: String,
}

impl VikunjaCredentials {
    pub fn new(api_url: &str, token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "Vikunja API token is empty",
                ErrorContext::new()
                    .with_field_path("vikunja.token")
                    .with_source("credentials"),
            ));
        }
        Ok(Self {
            api_url: parse_url(api_url, "vikunja.api_url")?,
            token,
        })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for VikunjaCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VikunjaCredentials")
            .field("api_url", &self.api_url.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}

fn parse_url(raw: &str, field: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        Error::configuration_with_context(
            format!("invalid URL {:?}", raw),
            ErrorContext::new()
                .with_field_path(field)
                .with_details(e.to_string())
                .with_source("credentials"),
        )
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::configuration_with_context(
            format!("unsupported URL scheme {:?}", url.scheme()),
            ErrorContext::new()
                .with_field_path(field)
                .with_source("credentials"),
        ));
    }
    Ok(url)
}
