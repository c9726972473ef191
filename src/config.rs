//! Translator configuration.
//!
//! Layering, lowest to highest precedence:
//!
//! 1. built-in defaults ([`TranslatorConfig::default`])
//! 2. a YAML file ([`TranslatorConfig::from_yaml_file`])
//! 3. environment variables ([`TranslatorConfig::apply_env`])
//!
//! | Variable | Field |
//! |----------|-------|
//! | `VIKUNJA_AI_OPENAI_API_KEY` (or `OPENAI_API_KEY`) | `openai.api_key` |
//! | `VIKUNJA_AI_OPENAI_BASE_URL` | `openai.base_url` |
//! | `VIKUNJA_AI_MODEL` | `openai.model` |
//! | `VIKUNJA_AI_VIKUNJA_URL` | `vikunja.api_url` |
//! | `VIKUNJA_AI_VIKUNJA_TOKEN` | `vikunja.token` |
//! | `VIKUNJA_AI_MAX_ATTEMPTS` | `max_attempts` |
//! | `VIKUNJA_AI_HTTP_TIMEOUT_SECS` | `http.timeout_secs` |
//! | `VIKUNJA_AI_PROXY_URL` | `http.proxy_url` |
//!
//! Configuration only *builds* credentials; the translator receives them
//! explicitly and never reads the environment itself.
//!
//! ```yaml
//! openai:
//!   api_key: sk-...
//!   model: gpt-4o-mini
//! vikunja:
//!   api_url: https://tasks.example.com/api/v1
//!   token: tk_...
//! max_attempts: 2
//! http:
//!   timeout_secs: 20
//! ```

use crate::credentials::{OpenAiCredentials, VikunjaCredentials, DEFAULT_OPENAI_BASE_URL};
use crate::transport::TransportConfig;
use crate::{Error, ErrorContext, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-0613";

/// Upper bound on model calls per invocation, whatever the config says.
pub const MAX_ATTEMPTS_CAP: u32 = 5;

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub openai: OpenAiSection,
    pub vikunja: VikunjaSection,
    /// Model calls per invocation; `1` means single-shot.
    pub max_attempts: u32,
    pub http: HttpSection,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiSection {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: Option<f64>,
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct VikunjaSection {
    pub api_url: Option<String>,
    pub token: Option<String>,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub timeout_secs: u64,
    pub proxy_url: Option<String>,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout_secs: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            openai: OpenAiSection::default(),
            vikunja: VikunjaSection::default(),
            max_attempts: 1,
            http: HttpSection::default(),
        }
    }
}

impl Default for OpenAiSection {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
        }
    }
}

impl Default for HttpSection {
    fn default() -> Self {
        let transport = TransportConfig::default();
        Self {
            timeout_secs: transport.timeout.as_secs(),
            proxy_url: None,
            pool_max_idle_per_host: transport.pool_max_idle_per_host,
            pool_idle_timeout_secs: transport.pool_idle_timeout.as_secs(),
        }
    }
}

impl TranslatorConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("cannot read config file {}", path.display()),
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("config_loader"),
            )
        })?;
        Self::from_yaml_str(&content)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment in production).
    pub fn apply_env_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("VIKUNJA_AI_OPENAI_API_KEY").or_else(|| get("OPENAI_API_KEY")) {
            self.openai.api_key = Some(key);
        }
        if let Some(url) = get("VIKUNJA_AI_OPENAI_BASE_URL") {
            self.openai.base_url = url;
        }
        if let Some(model) = get("VIKUNJA_AI_MODEL") {
            self.openai.model = model;
        }
        if let Some(url) = get("VIKUNJA_AI_VIKUNJA_URL") {
            self.vikunja.api_url = Some(url);
        }
        if let Some(token) = get("VIKUNJA_AI_VIKUNJA_TOKEN") {
            self.vikunja.token = Some(token);
        }
        if let Some(n) = parse_env(&get, "VIKUNJA_AI_MAX_ATTEMPTS") {
            self.max_attempts = n;
        }
        if let Some(secs) = parse_env(&get, "VIKUNJA_AI_HTTP_TIMEOUT_SECS") {
            self.http.timeout_secs = secs;
        }
        if let Some(proxy) = get("VIKUNJA_AI_PROXY_URL") {
            self.http.proxy_url = Some(proxy);
        }
        self
    }

    /// `max_attempts` clamped to `1..=MAX_ATTEMPTS_CAP`.
    pub fn effective_max_attempts(&self) -> u32 {
        self.max_attempts.clamp(1, MAX_ATTEMPTS_CAP)
    }

    pub fn openai_credentials(&self) -> Result<OpenAiCredentials> {
        let key = self.openai.api_key.as_deref().ok_or_else(|| {
            missing("OpenAI API key is not configured", "openai.api_key")
        })?;
        OpenAiCredentials::with_base_url(key, &self.openai.base_url)
    }

    pub fn vikunja_credentials(&self) -> Result<VikunjaCredentials> {
        let url = self.vikunja.api_url.as_deref().ok_or_else(|| {
            missing("Vikunja API URL is not configured", "vikunja.api_url")
        })?;
        let token = self.vikunja.token.as_deref().ok_or_else(|| {
            missing("Vikunja API token is not configured", "vikunja.token")
        })?;
        VikunjaCredentials::new(url, token)
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            timeout: Duration::from_secs(self.http.timeout_secs.max(1)),
            proxy_url: self.http.proxy_url.clone(),
            pool_max_idle_per_host: self.http.pool_max_idle_per_host,
            pool_idle_timeout: Duration::from_secs(self.http.pool_idle_timeout_secs),
        }
    }
}

fn missing(message: &str, field: &str) -> Error {
    Error::configuration_with_context(
        message,
        ErrorContext::new()
            .with_field_path(field)
            .with_source("config_loader"),
    )
}

fn parse_env<T, G>(get: &G, key: &str) -> Option<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    let raw = get(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = TranslatorConfig::default();
        assert_eq!(config.openai.model, "gpt-3.5-turbo-0613");
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.effective_max_attempts(), 1);
        assert_eq!(config.transport_config().timeout, Duration::from_secs(30));
        assert!(config.openai_credentials().is_err());
    }

    #[test]
    fn yaml_overrides_defaults_partially() {
        let config = TranslatorConfig::from_yaml_str(
            r#"
openai:
  api_key: sk-test
  model: gpt-4o-mini
vikunja:
  api_url: https://tasks.example.com/api/v1
  token: tk-test
max_attempts: 3
http:
  timeout_secs: 5
"#,
        )
        .unwrap();
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.effective_max_attempts(), 3);
        assert_eq!(config.http.pool_max_idle_per_host, 32);
        assert_eq!(config.transport_config().timeout, Duration::from_secs(5));
        assert_eq!(config.openai_credentials().unwrap().api_key(), "sk-test");
        assert_eq!(
            config.vikunja_credentials().unwrap().api_url().as_str(),
            "https://tasks.example.com/api/v1"
        );
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(matches!(
            TranslatorConfig::from_yaml_str("max_attempts: [1, 2"),
            Err(Error::Yaml(_))
        ));
    }

    #[test]
    fn unreadable_file_is_a_configuration_error() {
        let err = TranslatorConfig::from_yaml_file("/nonexistent/vikunja-ai.yaml").err().unwrap();
        assert!(matches!(err, Error::Configuration { .. }), "{err:?}");
        assert!(err.to_string().contains("/nonexistent/vikunja-ai.yaml"));
    }

    #[test]
    fn env_overrides_file_values() {
        let config = TranslatorConfig::default().apply_env_with(env(&[
            ("OPENAI_API_KEY", "sk-fallback"),
            ("VIKUNJA_AI_MODEL", "gpt-4o"),
            ("VIKUNJA_AI_VIKUNJA_URL", "http://localhost:3456/api/v1"),
            ("VIKUNJA_AI_VIKUNJA_TOKEN", "tk"),
            ("VIKUNJA_AI_MAX_ATTEMPTS", "9"),
            ("VIKUNJA_AI_HTTP_TIMEOUT_SECS", "soon"),
        ]));
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-fallback"));
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.effective_max_attempts(), MAX_ATTEMPTS_CAP);
        assert_eq!(config.http.timeout_secs, 30);
        assert!(config.vikunja_credentials().is_ok());
    }

    #[test]
    fn prefixed_key_wins_over_generic_key() {
        let config = TranslatorConfig::default().apply_env_with(env(&[
            ("OPENAI_API_KEY", "sk-generic"),
            ("VIKUNJA_AI_OPENAI_API_KEY", "sk-scoped"),
        ]));
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-scoped"));
    }

    #[test]
    fn missing_vikunja_token_names_the_field() {
        let config = TranslatorConfig::default()
            .apply_env_with(env(&[("VIKUNJA_AI_VIKUNJA_URL", "http://localhost:3456/api/v1")]));
        let err = config.vikunja_credentials().err().unwrap();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("vikunja.token")
        );
    }
}
