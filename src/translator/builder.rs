use crate::config::{TranslatorConfig, DEFAULT_MODEL, MAX_ATTEMPTS_CAP};
use crate::credentials::{OpenAiCredentials, VikunjaCredentials};
use crate::llm::{FunctionCaller, OpenAiClient};
use crate::schema::ArgumentSchema;
use crate::transport::{HttpTransport, TransportConfig};
use crate::translator::core::Translator;
use crate::vikunja::{RestExecutor, VikunjaClient};
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;

/// Builder for [`Translator`].
///
/// Each side needs either credentials (the HTTP client is built for you) or an
/// explicit implementation of its seam.
pub struct TranslatorBuilder {
    model: String,
    temperature: Option<f64>,
    max_attempts: u32,
    transport: TransportConfig,
    openai: Option<OpenAiCredentials>,
    vikunja: Option<VikunjaCredentials>,
    caller: Option<Arc<dyn FunctionCaller>>,
    executor: Option<Arc<dyn RestExecutor>>,
}

impl TranslatorBuilder {
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_attempts: 1,
            transport: TransportConfig::default(),
            openai: None,
            vikunja: None,
            caller: None,
            executor: None,
        }
    }

    /// Start from a loaded configuration. Missing credentials are only an
    /// error at `build()` time, and only if no seam replaces them.
    pub fn from_config(config: &TranslatorConfig) -> Result<Self> {
        let mut builder = Self::new()
            .model(config.openai.model.clone())
            .max_attempts(config.effective_max_attempts())
            .transport_config(config.transport_config());
        if let Some(t) = config.openai.temperature {
            builder = builder.temperature(t);
        }
        if config.openai.api_key.is_some() {
            builder = builder.openai(config.openai_credentials()?);
        }
        if config.vikunja.api_url.is_some() || config.vikunja.token.is_some() {
            builder = builder.vikunja(config.vikunja_credentials()?);
        }
        Ok(builder)
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f64) -> Self {
        self.temperature = Some(t);
        self
    }

    /// Model calls allowed per invocation. `1` (the default) disables re-prompting.
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n.clamp(1, MAX_ATTEMPTS_CAP);
        self
    }

    pub fn transport_config(mut self, config: TransportConfig) -> Self {
        self.transport = config;
        self
    }

    pub fn openai(mut self, credentials: OpenAiCredentials) -> Self {
        self.openai = Some(credentials);
        self
    }

    pub fn vikunja(mut self, credentials: VikunjaCredentials) -> Self {
        self.vikunja = Some(credentials);
        self
    }

    /// Replace the OpenAI client.
    pub fn function_caller(mut self, caller: Arc<dyn FunctionCaller>) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Replace the Vikunja client.
    pub fn rest_executor(mut self, executor: Arc<dyn RestExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn build(self) -> Result<Translator> {
        if self.model.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "model name is empty",
                ErrorContext::new()
                    .with_field_path("openai.model")
                    .with_source("translator_builder"),
            ));
        }

        // One connection pool serves both services.
        let needs_transport = self.caller.is_none() || self.executor.is_none();
        let transport = if needs_transport {
            Some(HttpTransport::new(&self.transport)?)
        } else {
            None
        };

        let caller: Arc<dyn FunctionCaller> = match (self.caller, self.openai) {
            (Some(caller), _) => caller,
            (None, Some(creds)) => Arc::new(OpenAiClient::new(
                transport.clone().ok_or_else(no_transport)?,
                creds,
            )),
            (None, None) => {
                return Err(Error::configuration_with_context(
                    "OpenAI credentials or a function caller are required",
                    ErrorContext::new()
                        .with_field_path("openai.api_key")
                        .with_source("translator_builder"),
                ))
            }
        };

        let executor: Arc<dyn RestExecutor> = match (self.executor, self.vikunja) {
            (Some(executor), _) => executor,
            (None, Some(creds)) => Arc::new(VikunjaClient::new(
                transport.ok_or_else(no_transport)?,
                creds,
            )),
            (None, None) => {
                return Err(Error::configuration_with_context(
                    "Vikunja credentials or a REST executor are required",
                    ErrorContext::new()
                        .with_field_path("vikunja.api_url")
                        .with_source("translator_builder"),
                ))
            }
        };

        Ok(Translator {
            caller,
            executor,
            schema: ArgumentSchema::new()?,
            model: self.model,
            temperature: self.temperature,
            max_attempts: self.max_attempts,
        })
    }
}

impl Default for TranslatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn no_transport() -> Error {
    Error::configuration("HTTP transport was not initialised")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_both_sides() {
        let err = TranslatorBuilder::new().build().err().unwrap();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("openai.api_key")
        );

        let err = TranslatorBuilder::new()
            .openai(OpenAiCredentials::new("sk").unwrap())
            .build()
            .err()
            .unwrap();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("vikunja.api_url")
        );
    }

    #[test]
    fn builds_from_credentials() {
        let translator = TranslatorBuilder::new()
            .openai(OpenAiCredentials::new("sk").unwrap())
            .vikunja(VikunjaCredentials::new("http://localhost:3456/api/v1", "tk").unwrap())
            .max_attempts(0)
            .build()
            .unwrap();
        assert_eq!(translator.max_attempts(), 1);
        assert_eq!(translator.model(), "gpt-3.5-turbo-0613");
    }

    #[test]
    fn empty_model_is_rejected() {
        let err = TranslatorBuilder::new()
            .model(" ")
            .openai(OpenAiCredentials::new("sk").unwrap())
            .vikunja(VikunjaCredentials::new("http://localhost:3456/api/v1", "tk").unwrap())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn from_config_carries_settings() {
        let config = TranslatorConfig::from_yaml_str(
            r#"
openai:
  api_key: sk
  model: gpt-4o-mini
  temperature: 0.0
vikunja:
  api_url: http://localhost:3456/api/v1
  token: tk
max_attempts: 3
"#,
        )
        .unwrap();
        let translator = TranslatorBuilder::from_config(&config).unwrap().build().unwrap();
        assert_eq!(translator.model(), "gpt-4o-mini");
        assert_eq!(translator.max_attempts(), 3);
    }
}
