use crate::error::Service;
use crate::{Error, Result};
use reqwest::{Method, Proxy};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Correlation header sent on both outbound calls of one invocation.
pub const REQUEST_ID_HEADER: &str = "x-vikunja-ai-request-id";

/// Client-level knobs. Timeouts are the only ones the translator inherits.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub proxy_url: Option<String>,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            proxy_url: None,
            pool_max_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Thin wrapper over a shared `reqwest::Client` speaking JSON with bearer auth.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Some(config.pool_idle_timeout))
            .user_agent(concat!("vikunja-ai/", env!("CARGO_PKG_VERSION")));

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url)
                .map_err(|e| TransportError::Other(format!("invalid proxy {}: {}", proxy_url, e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// Send one JSON request and decode the JSON reply.
    ///
    /// Non-2xx replies become [`Error::Remote`] with the body text untouched.
    /// An empty 2xx body decodes as an empty object.
    pub async fn send_json<B>(
        &self,
        service: Service,
        method: Method,
        url: Url,
        bearer: &str,
        body: Option<&B>,
        query: &[(String, String)],
        request_id: Option<&str>,
    ) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        debug!(%service, %method, url = %url, "sending request");

        let mut request = self.client.request(method, url).bearer_auth(bearer);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(id) = request_id {
            request = request.header(REQUEST_ID_HEADER, id);
        }

        let response = request.send().await.map_err(TransportError::Http)?;
        let status = response.status();
        let text = response.text().await.map_err(TransportError::Http)?;

        if !status.is_success() {
            let err = Error::remote(service, status.as_u16(), text);
            if let Some(class) = err.class() {
                debug!(
                    %service,
                    status = status.as_u16(),
                    class = class.name(),
                    category = class.category(),
                    retryable = class.retryable(),
                    "remote returned an error status"
                );
            }
            return Err(err);
        }

        if text.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Join a base URL and a relative path without dropping the base's own path.
///
/// `Url::join` would replace `/api/v1` when the path starts with `/`.
pub(crate) fn join_url(base: &Url, path: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim().trim_start_matches('/')
    );
    Url::parse(&joined)
        .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", joined, e)).into())
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Transport error: {0}")]
    Other(String),
}
