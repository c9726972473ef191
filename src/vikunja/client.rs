use crate::credentials::VikunjaCredentials;
use crate::error::Service;
use crate::request::ParsedRequest;
use crate::transport::{join_url, HttpTransport};
use crate::vikunja::RestExecutor;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;
use url::Url;

/// Authenticated calls of the form `{METHOD} {api_url}{endpoint}`.
#[derive(Debug, Clone)]
pub struct VikunjaClient {
    transport: HttpTransport,
    credentials: VikunjaCredentials,
}

impl VikunjaClient {
    pub fn new(transport: HttpTransport, credentials: VikunjaCredentials) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    pub fn credentials(&self) -> &VikunjaCredentials {
        &self.credentials
    }

    pub fn url_for(&self, request: &ParsedRequest) -> Result<Url> {
        join_url(self.credentials.api_url(), &request.endpoint)
    }
}

#[async_trait]
impl RestExecutor for VikunjaClient {
    async fn execute(&self, request: &ParsedRequest, request_id: &str) -> Result<Value> {
        let url = self.url_for(request)?;
        let body = request.body.as_ref().filter(|_| request.method.allows_body());
        let query = request.query_pairs();

        info!(method = %request.method, endpoint = %request.endpoint, "calling Vikunja");
        self.transport
            .send_json(
                Service::Vikunja,
                request.method.into(),
                url,
                self.credentials.token(),
                body,
                &query,
                Some(request_id),
            )
            .await
    }
}
