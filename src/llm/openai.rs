use crate::credentials::OpenAiCredentials;
use crate::error::Service;
use crate::llm::FunctionCaller;
use crate::transport::HttpTransport;
use crate::types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

/// `POST /chat/completions` against OpenAI or a compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    transport: HttpTransport,
    credentials: OpenAiCredentials,
}

impl OpenAiClient {
    pub fn new(transport: HttpTransport, credentials: OpenAiCredentials) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    pub fn credentials(&self) -> &OpenAiCredentials {
        &self.credentials
    }

    /// Run the credential test against this client's endpoint.
    pub async fn test_credentials(&self) -> Result<()> {
        self.credentials.test(&self.transport).await
    }
}

#[async_trait]
impl FunctionCaller for OpenAiClient {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
        request_id: &str,
    ) -> Result<ChatCompletionResponse> {
        let url = self.credentials.endpoint("/chat/completions")?;
        let value = self
            .transport
            .send_json(
                Service::OpenAi,
                reqwest::Method::POST,
                url,
                self.credentials.api_key(),
                Some(request),
                &[],
                Some(request_id),
            )
            .await?;

        // A body that is JSON but not a completion is treated like a completion
        // without a function call.
        match serde_json::from_value::<ChatCompletionResponse>(value) {
            Ok(response) => {
                debug!(
                    model = response.model.as_deref().unwrap_or("unknown"),
                    choices = response.choices.len(),
                    "chat completion received"
                );
                Ok(response)
            }
            Err(e) => {
                warn!(error = %e, "unexpected chat completion shape");
                Ok(ChatCompletionResponse::default())
            }
        }
    }
}
