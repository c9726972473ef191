//! Language-model side of the translator.
//!
//! [`FunctionCaller`] is the seam: the translator only needs "send this chat
//! request, give me the decoded response". [`OpenAiClient`] is the production
//! implementation; tests and hosts may plug in their own.

mod openai;

pub use openai::OpenAiClient;

use crate::types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait FunctionCaller: Send + Sync {
    /// Run one chat completion. Transport and HTTP errors are returned as-is.
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
        request_id: &str,
    ) -> Result<ChatCompletionResponse>;
}
