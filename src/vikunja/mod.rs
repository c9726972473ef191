//! Downstream side of the translator: the Vikunja REST API.

mod client;

pub use client::VikunjaClient;

use crate::request::ParsedRequest;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait RestExecutor: Send + Sync {
    /// Perform `request` and return the decoded JSON reply.
    ///
    /// Non-2xx statuses and transport failures are returned unmodified; the
    /// translator does not interpret them.
    async fn execute(&self, request: &ParsedRequest, request_id: &str) -> Result<Value>;
}
