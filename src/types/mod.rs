//! # Types Module
//!
//! Wire types for the OpenAI chat-completion endpoint in its function-calling
//! mode.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Chat message with role and content |
//! | [`MessageRole`] | Message role (system, user, assistant) |
//! | [`FunctionDefinition`] | Function declared to the model |
//! | [`FunctionCall`] | Function invocation emitted by the model |
//! | [`ChatCompletionRequest`] | Request body sent to `/chat/completions` |
//! | [`ChatCompletionResponse`] | Response body, decoded leniently |
//!
//! ## Example
//!
//! ```rust
//! use vikunja_ai::types::{ChatCompletionRequest, FunctionDefinition, Message};
//!
//! let function = FunctionDefinition::new(
//!     "get_weather",
//!     "Get current weather for a location",
//!     serde_json::json!({
//!         "type": "object",
//!         "properties": { "location": {"type": "string"} }
//!     }),
//! );
//!
//! let request = ChatCompletionRequest::new("gpt-3.5-turbo-0613")
//!     .message(Message::user("What's the weather in Berlin?"))
//!     .force_function(function);
//!
//! let body = serde_json::to_value(&request).unwrap();
//! assert_eq!(body["function_call"]["name"], "get_weather");
//! ```

pub mod chat;
pub mod function;
pub mod message;

pub use chat::{ChatCompletionRequest, ChatCompletionResponse, Choice, FunctionChoice, ResponseMessage};
pub use function::{FunctionCall, FunctionDefinition};
pub use message::{Message, MessageRole};
