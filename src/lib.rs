//! # vikunja-ai
//!
//! Control a [Vikunja](https://vikunja.io) instance with natural language.
//!
//! The crate turns a free-text instruction into a single Vikunja REST call by
//! asking an OpenAI chat model to answer through a forced function call
//! (`vikunja_request`), validating what comes back, and executing it.
//!
//! ## Overview
//!
//! - **Forced function calling**: the model can only reply with
//!   `{method, endpoint, body?, query?}` arguments
//! - **Validated before use**: arguments must parse as JSON, satisfy the
//!   function's JSON Schema, and name a non-empty relative endpoint
//! - **Single shot by default**: optional bounded re-prompting when the model
//!   output is unusable, never for network or API errors
//! - **Explicit credentials**: both API keys are passed in, never looked up
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vikunja_ai::{OpenAiCredentials, Translator, VikunjaCredentials};
//!
//! #[tokio::main]
//! async fn main() -> vikunja_ai::Result<()> {
//!     let translator = Translator::builder()
//!         .openai(OpenAiCredentials::new("sk-...")?)
//!         .vikunja(VikunjaCredentials::new("https://tasks.example.com/api/v1", "tk_...")?)
//!         .build()?;
//!
//!     let items = translator
//!         .translate_and_execute("Create a project called Groceries")
//!         .await?;
//!     for item in items {
//!         println!("{item}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`translator`] | The translation pipeline and its builder |
//! | [`request`] | Parsed request type and validation |
//! | [`schema`] | The fixed `vikunja_request` function schema |
//! | [`types`] | Chat-completion wire types |
//! | [`llm`] | Model seam and OpenAI client |
//! | [`vikunja`] | Downstream seam and Vikunja client |
//! | [`transport`] | Shared HTTP transport |
//! | [`credentials`] | Service credentials and the OpenAI key test |
//! | [`config`] | Defaults, YAML file and environment configuration |
//! | [`error_class`] | HTTP error classification |

pub mod config;
pub mod credentials;
pub mod error_class;
pub mod items;
pub mod llm;
pub mod request;
pub mod schema;
pub mod transport;
pub mod translator;
pub mod types;
pub mod vikunja;

pub use config::TranslatorConfig;
pub use credentials::{OpenAiCredentials, VikunjaCredentials};
pub use items::into_items;
pub use llm::{FunctionCaller, OpenAiClient};
pub use request::{HttpMethod, ParsedRequest, ValidationError};
pub use translator::{Translator, TranslatorBuilder};
pub use vikunja::{RestExecutor, VikunjaClient};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, Service};
