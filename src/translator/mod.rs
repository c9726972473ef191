//! The instruction translator.
//!
//! Pipeline per invocation:
//!
//! ```text
//! instruction ──► chat completion (function_call pinned to vikunja_request)
//!             ──► arguments text ──► JSON ──► validated ParsedRequest
//!             ──► Vikunja REST call ──► result items
//! ```
//!
//! The model call and the REST call are strictly sequential and no REST call
//! is made unless validation succeeded. See [`Translator`] for the failure
//! policy.

pub mod builder;
pub mod core;

pub use builder::TranslatorBuilder;
pub use self::core::Translator;
