//! HTTP transport shared by the OpenAI and Vikunja clients.

mod http;

pub(crate) use http::join_url;
pub use http::{HttpTransport, TransportConfig, TransportError, REQUEST_ID_HEADER};
