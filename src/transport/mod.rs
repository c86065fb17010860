//! Transport boundary used by link invocations.

mod http;
pub mod mock;

pub use http::HttpTransport;
pub use mock::MockTransport;

use crate::link::Method;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

/// Performs the actual request behind a link.
///
/// Implementations must fail on transport or HTTP errors and otherwise
/// resolve with the parsed response body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue `method` against `href` and return the decoded body.
    async fn request(&self, method: &Method, href: &str) -> Result<JsonValue, TransportError>;

    /// Get the transport name for debugging.
    fn name(&self) -> &'static str;
}

/// Errors raised by a transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{method} {href} returned HTTP {status}")]
    Status {
        method: String,
        href: String,
        status: u16,
    },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Response body is not JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected request: {method} {href}")]
    Unexpected { method: String, href: String },
}

impl TransportError {
    /// HTTP status of the failure, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
