//! Error type for the HTTP transport boundary.

use thiserror::Error;

/// The single error kind crossing the transport boundary.
///
/// Status code alone determines HTTP failure; response bodies are carried
/// for the message but never interpreted structurally.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Non-2xx response from the service
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Network failure (unreachable, connect error, timeout)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body was not the expected JSON shape
    #[error("Malformed {context} response: {message}")]
    Decode { context: String, message: String },
}

impl TransportError {
    /// Create a Decode error
    pub fn decode(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Returns the HTTP status code, if this is an HTTP failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_timeout())
    }

    /// Returns true if the service could not be reached at all.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_connect())
    }
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;
