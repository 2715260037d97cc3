//! Error types for text-generation providers.

use std::fmt;

/// Broad classification of a provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Connection refused, DNS failure, timeout.
    Network,
    /// HTTP 429.
    RateLimited,
    /// HTTP 5xx.
    ServerError,
    /// HTTP 4xx other than 429 (bad key, bad model name, bad request).
    ClientError,
    /// The response arrived but did not carry usable text.
    Parse,
}

impl fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network error"),
            Self::RateLimited => write!(f, "rate limited"),
            Self::ServerError => write!(f, "server error"),
            Self::ClientError => write!(f, "client error"),
            Self::Parse => write!(f, "parse error"),
        }
    }
}

/// Map an HTTP status code to an error kind.
pub fn classify_http_status(status: u16) -> LlmErrorKind {
    match status {
        429 => LlmErrorKind::RateLimited,
        500..=599 => LlmErrorKind::ServerError,
        400..=499 => LlmErrorKind::ClientError,
        _ => LlmErrorKind::ServerError,
    }
}

/// A failed generation attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
    /// HTTP status, when the failure came from a response.
    pub status: Option<u16>,
}

impl LlmError {
    pub fn network_error(message: String) -> Self {
        Self {
            kind: LlmErrorKind::Network,
            message,
            status: None,
        }
    }

    pub fn parse_error(message: String) -> Self {
        Self {
            kind: LlmErrorKind::Parse,
            message,
            status: None,
        }
    }

    pub fn from_status(status: u16, body: String) -> Self {
        Self {
            kind: classify_http_status(status),
            message: body,
            status: Some(status),
        }
    }
}
