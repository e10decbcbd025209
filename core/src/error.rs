//! Error types for the HTTP convenience client.
//!
//! # Design
//! Transport failures keep the underlying `ureq::Error` so callers can still
//! inspect the original cause. Status enforcement gets its own variant
//! because most callers only care "was it 200 or not". Decode failures carry
//! the status code and headers that were observed before decoding started,
//! when there was a response.

use thiserror::Error;

use crate::http::{Headers, ResponseHead};

/// Errors returned by `HttpClient` operations and by `decode`.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Connection, DNS, TLS, write or read failure reported by the transport.
    #[error("Transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// The server answered with a status other than 200 on an operation
    /// that requires it.
    #[error("HTTP response code: {0}")]
    Status(u16),

    /// The request body could not be serialized before sending.
    #[error("Encode error: {0}")]
    Encode(String),

    /// The response body could not be decoded into the requested target.
    #[error("Decode error: {message}")]
    Decode {
        /// Status of the response whose body failed to decode.
        status: Option<u16>,
        /// Headers of that response, collapsed like `ResponseHead::headers`.
        headers: Option<Headers>,
        /// Parser message.
        message: String,
    },

    /// An output kind outside `bytes`, `text`, `json` and `xml` was requested.
    #[error("Unsupported output kind: {0}")]
    UnsupportedKind(String),

    /// The download target could not be created, written or flushed.
    #[error("Filesystem error: {0}")]
    Filesystem(std::io::Error),

    /// Method, URL or header could not be turned into a request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl HttpError {
    pub(crate) fn decode(message: impl ToString) -> Self {
        HttpError::Decode {
            status: None,
            headers: None,
            message: message.to_string(),
        }
    }

    /// Attach the response whose body failed to decode.
    pub(crate) fn with_response(self, head: ResponseHead) -> Self {
        match self {
            HttpError::Decode { message, .. } => HttpError::Decode {
                status: Some(head.status),
                headers: Some(head.headers),
                message,
            },
            other => other,
        }
    }

    /// Status code attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status(code) => Some(*code),
            HttpError::Decode { status, .. } => *status,
            _ => None,
        }
    }

    /// Response headers attached to a decode failure, if any.
    pub fn headers(&self) -> Option<&Headers> {
        match self {
            HttpError::Decode { headers, .. } => headers.as_ref(),
            _ => None,
        }
    }
}

/// Fail with `HttpError::Status` unless the response was a plain 200.
pub(crate) fn ensure_ok(status: u16) -> Result<(), HttpError> {
    if status == 200 {
        return Ok(());
    }
    Err(HttpError::Status(status))
}
