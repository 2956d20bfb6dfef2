//! Error types for the request facade.
//!
//! # Design
//! Every failure reaches the caller as a distinct variant; the facade never
//! retries or recovers. Transport failures keep the transport's own error as
//! the `source` so callers can downcast to e.g. `reqwest::Error`.

use thiserror::Error;

/// Error produced by a [`Transport`](crate::transport::Transport) before any
/// response arrived.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, AjaxError>;

#[derive(Debug, Error)]
pub enum AjaxError {
    /// The verb is not one of GET, POST, DELETE, PUT.
    #[error("invalid request method: {0:?}")]
    InvalidMethod(String),

    /// The network call failed before a response was received.
    #[error("transport failure: {0}")]
    Transport(#[source] TransportError),

    /// A response arrived with a status outside 200..=299.
    #[error("{status} - {status_text}")]
    HttpError { status: u16, status_text: String },

    /// The response declares no content type the decoder understands.
    #[error("content type not found; cannot auto-parse")]
    Decode { content_type: Option<String> },

    /// The body could not be parsed as its declared content type.
    #[error("malformed response body: {0}")]
    MalformedBody(String),

    /// Data handed to the serializer is not a key-value mapping.
    #[error("invalid request data: {0}")]
    InvalidData(String),
}

impl AjaxError {
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<TransportError>,
    {
        AjaxError::Transport(err.into())
    }
}
