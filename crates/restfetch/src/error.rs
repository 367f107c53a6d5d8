//! Error types for RestFetch

use crate::response::Response;
use thiserror::Error;

/// Errors that can occur while building, sending or decoding a request
#[derive(Debug, Error)]
pub enum Error {
    /// Request body could not be encoded as JSON
    #[error("Failed to serialize request body")]
    Serialization(#[source] serde_json::Error),

    /// The transport failed before a response was received
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-success status
    ///
    /// Carries the raw response so the caller can inspect status and body.
    #[error("Request failed with status {}", .0.status())]
    HttpFailure(Box<Response>),

    /// A request, response, error or transform hook failed
    #[error("Interceptor failed: {0}")]
    Interceptor(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Response body could not be decoded as the requested type
    #[error("Failed to decode response body: {0}")]
    Decode(String),

    /// Payload cannot be sent with the chosen method
    #[error("Invalid payload: {0}")]
    InvalidPayload(&'static str),

    /// Header name or value is not valid
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl Error {
    /// Create an error from inside a hook
    pub fn interceptor(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Interceptor(err.into())
    }

    /// Raw response of an [`Error::HttpFailure`]
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::HttpFailure(response) => Some(response),
            _ => None,
        }
    }

    /// Take the raw response out of an [`Error::HttpFailure`]
    pub fn into_response(self) -> Option<Response> {
        match self {
            Error::HttpFailure(response) => Some(*response),
            _ => None,
        }
    }

    /// True for the failures the error interceptor is allowed to handle
    pub(crate) fn is_interceptable(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Serialization(_))
    }
}

/// Errors raised by a [`Transport`](crate::Transport)
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    Connect(#[source] reqwest::Error),

    /// Outgoing body could not be converted for the wire
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Other request error
    #[error("Request failed: {0}")]
    Request(String),
}

impl TransportError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err)
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use reqwest::header::HeaderMap;
    use reqwest::StatusCode;

    #[test]
    fn test_error_messages() {
        assert_eq!(TransportError::Timeout.to_string(), "Request timed out");
        assert_eq!(
            TransportError::Request("boom".to_string()).to_string(),
            "Request failed: boom"
        );
        assert_eq!(
            Error::InvalidPayload("GET requests cannot carry a body").to_string(),
            "Invalid payload: GET requests cannot carry a body"
        );
        assert_eq!(
            Error::interceptor("token expired").to_string(),
            "Interceptor failed: token expired"
        );
    }

    #[test]
    fn test_transport_error_is_transparent() {
        let err = Error::from(TransportError::Timeout);
        assert_eq!(err.to_string(), "Request timed out");
        assert!(err.is_interceptable());
    }

    #[test]
    fn test_http_failure_exposes_response() {
        let response = Response::new(
            StatusCode::NOT_FOUND,
            HeaderMap::new(),
            "users/7",
            Bytes::from_static(b"missing"),
        );
        let err = Error::HttpFailure(Box::new(response));

        assert_eq!(err.to_string(), "Request failed with status 404 Not Found");
        assert!(!err.is_interceptable());
        assert_eq!(err.response().map(|r| r.status()), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.into_response().unwrap().text(), "missing");
    }

    #[test]
    fn test_serialization_is_interceptable() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(Error::Serialization(source).is_interceptable());
        assert!(!Error::Decode("bad".to_string()).is_interceptable());
    }
}
