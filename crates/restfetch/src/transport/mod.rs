//! Transport layer
//!
//! Design: the client never talks to the network directly. A fully resolved
//! [`OutgoingRequest`] is handed to a [`Transport`], which performs exactly
//! one round-trip and returns a buffered [`Response`].

mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;

use crate::error::TransportError;
use crate::response::Response;
use crate::types::{FormData, HttpMethod, TransportOptions};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;

/// Trait for request-dispatch primitives
///
/// Implement this trait to plug in another HTTP stack or an in-memory
/// transport for tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Unique identifier for this transport (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Send the request once and buffer the response
    ///
    /// Non-2xx statuses are responses, not errors.
    async fn send(&self, request: &OutgoingRequest) -> Result<Response, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn send(&self, request: &OutgoingRequest) -> Result<Response, TransportError> {
        (**self).send(request).await
    }
}

/// Serialized request body
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    /// No body
    #[default]
    Empty,
    /// Serialized JSON or plain text
    Text(String),
    /// Opaque bytes
    Bytes(Bytes),
    /// Encoded as multipart by the transport
    Form(FormData),
}

impl Body {
    /// Body as text, when it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            _ => None,
        }
    }

    /// True when there is no body
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }
}

/// A transport-ready request
#[derive(Debug, Clone, Default)]
pub struct OutgoingRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Final URL
    pub url: String,
    /// Final headers, `Content-Type` already inferred
    pub headers: HeaderMap,
    /// Serialized body
    pub body: Body,
    /// Timeout and auth for the transport
    pub options: TransportOptions,
}

impl OutgoingRequest {
    /// Create a request without headers or body
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the body
    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// Set the headers
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set the transport options
    pub fn options(mut self, options: TransportOptions) -> Self {
        self.options = options;
        self
    }
}
