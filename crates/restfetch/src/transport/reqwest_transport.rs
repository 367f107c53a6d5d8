//! Default transport backed by reqwest
//!
//! Maps an [`OutgoingRequest`] onto a `reqwest::Client` and buffers the
//! whole response body.

use super::{Body, OutgoingRequest, Transport};
use crate::error::TransportError;
use crate::response::Response;
use crate::types::{FormData, FormValue};
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use tracing::debug;

/// Default HTTP transport
///
/// Handles every method and body kind with:
/// - Multipart encoding for form bodies
/// - Per-request timeout and bearer/basic auth from transport options
/// - Error classification (timeout, connect, other)
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the default User-Agent
    pub fn new() -> Result<Self, TransportError> {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    /// Create a transport with a custom User-Agent
    pub fn with_user_agent(user_agent: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(TransportError::ClientBuild)?;
        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    fn name(&self) -> &'static str {
        "reqwest"
    }

    async fn send(&self, request: &OutgoingRequest) -> Result<Response, TransportError> {
        let mut builder = self
            .client
            .request(request.method.as_reqwest(), &request.url)
            .headers(outgoing_headers(request));

        builder = match &request.body {
            Body::Empty => builder,
            Body::Text(text) => builder.body(text.clone()),
            Body::Bytes(bytes) => builder.body(bytes.clone()),
            Body::Form(form) => builder.multipart(to_multipart(form)?),
        };

        let options = &request.options;
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(ref token) = options.bearer_auth {
            builder = builder.bearer_auth(token);
        }
        if let Some((ref username, ref password)) = options.basic_auth {
            builder = builder.basic_auth(username, password.as_ref());
        }

        debug!(transport = self.name(), method = %request.method, url = %request.url, "Sending request");

        let response = builder.send().await.map_err(TransportError::from_reqwest)?;

        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().to_string();
        let body = response
            .bytes()
            .await
            .map_err(TransportError::from_reqwest)?;

        debug!(status = status.as_u16(), size = body.len(), "Received response");

        Ok(Response::new(status, headers, url, body))
    }
}

/// Headers for the reqwest builder
///
/// reqwest appends the multipart and auth headers, so a `Content-Type` for
/// form bodies and an `Authorization` overridden by the auth options are
/// left out here.
fn outgoing_headers(request: &OutgoingRequest) -> HeaderMap {
    let mut headers = request.headers.clone();
    if matches!(request.body, Body::Form(_)) {
        headers.remove(CONTENT_TYPE);
    }
    let options = &request.options;
    if options.bearer_auth.is_some() || options.basic_auth.is_some() {
        headers.remove(AUTHORIZATION);
    }
    headers
}

/// Convert a form into a reqwest multipart form
fn to_multipart(form: &FormData) -> Result<Form, TransportError> {
    let mut multipart = Form::new();
    for (name, value) in form.fields() {
        multipart = match value {
            FormValue::Text(text) => multipart.text(name.clone(), text.clone()),
            FormValue::File {
                bytes,
                file_name,
                mime,
            } => {
                let mut part = Part::bytes(bytes.to_vec());
                if let Some(file_name) = file_name {
                    part = part.file_name(file_name.clone());
                }
                if let Some(mime) = mime {
                    part = part
                        .mime_str(mime)
                        .map_err(|e| TransportError::InvalidBody(e.to_string()))?;
                }
                multipart.part(name.clone(), part)
            }
        };
    }
    Ok(multipart)
}
