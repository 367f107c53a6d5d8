//! Interceptor hooks
//!
//! Design: each hook point is a trait with a blanket impl for async closures.
//! Hooks resolve per call as instance > global > default, and the defaults
//! are real implementations ([`Passthrough`], [`Rethrow`]) so the pipeline
//! never branches on a missing request or error hook.

use crate::error::Error;
use crate::global;
use crate::response::{Reply, Response};
use crate::transport::{OutgoingRequest, Transport};
use crate::types::{HttpMethod, Payload, ResponseType, TransportOptions};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::future::Future;
use std::sync::Arc;

/// Request as seen by the request interceptor
///
/// Headers are already merged and the URL composed; the payload is not yet
/// serialized, so `Content-Type` inference sees the interceptor's changes.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// HTTP method
    pub method: HttpMethod,
    /// Composed URL including the query string
    pub url: String,
    /// Instance headers overlaid with per-call headers
    pub headers: HeaderMap,
    /// Merged transport options
    pub options: TransportOptions,
    /// Decoding for a successful response
    pub response_type: ResponseType,
    /// Body payload, ignored for GET and HEAD
    pub payload: Payload,
}

/// Rewrites a request before it is serialized and sent
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    async fn intercept(&self, config: RequestConfig) -> Result<RequestConfig, Error>;
}

/// Takes over status handling and decoding of every response
///
/// When configured, non-2xx responses are not errors unless this hook says
/// so.
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    async fn intercept(
        &self,
        response: Response,
        response_type: ResponseType,
        retry: Retry,
    ) -> Result<Reply, Error>;
}

/// Handles transport and serialization failures
///
/// Returning `Ok` recovers the call; returning `Err` rejects it.
#[async_trait]
pub trait ErrorInterceptor: Send + Sync {
    async fn intercept(&self, error: Error) -> Result<Reply, Error>;
}

/// Rewrites a body payload before serialization
pub trait Transform: Send + Sync {
    fn transform(&self, payload: Payload, method: HttpMethod, url: &str) -> Result<Payload, Error>;
}

#[async_trait]
impl<F, Fut> RequestInterceptor for F
where
    F: Fn(RequestConfig) -> Fut + Send + Sync,
    Fut: Future<Output = Result<RequestConfig, Error>> + Send,
{
    async fn intercept(&self, config: RequestConfig) -> Result<RequestConfig, Error> {
        self(config).await
    }
}

#[async_trait]
impl<F, Fut> ResponseInterceptor for F
where
    F: Fn(Response, ResponseType, Retry) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Reply, Error>> + Send,
{
    async fn intercept(
        &self,
        response: Response,
        response_type: ResponseType,
        retry: Retry,
    ) -> Result<Reply, Error> {
        self(response, response_type, retry).await
    }
}

#[async_trait]
impl<F, Fut> ErrorInterceptor for F
where
    F: Fn(Error) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Reply, Error>> + Send,
{
    async fn intercept(&self, error: Error) -> Result<Reply, Error> {
        self(error).await
    }
}

impl<F> Transform for F
where
    F: Fn(Payload, HttpMethod, &str) -> Result<Payload, Error> + Send + Sync,
{
    fn transform(&self, payload: Payload, method: HttpMethod, url: &str) -> Result<Payload, Error> {
        self(payload, method, url)
    }
}

/// Request hook used when none is registered
pub struct Passthrough;

#[async_trait]
impl RequestInterceptor for Passthrough {
    async fn intercept(&self, config: RequestConfig) -> Result<RequestConfig, Error> {
        Ok(config)
    }
}

/// Error hook used when none is registered
pub struct Rethrow;

#[async_trait]
impl ErrorInterceptor for Rethrow {
    async fn intercept(&self, error: Error) -> Result<Reply, Error> {
        Err(error)
    }
}

/// Re-issues the request that produced a response
///
/// Handed to response interceptors for retry and re-authentication flows.
/// Each call performs one transport round-trip and returns the raw response;
/// interceptors are not run again.
#[derive(Clone)]
pub struct Retry {
    transport: Arc<dyn Transport>,
    request: Arc<OutgoingRequest>,
}

impl Retry {
    pub(crate) fn new(transport: Arc<dyn Transport>, request: Arc<OutgoingRequest>) -> Self {
        Self { transport, request }
    }

    /// The request that will be re-sent
    pub fn request(&self) -> &OutgoingRequest {
        &self.request
    }

    /// Send the identical request again
    pub async fn send(&self) -> Result<Response, Error> {
        tracing::debug!(url = %self.request.url, "Retrying request");
        Ok(self.transport.send(&self.request).await?)
    }

    /// Send a modified copy of the request, e.g. with a refreshed token
    pub async fn send_with<F>(&self, modify: F) -> Result<Response, Error>
    where
        F: FnOnce(&mut OutgoingRequest),
    {
        let mut request = OutgoingRequest::clone(&self.request);
        modify(&mut request);
        tracing::debug!(url = %request.url, "Retrying modified request");
        Ok(self.transport.send(&request).await?)
    }
}

impl std::fmt::Debug for Retry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retry")
            .field("transport", &self.transport.name())
            .field("request", &self.request)
            .finish()
    }
}

/// Optional hooks of one scope (instance or global)
#[derive(Clone, Default)]
pub(crate) struct Interceptors {
    pub request: Option<Arc<dyn RequestInterceptor>>,
    pub response: Option<Arc<dyn ResponseInterceptor>>,
    pub error: Option<Arc<dyn ErrorInterceptor>>,
}

impl Interceptors {
    pub(crate) const EMPTY: Interceptors = Interceptors {
        request: None,
        response: None,
        error: None,
    };

    /// Resolve against the global hooks, filling gaps with defaults
    pub(crate) fn resolve(&self) -> ResolvedInterceptors {
        let global = global::snapshot();
        ResolvedInterceptors {
            request: self
                .request
                .clone()
                .or(global.request)
                .unwrap_or_else(|| Arc::new(Passthrough)),
            response: self.response.clone().or(global.response),
            error: self
                .error
                .clone()
                .or(global.error)
                .unwrap_or_else(|| Arc::new(Rethrow)),
        }
    }
}

impl std::fmt::Debug for Interceptors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptors")
            .field("request", &self.request.is_some())
            .field("response", &self.response.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

/// Hooks in effect for one call
pub(crate) struct ResolvedInterceptors {
    pub request: Arc<dyn RequestInterceptor>,
    pub response: Option<Arc<dyn ResponseInterceptor>>,
    pub error: Arc<dyn ErrorInterceptor>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::ScriptedTransport;
    use reqwest::header::{HeaderValue, AUTHORIZATION};

    fn config() -> RequestConfig {
        RequestConfig {
            method: HttpMethod::Get,
            url: "users".to_string(),
            headers: HeaderMap::new(),
            options: TransportOptions::default(),
            response_type: ResponseType::Json,
            payload: Payload::Empty,
        }
    }

    #[test]
    fn test_passthrough_is_identity() {
        let out = tokio_test::block_on(Passthrough.intercept(config())).unwrap();
        assert_eq!(out.url, "users");
        assert!(out.headers.is_empty());
    }

    #[test]
    fn test_rethrow_returns_error() {
        let err = tokio_test::block_on(Rethrow.intercept(Error::Decode("x".to_string())));
        assert!(matches!(err, Err(Error::Decode(_))));
    }

    #[test]
    fn test_closure_request_interceptor() {
        let hook = |mut config: RequestConfig| async move {
            config.url.push_str("/me");
            Ok::<_, Error>(config)
        };
        let out = tokio_test::block_on(RequestInterceptor::intercept(&hook, config())).unwrap();
        assert_eq!(out.url, "users/me");
    }

    #[test]
    fn test_closure_transform() {
        let upper = |payload: Payload, _method: HttpMethod, _url: &str| -> Result<Payload, Error> {
            match payload {
                Payload::Text(text) => Ok(Payload::Text(text.to_uppercase())),
                other => Ok(other),
            }
        };
        let out = upper
            .transform(Payload::Text("hi".to_string()), HttpMethod::Post, "users")
            .unwrap();
        assert_eq!(out, Payload::Text("HI".to_string()));
    }

    #[test]
    fn test_instance_hooks_resolve_before_defaults() {
        let interceptors = Interceptors {
            error: Some(Arc::new(|_: Error| async {
                Ok::<_, Error>(Reply::Text("recovered".to_string()))
            })),
            ..Default::default()
        };

        let resolved = interceptors.resolve();
        let reply = tokio_test::block_on(resolved.error.intercept(Error::Decode("x".into())));
        assert_eq!(reply.unwrap().into_text().as_deref(), Some("recovered"));
    }

    #[tokio::test]
    async fn test_retry_resends_identical_request() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(200, "first")
                .respond(200, "second"),
        );
        let request = Arc::new(OutgoingRequest::new(HttpMethod::Get, "users"));
        let retry = Retry::new(transport.clone(), request);

        assert_eq!(retry.send().await.unwrap().text(), "first");
        assert_eq!(retry.send().await.unwrap().text(), "second");

        let sent = transport.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].url, sent[1].url);
    }

    #[tokio::test]
    async fn test_retry_send_with_modifies_copy() {
        let transport = Arc::new(ScriptedTransport::new().respond(200, "ok"));
        let retry = Retry::new(
            transport.clone(),
            Arc::new(OutgoingRequest::new(HttpMethod::Get, "users")),
        );

        retry
            .send_with(|request| {
                request
                    .headers
                    .insert(AUTHORIZATION, HeaderValue::from_static("Bearer fresh"));
            })
            .await
            .unwrap();

        assert!(retry.request().headers.is_empty());
        assert_eq!(transport.requests()[0].headers[AUTHORIZATION], "Bearer fresh");
    }
}
