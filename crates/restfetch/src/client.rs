//! Client construction for RestFetch
//!
//! A [`RestClient`] holds the shared configuration (base URL, prefix,
//! default headers, transport options, hooks and the transport). Resources
//! created from it reuse that configuration read-only.

use crate::compose::compose_path;
use crate::error::Error;
use crate::interceptor::{
    ErrorInterceptor, Interceptors, RequestInterceptor, ResponseInterceptor, Transform,
};
use crate::resource::Resource;
use crate::response::Response;
use crate::transport::{OutgoingRequest, ReqwestTransport, Transport};
use crate::types::{parse_header, TransportOptions};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Plain-data client settings, loadable with serde
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Base URL, e.g. `https://api.example.com`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Path prefix between base URL and resource, e.g. `v1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Default headers for every request
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Request timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Custom User-Agent for the default transport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Resolved client configuration, shared by every resource
#[derive(Clone)]
pub struct ClientConfig {
    pub(crate) base_url: Option<String>,
    pub(crate) prefix: Option<String>,
    pub(crate) headers: HeaderMap,
    pub(crate) options: TransportOptions,
    pub(crate) interceptors: Interceptors,
    pub(crate) transform: Option<Arc<dyn Transform>>,
    pub(crate) transport: Arc<dyn Transport>,
}

impl ClientConfig {
    /// Base URL, if configured
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Path prefix, if configured
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Default headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Default transport options
    pub fn transport_options(&self) -> &TransportOptions {
        &self.options
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("prefix", &self.prefix)
            .field("headers", &self.headers)
            .field("options", &self.options)
            .field("interceptors", &self.interceptors)
            .field("transform", &self.transform.is_some())
            .field("transport", &self.transport.name())
            .finish()
    }
}

/// Builder for configuring a [`RestClient`]
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    prefix: Option<String>,
    headers: HeaderMap,
    options: TransportOptions,
    interceptors: Interceptors,
    transform: Option<Arc<dyn Transform>>,
    transport: Option<Arc<dyn Transport>>,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from serde-loaded settings
    pub fn from_settings(settings: ClientSettings) -> Result<Self, Error> {
        let mut builder = Self::new();
        builder.base_url = settings.base_url;
        builder.prefix = settings.prefix;
        builder.user_agent = settings.user_agent;
        builder.options.timeout = settings.timeout_ms.map(Duration::from_millis);
        for (name, value) in &settings.headers {
            builder = builder.try_header(name, value)?;
        }
        Ok(builder)
    }

    /// Set the base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the path prefix
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Add a default header
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add a default header from strings, validating name and value
    pub fn try_header(mut self, name: &str, value: &str) -> Result<Self, Error> {
        let (name, value) = parse_header(name, value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Replace the default headers
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set the default request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// Replace the default transport options
    pub fn transport_options(mut self, options: TransportOptions) -> Self {
        self.options = options;
        self
    }

    /// Set custom User-Agent for the default transport
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the instance request interceptor
    pub fn request_interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptors.request = Some(Arc::new(interceptor));
        self
    }

    /// Set the instance response interceptor
    pub fn response_interceptor(mut self, interceptor: impl ResponseInterceptor + 'static) -> Self {
        self.interceptors.response = Some(Arc::new(interceptor));
        self
    }

    /// Set the instance error interceptor
    pub fn error_interceptor(mut self, interceptor: impl ErrorInterceptor + 'static) -> Self {
        self.interceptors.error = Some(Arc::new(interceptor));
        self
    }

    /// Set the payload transform hook
    pub fn transform(mut self, transform: impl Transform + 'static) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Use a custom transport instead of reqwest
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Build the client
    ///
    /// Fails only when the default reqwest transport cannot be created.
    pub fn build(self) -> Result<RestClient, Error> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let user_agent = self.user_agent.as_deref().unwrap_or(crate::DEFAULT_USER_AGENT);
                Arc::new(ReqwestTransport::with_user_agent(user_agent)?)
            }
        };

        Ok(RestClient {
            config: Arc::new(ClientConfig {
                base_url: self.base_url,
                prefix: self.prefix,
                headers: self.headers,
                options: self.options,
                interceptors: self.interceptors,
                transform: self.transform,
                transport,
            }),
        })
    }
}

/// Factory for resources sharing one configuration
#[derive(Debug, Clone)]
pub struct RestClient {
    config: Arc<ClientConfig>,
}

impl RestClient {
    /// Create a new client builder
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client with default settings
    pub fn new() -> Result<Self, Error> {
        ClientBuilder::new().build()
    }

    /// Shared configuration of this client
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Bind a resource path
    ///
    /// Base URL, prefix and `path` are joined once here; every call on the
    /// resource reuses the result.
    pub fn create(&self, path: &str) -> Resource {
        let base = compose_path([
            self.config.base_url.as_deref().unwrap_or_default(),
            self.config.prefix.as_deref().unwrap_or_default(),
            path,
        ]);
        Resource::new(base, Arc::clone(&self.config))
    }

    /// Send a request through this client's transport as is
    ///
    /// No URL composition, header merging or interceptors.
    pub async fn request(&self, request: OutgoingRequest) -> Result<Response, Error> {
        Ok(self.config.transport.send(&request).await?)
    }

    /// Late-bind the request interceptor
    ///
    /// Resources created before this call keep their previous hooks.
    pub fn set_request_interceptor(&mut self, interceptor: impl RequestInterceptor + 'static) {
        Arc::make_mut(&mut self.config).interceptors.request = Some(Arc::new(interceptor));
    }

    /// Late-bind the response interceptor
    pub fn set_response_interceptor(&mut self, interceptor: impl ResponseInterceptor + 'static) {
        Arc::make_mut(&mut self.config).interceptors.response = Some(Arc::new(interceptor));
    }

    /// Late-bind the error interceptor
    pub fn set_error_interceptor(&mut self, interceptor: impl ErrorInterceptor + 'static) {
        Arc::make_mut(&mut self.config).interceptors.error = Some(Arc::new(interceptor));
    }
}

/// Send a request with a default reqwest transport
///
/// Bypasses every RestFetch feature; use it for calls that need no wrapping.
pub async fn request(request: OutgoingRequest) -> Result<Response, Error> {
    let transport = ReqwestTransport::new()?;
    Ok(transport.send(&request).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Reply;
    use crate::test_util::ScriptedTransport;
    use crate::types::HttpMethod;

    fn scripted_client(builder: ClientBuilder) -> RestClient {
        builder.transport(ScriptedTransport::new()).build().unwrap()
    }

    #[test]
    fn test_create_composes_base_path() {
        let client = scripted_client(RestClient::builder().base_url("/api/").prefix("/v1/"));
        assert_eq!(client.create("/users/").path(), "api/v1/users");
    }

    #[test]
    fn test_create_without_base_or_prefix() {
        let client = scripted_client(RestClient::builder());
        assert_eq!(client.create("users").path(), "users");
        assert_eq!(client.create("").path(), "");

        let client = scripted_client(RestClient::builder().prefix("v2"));
        assert_eq!(client.create("/users").path(), "v2/users");
    }

    #[test]
    fn test_create_with_absolute_base_url() {
        let client = scripted_client(RestClient::builder().base_url("https://api.example.com/"));
        assert_eq!(client.create("users").path(), "https://api.example.com/users");
    }

    #[test]
    fn test_builder_from_settings() {
        let settings: ClientSettings = serde_json::from_str(
            r#"{
                "base_url": "https://api.example.com",
                "prefix": "v1",
                "headers": {"X-Api-Key": "secret"},
                "timeout_ms": 1500
            }"#,
        )
        .unwrap();

        let client = scripted_client(ClientBuilder::from_settings(settings).unwrap());
        let config = client.config();
        assert_eq!(config.base_url(), Some("https://api.example.com"));
        assert_eq!(config.prefix(), Some("v1"));
        assert_eq!(config.headers()["x-api-key"], "secret");
        assert_eq!(
            config.transport_options().timeout,
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn test_settings_reject_bad_header() {
        let settings = ClientSettings {
            headers: BTreeMap::from([("bad header".to_string(), "x".to_string())]),
            ..Default::default()
        };
        assert!(matches!(
            ClientBuilder::from_settings(settings),
            Err(Error::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_settings_serialization_omits_empty() {
        let json = serde_json::to_string(&ClientSettings::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_build_with_default_transport() {
        let client = RestClient::builder().user_agent("TestAgent/1.0").build().unwrap();
        assert_eq!(client.config().transport.name(), "reqwest");
    }

    #[tokio::test]
    async fn test_late_bound_interceptor_is_copy_on_write() {
        let mut client = scripted_client(RestClient::builder());
        let before = client.create("users");

        client.set_error_interceptor(|_: Error| async {
            Ok::<_, Error>(Reply::Text("recovered".to_string()))
        });
        let after = client.create("users");

        assert!(matches!(before.get(()).await, Err(Error::Transport(_))));
        let reply = after.get(()).await.unwrap();
        assert_eq!(reply.into_text().as_deref(), Some("recovered"));
    }

    #[tokio::test]
    async fn test_raw_request_bypasses_pipeline() {
        let transport = Arc::new(ScriptedTransport::new().respond(500, "down"));
        let client = RestClient::builder()
            .base_url("https://ignored.example.com")
            .header(
                HeaderName::from_static("x-default"),
                HeaderValue::from_static("1"),
            )
            .transport(Arc::clone(&transport))
            .build()
            .unwrap();

        let response = client
            .request(OutgoingRequest::new(HttpMethod::Get, "https://other.example.com/x"))
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 500);
        let sent = transport.requests();
        assert_eq!(sent[0].url, "https://other.example.com/x");
        assert!(sent[0].headers.is_empty());
    }
}
