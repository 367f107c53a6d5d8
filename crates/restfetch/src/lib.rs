//! RestFetch - RESTful resource client built on a pluggable transport
//!
//! This crate wraps an HTTP transport (by default [`reqwest`]) with
//! resource-oriented helpers (`get`, `post`, `put`, `patch`, `delete`),
//! base URL and prefix composition, and request/response/error interceptors.
//!
//! ## Request pipeline
//!
//! Every call on a [`Resource`] goes through the same steps:
//! 1. The URL is composed from the resource path, an optional id segment and
//!    query parameters (for `GET`/`HEAD`).
//! 2. Instance and per-call headers are merged into a [`RequestConfig`].
//! 3. The [`RequestInterceptor`] may rewrite the config.
//! 4. The [`Transform`] hook may rewrite the payload, which is then
//!    serialized and gets a default `Content-Type` if none is set.
//! 5. The [`Transport`] sends the request exactly once.
//! 6. A [`ResponseInterceptor`] handles the response, or the default status
//!    check and decoding produce a [`Reply`].
//!
//! Transport and serialization failures are routed to the
//! [`ErrorInterceptor`]. Hooks resolve as instance > global > default.
//!
//! ```no_run
//! use restfetch::{RestClient, Data};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), restfetch::Error> {
//! let client = RestClient::builder()
//!     .base_url("https://api.example.com")
//!     .prefix("v1")
//!     .build()?;
//!
//! let users = client.create("users");
//! let page = users.get(json!({"page": 2})).await?;
//! let created = users.post(json!({"name": "a"})).await?;
//! let removed = users.delete(42).await?;
//! # let _ = (page, created, removed, Data::Empty);
//! # Ok(())
//! # }
//! ```

mod body;
pub mod client;
mod compose;
mod error;
mod global;
pub mod interceptor;
mod resource;
mod response;
pub mod transport;
mod types;

#[cfg(test)]
mod test_util;

pub use client::{request, ClientBuilder, ClientConfig, ClientSettings, RestClient};
pub use error::{Error, TransportError};
pub use global::{
    add_global_error_interceptor, add_global_request_interceptor,
    add_global_response_interceptor, clear_global_interceptors,
};
pub use interceptor::{
    ErrorInterceptor, RequestConfig, RequestInterceptor, ResponseInterceptor, Retry, Transform,
};
pub use resource::Resource;
pub use response::{Blob, Reply, Response};
pub use transport::{Body, OutgoingRequest, ReqwestTransport, Transport};
pub use types::{
    Data, FormData, FormValue, HttpMethod, Payload, RequestOptions, ResponseType,
    TransportOptions,
};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "Everruns RestFetch/1.0";

/// `Content-Type` asserted for JSON bodies and empty body-bearing requests
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// `Content-Type` asserted for plain text bodies
pub const TEXT_CONTENT_TYPE: &str = "text/plain;charset=utf-8";
