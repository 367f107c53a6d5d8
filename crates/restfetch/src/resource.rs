//! Resource handles and the request pipeline
//!
//! A [`Resource`] is bound to one composed base path. Every verb method runs
//! the same pipeline: target resolution, header merge, request interceptor,
//! body encoding, one transport call, then the response interceptor or the
//! default status check and decoding.

use crate::body::{merge_headers, resolve_body, resolve_target};
use crate::client::ClientConfig;
use crate::error::Error;
use crate::interceptor::{RequestConfig, ResolvedInterceptors, Retry};
use crate::response::Reply;
use crate::types::{Data, HttpMethod, Payload, RequestOptions};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Request target bound to a resource path
#[derive(Debug, Clone)]
pub struct Resource {
    path: String,
    config: Arc<ClientConfig>,
}

impl Resource {
    pub(crate) fn new(path: String, config: Arc<ClientConfig>) -> Self {
        Self { path, config }
    }

    /// Composed base path of this resource
    pub fn path(&self) -> &str {
        &self.path
    }

    /// GET: a mapping becomes the query string, a scalar an id segment
    pub async fn get(&self, data: impl Into<Data>) -> Result<Reply, Error> {
        self.get_with_options(data, RequestOptions::default()).await
    }

    /// GET with per-call headers, options and query `data`
    pub async fn get_with_options(
        &self,
        data: impl Into<Data>,
        options: RequestOptions,
    ) -> Result<Reply, Error> {
        self.send(HttpMethod::Get, data.into(), options).await
    }

    /// GET a single record by id with query parameters
    pub async fn get_one(&self, id: impl ToString, query: Value) -> Result<Reply, Error> {
        let options = RequestOptions::new().data(query);
        self.send(HttpMethod::Get, Data::segment(id), options).await
    }

    /// HEAD: same URL rules as GET
    pub async fn head(&self, data: impl Into<Data>) -> Result<Reply, Error> {
        self.head_with_options(data, RequestOptions::default()).await
    }

    /// HEAD with per-call overrides
    pub async fn head_with_options(
        &self,
        data: impl Into<Data>,
        options: RequestOptions,
    ) -> Result<Reply, Error> {
        self.send(HttpMethod::Head, data.into(), options).await
    }

    /// POST: a payload is the body, a scalar an id segment
    pub async fn post(&self, data: impl Into<Data>) -> Result<Reply, Error> {
        self.post_with_options(data, RequestOptions::default()).await
    }

    /// POST with per-call overrides; `options.data` is the body after a segment
    pub async fn post_with_options(
        &self,
        data: impl Into<Data>,
        options: RequestOptions,
    ) -> Result<Reply, Error> {
        self.send(HttpMethod::Post, data.into(), options).await
    }

    /// PUT: a payload is the body, a scalar an id segment
    pub async fn put(&self, data: impl Into<Data>) -> Result<Reply, Error> {
        self.put_with_options(data, RequestOptions::default()).await
    }

    /// PUT with per-call overrides
    pub async fn put_with_options(
        &self,
        data: impl Into<Data>,
        options: RequestOptions,
    ) -> Result<Reply, Error> {
        self.send(HttpMethod::Put, data.into(), options).await
    }

    /// PATCH: a payload is the body, a scalar an id segment
    pub async fn patch(&self, data: impl Into<Data>) -> Result<Reply, Error> {
        self.patch_with_options(data, RequestOptions::default()).await
    }

    /// PATCH with per-call overrides
    pub async fn patch_with_options(
        &self,
        data: impl Into<Data>,
        options: RequestOptions,
    ) -> Result<Reply, Error> {
        self.send(HttpMethod::Patch, data.into(), options).await
    }

    /// DELETE: usually an id segment; a bodiless call still sends the JSON
    /// `Content-Type`
    pub async fn delete(&self, data: impl Into<Data>) -> Result<Reply, Error> {
        self.delete_with_options(data, RequestOptions::default()).await
    }

    /// DELETE with per-call overrides
    pub async fn delete_with_options(
        &self,
        data: impl Into<Data>,
        options: RequestOptions,
    ) -> Result<Reply, Error> {
        self.send(HttpMethod::Delete, data.into(), options).await
    }

    /// POST a serializable body
    pub async fn post_json<T: Serialize + ?Sized>(&self, body: &T) -> Result<Reply, Error> {
        self.send_json(HttpMethod::Post, Data::Empty, body).await
    }

    /// PUT a serializable body to the record `id`
    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        id: impl ToString,
        body: &T,
    ) -> Result<Reply, Error> {
        self.send_json(HttpMethod::Put, Data::segment(id), body).await
    }

    /// PATCH a serializable body to the record `id`
    pub async fn patch_json<T: Serialize + ?Sized>(
        &self,
        id: impl ToString,
        body: &T,
    ) -> Result<Reply, Error> {
        self.send_json(HttpMethod::Patch, Data::segment(id), body).await
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        data: Data,
        body: &T,
    ) -> Result<Reply, Error> {
        match Payload::json(body) {
            Ok(payload) => {
                self.send(method, data, RequestOptions::new().data(payload))
                    .await
            }
            Err(err) => recover(&self.config.interceptors.resolve(), err).await,
        }
    }

    /// Run the full pipeline for any method
    pub async fn send(
        &self,
        method: HttpMethod,
        data: Data,
        options: RequestOptions,
    ) -> Result<Reply, Error> {
        let hooks = self.config.interceptors.resolve();
        let RequestOptions {
            headers,
            transport,
            response_type,
            data: secondary,
        } = options;

        let (url, payload) = resolve_target(&self.path, method, data, secondary)?;
        let config = RequestConfig {
            method,
            url,
            headers: merge_headers(&self.config.headers, &headers),
            options: self.config.options.merge(&transport),
            response_type: response_type.unwrap_or_default(),
            payload,
        };

        let config = hooks.request.intercept(config).await?;
        let response_type = config.response_type;

        let outgoing = match resolve_body(config, self.config.transform.as_deref()) {
            Ok(outgoing) => Arc::new(outgoing),
            Err(err) => return recover(&hooks, err).await,
        };

        debug!(
            transport = self.config.transport.name(),
            method = %outgoing.method,
            url = %outgoing.url,
            "Dispatching request"
        );

        let response = match self.config.transport.send(&outgoing).await {
            Ok(response) => response,
            Err(err) => return recover(&hooks, Error::Transport(err)).await,
        };

        if let Some(interceptor) = hooks.response {
            let retry = Retry::new(Arc::clone(&self.config.transport), outgoing);
            return interceptor.intercept(response, response_type, retry).await;
        }

        if !response.is_ok() {
            debug!(status = response.status().as_u16(), url = %outgoing.url, "Request failed");
            return Err(Error::HttpFailure(Box::new(response)));
        }

        response.decode(response_type)
    }
}

/// Hand transport and serialization failures to the error interceptor
async fn recover(hooks: &ResolvedInterceptors, err: Error) -> Result<Reply, Error> {
    if !err.is_interceptable() {
        return Err(err);
    }
    warn!(error = %err, "Request failed before a response was received");
    hooks.error.intercept(err).await
}
