//! Body and header resolution
//!
//! Two passes around the request interceptor:
//! - [`resolve_target`] decides, before interception, what becomes path,
//!   query and body.
//! - [`resolve_body`] serializes the (possibly intercepted) payload and
//!   infers a default `Content-Type` when the headers carry none.

use crate::compose::{append_query, compose_path};
use crate::error::Error;
use crate::interceptor::{RequestConfig, Transform};
use crate::transport::{Body, OutgoingRequest};
use crate::types::{Data, HttpMethod, Payload};
use crate::{JSON_CONTENT_TYPE, TEXT_CONTENT_TYPE};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tracing::debug;

/// Overlay `overrides` on `base`; a name present in `overrides` replaces
/// every value `base` has for it
pub(crate) fn merge_headers(base: &HeaderMap, overrides: &HeaderMap) -> HeaderMap {
    let mut merged = base.clone();
    for name in overrides.keys() {
        merged.remove(name);
    }
    for (name, value) in overrides {
        merged.append(name.clone(), value.clone());
    }
    merged
}

/// Split the call arguments into the request URL and the body payload
///
/// `secondary` is the `data` of the per-call options; it is used when the
/// primary argument is a path segment or empty.
pub(crate) fn resolve_target(
    base: &str,
    method: HttpMethod,
    data: Data,
    secondary: Option<Payload>,
) -> Result<(String, Payload), Error> {
    let (mut url, payload) = match data {
        Data::Empty => (base.to_string(), secondary.unwrap_or_default()),
        Data::Segment(segment) => (
            compose_path([base, segment.as_str()]),
            secondary.unwrap_or_default(),
        ),
        Data::Payload(payload) => {
            if secondary.is_some() {
                debug!("Primary payload given, ignoring options data");
            }
            (base.to_string(), payload)
        }
    };

    if method.has_body() {
        return Ok((url, payload));
    }

    if let Some(params) = payload.as_query() {
        append_query(&mut url, params);
    } else if !payload.is_empty() {
        return Err(Error::InvalidPayload(
            "GET and HEAD only accept a mapping of query parameters",
        ));
    }
    Ok((url, Payload::Empty))
}

/// Serialize the payload and finish the header set
pub(crate) fn resolve_body(
    config: RequestConfig,
    transform: Option<&dyn Transform>,
) -> Result<OutgoingRequest, Error> {
    let RequestConfig {
        method,
        url,
        mut headers,
        options,
        payload,
        ..
    } = config;

    let body = if method.has_body() {
        let payload = match transform {
            Some(transform) => transform.transform(payload, method, &url)?,
            None => payload,
        };
        encode_payload(payload, &mut headers)?
    } else {
        if !payload.is_empty() {
            debug!(%method, "Dropping payload set by interceptor on bodiless method");
        }
        Body::Empty
    };

    Ok(OutgoingRequest {
        method,
        url,
        headers,
        body,
        options,
    })
}

fn encode_payload(payload: Payload, headers: &mut HeaderMap) -> Result<Body, Error> {
    Ok(match payload {
        Payload::Structured(value) => {
            let json = serde_json::to_string(&value).map_err(Error::Serialization)?;
            default_content_type(headers, JSON_CONTENT_TYPE);
            Body::Text(json)
        }
        Payload::Form(form) => Body::Form(form),
        Payload::Binary(bytes) => Body::Bytes(bytes),
        Payload::Text(text) => {
            default_content_type(headers, TEXT_CONTENT_TYPE);
            Body::Text(text)
        }
        Payload::Empty => {
            // Servers negotiating JSON expect the header even without a body
            default_content_type(headers, JSON_CONTENT_TYPE);
            Body::Empty
        }
    })
}

fn default_content_type(headers: &mut HeaderMap, content_type: &'static str) {
    if !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
}
