//! Responses and decoded replies

use crate::error::Error;
use crate::types::{FormData, FormValue, ResponseType};
use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::form_urlencoded;

/// A buffered HTTP response
///
/// Decoding methods take `self`, so the body can be consumed only once.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    url: String,
    body: Bytes,
}

impl Response {
    /// Create a response, typically from a custom transport
    pub fn new(status: StatusCode, headers: HeaderMap, url: impl Into<String>, body: Bytes) -> Self {
        Self {
            status,
            headers,
            url: url.into(),
            body,
        }
    }

    /// HTTP status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// True for 2xx statuses
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Final URL after redirects
    pub fn url(&self) -> &str {
        &self.url
    }

    /// `Content-Type` header value
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Parse the body as JSON
    pub fn json<T: DeserializeOwned>(self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|e| Error::Decode(e.to_string()))
    }

    /// Parse the body as a JSON value; an empty body is `null`
    pub(crate) fn json_value(self) -> Result<Value, Error> {
        if self.body.is_empty() {
            Ok(Value::Null)
        } else {
            self.json()
        }
    }

    /// Decode the body as UTF-8, replacing invalid sequences
    pub fn text(self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body bytes together with the content type
    pub fn blob(self) -> Blob {
        Blob {
            content_type: self.content_type().map(str::to_string),
            bytes: self.body,
        }
    }

    /// Body bytes
    pub fn array_buffer(self) -> Bytes {
        self.body
    }

    /// Parse an `application/x-www-form-urlencoded` body
    pub fn form_data(self) -> Result<FormData, Error> {
        if let Some(ct) = self.content_type() {
            if ct.to_ascii_lowercase().starts_with("multipart/") {
                return Err(Error::Decode(
                    "multipart response bodies are not supported".to_string(),
                ));
            }
        }

        let mut form = FormData::new();
        for (name, value) in form_urlencoded::parse(&self.body) {
            form.append(name, FormValue::Text(value.into_owned()));
        }
        Ok(form)
    }

    /// Decode according to `response_type`
    pub(crate) fn decode(self, response_type: ResponseType) -> Result<Reply, Error> {
        Ok(match response_type {
            ResponseType::Json => Reply::Json(self.json_value()?),
            ResponseType::Text => Reply::Text(self.text()),
            ResponseType::Blob => Reply::Blob(self.blob()),
            ResponseType::FormData => Reply::FormData(self.form_data()?),
            ResponseType::ArrayBuffer => Reply::ArrayBuffer(self.array_buffer()),
            ResponseType::Raw => Reply::Raw(self),
        })
    }
}

/// Binary body with its content type
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    /// `Content-Type` of the response, if any
    pub content_type: Option<String>,
    /// Body bytes
    pub bytes: Bytes,
}

/// Result of a call: a decoded body, the raw response, or whatever a
/// response interceptor produced
#[derive(Debug)]
pub enum Reply {
    /// Parsed JSON, `null` for an empty body
    Json(Value),
    /// UTF-8 text
    Text(String),
    /// Bytes with their content type
    Blob(Blob),
    /// Urlencoded form fields
    FormData(FormData),
    /// Bytes only
    ArrayBuffer(Bytes),
    /// Undecoded response
    Raw(Response),
}

impl Reply {
    /// Borrow the JSON value, if any
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Reply::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Deserialize a JSON or text reply into `T`
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, Error> {
        match self {
            Reply::Json(value) => {
                serde_json::from_value(value).map_err(|e| Error::Decode(e.to_string()))
            }
            Reply::Text(text) => {
                serde_json::from_str(&text).map_err(|e| Error::Decode(e.to_string()))
            }
            Reply::Raw(response) => serde_json::from_value(response.json_value()?)
                .map_err(|e| Error::Decode(e.to_string())),
            _ => Err(Error::Decode("reply is not JSON".to_string())),
        }
    }

    /// Take the text, if any
    pub fn into_text(self) -> Option<String> {
        match self {
            Reply::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Take the raw response, if any
    pub fn into_response(self) -> Option<Response> {
        match self {
            Reply::Raw(response) => Some(response),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde::Deserialize;

    fn response(content_type: Option<&'static str>, body: &'static [u8]) -> Response {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        Response::new(StatusCode::OK, headers, "users", Bytes::from_static(body))
    }

    #[test]
    fn test_decode_json_default() {
        let reply = response(Some("application/json"), br#"{"id":1}"#)
            .decode(ResponseType::Json)
            .unwrap();
        assert_eq!(reply.as_json(), Some(&serde_json::json!({"id": 1})));
    }

    #[test]
    fn test_decode_json_empty_body_is_null() {
        let reply = response(None, b"").decode(ResponseType::Json).unwrap();
        assert_eq!(reply.as_json(), Some(&Value::Null));
    }

    #[test]
    fn test_decode_json_invalid() {
        let err = response(None, b"<html>").decode(ResponseType::Json).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_decode_text_and_buffers() {
        let text = response(None, b"hello").decode(ResponseType::Text).unwrap();
        assert_eq!(text.into_text().as_deref(), Some("hello"));

        let blob = response(Some("image/png"), b"\x89PNG")
            .decode(ResponseType::Blob)
            .unwrap();
        match blob {
            Reply::Blob(blob) => {
                assert_eq!(blob.content_type.as_deref(), Some("image/png"));
                assert_eq!(blob.bytes.as_ref(), b"\x89PNG");
            }
            other => panic!("unexpected reply: {other:?}"),
        }

        let buffer = response(None, b"raw").decode(ResponseType::ArrayBuffer).unwrap();
        assert!(matches!(buffer, Reply::ArrayBuffer(bytes) if bytes.as_ref() == b"raw"));
    }

    #[test]
    fn test_decode_form_data() {
        let reply = response(Some("application/x-www-form-urlencoded"), b"a=1&b=x+y")
            .decode(ResponseType::FormData)
            .unwrap();
        match reply {
            Reply::FormData(form) => {
                assert_eq!(form.get("a"), Some(&FormValue::Text("1".to_string())));
                assert_eq!(form.get("b"), Some(&FormValue::Text("x y".to_string())));
            }
            other => panic!("unexpected reply: {other:?}"),
        }

        let err = response(Some("multipart/form-data; boundary=x"), b"--x--")
            .form_data()
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_decode_raw_keeps_response() {
        let reply = response(None, b"{}").decode(ResponseType::Raw).unwrap();
        let raw = reply.into_response().unwrap();
        assert_eq!(raw.url(), "users");
        assert!(raw.is_ok());
    }

    #[test]
    fn test_reply_into_json_typed() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct User {
            id: u32,
        }

        let reply = Reply::Json(serde_json::json!({"id": 3}));
        assert_eq!(reply.into_json::<User>().unwrap(), User { id: 3 });

        let reply = Reply::Text(r#"{"id":4}"#.to_string());
        assert_eq!(reply.into_json::<User>().unwrap(), User { id: 4 });

        let reply = Reply::ArrayBuffer(Bytes::new());
        assert!(reply.into_json::<User>().is_err());
    }

    #[test]
    fn test_raw_reply_empty_body_matches_json_decoding() {
        let raw = response(None, b"").decode(ResponseType::Raw).unwrap();
        assert_eq!(raw.into_json::<Value>().unwrap(), Value::Null);
        let raw = response(None, b"").decode(ResponseType::Raw).unwrap();
        assert_eq!(raw.into_json::<Option<u32>>().unwrap(), None);

        let raw = response(None, br#"{"id":5}"#).decode(ResponseType::Raw).unwrap();
        assert_eq!(raw.into_json::<Value>().unwrap(), serde_json::json!({"id": 5}));
    }
}
