//! Core types for RestFetch

use crate::error::Error;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;

/// HTTP method for the request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET request
    #[default]
    Get,
    /// HTTP HEAD request
    Head,
    /// HTTP POST request
    Post,
    /// HTTP PUT request
    Put,
    /// HTTP PATCH request
    Patch,
    /// HTTP DELETE request
    Delete,
}

impl HttpMethod {
    /// True for methods that may carry a request body
    pub fn has_body(self) -> bool {
        !matches!(self, HttpMethod::Get | HttpMethod::Head)
    }

    pub(crate) fn as_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(format!("Invalid method: {s}")),
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// How a successful response body is decoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseType {
    /// Parse as JSON (default)
    #[default]
    Json,
    /// Decode as UTF-8 text
    Text,
    /// Raw bytes with their content type
    Blob,
    /// `application/x-www-form-urlencoded` fields
    FormData,
    /// Raw bytes
    ArrayBuffer,
    /// Return the response untouched
    Raw,
}

impl FromStr for ResponseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ResponseType::Json),
            "text" => Ok(ResponseType::Text),
            "blob" => Ok(ResponseType::Blob),
            "formData" => Ok(ResponseType::FormData),
            "arrayBuffer" => Ok(ResponseType::ArrayBuffer),
            "raw" => Ok(ResponseType::Raw),
            _ => Err(format!("Invalid response type: {s}")),
        }
    }
}

/// Options handed to the transport untouched
///
/// Instance and per-call options are merged field by field, per-call
/// values winning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Total request timeout
    pub timeout: Option<Duration>,
    /// Bearer token for the `Authorization` header
    pub bearer_auth: Option<String>,
    /// Username and optional password for basic auth
    pub basic_auth: Option<(String, Option<String>)>,
}

impl TransportOptions {
    /// Overlay `other` on top of `self`
    pub fn merge(&self, other: &TransportOptions) -> TransportOptions {
        TransportOptions {
            timeout: other.timeout.or(self.timeout),
            bearer_auth: other.bearer_auth.clone().or_else(|| self.bearer_auth.clone()),
            basic_auth: other.basic_auth.clone().or_else(|| self.basic_auth.clone()),
        }
    }
}

/// A single multipart field
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    /// Plain text field
    Text(String),
    /// File field
    File {
        bytes: Bytes,
        file_name: Option<String>,
        mime: Option<String>,
    },
}

/// Ordered multipart form, also used for decoded form responses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    fields: Vec<(String, FormValue)>,
}

impl FormData {
    /// Create an empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(name, FormValue::Text(value.into()));
        self
    }

    /// Add a file field
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        self.append(
            name,
            FormValue::File {
                bytes: bytes.into(),
                file_name: Some(file_name.into()),
                mime: Some(mime.into()),
            },
        );
        self
    }

    /// Append a field, keeping earlier fields with the same name
    pub fn append(&mut self, name: impl Into<String>, value: FormValue) {
        self.fields.push((name.into(), value));
    }

    /// First value for `name`
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// All fields in insertion order
    pub fn fields(&self) -> &[(String, FormValue)] {
        &self.fields
    }

    /// True when the form has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Body payload, classified once at the call boundary
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    /// No payload
    #[default]
    Empty,
    /// Plain text, sent as is
    Text(String),
    /// Opaque bytes, sent as is
    Binary(Bytes),
    /// Multipart form, the transport writes the boundary header
    Form(FormData),
    /// JSON mapping or array
    Structured(Value),
}

impl Payload {
    /// Serialize any value into a structured payload
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        serde_json::to_value(value)
            .map(Payload::Structured)
            .map_err(Error::Serialization)
    }

    /// True for [`Payload::Empty`]
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    /// The payload as query parameters, when it is a JSON mapping
    pub(crate) fn as_query(&self) -> Option<&serde_json::Map<String, Value>> {
        match self {
            Payload::Structured(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Payload::Empty,
            Value::String(text) => Payload::Text(text),
            other => Payload::Structured(other),
        }
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Payload::Binary(bytes)
    }
}

impl From<FormData> for Payload {
    fn from(form: FormData) -> Self {
        Payload::Form(form)
    }
}

/// Primary argument of a verb method
///
/// Strings and numbers are id or sub-path segments; everything else is a
/// payload (query parameters for `GET`/`HEAD`, body otherwise).
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Data {
    /// Nothing beyond the resource path
    #[default]
    Empty,
    /// Id or sub-path appended to the resource path
    Segment(String),
    /// Query parameters or body
    Payload(Payload),
}

impl Data {
    /// Build a path segment from anything displayable
    pub fn segment(segment: impl ToString) -> Self {
        Data::Segment(segment.to_string())
    }
}

impl From<()> for Data {
    fn from(_: ()) -> Self {
        Data::Empty
    }
}

impl From<&str> for Data {
    fn from(segment: &str) -> Self {
        Data::Segment(segment.to_string())
    }
}

impl From<String> for Data {
    fn from(segment: String) -> Self {
        Data::Segment(segment)
    }
}

macro_rules! segment_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Data {
                fn from(id: $ty) -> Self {
                    Data::Segment(id.to_string())
                }
            }
        )*
    };
}

segment_from_number!(i32, i64, u32, u64, usize);

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Data::Empty,
            Value::String(segment) => Data::Segment(segment),
            Value::Number(number) => Data::Segment(number.to_string()),
            Value::Bool(flag) => Data::Segment(flag.to_string()),
            other => Data::Payload(Payload::Structured(other)),
        }
    }
}

impl From<Payload> for Data {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Empty => Data::Empty,
            other => Data::Payload(other),
        }
    }
}

impl From<Bytes> for Data {
    fn from(bytes: Bytes) -> Self {
        Data::Payload(Payload::Binary(bytes))
    }
}

impl From<FormData> for Data {
    fn from(form: FormData) -> Self {
        Data::Payload(Payload::Form(form))
    }
}

/// Per-call overrides
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Headers that replace instance headers of the same name
    pub headers: HeaderMap,
    /// Transport options overlaid on the instance options
    pub transport: TransportOptions,
    /// Decoding for a successful response (default JSON)
    pub response_type: Option<ResponseType>,
    /// Secondary payload, used when the primary argument is a segment
    pub data: Option<Payload>,
}

impl RequestOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set a header from strings, validating name and value
    pub fn try_header(mut self, name: &str, value: &str) -> Result<Self, Error> {
        let (name, value) = parse_header(name, value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Set the response decoding
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    /// Set the secondary payload
    pub fn data(mut self, data: impl Into<Payload>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.transport.timeout = Some(timeout);
        self
    }

    /// Replace the transport options
    pub fn transport_options(mut self, options: TransportOptions) -> Self {
        self.transport = options;
        self
    }
}

pub(crate) fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), Error> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| Error::InvalidHeader(format!("bad name {name:?}")))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|_| Error::InvalidHeader(format!("bad value for {name}")))?;
    Ok((header_name, header_value))
}
