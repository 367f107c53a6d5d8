//! URL composition
//!
//! Paths are joined from segments with exactly one `/` between them;
//! query strings are encoded like `URLSearchParams`, so every value is
//! stringified.

use serde_json::{Map, Number, Value};
use url::form_urlencoded;

/// Strip surrounding whitespace and slashes from a segment
pub(crate) fn trim_slashes(segment: &str) -> &str {
    segment.trim().trim_matches('/')
}

/// Join segments with single slashes, dropping empty ones
pub(crate) fn compose_path<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    segments
        .into_iter()
        .map(trim_slashes)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Append an encoded query string, skipping empty mappings
pub(crate) fn append_query(url: &mut String, params: &Map<String, Value>) {
    if params.is_empty() {
        return;
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, &query_value(value));
    }

    url.push(if url.contains('?') { '&' } else { '?' });
    url.push_str(&serializer.finish());
}

/// Stringify a JSON value the way a query string expects it
fn query_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(query_value).collect::<Vec<_>>().join(","),
        Value::Number(number) => number_value(number),
        other => other.to_string(),
    }
}

/// Whole-valued floats print without a fraction, `1.0` as `1`
fn number_value(number: &Number) -> String {
    match number.as_f64() {
        Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e21 => {
            if float == 0.0 {
                "0".to_string()
            } else {
                format!("{float:.0}")
            }
        }
        _ => number.to_string(),
    }
}
