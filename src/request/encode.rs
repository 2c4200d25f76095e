//! URL and form encoding
//!
//! Percent-encoding matches `encodeURIComponent`: everything except ASCII
//! alphanumerics and `- _ . ! ~ * ' ( )` is escaped.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT).to_string()
}

/// Textual form of a parameter or form value
///
/// Strings are taken raw, arrays comma-joined and objects JSON-serialized.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
        other => other.to_string(),
    }
}

/// Encoded value; array members are encoded one by one and joined by a literal comma
fn encode_value(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| encode_component(&value_text(item)))
            .collect::<Vec<_>>()
            .join(","),
        other => encode_component(&value_text(other)),
    }
}

/// `k=v&…` body for `application/x-www-form-urlencoded`
pub fn encode_form<'a>(fields: impl IntoIterator<Item = (&'a str, &'a Value)>) -> String {
    fields
        .into_iter()
        .map(|(key, value)| format!("{}={}", encode_component(key), encode_value(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Query pairs for one parameter
///
/// Arrays are exploded into repeated keys unless `explode` is false, in
/// which case they are comma-joined.
pub fn query_pairs(name: &str, value: &Value, explode: bool) -> Vec<String> {
    let key = encode_component(name);
    match value {
        Value::Array(items) if explode => items
            .iter()
            .map(|item| format!("{key}={}", encode_component(&value_text(item))))
            .collect(),
        other => vec![format!("{key}={}", encode_value(other))],
    }
}
