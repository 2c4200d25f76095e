//! Leaf values for string, number and boolean schemas

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Number, Value};

use super::{clamp_bound, MAX_SAMPLE_LENGTH};

const SAMPLE_UUID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

/// Largest integer an f64 represents exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

pub(super) fn sample_primitive(node: &Map<String, Value>, ty: &str) -> Value {
    match ty {
        "string" => Value::String(fit_length(string_for_format(node), node)),
        "integer" | "number" => sample_number(node),
        "boolean" => Value::Bool(true),
        _ => Value::Null,
    }
}

fn string_for_format(node: &Map<String, Value>) -> String {
    match node.get("format").and_then(Value::as_str) {
        Some("email") => "user@example.com".to_string(),
        Some("date-time") => Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        Some("date") => Utc::now().format("%Y-%m-%d").to_string(),
        Some("uuid") => SAMPLE_UUID.to_string(),
        Some("hostname") => "example.com".to_string(),
        Some("ipv4") => "198.51.100.42".to_string(),
        Some("ipv6") => "2001:0db8:5b96:0000:0000:426f:8e17:642a".to_string(),
        _ => "string".to_string(),
    }
}

/// Truncate to `maxLength`, then cycle the text up to `minLength`
fn fit_length(value: String, node: &Map<String, Value>) -> String {
    let mut chars: Vec<char> = value.chars().collect();
    if let Some(max) = node.get("maxLength").and_then(Value::as_u64) {
        chars.truncate(max as usize);
    }
    if let Some(min) = node.get("minLength").and_then(Value::as_u64) {
        let min = clamp_bound(min, MAX_SAMPLE_LENGTH, "minLength");
        let seed_len = chars.len();
        let mut i = 0;
        while seed_len > 0 && chars.len() < min {
            chars.push(chars[i % seed_len]);
            i += 1;
        }
    }
    chars.into_iter().collect()
}

fn sample_number(node: &Map<String, Value>) -> Value {
    let mut value = 0.0;
    if let Some(min) = node.get("minimum").and_then(Value::as_f64) {
        value = if is_set(node.get("exclusiveMinimum")) { min + 1.0 } else { min };
    }
    if let Some(max) = node.get("maximum").and_then(Value::as_f64) {
        value = if is_set(node.get("exclusiveMaximum")) { max - 1.0 } else { max };
    }
    number_value(value)
}

/// `exclusiveMinimum`/`exclusiveMaximum` may be a flag (OpenAPI 3.0) or a bound (3.1)
fn is_set(flag: Option<&Value>) -> bool {
    match flag {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

/// Integral values are emitted as JSON integers so `1.0` prints as `1`
fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        Value::from(value as i64)
    } else {
        Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
    }
}
