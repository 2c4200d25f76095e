//! Post-processing argument logic
//!
//! Turns raw `--param` items and `--body` text into JSON values.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::errors::{CurlsmithError, Result};

/// Separator patterns for parameter items, longest first
const ITEM_SEPARATORS: &[&str] = &[":=", "="];

/// Parse `name=text` and `name:=json` items into a parameter map
///
/// Later items replace earlier ones with the same name.
pub fn parse_params(items: &[String]) -> Result<Map<String, Value>> {
    let mut params = Map::new();
    for item in items {
        let (name, value) = parse_param(item)?;
        params.insert(name, value);
    }
    Ok(params)
}

fn parse_param(item: &str) -> Result<(String, Value)> {
    let (position, separator) = ITEM_SEPARATORS
        .iter()
        .filter_map(|sep| item.find(sep).map(|pos| (pos, *sep)))
        .min_by_key(|(pos, _)| *pos)
        .ok_or_else(|| CurlsmithError::Argument(format!("Invalid parameter '{}': expected NAME=VALUE", item)))?;

    let name = &item[..position];
    if name.is_empty() {
        return Err(CurlsmithError::Argument(format!("Invalid parameter '{}': empty name", item)));
    }
    let raw = &item[position + separator.len()..];

    let value = if separator == ":=" {
        serde_json::from_str(raw)
            .map_err(|e| CurlsmithError::Argument(format!("Invalid JSON for parameter '{}': {}", name, e)))?
    } else {
        Value::String(raw.to_string())
    };
    Ok((name.to_string(), value))
}

/// Parse `--body` text; `@path` reads the JSON from a file
pub fn parse_body(text: &str) -> Result<Value> {
    let content = match text.strip_prefix('@') {
        Some(path) => fs::read_to_string(Path::new(path))?,
        None => text.to_string(),
    };
    serde_json::from_str(&content).map_err(|e| CurlsmithError::Argument(format!("Invalid JSON body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_and_json_params() {
        let items = vec!["id=42".to_string(), "tags:=[1,2]".to_string(), "q=a=b".to_string()];
        let params = parse_params(&items).unwrap();
        assert_eq!(params["id"], json!("42"));
        assert_eq!(params["tags"], json!([1, 2]));
        assert_eq!(params["q"], json!("a=b"));
    }

    #[test]
    fn test_invalid_params() {
        assert!(parse_params(&["novalue".to_string()]).is_err());
        assert!(parse_params(&["=x".to_string()]).is_err());
        assert!(parse_params(&["n:={".to_string()]).is_err());
    }

    #[test]
    fn test_body_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.json");
        fs::write(&path, r#"{"name": "rex"}"#).unwrap();
        assert_eq!(parse_body(&format!("@{}", path.display())).unwrap(), json!({"name": "rex"}));
        assert_eq!(parse_body("[1]").unwrap(), json!([1]));
        assert!(parse_body("{").is_err());
    }
}
