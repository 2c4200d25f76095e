//! Loading OpenAPI 3.x and Swagger 2.0 documents from disk or text

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::errors::{CurlsmithError, Result};

/// Maximum document file size (16 MB)
const MAX_DOCUMENT_SIZE: u64 = 16 * 1024 * 1024;

/// Document dialect, detected from the root version key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentVersion {
    Swagger2,
    OpenApi3,
}

impl DocumentVersion {
    pub fn detect(document: &Value) -> Option<Self> {
        if document.get("openapi").is_some() {
            Some(DocumentVersion::OpenApi3)
        } else if document.get("swagger").is_some() {
            Some(DocumentVersion::Swagger2)
        } else {
            None
        }
    }
}

/// Read a JSON or YAML document from a file
pub fn load_document(path: &Path) -> Result<Value> {
    let metadata = fs::metadata(path)?;
    if metadata.len() > MAX_DOCUMENT_SIZE {
        return Err(CurlsmithError::Spec(format!(
            "document too large: {} bytes (max {} bytes)",
            metadata.len(),
            MAX_DOCUMENT_SIZE
        )));
    }

    let content = fs::read_to_string(path)?;
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_lowercase);

    let value: Value = match extension.as_deref() {
        Some("yaml" | "yml") => serde_yaml::from_str(&content)?,
        Some("json") => serde_json::from_str(&content)?,
        _ => return parse_document(&content),
    };

    debug!(path = %path.display(), "loaded document");
    validate(value)
}

/// Parse document text, trying JSON first and then YAML
pub fn parse_document(text: &str) -> Result<Value> {
    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(_) => serde_yaml::from_str(text)
            .map_err(|e| CurlsmithError::Spec(format!("failed to parse document: {e}")))?,
    };
    validate(value)
}

fn validate(value: Value) -> Result<Value> {
    match DocumentVersion::detect(&value) {
        Some(_) => Ok(value),
        None => Err(CurlsmithError::Spec(
            "unknown document format: missing 'openapi' or 'swagger' field".to_string(),
        )),
    }
}

/// Base URL declared by the document, if any
///
/// OpenAPI 3 uses the first server with its variable defaults substituted;
/// Swagger 2 uses `scheme://host+basePath` when `host` is present.
pub fn declared_base_url(document: &Value) -> Option<String> {
    match DocumentVersion::detect(document)? {
        DocumentVersion::OpenApi3 => {
            let server = document.get("servers")?.as_array()?.first()?;
            let mut url = server.get("url")?.as_str()?.to_string();
            if let Some(variables) = server.get("variables").and_then(Value::as_object) {
                for (name, variable) in variables {
                    if let Some(default) = variable.get("default").and_then(Value::as_str) {
                        url = url.replace(&format!("{{{name}}}"), default);
                    }
                }
            }
            Some(url)
        }
        DocumentVersion::Swagger2 => {
            let host = document.get("host")?.as_str()?;
            let base_path = document.get("basePath").and_then(Value::as_str).unwrap_or("");
            let scheme = document
                .get("schemes")
                .and_then(Value::as_array)
                .and_then(|schemes| schemes.first())
                .and_then(Value::as_str)
                .unwrap_or("http");
            Some(format!("{scheme}://{host}{base_path}"))
        }
    }
}
