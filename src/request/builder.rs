//! Operation-to-request compiler
//!
//! Turns an operation of a resolved document plus caller-supplied parameter
//! and body values into a [`RequestDescriptor`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use super::descriptor::{RequestBody, RequestDescriptor};
use super::encode::{encode_component, encode_form, query_pairs, value_text};
use crate::errors::{CurlsmithError, Result};
use crate::openapi::{declared_base_url, find_operation, MediaTypeEntry, Operation, ParameterLocation};

/// Media types the compiler can turn into a body
pub const REQUEST_MEDIA_TYPES: &[&str] = &[JSON, FORM_URLENCODED];

const JSON: &str = "application/json";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

static PATH_TEMPLATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("Invalid path template regex"));

/// Knobs not carried by the document itself
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Replaces the document's declared server
    pub base_url: Option<String>,
    /// Explicit request media type; must be declared and supported
    pub content_type: Option<String>,
}

/// Compile `operation_id` with default options
pub fn build_request(
    document: &Value,
    operation_id: &str,
    body: Option<&Value>,
    params: Option<&Map<String, Value>>,
) -> Result<RequestDescriptor> {
    build_request_with(document, operation_id, body, params, &BuildOptions::default())
}

pub fn build_request_with(
    document: &Value,
    operation_id: &str,
    body: Option<&Value>,
    params: Option<&Map<String, Value>>,
    options: &BuildOptions,
) -> Result<RequestDescriptor> {
    let operation = find_operation(document, operation_id)
        .ok_or_else(|| CurlsmithError::UnknownOperation(operation_id.to_string()))?;
    debug!(operation_id, method = %operation.method, path = %operation.path, "compiling request");

    let empty = Map::new();
    let params = params.unwrap_or(&empty);

    let path = expand_path(&operation, params)?;
    let base = options.base_url.clone().or_else(|| declared_base_url(document));
    let mut url = join_url(base.as_deref(), &path);

    let query: Vec<String> = operation
        .parameters_in(ParameterLocation::Query)
        .filter_map(|p| supplied(params, &p.name).map(|value| query_pairs(&p.name, value, p.explode)))
        .flatten()
        .collect();
    if !query.is_empty() {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&query.join("&"));
    }

    let mut request = RequestDescriptor::new(&operation.method, url);
    for param in operation.parameters_in(ParameterLocation::Header) {
        if let Some(value) = supplied(params, &param.name) {
            request.headers.insert(param.name.clone(), value_text(value));
        }
    }

    if let Some(entry) = select_media_type(&operation, options.content_type.as_deref())? {
        request.headers.insert("Content-Type".to_string(), entry.media_type.clone());
        if let Some(body) = body.filter(|b| !b.is_null()) {
            request.body = Some(encode_body(&entry.media_type, body));
        }
    }

    Ok(request)
}

fn supplied<'a>(params: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    params.get(name).filter(|v| !v.is_null())
}

/// Substitute `{name}` placeholders; a declared path parameter without a value is an error
fn expand_path(operation: &Operation, params: &Map<String, Value>) -> Result<String> {
    let mut path = String::with_capacity(operation.path.len());
    let mut last = 0;

    for caps in PATH_TEMPLATE_RE.captures_iter(&operation.path) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else { continue };
        path.push_str(&operation.path[last..whole.start()]);
        last = whole.end();

        match supplied(params, name.as_str()) {
            Some(value) => path.push_str(&encode_component(&value_text(value))),
            None if operation.parameters_in(ParameterLocation::Path).any(|p| p.name == name.as_str()) => {
                return Err(CurlsmithError::MissingPathParameter {
                    operation_id: operation.label(),
                    name: name.as_str().to_string(),
                });
            }
            None => path.push_str(whole.as_str()),
        }
    }

    path.push_str(&operation.path[last..]);
    Ok(path)
}

fn join_url(base: Option<&str>, path: &str) -> String {
    match base {
        Some(base) if path.starts_with('/') => format!("{}{path}", base.trim_end_matches('/')),
        Some(base) => format!("{}/{path}", base.trim_end_matches('/')),
        None => path.to_string(),
    }
}

fn essence_matches(media_type: &str, expected: &str) -> bool {
    media_type
        .parse::<mime::Mime>()
        .map(|m| m.essence_str().eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}

/// Whether the compiler can encode a body of `media_type`
pub fn supports_media_type(media_type: &str) -> bool {
    REQUEST_MEDIA_TYPES.iter().any(|t| essence_matches(media_type, t))
}

/// First supported media type in document order, or the explicitly requested one
fn select_media_type<'a>(operation: &'a Operation, requested: Option<&str>) -> Result<Option<&'a MediaTypeEntry>> {
    let Some(body) = &operation.request_body else {
        return Ok(None);
    };

    if let Some(requested) = requested {
        return body
            .content
            .iter()
            .find(|e| e.media_type.eq_ignore_ascii_case(requested) && supports_media_type(&e.media_type))
            .map(Some)
            .ok_or_else(|| {
                CurlsmithError::Argument(format!(
                    "operation '{}' does not accept a '{requested}' body",
                    operation.label()
                ))
            });
    }

    let chosen = body.content.iter().find(|e| supports_media_type(&e.media_type));
    if chosen.is_none() && !body.content.is_empty() {
        let declared: Vec<&str> = body.content.iter().map(|e| e.media_type.as_str()).collect();
        debug!(operation = %operation.label(), ?declared, "no supported request media type, body omitted");
    }
    Ok(chosen)
}

fn encode_body(media_type: &str, body: &Value) -> RequestBody {
    if essence_matches(media_type, JSON) {
        return RequestBody::Json(body.clone());
    }
    match body {
        Value::String(text) => RequestBody::Text(text.clone()),
        Value::Object(fields) => RequestBody::Text(encode_form(fields.iter().map(|(k, v)| (k.as_str(), v)))),
        other => RequestBody::Text(value_text(other)),
    }
}
