//! Normalized request description shared by the compiler and the renderer

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A fully specified HTTP request, independent of how it will be sent
///
/// Header order is significant: the renderer emits headers in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    /// Upper-case HTTP method
    pub method: String,
    /// Absolute or path-only URL, query string included
    pub url: String,
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,
    /// Extra curl flags placed right after the executable
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub curl_options: Vec<String>,
}

/// Request body variants (exactly one representation per request)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RequestBody {
    /// Structured JSON payload
    Json(JsonValue),
    /// Form fields, possibly carrying file placeholders
    Form(IndexMap<String, FormValue>),
    /// Raw binary upload
    File(FileRef),
    /// Pre-serialized payload sent verbatim
    Text(String),
}

/// A single form field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FormValue {
    Value(JsonValue),
    File(FileRef),
}

/// Named placeholder for binary content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
}

impl FileRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), mime: None }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

impl RequestDescriptor {
    /// Create a descriptor without headers or body; the method is upper-cased
    pub fn new(method: impl AsRef<str>, url: impl Into<String>) -> Self {
        Self {
            method: method.as_ref().to_uppercase(),
            url: url.into(),
            headers: IndexMap::new(),
            body: None,
            curl_options: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_curl_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.curl_options.extend(options.into_iter().map(Into::into));
        self
    }

    /// Whether a `Content-Type: multipart/form-data` header is present
    ///
    /// Name and value are compared case-insensitively; a value carrying
    /// parameters (`; boundary=…`) does not count.
    pub fn is_multipart(&self) -> bool {
        self.headers.iter().any(|(name, value)| {
            name.eq_ignore_ascii_case("content-type")
                && value.eq_ignore_ascii_case(mime::MULTIPART_FORM_DATA.essence_str())
        })
    }
}

impl RequestBody {
    /// Bodies that carry no payload render like an absent body
    pub fn is_empty(&self) -> bool {
        match self {
            RequestBody::Json(JsonValue::Null) => true,
            RequestBody::Text(text) => text.is_empty(),
            _ => false,
        }
    }
}
