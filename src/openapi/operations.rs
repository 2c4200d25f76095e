//! Operation enumeration for OpenAPI 3.x and Swagger 2.0 documents
//!
//! Swagger 2.0 `body` and `formData` parameters are folded into a request
//! body so callers see one shape for both versions.

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::document::DocumentVersion;

/// Path item keys that name operations; `trace` is deliberately absent
pub const HTTP_METHODS: &[&str] = &["get", "put", "post", "delete", "options", "head", "patch"];

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const DEFAULT_CONSUMES: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub path: String,
    /// Lower-case method as written in the document
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<OperationBody>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    fn parse(location: &str) -> Option<Self> {
        match location {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "cookie" => Some(ParameterLocation::Cookie),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Whether array values repeat the key in the query string
    pub explode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationBody {
    pub required: bool,
    /// Media types in document order
    pub content: Vec<MediaTypeEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaTypeEntry {
    pub media_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl Operation {
    /// `operationId`, else `METHOD path`
    pub fn label(&self) -> String {
        match &self.operation_id {
            Some(id) => id.clone(),
            None => format!("{} {}", self.method.to_uppercase(), self.path),
        }
    }

    pub fn parameters_in(&self, location: ParameterLocation) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(move |p| p.location == location)
    }

    pub fn media_type(&self, media_type: &str) -> Option<&MediaTypeEntry> {
        self.request_body
            .as_ref()?
            .content
            .iter()
            .find(|entry| entry.media_type.eq_ignore_ascii_case(media_type))
    }
}

/// Every operation of every path, in document order
pub fn list_operations(document: &Value) -> Vec<Operation> {
    let version = DocumentVersion::detect(document).unwrap_or(DocumentVersion::OpenApi3);
    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut operations = Vec::new();
    for (path, item) in paths {
        let Some(item) = item.as_object() else { continue };
        let shared = item.get("parameters").and_then(Value::as_array);

        for (method, operation) in item {
            if !HTTP_METHODS.contains(&method.as_str()) {
                continue;
            }
            let Some(operation) = operation.as_object() else { continue };
            operations.push(parse_operation(document, version, path, method, operation, shared));
        }
    }
    operations
}

/// Look up a single operation by `operationId`
pub fn find_operation(document: &Value, operation_id: &str) -> Option<Operation> {
    list_operations(document)
        .into_iter()
        .find(|op| op.operation_id.as_deref() == Some(operation_id))
}

fn parse_operation(
    document: &Value,
    version: DocumentVersion,
    path: &str,
    method: &str,
    operation: &Map<String, Value>,
    shared: Option<&Vec<Value>>,
) -> Operation {
    let raw = merge_parameters(shared, operation.get("parameters").and_then(Value::as_array));

    let (parameters, request_body) = match version {
        DocumentVersion::OpenApi3 => (
            raw.iter().filter_map(|p| parse_parameter_v3(p)).collect(),
            operation.get("requestBody").and_then(parse_request_body_v3),
        ),
        DocumentVersion::Swagger2 => {
            let consumes = consumes(document, operation);
            (
                raw.iter().filter_map(|p| parse_parameter_v2(p)).collect(),
                request_body_v2(&raw, &consumes),
            )
        }
    };

    Operation {
        path: path.to_string(),
        method: method.to_string(),
        operation_id: operation.get("operationId").and_then(Value::as_str).map(str::to_string),
        summary: operation.get("summary").and_then(Value::as_str).map(str::to_string),
        parameters,
        request_body,
    }
}

/// Path-level parameters followed by operation-level ones; the latter win on `name` + `in`
fn merge_parameters<'a>(shared: Option<&'a Vec<Value>>, own: Option<&'a Vec<Value>>) -> Vec<&'a Value> {
    let own: Vec<&Value> = own.into_iter().flatten().collect();
    let key = |p: &Value| (p.get("name").cloned(), p.get("in").cloned());

    let mut merged: Vec<&Value> = shared
        .into_iter()
        .flatten()
        .filter(|p| !own.iter().any(|o| key(o) == key(p)))
        .collect();
    merged.extend(own);
    merged
}

fn parse_parameter_v3(param: &Value) -> Option<Parameter> {
    let location = ParameterLocation::parse(param.get("in")?.as_str()?)?;
    let schema = param.get("schema").cloned();
    let style_is_form = param.get("style").and_then(Value::as_str).is_none_or(|s| s == "form");

    Some(Parameter {
        name: param.get("name")?.as_str()?.to_string(),
        location,
        required: location == ParameterLocation::Path || flag(param, "required"),
        example: param
            .get("example")
            .or_else(|| schema.as_ref().and_then(|s| s.get("example")))
            .cloned(),
        schema,
        explode: param.get("explode").and_then(Value::as_bool).unwrap_or(style_is_form),
    })
}

fn parse_parameter_v2(param: &Value) -> Option<Parameter> {
    let location = ParameterLocation::parse(param.get("in")?.as_str()?)?;
    Some(Parameter {
        name: param.get("name")?.as_str()?.to_string(),
        location,
        required: location == ParameterLocation::Path || flag(param, "required"),
        schema: Some(inline_schema_v2(param)),
        example: param.get("x-example").or_else(|| param.get("example")).cloned(),
        explode: param.get("collectionFormat").and_then(Value::as_str) == Some("multi"),
    })
}

/// Swagger 2.0 non-body parameters carry their schema inline
fn inline_schema_v2(param: &Value) -> Value {
    let mut schema = param.as_object().cloned().unwrap_or_default();
    for key in ["name", "in", "required", "description", "collectionFormat", "allowEmptyValue"] {
        schema.remove(key);
    }
    Value::Object(schema)
}

fn parse_request_body_v3(body: &Value) -> Option<OperationBody> {
    let content = body.get("content")?.as_object()?;
    Some(OperationBody {
        required: flag(body, "required"),
        content: content
            .iter()
            .filter(|(_, media)| media.is_object())
            .map(|(media_type, media)| MediaTypeEntry {
                media_type: media_type.clone(),
                schema: media.get("schema").cloned(),
                example: media.get("example").cloned(),
            })
            .collect(),
    })
}

fn consumes(document: &Value, operation: &Map<String, Value>) -> Vec<String> {
    operation
        .get("consumes")
        .or_else(|| document.get("consumes"))
        .and_then(Value::as_array)
        .map(|types| types.iter().filter_map(Value::as_str).map(str::to_string).collect::<Vec<_>>())
        .filter(|types| !types.is_empty())
        .unwrap_or_else(|| vec![DEFAULT_CONSUMES.to_string()])
}

fn request_body_v2(params: &[&Value], consumes: &[String]) -> Option<OperationBody> {
    let location = |p: &Value| p.get("in").and_then(Value::as_str).map(str::to_string);

    if let Some(body) = params.iter().find(|p| location(p).as_deref() == Some("body")) {
        return Some(OperationBody {
            required: flag(body, "required"),
            content: consumes
                .iter()
                .map(|media_type| MediaTypeEntry {
                    media_type: media_type.clone(),
                    schema: body.get("schema").cloned(),
                    example: body.get("x-example").cloned(),
                })
                .collect(),
        });
    }

    let fields: Vec<&&Value> = params
        .iter()
        .filter(|p| location(p).as_deref() == Some("formData"))
        .collect();
    if fields.is_empty() {
        return None;
    }

    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in &fields {
        let Some(name) = field.get("name").and_then(Value::as_str) else { continue };
        properties.insert(name.to_string(), inline_schema_v2(field));
        if flag(field, "required") {
            required.push(Value::String(name.to_string()));
        }
    }

    let mut schema = json!({"type": "object", "properties": properties});
    if !required.is_empty() {
        schema["required"] = Value::Array(required);
    }

    Some(OperationBody {
        required: fields.iter().any(|f| flag(f, "required")),
        content: vec![MediaTypeEntry {
            media_type: FORM_URLENCODED.to_string(),
            schema: Some(schema),
            example: None,
        }],
    })
}

fn flag(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}
