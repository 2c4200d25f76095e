//! Per-operation catalog: sample body, normalized schema and compiled request

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::operations::{list_operations, MediaTypeEntry, Operation, ParameterLocation};
use crate::request::{build_request_with, BuildOptions, FormValue, RequestBody, RequestDescriptor};
use crate::sample::{synthesize_with, SampleConfig};

const JSON: &str = "application/json";
const MULTIPART: &str = "multipart/form-data";

/// Media types offered by the catalog, most preferred first
pub const CATALOG_MEDIA_TYPES: &[&str] = &[JSON, MULTIPART];

const COMBINATORS: &[&str] = &["oneOf", "anyOf", "allOf"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiItem {
    pub operation_id: String,
    pub operation: Operation,
    /// `None` when the operation could not be compiled
    pub request: Option<RequestDescriptor>,
    /// Normalized copy of the chosen media type's schema
    pub schema: Option<Value>,
}

/// A synthesized body together with the media type it was sampled for
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBody<'a> {
    pub media_type: &'static str,
    pub entry: &'a MediaTypeEntry,
    pub value: Value,
}

/// Sample the preferred catalog media type of `operation`
///
/// The media type's `example` overrides the schema.
pub fn sample_body<'a>(operation: &'a Operation, config: &SampleConfig) -> Option<SampleBody<'a>> {
    CATALOG_MEDIA_TYPES.iter().find_map(|&media_type| {
        let entry = operation.media_type(media_type)?;
        let schema = entry.schema.as_ref().unwrap_or(&Value::Null);
        Some(SampleBody {
            media_type,
            entry,
            value: synthesize_with(schema, config, entry.example.as_ref()),
        })
    })
}

/// Sample values for path parameters, so templated operations still compile
pub fn sample_path_params(operation: &Operation, config: &SampleConfig) -> Map<String, Value> {
    operation
        .parameters_in(ParameterLocation::Path)
        .map(|param| {
            let schema = param.schema.as_ref().unwrap_or(&Value::Null);
            let value = synthesize_with(schema, config, param.example.as_ref());
            let value = if value.is_null() { Value::String(param.name.clone()) } else { value };
            (param.name.clone(), value)
        })
        .collect()
}

/// Catalog every operation that has an `operationId`
pub fn build_catalog(document: &Value, config: &SampleConfig) -> Vec<ApiItem> {
    list_operations(document)
        .into_iter()
        .filter_map(|operation| {
            let operation_id = operation.operation_id.clone()?;
            Some(catalog_item(document, operation_id, operation, config))
        })
        .collect()
}

fn catalog_item(document: &Value, operation_id: String, operation: Operation, config: &SampleConfig) -> ApiItem {
    let sample = sample_body(&operation, config);
    let schema = sample.as_ref().and_then(|s| s.entry.schema.clone()).map(|mut schema| {
        normalize_schema(&mut schema);
        schema
    });

    let params = sample_path_params(&operation, config);
    let options = BuildOptions {
        content_type: sample.as_ref().filter(|s| s.media_type == JSON).map(|s| s.media_type.to_string()),
        ..Default::default()
    };
    let json_body = sample.as_ref().filter(|s| s.media_type == JSON).map(|s| &s.value);

    let request = match build_request_with(document, &operation_id, json_body, Some(&params), &options) {
        Ok(request) => Some(match sample.as_ref().filter(|s| s.media_type == MULTIPART) {
            Some(multipart) => attach_form(request, &multipart.value),
            None => request,
        }),
        Err(e) => {
            warn!(operation_id = %operation_id, error = %e, "could not compile catalog request");
            None
        }
    };
    debug!(operation_id = %operation_id, compiled = request.is_some(), "catalog entry");

    ApiItem { operation_id, operation, request, schema }
}

/// Multipart is outside the compiler; attach the sample as form fields
///
/// A non-object sample yields an empty form.
pub(crate) fn attach_form(request: RequestDescriptor, sample: &Value) -> RequestDescriptor {
    let fields = match sample {
        Value::Object(fields) => fields
            .iter()
            .map(|(key, value)| (key.clone(), FormValue::Value(value.clone())))
            .collect(),
        _ => Default::default(),
    };
    request
        .with_header("Content-Type", MULTIPART)
        .with_body(RequestBody::Form(fields))
}

/// Tidy a schema for display
///
/// Drops a node's `type` when one of its alternatives repeats it, titles
/// untitled alternatives with their type, and infers `type` from a scalar
/// `default`.
pub fn normalize_schema(schema: &mut Value) {
    let Some(node) = schema.as_object_mut() else { return };

    if let Some(properties) = node.get_mut("properties").and_then(Value::as_object_mut) {
        properties.values_mut().for_each(normalize_schema);
    } else if let Some(items) = node.get_mut("items") {
        normalize_schema(items);
    }

    if let Some(key) = COMBINATORS.iter().find(|key| node.get(**key).is_some_and(Value::is_array)) {
        if let Some(alternatives) = node.get_mut(*key).and_then(Value::as_array_mut) {
            alternatives.iter_mut().for_each(normalize_schema);
        }
    }

    for key in COMBINATORS {
        let Some(alternatives) = node.get(*key).and_then(Value::as_array) else { continue };
        let repeated = node
            .get("type")
            .is_some_and(|ty| alternatives.iter().any(|alt| alt.get("type") == Some(ty)));
        if repeated {
            node.shift_remove("type");
        }
        if let Some(alternatives) = node.get_mut(*key).and_then(Value::as_array_mut) {
            for alternative in alternatives.iter_mut().filter_map(Value::as_object_mut) {
                if alternative.contains_key("title") {
                    continue;
                }
                if let Some(title) = alternative.get("type").map(type_title) {
                    alternative.insert("title".to_string(), Value::String(title));
                }
            }
        }
    }

    let has_combinator = COMBINATORS.iter().any(|key| node.contains_key(*key));
    if !node.contains_key("type") && !has_combinator {
        let inferred = match node.get("default") {
            Some(Value::String(_)) => Some("string"),
            Some(Value::Number(_)) => Some("number"),
            Some(Value::Bool(_)) => Some("boolean"),
            _ => None,
        };
        if let Some(ty) = inferred {
            node.insert("type".to_string(), Value::String(ty.to_string()));
        }
    }
}

fn type_title(ty: &Value) -> String {
    match ty {
        Value::String(s) => s.clone(),
        Value::Array(types) => types.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}
