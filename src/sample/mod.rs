//! Schema sample synthesis
//!
//! Turns a JSON Schema / OpenAPI schema object into a representative example
//! value. Synthesis is best-effort documentation tooling: malformed or
//! self-referential schemas degrade to `null` or partial structures instead
//! of failing.
//!
//! Precedence, checked before any type-driven recursion:
//!
//! 1. a caller-supplied override replaces the whole result
//! 2. an `example` on the node (including the `{example, schema}` envelope)
//! 3. a `default` on the node
//!
//! ```
//! use curlsmith::sample::synthesize;
//! use serde_json::json;
//!
//! let schema = json!({"type": "object", "properties": {"x": {"type": "integer"}}});
//! assert_eq!(synthesize(&schema, None), json!({"x": 0}));
//! ```

mod lift;
mod primitive;

use serde_json::{Map, Value};
use tracing::debug;

/// Nesting depth beyond which synthesis gives up and yields `null`
pub const MAX_SAMPLE_DEPTH: usize = 32;

/// Ceiling applied to `minItems` when padding arrays
pub const MAX_SAMPLE_ITEMS: usize = 1024;

/// Ceiling applied to `minLength` when padding strings
pub const MAX_SAMPLE_LENGTH: usize = 4096;

/// Options controlling which properties are materialized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleConfig {
    /// Include properties marked `readOnly`
    pub include_read_only: bool,
    /// Include properties marked `writeOnly`
    pub include_write_only: bool,
}

/// Synthesize a sample for `schema` with the default configuration
pub fn synthesize(schema: &Value, overrides: Option<&Value>) -> Value {
    synthesize_with(schema, &SampleConfig::default(), overrides)
}

/// Synthesize a sample for `schema`
///
/// When `overrides` is `Some`, it is returned unchanged and the schema is not
/// consulted at all.
pub fn synthesize_with(schema: &Value, config: &SampleConfig, overrides: Option<&Value>) -> Value {
    Sampler { config }.sample(schema, overrides, 0)
}

struct Sampler<'a> {
    config: &'a SampleConfig,
}

impl Sampler<'_> {
    fn sample(&self, schema: &Value, overrides: Option<&Value>, depth: usize) -> Value {
        if let Some(value) = overrides {
            return value.clone();
        }
        let Some(node) = schema.as_object() else {
            return Value::Null;
        };
        if let Some(plain) = plain_value(node) {
            return plain.clone();
        }

        if depth > MAX_SAMPLE_DEPTH {
            debug!(depth, "sample depth limit reached");
            return Value::Null;
        }

        let lifted;
        let node = match lift::lift_alternatives(node, self.config) {
            Some(merged) => {
                lifted = merged;
                if let Some(plain) = plain_value(&lifted) {
                    return plain.clone();
                }
                &lifted
            }
            None => node,
        };

        match schema_type(node) {
            Some("object") => self.sample_object(node, depth),
            Some("array") => self.sample_array(node, depth),
            ty => {
                if let Some(first) = node.get("enum").and_then(Value::as_array).and_then(|e| e.first()) {
                    return first.clone();
                }
                match ty {
                    Some(ty) => primitive::sample_primitive(node, ty),
                    None => Value::Null,
                }
            }
        }
    }

    fn sample_object(&self, node: &Map<String, Value>, depth: usize) -> Value {
        let required: Vec<&str> = node
            .get("required")
            .and_then(Value::as_array)
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let max_properties = node.get("maxProperties").and_then(Value::as_u64).map(|m| m as usize);
        let exceeded = |out: &Map<String, Value>| max_properties.is_some_and(|max| out.len() >= max);

        let mut out = Map::new();
        if let Some(properties) = node.get("properties").and_then(Value::as_object) {
            for (name, property) in properties {
                if !self.includes_property(property) {
                    continue;
                }
                if !can_add_property(name, &out, &required, max_properties) {
                    continue;
                }
                out.insert(name.clone(), self.sample(property, None, depth + 1));
            }
        }

        if exceeded(&out) {
            return Value::Object(out);
        }

        match node.get("additionalProperties") {
            Some(Value::Bool(true)) => {
                out.insert("additionalProp1".to_string(), Value::Object(Map::new()));
            }
            Some(extra) if extra.is_object() => {
                let extra_sample = self.sample(extra, None, depth + 1);
                let min_properties = node.get("minProperties").and_then(Value::as_u64).map(|m| m as usize);
                let count = match min_properties {
                    Some(min) if out.len() < min => {
                        clamp_bound((min - out.len()) as u64, MAX_SAMPLE_ITEMS, "minProperties")
                    }
                    _ => 3,
                };
                for i in 1..=count {
                    if exceeded(&out) {
                        break;
                    }
                    out.insert(format!("additionalProp{i}"), extra_sample.clone());
                }
            }
            _ => {}
        }

        Value::Object(out)
    }

    fn sample_array(&self, node: &Map<String, Value>, depth: usize) -> Value {
        let Some(items) = node.get("items") else {
            return Value::Null;
        };

        let mut samples = match items.as_object().and_then(lift::item_alternatives) {
            Some((items_node, alternatives)) => alternatives
                .iter()
                .map(|alternative| {
                    let merged = lift::lift_into(items_node, alternative, self.config);
                    self.sample(&Value::Object(merged), None, depth + 1)
                })
                .collect(),
            None => vec![self.sample(items, None, depth + 1)],
        };

        if let Some(max) = node.get("maxItems").and_then(Value::as_u64) {
            samples.truncate(max as usize);
        }
        if let Some(min) = node.get("minItems").and_then(Value::as_u64) {
            let min = clamp_bound(min, MAX_SAMPLE_ITEMS, "minItems");
            let seed_len = samples.len();
            let mut i = 0;
            while seed_len > 0 && samples.len() < min {
                samples.push(samples[i % seed_len].clone());
                i += 1;
            }
        }

        Value::Array(samples)
    }

    fn includes_property(&self, property: &Value) -> bool {
        let flag = |key: &str| property.get(key).and_then(Value::as_bool).unwrap_or(false);
        if flag("deprecated") {
            return false;
        }
        if flag("readOnly") && !self.config.include_read_only {
            return false;
        }
        if flag("writeOnly") && !self.config.include_write_only {
            return false;
        }
        true
    }
}

/// Cap a padding bound so huge schema limits cannot exhaust memory
pub(crate) fn clamp_bound(bound: u64, ceiling: usize, keyword: &str) -> usize {
    match usize::try_from(bound) {
        Ok(bound) if bound <= ceiling => bound,
        _ => {
            debug!(keyword, bound, ceiling, "sample bound clamped");
            ceiling
        }
    }
}

/// The node's own `example`, else its `default`
fn plain_value(node: &Map<String, Value>) -> Option<&Value> {
    node.get("example").or_else(|| node.get("default"))
}

/// Declared or recovered type of a schema node
///
/// A `type` array (OpenAPI 3.1) resolves to its first non-`null` member.
fn schema_type(node: &Map<String, Value>) -> Option<&str> {
    match node.get("type") {
        Some(Value::String(ty)) => return Some(ty.as_str()),
        Some(Value::Array(types)) => {
            return types.iter().filter_map(Value::as_str).find(|ty| *ty != "null");
        }
        _ => {}
    }

    let has_any = |keys: &[&str]| keys.iter().any(|k| node.contains_key(*k));
    if has_any(&["properties", "additionalProperties", "minProperties", "maxProperties"]) {
        Some("object")
    } else if has_any(&["items", "minItems", "maxItems"]) {
        Some("array")
    } else if has_any(&["minimum", "maximum", "exclusiveMinimum", "exclusiveMaximum"]) {
        Some("number")
    } else {
        None
    }
}

/// Whether `name` still fits under `maxProperties`, keeping room for
/// required properties that have not been emitted yet
fn can_add_property(
    name: &str,
    out: &Map<String, Value>,
    required: &[&str],
    max_properties: Option<usize>,
) -> bool {
    let Some(max) = max_properties else {
        return true;
    };
    if out.len() >= max {
        return false;
    }
    if required.contains(&name) {
        return true;
    }
    let pending_required = required.iter().filter(|key| !out.contains_key(**key)).count();
    max.saturating_sub(out.len()).saturating_sub(pending_required) > 0
}
