//! Folding `oneOf` / `anyOf` / `allOf` alternatives into a single node

use serde_json::{Map, Value};

use super::SampleConfig;

/// Keys copied from an alternative when the receiving node lacks them
const LIFTED_KEYS: &[&str] = &[
    "example",
    "default",
    "enum",
    "type",
    "maxProperties",
    "minProperties",
    "minItems",
    "maxItems",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "minLength",
    "maxLength",
];

const COMBINATORS: &[&str] = &["oneOf", "anyOf", "allOf"];

/// Merge a node's combinators into a copy of the node
///
/// Every `allOf` member is lifted, then the first `oneOf` (else `anyOf`)
/// alternative. Returns `None` when the node has nothing to merge.
pub(super) fn lift_alternatives(node: &Map<String, Value>, config: &SampleConfig) -> Option<Map<String, Value>> {
    let first = first_alternative(node, "oneOf").or_else(|| first_alternative(node, "anyOf"));
    let all_of = node
        .get("allOf")
        .and_then(Value::as_array)
        .filter(|members| !members.is_empty());

    if first.is_none() && all_of.is_none() {
        return None;
    }

    let mut merged = node.clone();
    for key in COMBINATORS {
        merged.remove(*key);
    }

    for member in all_of.into_iter().flatten().filter_map(Value::as_object) {
        let nested = lift_alternatives(member, config);
        lift(nested.as_ref().unwrap_or(member), &mut merged, config);
    }
    if let Some(alternative) = first {
        lift(alternative, &mut merged, config);
    }

    Some(merged)
}

/// Split an `items` node into itself and its `oneOf`/`anyOf` alternatives
pub(super) fn item_alternatives(items: &Map<String, Value>) -> Option<(&Map<String, Value>, &Vec<Value>)> {
    ["anyOf", "oneOf"]
        .iter()
        .find_map(|key| items.get(*key).and_then(Value::as_array))
        .map(|alternatives| (items, alternatives))
}

/// Lift the parent `items` node into one of its alternatives
pub(super) fn lift_into(items: &Map<String, Value>, alternative: &Value, config: &SampleConfig) -> Map<String, Value> {
    let mut target = alternative.as_object().cloned().unwrap_or_default();
    let mut source = items.clone();
    for key in COMBINATORS {
        source.remove(*key);
    }
    lift(&source, &mut target, config);
    target
}

fn first_alternative<'a>(node: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    node.get(key)
        .and_then(Value::as_array)
        .and_then(|alternatives| alternatives.first())
        .and_then(Value::as_object)
}

/// Copy sampling-relevant keys, required names, properties and items from
/// `source` into `target` without overwriting what `target` defines
fn lift(source: &Map<String, Value>, target: &mut Map<String, Value>, config: &SampleConfig) {
    for key in LIFTED_KEYS {
        if !target.contains_key(*key) {
            if let Some(value) = source.get(*key) {
                target.insert((*key).to_string(), value.clone());
            }
        }
    }

    let source_required = source.get("required").and_then(Value::as_array);
    let mut required: Vec<Value> = target
        .get("required")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    for name in source_required.into_iter().flatten() {
        if !required.contains(name) {
            required.push(name.clone());
        }
    }

    if let Some(source_properties) = source.get("properties").and_then(Value::as_object) {
        let mut properties = target
            .get("properties")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        for (name, property) in source_properties {
            if !lifts_property(property, config) || properties.contains_key(name) {
                continue;
            }
            properties.insert(name.clone(), property.clone());
            let listed = source_required.is_none_or(|r| r.iter().any(|n| n.as_str() == Some(name.as_str())));
            let name = Value::String(name.clone());
            if listed && !required.contains(&name) {
                required.push(name);
            }
        }
        target.insert("properties".to_string(), Value::Object(properties));
    }

    if !required.is_empty() {
        target.insert("required".to_string(), Value::Array(required));
    }

    if let Some(source_items) = source.get("items").and_then(Value::as_object) {
        let mut items = target
            .get("items")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        lift(source_items, &mut items, config);
        target.insert("items".to_string(), Value::Object(items));
    }
}

fn lifts_property(property: &Value, config: &SampleConfig) -> bool {
    let flag = |key: &str| property.get(key).and_then(Value::as_bool).unwrap_or(false);
    !(flag("deprecated")
        || (flag("readOnly") && !config.include_read_only)
        || (flag("writeOnly") && !config.include_write_only))
}
