//! Inlining of local `$ref` pointers

use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Upper bound on nodes emitted while inlining
///
/// Chains of shared references grow the output exponentially; once the
/// budget is spent the remaining references stay in place.
pub const MAX_RESOLVED_NODES: usize = 1_000_000;

/// Return a copy of `document` with every local `$ref` replaced by its target
///
/// Keys written next to a `$ref` override the target's keys. References that
/// form a cycle, point outside the document, or point nowhere are left as
/// `{"$ref": …}` nodes, as are all references met after
/// [`MAX_RESOLVED_NODES`] nodes have been emitted.
pub fn resolve_refs(document: &Value) -> Value {
    resolve_refs_with_budget(document, MAX_RESOLVED_NODES)
}

fn resolve_refs_with_budget(document: &Value, budget: usize) -> Value {
    let mut resolver = Resolver {
        root: document,
        active: Vec::new(),
        emitted: 0,
        budget,
        exhausted: false,
    };
    resolver.resolve(document)
}

struct Resolver<'a> {
    root: &'a Value,
    /// References currently being expanded, innermost last
    active: Vec<String>,
    emitted: usize,
    budget: usize,
    exhausted: bool,
}

impl Resolver<'_> {
    fn resolve(&mut self, node: &Value) -> Value {
        self.emitted += 1;
        match node {
            Value::Object(map) => match map.get("$ref").and_then(Value::as_str) {
                Some(reference) => self.resolve_reference(reference, map),
                None => Value::Object(map.iter().map(|(k, v)| (k.clone(), self.resolve(v))).collect()),
            },
            Value::Array(items) => Value::Array(items.iter().map(|item| self.resolve(item)).collect()),
            other => other.clone(),
        }
    }

    fn resolve_reference(&mut self, reference: &str, node: &Map<String, Value>) -> Value {
        let Some(pointer) = reference.strip_prefix('#') else {
            debug!(reference, "remote reference left unresolved");
            return Value::Object(node.clone());
        };
        if self.emitted > self.budget {
            if !self.exhausted {
                warn!(budget = self.budget, reference, "reference expansion budget spent, references left in place");
                self.exhausted = true;
            }
            return Value::Object(node.clone());
        }
        if self.active.iter().any(|active| active == reference) {
            debug!(reference, "reference cycle left unresolved");
            return Value::Object(node.clone());
        }
        let Some(target) = self.root.pointer(pointer) else {
            warn!(reference, "dangling reference");
            return Value::Object(node.clone());
        };

        self.active.push(reference.to_string());
        let mut resolved = self.resolve(target);
        if let Value::Object(fields) = &mut resolved {
            for (key, value) in node.iter().filter(|(key, _)| key.as_str() != "$ref") {
                let value = self.resolve(value);
                fields.insert(key.clone(), value);
            }
        }
        self.active.pop();
        resolved
    }
}
