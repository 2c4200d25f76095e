//! Python client snippet for a catalog operation

use serde_json::{Map, Value};

const INDENT: &str = "  ";

/// Where the generated client connects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PythonTarget {
    Workspace { workspace: String, deployment: String },
    Url(String),
}

/// Render a call of the operation at `path` with `body` as keyword arguments
///
/// The client method is the first segment of the path.
pub fn python_snippet(path: &str, body: Option<&Value>, target: &PythonTarget) -> String {
    let method = path.strip_prefix('/').unwrap_or(path).split('/').next().unwrap_or_default();

    let client = match target {
        PythonTarget::Workspace { workspace, deployment } => format!(
            "client = Client({}, {}, token=\"$YOUR_TOKEN\")",
            quote(workspace),
            quote(deployment)
        ),
        PythonTarget::Url(url) => format!("client = Client({}, token=\"$YOUR_TOKEN\")", quote(url)),
    };

    let args = match body.and_then(Value::as_object).filter(|fields| !fields.is_empty()) {
        Some(fields) => format!("(\n{}\n)", named_args(fields)),
        None => "()".to_string(),
    };

    format!("from leptonai.client import Client\n\n{client}\nresult = client.{method}{args}\n\nprint(result)")
}

fn named_args(fields: &Map<String, Value>) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{INDENT}{key}={}", python_value(value, 1)))
        .collect::<Vec<_>>()
        .join(",\n")
}

fn python_value(value: &Value, depth: usize) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Array(items) => {
            let inner = INDENT.repeat(depth + 1);
            let entries: Vec<String> = items
                .iter()
                .map(|item| format!("{inner}{}", python_value(item, depth + 1)))
                .collect();
            format!("[\n{}\n{}]", entries.join(",\n"), INDENT.repeat(depth))
        }
        Value::Object(fields) if fields.is_empty() => "{}".to_string(),
        Value::Object(fields) => {
            let inner = INDENT.repeat(depth + 1);
            let entries: Vec<String> = fields
                .iter()
                .map(|(key, value)| format!("{inner}{}: {}", quote(key), python_value(value, depth + 1)))
                .collect();
            format!("{{\n{}\n{}}}", entries.join(",\n"), INDENT.repeat(depth))
        }
    }
}

/// Double-quoted literal; JSON string escapes are valid Python
fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}
