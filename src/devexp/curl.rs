//! Curl command rendering
//!
//! Renders a [`RequestDescriptor`] as a single, paste-ready curl invocation
//! for POSIX shells, Windows `cmd` and PowerShell. The layout is shared by
//! all dialects; only the leaf escaping, the line continuation and the
//! executable name differ.
//!
//! ```
//! use curlsmith::devexp::{render_command, ShellDialect};
//! use curlsmith::request::RequestDescriptor;
//!
//! let request = RequestDescriptor::new("GET", "https://example.com")
//!     .with_header("accept", "application/json");
//! assert_eq!(
//!     render_command(&request, ShellDialect::Bash),
//!     "curl -X 'GET' \\\n  'https://example.com' \\\n  -H 'accept: application/json'"
//! );
//! ```

use std::fmt;
use std::str::FromStr;

use console::Style;
use serde_json::Value;

use crate::errors::CurlsmithError;
use crate::request::{FileRef, FormValue, RequestBody, RequestDescriptor};

/// Suffix appended upstream to keep duplicate form field names distinct
pub const DUPLICATE_KEY_MARKER: &str = "_**[]";

/// The body flag; each dialect decides how it is continued
const DATA_FLAG: &str = "-d ";

/// Methods whose multipart bodies are rendered as `-F` fields
const FORM_METHODS: &[&str] = &["POST", "PUT", "PATCH"];

/// Target shell grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum ShellDialect {
    /// POSIX shells (bash, zsh, sh)
    #[default]
    Bash,
    /// Windows `cmd.exe`
    Cmd,
    /// PowerShell, targeting `curl.exe` rather than the `curl` alias
    #[value(name = "powershell", alias = "pwsh")]
    PowerShell,
}

/// Per-dialect leaf behavior
struct DialectSpec {
    name: &'static str,
    escape: fn(&str) -> String,
    continuation: &'static str,
    executable_suffix: &'static str,
}

const BASH: DialectSpec = DialectSpec {
    name: "bash",
    escape: escape_bash,
    continuation: "\\\n",
    executable_suffix: "",
};

const CMD: DialectSpec = DialectSpec {
    name: "cmd",
    escape: escape_cmd,
    continuation: "^\n",
    executable_suffix: "",
};

const POWERSHELL: DialectSpec = DialectSpec {
    name: "powershell",
    escape: escape_powershell,
    continuation: "`\n",
    executable_suffix: ".exe",
};

impl ShellDialect {
    pub const ALL: [ShellDialect; 3] = [ShellDialect::Bash, ShellDialect::Cmd, ShellDialect::PowerShell];

    fn spec(self) -> &'static DialectSpec {
        match self {
            ShellDialect::Bash => &BASH,
            ShellDialect::Cmd => &CMD,
            ShellDialect::PowerShell => &POWERSHELL,
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Escape a single word for this shell
    pub fn escape(self, word: &str) -> String {
        (self.spec().escape)(word)
    }

    pub fn continuation(self) -> &'static str {
        self.spec().continuation
    }

    pub fn executable_suffix(self) -> &'static str {
        self.spec().executable_suffix
    }
}

impl fmt::Display for ShellDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShellDialect {
    type Err = CurlsmithError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bash" | "sh" | "posix" => Ok(ShellDialect::Bash),
            "cmd" => Ok(ShellDialect::Cmd),
            "powershell" | "pwsh" => Ok(ShellDialect::PowerShell),
            _ => Err(CurlsmithError::UnknownDialect(s.to_string())),
        }
    }
}

/// Render `request` as a curl command for `dialect`
pub fn render_command(request: &RequestDescriptor, dialect: ShellDialect) -> String {
    let mut writer = CommandWriter::new(dialect);
    writer.render(request);
    writer.out
}

pub fn curl_bash(request: &RequestDescriptor) -> String {
    render_command(request, ShellDialect::Bash)
}

pub fn curl_cmd(request: &RequestDescriptor) -> String {
    render_command(request, ShellDialect::Cmd)
}

pub fn curl_powershell(request: &RequestDescriptor) -> String {
    render_command(request, ShellDialect::PowerShell)
}

struct CommandWriter {
    dialect: ShellDialect,
    out: String,
}

impl CommandWriter {
    fn new(dialect: ShellDialect) -> Self {
        Self { dialect, out: String::new() }
    }

    /// Escaped words, each preceded by a space
    fn words<S: AsRef<str>>(&mut self, words: &[S]) {
        for word in words {
            self.out.push(' ');
            self.out.push_str(&self.dialect.escape(word.as_ref()));
        }
    }

    /// Escaped words joined by spaces, no leading space
    fn words_tight<S: AsRef<str>>(&mut self, words: &[S]) {
        let escaped: Vec<String> = words.iter().map(|w| self.dialect.escape(w.as_ref())).collect();
        self.out.push_str(&escaped.join(" "));
    }

    /// Line continuation followed by a two-space indent
    fn next_line(&mut self) {
        self.out.push(' ');
        self.out.push_str(self.dialect.continuation());
        self.out.push_str("  ");
    }

    fn render(&mut self, request: &RequestDescriptor) {
        self.out.push_str("curl");
        self.out.push_str(self.dialect.executable_suffix());

        if !request.curl_options.is_empty() {
            self.words(&request.curl_options);
        }
        self.words(&["-X", request.method.as_str()]);

        self.next_line();
        self.words_tight(&[request.url.as_str()]);

        for (name, value) in &request.headers {
            self.next_line();
            self.words_tight(&["-H".to_string(), format!("{name}: {value}")]);
        }

        match request.body.as_ref().filter(|body| !body.is_empty()) {
            Some(body) => self.body_clause(request, body),
            None if request.method.eq_ignore_ascii_case("POST") => {
                self.next_line();
                self.words_tight(&["-d ''"]);
            }
            None => {}
        }
    }

    fn body_clause(&mut self, request: &RequestDescriptor, body: &RequestBody) {
        let multipart = request.is_multipart()
            && FORM_METHODS.iter().any(|m| request.method.eq_ignore_ascii_case(m));

        if let Some(fields) = multipart.then(|| form_fields(body)).flatten() {
            for field in fields {
                self.next_line();
                self.words_tight(&["-F"]);
                self.words(&[field]);
            }
            return;
        }

        self.next_line();
        if let RequestBody::File(file) = body {
            self.words_tight(&[format!("--data-binary '@{}'", file.name)]);
        } else {
            self.words_tight(&[DATA_FLAG]);
            self.words_tight(&[payload(body)]);
        }
    }
}

/// Strip the duplicate-name marker and anything after it
fn extract_key(key: &str) -> &str {
    match key.find(DUPLICATE_KEY_MARKER) {
        Some(idx) => key[..idx].trim(),
        None => key,
    }
}

/// `key=value` words for `-F`, or `None` when the body is not a field map
fn form_fields(body: &RequestBody) -> Option<Vec<String>> {
    match body {
        RequestBody::Form(fields) => Some(
            fields
                .iter()
                .map(|(key, value)| {
                    let key = extract_key(key);
                    match value {
                        FormValue::File(file) => match &file.mime {
                            Some(mime) => format!("{key}=@{};type={mime}", file.name),
                            None => format!("{key}=@{}", file.name),
                        },
                        FormValue::Value(value) => format!("{key}={}", field_text(value)),
                    }
                })
                .collect(),
        ),
        RequestBody::Json(Value::Object(fields)) => Some(
            fields
                .iter()
                .map(|(key, value)| format!("{}={}", extract_key(key), field_text(value)))
                .collect(),
        ),
        _ => None,
    }
}

/// Plain-text form of a field value: strings unquoted, arrays comma-joined
fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => field_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Text following `-d `
fn payload(body: &RequestBody) -> String {
    match body {
        RequestBody::Json(Value::Object(fields)) => {
            object_payload(fields.iter().map(|(k, v)| (k.as_str(), PayloadEntry::Value(v))))
        }
        RequestBody::Form(fields) => object_payload(fields.iter().map(|(k, v)| {
            let entry = match v {
                FormValue::File(file) => PayloadEntry::File(file),
                FormValue::Value(value) => PayloadEntry::Value(value),
            };
            (k.as_str(), entry)
        })),
        RequestBody::Json(Value::String(text)) | RequestBody::Text(text) => text.clone(),
        RequestBody::Json(other) => serde_json::to_string(other).unwrap_or_default(),
        RequestBody::File(file) => format!("@{}", file.name),
    }
}

enum PayloadEntry<'a> {
    Value(&'a Value),
    File(&'a FileRef),
}

/// Two-space pretty-printed object, files shown as `{"name", "type"}` placeholders
fn object_payload<'a>(entries: impl Iterator<Item = (&'a str, PayloadEntry<'a>)>) -> String {
    let lines: Vec<String> = entries
        .map(|(key, entry)| {
            let rendered = match entry {
                PayloadEntry::Value(value) => serde_json::to_string_pretty(value)
                    .unwrap_or_default()
                    .replace('\n', "\n  "),
                PayloadEntry::File(file) => file_placeholder(file),
            };
            format!("  {}: {rendered}", json_string(key))
        })
        .collect();
    format!("{{\n{}\n}}", lines.join(",\n"))
}

fn file_placeholder(file: &FileRef) -> String {
    match &file.mime {
        Some(mime) => format!(
            "{{\n    \"name\": {},\n    \"type\": {}\n  }}",
            json_string(&file.name),
            json_string(mime)
        ),
        None => format!("{{\n    \"name\": {}\n  }}", json_string(&file.name)),
    }
}

fn json_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

fn looks_like_flag(s: &str) -> bool {
    s.starts_with(['_', '/', '-'])
}

fn escape_bash(s: &str) -> String {
    if s == DATA_FLAG || looks_like_flag(s) {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', "'\\''"))
}

fn escape_cmd(s: &str) -> String {
    let escaped = s
        .replace('^', "^^")
        .replace("\\\"", "\\\\\"")
        .replace('"', "\"\"")
        .replace('\n', "^\n");
    if escaped == DATA_FLAG {
        return "-d ^\n".to_string();
    }
    if looks_like_flag(&escaped) {
        escaped
    } else {
        format!("\"{escaped}\"")
    }
}

fn escape_powershell(s: &str) -> String {
    if s == DATA_FLAG {
        return s.to_string();
    }
    if s.contains('\n') {
        let body = s.replace('"', "\\\"").replace('`', "``").replacen('$', "`$", 1);
        return format!("@\"\n{body}\n\"@");
    }
    if looks_like_flag(s) {
        return s.to_string();
    }
    format!("'{}'", s.replace('"', "\"\"").replace('\'', "''"))
}

/// Colorize a rendered command for terminal display
///
/// The executable is bold yellow, flags cyan and single-quoted words green.
/// Colors follow `console`'s global switch, so the output is plain text when
/// colors are disabled.
pub fn format_curl_pretty(cmd: &str) -> String {
    let exe_style = Style::new().yellow().bold();
    let flag_style = Style::new().cyan();
    let string_style = Style::new().green();

    let (executable, rest) = match cmd.find(' ') {
        Some(idx) if cmd.starts_with("curl") => cmd.split_at(idx),
        _ => ("", cmd),
    };

    let mut result = exe_style.apply_to(executable).to_string();
    let mut literal = String::new();
    let mut in_string = false;
    let mut word_start = true;
    let mut chars = rest.chars().peekable();

    while let Some(c) = chars.next() {
        if in_string {
            literal.push(c);
            if c == '\'' {
                in_string = false;
                result.push_str(&string_style.apply_to(&literal).to_string());
                literal.clear();
            }
            continue;
        }

        if c == '\'' {
            in_string = true;
            literal.push(c);
        } else if c == '-' && word_start {
            let mut flag = String::from(c);
            while let Some(&next) = chars.peek() {
                if !(next.is_alphanumeric() || next == '-') {
                    break;
                }
                flag.push(next);
                chars.next();
            }
            result.push_str(&flag_style.apply_to(flag).to_string());
        } else {
            result.push(c);
        }
        word_start = c.is_whitespace();
    }

    // unterminated quote
    result.push_str(&literal);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    fn get_example() -> RequestDescriptor {
        RequestDescriptor::new("GET", "https://example.com").with_header("accept", "application/json")
    }

    fn post_json() -> RequestDescriptor {
        RequestDescriptor::new("POST", "https://example.com")
            .with_header("accept", "application/json")
            .with_header("content-type", "application/json")
            .with_body(RequestBody::Json(json!({"name": "John Doe", "age": 30})))
    }

    #[test]
    fn test_bash_get() {
        assert_eq!(
            curl_bash(&get_example()),
            "curl -X 'GET' \\\n  'https://example.com' \\\n  -H 'accept: application/json'"
        );
    }

    #[test]
    fn test_bash_post_json_body() {
        let body = serde_json::to_string_pretty(&json!({"name": "John Doe", "age": 30})).unwrap();
        assert_eq!(
            curl_bash(&post_json()),
            format!(
                "curl -X 'POST' \\\n  'https://example.com' \\\n  -H 'accept: application/json' \\\n  -H 'content-type: application/json' \\\n  -d '{body}'"
            )
        );
    }

    #[test]
    fn test_bash_string_body_passes_through() {
        let raw = r#"{"name":"John Doe","age":30}"#;
        let request = RequestDescriptor::new("POST", "https://example.com")
            .with_header("content-type", "application/json")
            .with_body(RequestBody::Text(raw.to_string()));
        assert!(curl_bash(&request).ends_with(&format!("-d '{raw}'")));
    }

    #[test]
    fn test_bash_multipart_fields() {
        let request = RequestDescriptor::new("POST", "https://example.com")
            .with_header("accept", "application/json")
            .with_header("content-type", "multipart/form-data")
            .with_body(RequestBody::Json(json!({"name": "John Doe", "age": 30})));
        assert_eq!(
            curl_bash(&request),
            "curl -X 'POST' \\\n  'https://example.com' \\\n  -H 'accept: application/json' \\\n  -H 'content-type: multipart/form-data' \\\n  -F 'name=John Doe' \\\n  -F 'age=30'"
        );
    }

    #[test]
    fn test_multipart_files_and_duplicate_keys() {
        let mut fields = IndexMap::new();
        fields.insert("file".to_string(), FormValue::File(FileRef::new("cat.png").with_mime("image/png")));
        fields.insert("tag".to_string(), FormValue::Value(json!("a")));
        fields.insert(format!("tag{DUPLICATE_KEY_MARKER}1"), FormValue::Value(json!("b")));
        fields.insert("raw".to_string(), FormValue::File(FileRef::new("blob.bin")));
        let request = RequestDescriptor::new("PUT", "/upload")
            .with_header("Content-Type", "multipart/form-data")
            .with_body(RequestBody::Form(fields));

        let rendered = curl_bash(&request);
        assert!(rendered.contains("-F 'file=@cat.png;type=image/png'"));
        assert!(rendered.contains("-F 'tag=a' \\\n  -F 'tag=b'"));
        assert!(rendered.ends_with("-F 'raw=@blob.bin'"));
    }

    #[test]
    fn test_multipart_ignored_for_get() {
        let request = RequestDescriptor::new("GET", "/x")
            .with_header("content-type", "multipart/form-data")
            .with_body(RequestBody::Json(json!({"a": 1})));
        let rendered = curl_bash(&request);
        assert!(!rendered.contains("-F"));
        assert!(rendered.ends_with("-d '{\n  \"a\": 1\n}'"));
    }

    #[test]
    fn test_form_body_without_multipart_shows_file_placeholders() {
        let mut fields = IndexMap::new();
        fields.insert("doc".to_string(), FormValue::File(FileRef::new("a.pdf").with_mime("application/pdf")));
        fields.insert("n".to_string(), FormValue::Value(json!([1, 2])));
        let request = RequestDescriptor::new("POST", "/x").with_body(RequestBody::Form(fields));
        assert!(curl_bash(&request).ends_with(
            "-d '{\n  \"doc\": {\n    \"name\": \"a.pdf\",\n    \"type\": \"application/pdf\"\n  },\n  \"n\": [\n    1,\n    2\n  ]\n}'"
        ));
    }

    #[test]
    fn test_file_body_is_binary_upload() {
        let request = RequestDescriptor::new("POST", "/upload")
            .with_body(RequestBody::File(FileRef::new("dump.bin")));
        assert!(curl_bash(&request).ends_with("\\\n  --data-binary '@dump.bin'"));
    }

    #[test]
    fn test_post_without_body() {
        let request = RequestDescriptor::new("POST", "https://example.com")
            .with_header("content-type", "application/json");
        assert!(curl_bash(&request).ends_with("\\\n  -d ''"));

        let null_body = request.clone().with_body(RequestBody::Json(Value::Null));
        assert_eq!(curl_bash(&null_body), curl_bash(&request));
    }

    #[test]
    fn test_delete_without_body_has_no_clause() {
        let request = RequestDescriptor::new("DELETE", "https://example.com/1");
        assert_eq!(curl_bash(&request), "curl -X 'DELETE' \\\n  'https://example.com/1'");
    }

    #[test]
    fn test_non_object_json_is_compact() {
        let request = RequestDescriptor::new("POST", "/x").with_body(RequestBody::Json(json!([1, {"a": 2}])));
        assert!(curl_bash(&request).ends_with(r#"-d '[1,{"a":2}]'"#));
    }

    #[test]
    fn test_curl_options_lead() {
        let request = get_example().with_curl_options(["-s", "--compressed"]);
        assert!(curl_bash(&request).starts_with("curl -s --compressed -X 'GET' \\\n"));
    }

    #[test]
    fn test_bash_escape_rules() {
        assert_eq!(escape_bash("it's"), "'it'\\''s'");
        assert_eq!(escape_bash("-H"), "-H");
        assert_eq!(escape_bash("/path"), "/path");
        assert_eq!(escape_bash("_x"), "_x");
        assert_eq!(escape_bash("$HOME"), "'$HOME'");
        assert_eq!(escape_bash(""), "''");
        assert_eq!(escape_bash("-d "), "-d ");
    }

    #[test]
    fn test_cmd_escape_rules() {
        assert_eq!(escape_cmd("a^b"), "\"a^^b\"");
        assert_eq!(escape_cmd("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_cmd("x\\\"y"), "\"x\\\\\"\"y\"");
        assert_eq!(escape_cmd("a\nb"), "\"a^\nb\"");
        assert_eq!(escape_cmd("-d "), "-d ^\n");
        assert_eq!(escape_cmd("-X"), "-X");
    }

    #[test]
    fn test_powershell_escape_rules() {
        assert_eq!(escape_powershell("it's \"x\""), "'it''s \"\"x\"\"'");
        assert_eq!(escape_powershell("-d "), "-d ");
        assert_eq!(escape_powershell("-H"), "-H");
        assert_eq!(
            escape_powershell("{\n  \"cost\": \"$5 `or` $6\"\n}"),
            "@\"\n{\n  \\\"cost\\\": \\\"`$5 ``or`` $6\\\"\n}\n\"@"
        );
    }

    #[test]
    fn test_cmd_get_and_post() {
        assert_eq!(
            curl_cmd(&get_example()),
            "curl -X \"GET\" ^\n  \"https://example.com\" ^\n  -H \"accept: application/json\""
        );
        assert!(curl_cmd(&post_json()).ends_with(
            " ^\n  -d ^\n\"{^\n  \"\"name\"\": \"\"John Doe\"\",^\n  \"\"age\"\": 30^\n}\""
        ));
    }

    #[test]
    fn test_powershell_get_and_post() {
        assert_eq!(
            curl_powershell(&get_example()),
            "curl.exe -X 'GET' `\n  'https://example.com' `\n  -H 'accept: application/json'"
        );
        assert!(curl_powershell(&post_json()).ends_with(
            " `\n  -d @\"\n{\n  \\\"name\\\": \\\"John Doe\\\",\n  \\\"age\\\": 30\n}\n\"@"
        ));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        for dialect in ShellDialect::ALL {
            assert_eq!(render_command(&post_json(), dialect), render_command(&post_json(), dialect));
        }
    }

    #[test]
    fn test_bash_payload_round_trips() {
        let body = json!({"quote": "it's", "nested": {"list": [1, "two", null]}, "n": 1.5});
        let request = RequestDescriptor::new("POST", "/x").with_body(RequestBody::Json(body.clone()));
        let rendered = curl_bash(&request);
        let quoted = &rendered[rendered.find("-d '").unwrap() + 3..];
        let inner = &quoted[1..quoted.len() - 1];
        let parsed: Value = serde_json::from_str(&inner.replace("'\\''", "'")).unwrap();
        assert_eq!(parsed, body);
    }

    #[test]
    fn test_payload_keeps_duplicate_marker_keys() {
        let body = json!({"tag": "a", (format!("tag{DUPLICATE_KEY_MARKER}1")): "b"});
        let request = RequestDescriptor::new("POST", "/x").with_body(RequestBody::Json(body.clone()));
        let rendered = curl_bash(&request);
        let quoted = &rendered[rendered.find("-d '").unwrap() + 3..];
        let inner = &quoted[1..quoted.len() - 1];
        let parsed: Value = serde_json::from_str(&inner.replace("'\\''", "'")).unwrap();
        assert_eq!(parsed, body);
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("bash".parse::<ShellDialect>().unwrap(), ShellDialect::Bash);
        assert_eq!("CMD".parse::<ShellDialect>().unwrap(), ShellDialect::Cmd);
        assert_eq!("pwsh".parse::<ShellDialect>().unwrap(), ShellDialect::PowerShell);
        assert!(matches!("fish".parse::<ShellDialect>(), Err(CurlsmithError::UnknownDialect(_))));
    }

    #[test]
    fn test_pretty_format_keeps_text() {
        let rendered = curl_bash(&post_json());
        assert_eq!(console::strip_ansi_codes(&format_curl_pretty(&rendered)), rendered);
    }
}
