//! Error types for curlsmith

use thiserror::Error;

/// Main error type for curlsmith
///
/// Sample synthesis never produces one of these: a malformed schema degrades
/// to a partial sample instead. Everything that would yield a broken request
/// (unknown operation, unfilled path template) is reported here.
#[derive(Error, Debug)]
pub enum CurlsmithError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid OpenAPI document: {0}")]
    Spec(String),

    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("Operation '{operation_id}' is missing a value for path parameter '{name}'")]
    MissingPathParameter {
        operation_id: String,
        name: String,
    },

    #[error("Unknown shell dialect '{0}' (expected bash, cmd or powershell)")]
    UnknownDialect(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    Argument(String),
}

pub type Result<T> = std::result::Result<T, CurlsmithError>;
