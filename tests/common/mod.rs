//! Common test utilities for curlsmith integration tests
//!
//! This module provides shared test infrastructure including:
//! - CLI invocation helpers with an isolated config directory
//! - Output parsing helpers
//! - Test fixture management

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Exit status codes matching the Rust application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success = 0,
    Error = 1,
}

impl From<i32> for ExitStatus {
    fn from(code: i32) -> Self {
        match code {
            0 => ExitStatus::Success,
            _ => ExitStatus::Error,
        }
    }
}

/// Result of running the CLI
#[derive(Debug)]
pub struct CliResponse {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: ExitStatus,
    pub exit_code: i32,
}

impl CliResponse {
    /// Parse stdout as JSON
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(self.stdout.trim()).expect("stdout is not JSON")
    }

    /// Check if stdout contains a substring
    pub fn contains(&self, needle: &str) -> bool {
        self.stdout.contains(needle)
    }
}

/// Mock environment for testing
pub struct MockEnvironment {
    /// Temporary config directory
    pub config_dir: TempDir,
    /// Environment variables to set
    pub env_vars: HashMap<String, String>,
}

impl Default for MockEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEnvironment {
    pub fn new() -> Self {
        let config_dir = TempDir::new().expect("Failed to create temp config dir");
        Self {
            config_dir,
            env_vars: HashMap::new(),
        }
    }

    /// Write `config.toml` into the config directory
    pub fn with_config(self, toml: &str) -> Self {
        std::fs::write(self.config_dir.path().join("config.toml"), toml).expect("Failed to write config");
        self
    }

    pub fn set_env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env_vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.path().to_path_buf()
    }
}

/// Run the CLI with the given arguments (excluding the program name)
pub fn curlsmith(args: &[&str]) -> CliResponse {
    curlsmith_with_env(args, &MockEnvironment::new())
}

pub fn curlsmith_with_env(args: &[&str], env: &MockEnvironment) -> CliResponse {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_curlsmith"));
    cmd.args(args);
    cmd.env("CURLSMITH_CONFIG_DIR", env.config_path());
    cmd.env_remove("RUST_LOG");
    for (key, value) in &env.env_vars {
        cmd.env(key, value);
    }
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let output = cmd.output().expect("Failed to execute command");
    parse_output(output)
}

/// assert_cmd handle with an isolated config directory
pub fn cli(env: &MockEnvironment) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("curlsmith").expect("binary not built");
    cmd.env("CURLSMITH_CONFIG_DIR", env.config_path());
    cmd.env_remove("RUST_LOG");
    cmd
}

fn parse_output(output: Output) -> CliResponse {
    let exit_code = output.status.code().unwrap_or(1);
    CliResponse {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_status: ExitStatus::from(exit_code),
        exit_code,
    }
}

/// Strip ANSI color codes from a string
pub fn strip_colors(s: &str) -> String {
    let re = regex::Regex::new(r"\x1b\[[\d;]*m").unwrap();
    re.replace_all(s, "").to_string()
}

/// Test fixture paths
pub mod fixtures {
    use once_cell::sync::Lazy;
    use std::path::PathBuf;

    pub static FIXTURES_DIR: Lazy<PathBuf> =
        Lazy::new(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures"));

    /// Get path to a fixture file
    pub fn fixture_path(name: &str) -> PathBuf {
        FIXTURES_DIR.join(name)
    }

    /// Fixture path as a CLI argument
    pub fn fixture_arg(name: &str) -> String {
        fixture_path(name).to_string_lossy().to_string()
    }

    /// Load and `$ref`-resolve a fixture document
    pub fn document(name: &str) -> serde_json::Value {
        let document = curlsmith::openapi::load_document(&fixture_path(name)).expect("fixture loads");
        curlsmith::openapi::resolve_refs(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_colors() {
        let colored = "\x1b[32mGreen\x1b[0m";
        assert_eq!(strip_colors(colored), "Green");
    }

    #[test]
    fn test_exit_status_from_i32() {
        assert_eq!(ExitStatus::from(0), ExitStatus::Success);
        assert_eq!(ExitStatus::from(1), ExitStatus::Error);
    }
}
