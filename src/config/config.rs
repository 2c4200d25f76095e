//! Config file handling

use std::path::{Path, PathBuf};

use crate::devexp::ShellDialect;
use crate::errors::{CurlsmithError, Result};
use crate::sample::SampleConfig;

/// Overrides the config directory; mostly useful for tests
pub const CONFIG_DIR_ENV: &str = "CURLSMITH_CONFIG_DIR";

const CONFIG_FILE: &str = "config.toml";

/// curlsmith configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub config_dir: PathBuf,
    /// Dialect used when `--dialect` is not given
    pub dialect: Option<ShellDialect>,
    /// Flags placed after `curl` in every rendered command
    pub curl_options: Vec<String>,
    /// Replaces the document's declared server
    pub base_url: Option<String>,
    pub samples: SampleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::empty(Self::default_config_dir())
    }
}

impl Config {
    fn empty(config_dir: PathBuf) -> Self {
        Self {
            config_dir,
            dialect: None,
            curl_options: Vec::new(),
            base_url: None,
            samples: SampleConfig::default(),
        }
    }

    /// Load configuration from the default config directory
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_config_dir())
    }

    /// Load `config.toml` from `config_dir`; a missing file yields defaults
    pub fn load_from(config_dir: PathBuf) -> Result<Self> {
        let config_file = config_dir.join(CONFIG_FILE);
        if !config_file.exists() {
            return Ok(Self::empty(config_dir));
        }

        let content = std::fs::read_to_string(&config_file)
            .map_err(|e| CurlsmithError::Config(format!("Failed to read config: {}", e)))?;
        Self::parse(&content, config_dir)
    }

    /// Parse TOML config text
    pub fn parse(content: &str, config_dir: PathBuf) -> Result<Self> {
        let toml_value: toml::Value = toml::from_str(content)
            .map_err(|e| CurlsmithError::Config(format!("Invalid config TOML: {}", e)))?;

        let defaults = toml_value.get("defaults");

        let dialect = defaults
            .and_then(|d| d.get("dialect"))
            .and_then(|v| v.as_str())
            .map(|name| {
                name.parse::<ShellDialect>()
                    .map_err(|_| CurlsmithError::Config(format!("Unknown dialect in config: {}", name)))
            })
            .transpose()?;

        let curl_options = defaults
            .and_then(|d| d.get("curl_options"))
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
            .unwrap_or_default();

        let base_url = defaults
            .and_then(|d| d.get("base_url"))
            .and_then(|v| v.as_str())
            .map(String::from);

        let samples = Self::parse_samples(toml_value.get("samples"));

        Ok(Self {
            config_dir,
            dialect,
            curl_options,
            base_url,
            samples,
        })
    }

    fn parse_samples(section: Option<&toml::Value>) -> SampleConfig {
        let flag = |name: &str| {
            section
                .and_then(|s| s.get(name))
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
        };
        SampleConfig {
            include_read_only: flag("include_read_only"),
            include_write_only: flag("include_write_only"),
        }
    }

    /// Get the default config directory
    pub fn default_config_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return PathBuf::from(dir);
        }
        dirs::config_dir()
            .map(|p| p.join("curlsmith"))
            .unwrap_or_else(|| PathBuf::from(".curlsmith"))
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}
