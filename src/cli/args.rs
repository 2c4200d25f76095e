//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::devexp::ShellDialect;

/// curlsmith - turn OpenAPI operations into sample bodies and curl commands
#[derive(Parser, Debug, Clone)]
#[command(name = "curlsmith", version, about, long_about = None)]
pub struct Args {
    /// Verbose logging. Use -vv for even more verbose
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format for diagnostics on stderr: json (JSON Lines) or text (default)
    #[arg(long = "log-format", value_name = "FORMAT", value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the operations of a document
    List {
        /// OpenAPI 3.x or Swagger 2.0 document (JSON or YAML)
        #[arg(value_name = "SPEC")]
        spec: PathBuf,
    },

    /// Print a sample request body for an operation
    Sample {
        #[arg(value_name = "SPEC")]
        spec: PathBuf,

        #[arg(value_name = "OPERATION_ID")]
        operation_id: String,

        /// JSON value printed instead of the synthesized sample
        #[arg(long = "override", value_name = "JSON")]
        override_json: Option<String>,

        #[command(flatten)]
        samples: SampleArgs,
    },

    /// Print the compiled request as JSON
    Request {
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Render the compiled request as a curl command
    Curl {
        #[command(flatten)]
        request: RequestArgs,

        /// Target shell
        #[arg(short = 'd', long = "dialect", value_name = "DIALECT", value_enum)]
        dialect: Option<ShellDialect>,

        /// Extra curl flag placed after the executable (repeatable)
        #[arg(long = "curl-option", value_name = "OPTION", allow_hyphen_values = true)]
        curl_options: Vec<String>,

        /// Do not fall back to a synthesized body when --body is absent
        #[arg(long = "no-sample", action = ArgAction::SetTrue)]
        no_sample: bool,

        /// Colorize the command even when stdout is not a terminal
        #[arg(long = "color", action = ArgAction::SetTrue)]
        color: bool,
    },

    /// Print a Python client call for an operation
    Python {
        #[arg(value_name = "SPEC")]
        spec: PathBuf,

        #[arg(value_name = "OPERATION_ID")]
        operation_id: String,

        /// Connect the client to a URL
        #[arg(long = "url", value_name = "URL", conflicts_with_all = ["workspace", "deployment"], required_unless_present = "workspace")]
        url: Option<String>,

        /// Connect the client to a workspace deployment
        #[arg(long = "workspace", value_name = "WORKSPACE", requires = "deployment")]
        workspace: Option<String>,

        #[arg(long = "deployment", value_name = "DEPLOYMENT", requires = "workspace")]
        deployment: Option<String>,

        #[command(flatten)]
        samples: SampleArgs,
    },
}

/// Inputs shared by every command that compiles a request
#[derive(clap::Args, Debug, Clone)]
pub struct RequestArgs {
    #[arg(value_name = "SPEC")]
    pub spec: PathBuf,

    #[arg(value_name = "OPERATION_ID")]
    pub operation_id: String,

    /// Request body as JSON, or @FILE to read it from a file
    #[arg(short = 'b', long = "body", value_name = "JSON")]
    pub body: Option<String>,

    /// Parameter value: name=text or name:=json (repeatable)
    #[arg(short = 'p', long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// Base URL replacing the document's servers
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Request media type to use when the operation declares several
    #[arg(long = "content-type", value_name = "MIME")]
    pub content_type: Option<String>,

    #[command(flatten)]
    pub samples: SampleArgs,
}

#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct SampleArgs {
    /// Include readOnly properties in synthesized samples
    #[arg(long = "include-read-only", action = ArgAction::SetTrue)]
    pub include_read_only: bool,

    /// Include writeOnly properties in synthesized samples
    #[arg(long = "include-write-only", action = ArgAction::SetTrue)]
    pub include_write_only: bool,
}

/// Log format for structured output (CI/CD)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Plain text output (default)
    #[default]
    Text,
    /// JSON Lines format for parsing
    Json,
}
