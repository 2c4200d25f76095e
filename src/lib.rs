//! curlsmith library interface
//!
//! Turns OpenAPI operations into sample bodies, request descriptors and
//! paste-ready curl commands.
//!
//! # Module Organization
//!
//! - [`sample`] - Schema sample synthesis (synthesize, SampleConfig)
//! - [`openapi`] - Document loading, `$ref` inlining, operations, catalog
//! - [`request`] - Request descriptors and the operation compiler
//! - [`devexp`] - curl rendering for bash/cmd/PowerShell, Python snippets
//! - [`config`] - Config file support
//! - [`errors`] - Error types (CurlsmithError, Result)
//! - [`status`] - Exit status codes (ExitStatus)
//! - [`core`] - Main execution logic

pub mod cli;
pub mod config;
pub mod core;
pub mod devexp;
pub mod errors;
pub mod openapi;
pub mod request;
pub mod sample;
pub mod status;

pub use devexp::{render_command, ShellDialect};
pub use errors::{CurlsmithError, Result};
pub use openapi::list_operations;
pub use request::{build_request, RequestDescriptor};
pub use sample::synthesize;
