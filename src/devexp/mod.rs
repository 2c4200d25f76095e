//! Developer experience output
//!
//! Turns compiled requests into text a developer can paste somewhere:
//!
//! - **curl**: one command per shell dialect (bash, cmd, PowerShell)
//! - **Python**: a client call with the sample body as keyword arguments
//!
//! ```bash
//! curlsmith curl petstore.yaml addPet --dialect powershell
//! ```

pub mod curl;
pub mod python;

pub use curl::{
    curl_bash, curl_cmd, curl_powershell, format_curl_pretty, render_command, ShellDialect, DUPLICATE_KEY_MARKER,
};
pub use python::{python_snippet, PythonTarget};
