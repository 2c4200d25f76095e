//! CLI argument parsing and processing

pub mod args;
pub mod process;

// Re-exports
pub use args::{Args, Command, LogFormat, RequestArgs, SampleArgs};
pub use process::{parse_body, parse_params};
