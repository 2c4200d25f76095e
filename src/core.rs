use std::io::{self, Write};
use std::path::Path;

use clap::Parser;
use serde_json::Value;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{parse_body, parse_params, Args, Command, LogFormat, RequestArgs, SampleArgs};
use crate::config::Config;
use crate::devexp::{format_curl_pretty, python_snippet, render_command, PythonTarget};
use crate::errors::{CurlsmithError, Result};
use crate::openapi::{
    attach_form, find_operation, list_operations, load_document, resolve_refs, sample_body, MediaTypeEntry, Operation,
};
use crate::request::{build_request_with, supports_media_type, BuildOptions, RequestDescriptor};
use crate::sample::{synthesize_with, SampleConfig};
use crate::status::ExitStatus;

const MULTIPART: &str = "multipart/form-data";

/// Main entry point for the CLI.
///
/// Handles argument parsing, logging and configuration, then dispatches to
/// the selected subcommand.
pub fn run(args: Vec<String>) -> ExitStatus {
    let parsed = match Args::try_parse_from(&args) {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            return if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion
            {
                ExitStatus::Success
            } else {
                ExitStatus::Error
            };
        }
    };

    init_tracing(parsed.verbose, parsed.log_format.unwrap_or_default());

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "failed to load config, using defaults");
            Config::default()
        }
    };

    let traceback = parsed.verbose > 0;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match program(parsed, &config, &mut out) {
        Ok(status) => status,
        Err(e) => handle_error(e, traceback),
    }
}

/// Install the global subscriber; diagnostics always go to stderr
fn init_tracing(verbose: u8, format: LogFormat) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,curlsmith=info".to_string(),
            2 => "info,curlsmith=debug".to_string(),
            _ => "debug,curlsmith=trace".to_string(),
        },
    };
    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry.with(fmt::layer().json().with_writer(io::stderr)).try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().compact().with_target(false).with_writer(io::stderr))
            .try_init(),
    };
    // a subscriber may already be installed when embedded
    result.ok();
}

pub fn program(args: Args, config: &Config, out: &mut dyn Write) -> Result<ExitStatus> {
    match args.command {
        Command::List { spec } => {
            let document = open_document(&spec)?;
            for operation in list_operations(&document) {
                writeln!(
                    out,
                    "{:<7} {} {}",
                    operation.method.to_uppercase(),
                    operation.path,
                    operation.operation_id.as_deref().unwrap_or("-")
                )?;
            }
        }

        Command::Sample { spec, operation_id, override_json, samples } => {
            let document = open_document(&spec)?;
            let operation = lookup(&document, &operation_id)?;
            let value = match override_json {
                Some(text) => parse_body(&text)?,
                None => {
                    let sample_config = merge_samples(config, samples);
                    sample_body(&operation, &sample_config).map(|s| s.value).unwrap_or(Value::Null)
                }
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }

        Command::Request { request } => {
            let descriptor = compile(&request, config, false)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&descriptor)?)?;
        }

        Command::Curl { request, dialect, curl_options, no_sample, color } => {
            let mut descriptor = compile(&request, config, !no_sample)?;
            descriptor.curl_options = config.curl_options.iter().chain(&curl_options).cloned().collect();

            let dialect = dialect.or(config.dialect).unwrap_or_default();
            debug!(%dialect, "rendering command");
            let command = render_command(&descriptor, dialect);
            if color || atty::is(atty::Stream::Stdout) {
                if color {
                    console::set_colors_enabled(true);
                }
                writeln!(out, "{}", format_curl_pretty(&command))?;
            } else {
                writeln!(out, "{}", command)?;
            }
        }

        Command::Python { spec, operation_id, url, workspace, deployment, samples } => {
            let document = open_document(&spec)?;
            let operation = lookup(&document, &operation_id)?;
            let target = match (url, workspace, deployment) {
                (Some(url), _, _) => PythonTarget::Url(url),
                (None, Some(workspace), Some(deployment)) => PythonTarget::Workspace { workspace, deployment },
                _ => {
                    return Err(CurlsmithError::Argument(
                        "either --url or --workspace with --deployment is required".to_string(),
                    ))
                }
            };
            let sample = sample_body(&operation, &merge_samples(config, samples)).map(|s| s.value);
            writeln!(out, "{}", python_snippet(&operation.path, sample.as_ref(), &target))?;
        }
    }

    Ok(ExitStatus::Success)
}

fn open_document(path: &Path) -> Result<Value> {
    let document = load_document(path)?;
    Ok(resolve_refs(&document))
}

fn lookup(document: &Value, operation_id: &str) -> Result<Operation> {
    find_operation(document, operation_id).ok_or_else(|| CurlsmithError::UnknownOperation(operation_id.to_string()))
}

/// Flags only ever widen what the config allows
fn merge_samples(config: &Config, flags: SampleArgs) -> SampleConfig {
    SampleConfig {
        include_read_only: config.samples.include_read_only || flags.include_read_only,
        include_write_only: config.samples.include_write_only || flags.include_write_only,
    }
}

fn sample_entry(entry: &MediaTypeEntry, config: &SampleConfig) -> Value {
    let schema = entry.schema.as_ref().unwrap_or(&Value::Null);
    synthesize_with(schema, config, entry.example.as_ref())
}

fn is_multipart(media_type: &str) -> bool {
    media_type
        .parse::<mime::Mime>()
        .map(|m| m.essence_str().eq_ignore_ascii_case(MULTIPART))
        .unwrap_or(false)
}

/// Compile the selected operation, synthesizing a body when none is given
///
/// Multipart operations are compiled without a body; the form fields are
/// attached afterwards.
fn compile(args: &RequestArgs, config: &Config, use_sample: bool) -> Result<RequestDescriptor> {
    let document = open_document(&args.spec)?;
    let operation = lookup(&document, &args.operation_id)?;
    let sample_config = merge_samples(config, args.samples);
    let params = parse_params(&args.params)?;
    let explicit = args.body.as_deref().map(parse_body).transpose()?;

    let content = operation.request_body.as_ref().map(|b| b.content.as_slice()).unwrap_or_default();
    let multipart = match &args.content_type {
        Some(requested) => is_multipart(requested),
        None => !content.iter().any(|e| supports_media_type(&e.media_type)) && operation.media_type(MULTIPART).is_some(),
    };

    let chosen = if multipart {
        operation.media_type(MULTIPART)
    } else {
        content.iter().find(|e| match &args.content_type {
            Some(requested) => e.media_type.eq_ignore_ascii_case(requested),
            None => supports_media_type(&e.media_type),
        })
    };
    let body = explicit.or_else(|| {
        use_sample
            .then(|| chosen.map(|entry| sample_entry(entry, &sample_config)))
            .flatten()
    });

    let options = BuildOptions {
        base_url: args.base_url.clone().or_else(|| config.base_url.clone()),
        content_type: args.content_type.clone().filter(|_| !multipart),
    };
    let compiler_body = if multipart { None } else { body.as_ref() };
    let request = build_request_with(&document, &args.operation_id, compiler_body, Some(&params), &options)?;

    Ok(match body.filter(|_| multipart) {
        Some(fields) => attach_form(request, &fields),
        None if multipart => request.with_header("Content-Type", MULTIPART),
        None => request,
    })
}

fn handle_error(error: CurlsmithError, traceback: bool) -> ExitStatus {
    if traceback {
        eprintln!("Error: {:?}", error);
    } else {
        eprintln!("Error: {}", error);
    }

    ExitStatus::from(&error)
}
