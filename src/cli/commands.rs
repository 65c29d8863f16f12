use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use http::Method;
use serde_json::{json, Value};
use url::Url;

use crate::echo::echo_dispatcher;
use crate::logging;
use crate::params::{parse_query_params, RawParams};
use crate::path::{resolve_path, JsonPath, SegmentKind};
use crate::registry::{load_registry, ResourceRegistry};
use crate::runtime_config::RuntimeConfig;

/// Command-line interface for the JSON:API request router
///
/// Resolves paths, parses query parameters and runs requests through echo
/// handlers against a resource registry file.
#[derive(Debug, Parser)]
#[command(name = "jsonapi-router")]
#[command(about = "JSON:API path, parameter and dispatch inspector", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Resource registry file (YAML, TOML or JSON); falls back to JSONAPI_REGISTRY
    #[arg(short, long, global = true)]
    pub registry: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve a request path into its segment chain
    Resolve {
        /// Raw path, e.g. /tasks/1/relationships/project
        path: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Parse a query string into typed parameters
    Params {
        /// Raw query string, e.g. 'filter[tasks][name]=x&page[size]=10'
        query: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the resources and fields of the registry
    Inspect {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Run a request through echo handlers and print the response
    Dispatch {
        /// Path with optional query string, or an absolute URL
        target: String,

        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET", value_parser = parse_method)]
        method: Method,

        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,
    },
}

/// Output rendering for the inspection commands
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    Text,
    /// Pretty-printed JSON
    Json,
}

fn parse_method(raw: &str) -> Result<Method, String> {
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes()).map_err(|e| e.to_string())
}

/// Parse arguments, initialise logging and run the command against stdout.
///
/// # Errors
///
/// Returns an error if:
/// - logging cannot be initialised
/// - `JSONAPI_BASE_URL` is not an absolute URL
/// - the registry file is missing or invalid
/// - a path or query string does not resolve
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init_logging(cli.log_level.as_deref())?;
    let config = RuntimeConfig::from_env()?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&cli, &config, &mut out)
}

/// Run a parsed command, writing its output to `out`.
///
/// # Errors
///
/// See [`run_cli`].
pub fn execute<W: Write>(cli: &Cli, config: &RuntimeConfig, out: &mut W) -> Result<()> {
    match &cli.command {
        Commands::Resolve { path, format } => {
            let registry = open_registry(cli, config)?;
            let resolved = resolve_path(&registry, path)?;
            write_path(out, &resolved, &config.base_url, *format)
        }
        Commands::Params { query, format } => {
            let params = parse_query_params(&RawParams::from_query(query))?;
            match format {
                OutputFormat::Text => {
                    for pair in params.all() {
                        writeln!(out, "{pair}")?;
                    }
                    Ok(())
                }
                OutputFormat::Json => write_json(out, &params),
            }
        }
        Commands::Inspect { format } => {
            let registry = open_registry(cli, config)?;
            write_registry(out, &registry, *format)
        }
        Commands::Dispatch {
            target,
            method,
            body,
        } => {
            let registry = open_registry(cli, config)?;
            let body = body
                .as_deref()
                .map(serde_json::from_str::<Value>)
                .transpose()
                .context("Request body is not valid JSON")?;
            let (path, query) = split_target(target)?;
            let response = echo_dispatcher(Arc::new(registry)).dispatch_raw(
                method.clone(),
                &path,
                &query,
                body,
            );
            write_json(
                out,
                &json!({ "status": response.status, "body": response.body }),
            )
        }
    }
}

fn open_registry(cli: &Cli, config: &RuntimeConfig) -> Result<ResourceRegistry> {
    let path: &Path = cli
        .registry
        .as_deref()
        .or(config.registry_path.as_deref())
        .ok_or_else(|| anyhow!("No registry given: pass --registry or set JSONAPI_REGISTRY"))?;
    Ok(load_registry(path)?)
}

/// Split `/tasks?x=y` or `http://host/tasks?x=y` into path and query.
pub(super) fn split_target(target: &str) -> Result<(String, String)> {
    if target.starts_with("http://") || target.starts_with("https://") {
        let url = Url::parse(target).with_context(|| format!("Invalid URL '{target}'"))?;
        return Ok((url.path().to_string(), url.query().unwrap_or_default().to_string()));
    }
    Ok(match target.split_once('?') {
        Some((path, query)) => (path.to_string(), query.to_string()),
        None => (target.to_string(), String::new()),
    })
}

fn write_path<W: Write>(out: &mut W, path: &JsonPath, base_url: &Url, format: OutputFormat) -> Result<()> {
    let link = path.self_link(base_url)?;
    match format {
        OutputFormat::Text => {
            for segment in path.iter() {
                match segment.kind() {
                    SegmentKind::Resource { ids: Some(ids) } => {
                        writeln!(out, "resource      {} ids={ids}", segment.name())?;
                    }
                    SegmentKind::Resource { ids: None } => {
                        writeln!(out, "resource      {}", segment.name())?;
                    }
                    SegmentKind::Relationship => writeln!(out, "relationship  {}", segment.name())?,
                    SegmentKind::Field => writeln!(out, "field         {}", segment.name())?,
                }
            }
            writeln!(out, "canonical     {path}")?;
            writeln!(out, "self          {link}")?;
            Ok(())
        }
        OutputFormat::Json => write_json(
            out,
            &json!({
                "segments": path,
                "canonical": path.to_string(),
                "collection": path.is_collection(),
                "self": link.as_str(),
            }),
        ),
    }
}

fn write_registry<W: Write>(out: &mut W, registry: &ResourceRegistry, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for info in registry.resources() {
                writeln!(out, "{}", info.resource_type)?;
                for name in info.relationships() {
                    writeln!(out, "  relationship {name}")?;
                }
                for name in info.attributes() {
                    writeln!(out, "  attribute    {name}")?;
                }
            }
            Ok(())
        }
        OutputFormat::Json => {
            let resources: Vec<Value> = registry
                .resources()
                .map(|info| {
                    json!({
                        "type": info.resource_type,
                        "relationships": info.relationships().collect::<Vec<_>>(),
                        "attributes": info.attributes().collect::<Vec<_>>(),
                    })
                })
                .collect();
            write_json(out, &json!({ "resources": resources }))
        }
    }
}

fn write_json<W: Write, T: serde::Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
