//! Structured logging initialisation.
//!
//! Every component logs through `tracing` macros with structured fields
//! (`request_id`, `path`, `controller`, ...). This module installs the
//! subscriber that renders them:
//!
//! - an [`EnvFilter`] built from `RUST_LOG`, or from the configured level
//! - a JSON (production) or pretty (development) `fmt` layer
//! - optional non-blocking output through `tracing-appender`
//!
//! Output goes to stderr so that command output on stdout stays machine-readable.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `JSONAPI_LOG_LEVEL` | `info` | trace/debug/info/warn/error |
//! | `JSONAPI_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `JSONAPI_LOG_ASYNC` | `false` | buffer output on a background thread |
//! | `JSONAPI_LOG_TARGET_FILTER` | unset | extra comma-separated filter directives |
//! | `JSONAPI_LOG_INCLUDE_LOCATION` | `false` | add file and line to each event |

use std::env;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Buffer output on a background writer thread
    pub async_logging: bool,
    /// Extra filter directives (comma-separated)
    pub target_filter: Option<String>,
    /// Include file:line location
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::default_prod()
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("JSONAPI_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: LogFormat::parse(
                &env::var("JSONAPI_LOG_FORMAT").unwrap_or_else(|_| "json".to_string()),
            ),
            async_logging: env_flag("JSONAPI_LOG_ASYNC"),
            target_filter: env::var("JSONAPI_LOG_TARGET_FILTER").ok(),
            include_location: env_flag("JSONAPI_LOG_INCLUDE_LOCATION"),
        }
    }

    #[must_use]
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            async_logging: false,
            target_filter: None,
            include_location: true,
        }
    }

    #[must_use]
    pub fn default_prod() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            async_logging: false,
            target_filter: None,
            include_location: false,
        }
    }

    /// Level named by `log_level`, falling back to INFO.
    #[must_use]
    pub fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Filter from `RUST_LOG` if set, otherwise from the level, plus any valid
    /// target directives. Invalid directives are skipped.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));
        for directive in self
            .target_filter
            .iter()
            .flat_map(|f| f.split(','))
            .map(str::trim)
            .filter(|d| !d.is_empty())
        {
            match directive.parse() {
                Ok(parsed) => filter = filter.add_directive(parsed),
                Err(_) => eprintln!("Warning: Invalid log filter directive: {directive}"),
            }
        }
        filter
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(false)
}

/// Install the global subscriber.
///
/// With `async_logging` the returned guard must be held until exit; dropping
/// it flushes buffered events.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging_with_config(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let (writer, guard) = if config.async_logging {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(writer), Some(guard))
    } else {
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stderr), None)
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

/// Initialise from `JSONAPI_LOG_*`, overriding the level when `log_level` is given.
///
/// # Errors
///
/// See [`init_logging_with_config`].
pub fn init_logging(log_level: Option<&str>) -> Result<Option<WorkerGuard>> {
    let mut config = LogConfig::from_env();
    if let Some(level) = log_level {
        config.log_level = level.to_string();
    }
    init_logging_with_config(&config)
}
