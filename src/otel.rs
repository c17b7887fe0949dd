//! Structured logging initialization.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a JSON or
//! pretty fmt layer. `RUST_LOG`, when set, replaces the configured level.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// `"json"` (any case) selects JSON; anything else is pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// trace/debug/info/warn/error
    pub level: String,
    pub format: LogFormat,
    /// Extra filter directives, comma separated (`dishpatch::router=debug`).
    pub target_filter: Option<String>,
    /// Write through a background thread instead of blocking the coroutine.
    pub non_blocking: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            non_blocking: false,
        }
    }
}

/// Build the filter: `RUST_LOG` if present, else `level`, plus extra directives.
///
/// Invalid extra directives are skipped with a message on stderr, since the
/// subscriber that would log them does not exist yet.
#[must_use]
pub fn build_filter(config: &LogConfig) -> EnvFilter {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    // Connection-level noise from the HTTP server.
    if let Ok(directive) = "may_minihttp=warn".parse() {
        filter = filter.add_directive(directive);
    }

    if let Some(targets) = &config.target_filter {
        for directive in targets.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(_) => eprintln!("Warning: Invalid log filter directive: {directive}"),
            }
        }
    }
    filter
}

/// Install the global subscriber.
///
/// With `non_blocking` the returned guard must be kept alive for the life of
/// the process; dropping it flushes and stops the writer thread.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = build_filter(config);

    let (writer, guard) = if config.non_blocking {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(writer), Some(guard))
    } else {
        (
            tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stdout),
            None,
        )
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}
