use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::AppConfig;
use crate::demo::{app_router, DemoState};
use crate::dispatcher::Dispatcher;
use crate::middleware::MetricsMiddleware;
use crate::otel::init_logging;
use crate::server::{AppService, HttpServer, ServerHandle};

/// Command-line interface for the dishpatch demo service.
#[derive(Parser)]
#[command(name = "dishpatch")]
#[command(about = "Food-delivery API on a minimal route dispatcher", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the demo API
    Serve {
        /// YAML config file
        #[arg(short, long, env = "DISHPATCH_CONFIG")]
        config: Option<PathBuf>,

        /// Address and port to bind the server to
        #[arg(long)]
        addr: Option<String>,
    },
    /// Print the routing table in match order
    Routes,
}

/// Assemble the dispatcher from config: demo routes, CORS, body policy and metrics.
#[must_use]
pub fn build_dispatcher(config: &AppConfig, metrics: Arc<MetricsMiddleware>) -> Dispatcher {
    let state = Arc::new(DemoState::default());
    let router = app_router(&state, Arc::clone(&metrics));
    Dispatcher::new(router)
        .with_cors(config.cors.clone().into_policy())
        .with_body_policy(config.body_policy())
        .with_middleware(metrics)
}

/// Execute the CLI command provided by the user
///
/// # Errors
///
/// Returns an error if:
/// - The config file cannot be read or parsed
/// - Logging cannot be initialized
/// - The server fails to bind
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Routes => {
            let state = Arc::new(DemoState::default());
            app_router(&state, Arc::new(MetricsMiddleware::new())).dump_routes();
            Ok(())
        }
        Commands::Serve { config, addr } => {
            let mut app_config = match &config {
                Some(path) => AppConfig::load(path)?,
                None => AppConfig::default(),
            }
            .with_env_overrides();
            if let Some(addr) = addr {
                app_config.http.addr = addr;
            }

            let _log_guard = init_logging(&app_config.log_config())?;
            app_config.runtime_config().apply();

            let dispatcher = build_dispatcher(&app_config, Arc::new(MetricsMiddleware::new()));
            let service = AppService::new(Arc::new(dispatcher));
            let handle = HttpServer(service)
                .start(app_config.http.addr.as_str())
                .with_context(|| format!("Failed to bind {}", app_config.http.addr))?;
            info!(
                addr = %handle.addr(),
                config = ?config,
                "Server listening"
            );
            wait_for_shutdown(handle)
        }
    }
}

#[cfg(unix)]
fn wait_for_shutdown(handle: ServerHandle) -> anyhow::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("Failed to install signal handlers")?;
    if let Some(signal) = signals.forever().next() {
        info!(signal, "Shutdown signal received");
    }
    handle.stop();
    info!("Server stopped");
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown(handle: ServerHandle) -> anyhow::Result<()> {
    handle
        .join()
        .map_err(|e| anyhow::anyhow!("server coroutine panicked: {e:?}"))
}
