//! Unit tests for CLI commands

use std::sync::Arc;

use clap::Parser;
use http::Method;
use serde_json::json;

use crate::cli::{build_dispatcher, Cli, Commands};
use crate::config::AppConfig;
use crate::dispatcher::{Incoming, ResponseWriter};
use crate::middleware::MetricsMiddleware;

#[test]
fn test_serve_command_parses() {
    let cli = Cli::try_parse_from([
        "dishpatch",
        "serve",
        "--config",
        "dishpatch.yaml",
        "--addr",
        "127.0.0.1:9000",
    ])
    .unwrap();

    match cli.command {
        Commands::Serve { config, addr } => {
            assert_eq!(config.unwrap().to_string_lossy(), "dishpatch.yaml");
            assert_eq!(addr.as_deref(), Some("127.0.0.1:9000"));
        }
        Commands::Routes => panic!("Expected Serve command"),
    }
}

#[test]
fn test_routes_command_parses() {
    let cli = Cli::try_parse_from(["dishpatch", "routes"]).unwrap();
    assert!(matches!(cli.command, Commands::Routes));
}

#[test]
fn test_unknown_command_rejected() {
    assert!(Cli::try_parse_from(["dishpatch", "generate"]).is_err());
}

#[test]
fn test_build_dispatcher_serves_demo_routes() {
    let metrics = Arc::new(MetricsMiddleware::new());
    let dispatcher = build_dispatcher(&AppConfig::default(), Arc::clone(&metrics));

    let mut res = ResponseWriter::new();
    dispatcher
        .handle(Incoming::new("GET", "/health"), &mut res)
        .unwrap();
    assert_eq!(res.status_code(), 200);
    assert_eq!(res.body_json(), json!({ "status": "ok" }));
    assert_eq!(metrics.request_count(), 1);

    assert!(dispatcher
        .routes()
        .iter()
        .any(|r| r.method == Method::PATCH && r.pattern.as_str() == "/api/v1/orders/:id/status"));
}

#[test]
fn test_build_dispatcher_applies_body_limit() {
    let config = AppConfig::from_yaml("http:\n  max_body_bytes: 4\n").unwrap();
    let dispatcher = build_dispatcher(&config, Arc::new(MetricsMiddleware::new()));

    let mut res = ResponseWriter::new();
    dispatcher
        .handle(
            Incoming::new("POST", "/api/v1/orders").with_body(&b"{\"items\":[]}"[..]),
            &mut res,
        )
        .unwrap();
    assert_eq!(res.status_code(), 413);
}
