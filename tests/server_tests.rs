//! Integration tests for the HTTP server adapter
//!
//! # Test Coverage
//!
//! - Status line, headers and JSON body over a real socket
//! - CORS headers and the empty `200` preflight response
//! - Fixed `404` body for unmatched requests
//! - Handler errors answered with `500` by the service safety net
//! - Unterminated chains flushed with their pending status
//!
//! # Important Notes
//!
//! - Tests use May coroutines with 32KB stack size
//! - Each fixture binds a free loopback port and stops the server on drop

use dishpatch::dispatcher::{Dispatcher, Flow, HandlerChain};
use dishpatch::router::Router;
use http::Method;
use serde_json::json;

mod common;
use common::http::{request, send_request};
use common::test_server::TestServer;

fn orders_server() -> TestServer {
    let mut api = Router::new();
    api.get("/orders/:id", |req, res| {
        res.json(&json!({ "id": req.param("id"), "status": "pending" }))?;
        Ok(Flow::Continue)
    });
    api.route(
        Method::POST,
        "/orders",
        HandlerChain::new(|req, res| {
            if req.header("authorization").is_none() {
                res.json_with_status(401, &json!({ "error": "Unauthorized" }))?;
                return Ok(Flow::Stop);
            }
            Ok(Flow::Continue)
        })
        .then(|req, res| {
            res.json_with_status(201, &json!({ "received": req.body }))?;
            Ok(Flow::Continue)
        }),
    );
    api.get("/boom", |_req, _res| Err(anyhow::anyhow!("store offline")));
    api.get("/accepted", |_req, res| {
        res.status(202);
        Ok(Flow::Continue)
    });

    let mut app = Router::new();
    app.mount("/api/v1", &api);
    TestServer::start(Dispatcher::new(app))
}

#[test]
fn test_get_with_param() {
    let server = orders_server();
    let resp = send_request(
        &server.addr(),
        &request("GET", "/api/v1/orders/ORDER123", &[], ""),
    );
    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("Content-Type"), Some("application/json"));
    assert_eq!(resp.header("Access-Control-Allow-Origin"), Some("*"));
    assert_eq!(resp.json(), json!({ "id": "ORDER123", "status": "pending" }));
}

#[test]
fn test_post_body_round_trip() {
    let server = orders_server();
    let resp = send_request(
        &server.addr(),
        &request(
            "POST",
            "/api/v1/orders",
            &[("Authorization", "Bearer u1"), ("Content-Type", "application/json")],
            r#"{"items":[{"product_id":"p1","quantity":2}]}"#,
        ),
    );
    assert_eq!(resp.status, 201);
    assert_eq!(resp.json()["received"]["items"][0]["quantity"], 2);
}

#[test]
fn test_malformed_body_over_socket() {
    let server = orders_server();
    let resp = send_request(
        &server.addr(),
        &request(
            "POST",
            "/api/v1/orders",
            &[("Authorization", "Bearer u1")],
            "{not json",
        ),
    );
    assert_eq!(resp.status, 201);
    assert_eq!(resp.json(), json!({ "received": {} }));
}

#[test]
fn test_guard_stops_chain() {
    let server = orders_server();
    let resp = send_request(&server.addr(), &request("POST", "/api/v1/orders", &[], "{}"));
    assert_eq!(resp.status, 401);
    assert_eq!(resp.json(), json!({ "error": "Unauthorized" }));
}

#[test]
fn test_preflight_response() {
    let server = orders_server();
    let resp = send_request(
        &server.addr(),
        &request("OPTIONS", "/api/v1/orders", &[("Origin", "https://app.example.com")], ""),
    );
    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("Content-Length"), Some("0"));
    assert!(resp.body.is_empty());
    assert_eq!(resp.header("Access-Control-Allow-Origin"), Some("*"));
    assert_eq!(
        resp.header("Access-Control-Allow-Methods"),
        Some("GET, POST, PUT, PATCH, DELETE, OPTIONS")
    );
    assert_eq!(
        resp.header("Access-Control-Allow-Headers"),
        Some("Content-Type, Authorization")
    );
}

#[test]
fn test_not_found_over_socket() {
    let server = orders_server();
    let resp = send_request(&server.addr(), &request("GET", "/orders/ORDER123", &[], ""));
    assert_eq!(resp.status, 404);
    assert_eq!(resp.body, r#"{"error":"Not Found"}"#);
}

#[test]
fn test_handler_error_becomes_500() {
    let server = orders_server();
    let resp = send_request(&server.addr(), &request("GET", "/api/v1/boom", &[], ""));
    assert_eq!(resp.status, 500);
    assert_eq!(resp.json(), json!({ "error": "Internal Server Error" }));
}

#[test]
fn test_unterminated_chain_flushed() {
    let server = orders_server();
    let resp = send_request(&server.addr(), &request("GET", "/api/v1/accepted", &[], ""));
    assert_eq!(resp.status, 202);
    assert!(resp.body.is_empty());
}
