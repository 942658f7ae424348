// execdemo/tests/integration_tests.rs
//
// Copyright (c) 2025 Arcella Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! End-to-end submissions against an in-process fake of the `/exec` backend.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header::CONTENT_TYPE, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use tokio::sync::Notify;

use execdemo::command::Command;
use execdemo::form;
use execdemo::render;
use execdemo::result::{ExecResult, ResultSlot};
use execdemo::submitter::CommandSubmitter;

/// Named release points for held responses.
type Gates = Arc<HashMap<&'static str, Arc<Notify>>>;

fn gates() -> Gates {
    Arc::new(
        ["first", "second"]
            .into_iter()
            .map(|name| (name, Arc::new(Notify::new())))
            .collect(),
    )
}

/// Echoes the request back. A query `gate:<name>` holds the answer until that gate opens.
async fn echo_exec(State(gates): State<Gates>, headers: HeaderMap, body: String) -> Json<Value> {
    let pairs = form::decode(&body).unwrap_or_default();
    let fields: Map<String, Value> = pairs
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();

    let gate = fields
        .get("query")
        .and_then(Value::as_str)
        .and_then(|q| q.strip_prefix("gate:"))
        .and_then(|name| gates.get(name))
        .cloned();
    if let Some(gate) = gate {
        gate.notified().await;
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    Json(json!({
        "content_type": content_type,
        "body": body,
        "fields": fields,
    }))
}

fn backend_tables() -> Value {
    json!({
        "query": "insert into product(sku, description, price) values('SKU-1', 'mouse', 10)",
        "result": { "title": "result", "fields": [], "rows": [], "rowsaffected": 1, "insertid": 0 },
        "product": {
            "title": "product",
            "fields": ["sku", "description", "price"],
            "rows": [["SKU-1", "mouse", "10"]],
            "rowsaffected": 0,
            "insertid": 0
        },
        "nested": { "f": 1.5, "n": null, "list": [true, false, "x"] }
    })
}

async fn spawn_backend() -> SocketAddr {
    spawn_gated_backend(gates()).await
}

async fn spawn_gated_backend(gates: Gates) -> SocketAddr {
    let app = Router::new()
        .route("/exec", post(echo_exec))
        .route("/tables", post(|| async { Json(backend_tables()) }))
        .route("/text", post(|| async { "<html>not json</html>" }))
        .route(
            "/fail",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "cid or sku not specified"})),
                )
            }),
        )
        .with_state(gates);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn submitter(addr: SocketAddr, path: &str) -> CommandSubmitter {
    CommandSubmitter::new(&format!("http://{}{}", addr, path)).unwrap()
}

#[tokio::test]
async fn test_each_command_posts_its_template() {
    let addr = spawn_backend().await;
    let submitter = submitter(addr, "/exec");

    let cases = [
        (Command::query("select * from product"), "query=select%20%2A%20from%20product"),
        (
            Command::Product { sku: "SKU-1".into(), desc: "mouse".into(), price: "10".into() },
            "product=1&sku=SKU-1&desc=mouse&price=10",
        ),
        (Command::Customer { name: "".into() }, "customer=1&name="),
        (Command::Order { cid: "1".into(), sku: "SKU-1".into() }, "order=1&cid=1&sku=SKU-1"),
    ];

    for (command, expected_body) in cases {
        let result = submitter.submit(&command).await;
        let value = result.value().expect("backend answered with JSON");

        assert_eq!(value["body"], expected_body, "kind {}", command.kind());
        assert_eq!(value["content_type"], "application/x-www-form-urlencoded");
    }
}

#[tokio::test]
async fn test_reserved_characters_survive_the_trip() {
    let addr = spawn_backend().await;
    let submitter = submitter(addr, "/exec");

    let command = Command::Product {
        sku: "a&b=c".into(),
        desc: "50% off + free".into(),
        price: "".into(),
    };
    let result = submitter.submit(&command).await;
    let fields = &result.value().unwrap()["fields"];

    assert_eq!(fields["product"], "1");
    assert_eq!(fields["sku"], "a&b=c");
    assert_eq!(fields["desc"], "50% off + free");
    assert_eq!(fields["price"], "");
    assert_eq!(fields.as_object().unwrap().len(), 4);
}

#[tokio::test]
async fn test_json_response_is_returned_exactly() {
    let addr = spawn_backend().await;
    let result = submitter(addr, "/tables").submit(&Command::query("x")).await;

    assert_eq!(result, ExecResult::Value(backend_tables()));

    let text = render::render_text(&result);
    assert!(text.contains("== product =="));
    assert!(text.contains("SKU-1 | mouse       | 10"));
}

#[tokio::test]
async fn test_non_json_body_is_an_error() {
    let addr = spawn_backend().await;
    let result = submitter(addr, "/text").submit(&Command::query("x")).await;

    assert!(result.is_error());
    assert!(result.error_message().unwrap().contains("invalid JSON"));
}

#[tokio::test]
async fn test_error_status_with_json_body_is_passed_through() {
    let addr = spawn_backend().await;
    let result = submitter(addr, "/fail")
        .submit(&Command::Order { cid: "".into(), sku: "".into() })
        .await;

    assert_eq!(result, ExecResult::Value(json!({"error": "cid or sku not specified"})));
    assert_eq!(render::render_text(&result), "error: cid or sku not specified\n");
}

#[tokio::test]
async fn test_last_resolved_response_wins() {
    let gates = gates();
    let addr = spawn_gated_backend(gates.clone()).await;
    let submitter = submitter(addr, "/exec");
    let slot = ResultSlot::new();

    let first = Command::query("gate:first");
    let second = Command::query("gate:second");

    // Release the later submission first; open the earlier one only once
    // the later answer is in the slot.
    let (first_generation, second_generation, ()) = tokio::join!(
        submitter.submit_into(&first, &slot),
        submitter.submit_into(&second, &slot),
        async {
            gates["second"].notify_one();
            while slot.generation() < 1 {
                tokio::task::yield_now().await;
            }
            gates["first"].notify_one();
        }
    );

    assert_eq!(second_generation, 1);
    assert_eq!(first_generation, 2);
    assert_eq!(slot.generation(), 2);

    let current = slot.get().await.unwrap();
    assert_eq!(current.value().unwrap()["fields"]["query"], "gate:first");
}

#[tokio::test]
async fn test_failure_reaches_fresh_slot() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let slot = ResultSlot::new();
    submitter(addr, "/exec")
        .submit_into(&Command::Customer { name: "bob".into() }, &slot)
        .await;

    let result = slot.get().await.unwrap();
    assert!(result.is_error());
    assert!(result.value().is_none());
    assert!(render::render_text(&result).starts_with("error: "));
}
