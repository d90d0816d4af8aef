//! A minimal in-process Odoo stand-in.
//!
//! Serves both protocol surfaces on an ephemeral port with a small fixed
//! data set, records every request body, and answers with the same
//! envelope shapes a real server uses (including an error envelope for a
//! restricted model and a plain 500 for a broken one).

#![allow(dead_code)] // each test binary uses its own slice of this module

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use odoo_rpc::LogSink;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

/// uid handed out by the JSON-RPC `authenticate`.
pub const UID: i64 = 7;

/// uid handed out by `/web/session/authenticate`.
pub const REST_UID: i64 = 42;

/// Handle on the running server's recorded traffic.
#[derive(Clone, Default)]
pub struct MockOdoo {
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

impl MockOdoo {
    /// Every request so far, as (path, body) in arrival order.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }

    /// Bodies of requests that hit `path`.
    pub fn requests_to(&self, path: &str) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(seen, _)| seen == path)
            .map(|(_, body)| body.clone())
            .collect()
    }

    fn record(&self, path: &str, body: &Value) {
        self.requests
            .lock()
            .unwrap()
            .push((path.to_string(), body.clone()));
    }
}

/// Start the stand-in on an ephemeral port; returns its base URL.
pub async fn start() -> (String, MockOdoo) {
    let state = MockOdoo::default();
    let app = Router::new()
        .route("/jsonrpc", post(jsonrpc))
        .route("/web/session/authenticate", post(session_authenticate))
        .route("/web/dataset/search_read", post(search_read))
        .route("/web/dataset/call_kw/{model}/{method}", post(call_kw))
        .route("/web/webclient/version_info", post(version_info))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (url, state)
}

/// Log sink that keeps every event for later assertions.
#[derive(Clone, Default)]
pub struct CaptureSink {
    events: Arc<Mutex<Vec<(String, Value)>>>,
}

impl CaptureSink {
    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().unwrap().clone()
    }
}

impl LogSink for CaptureSink {
    fn record(&self, event: &str, payload: &Value) {
        self.events
            .lock()
            .unwrap()
            .push((event.to_string(), payload.clone()));
    }
}

fn ok(id: &Value, result: Value) -> Json<Value> {
    Json(json!({"jsonrpc": "2.0", "id": id, "result": result}))
}

fn remote_error(id: &Value, message: &str, nested: &str) -> Json<Value> {
    Json(json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {"code": 200, "message": message, "data": {"message": nested}},
    }))
}

fn version_payload() -> Value {
    json!({"server_version": "17.0+e", "server_version_info": [17, 0, 0, "final", 0, ""]})
}

/// Fixed data set shared by both protocol surfaces.
fn model_result(model: &str, method: &str) -> Result<Value, (&'static str, &'static str)> {
    match (model, method) {
        // Duplicate names on purpose, for the indexing tests.
        ("res.partner", "search_read") => Ok(json!([
            {"id": 1, "name": "A"},
            {"id": 2, "name": "A"},
        ])),
        ("res.users", "search_read") | ("res.users", "read") => Ok(json!([])),
        ("res.users", "write") => Ok(json!(true)),
        ("account.move", "search_read") => Ok(json!([
            {"id": 1, "name": "INV/2026/0042", "invoice_line_ids": [11, 12]},
        ])),
        ("account.move.line", "read") => Ok(json!([
            {"id": 11, "name": "Consulting"},
            {"id": 12, "name": "Hosting"},
        ])),
        ("restricted.model", _) => Err(("Access Denied", "insufficient rights")),
        _ => Ok(json!([])),
    }
}

async fn jsonrpc(State(state): State<MockOdoo>, Json(body): Json<Value>) -> Response {
    state.record("/jsonrpc", &body);
    let id = body["id"].clone();
    let service = body["params"]["service"].as_str().unwrap_or_default();
    let method = body["params"]["method"].as_str().unwrap_or_default();
    let args = body["params"]["args"].as_array().cloned().unwrap_or_default();

    match (service, method) {
        ("common", "version") => ok(&id, version_payload()).into_response(),
        ("common", "authenticate") => {
            let good = args.get(1).and_then(Value::as_str) == Some("admin")
                && args.get(2).and_then(Value::as_str) == Some("secret");
            ok(&id, if good { json!(UID) } else { json!(false) }).into_response()
        }
        ("object", "execute") => {
            let model = args.get(3).and_then(Value::as_str).unwrap_or_default();
            let exec_method = args.get(4).and_then(Value::as_str).unwrap_or_default();
            if model == "boom.model" {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "<html>Internal Server Error</html>",
                )
                    .into_response();
            }
            match model_result(model, exec_method) {
                Ok(result) => ok(&id, result).into_response(),
                Err((message, nested)) => remote_error(&id, message, nested).into_response(),
            }
        }
        _ => remote_error(&id, "Odoo Exception", "unknown service").into_response(),
    }
}

async fn session_authenticate(
    State(state): State<MockOdoo>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record("/web/session/authenticate", &body);
    let id = body["id"].clone();
    let good =
        body["params"]["login"] == "admin" && body["params"]["password"] == "secret";
    if good {
        ok(&id, json!({"uid": REST_UID, "username": "admin", "db": "mydb"}))
    } else {
        ok(&id, json!(false))
    }
}

async fn search_read(State(state): State<MockOdoo>, Json(body): Json<Value>) -> Response {
    state.record("/web/dataset/search_read", &body);
    let id = body["id"].clone();
    let model = body["params"]["model"].as_str().unwrap_or_default();
    match model_result(model, "search_read") {
        // The web endpoint wraps its rows, unlike the RPC service.
        Ok(Value::Array(records)) => {
            let length = records.len();
            ok(&id, json!({"length": length, "records": records})).into_response()
        }
        Ok(other) => ok(&id, other).into_response(),
        Err((message, nested)) => remote_error(&id, message, nested).into_response(),
    }
}

async fn call_kw(
    State(state): State<MockOdoo>,
    Path((model, method)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    state.record(&format!("/web/dataset/call_kw/{model}/{method}"), &body);
    let id = body["id"].clone();
    if model == "boom.model" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "<html>Internal Server Error</html>",
        )
            .into_response();
    }
    match model_result(&model, &method) {
        Ok(result) => ok(&id, result).into_response(),
        Err((message, nested)) => remote_error(&id, message, nested).into_response(),
    }
}

async fn version_info(State(state): State<MockOdoo>, Json(body): Json<Value>) -> Json<Value> {
    state.record("/web/webclient/version_info", &body);
    ok(&body["id"], version_payload())
}
