// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router-level tests for the `/api` surface.

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use courier_gateway::{router, GatewayState};
use courier_test_utils::{CreateOutcome, MockProvider, TestHarness, PIXEL_DATA_URI};

struct Reply {
    status: StatusCode,
    headers: axum::http::HeaderMap,
    bytes: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        if self.bytes.is_empty() {
            return Value::Null;
        }
        serde_json::from_slice(&self.bytes).expect("response should be JSON")
    }
}

async fn setup(provider: MockProvider) -> (TestHarness, Router) {
    let harness = TestHarness::builder()
        .with_provider(provider)
        .build()
        .await
        .unwrap();
    let app = router(GatewayState::new(harness.service.clone()));
    (harness, app)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Reply {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
    Reply {
        status,
        headers,
        bytes,
    }
}

async fn create(app: &Router, name: &str) -> Value {
    let reply = call(
        app,
        Method::POST,
        "/api/instances",
        Some(json!({ "name": name, "contacts": ["5511999999999"], "message": "Hi" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    reply.json()
}

#[tokio::test]
async fn create_returns_created_view_without_token() {
    let (_harness, app) = setup(MockProvider::new()).await;

    let view = create(&app, "Sales").await;
    assert!(view["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(view["provider"], "remote");
    assert_eq!(view["api_status"], "created");
    assert!(view["api_instance_id"].as_str().is_some());
    assert!(view.get("remote_token").is_none());
    assert!(!view.to_string().contains("mock-token"));
}

#[tokio::test]
async fn create_with_failed_provisioning_still_returns_201() {
    let provider = MockProvider::new();
    provider
        .set_create_outcome(CreateOutcome::Fail("remote down".into()))
        .await;
    let (_harness, app) = setup(provider).await;

    let view = create(&app, "Sales").await;
    assert_eq!(view["api_status"], "error");
    assert!(view["api_error"].as_str().is_some_and(|e| e.contains("remote down")));
    assert!(view["api_instance_id"].is_null());
}

#[tokio::test]
async fn create_rejects_invalid_input() {
    let (_harness, app) = setup(MockProvider::new()).await;

    let reply = call(
        &app,
        Method::POST,
        "/api/instances",
        Some(json!({ "name": "", "contacts": ["1"], "message": "Hi" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    let body = reply.json();
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["field"], "name");

    let reply = call(
        &app,
        Method::POST,
        "/api/instances",
        Some(json!({ "name": "x".repeat(101), "contacts": ["1"], "message": "Hi" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = call(
        &app,
        Method::POST,
        "/api/instances",
        Some(json!({ "name": "Sales", "contacts": [], "message": "Hi" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["field"], "contacts");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let (_harness, app) = setup(MockProvider::new()).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/instances")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_store_lists_no_instances() {
    let (_harness, app) = setup(MockProvider::new()).await;

    let reply = call(&app, Method::GET, "/api/instances", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({ "instances": [] }));
}

#[tokio::test]
async fn get_list_update_delete() {
    let (_harness, app) = setup(MockProvider::new()).await;
    create(&app, "First").await;
    let second = create(&app, "Second").await;
    let id = second["id"].as_str().unwrap().to_string();

    let list = call(&app, Method::GET, "/api/instances", None).await;
    assert_eq!(list.status, StatusCode::OK);
    let instances = list.json()["instances"].as_array().unwrap().clone();
    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0]["name"], "Second");

    let got = call(&app, Method::GET, &format!("/api/instances/{id}"), None).await;
    assert_eq!(got.status, StatusCode::OK);
    assert_eq!(got.json()["name"], "Second");

    let updated = call(
        &app,
        Method::PUT,
        &format!("/api/instances/{id}"),
        Some(json!({ "name": "Renamed", "contacts": ["1", "2"], "message": "Bye" })),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    let body = updated.json();
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["contacts"], json!(["1", "2"]));
    assert_eq!(body["api_status"], "created");

    let deleted = call(&app, Method::DELETE, &format!("/api/instances/{id}"), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.json(), json!({ "status": "deleted" }));

    let gone = call(&app, Method::GET, &format!("/api/instances/{id}"), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.json()["error"], "not_found");
}

#[tokio::test]
async fn unknown_instance_is_not_found() {
    let (_harness, app) = setup(MockProvider::new()).await;

    let update = call(
        &app,
        Method::PUT,
        "/api/instances/missing",
        Some(json!({ "name": "A", "contacts": ["1"], "message": "m" })),
    )
    .await;
    assert_eq!(update.status, StatusCode::NOT_FOUND);

    let delete = call(&app, Method::DELETE, "/api/instances/missing", None).await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    let start = call(&app, Method::POST, "/api/instances/missing/start", None).await;
    assert_eq!(start.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn start_and_stop_report_transitions() {
    let (_harness, app) = setup(MockProvider::new()).await;
    let id = create(&app, "Sales").await["id"].as_str().unwrap().to_string();

    let start = call(&app, Method::POST, &format!("/api/instances/{id}/start"), None).await;
    assert_eq!(start.status, StatusCode::OK);
    assert_eq!(start.json()["status"], "starting");

    let stop = call(&app, Method::POST, &format!("/api/instances/{id}/stop"), None).await;
    assert_eq!(stop.status, StatusCode::OK);
    assert_eq!(stop.json()["status"], "stopped");

    let view = call(&app, Method::GET, &format!("/api/instances/{id}"), None).await;
    assert_eq!(view.json()["api_status"], "stopped");
}

#[tokio::test]
async fn lifecycle_without_remote_id_is_mapping_not_found() {
    let provider = MockProvider::new();
    provider.set_create_outcome(CreateOutcome::Unsupported).await;
    let (_harness, app) = setup(provider).await;
    let id = create(&app, "Sales").await["id"].as_str().unwrap().to_string();

    for path in ["start", "stop"] {
        let reply = call(&app, Method::POST, &format!("/api/instances/{id}/{path}"), None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(reply.json()["error"], "mapping_not_found");
    }
    let qr = call(&app, Method::GET, &format!("/api/instances/{id}/qr"), None).await;
    assert_eq!(qr.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn provider_failure_is_an_adapter_error() {
    let provider = MockProvider::new();
    let (harness, app) = setup(provider).await;
    let id = create(&app, "Sales").await["id"].as_str().unwrap().to_string();
    harness.provider.fail_lifecycle(true).await;

    let reply = call(&app, Method::POST, &format!("/api/instances/{id}/start"), None).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.json()["error"], "adapter_error");
}

#[tokio::test]
async fn qr_data_uri_is_served_as_png() {
    let (_harness, app) = setup(MockProvider::new()).await;
    let id = create(&app, "Sales").await["id"].as_str().unwrap().to_string();

    let reply = call(&app, Method::GET, &format!("/api/instances/{id}/qr"), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.headers[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        reply.headers[header::CACHE_CONTROL],
        "no-cache, no-store, must-revalidate"
    );
    assert!(reply.bytes.starts_with(b"\x89PNG"));
    assert!(PIXEL_DATA_URI.starts_with("data:image/png"));
}

#[tokio::test]
async fn plain_qr_payload_is_wrapped() {
    let provider = MockProvider::new();
    provider.set_qr(json!({ "qrcode": "2@pairing-code" })).await;
    let (_harness, app) = setup(provider).await;
    let id = create(&app, "Sales").await["id"].as_str().unwrap().to_string();

    let reply = call(&app, Method::GET, &format!("/api/instances/{id}/qr"), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({ "qr": { "qrcode": "2@pairing-code" } }));
}

#[tokio::test]
async fn qr_not_generated_yet_is_not_found() {
    let provider = MockProvider::new();
    let (harness, app) = setup(provider).await;
    let id = create(&app, "Sales").await["id"].as_str().unwrap().to_string();

    for payload in [json!({}), json!({ "status": "pending" }), json!({ "qrcode": "" }), Value::Null] {
        harness.provider.set_qr(payload.clone()).await;
        let reply = call(&app, Method::GET, &format!("/api/instances/{id}/qr"), None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND, "{payload}");
        assert_eq!(reply.json()["error"], "not_found");
    }
}

#[tokio::test]
async fn newest_qr_redirects_or_404s() {
    let (_harness, app) = setup(MockProvider::new()).await;

    let none = call(&app, Method::GET, "/api/qr", None).await;
    assert_eq!(none.status, StatusCode::NOT_FOUND);

    create(&app, "Old").await;
    let newest = create(&app, "New").await["id"].as_str().unwrap().to_string();

    let reply = call(&app, Method::GET, "/api/qr", None).await;
    assert_eq!(reply.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        reply.headers[header::LOCATION],
        format!("/api/instances/{newest}/qr").as_str()
    );
}

#[tokio::test]
async fn status_poll_persists_observation() {
    let provider = MockProvider::new();
    provider
        .set_status(json!({ "connected": false, "status": "qr_pending" }))
        .await;
    let (_harness, app) = setup(provider).await;
    let id = create(&app, "Sales").await["id"].as_str().unwrap().to_string();

    let reply = call(&app, Method::GET, &format!("/api/instances/{id}/status"), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["connected"], false);
    assert_eq!(body["status"], "qr_pending");
    assert_eq!(body["details"]["status"], "qr_pending");

    let view = call(&app, Method::GET, &format!("/api/instances/{id}"), None).await;
    assert_eq!(view.json()["api_status"], "disconnected");
}

#[tokio::test]
async fn immediate_send_returns_provider_result() {
    let (harness, app) = setup(MockProvider::new()).await;
    let id = create(&app, "Sales").await["id"].as_str().unwrap().to_string();

    let reply = call(
        &app,
        Method::POST,
        &format!("/api/instances/{id}/send"),
        Some(json!({ "to": "5511", "message": "hello" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["result"]["messageId"], "msg-5511");
    assert_eq!(
        harness.provider.sent().await,
        vec![("5511".to_string(), "hello".to_string())]
    );

    let empty = call(
        &app,
        Method::POST,
        &format!("/api/instances/{id}/send"),
        Some(json!({ "to": "5511", "message": "  " })),
    )
    .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn batch_send_is_accepted_and_pollable() {
    let (_harness, app) = setup(MockProvider::new()).await;
    let id = create(&app, "Sales").await["id"].as_str().unwrap().to_string();

    let reply = call(
        &app,
        Method::POST,
        "/api/send",
        Some(json!({ "contacts": ["a", "b"], "message": "hello" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::ACCEPTED);
    let accepted = reply.json();
    assert_eq!(accepted["status"], "queued");
    assert_eq!(accepted["instance_id"], id.as_str());
    let job_id = accepted["job_id"].as_str().unwrap().to_string();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    let job = loop {
        let job = call(&app, Method::GET, &format!("/api/job/{job_id}"), None).await;
        assert_eq!(job.status, StatusCode::OK);
        let body = job.json();
        if body["status"] == "finished" || body["status"] == "failed" {
            break body;
        }
        assert!(tokio::time::Instant::now() < deadline, "job did not finish");
        tokio::time::sleep(Duration::from_millis(10)).await;
    };
    assert_eq!(job["status"], "finished");
    assert_eq!(job["result"], "2 succeeded, 0 failed");
}

#[tokio::test]
async fn batch_send_without_instances_is_not_found() {
    let (_harness, app) = setup(MockProvider::new()).await;

    let reply = call(
        &app,
        Method::POST,
        "/api/send",
        Some(json!({ "contacts": ["a"], "message": "hello" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let invalid = call(
        &app,
        Method::POST,
        "/api/send",
        Some(json!({ "contacts": [], "message": "hello" })),
    )
    .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let (_harness, app) = setup(MockProvider::new()).await;
    let reply = call(&app, Method::GET, "/api/job/nope", None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn webhook_updates_mapping_status() {
    let (_harness, app) = setup(MockProvider::new()).await;
    let view = create(&app, "Sales").await;
    let id = view["id"].as_str().unwrap().to_string();
    let remote_id = view["api_instance_id"].as_str().unwrap().to_string();

    let reply = call(
        &app,
        Method::POST,
        "/api/zapi/webhook",
        Some(json!({ "instanceId": remote_id, "event": "connected" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({ "ok": true, "status": "connected" }));

    let view = call(&app, Method::GET, &format!("/api/instances/{id}"), None).await.json();
    assert_eq!(view["api_status"], "connected");
    assert_eq!(view["api_response"]["last_event"]["event"], "connected");
}

#[tokio::test]
async fn webhook_rejects_bad_payloads() {
    let (_harness, app) = setup(MockProvider::new()).await;

    let missing = call(&app, Method::POST, "/api/zapi/webhook", Some(json!({ "event": "x" }))).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let unknown = call(
        &app,
        Method::POST,
        "/api/zapi/webhook",
        Some(json!({ "instanceId": "ghost", "connected": true })),
    )
    .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.json()["error"], "mapping_not_found");
}

#[tokio::test]
async fn health_reports_dependencies() {
    let (harness, app) = setup(MockProvider::new()).await;
    create(&app, "Sales").await;

    let reply = call(&app, Method::GET, "/api/health", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["instances_count"], 1);
    assert_eq!(body["storage"], "available");
    assert_eq!(body["api_status"], "available");
    assert!(body["timestamp"].as_str().is_some());
    assert!(body["version"].as_str().is_some());
    assert!(body["uptime"].as_u64().is_some());
    assert!(body.get("uptime_secs").is_none());

    harness.provider.set_healthy(false).await;
    let body = call(&app, Method::GET, "/api/health", None).await.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["api_status"], "unavailable");
}
