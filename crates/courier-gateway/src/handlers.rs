// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the `/api` surface.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use courier_core::types::timestamp_now;
use courier_core::{CourierError, InstanceView, Job, StatusReport};
use courier_service::{Accepted, InstanceInput, Transition};

use crate::error::ApiError;
use crate::server::GatewayState;

type ApiResult<T> = Result<T, ApiError>;

/// Unwraps a JSON body, turning a malformed body into a 400.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload.map(|Json(value)| value).map_err(ApiError::from)
}

/// Response body for GET /api/instances.
#[derive(Debug, Serialize)]
pub struct InstanceList {
    pub instances: Vec<InstanceView>,
}

/// Request body for POST /api/instances/{id}/send.
#[derive(Debug, Deserialize)]
pub struct SendOneRequest {
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub message: String,
}

/// Request body for POST /api/send.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub contacts: Vec<String>,
    #[serde(default)]
    pub message: String,
}

/// Response body for GET /api/health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since the process started.
    pub uptime: u64,
    pub version: String,
    pub instances_count: i64,
    pub storage: &'static str,
    pub api_status: &'static str,
}

/// GET /api/instances
pub async fn list_instances(State(state): State<GatewayState>) -> ApiResult<Json<InstanceList>> {
    let instances = state.service.lifecycle.list().await?;
    Ok(Json(InstanceList { instances }))
}

/// POST /api/instances
///
/// Returns 201 even when remote provisioning failed; the view then carries
/// `api_status = "error"` and `api_error`.
pub async fn create_instance(
    State(state): State<GatewayState>,
    payload: Result<Json<InstanceInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<InstanceView>)> {
    let input = body(payload)?;
    let view = state.service.lifecycle.create(input).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/instances/{id}
pub async fn get_instance(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<InstanceView>> {
    Ok(Json(state.service.lifecycle.get(&id).await?))
}

/// PUT /api/instances/{id}
pub async fn update_instance(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    payload: Result<Json<InstanceInput>, JsonRejection>,
) -> ApiResult<Json<InstanceView>> {
    let input = body(payload)?;
    Ok(Json(state.service.lifecycle.update(&id, input).await?))
}

/// DELETE /api/instances/{id}
pub async fn delete_instance(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.service.lifecycle.delete(&id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}

/// POST /api/instances/{id}/start
pub async fn start_instance(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Transition>> {
    Ok(Json(state.service.lifecycle.start(&id).await?))
}

/// POST /api/instances/{id}/stop
pub async fn stop_instance(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Transition>> {
    Ok(Json(state.service.lifecycle.stop(&id).await?))
}

/// GET /api/instances/{id}/qr
///
/// 404 while the provider has no `qrcode` to hand out yet.
pub async fn instance_qr(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let payload = state.service.lifecycle.get_qr(&id).await?;
    if !has_qrcode(&payload) {
        return Err(ApiError(CourierError::NotFound(
            "QR code not available or not generated yet".into(),
        )));
    }
    if let Some(image) = decode_data_uri(&payload) {
        return Ok((
            [
                (header::CONTENT_TYPE, "image/png"),
                (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            ],
            image,
        )
            .into_response());
    }
    Ok(Json(json!({ "qr": payload })).into_response())
}

fn has_qrcode(payload: &Value) -> bool {
    match payload.get("qrcode") {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// Decodes `payload.qrcode` when it is a base64 `data:image/...` URI.
fn decode_data_uri(payload: &Value) -> Option<Vec<u8>> {
    let uri = payload.get("qrcode")?.as_str()?;
    let rest = uri.strip_prefix("data:image/")?;
    let (_, encoded) = rest.split_once(";base64,")?;
    base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()
}

/// GET /api/instances/{id}/status
pub async fn instance_status(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StatusReport>> {
    Ok(Json(state.service.lifecycle.get_status(&id).await?))
}

/// POST /api/instances/{id}/send
pub async fn send_one(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    payload: Result<Json<SendOneRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let request = body(payload)?;
    let result = state
        .service
        .lifecycle
        .send_now(&id, &request.to, &request.message)
        .await?;
    Ok(Json(json!({ "ok": true, "result": result })))
}

/// POST /api/send
pub async fn send_batch(
    State(state): State<GatewayState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Accepted>)> {
    let request = body(payload)?;
    let accepted = state
        .service
        .dispatcher
        .dispatch_to_newest(request.contacts, request.message)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(accepted)))
}

/// GET /api/job/{id}
pub async fn get_job(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Job>> {
    Ok(Json(state.service.dispatcher.get_job(&id).await?))
}

/// POST /api/zapi/webhook
pub async fn webhook(
    State(state): State<GatewayState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let event = body(payload)?;
    let status = state.service.webhooks.handle(&event).await?;
    Ok(Json(json!({ "ok": true, "status": status.to_string() })))
}

/// GET /api/qr
///
/// Redirects to the QR endpoint of the newest instance.
pub async fn newest_qr(State(state): State<GatewayState>) -> ApiResult<Redirect> {
    let newest = state
        .service
        .lifecycle
        .newest()
        .await?
        .ok_or_else(|| CourierError::NotFound("no instances".to_string()))?;
    Ok(Redirect::temporary(&format!(
        "/api/instances/{}/qr",
        newest.id
    )))
}

/// GET /api/health
pub async fn health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let snapshot = state.service.health.snapshot().await;
    Json(HealthResponse {
        status: "ok",
        timestamp: timestamp_now(),
        uptime: state.start_time.elapsed().as_secs(),
        version: state.version.clone(),
        instances_count: snapshot.instances_count,
        storage: snapshot.storage,
        api_status: snapshot.api_status,
    })
}
