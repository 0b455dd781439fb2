// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::time::Instant;

use axum::{
    routing::{get, post},
    Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use courier_config::ServerConfig;
use courier_core::CourierError;
use courier_service::CourierService;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Business services.
    pub service: CourierService,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
    /// Binary version reported by the health endpoint.
    pub version: String,
}

impl GatewayState {
    pub fn new(service: CourierService) -> Self {
        Self {
            service,
            start_time: Instant::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Build the `/api` router.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route(
            "/api/instances",
            get(handlers::list_instances).post(handlers::create_instance),
        )
        .route(
            "/api/instances/{id}",
            get(handlers::get_instance)
                .put(handlers::update_instance)
                .delete(handlers::delete_instance),
        )
        .route("/api/instances/{id}/start", post(handlers::start_instance))
        .route("/api/instances/{id}/stop", post(handlers::stop_instance))
        .route("/api/instances/{id}/qr", get(handlers::instance_qr))
        .route("/api/instances/{id}/status", get(handlers::instance_status))
        .route("/api/instances/{id}/send", post(handlers::send_one))
        .route("/api/send", post(handlers::send_batch))
        .route("/api/job/{id}", get(handlers::get_job))
        .route("/api/zapi/webhook", post(handlers::webhook))
        .route("/api/qr", get(handlers::newest_qr))
        .route("/api/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the gateway until `shutdown` is cancelled.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), CourierError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CourierError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| CourierError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}
