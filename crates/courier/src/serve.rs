// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `courier serve`: wire storage, provider, services, and the HTTP gateway.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use courier_config::CourierConfig;
use courier_core::{CourierError, PluginAdapter, StorageAdapter};
use courier_gateway::{start_server, GatewayState};
use courier_service::{shutdown, CourierService};
use courier_storage::SqliteStorage;
use courier_zapi::ZapiProvider;

/// Upper bound on waiting for in-flight send jobs at shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the backend until SIGINT or SIGTERM.
pub async fn run_serve(config: CourierConfig) -> Result<(), CourierError> {
    init_tracing(&config.server.log_level);

    info!("starting courier serve");

    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let storage = Arc::new(storage);

    let provider = Arc::new(ZapiProvider::new(&config.provider)?);

    let service = CourierService::new(storage.clone(), provider.clone(), &config.dispatch);
    let state = GatewayState::new(service.clone());

    let cancel = shutdown::install_signal_handler();
    let served = start_server(&config.server, state, cancel.clone()).await;
    if let Err(e) = &served {
        error!(error = %e, "gateway stopped with an error");
        cancel.cancel();
    }

    service.dispatcher.drain(DRAIN_TIMEOUT).await;

    if let Err(e) = provider.shutdown().await {
        error!(error = %e, "provider shutdown failed");
    }
    storage.close().await?;

    info!("courier serve shutdown complete");
    served
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("courier={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
