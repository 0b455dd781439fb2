// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dependency health for the liveness endpoint.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use courier_core::{HealthStatus, ProviderAdapter, StorageAdapter};

/// Store and provider reachability at one point in time.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub instances_count: i64,
    pub storage: &'static str,
    pub api_status: &'static str,
}

#[derive(Clone)]
pub struct HealthReporter {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
    provider: Arc<dyn ProviderAdapter + Send + Sync>,
}

impl HealthReporter {
    pub fn new(
        storage: Arc<dyn StorageAdapter + Send + Sync>,
        provider: Arc<dyn ProviderAdapter + Send + Sync>,
    ) -> Self {
        Self { storage, provider }
    }

    /// Never fails; an unreachable dependency is reported in the snapshot.
    pub async fn snapshot(&self) -> HealthSnapshot {
        let storage = label(self.storage.health_check().await, "storage");
        let api_status = label(self.provider.health_check().await, "provider");
        let instances_count = match self.storage.count_instances().await {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "instance count unavailable");
                0
            }
        };
        HealthSnapshot {
            instances_count,
            storage,
            api_status,
        }
    }
}

fn label(result: Result<HealthStatus, courier_core::CourierError>, what: &str) -> &'static str {
    match result {
        Ok(status) => {
            if let HealthStatus::Degraded(reason) | HealthStatus::Unhealthy(reason) = &status {
                warn!(dependency = what, reason = %reason, "dependency not healthy");
            }
            status.label()
        }
        Err(e) => {
            warn!(dependency = what, error = %e, "health check failed");
            HealthStatus::Unhealthy(e.to_string()).label()
        }
    }
}
