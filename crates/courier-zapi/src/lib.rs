// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote messaging provider adapter.
//!
//! Implements [`ProviderAdapter`] by probing known endpoint shapes in
//! priority order. A failed candidate is logged and the next one is tried;
//! only when every candidate fails does the operation return an error.

pub mod candidates;
pub mod client;

use async_trait::async_trait;
use courier_config::model::ProviderConfig;
use courier_core::{
    AdapterType, CourierError, HealthStatus, OutboundMessage, PluginAdapter, ProviderAdapter,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::candidates::Candidate;
use crate::client::{RemoteFailure, ZapiClient};

/// HTTP provider implementing [`ProviderAdapter`].
pub struct ZapiProvider {
    client: ZapiClient,
}

impl ZapiProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, CourierError> {
        let client = ZapiClient::new(config)?;
        info!(
            base_url = client.base_url(),
            authenticated = config.token.is_some(),
            "provider client initialized"
        );
        Ok(Self { client })
    }

    #[cfg(test)]
    fn with_client(client: ZapiClient) -> Self {
        Self { client }
    }

    /// Try `candidates` in order, returning the first success.
    async fn first_success(
        &self,
        operation: &str,
        candidates: Vec<Candidate>,
    ) -> Result<Value, CourierError> {
        let mut last: Option<RemoteFailure> = None;

        for candidate in candidates {
            let query: Vec<(&str, &str)> = candidate
                .query
                .iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            let url = self.client.url(&candidate.path, &query)?;

            match self
                .client
                .request(candidate.method.clone(), url, candidate.body.as_ref())
                .await
            {
                Ok(value) => {
                    debug!(operation, path = %candidate.path, "candidate succeeded");
                    return Ok(value);
                }
                Err(failure) => {
                    debug!(operation, path = %candidate.path, error = %failure.message, "candidate failed");
                    last = Some(failure);
                }
            }
        }

        let (status, body, detail) = match last {
            Some(f) => (f.status.map(|s| s.as_u16()), f.body, f.message),
            None => (None, None, "no candidate endpoints".to_string()),
        };
        warn!(operation, ?status, "all provider endpoints failed");
        Err(CourierError::Adapter {
            message: format!("{operation}: {detail}"),
            status,
            body,
        })
    }
}

#[async_trait]
impl PluginAdapter for ZapiProvider {
    fn name(&self) -> &str {
        "zapi"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        Ok(match self.client.ping().await {
            Ok(status) if status.is_success() => HealthStatus::Healthy,
            Ok(status) => HealthStatus::Unhealthy(format!("provider answered {status}")),
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for ZapiProvider {
    async fn create_instance(&self, name: &str) -> Result<Option<Value>, CourierError> {
        match self
            .first_success("create instance", candidates::create(name))
            .await
        {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(error = %e, "remote provisioning unavailable");
                Ok(None)
            }
        }
    }

    async fn start_instance(&self, remote_id: &str) -> Result<Value, CourierError> {
        self.first_success("start operation unavailable", candidates::start(remote_id))
            .await
    }

    async fn stop_instance(&self, remote_id: &str) -> Result<Value, CourierError> {
        self.first_success("stop operation unavailable", candidates::stop(remote_id))
            .await
    }

    async fn get_qr_code(&self, remote_id: &str) -> Result<Value, CourierError> {
        self.first_success("QR unavailable", candidates::qr_code(remote_id))
            .await
    }

    async fn get_status(&self, remote_id: &str) -> Result<Value, CourierError> {
        self.first_success("status unavailable", candidates::status(remote_id))
            .await
    }

    async fn send_message(
        &self,
        remote_id: &str,
        message: &OutboundMessage,
    ) -> Result<Value, CourierError> {
        self.first_success("send failed", candidates::send(remote_id, message))
            .await
    }
}
