// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted provider adapter for deterministic testing.
//!
//! `MockProvider` answers every [`ProviderAdapter`] call from in-memory
//! state that tests can change between calls, and records the calls it
//! received in order.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use courier_core::traits::adapter::PluginAdapter;
use courier_core::traits::provider::ProviderAdapter;
use courier_core::types::{AdapterType, HealthStatus, OutboundMessage};
use courier_core::CourierError;

/// A 1x1 transparent PNG as a data URI.
pub const PIXEL_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// What `create_instance` answers with.
#[derive(Debug, Clone)]
pub enum CreateOutcome {
    /// Provision a session with a generated `mock-<n>` id.
    Provision,
    /// Return this exact document.
    Document(Value),
    /// Provider does not support provisioning (`Ok(None)`).
    Unsupported,
    /// Fail with an adapter error carrying this message.
    Fail(String),
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Create { name: String },
    Start { remote_id: String },
    Stop { remote_id: String },
    QrCode { remote_id: String },
    Status { remote_id: String },
    Send { remote_id: String, to: String, text: String },
}

#[derive(Debug)]
struct Script {
    create: CreateOutcome,
    failing_contacts: HashSet<String>,
    fail_lifecycle: bool,
    status: Value,
    qr: Value,
    healthy: bool,
}

/// A provider adapter driven entirely by test-controlled state.
#[derive(Clone)]
pub struct MockProvider {
    script: Arc<Mutex<Script>>,
    calls: Arc<Mutex<Vec<ProviderCall>>>,
    counter: Arc<AtomicU64>,
}

impl MockProvider {
    /// Provisions sessions, reports `connected`, and succeeds every send.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                create: CreateOutcome::Provision,
                failing_contacts: HashSet::new(),
                fail_lifecycle: false,
                status: json!({"connected": true, "status": "connected"}),
                qr: json!({"qrcode": PIXEL_DATA_URI}),
                healthy: true,
            })),
            calls: Arc::new(Mutex::new(Vec::new())),
            counter: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn set_create_outcome(&self, outcome: CreateOutcome) {
        self.script.lock().await.create = outcome;
    }

    /// Sends to any contact in `contacts` fail.
    pub async fn fail_sends_to<I, S>(&self, contacts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut script = self.script.lock().await;
        script
            .failing_contacts
            .extend(contacts.into_iter().map(Into::into));
    }

    /// Makes start, stop, QR, and status calls fail.
    pub async fn fail_lifecycle(&self, fail: bool) {
        self.script.lock().await.fail_lifecycle = fail;
    }

    pub async fn set_status(&self, status: Value) {
        self.script.lock().await.status = status;
    }

    pub async fn set_qr(&self, qr: Value) {
        self.script.lock().await.qr = qr;
    }

    pub async fn set_healthy(&self, healthy: bool) {
        self.script.lock().await.healthy = healthy;
    }

    /// Every call received so far, in order.
    pub async fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().await.clone()
    }

    /// Recorded sends only, as `(to, text)` pairs.
    pub async fn sent(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                ProviderCall::Send { to, text, .. } => Some((to.clone(), text.clone())),
                _ => None,
            })
            .collect()
    }

    async fn record(&self, call: ProviderCall) {
        self.calls.lock().await.push(call);
    }

    async fn lifecycle_result(&self, operation: &str, ok: Value) -> Result<Value, CourierError> {
        if self.script.lock().await.fail_lifecycle {
            return Err(CourierError::Adapter {
                message: format!("{operation} unavailable"),
                status: Some(503),
                body: Some(json!({"error": "mock failure"})),
            });
        }
        Ok(ok)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        Ok(if self.script.lock().await.healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy("mock provider unreachable".into())
        })
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn create_instance(&self, name: &str) -> Result<Option<Value>, CourierError> {
        self.record(ProviderCall::Create {
            name: name.to_string(),
        })
        .await;
        let outcome = self.script.lock().await.create.clone();
        match outcome {
            CreateOutcome::Provision => {
                let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(Some(json!({
                    "instanceId": format!("mock-{n}"),
                    "token": format!("mock-token-{n}"),
                })))
            }
            CreateOutcome::Document(doc) => Ok(Some(doc)),
            CreateOutcome::Unsupported => Ok(None),
            CreateOutcome::Fail(message) => Err(CourierError::adapter(message)),
        }
    }

    async fn start_instance(&self, remote_id: &str) -> Result<Value, CourierError> {
        self.record(ProviderCall::Start {
            remote_id: remote_id.to_string(),
        })
        .await;
        self.lifecycle_result("start operation", json!({"started": remote_id}))
            .await
    }

    async fn stop_instance(&self, remote_id: &str) -> Result<Value, CourierError> {
        self.record(ProviderCall::Stop {
            remote_id: remote_id.to_string(),
        })
        .await;
        self.lifecycle_result("stop operation", json!({"stopped": remote_id}))
            .await
    }

    async fn get_qr_code(&self, remote_id: &str) -> Result<Value, CourierError> {
        self.record(ProviderCall::QrCode {
            remote_id: remote_id.to_string(),
        })
        .await;
        let qr = self.script.lock().await.qr.clone();
        self.lifecycle_result("QR", qr).await
    }

    async fn get_status(&self, remote_id: &str) -> Result<Value, CourierError> {
        self.record(ProviderCall::Status {
            remote_id: remote_id.to_string(),
        })
        .await;
        let status = self.script.lock().await.status.clone();
        self.lifecycle_result("status", status).await
    }

    async fn send_message(
        &self,
        remote_id: &str,
        message: &OutboundMessage,
    ) -> Result<Value, CourierError> {
        self.record(ProviderCall::Send {
            remote_id: remote_id.to_string(),
            to: message.to.clone(),
            text: message.text.clone(),
        })
        .await;
        if self.script.lock().await.failing_contacts.contains(&message.to) {
            return Err(CourierError::Adapter {
                message: format!("send failed: {} rejected", message.to),
                status: Some(400),
                body: None,
            });
        }
        Ok(json!({"messageId": format!("msg-{}", message.to)}))
    }
}
