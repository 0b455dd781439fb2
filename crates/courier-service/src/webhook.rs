// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound provider events.
//!
//! The read-modify-write of the mapping's response document is not
//! isolated: concurrent deliveries for one mapping race and the last write wins.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use courier_core::{CourierError, MappingStatus, StorageAdapter};

#[derive(Clone)]
pub struct WebhookReconciler {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
}

impl WebhookReconciler {
    pub fn new(storage: Arc<dyn StorageAdapter + Send + Sync>) -> Self {
        Self { storage }
    }

    /// Apply one event and return the mapping's resulting status.
    pub async fn handle(&self, payload: &Value) -> Result<MappingStatus, CourierError> {
        let remote_id = payload
            .get("instanceId")
            .and_then(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .ok_or_else(|| CourierError::validation("instanceId", "invalid payload"))?;

        let mapping = self
            .storage
            .mapping_by_remote_id(&remote_id)
            .await?
            .ok_or_else(|| {
                warn!(remote_id = %remote_id, "webhook for unknown remote session dropped");
                CourierError::MappingUnavailable("mapping_not_found".into())
            })?;

        let status = next_status(mapping.status, payload);
        let mut document = mapping.response_document();
        document.insert("last_event".to_string(), payload.clone());
        let serialized = Value::Object(document).to_string();

        self.storage
            .update_mapping_response(mapping.id, &serialized, status)
            .await?;
        if !self.storage.touch_instance(&mapping.instance_id).await? {
            warn!(instance_id = %mapping.instance_id, "webhook mapping has no owning instance");
        }

        debug!(remote_id = %remote_id, %status, "webhook applied");
        Ok(status)
    }
}

/// A `connected` or `disconnected` event decides the status; otherwise
/// `connected: true` connects. Anything else keeps `current`.
pub fn next_status(current: MappingStatus, payload: &Value) -> MappingStatus {
    let event = payload.get("event").and_then(Value::as_str);
    let flag = payload.get("connected").and_then(Value::as_bool);
    match (event, flag) {
        (Some("connected"), _) => MappingStatus::Connected,
        (Some("disconnected"), _) => MappingStatus::Disconnected,
        (_, Some(true)) => MappingStatus::Connected,
        _ => current,
    }
}
