// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instance lifecycle: CRUD plus remote session start, stop, QR, and status.
//!
//! Every operation re-reads from the store. Nothing is cached between calls.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use courier_core::types::{timestamp_now, DEFAULT_PROVIDER};
use courier_core::{
    CourierError, Instance, InstanceView, MappingStatus, NewMapping, OutboundMessage,
    ProviderAdapter, ProviderMapping, StatusReport, StorageAdapter,
};

use crate::validation::{validate_instance, validate_message};

/// Body of a create or update request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstanceInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contacts: Vec<String>,
    #[serde(default)]
    pub message: String,
    /// Ignored on update.
    #[serde(default)]
    pub provider: Option<String>,
}

/// Outcome of a start or stop.
#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub status: MappingStatus,
    pub result: Value,
}

/// Keys checked, in order, for the remote session id in a create response.
const REMOTE_ID_KEYS: [&str; 3] = ["instanceId", "id", "sessionId"];

#[derive(Clone)]
pub struct LifecycleManager {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
    provider: Arc<dyn ProviderAdapter + Send + Sync>,
}

impl LifecycleManager {
    pub fn new(
        storage: Arc<dyn StorageAdapter + Send + Sync>,
        provider: Arc<dyn ProviderAdapter + Send + Sync>,
    ) -> Self {
        Self { storage, provider }
    }

    /// Create an instance and attempt remote provisioning.
    ///
    /// The instance row is kept whatever the provider does. Exactly one
    /// mapping row is written, recording either the remote session or the
    /// reason provisioning failed.
    pub async fn create(&self, input: InstanceInput) -> Result<InstanceView, CourierError> {
        validate_instance(&input.name, &input.contacts, &input.message)?;

        let now = timestamp_now();
        let provider = input
            .provider
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());
        let instance = Instance {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name,
            contacts: input.contacts,
            message: input.message,
            provider: provider.clone(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };
        self.storage.create_instance(&instance).await?;
        info!(instance_id = %instance.id, "instance created");

        let outcome = self.provider.create_instance(&instance.name).await;
        let mapping = mapping_from_outcome(&instance.id, &provider, &now, outcome);
        if mapping.status == MappingStatus::Error {
            warn!(instance_id = %instance.id, "remote provisioning failed, mapping recorded as error");
        }
        self.storage.insert_mapping(&mapping).await?;

        self.get(&instance.id).await
    }

    pub async fn get(&self, id: &str) -> Result<InstanceView, CourierError> {
        let instance = self
            .storage
            .get_instance(id)
            .await?
            .ok_or_else(|| CourierError::NotFound(format!("instance {id}")))?;
        let mapping = self.storage.current_mapping(id).await?;
        Ok(InstanceView::merge(instance, mapping.as_ref()))
    }

    /// All instances, newest first, each merged with its current mapping.
    pub async fn list(&self) -> Result<Vec<InstanceView>, CourierError> {
        let instances = self.storage.list_instances().await?;
        let mut views = Vec::with_capacity(instances.len());
        for instance in instances {
            let mapping = self.storage.current_mapping(&instance.id).await?;
            views.push(InstanceView::merge(instance, mapping.as_ref()));
        }
        Ok(views)
    }

    /// The most recently created instance, if any.
    pub async fn newest(&self) -> Result<Option<Instance>, CourierError> {
        self.storage.newest_instance().await
    }

    /// Replace name, contacts, and message. Mappings are untouched.
    pub async fn update(&self, id: &str, input: InstanceInput) -> Result<InstanceView, CourierError> {
        validate_instance(&input.name, &input.contacts, &input.message)?;
        let updated = self
            .storage
            .update_instance(id, &input.name, &input.contacts, &input.message)
            .await?;
        if !updated {
            return Err(CourierError::NotFound(format!("instance {id}")));
        }
        self.get(id).await
    }

    /// Tear down the remote session (best effort), then remove mappings and the instance.
    pub async fn delete(&self, id: &str) -> Result<(), CourierError> {
        if self.storage.get_instance(id).await?.is_none() {
            return Err(CourierError::NotFound(format!("instance {id}")));
        }

        if let Some(remote_id) = self
            .storage
            .current_mapping(id)
            .await?
            .and_then(|m| m.remote_instance_id)
            && let Err(e) = self.provider.stop_instance(&remote_id).await
        {
            warn!(instance_id = id, remote_id = %remote_id, error = %e, "remote teardown failed");
        }

        let removed = self.storage.delete_mappings(id).await?;
        self.storage.delete_instance(id).await?;
        info!(instance_id = id, mappings = removed, "instance deleted");
        Ok(())
    }

    pub async fn start(&self, id: &str) -> Result<Transition, CourierError> {
        let (mapping, remote_id) = self.remote_mapping(id).await?;
        let result = self.provider.start_instance(&remote_id).await?;
        self.storage
            .update_mapping_status(mapping.id, MappingStatus::Starting)
            .await?;
        debug!(instance_id = id, remote_id = %remote_id, "remote session starting");
        Ok(Transition {
            status: MappingStatus::Starting,
            result,
        })
    }

    pub async fn stop(&self, id: &str) -> Result<Transition, CourierError> {
        let (mapping, remote_id) = self.remote_mapping(id).await?;
        let result = self.provider.stop_instance(&remote_id).await?;
        self.storage
            .update_mapping_status(mapping.id, MappingStatus::Stopped)
            .await?;
        debug!(instance_id = id, remote_id = %remote_id, "remote session stopped");
        Ok(Transition {
            status: MappingStatus::Stopped,
            result,
        })
    }

    /// The raw pairing payload from the provider.
    pub async fn get_qr(&self, id: &str) -> Result<Value, CourierError> {
        let (_, remote_id) = self.remote_mapping(id).await?;
        self.provider.get_qr_code(&remote_id).await
    }

    /// Poll the remote status and persist the observed connection state.
    pub async fn get_status(&self, id: &str) -> Result<StatusReport, CourierError> {
        let (mapping, remote_id) = self.remote_mapping(id).await?;
        let details = self.provider.get_status(&remote_id).await?;

        let connected = details.get("connected").and_then(Value::as_bool) == Some(true);
        let status = details
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let observed = if connected {
            MappingStatus::Connected
        } else {
            MappingStatus::Disconnected
        };
        self.storage.update_mapping_status(mapping.id, observed).await?;

        Ok(StatusReport {
            connected,
            status,
            details,
        })
    }

    /// Send a single message right away through the instance's session.
    pub async fn send_now(&self, id: &str, to: &str, message: &str) -> Result<Value, CourierError> {
        if to.trim().is_empty() {
            return Err(CourierError::validation("to", "recipient is required"));
        }
        validate_message(message)?;
        let (_, remote_id) = self.remote_mapping(id).await?;
        self.provider
            .send_message(&remote_id, &OutboundMessage::text(to, message))
            .await
    }

    /// The current mapping and its remote id, or `MappingUnavailable`.
    pub(crate) async fn remote_mapping(
        &self,
        id: &str,
    ) -> Result<(ProviderMapping, String), CourierError> {
        let mapping = self
            .storage
            .current_mapping(id)
            .await?
            .ok_or_else(|| CourierError::MappingUnavailable(format!("instance {id} has no mapping")))?;
        let remote_id = mapping.remote_instance_id.clone().ok_or_else(|| {
            CourierError::MappingUnavailable(format!("instance {id} has no remote session"))
        })?;
        Ok((mapping, remote_id))
    }
}

fn mapping_from_outcome(
    instance_id: &str,
    provider: &str,
    now: &str,
    outcome: Result<Option<Value>, CourierError>,
) -> NewMapping {
    let mut mapping = NewMapping {
        instance_id: instance_id.to_string(),
        provider: provider.to_string(),
        remote_instance_id: None,
        remote_token: None,
        response: None,
        webhook_url: None,
        status: MappingStatus::Error,
        created_at: now.to_string(),
    };

    match outcome {
        Ok(Some(doc)) => {
            mapping.remote_instance_id = REMOTE_ID_KEYS
                .iter()
                .find_map(|key| doc.get(*key).and_then(id_text));
            mapping.remote_token = doc.get("token").and_then(Value::as_str).map(str::to_string);
            mapping.response = Some(doc.to_string());
            mapping.status = MappingStatus::Created;
        }
        Ok(None) => {
            mapping.response =
                Some(json!({"error": "remote provisioning is not supported"}).to_string());
        }
        Err(e) => {
            mapping.response = Some(json!({"error": e.to_string()}).to_string());
        }
    }
    mapping
}

/// Strings and numbers are both accepted as identifiers.
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
