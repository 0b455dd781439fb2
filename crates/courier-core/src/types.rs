// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entity types shared across the store, the provider adapter, and the HTTP surface.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Maximum display name length, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum message template length, in characters.
pub const MAX_MESSAGE_LEN: usize = 1000;

/// Provider name applied when an instance is created without one.
pub const DEFAULT_PROVIDER: &str = "remote";

/// Separator used to persist the contact list as a single column.
pub const CONTACT_SEPARATOR: char = ',';

/// Current UTC time in the format used for every persisted timestamp.
///
/// Matches SQLite's `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')` so rows written
/// from Rust and rows touched from SQL sort together.
pub fn timestamp_now() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

impl HealthStatus {
    /// Short label used in health responses.
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "available",
            HealthStatus::Degraded(_) => "degraded",
            HealthStatus::Unhealthy(_) => "unavailable",
        }
    }
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
}

/// Lifecycle state of a provider mapping.
///
/// `created → starting → connected ⇄ disconnected`, plus `stopped` and `error`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MappingStatus {
    Created,
    Connecting,
    Starting,
    Connected,
    Disconnected,
    Stopped,
    Error,
}

/// Lifecycle state of a send job. `finished` and `failed` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Finished,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Failed)
    }
}

/// A named contact list plus message template owned by this system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub name: String,
    pub contacts: Vec<String>,
    pub message: String,
    pub provider: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A mapping row linking an [`Instance`] to a session on the remote provider.
///
/// Several rows may exist per instance; the one with the greatest
/// `(created_at, id)` is authoritative.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderMapping {
    pub id: i64,
    pub instance_id: String,
    pub provider: String,
    pub remote_instance_id: Option<String>,
    pub remote_token: Option<String>,
    /// Last raw provider document, serialized JSON.
    pub response: Option<String>,
    pub webhook_url: Option<String>,
    pub status: MappingStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl ProviderMapping {
    /// The parsed response document, or an empty object if absent or unparseable.
    pub fn response_document(&self) -> serde_json::Map<String, serde_json::Value> {
        self.response
            .as_deref()
            .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw).ok())
            .and_then(|value| match value {
                serde_json::Value::Object(map) => Some(map),
                _ => None,
            })
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for ProviderMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderMapping")
            .field("id", &self.id)
            .field("instance_id", &self.instance_id)
            .field("provider", &self.provider)
            .field("remote_instance_id", &self.remote_instance_id)
            .field("remote_token", &self.remote_token.as_ref().map(|_| "[redacted]"))
            .field("status", &self.status)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Values for a mapping row that has not been assigned a surrogate key yet.
#[derive(Clone)]
pub struct NewMapping {
    pub instance_id: String,
    pub provider: String,
    pub remote_instance_id: Option<String>,
    pub remote_token: Option<String>,
    pub response: Option<String>,
    pub webhook_url: Option<String>,
    pub status: MappingStatus,
    pub created_at: String,
}

/// A tracked asynchronous batch send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub result: Option<String>,
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A single outbound text message as sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl OutboundMessage {
    pub fn text(to: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            text: text.into(),
            kind: "text".to_string(),
        }
    }
}

/// An instance merged with the fields of its current mapping.
///
/// The remote auth token is deliberately absent.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceView {
    #[serde(flatten)]
    pub instance: Instance,
    pub api_instance_id: Option<String>,
    pub api_status: Option<MappingStatus>,
    pub api_response: Option<serde_json::Value>,
    pub api_error: Option<String>,
}

impl InstanceView {
    /// Merge `instance` with `mapping` (the current one, if any).
    pub fn merge(instance: Instance, mapping: Option<&ProviderMapping>) -> Self {
        let Some(mapping) = mapping else {
            return Self {
                instance,
                api_instance_id: None,
                api_status: None,
                api_response: None,
                api_error: None,
            };
        };

        let document = mapping.response_document();
        let api_error = match mapping.status {
            MappingStatus::Error => document
                .get("error")
                .and_then(|e| e.as_str())
                .map(str::to_string),
            _ => None,
        };

        Self {
            instance,
            api_instance_id: mapping.remote_instance_id.clone(),
            api_status: Some(mapping.status),
            api_response: Some(serde_json::Value::Object(document)),
            api_error,
        }
    }
}

/// A freshly observed remote connection state.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub connected: bool,
    pub status: String,
    pub details: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn mapping(status: MappingStatus, response: Option<&str>) -> ProviderMapping {
        ProviderMapping {
            id: 1,
            instance_id: "inst-1".into(),
            provider: "remote".into(),
            remote_instance_id: Some("zapi-1".into()),
            remote_token: Some("tok-secret".into()),
            response: response.map(str::to_string),
            webhook_url: None,
            status,
            created_at: "2026-01-01T00:00:00.000Z".into(),
            updated_at: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    fn instance() -> Instance {
        Instance {
            id: "inst-1".into(),
            name: "Sales".into(),
            contacts: vec!["5511999999999".into()],
            message: "Hi".into(),
            provider: DEFAULT_PROVIDER.into(),
            created_at: "2026-01-01T00:00:00.000Z".into(),
            updated_at: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn mapping_status_uses_snake_case_text() {
        assert_eq!(MappingStatus::Disconnected.to_string(), "disconnected");
        assert_eq!(
            MappingStatus::from_str("starting").unwrap(),
            MappingStatus::Starting
        );
        assert!(MappingStatus::from_str("bogus").is_err());
    }

    #[test]
    fn job_status_terminal_states() {
        assert!(JobStatus::Finished.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }

    #[test]
    fn timestamp_has_millisecond_precision() {
        let ts = timestamp_now();
        assert_eq!(ts.len(), "2026-01-01T00:00:00.000Z".len());
        assert!(ts.ends_with('Z'));
    }

    #[test]
    fn mapping_debug_redacts_token() {
        let debug = format!("{:?}", mapping(MappingStatus::Created, None));
        assert!(!debug.contains("tok-secret"));
        assert!(debug.contains("[redacted]"));
    }

    #[test]
    fn response_document_tolerates_garbage() {
        let m = mapping(MappingStatus::Created, Some("not json"));
        assert!(m.response_document().is_empty());
        let m = mapping(MappingStatus::Created, Some("[1,2]"));
        assert!(m.response_document().is_empty());
    }

    #[test]
    fn view_surfaces_error_detail_only_for_error_status() {
        let failed = mapping(MappingStatus::Error, Some(r#"{"error":"boom"}"#));
        let view = InstanceView::merge(instance(), Some(&failed));
        assert_eq!(view.api_error.as_deref(), Some("boom"));
        assert_eq!(view.api_status, Some(MappingStatus::Error));

        let ok = mapping(MappingStatus::Created, Some(r#"{"error":"stale"}"#));
        let view = InstanceView::merge(instance(), Some(&ok));
        assert!(view.api_error.is_none());
    }

    #[test]
    fn view_serializes_flat_without_token() {
        let view = InstanceView::merge(instance(), Some(&mapping(MappingStatus::Created, None)));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["name"], "Sales");
        assert_eq!(json["api_status"], "created");
        assert_eq!(json["api_instance_id"], "zapi-1");
        assert!(!json.to_string().contains("tok-secret"));
    }

    #[test]
    fn outbound_message_serializes_type_field() {
        let json = serde_json::to_value(OutboundMessage::text("551199", "hello")).unwrap();
        assert_eq!(json, serde_json::json!({"to": "551199", "text": "hello", "type": "text"}));
    }
}
