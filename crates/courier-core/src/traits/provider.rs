// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for the remote messaging service.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CourierError;
use crate::traits::adapter::PluginAdapter;
use crate::types::OutboundMessage;

/// Adapter for the external messaging provider.
///
/// Every operation carries an idempotent intent; implementations may try
/// several remote route shapes before giving up. Results are the provider's
/// opaque JSON documents.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Provisions a remote session. `Ok(None)` means the provider does not
    /// support remote provisioning.
    async fn create_instance(&self, name: &str) -> Result<Option<Value>, CourierError>;

    /// Starts (or pings) the remote session.
    async fn start_instance(&self, remote_id: &str) -> Result<Value, CourierError>;

    /// Stops (or tears down) the remote session.
    async fn stop_instance(&self, remote_id: &str) -> Result<Value, CourierError>;

    /// Fetches the pairing QR payload.
    async fn get_qr_code(&self, remote_id: &str) -> Result<Value, CourierError>;

    /// Fetches the remote connection status document.
    async fn get_status(&self, remote_id: &str) -> Result<Value, CourierError>;

    /// Sends one message through the remote session.
    async fn send_message(
        &self,
        remote_id: &str,
        message: &OutboundMessage,
    ) -> Result<Value, CourierError>;
}
