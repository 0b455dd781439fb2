// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Business logic for the Courier backend.
//!
//! Wires a [`StorageAdapter`] and a [`ProviderAdapter`] into the instance
//! lifecycle manager, the send-job dispatcher, and the webhook reconciler.

pub mod dispatch;
pub mod health;
pub mod lifecycle;
pub mod shutdown;
pub mod validation;
pub mod webhook;

use std::sync::Arc;

use courier_config::model::DispatchConfig;
use courier_core::{ProviderAdapter, StorageAdapter};

pub use dispatch::{Accepted, Dispatcher, SendSummary};
pub use health::{HealthReporter, HealthSnapshot};
pub use lifecycle::{InstanceInput, LifecycleManager, Transition};
pub use webhook::WebhookReconciler;

/// All services sharing one store and one provider.
#[derive(Clone)]
pub struct CourierService {
    pub lifecycle: LifecycleManager,
    pub dispatcher: Dispatcher,
    pub webhooks: WebhookReconciler,
    pub health: HealthReporter,
}

impl CourierService {
    pub fn new(
        storage: Arc<dyn StorageAdapter + Send + Sync>,
        provider: Arc<dyn ProviderAdapter + Send + Sync>,
        dispatch: &DispatchConfig,
    ) -> Self {
        Self {
            lifecycle: LifecycleManager::new(storage.clone(), provider.clone()),
            dispatcher: Dispatcher::new(storage.clone(), provider.clone(), dispatch.send_interval()),
            webhooks: WebhookReconciler::new(storage.clone()),
            health: HealthReporter::new(storage, provider),
        }
    }
}
