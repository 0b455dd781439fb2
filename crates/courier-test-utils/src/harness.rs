// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` wires a temp SQLite store and a [`MockProvider`] into a
//! [`CourierService`]. The temp directory lives as long as the harness.

use std::sync::Arc;
use std::time::Duration;

use courier_config::model::{DispatchConfig, StorageConfig};
use courier_core::{CourierError, InstanceView, Job, StorageAdapter};
use courier_service::{CourierService, InstanceInput};
use courier_storage::SqliteStorage;

use crate::mock_provider::MockProvider;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    send_interval_ms: u64,
    provider: MockProvider,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            send_interval_ms: 0,
            provider: MockProvider::new(),
        }
    }

    /// Pause between sends. Defaults to zero so job tests run fast.
    pub fn with_send_interval_ms(mut self, ms: u64) -> Self {
        self.send_interval_ms = ms;
        self
    }

    /// Use a pre-scripted provider.
    pub fn with_provider(mut self, provider: MockProvider) -> Self {
        self.provider = provider;
        self
    }

    pub async fn build(self) -> Result<TestHarness, CourierError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| CourierError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        });
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter + Send + Sync> = Arc::new(storage);

        let provider = Arc::new(self.provider);
        let dispatch = DispatchConfig {
            send_interval_ms: self.send_interval_ms,
        };
        let service = CourierService::new(storage.clone(), provider.clone(), &dispatch);

        Ok(TestHarness {
            provider,
            storage,
            service,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock provider and temp storage.
pub struct TestHarness {
    /// The scripted provider.
    pub provider: Arc<MockProvider>,
    /// SQLite storage adapter (temp DB, cleaned up on drop).
    pub storage: Arc<dyn StorageAdapter + Send + Sync>,
    pub service: CourierService,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Create an instance through the lifecycle manager.
    pub async fn create_instance(
        &self,
        name: &str,
        contacts: &[&str],
    ) -> Result<InstanceView, CourierError> {
        self.service
            .lifecycle
            .create(InstanceInput {
                name: name.to_string(),
                contacts: contacts.iter().map(|c| c.to_string()).collect(),
                message: format!("Hello from {name}"),
                provider: None,
            })
            .await
    }

    /// Poll a job until it reaches a terminal state or `timeout` elapses.
    pub async fn wait_for_job(&self, job_id: &str, timeout: Duration) -> Result<Job, CourierError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let job = self.service.dispatcher.get_job(job_id).await?;
            if job.status.is_terminal() {
                return Ok(job);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(CourierError::Timeout { duration: timeout });
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}
