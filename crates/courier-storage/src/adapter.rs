// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use courier_config::model::StorageConfig;
use courier_core::types::{Instance, Job, JobStatus, MappingStatus, NewMapping, ProviderMapping};
use courier_core::{AdapterType, CourierError, HealthStatus, PluginAdapter, StorageAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The database is opened lazily by [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, CourierError> {
        self.db.get().ok_or_else(|| CourierError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(&self, db: &Database) -> Result<(), CourierError> {
        if !self.config.wal_mode {
            return Ok(());
        }
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".into()));
        };
        let check = db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> { conn.execute_batch("SELECT 1;") })
            .await;
        Ok(match check {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        if let Some(db) = self.db.get() {
            self.checkpoint(db).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), CourierError> {
        let path = self.config.database_path.clone();
        let db = Database::open_with(&path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| CourierError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), CourierError> {
        let db = self.db()?;
        self.checkpoint(db).await
    }

    // --- Instance operations ---

    async fn create_instance(&self, instance: &Instance) -> Result<(), CourierError> {
        queries::instances::create_instance(self.db()?, instance).await
    }

    async fn get_instance(&self, id: &str) -> Result<Option<Instance>, CourierError> {
        queries::instances::get_instance(self.db()?, id).await
    }

    async fn list_instances(&self) -> Result<Vec<Instance>, CourierError> {
        queries::instances::list_instances(self.db()?).await
    }

    async fn newest_instance(&self) -> Result<Option<Instance>, CourierError> {
        queries::instances::newest_instance(self.db()?).await
    }

    async fn count_instances(&self) -> Result<i64, CourierError> {
        queries::instances::count_instances(self.db()?).await
    }

    async fn update_instance(
        &self,
        id: &str,
        name: &str,
        contacts: &[String],
        message: &str,
    ) -> Result<bool, CourierError> {
        queries::instances::update_instance(self.db()?, id, name, contacts, message).await
    }

    async fn touch_instance(&self, id: &str) -> Result<bool, CourierError> {
        queries::instances::touch_instance(self.db()?, id).await
    }

    async fn delete_instance(&self, id: &str) -> Result<bool, CourierError> {
        queries::instances::delete_instance(self.db()?, id).await
    }

    // --- Mapping operations ---

    async fn insert_mapping(&self, mapping: &NewMapping) -> Result<i64, CourierError> {
        queries::mappings::insert_mapping(self.db()?, mapping).await
    }

    async fn current_mapping(
        &self,
        instance_id: &str,
    ) -> Result<Option<ProviderMapping>, CourierError> {
        queries::mappings::current_mapping(self.db()?, instance_id).await
    }

    async fn mappings_for_instance(
        &self,
        instance_id: &str,
    ) -> Result<Vec<ProviderMapping>, CourierError> {
        queries::mappings::mappings_for_instance(self.db()?, instance_id).await
    }

    async fn mapping_by_remote_id(
        &self,
        remote_id: &str,
    ) -> Result<Option<ProviderMapping>, CourierError> {
        queries::mappings::mapping_by_remote_id(self.db()?, remote_id).await
    }

    async fn update_mapping_status(
        &self,
        id: i64,
        status: MappingStatus,
    ) -> Result<(), CourierError> {
        queries::mappings::update_mapping_status(self.db()?, id, status).await
    }

    async fn update_mapping_response(
        &self,
        id: i64,
        response: &str,
        status: MappingStatus,
    ) -> Result<(), CourierError> {
        queries::mappings::update_mapping_response(self.db()?, id, response, status).await
    }

    async fn delete_mappings(&self, instance_id: &str) -> Result<usize, CourierError> {
        queries::mappings::delete_mappings(self.db()?, instance_id).await
    }

    // --- Job operations ---

    async fn create_job(&self, id: &str, status: JobStatus) -> Result<(), CourierError> {
        queries::jobs::create_job(self.db()?, id, status).await
    }

    async fn get_job(&self, id: &str) -> Result<Option<Job>, CourierError> {
        queries::jobs::get_job(self.db()?, id).await
    }

    async fn update_job(
        &self,
        id: &str,
        status: JobStatus,
        result: Option<&str>,
        error: Option<&str>,
    ) -> Result<(), CourierError> {
        queries::jobs::update_job(self.db()?, id, status, result, error).await
    }
}
