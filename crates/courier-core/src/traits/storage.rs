// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the persistence backend.

use async_trait::async_trait;

use crate::error::CourierError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Instance, Job, JobStatus, MappingStatus, NewMapping, ProviderMapping};

/// Adapter for the persistence backend.
///
/// The store is the single source of truth. Each method is its own atomic
/// unit; no transaction spans two calls. "Newest" always means greatest
/// `created_at`, ties broken by the surrogate key.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), CourierError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), CourierError>;

    // --- Instances ---

    async fn create_instance(&self, instance: &Instance) -> Result<(), CourierError>;

    async fn get_instance(&self, id: &str) -> Result<Option<Instance>, CourierError>;

    /// All instances, newest first.
    async fn list_instances(&self) -> Result<Vec<Instance>, CourierError>;

    async fn newest_instance(&self) -> Result<Option<Instance>, CourierError>;

    async fn count_instances(&self) -> Result<i64, CourierError>;

    /// Replaces name, contacts and message. Returns `false` if no row matched.
    async fn update_instance(
        &self,
        id: &str,
        name: &str,
        contacts: &[String],
        message: &str,
    ) -> Result<bool, CourierError>;

    /// Bumps `updated_at` without changing any field.
    async fn touch_instance(&self, id: &str) -> Result<bool, CourierError>;

    async fn delete_instance(&self, id: &str) -> Result<bool, CourierError>;

    // --- Provider mappings ---

    /// Inserts a mapping row and returns its surrogate key.
    async fn insert_mapping(&self, mapping: &NewMapping) -> Result<i64, CourierError>;

    async fn current_mapping(
        &self,
        instance_id: &str,
    ) -> Result<Option<ProviderMapping>, CourierError>;

    /// Every mapping of an instance, newest first.
    async fn mappings_for_instance(
        &self,
        instance_id: &str,
    ) -> Result<Vec<ProviderMapping>, CourierError>;

    async fn mapping_by_remote_id(
        &self,
        remote_id: &str,
    ) -> Result<Option<ProviderMapping>, CourierError>;

    async fn update_mapping_status(
        &self,
        id: i64,
        status: MappingStatus,
    ) -> Result<(), CourierError>;

    /// Replaces the response document and status in one write.
    async fn update_mapping_response(
        &self,
        id: i64,
        response: &str,
        status: MappingStatus,
    ) -> Result<(), CourierError>;

    /// Deletes every mapping of an instance. Returns the number removed.
    async fn delete_mappings(&self, instance_id: &str) -> Result<usize, CourierError>;

    // --- Jobs ---

    async fn create_job(&self, id: &str, status: JobStatus) -> Result<(), CourierError>;

    async fn get_job(&self, id: &str) -> Result<Option<Job>, CourierError>;

    async fn update_job(
        &self,
        id: &str,
        status: JobStatus,
        result: Option<&str>,
        error: Option<&str>,
    ) -> Result<(), CourierError>;
}
