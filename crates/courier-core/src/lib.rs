// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Courier backend.
//!
//! This crate provides the error taxonomy, the entity types for instances,
//! provider mappings and send jobs, and the adapter traits that sit between
//! the lifecycle layer, the persistence store and the remote provider.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CourierError;
pub use types::{
    AdapterType, HealthStatus, Instance, InstanceView, Job, JobStatus, MappingStatus, NewMapping,
    OutboundMessage, ProviderMapping, StatusReport,
};

pub use traits::{PluginAdapter, ProviderAdapter, StorageAdapter};
