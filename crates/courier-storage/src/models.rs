// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entity types re-exported from `courier-core` for use inside the storage crate.

pub use courier_core::types::{Instance, Job, JobStatus, MappingStatus, NewMapping, ProviderMapping};
