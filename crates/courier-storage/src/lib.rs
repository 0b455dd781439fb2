// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Courier backend.
//!
//! WAL-mode SQLite with embedded migrations, one `tokio-rusqlite` connection,
//! and typed queries for instances, provider mappings, and send jobs.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
pub use models::*;
