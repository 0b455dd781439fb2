// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Courier integration tests.
//!
//! - [`MockProvider`] - scripted provider adapter that records every call
//! - [`TestHarness`] - temp SQLite store plus a fully wired service

pub mod harness;
pub mod mock_provider;

pub use harness::TestHarness;
pub use mock_provider::{CreateOutcome, MockProvider, ProviderCall, PIXEL_DATA_URI};
