// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Courier backend.
//!
//! Exposes the instance, send-job, webhook, and health operations of
//! [`courier_service::CourierService`] as a JSON API under `/api`.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ErrorResponse};
pub use server::{router, start_server, GatewayState};
