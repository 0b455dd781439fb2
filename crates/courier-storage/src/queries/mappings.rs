// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider mapping operations.
//!
//! Rows are append-only per instance; "current" is the row with the greatest
//! `created_at`, ties broken by the autoincrement key.

use courier_core::types::timestamp_now;
use courier_core::CourierError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};
use crate::models::{MappingStatus, NewMapping, ProviderMapping};
use crate::queries::parse_status;

const COLUMNS: &str = "id, instance_id, provider, remote_instance_id, remote_token, response, \
                       webhook_url, status, created_at, updated_at";

fn row_to_mapping(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProviderMapping> {
    Ok(ProviderMapping {
        id: row.get(0)?,
        instance_id: row.get(1)?,
        provider: row.get(2)?,
        remote_instance_id: row.get(3)?,
        remote_token: row.get(4)?,
        response: row.get(5)?,
        webhook_url: row.get(6)?,
        status: parse_status(row, 7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Insert a mapping row and return its surrogate key.
pub async fn insert_mapping(db: &Database, mapping: &NewMapping) -> Result<i64, CourierError> {
    let m = mapping.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO provider_mappings
                    (instance_id, provider, remote_instance_id, remote_token, response,
                     webhook_url, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                params![
                    m.instance_id,
                    m.provider,
                    m.remote_instance_id,
                    m.remote_token,
                    m.response,
                    m.webhook_url,
                    m.status.to_string(),
                    m.created_at,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// The authoritative mapping of an instance.
pub async fn current_mapping(
    db: &Database,
    instance_id: &str,
) -> Result<Option<ProviderMapping>, CourierError> {
    let instance_id = instance_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {COLUMNS} FROM provider_mappings WHERE instance_id = ?1
                     ORDER BY created_at DESC, id DESC LIMIT 1"
                ),
                params![instance_id],
                row_to_mapping,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Every mapping of an instance, newest first.
pub async fn mappings_for_instance(
    db: &Database,
    instance_id: &str,
) -> Result<Vec<ProviderMapping>, CourierError> {
    let instance_id = instance_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM provider_mappings WHERE instance_id = ?1
                 ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map(params![instance_id], row_to_mapping)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// The newest mapping whose remote session id is `remote_id`.
pub async fn mapping_by_remote_id(
    db: &Database,
    remote_id: &str,
) -> Result<Option<ProviderMapping>, CourierError> {
    let remote_id = remote_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {COLUMNS} FROM provider_mappings WHERE remote_instance_id = ?1
                     ORDER BY created_at DESC, id DESC LIMIT 1"
                ),
                params![remote_id],
                row_to_mapping,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn update_mapping_status(
    db: &Database,
    id: i64,
    status: MappingStatus,
) -> Result<(), CourierError> {
    let now = timestamp_now();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE provider_mappings SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.to_string(), now, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Replace the response document and status in a single statement.
pub async fn update_mapping_response(
    db: &Database,
    id: i64,
    response: &str,
    status: MappingStatus,
) -> Result<(), CourierError> {
    let response = response.to_string();
    let now = timestamp_now();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE provider_mappings SET response = ?1, status = ?2, updated_at = ?3
                 WHERE id = ?4",
                params![response, status.to_string(), now, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete_mappings(db: &Database, instance_id: &str) -> Result<usize, CourierError> {
    let instance_id = instance_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM provider_mappings WHERE instance_id = ?1",
                params![instance_id],
            )
        })
        .await
        .map_err(map_tr_err)
}
