// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Send-job records. Rows are never deleted.

use courier_core::types::timestamp_now;
use courier_core::CourierError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};
use crate::models::{Job, JobStatus};
use crate::queries::parse_status;

pub async fn create_job(db: &Database, id: &str, status: JobStatus) -> Result<(), CourierError> {
    let id = id.to_string();
    let now = timestamp_now();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO jobs (id, status, result, error, created_at, updated_at)
                 VALUES (?1, ?2, NULL, NULL, ?3, ?3)",
                params![id, status.to_string(), now],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_job(db: &Database, id: &str) -> Result<Option<Job>, CourierError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, status, result, error, created_at, updated_at FROM jobs WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Job {
                        id: row.get(0)?,
                        status: parse_status(row, 1)?,
                        result: row.get(2)?,
                        error: row.get(3)?,
                        created_at: row.get(4)?,
                        updated_at: row.get(5)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite status, result, and error of a job.
pub async fn update_job(
    db: &Database,
    id: &str,
    status: JobStatus,
    result: Option<&str>,
    error: Option<&str>,
) -> Result<(), CourierError> {
    let id = id.to_string();
    let result = result.map(str::to_string);
    let error = error.map(str::to_string);
    let now = timestamp_now();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE jobs SET status = ?1, result = ?2, error = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![status.to_string(), result, error, now, id],
            )?;
            if changed == 0 {
                return Err(rusqlite::Error::QueryReturnedNoRows);
            }
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
