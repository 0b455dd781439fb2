// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instance CRUD operations.

use courier_core::types::{timestamp_now, CONTACT_SEPARATOR};
use courier_core::CourierError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};
use crate::models::Instance;

const COLUMNS: &str = "id, name, contacts, message, provider, created_at, updated_at";

fn join_contacts(contacts: &[String]) -> String {
    contacts.join(&CONTACT_SEPARATOR.to_string())
}

fn split_contacts(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(CONTACT_SEPARATOR).map(str::to_string).collect()
}

fn row_to_instance(row: &rusqlite::Row<'_>) -> rusqlite::Result<Instance> {
    let contacts: String = row.get(2)?;
    Ok(Instance {
        id: row.get(0)?,
        name: row.get(1)?,
        contacts: split_contacts(&contacts),
        message: row.get(3)?,
        provider: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Insert a new instance row.
pub async fn create_instance(db: &Database, instance: &Instance) -> Result<(), CourierError> {
    let instance = instance.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO instances (id, name, contacts, message, provider, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    instance.id,
                    instance.name,
                    join_contacts(&instance.contacts),
                    instance.message,
                    instance.provider,
                    instance.created_at,
                    instance.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get an instance by ID.
pub async fn get_instance(db: &Database, id: &str) -> Result<Option<Instance>, CourierError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM instances WHERE id = ?1"),
                params![id],
                row_to_instance,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// List every instance, newest first.
pub async fn list_instances(db: &Database) -> Result<Vec<Instance>, CourierError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM instances ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map([], row_to_instance)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// The most recently created instance.
pub async fn newest_instance(db: &Database) -> Result<Option<Instance>, CourierError> {
    db.connection()
        .call(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {COLUMNS} FROM instances ORDER BY created_at DESC, rowid DESC LIMIT 1"
                ),
                [],
                row_to_instance,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn count_instances(db: &Database) -> Result<i64, CourierError> {
    db.connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM instances", [], |row| row.get(0)))
        .await
        .map_err(map_tr_err)
}

/// Replace the editable fields of an instance. Returns `false` if it does not exist.
pub async fn update_instance(
    db: &Database,
    id: &str,
    name: &str,
    contacts: &[String],
    message: &str,
) -> Result<bool, CourierError> {
    let id = id.to_string();
    let name = name.to_string();
    let contacts = join_contacts(contacts);
    let message = message.to_string();
    let now = timestamp_now();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE instances SET name = ?1, contacts = ?2, message = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![name, contacts, message, now, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Bump `updated_at` only.
pub async fn touch_instance(db: &Database, id: &str) -> Result<bool, CourierError> {
    let id = id.to_string();
    let now = timestamp_now();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE instances SET updated_at = ?1 WHERE id = ?2",
                params![now, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete_instance(db: &Database, id: &str) -> Result<bool, CourierError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute("DELETE FROM instances WHERE id = ?1", params![id])?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}
