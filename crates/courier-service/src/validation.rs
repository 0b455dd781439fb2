// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Input checks shared by the lifecycle manager and the dispatcher.

use courier_core::types::{CONTACT_SEPARATOR, MAX_MESSAGE_LEN, MAX_NAME_LEN};
use courier_core::CourierError;

pub fn validate_name(name: &str) -> Result<(), CourierError> {
    if name.trim().is_empty() {
        return Err(CourierError::validation("name", "must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CourierError::validation(
            "name",
            format!("must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

/// Contacts must be non-empty and every entry must survive the
/// comma-joined storage format unchanged.
pub fn validate_contacts(contacts: &[String]) -> Result<(), CourierError> {
    if contacts.is_empty() {
        return Err(CourierError::validation(
            "contacts",
            "at least one contact is required",
        ));
    }
    for contact in contacts {
        if contact.trim().is_empty() {
            return Err(CourierError::validation("contacts", "contacts must not be blank"));
        }
        if contact.contains(CONTACT_SEPARATOR) {
            return Err(CourierError::validation(
                "contacts",
                format!("contact `{contact}` must not contain `{CONTACT_SEPARATOR}`"),
            ));
        }
    }
    Ok(())
}

pub fn validate_message(message: &str) -> Result<(), CourierError> {
    if message.trim().is_empty() {
        return Err(CourierError::validation("message", "message is required"));
    }
    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(CourierError::validation(
            "message",
            format!("must be at most {MAX_MESSAGE_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_instance(
    name: &str,
    contacts: &[String],
    message: &str,
) -> Result<(), CourierError> {
    validate_name(name)?;
    validate_contacts(contacts)?;
    validate_message(message)
}
