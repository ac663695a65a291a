use fabrica_core::EntityKind;
use serde::Serialize;

use crate::error::ClientError;
use crate::mutation::Operation;

/// Longest backend message shown verbatim. Anything longer is assumed to
/// be a stack trace or validation dump rather than a domain error.
pub const MAX_NOTICE_LEN: usize = 150;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

/// The single user-facing notification for one mutation attempt.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

pub fn success_message(operation: Operation, entity: EntityKind) -> String {
    match operation {
        Operation::Create => format!("{} added", entity.label()),
        Operation::Update => format!("{} updated", entity.label()),
        Operation::Patch => format!("{} saved", entity.label()),
        Operation::Delete => format!("{} deleted", entity.label()),
    }
}

pub fn fallback_message(operation: Operation, entity: EntityKind) -> String {
    match operation {
        Operation::Create => format!("Failed to add {}", entity.label()),
        Operation::Update => format!("Failed to update {}", entity.label()),
        Operation::Patch => format!("Failed to save {}", entity.label()),
        Operation::Delete => format!("Failed to delete {}", entity.label()),
    }
}

/// Map a mutation failure to the one line shown to the user.
///
/// A short structured backend message is shown verbatim; otherwise a
/// detected duplicate-key conflict gets a domain hint, and everything else
/// collapses to the per-operation fallback.
pub fn normalize(error: &ClientError, operation: Operation, entity: EntityKind) -> String {
    if let Some(message) = usable_backend_message(error) {
        return message;
    }
    if error.is_conflict() || mentions_duplicate(error) {
        return format!("{} value already in use", entity.label());
    }
    fallback_message(operation, entity)
}

/// Inline message for a failed list read (shown in place of the table).
pub fn list_message(error: &ClientError, entity: EntityKind) -> String {
    if let Some(message) = usable_backend_message(error) {
        return message;
    }
    format!("Failed to load {} list", entity.label())
}

fn usable_backend_message(error: &ClientError) -> Option<String> {
    let message = error.backend_message()?.trim();
    if message.is_empty() || message.chars().count() > MAX_NOTICE_LEN {
        None
    } else {
        Some(message.to_string())
    }
}

fn mentions_duplicate(error: &ClientError) -> bool {
    error.backend_message().is_some_and(|message| {
        let message = message.to_ascii_lowercase();
        message.contains("duplicate") || message.contains("unique constraint")
    })
}
