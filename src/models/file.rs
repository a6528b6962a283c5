//! Represents a registered file: metadata pointing at externally stored content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single file known to the registry.
///
/// The registry never holds the file's bytes. `url` points at wherever the
/// client uploaded the content, and is stored as given.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct FileRecord {
    /// Time-ordered identifier (UUIDv7), assigned on creation.
    pub id: Uuid,

    /// Display filename.
    pub name: String,

    /// Location of the externally stored content.
    pub url: String,

    /// Free-form classification tag used by clients (e.g. "image", "pdf").
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub file_type: String,

    /// When the record was persisted.
    pub created_at: DateTime<Utc>,
}

/// A file descriptor submitted for registration, before it has an id.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NewFile {
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub file_type: String,
}

impl NewFile {
    /// Name of the first required field that is blank, if any.
    pub fn first_empty_field(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            Some("name")
        } else if self.url.trim().is_empty() {
            Some("url")
        } else if self.file_type.trim().is_empty() {
            Some("type")
        } else {
            None
        }
    }
}
