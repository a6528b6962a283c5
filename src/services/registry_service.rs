//! RegistryService — create, read, list and delete file records.
//!
//! Records live in the SQLite `files` table. The service owns no file
//! content; `url` values are stored verbatim and never dereferenced.

use crate::models::file::{FileRecord, NewFile};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid file data: {0}")]
    InvalidInput(String),
    #[error("file `{0}` not found")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry operations over a shared SQLite pool.
///
/// Cloning is cheap; every clone shares the same pool.
#[derive(Clone)]
pub struct RegistryService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl RegistryService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Register every descriptor in `files`, which must be a JSON array.
    ///
    /// All descriptors are validated before anything is written, and the
    /// inserts share one transaction: either every record is created or none
    /// is. Returned records follow input order.
    pub async fn create_batch(&self, files: &Value) -> RegistryResult<Vec<FileRecord>> {
        let descriptors = parse_descriptors(files)?;
        self.insert_batch(descriptors).await
    }

    /// Insert already-validated descriptors in a single transaction.
    pub async fn insert_batch(&self, files: Vec<NewFile>) -> RegistryResult<Vec<FileRecord>> {
        if let Some((index, field)) = files
            .iter()
            .enumerate()
            .find_map(|(i, f)| f.first_empty_field().map(|field| (i, field)))
        {
            return Err(RegistryError::InvalidInput(format!(
                "files[{}].{} must not be empty",
                index, field
            )));
        }

        let mut tx = self.db.begin().await?;
        let mut created = Vec::with_capacity(files.len());

        for file in &files {
            let record = sqlx::query_as::<_, FileRecord>(
                "INSERT INTO files (id, name, url, type, created_at)
                 VALUES (?, ?, ?, ?, ?)
                 RETURNING id, name, url, type, created_at",
            )
            .bind(Uuid::now_v7())
            .bind(&file.name)
            .bind(&file.url)
            .bind(&file.file_type)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;
            created.push(record);
        }

        tx.commit().await?;
        debug!("registered {} file(s)", created.len());

        Ok(created)
    }

    /// Fetch a single record. Ids that do not parse are reported as not found.
    pub async fn get_by_id(&self, id: &str) -> RegistryResult<FileRecord> {
        let Ok(uuid) = Uuid::parse_str(id) else {
            return Err(RegistryError::NotFound(id.to_string()));
        };

        sqlx::query_as::<_, FileRecord>(
            "SELECT id, name, url, type, created_at FROM files WHERE id = ?",
        )
        .bind(uuid)
        .fetch_optional(&*self.db)
        .await?
        .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// All records, newest first.
    pub async fn list_all(&self) -> RegistryResult<Vec<FileRecord>> {
        let rows = sqlx::query_as::<_, FileRecord>(
            "SELECT id, name, url, type, created_at FROM files ORDER BY id DESC",
        )
        .fetch_all(&*self.db)
        .await?;
        Ok(rows)
    }

    /// Delete a record if it exists.
    ///
    /// Returns whether a row was removed; a missing or malformed id is not an
    /// error.
    pub async fn delete_by_id(&self, id: &str) -> RegistryResult<bool> {
        let Ok(uuid) = Uuid::parse_str(id) else {
            debug!("delete of malformed id `{}` ignored", id);
            return Ok(false);
        };

        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(uuid)
            .execute(&*self.db)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            debug!("deleted file {}", uuid);
        } else {
            debug!("file {} already absent", uuid);
        }
        Ok(removed)
    }
}

/// Turn an untyped `files` payload into typed descriptors.
///
/// Rejects anything that is not an array of `{name, url, type}` objects with
/// string fields.
pub fn parse_descriptors(files: &Value) -> RegistryResult<Vec<NewFile>> {
    let items = files
        .as_array()
        .ok_or_else(|| RegistryError::InvalidInput("`files` must be an array".into()))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            NewFile::deserialize(item)
                .map_err(|err| RegistryError::InvalidInput(format!("files[{}]: {}", index, err)))
        })
        .collect()
}
