//! HTTP handlers for file registration, lookup, listing and deletion.
//! Request shape is checked here; everything else is delegated to
//! `RegistryService`.

use crate::{
    errors::AppError, models::file::FileRecord, services::registry_service::RegistryService,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct UploadResponse {
    message: &'static str,
    files: Vec<FileRecord>,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

/// `POST /file/upload` — register already-uploaded files.
///
/// Expects `{"files": [{name, url, type}, ...]}`. A missing or non-array
/// `files` is a 400.
pub async fn upload_files(
    State(service): State<RegistryService>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = payload?;
    let files = body.get("files").unwrap_or(&Value::Null);

    let created = service.create_batch(files).await?;
    tracing::info!("registered {} file(s)", created.len());

    Ok((
        StatusCode::OK,
        Json(UploadResponse {
            message: "Files uploaded successfully",
            files: created,
        }),
    ))
}

/// `GET /file/get/{id}`
pub async fn get_file(
    State(service): State<RegistryService>,
    Path(id): Path<String>,
) -> Result<Json<FileRecord>, AppError> {
    let file = service.get_by_id(&id).await?;
    Ok(Json(file))
}

/// `GET /file/all` — every record, newest first.
pub async fn list_files(
    State(service): State<RegistryService>,
) -> Result<Json<Vec<FileRecord>>, AppError> {
    let files = service.list_all().await?;
    Ok(Json(files))
}

/// `DELETE /file/delete/{id}` — succeeds whether or not the record existed.
pub async fn delete_file(
    State(service): State<RegistryService>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    service.delete_by_id(&id).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "File deleted successfully",
        }),
    ))
}

/// `GET /` — greeting kept for clients that probe the root.
pub async fn welcome() -> impl IntoResponse {
    Json(MessageResponse {
        message: "Welcome to the app!",
    })
}
