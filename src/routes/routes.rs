//! Defines routes for the file registry.
//!
//! ## Structure
//! - **File endpoints** (nested under `/file`)
//!   - `POST   /file/upload`      — register a batch of uploaded files
//!   - `GET    /file/get/{id}`    — fetch one record
//!   - `GET    /file/all`         — list records, newest first
//!   - `DELETE /file/delete/{id}` — delete a record if present
//!
//! - **Service endpoints**
//!   - `GET /`, `GET /healthz`, `GET /readyz`

use crate::{
    handlers::{
        file_handlers::{delete_file, get_file, list_files, upload_files, welcome},
        health_handlers::{healthz, readyz},
    },
    services::registry_service::RegistryService,
};
use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the router for all registry routes.
///
/// The router carries shared state (`RegistryService`) to all handlers.
pub fn routes() -> Router<RegistryService> {
    let files = Router::new()
        .route("/upload", post(upload_files))
        .route("/get/{id}", get(get_file))
        .route("/delete/{id}", delete(delete_file))
        .route("/all", get(list_files));

    Router::new()
        .route("/", get(welcome))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/file", files)
}

/// Full application: routes bound to `service`, with CORS open to any origin
/// and per-request tracing.
pub fn app(service: RegistryService) -> Router {
    routes()
        .with_state(service)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use std::sync::Arc;

    async fn server() -> TestServer {
        let service = RegistryService::new(Arc::new(memory_pool().await));
        TestServer::new(app(service)).unwrap()
    }

    async fn upload(server: &TestServer, names: &[&str]) -> Vec<Value> {
        let files: Vec<Value> = names
            .iter()
            .map(|name| {
                json!({
                    "name": name,
                    "url": format!("https://storage.example.com/{}", name),
                    "type": "image"
                })
            })
            .collect();

        let response = server
            .post("/file/upload")
            .json(&json!({ "files": files }))
            .await;
        response.assert_status(StatusCode::OK);

        let body: Value = response.json();
        body["files"].as_array().unwrap().clone()
    }

    #[tokio::test]
    async fn test_upload_returns_created_records() {
        let server = server().await;

        let response = server
            .post("/file/upload")
            .json(&json!({
                "files": [
                    {"name": "a.png", "url": "https://s/a.png", "type": "image"},
                    {"name": "b.pdf", "url": "https://s/b.pdf", "type": "pdf"}
                ]
            }))
            .await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["message"], "Files uploaded successfully");

        let files = body["files"].as_array().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0]["name"], "a.png");
        assert_eq!(files[1]["type"], "pdf");
        assert!(files[0]["id"].is_string());
        assert_ne!(files[0]["id"], files[1]["id"]);
    }

    #[tokio::test]
    async fn test_upload_with_non_array_files_is_bad_request() {
        let server = server().await;

        for body in [json!({"files": {"name": "a"}}), json!({"files": "a.png"}), json!({})] {
            let response = server.post("/file/upload").json(&body).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            let body: Value = response.json();
            assert!(body["message"].as_str().unwrap().starts_with("Invalid file data"));
        }

        let listed: Vec<Value> = server.get("/file/all").await.json();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_upload_with_non_json_body_is_bad_request() {
        let server = server().await;

        let response = server.post("/file/upload").text("files=a.png").await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_returns_uploaded_record() {
        let server = server().await;
        let created = upload(&server, &["cat.png"]).await;
        let id = created[0]["id"].as_str().unwrap();

        let response = server.get(&format!("/file/get/{}", id)).await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body, created[0]);
        assert_eq!(body["url"], "https://storage.example.com/cat.png");
    }

    #[tokio::test]
    async fn test_get_missing_record_is_not_found() {
        let server = server().await;

        for id in [uuid::Uuid::now_v7().to_string(), "0123456789abcdef".to_string()] {
            let response = server.get(&format!("/file/get/{}", id)).await;
            response.assert_status(StatusCode::NOT_FOUND);
            let body: Value = response.json();
            assert_eq!(body["message"], "File Not Found!");
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let server = server().await;
        for name in ["r1", "r2", "r3"] {
            upload(&server, &[name]).await;
        }

        let response = server.get("/file/all").await;

        response.assert_status(StatusCode::OK);
        let listed: Vec<Value> = response.json();
        let names: Vec<_> = listed.iter().map(|f| f["name"].as_str().unwrap()).collect();
        assert_eq!(names, ["r3", "r2", "r1"]);
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_repeats_cleanly() {
        let server = server().await;
        let created = upload(&server, &["keep.png", "drop.png"]).await;
        let drop_id = created[1]["id"].as_str().unwrap();

        for _ in 0..2 {
            let response = server.delete(&format!("/file/delete/{}", drop_id)).await;
            response.assert_status(StatusCode::OK);
            let body: Value = response.json();
            assert_eq!(body["message"], "File deleted successfully");
        }

        let listed: Vec<Value> = server.get("/file/all").await.json();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["name"], "keep.png");

        server
            .get(&format!("/file/get/{}", drop_id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_unknown_record_succeeds() {
        let server = server().await;

        let response = server.delete("/file/delete/does-not-exist").await;

        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_service_endpoints() {
        let server = server().await;

        let root: Value = server.get("/").await.json();
        assert_eq!(root["message"], "Welcome to the app!");

        let health = server.get("/healthz").await;
        health.assert_status(StatusCode::OK);
        assert_eq!(health.json::<Value>()["status"], "ok");

        let ready = server.get("/readyz").await;
        ready.assert_status(StatusCode::OK);
        let body: Value = ready.json();
        assert_eq!(body["checks"]["sqlite"]["ok"], true);
    }

    #[tokio::test]
    async fn test_readyz_reports_closed_store() {
        let pool = memory_pool().await;
        let service = RegistryService::new(Arc::new(pool.clone()));
        let server = TestServer::new(app(service)).unwrap();
        pool.close().await;

        let response = server.get("/readyz").await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
        assert_eq!(body["checks"]["sqlite"]["ok"], false);
    }
}
