//! Core data models for the file registry.
//!
//! Records map to the `files` table via `sqlx::FromRow` and serialize
//! as JSON via `serde`.

pub mod file;
