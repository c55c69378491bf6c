//! Typed errors for the store layer.
//!
//! Storage failures pass through from sqlx untouched; referential failures
//! (unknown project, unknown version, bad base version) are rejected with
//! their own variants before any row is written, so callers can distinguish
//! "the database is down" from "you asked for something that does not exist".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
    #[error("project {project_id} not found")]
    UnknownProject { project_id: i64 },
    #[error("version {version_id} not found for project {project_id}")]
    UnknownVersion { project_id: i64, version_id: i64 },
    #[error("base version {base_version_id} not found for project {project_id}")]
    UnknownBaseVersion {
        project_id: i64,
        base_version_id: i64,
    },
    #[error("project '{name}' already exists")]
    DuplicateProject { name: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("invalid database url: {message}")]
    InvalidUrl { message: String },
}

impl StoreError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            message: message.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
