//! Error types for the reporting service.
//!
//! Per-record anomalies never reach these types; they are defaulted during
//! ingestion. Only failures that make the whole report impossible are errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::models::ApiResponse;

/// Failure to fetch the record collections.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("database query failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to read snapshot {path}: {source}")]
    SnapshotIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot {path}: {source}")]
    SnapshotFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("record source unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the report endpoint.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to fetch records: {0}")]
    Source(#[from] SourceError),

    #[error("report generation failed: {0}")]
    Internal(String),
}

impl ReportError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReportError::Source(_) => StatusCode::SERVICE_UNAVAILABLE,
            ReportError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        error!("Report request failed: {}", self);
        let status = self.status_code();
        (status, Json(ApiResponse::failure(self.to_string()))).into_response()
    }
}
