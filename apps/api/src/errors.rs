#![allow(dead_code)]

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Failure reported by a page sink while appending or finalizing a document.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{0}")]
    Render(String),
}

/// Coarse classification of a generation failure, stable across the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    RenderFailure,
    ResourceFailure,
}

/// Errors raised by the sticker generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Rejected before any page was emitted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The sink failed mid-run. `page` is 1-based; `None` when finalizing.
    #[error("Render failure{}: {source}", .page.map(|p| format!(" on page {p}")).unwrap_or_default())]
    RenderFailure {
        page: Option<usize>,
        #[source]
        source: SinkError,
    },

    /// The output location could not be created or written.
    #[error("Resource failure at {}: {source}", .path.display())]
    ResourceFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::InvalidInput(_) => ErrorKind::InvalidInput,
            GenerationError::RenderFailure { .. } => ErrorKind::RenderFailure,
            GenerationError::ResourceFailure { .. } => ErrorKind::ResourceFailure,
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Generation(e) => match e.kind() {
                ErrorKind::InvalidInput => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
                }
                ErrorKind::RenderFailure => {
                    tracing::error!("Render error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "RENDER_FAILURE",
                        "A page could not be rendered".to_string(),
                    )
                }
                ErrorKind::ResourceFailure => {
                    tracing::error!("Output error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "RESOURCE_FAILURE",
                        "The output location could not be written".to_string(),
                    )
                }
            },
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
