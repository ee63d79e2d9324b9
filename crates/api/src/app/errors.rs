use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use labelforge_core::DomainError;
use labelforge_infra::artifacts::ArtifactError;
use labelforge_infra::printer::PrintError;

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Every failure a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Print(#[from] PrintError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("{0}")]
    Validation(String),
    #[error("selection not found or expired")]
    SelectionNotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Print(e) => print_error_to_response(e),
            ApiError::Artifact(e) => artifact_error_to_response(e),
            ApiError::Domain(e) => domain_error_to_response(e),
            ApiError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
            ApiError::SelectionNotFound => json_error(
                StatusCode::NOT_FOUND,
                "selection_not_found",
                "selection not found or expired",
            ),
        }
    }
}

fn print_error_to_response(err: PrintError) -> Response {
    match err {
        PrintError::NothingSelected => json_error(StatusCode::BAD_REQUEST, "validation_error", err.to_string()),
        PrintError::ProductNotFound(_) => json_error(StatusCode::NOT_FOUND, "product_not_found", err.to_string()),
        PrintError::Domain(e) => domain_error_to_response(e),
        PrintError::Render(_) | PrintError::RenderTask(_) => {
            tracing::error!("sticker render failed: {err}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "render_error", err.to_string())
        }
        PrintError::Artifact(e) => artifact_error_to_response(e),
        PrintError::Store(e) => {
            tracing::error!("print job store failed: {e}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

fn artifact_error_to_response(err: ArtifactError) -> Response {
    match err {
        ArtifactError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "no stickers have been generated"),
        ArtifactError::Io { .. } => {
            tracing::error!("artifact io failed: {err}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "artifact_error", err.to_string())
        }
    }
}

fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(_) | DomainError::InvalidId(_) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", err.to_string())
        }
    }
}
