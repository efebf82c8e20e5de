//! Mapping of catalog failures onto HTTP responses.

use api_shared::ErrorRes;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use catalog_core::{CatalogError, FilesError};

/// Error returned by every handler.
///
/// The response body is always an [`ErrorRes`]. Persistence failures are logged in full
/// and reported to the client with a generic message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl From<FilesError> for AppError {
    fn from(e: FilesError) -> Self {
        AppError::Catalog(CatalogError::Asset(e))
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    fn status_and_body(&self) -> (StatusCode, ErrorRes) {
        match self {
            AppError::Catalog(CatalogError::NotFound { id }) => (
                StatusCode::NOT_FOUND,
                ErrorRes::new(format!("Movie {} not found", id), "NOT_FOUND"),
            ),
            AppError::Catalog(CatalogError::CapacityExceeded { limit, .. }) => (
                StatusCode::BAD_REQUEST,
                ErrorRes::new(
                    format!("A movie can have at most {} opinions", limit),
                    "CAPACITY_EXCEEDED",
                ),
            ),
            AppError::Catalog(e) if e.is_validation_failure() => (
                StatusCode::BAD_REQUEST,
                ErrorRes::new(e.to_string(), "VALIDATION_ERROR"),
            ),
            AppError::Catalog(e) => {
                tracing::error!(error = %e, "catalog operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorRes::new("An internal error occurred", "INTERNAL_ERROR"),
                )
            }
            AppError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorRes::new(message.clone(), "BAD_REQUEST"),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}
