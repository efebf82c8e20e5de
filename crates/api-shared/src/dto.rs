//! Envelope and form types exchanged over HTTP.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Acknowledgment returned by operations with no record to return (e.g. delete).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AckRes {
    pub message: String,
}

impl AckRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    /// Human-readable description
    pub error: String,
    /// Stable machine-readable code, e.g. `NOT_FOUND` or `CAPACITY_EXCEEDED`
    pub code: String,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Multipart form accepted by `POST /api/movies` and `PUT /api/movies/{id}`.
///
/// Documentation only: the handlers read the multipart stream field by field. On update,
/// omitted or empty fields keep their stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct MovieForm {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Calendar date, `YYYY-MM-DD`
    #[schema(example = "2021-10-22")]
    pub date: Option<String>,
    /// Parsed leniently; non-numeric text is stored as an invalid (null) rating
    #[schema(example = "9")]
    pub rating: Option<String>,
    /// JPEG, PNG or GIF image
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<String>,
}
