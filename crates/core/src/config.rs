//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the store. Request
//! handlers never read process-wide environment variables, which avoids inconsistent
//! behaviour in multi-threaded runtimes and test harnesses.

use crate::constants::{DEFAULT_MAX_UPLOAD_BYTES, MOVIES_JSON_FILENAME};
use crate::{CatalogError, CatalogResult};
use catalog_files::DEFAULT_UPLOADS_URL_PREFIX;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    uploads_dir: PathBuf,
    uploads_url_prefix: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig` using the default `/uploads/` URL prefix.
    pub fn new(data_dir: PathBuf, uploads_dir: PathBuf) -> CatalogResult<Self> {
        Self::with_uploads_url_prefix(data_dir, uploads_dir, DEFAULT_UPLOADS_URL_PREFIX.into())
    }

    /// Create a new `CoreConfig` with an explicit URL prefix for managed assets.
    pub fn with_uploads_url_prefix(
        data_dir: PathBuf,
        uploads_dir: PathBuf,
        uploads_url_prefix: String,
    ) -> CatalogResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(CatalogError::InvalidInput(
                "data directory cannot be empty".into(),
            ));
        }

        if uploads_dir.as_os_str().is_empty() {
            return Err(CatalogError::InvalidInput(
                "uploads directory cannot be empty".into(),
            ));
        }

        if uploads_url_prefix.trim_matches('/').is_empty() {
            return Err(CatalogError::InvalidInput(
                "uploads URL prefix cannot be empty".into(),
            ));
        }

        Ok(Self {
            data_dir,
            uploads_dir,
            uploads_url_prefix,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the catalog document.
    pub fn movies_file(&self) -> PathBuf {
        self.data_dir.join(MOVIES_JSON_FILENAME)
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    pub fn uploads_url_prefix(&self) -> &str {
        &self.uploads_url_prefix
    }
}

/// Parse the upload size limit from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_MAX_UPLOAD_BYTES`].
pub fn max_upload_bytes_from_env_value(value: Option<String>) -> CatalogResult<usize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(DEFAULT_MAX_UPLOAD_BYTES),
        Some(v) => match v.parse::<usize>() {
            Ok(0) => Err(CatalogError::InvalidInput(
                "CATALOG_MAX_UPLOAD_BYTES must be greater than zero".into(),
            )),
            Ok(bytes) => Ok(bytes),
            Err(e) => Err(CatalogError::InvalidInput(format!(
                "CATALOG_MAX_UPLOAD_BYTES is not a byte count ('{}'): {}",
                v, e
            ))),
        },
    }
}
