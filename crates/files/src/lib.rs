//! Catalog asset storage
//!
//! This crate stores the image files uploaded alongside movie records and removes them
//! again when a record drops its reference.
//!
//! ## Design Principles
//!
//! - Image bytes live outside the catalog document; records hold only an [`AssetRef`]
//! - Assets are immutable once written (a replacement image is a new file)
//! - File names are time-derived and collision-free, keeping the original extension
//! - Only *managed* references (those under the uploads URL prefix) are ever deleted
//!
//! ## Storage Layout
//!
//! ```text
//! uploads/
//! ├── 20261018T101500.120Z-550e8400e29b41d4a716446655440000.png
//! └── 20261018T101730.004Z-7c9e6679742540de944be07fc1f90ae7.jpg
//! ```
//!
//! referenced from records as `/uploads/<file name>`.
//!
//! ## Example Usage
//!
//! ```no_run
//! use catalog_files::AssetService;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let assets = AssetService::new(Path::new("uploads"), "/uploads/")?;
//! let stored = assets.store_file(Path::new("poster.png"))?;
//! println!("stored at {}", stored.reference);
//! # Ok(())
//! # }
//! ```

mod constants;
mod files;

pub use constants::{ALLOWED_EXTENSIONS, DEFAULT_UPLOADS_URL_PREFIX};
pub use files::{AssetMetadata, AssetRef, AssetService, StoredAsset};

/// Errors that can occur during asset operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Uploads directory could not be used
    #[error("Invalid uploads directory: {0}")]
    InvalidRootDirectory(String),

    /// Path validation failed (potential directory traversal or unmanaged reference)
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// The upload is not one of the accepted image formats
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// An asset with this name already exists (immutability violation)
    #[error("Asset {0} already exists in storage")]
    FileAlreadyExists(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FilesResult<T> = Result<T, FilesError>;
