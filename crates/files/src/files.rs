//! Managed asset storage service implementation
//!
//! This module provides [`AssetService`], which owns the uploads directory. It is the only
//! code that writes or deletes image files; movie records see nothing but the opaque
//! [`AssetRef`] it hands back.
//!
//! # Naming
//!
//! Every stored asset gets a fresh [`TimestampId`] as its file stem followed by the
//! lowercased original extension, e.g. `20261018T101500.120Z-<uuid>.png`. Names are never
//! reused, so an existing file is never overwritten.
//!
//! # Validation
//!
//! An upload is accepted only when all of the following hold:
//!
//! - the original filename has one of the [`ALLOWED_EXTENSIONS`]
//! - the declared content type (when one is supplied) names one of those formats
//! - content sniffing, when it recognises the bytes at all, recognises an allowed image
//!
//! # Deletion
//!
//! Removal is best-effort: references outside the managed prefix are ignored and an
//! already-missing file is not an error.

use crate::{FilesError, FilesResult, ALLOWED_EXTENSIONS};
use catalog_types::NonEmptyText;
use catalog_uuid::{TimestampId, TimestampIdGenerator};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

/// Media types produced by sniffing that count as acceptable images.
const ALLOWED_SNIFFED_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

/// Opaque reference from a movie record to an image asset, e.g. `/uploads/<file>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AssetRef(String);

impl AssetRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata for a stored asset
///
/// Returned to the caller when an asset is written. It is not persisted; the catalog
/// document only keeps the reference.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct AssetMetadata {
    /// Hexadecimal SHA-256 digest of the file content
    pub sha256: String,

    /// File name inside the uploads directory
    pub file_name: NonEmptyText,

    /// Size of the file in bytes
    pub size_bytes: u64,

    /// Sniffed media type (MIME type), if the content was recognised
    pub media_type: Option<NonEmptyText>,

    /// Filename supplied by the uploader
    pub original_filename: NonEmptyText,

    /// UTC timestamp when the file was stored
    pub stored_at: DateTime<Utc>,
}

/// Result of [`AssetService::store`]: the reference to put on the record plus metadata.
#[derive(Debug, Clone)]
pub struct StoredAsset {
    pub reference: AssetRef,
    pub metadata: AssetMetadata,
}

/// Service owning the managed uploads directory.
#[derive(Debug)]
pub struct AssetService {
    /// Directory holding the asset files
    directory: PathBuf,

    /// URL prefix of managed references, always with leading and trailing `/`
    url_prefix: String,

    ids: TimestampIdGenerator,
}

impl AssetService {
    /// Creates a service over `directory`, creating the directory if it is missing.
    ///
    /// # Arguments
    ///
    /// * `directory` - Where asset files are written
    /// * `url_prefix` - Prefix of the references handed out, e.g. `/uploads/`
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - `url_prefix` has no path segment
    /// - `directory` exists but is not a directory, or cannot be created
    pub fn new(directory: &Path, url_prefix: &str) -> FilesResult<Self> {
        let trimmed = url_prefix.trim_matches('/');
        if trimmed.is_empty() {
            return Err(FilesError::InvalidPath(format!(
                "uploads URL prefix must name a path segment, got: '{}'",
                url_prefix
            )));
        }

        if directory.exists() && !directory.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                directory.display()
            )));
        }

        fs::create_dir_all(directory).map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot create directory {}: {}",
                directory.display(),
                e
            ))
        })?;

        Ok(Self {
            directory: directory.to_path_buf(),
            url_prefix: format!("/{}/", trimmed),
            ids: TimestampIdGenerator::new(),
        })
    }

    /// Returns the uploads directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the URL prefix of managed references (with leading and trailing `/`).
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Validates and writes an uploaded image.
    ///
    /// # Arguments
    ///
    /// * `original_filename` - Name supplied by the uploader, used for the extension
    /// * `content_type` - Declared MIME type, if the transport supplied one
    /// * `bytes` - File content
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - the upload is not an accepted image ([`FilesError::UnsupportedMediaType`])
    /// - the generated name already exists ([`FilesError::FileAlreadyExists`])
    /// - writing the file fails (I/O)
    pub fn store(
        &self,
        original_filename: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> FilesResult<StoredAsset> {
        let extension = allowed_extension(original_filename)?;

        if let Some(declared) = content_type {
            let declared = declared.to_ascii_lowercase();
            if !ALLOWED_EXTENSIONS.iter().any(|ext| declared.contains(ext)) {
                return Err(FilesError::UnsupportedMediaType(format!(
                    "declared content type '{}' is not an accepted image",
                    declared
                )));
            }
        }

        let sniffed = infer::get(bytes).map(|kind| kind.mime_type());
        if let Some(mime) = sniffed {
            if !ALLOWED_SNIFFED_TYPES.contains(&mime) {
                return Err(FilesError::UnsupportedMediaType(format!(
                    "content of '{}' looks like {}",
                    original_filename, mime
                )));
            }
        }

        let id = self.ids.next_id();
        let file_name = asset_file_name(&id, &extension);
        let storage_path = self.directory.join(&file_name);

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&storage_path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    FilesError::FileAlreadyExists(file_name.clone())
                }
                _ => FilesError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create {}: {}", storage_path.display(), e),
                )),
            })?;

        if let Err(e) = file.write_all(bytes).and_then(|()| file.sync_all()) {
            drop(file);
            let _ = fs::remove_file(&storage_path);
            return Err(FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write {}: {}", storage_path.display(), e),
            )));
        }

        let metadata = AssetMetadata {
            sha256: hex::encode(Sha256::digest(bytes)),
            file_name: NonEmptyText::new(&file_name)
                .map_err(|_| FilesError::InvalidPath("empty asset file name".into()))?,
            size_bytes: bytes.len() as u64,
            media_type: sniffed.and_then(|mime| NonEmptyText::new(mime).ok()),
            original_filename: NonEmptyText::new(original_filename)
                .map_err(|_| FilesError::InvalidPath("empty original filename".into()))?,
            stored_at: id.timestamp(),
        };

        Ok(StoredAsset {
            reference: AssetRef::new(format!("{}{}", self.url_prefix, file_name)),
            metadata,
        })
    }

    /// Reads a file from disk and stores it as an asset.
    ///
    /// No content type is declared, so only the extension and content sniffing apply.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if the source cannot be read or [`Self::store`] fails.
    pub fn store_file(&self, source_path: &Path) -> FilesResult<StoredAsset> {
        let bytes = fs::read(source_path).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to read source file {}: {}",
                    source_path.display(),
                    e
                ),
            ))
        })?;

        let original_filename = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");

        self.store(original_filename, None, &bytes)
    }

    /// Returns true when `asset` lives under the managed URL prefix.
    pub fn is_managed(&self, asset: &AssetRef) -> bool {
        asset.as_str().starts_with(&self.url_prefix)
    }

    /// Maps a managed reference to its file path.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::InvalidPath`] if the reference is not managed or does not name
    /// a single plain file inside the uploads directory.
    pub fn resolve(&self, asset: &AssetRef) -> FilesResult<PathBuf> {
        let file_name = asset
            .as_str()
            .strip_prefix(&self.url_prefix)
            .ok_or_else(|| {
                FilesError::InvalidPath(format!("'{}' is not a managed asset", asset))
            })?;

        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.directory.join(file_name)),
            _ => Err(FilesError::InvalidPath(format!(
                "'{}' does not name a file in the uploads directory",
                asset
            ))),
        }
    }

    /// Deletes a managed asset.
    ///
    /// Returns `Ok(true)` if a file was removed and `Ok(false)` if the reference is not
    /// managed or the file is already gone.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if the reference is malformed or the file exists but cannot be
    /// removed.
    pub fn remove(&self, asset: &AssetRef) -> FilesResult<bool> {
        if !self.is_managed(asset) {
            return Ok(false);
        }

        let path = self.resolve(asset)?;
        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path)?;
        Ok(true)
    }
}

fn allowed_extension(original_filename: &str) -> FilesResult<String> {
    let extension = Path::new(original_filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(FilesError::UnsupportedMediaType(format!(
            "'{}' must be one of: {}",
            original_filename,
            ALLOWED_EXTENSIONS.join(", ")
        )))
    }
}

fn asset_file_name(id: &TimestampId, extension: &str) -> String {
    format!("{}.{}", id, extension)
}
