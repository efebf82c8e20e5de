use catalog_files::FilesError;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("movie not found: {id}")]
    NotFound { id: String },
    #[error("movie {movie_id} already has the maximum of {limit} opinions")]
    CapacityExceeded { movie_id: String, limit: usize },
    #[error("asset error: {0}")]
    Asset(#[from] FilesError),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write catalog file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read catalog file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize catalog: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize catalog: {0}")]
    Deserialization(serde_json::Error),
}

impl CatalogError {
    /// True for errors caused by the caller's input rather than by storage.
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            CatalogError::InvalidInput(_)
                | CatalogError::Asset(FilesError::UnsupportedMediaType(_))
        )
    }

    /// True for I/O and (de)serialisation failures of the document or asset storage.
    pub fn is_persistence_failure(&self) -> bool {
        match self {
            CatalogError::Asset(FilesError::UnsupportedMediaType(_)) => false,
            CatalogError::Asset(_)
            | CatalogError::StorageDirCreation(_)
            | CatalogError::FileWrite(_)
            | CatalogError::FileRead(_)
            | CatalogError::Serialization(_)
            | CatalogError::Deserialization(_) => true,
            CatalogError::InvalidInput(_)
            | CatalogError::NotFound { .. }
            | CatalogError::CapacityExceeded { .. } => false,
        }
    }
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
