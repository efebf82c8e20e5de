//! Constants used throughout the catalog core crate.
//!
//! This module contains path, filename and limit constants to ensure
//! consistency across the codebase.

/// Default directory holding the catalog document.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Filename of the catalog document inside the data directory.
pub const MOVIES_JSON_FILENAME: &str = "movies.json";

/// Default directory for uploaded image assets.
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";

/// Default directory of static UI files served by the REST binary.
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Default REST listen address.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Default cap on request bodies carrying image uploads (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Maximum number of opinions a single movie may hold.
pub const MAX_OPINIONS_PER_MOVIE: usize = 3;
