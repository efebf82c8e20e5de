//! Constants for managed asset storage.

/// URL prefix under which managed assets are referenced and served.
pub const DEFAULT_UPLOADS_URL_PREFIX: &str = "/uploads/";

/// File extensions accepted for uploaded images (compared lowercase).
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpeg", "jpg", "png", "gif"];
