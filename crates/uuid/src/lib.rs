//! Identifier utilities for the movie catalog.
//!
//! Catalog identifiers are *time-prefixed UUIDs*:
//!
//! `YYYYMMDDTHHMMSS.mmmZ-<canonical_uuid>`
//!
//! Example: `20261018T101500.123Z-550e8400e29b41d4a716446655440000`
//!
//! The timestamp prefix keeps identifiers human-readable and sortable by creation time. The
//! UUID suffix makes them globally unique, so two records created in the same millisecond
//! never collide.
//!
//! ## Canonical UUID form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! This is the same value you would get from `Uuid::new_v4().simple().to_string()`.
//! Non-canonical values (uppercase, hyphenated, wrong length, non-hex) are rejected by
//! [`UuidService::parse`].
//!
//! Movie ids, opinion ids and uploaded asset file names all use [`TimestampId`]; a
//! [`TimestampIdGenerator`] hands them out in strictly increasing order within a process.

mod service;

// Re-export public types
pub use service::{TimestampId, TimestampIdGenerator, Uuid, UuidService};

/// Error type for UUID operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for UUID operations.
pub type UuidResult<T> = Result<T, UuidError>;
