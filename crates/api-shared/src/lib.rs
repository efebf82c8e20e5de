//! # API Shared
//!
//! Shared request/response types for the catalog REST API.
//!
//! Contains:
//! - Plain DTOs with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//!
//! Domain records (`Movie`, `Opinion`) are serialised straight from `catalog-core`; only the
//! envelope types live here.

pub mod dto;
pub mod health;

pub use dto::{AckRes, ErrorRes, HealthRes, MovieForm};
pub use health::HealthService;
