//! # Catalog Core
//!
//! Core business logic for the movie catalog.
//!
//! This crate contains pure data operations and file management:
//! - Movie records with up to three opinions each
//! - Snapshot persistence of the whole collection to one JSON document
//! - Image asset lifecycle tied to records (via `catalog_files`)
//!
//! **No API concerns**: HTTP servers, multipart parsing and response shapes belong in
//! `api-rest` and `api-shared`.

pub mod config;
pub mod constants;
mod error;
pub mod movie;
pub mod store;

pub use catalog_files::{AssetRef, AssetService, FilesError, StoredAsset};
pub use catalog_types::{NonEmptyText, Rating, TextError};
pub use config::CoreConfig;
pub use constants::*;
pub use error::{CatalogError, CatalogResult};
pub use movie::{Movie, MoviePatch, NewMovie, NewOpinion, Opinion};
pub use store::{JsonFileStore, MovieStore};
