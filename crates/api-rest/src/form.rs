//! Multipart movie form parsing.
//!
//! Browsers send every form field as text, including an empty `image` part when no file
//! was chosen. Empty text and empty file parts are treated as absent.

use crate::error::{AppError, AppResult};
use axum::{body::Bytes, extract::Multipart};
use catalog_core::{CatalogError, MoviePatch, NewMovie, Rating};
use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Image part of a movie form.
#[derive(Debug)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Raw fields of a movie form, before validation.
#[derive(Debug, Default)]
pub struct MovieUpload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub rating: Option<String>,
    pub image: Option<ImageUpload>,
}

fn bad_multipart(e: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(format!("malformed multipart body: {}", e))
}

/// Drains a multipart stream into a [`MovieUpload`]. Unknown fields are skipped.
pub async fn read_movie_form(mut multipart: Multipart) -> AppResult<MovieUpload> {
    let mut upload = MovieUpload::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "image" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(bad_multipart)?;

                if let Some(file_name) = file_name.filter(|n| !n.is_empty()) {
                    if !bytes.is_empty() {
                        upload.image = Some(ImageUpload {
                            file_name,
                            content_type,
                            bytes,
                        });
                    }
                }
            }
            "name" => upload.name = Some(field.text().await.map_err(bad_multipart)?),
            "description" => upload.description = Some(field.text().await.map_err(bad_multipart)?),
            "date" => upload.date = Some(field.text().await.map_err(bad_multipart)?),
            "rating" => upload.rating = Some(field.text().await.map_err(bad_multipart)?),
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    Ok(upload)
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        AppError::Catalog(CatalogError::InvalidInput(format!(
            "date must be YYYY-MM-DD, got '{}'",
            value
        )))
    })
}

impl MovieUpload {
    /// Fields for a new movie. A missing or non-numeric rating becomes an invalid rating.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `date` is present but not `YYYY-MM-DD`.
    pub fn into_new_movie(self) -> AppResult<(NewMovie, Option<ImageUpload>)> {
        let date = present(self.date).map(|d| parse_date(&d)).transpose()?;
        let rating = self
            .rating
            .map(|r| Rating::parse_lenient(&r))
            .unwrap_or_else(Rating::invalid);

        let movie = NewMovie {
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            date,
            rating,
        };
        Ok((movie, self.image))
    }

    /// A patch holding only the fields the form actually filled in.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `date` is present but not `YYYY-MM-DD`.
    pub fn into_patch(self) -> AppResult<(MoviePatch, Option<ImageUpload>)> {
        let patch = MoviePatch {
            name: present(self.name),
            description: present(self.description),
            date: present(self.date).map(|d| parse_date(&d)).transpose()?,
            rating: present(self.rating).map(|r| Rating::parse_lenient(&r)),
        };
        Ok((patch, self.image))
    }
}
