//! Request handlers.
//!
//! Paths in the OpenAPI annotations use the `/api` mount; the same handlers also answer on
//! the bare `/movies` routes.

use crate::error::{AppError, AppResult};
use crate::form::{read_movie_form, ImageUpload};
use crate::AppState;
use api_shared::{AckRes, ErrorRes, HealthRes, HealthService, MovieForm};
use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use catalog_core::{AssetRef, Movie, NewOpinion, Opinion};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/api/movies",
    responses(
        (status = 200, description = "All movies in catalog order", body = [Movie]),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// List every movie in catalog order.
#[axum::debug_handler]
pub async fn list_movies(State(state): State<AppState>) -> AppResult<Json<Vec<Movie>>> {
    Ok(Json(state.store.list()?))
}

#[utoipa::path(
    get,
    path = "/api/movies/{id}",
    params(("id" = String, Path, description = "Movie id")),
    responses(
        (status = 200, description = "The movie", body = Movie),
        (status = 404, description = "No movie with this id", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Movie>> {
    Ok(Json(state.store.get(&id)?))
}

#[utoipa::path(
    post,
    path = "/api/movies",
    request_body(content = MovieForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Movie created", body = Movie),
        (status = 400, description = "Malformed form, bad date or unsupported image", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Create a movie from a multipart form.
///
/// The image, if any, is stored before the record. If the record cannot be persisted the
/// freshly stored image is removed again.
#[axum::debug_handler]
pub async fn create_movie(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Movie>)> {
    let (fields, image) = read_movie_form(multipart).await?.into_new_movie()?;
    let stored = store_image(&state, image)?;

    match state.store.create(fields, stored.clone()) {
        Ok(movie) => Ok((StatusCode::CREATED, Json(movie))),
        Err(e) => {
            discard_upload(&state, stored);
            Err(e.into())
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/movies/{id}",
    params(("id" = String, Path, description = "Movie id")),
    request_body(content = MovieForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated movie", body = Movie),
        (status = 400, description = "Malformed form, bad date or unsupported image", body = ErrorRes),
        (status = 404, description = "No movie with this id", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Update a movie from a multipart form.
///
/// Empty or omitted fields keep their stored values. A new image replaces the old one,
/// whose file is then removed.
#[axum::debug_handler]
pub async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<Movie>> {
    let (patch, image) = read_movie_form(multipart).await?.into_patch()?;
    let stored = store_image(&state, image)?;

    match state.store.update(&id, patch, stored.clone()) {
        Ok(movie) => Ok(Json(movie)),
        Err(e) => {
            discard_upload(&state, stored);
            Err(e.into())
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/movies/{id}",
    params(("id" = String, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Movie deleted", body = AckRes),
        (status = 404, description = "No movie with this id", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn delete_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AckRes>> {
    let removed = state.store.delete(&id)?;
    Ok(Json(AckRes::new(format!("Movie {} deleted", removed.id))))
}

#[utoipa::path(
    post,
    path = "/api/movies/{id}/opinions",
    params(("id" = String, Path, description = "Movie id")),
    request_body = NewOpinion,
    responses(
        (status = 201, description = "Opinion added", body = Opinion),
        (status = 400, description = "Movie already has three opinions, or malformed body", body = ErrorRes),
        (status = 404, description = "No movie with this id", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn add_opinion(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NewOpinion>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Opinion>)> {
    let Json(opinion) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let opinion = state.store.add_opinion(&id, opinion)?;
    Ok((StatusCode::CREATED, Json(opinion)))
}

fn store_image(state: &AppState, image: Option<ImageUpload>) -> AppResult<Option<AssetRef>> {
    let Some(image) = image else {
        return Ok(None);
    };

    let stored = state.assets.store(
        &image.file_name,
        image.content_type.as_deref(),
        &image.bytes,
    )?;
    tracing::debug!(
        asset = %stored.reference,
        sha256 = %stored.metadata.sha256,
        size_bytes = stored.metadata.size_bytes,
        "image stored"
    );
    Ok(Some(stored.reference))
}

fn discard_upload(state: &AppState, stored: Option<AssetRef>) {
    if let Some(asset) = stored {
        if let Err(e) = state.assets.remove(&asset) {
            tracing::warn!(asset = %asset, error = %e, "failed to remove orphaned upload");
        }
    }
}
