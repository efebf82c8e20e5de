//! # API REST
//!
//! REST API for the movie catalog.
//!
//! Handles:
//! - HTTP endpoints with axum, mounted under `/api` and at the root
//! - Multipart movie forms with image uploads
//! - Static serving of uploaded images and of the bundled web client
//! - OpenAPI/Swagger documentation
//!
//! Uses `api-shared` for response envelopes and `catalog-core` for the store.

#![warn(rust_2018_idioms)]

mod error;
mod form;
mod handlers;

pub use error::{AppError, AppResult};

use api_shared::{AckRes, ErrorRes, HealthRes, MovieForm};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use catalog_core::{AssetService, JsonFileStore, Movie, MovieStore, NewOpinion, Opinion};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state for the REST API server
///
/// Shared by all handlers. The asset service is the one the store uses, so references
/// produced by uploads are recognised as managed when records change.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn MovieStore>,
    assets: Arc<AssetService>,
}

impl AppState {
    pub fn new(store: Arc<dyn MovieStore>, assets: Arc<AssetService>) -> Self {
        Self { store, assets }
    }

    /// State backed by a [`JsonFileStore`] and its own asset service.
    pub fn from_json_store(store: JsonFileStore) -> Self {
        let assets = store.assets().clone();
        Self::new(Arc::new(store), assets)
    }
}

/// HTTP-level settings that are not part of the catalog itself.
#[derive(Clone, Debug)]
pub struct RouterOptions {
    /// Directory of the web client; unknown paths fall back to its `index.html`
    pub public_dir: Option<PathBuf>,
    /// Request body limit, which bounds image uploads
    pub max_upload_bytes: usize,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_movies,
        handlers::get_movie,
        handlers::create_movie,
        handlers::update_movie,
        handlers::delete_movie,
        handlers::add_opinion,
    ),
    components(schemas(
        Movie,
        Opinion,
        NewOpinion,
        MovieForm,
        HealthRes,
        AckRes,
        ErrorRes,
    ))
)]
pub struct ApiDoc;

fn movie_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/movies",
            get(handlers::list_movies).post(handlers::create_movie),
        )
        .route(
            "/movies/:id",
            get(handlers::get_movie)
                .put(handlers::update_movie)
                .delete(handlers::delete_movie),
        )
        .route("/movies/:id/opinions", post(handlers::add_opinion))
}

/// Builds the full application router.
///
/// Movie routes answer both under `/api` and at the root. Uploaded images are served from
/// the asset service's URL prefix.
pub fn router(state: AppState, options: RouterOptions) -> Router {
    let uploads_path = format!("/{}", state.assets.url_prefix().trim_matches('/'));
    let uploads = ServeDir::new(state.assets.directory());

    let mut app = Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", movie_routes())
        .merge(movie_routes())
        .nest_service(&uploads_path, uploads)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    if let Some(public_dir) = options.public_dir {
        let index = ServeFile::new(public_dir.join("index.html"));
        app = app.fallback_service(ServeDir::new(&public_dir).fallback(index));
    }

    app.layer(DefaultBodyLimit::max(options.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
