use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, RouterOptions};
use catalog_core::{
    CoreConfig, DEFAULT_DATA_DIR, DEFAULT_PUBLIC_DIR, DEFAULT_REST_ADDR, DEFAULT_UPLOADS_DIR,
    JsonFileStore, config::max_upload_bytes_from_env_value,
};

/// Main entry point for the movie catalog server
///
/// Opens the catalog document, then serves the REST API, uploaded images and the web client
/// until interrupted.
///
/// # Environment Variables
/// - `CATALOG_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `CATALOG_DATA_DIR`: Directory holding `movies.json` (default: "data")
/// - `CATALOG_UPLOADS_DIR`: Directory holding uploaded images (default: "uploads")
/// - `CATALOG_PUBLIC_DIR`: Web client directory; skipped if it does not exist (default: "public")
/// - `CATALOG_MAX_UPLOAD_BYTES`: Request body limit in bytes (default: 10 MiB)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid or the catalog cannot be opened,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("catalog=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("CATALOG_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());
    let data_dir = std::env::var("CATALOG_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into());
    let uploads_dir =
        std::env::var("CATALOG_UPLOADS_DIR").unwrap_or_else(|_| DEFAULT_UPLOADS_DIR.into());
    let public_dir = PathBuf::from(
        std::env::var("CATALOG_PUBLIC_DIR").unwrap_or_else(|_| DEFAULT_PUBLIC_DIR.into()),
    );
    let max_upload_bytes =
        max_upload_bytes_from_env_value(std::env::var("CATALOG_MAX_UPLOAD_BYTES").ok())?;

    let cfg = Arc::new(CoreConfig::new(
        PathBuf::from(data_dir),
        PathBuf::from(uploads_dir),
    )?);
    let store = JsonFileStore::open(cfg)?;
    tracing::info!(path = %store.path().display(), "catalog opened");

    let public_dir = if public_dir.is_dir() {
        Some(public_dir)
    } else {
        tracing::warn!(
            dir = %public_dir.display(),
            "public directory not found; web client will not be served"
        );
        None
    };

    let app = api_rest::router(
        AppState::from_json_store(store),
        RouterOptions {
            public_dir,
            max_upload_bytes,
        },
    );

    tracing::info!("-- Starting movie catalog on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Movie catalog stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
