#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the crime dashboard.
//!
//! Loads the crime dataset once at startup (downloading it first when a
//! source URL is configured and the file is missing) and serves the
//! dashboard view models as JSON under `/api`, plus the static frontend.
//! Every request recomputes its view from the shared, immutable dataset.

mod handlers;
pub mod interactive;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use crime_dashboard_loader::progress::ProgressCallback;
use crime_dashboard_loader::{DEFAULT_DATA_PATH, Dataset, DatasetLoader, LoadError, fetch};

/// Default directory of the built frontend.
pub const DEFAULT_STATIC_DIR: &str = "app/dist";

/// Errors that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The dataset file does not exist and could not be fetched.
    #[error(
        "Data file not found: {}. Place the cleaned CSV there or set CRIME_DATA_URL to download it.",
        path.display()
    )]
    DataNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// I/O error while binding or running the HTTP server.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Server configuration, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// Path of the cleaned CSV (`CRIME_DATA_PATH`).
    pub data_path: PathBuf,
    /// Where to download the CSV from when it is missing (`CRIME_DATA_URL`).
    pub data_url: Option<String>,
    /// Directory of the built frontend (`STATIC_DIR`).
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            data_url: None,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from environment variables, falling back to
    /// the defaults for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: non_empty("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            data_path: non_empty("CRIME_DATA_PATH").map_or(defaults.data_path, PathBuf::from),
            data_url: non_empty("CRIME_DATA_URL"),
            static_dir: non_empty("STATIC_DIR").map_or(defaults.static_dir, PathBuf::from),
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// The loaded dataset; empty when loading failed.
    pub dataset: Arc<Dataset>,
    /// Why loading failed, if it did.
    pub load_error: Option<String>,
}

impl AppState {
    /// State for a successfully loaded dataset.
    #[must_use]
    pub const fn ready(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            load_error: None,
        }
    }

    /// State for a dataset that could not be loaded. Holds the empty
    /// dataset so the endpoints can short-circuit.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            dataset: Arc::new(Dataset::empty()),
            load_error: Some(error.into()),
        }
    }

    /// Loads the dataset at `path` through `loader`.
    ///
    /// A missing file is fatal. Any other load error is logged and kept in
    /// [`AppState::load_error`] with an empty dataset in place.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::DataNotFound`] if the file does not exist.
    pub fn load(loader: &DatasetLoader, path: &Path) -> Result<Self, ServerError> {
        match loader.load(path) {
            Ok(dataset) => Ok(Self::ready(dataset)),
            Err(LoadError::NotFound { path }) => Err(ServerError::DataNotFound { path }),
            Err(e) => {
                log::error!("Failed to load dataset from {}: {e}", path.display());
                Ok(Self::failed(e.to_string()))
            }
        }
    }
}

/// Fetches the dataset if needed and loads it through `loader`.
///
/// `loader` is the process-wide dataset cache, so preparing state twice for
/// the same path reuses the first load.
///
/// A failed download is logged; startup then proceeds to the load step,
/// which fails with [`ServerError::DataNotFound`] if the file is still
/// missing.
///
/// # Errors
///
/// Returns [`ServerError::DataNotFound`] if the dataset file is missing
/// after the optional download.
pub async fn prepare_state(
    loader: &DatasetLoader,
    config: &ServerConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<AppState, ServerError> {
    if let Some(url) = &config.data_url
        && let Err(e) = fetch::ensure_local(&config.data_path, url, progress).await
    {
        log::error!("Failed to download dataset from {url}: {e}");
    }

    AppState::load(loader, &config.data_path)
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/bounds", web::get().to(handlers::bounds))
            .route("/options", web::get().to(handlers::options))
            .route("/metrics", web::get().to(handlers::metrics))
            .route("/dashboard", web::get().to(handlers::dashboard)),
    );
}

/// Starts the crime dashboard API server.
///
/// Prepares the dataset (see [`prepare_state`]) and starts the Actix-Web
/// HTTP server. The caller is responsible for providing the async runtime
/// (e.g. via `#[actix_web::main]`) and for initializing logging.
///
/// # Errors
///
/// Returns [`ServerError::DataNotFound`] if the dataset file is missing,
/// or [`ServerError::Io`] if the HTTP server fails to bind or encounters a
/// runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(
    config: ServerConfig,
    loader: &DatasetLoader,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<(), ServerError> {
    let state = web::Data::new(prepare_state(loader, &config, progress).await?);

    if let Some(error) = &state.load_error {
        log::warn!("Serving without data: {error}");
    } else {
        log::info!("Serving {} records", state.dataset.len());
    }

    let static_dir = config.static_dir;
    let serve_static = static_dir.is_dir();
    if !serve_static {
        log::warn!(
            "Static directory {} not found; serving the API only",
            static_dir.display()
        );
    }

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        let app = App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure);

        // Serve frontend static files (production)
        if serve_static {
            app.service(Files::new("/", static_dir.clone()).index_file("index.html"))
        } else {
            app
        }
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await?;

    Ok(())
}
