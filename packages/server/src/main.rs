#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the crime dashboard.
//!
//! Reads its configuration from `BIND_ADDR`, `PORT`, `CRIME_DATA_PATH`,
//! `CRIME_DATA_URL`, and `STATIC_DIR`.

use crime_dashboard_loader::DatasetLoader;
use crime_dashboard_loader::progress::null_progress;
use crime_dashboard_server::{ServerConfig, run_server};

#[actix_web::main]
async fn main() {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let loader = DatasetLoader::new();

    if let Err(e) = run_server(ServerConfig::from_env(), &loader, &null_progress()).await {
        log::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
