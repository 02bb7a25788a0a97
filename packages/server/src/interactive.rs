//! Interactive mode for the server.
//!
//! Prompts the user for bind address, port, and dataset path before
//! starting the server.

use std::path::PathBuf;
use std::sync::Arc;

use crime_dashboard_loader::DatasetLoader;
use crime_dashboard_loader::progress::ProgressCallback;
use dialoguer::{Confirm, Input};

use crate::{ServerConfig, ServerError};

/// Runs the server in interactive mode, prompting for configuration.
///
/// Each prompt defaults to the value from the environment (see
/// [`ServerConfig::from_env`]). The resulting configuration is passed to
/// [`super::run_server`].
///
/// # Errors
///
/// Returns a [`ServerError`] if the dataset is missing or the server
/// fails to start.
#[allow(clippy::future_not_send)]
pub async fn run(
    loader: &DatasetLoader,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<(), ServerError> {
    println!("Crime Dashboard Server");
    println!();

    let defaults = ServerConfig::from_env();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| defaults.bind_addr.clone());

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    let data_path: String = Input::new()
        .with_prompt("Dataset CSV")
        .default(defaults.data_path.display().to_string())
        .interact_text()
        .unwrap_or_else(|_| defaults.data_path.display().to_string());

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    let config = ServerConfig {
        bind_addr,
        port,
        data_path: PathBuf::from(data_path),
        ..defaults
    };

    super::run_server(config, loader, progress).await
}
