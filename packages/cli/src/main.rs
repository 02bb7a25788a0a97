#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the crime dashboard.
//!
//! ```text
//! crime_dashboard serve [--bind-addr 127.0.0.1] [--port 8080] [--data <csv>]
//! crime_dashboard summary [--from YYYY-MM-DD] [--to YYYY-MM-DD] [--areas A,B] ...
//! crime_dashboard fetch [--url <url>] [--data <csv>]
//! ```
//!
//! Running with no subcommand enters interactive mode.
//!
//! Uses `indicatif-log-bridge` (via [`crime_dashboard_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and the download progress bar never fight for the terminal.

mod summary;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use crime_dashboard_analytics::dashboard;
use crime_dashboard_analytics_models::FilterSelection;
use crime_dashboard_cli_utils::{IndicatifProgress, MultiProgress};
use crime_dashboard_loader::progress::ProgressCallback;
use crime_dashboard_loader::{DatasetLoader, fetch};
use crime_dashboard_server::{AppState, ServerConfig, prepare_state};
use dialoguer::{Input, Select};

#[derive(Parser)]
#[command(
    name = "crime_dashboard",
    about = "Explore the crime dataset from the terminal or serve the dashboard"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct DataArgs {
    /// Path of the cleaned crime CSV (defaults to `CRIME_DATA_PATH`)
    #[arg(long)]
    data: Option<PathBuf>,
    /// URL to download the CSV from when it is missing (defaults to
    /// `CRIME_DATA_URL`)
    #[arg(long)]
    url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Address to bind
        #[arg(long)]
        bind_addr: Option<String>,
        /// Port to bind
        #[arg(long)]
        port: Option<u16>,
        #[command(flatten)]
        data: DataArgs,
    },
    /// Print the headline metrics and top breakdowns
    Summary {
        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day of the range (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Comma-separated areas to include
        #[arg(long, value_delimiter = ',')]
        areas: Vec<String>,
        /// Comma-separated crime categories to include
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,
        /// Comma-separated victim genders to include
        #[arg(long, value_delimiter = ',')]
        genders: Vec<String>,
        #[command(flatten)]
        data: DataArgs,
    },
    /// Download the dataset if it is not present locally
    Fetch {
        #[command(flatten)]
        data: DataArgs,
    },
}

/// Top-level action selection for interactive mode.
enum Tool {
    Server,
    Summary,
    Fetch,
}

impl Tool {
    const ALL: &[Self] = &[Self::Server, Self::Summary, Self::Fetch];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Server => "Start server",
            Self::Summary => "Print summary",
            Self::Fetch => "Download dataset",
        }
    }
}

fn config_with(data: DataArgs) -> ServerConfig {
    let defaults = ServerConfig::from_env();
    ServerConfig {
        data_path: data.data.unwrap_or(defaults.data_path),
        data_url: data.url.or(defaults.data_url),
        ..defaults
    }
}

async fn serve(
    config: ServerConfig,
    loader: Arc<DatasetLoader>,
    progress: Arc<dyn ProgressCallback>,
) -> Result<(), Box<dyn std::error::Error>> {
    // The server uses actix-web's runtime, so we need to run it in a
    // blocking task to avoid nesting tokio runtimes.
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(crime_dashboard_server::run_server(
            config, &loader, &progress,
        ))
    })
    .await??;
    Ok(())
}

async fn print_summary(
    loader: &DatasetLoader,
    config: &ServerConfig,
    progress: &Arc<dyn ProgressCallback>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    selection: FilterSelection,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = prepare_state(loader, config, progress).await?;
    if let Some(error) = &state.load_error {
        return Err(format!("Failed to load dataset: {error}").into());
    }

    let AppState { dataset, .. } = state;
    let dashboard_state = summary::state_for(&dataset, from, to, selection);
    let view = dashboard::render(&dataset, &dashboard_state, &mut rand::thread_rng());
    print!("{}", summary::format_summary(&view));
    Ok(())
}

async fn download(
    loader: &DatasetLoader,
    config: &ServerConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(url) = &config.data_url else {
        return Err("No download URL configured; pass --url or set CRIME_DATA_URL".into());
    };

    if fetch::ensure_local(&config.data_path, url, progress).await? {
        println!("Downloaded dataset to {}", config.data_path.display());
    } else {
        println!("{} already exists", config.data_path.display());
    }

    // Validate the file so problems surface now rather than at serve time.
    let dataset = loader.load(&config.data_path)?;
    println!("{} records", dataset.len());
    Ok(())
}

fn optional_date(prompt: &str) -> Result<Option<NaiveDate>, Box<dyn std::error::Error>> {
    let value: String = Input::new()
        .with_prompt(format!("{prompt} (YYYY-MM-DD, blank for dataset bound)"))
        .allow_empty(true)
        .interact_text()?;
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    Ok(Some(NaiveDate::parse_from_str(value, "%Y-%m-%d")?))
}

async fn interactive(
    multi: &MultiProgress,
    loader: Arc<DatasetLoader>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Crime Dashboard");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    let progress = IndicatifProgress::download_bar(multi, "Dataset");

    match Tool::ALL[idx] {
        Tool::Server => {
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new()
                    .block_on(crime_dashboard_server::interactive::run(&loader, &progress))
            })
            .await??;
        }
        Tool::Summary => {
            let from = optional_date("From")?;
            let to = optional_date("To")?;
            print_summary(
                &loader,
                &ServerConfig::from_env(),
                &progress,
                from,
                to,
                FilterSelection::default(),
            )
            .await?;
        }
        Tool::Fetch => download(&loader, &ServerConfig::from_env(), &progress).await?,
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crime_dashboard_cli_utils::init_logger();
    let cli = Cli::parse();
    let loader = Arc::new(DatasetLoader::new());

    let Some(command) = cli.command else {
        return interactive(&multi, loader).await;
    };

    let progress = IndicatifProgress::download_bar(&multi, "Dataset");

    match command {
        Commands::Serve {
            bind_addr,
            port,
            data,
        } => {
            let mut config = config_with(data);
            if let Some(bind_addr) = bind_addr {
                config.bind_addr = bind_addr;
            }
            if let Some(port) = port {
                config.port = port;
            }
            serve(config, loader, progress).await?;
        }
        Commands::Summary {
            from,
            to,
            areas,
            categories,
            genders,
            data,
        } => {
            let selection = FilterSelection {
                areas,
                crime_categories: categories,
                genders,
            };
            print_summary(&loader, &config_with(data), &progress, from, to, selection).await?;
        }
        Commands::Fetch { data } => download(&loader, &config_with(data), &progress).await?,
    }

    Ok(())
}
