#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the crime dashboard.
//!
//! Provides `indicatif`-backed progress bars behind the loader's
//! [`ProgressCallback`] trait, plus [`init_logger`] which sets up
//! `indicatif-log-bridge` so that `log::info!` and friends are suspended
//! while progress bars redraw.

use std::sync::Arc;
use std::time::Duration;

use crime_dashboard_loader::progress::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// An `indicatif` [`ProgressBar`] that implements [`ProgressCallback`].
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Style to switch to once `set_total()` provides a known length.
    bar_style: ProgressStyle,
}

impl IndicatifProgress {
    /// Creates a progress bar for a download.
    ///
    /// Nothing is drawn until the download reports progress, so the bar
    /// stays invisible when the file is already present. It starts as a
    /// spinner (the server may not report a length) and transitions to a
    /// byte bar with throughput and ETA once
    /// [`ProgressCallback::set_total()`] is called.
    #[must_use]
    pub fn download_bar(multi: &MultiProgress, prefix: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(
            ProgressBar::new_spinner()
                .with_prefix(prefix.to_string())
                .with_style(
                    ProgressStyle::with_template("{spinner:.red} {prefix}: {msg} {bytes}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                ),
        );

        let bar_style = ProgressStyle::with_template(
            "  {prefix}: {wide_bar:.red/dim} {bytes}/{total_bytes} {bytes_per_sec} [{eta}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

        Arc::new(Self { bar, bar_style })
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        // Switch from spinner to bar style now that we know the total.
        self.bar.set_style(self.bar_style.clone());
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.enable_steady_tick(Duration::from_millis(100));
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.set_style(
            ProgressStyle::with_template("  {prefix}: {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        self.bar.finish_with_message(msg);
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while progress bars redraw.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Ignore error if logger was already set (e.g., in tests)

    log::set_max_level(level);

    multi
}
