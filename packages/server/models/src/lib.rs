#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the crime dashboard server.
//!
//! The dashboard endpoints return the analytics view models directly; the
//! types here cover the query string and the small envelope responses.

use chrono::NaiveDate;
use crime_dashboard_analytics_models::{
    DashboardState, DateRange, FilterSelection, MetricCard, Metrics, RangeError,
};
use serde::{Deserialize, Serialize};

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Always `true` when the server answers.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Response of `GET /api/bounds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBounds {
    /// Earliest occurrence date, absent for an empty dataset.
    pub min_date: Option<NaiveDate>,
    /// Latest occurrence date, absent for an empty dataset.
    pub max_date: Option<NaiveDate>,
    /// Number of loaded records.
    pub record_count: u64,
    /// Why the dataset could not be loaded, if it could not.
    pub load_error: Option<String>,
}

/// Response of `GET /api/metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetrics {
    /// Effective date range after defaulting.
    pub range: Option<DateRange>,
    /// Range validation problem, if any.
    pub range_error: Option<RangeError>,
    /// Raw metric values.
    pub metrics: Metrics,
    /// Display-ready metric cards.
    pub cards: Vec<MetricCard>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Creates a new error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Query parameters shared by the options, metrics, and dashboard
/// endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQueryParams {
    /// First day of the range (`YYYY-MM-DD`).
    pub from: Option<NaiveDate>,
    /// Last day of the range (`YYYY-MM-DD`).
    pub to: Option<NaiveDate>,
    /// Comma-separated list of areas to include.
    pub areas: Option<String>,
    /// Comma-separated list of crime categories to include.
    pub categories: Option<String>,
    /// Comma-separated list of victim genders to include.
    pub genders: Option<String>,
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl DashboardQueryParams {
    /// The requested date range.
    ///
    /// Returns `None` when neither end is given. A missing end is taken
    /// from `full`, the dataset's own extent.
    #[must_use]
    pub fn range(&self, full: Option<DateRange>) -> Option<DateRange> {
        if self.from.is_none() && self.to.is_none() {
            return None;
        }
        let start = self.from.or(full.map(|f| f.start)).or(self.to)?;
        let end = self.to.or(full.map(|f| f.end)).or(self.from)?;
        Some(DateRange::new(start, end))
    }

    /// The categorical selection.
    #[must_use]
    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            areas: split_list(self.areas.as_deref()),
            crime_categories: split_list(self.categories.as_deref()),
            genders: split_list(self.genders.as_deref()),
        }
    }

    /// The full dashboard state these parameters describe.
    #[must_use]
    pub fn to_state(&self, full: Option<DateRange>) -> DashboardState {
        DashboardState {
            range: self.range(full),
            selection: self.selection(),
        }
    }
}
