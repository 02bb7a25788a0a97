#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter, metric, and chart specification types for the crime dashboard.
//!
//! These are the inputs and outputs of the analytics engine: the user's
//! filter state, the headline metrics with their period-over-period
//! deltas, and one specification per chart. Everything here serializes to
//! camelCase JSON for the frontend.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Fallback value for "most frequent" metrics over an empty view.
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder shown by every chart when the filtered view is empty.
pub const EMPTY_PLACEHOLDER: &str = "No data matches the current filters.";

/// Continuous colour scale used by bars, heatmap, and density map.
pub const COLOR_SCALE: &str = "Reds";

/// Line colour for the trend chart.
pub const LINE_COLOR: &str = "#E3170D";

/// Marker colour for the trend chart.
pub const MARKER_COLOR: &str = "#FF6347";

/// Discrete palette for the pie chart.
pub const PIE_COLORS: &[&str] = &["#E3170D", "#FF6347", "#FF9999", "#A80E0E"];

// ── Filter inputs ────────────────────────────────────────────────────

/// Inclusive calendar date range selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// First day (inclusive, from 00:00:00).
    pub start: NaiveDate,
    /// Last day (inclusive, through 23:59:59).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new date range. No ordering check is done here; see
    /// [`DateRange::validate`].
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Checks that `start <= end`.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::StartAfterEnd`] if the start is after the end.
    pub fn validate(&self) -> Result<(), RangeError> {
        if self.start > self.end {
            Err(RangeError::StartAfterEnd {
                start: self.start,
                end: self.end,
            })
        } else {
            Ok(())
        }
    }
}

/// Problems with a user-selected date range. Reported, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RangeError {
    /// The start date is after the end date.
    #[error("Start date {start} must be on or before end date {end}")]
    StartAfterEnd {
        /// Selected start date.
        start: NaiveDate,
        /// Selected end date.
        end: NaiveDate,
    },
}

/// Selected values per categorical dimension.
///
/// An empty list means "no restriction" on that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    /// Selected areas.
    #[serde(default)]
    pub areas: Vec<String>,
    /// Selected crime categories.
    #[serde(default)]
    pub crime_categories: Vec<String>,
    /// Selected victim genders.
    #[serde(default)]
    pub genders: Vec<String>,
}

/// The equal-length window immediately preceding the primary range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonWindow {
    /// Window start (inclusive).
    pub start: NaiveDateTime,
    /// Window end (inclusive), one second before the primary start.
    pub end: NaiveDateTime,
}

/// Values offered in each multi-select, computed from the date-filtered
/// set. Each list is sorted and de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Available areas.
    pub areas: Vec<String>,
    /// Available crime categories.
    pub crime_categories: Vec<String>,
    /// Available victim genders.
    pub genders: Vec<String>,
}

/// Inclusive date bounds and size of the loaded dataset, used to bound
/// the date pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetBounds {
    /// Earliest occurrence date.
    pub min_date: NaiveDate,
    /// Latest occurrence date.
    pub max_date: NaiveDate,
    /// Number of records.
    pub record_count: u64,
}

// ── Metrics ──────────────────────────────────────────────────────────

/// Period-over-period change of the count metrics.
///
/// `NotApplicable` is distinct from a zero delta: it means the comparison
/// period starts before the earliest record in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Delta {
    /// A comparison period was available.
    #[serde(rename_all = "camelCase")]
    Available {
        /// `total_count - previous_total`.
        delta_count: i64,
        /// `rate_per_day - previous_rate`.
        delta_rate: f64,
        /// Total in the comparison period.
        previous_total: u64,
        /// Rate per day in the comparison period.
        previous_rate: f64,
    },
    /// The comparison period predates the dataset.
    NotApplicable,
}

impl Delta {
    /// Whether a delta was computed.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

/// The four headline metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Number of incidents in the view.
    pub total_count: u64,
    /// Incidents per day, rounded to two decimals.
    pub rate_per_day: f64,
    /// Most frequent area, or [`NOT_AVAILABLE`].
    pub top_area: String,
    /// Most frequent specific crime, or [`NOT_AVAILABLE`].
    pub top_crime: String,
    /// Change versus the comparison period.
    pub delta: Delta,
}

/// How a frontend should colour a delta annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeltaColor {
    /// Increases are shown in the "bad" colour.
    Inverse,
    /// Increases are shown in the "good" colour.
    Normal,
    /// No colouring.
    Off,
}

/// One display-ready metric card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricCard {
    /// Card label.
    pub label: String,
    /// Formatted value.
    pub value: String,
    /// Formatted delta annotation; absent when not applicable.
    pub delta: Option<String>,
    /// Colouring rule for the delta.
    pub delta_color: DeltaColor,
}

// ── Chart specifications ─────────────────────────────────────────────

/// Count of incidents for one category value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Category value.
    pub label: String,
    /// Number of incidents.
    pub count: u64,
}

impl CategoryCount {
    /// Creates a new count.
    #[must_use]
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// A time-series data point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    /// Period label (`"YYYY-MM"`).
    pub period: String,
    /// Incident count in this period.
    pub count: u64,
}

/// Bar direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    /// Bars grow left to right; categories on the y axis.
    Horizontal,
    /// Bars grow bottom to top; categories on the x axis.
    Vertical,
}

/// A bar chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarChart {
    /// Chart title.
    pub title: String,
    /// Axis label for the categories.
    pub category_label: String,
    /// Axis label for the counts.
    pub value_label: String,
    /// Bar direction.
    pub orientation: Orientation,
    /// Bars in display order.
    pub bars: Vec<CategoryCount>,
    /// Continuous colour scale keyed on the count.
    pub color_scale: String,
    /// Message shown instead of the chart when there is no data.
    pub placeholder: Option<String>,
}

/// A line chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChart {
    /// Chart title.
    pub title: String,
    /// Points in chronological order.
    pub points: Vec<TimeSeriesPoint>,
    /// Line colour.
    pub line_color: String,
    /// Marker colour.
    pub marker_color: String,
    /// Message shown instead of the chart when there is no data.
    pub placeholder: Option<String>,
}

/// A (donut) pie chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieChart {
    /// Chart title.
    pub title: String,
    /// Slices, largest first.
    pub slices: Vec<CategoryCount>,
    /// Relative size of the centre hole (0 = full pie).
    pub hole: f64,
    /// Discrete slice palette.
    pub colors: Vec<String>,
    /// Message shown instead of the chart when there is no data.
    pub placeholder: Option<String>,
}

/// A cross-tabulated heatmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heatmap {
    /// Chart title.
    pub title: String,
    /// Axis label for the rows.
    pub row_label: String,
    /// Axis label for the columns.
    pub column_label: String,
    /// Row keys.
    pub rows: Vec<String>,
    /// Column keys.
    pub columns: Vec<String>,
    /// `values[row][column]` counts.
    pub values: Vec<Vec<u64>>,
    /// Continuous colour scale.
    pub color_scale: String,
    /// Message shown instead of the chart when there is no data.
    pub placeholder: Option<String>,
}

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatLon {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

/// One weighted point on the density surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Weight contributed to the surface.
    pub weight: f64,
    /// Area, shown on hover.
    pub area: String,
    /// Crime category, shown on hover.
    pub crime_category: String,
}

/// Sampled incidents aggregated into one H3 cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HexBin {
    /// H3 cell index as a hex string.
    pub cell: String,
    /// Cell centre latitude.
    pub lat: f64,
    /// Cell centre longitude.
    pub lon: f64,
    /// Number of sampled incidents in the cell.
    pub count: u64,
}

/// A geographic density map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityMap {
    /// Chart title.
    pub title: String,
    /// Sampled points.
    pub points: Vec<DensityPoint>,
    /// Sampled points aggregated into H3 cells, densest first.
    pub hexbins: Vec<HexBin>,
    /// H3 resolution used for `hexbins`.
    pub hex_resolution: u8,
    /// Initial map centre (mean of the sample).
    pub center: Option<LatLon>,
    /// Initial zoom level.
    pub zoom: u8,
    /// Density kernel radius in pixels.
    pub radius: u32,
    /// Layer opacity.
    pub opacity: f64,
    /// Continuous colour scale.
    pub color_scale: String,
    /// Size of the view the sample was drawn from.
    pub population: u64,
    /// Message shown instead of the chart when there is no data.
    pub placeholder: Option<String>,
}

/// Every chart on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCharts {
    /// Geographic density map.
    pub density_map: DensityMap,
    /// Incidents per month.
    pub monthly_trend: LineChart,
    /// Incidents per area.
    pub by_area: BarChart,
    /// Incidents per crime category.
    pub by_crime_category: BarChart,
    /// Incidents per hour of day.
    pub by_hour: BarChart,
    /// Incidents per day of week.
    pub by_day_of_week: BarChart,
    /// Victim gender proportions.
    pub victim_gender: PieChart,
    /// Incidents per victim age band.
    pub by_age_band: BarChart,
    /// Top victim ethnicities.
    pub by_ethnicity: BarChart,
    /// Top weapons.
    pub by_weapon: BarChart,
    /// Top premises.
    pub by_premise: BarChart,
    /// Premise vs crime category cross-tab.
    pub premise_vs_category: Heatmap,
}

// ── Dashboard state and view model ───────────────────────────────────

/// Everything the user can change on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    /// Selected range; `None` means the full extent of the dataset.
    pub range: Option<DateRange>,
    /// Categorical selections.
    #[serde(default)]
    pub selection: FilterSelection,
}

/// Everything the dashboard displays for one [`DashboardState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// Dataset bounds for the date pickers; `None` for an empty dataset.
    pub bounds: Option<DatasetBounds>,
    /// Effective range after defaulting.
    pub range: Option<DateRange>,
    /// Range validation problem, if any.
    pub range_error: Option<RangeError>,
    /// Length of the range in days (0 when invalid).
    pub duration_days: i64,
    /// Comparison window, when the range is valid.
    pub comparison_window: Option<ComparisonWindow>,
    /// Whether deltas were computed.
    pub comparison_valid: bool,
    /// Multi-select options.
    pub options: FilterOptions,
    /// Headline metrics.
    pub metrics: Metrics,
    /// Display-ready metric cards.
    pub cards: Vec<MetricCard>,
    /// All charts.
    pub charts: DashboardCharts,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn range_validation() {
        assert!(DateRange::new(date(2021, 1, 1), date(2021, 1, 1)).validate().is_ok());
        let err = DateRange::new(date(2021, 1, 2), date(2021, 1, 1))
            .validate()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Start date 2021-01-02 must be on or before end date 2021-01-01"
        );
    }

    #[test]
    fn not_applicable_delta_serializes_distinctly_from_zero() {
        let na = serde_json::to_value(Delta::NotApplicable).unwrap();
        assert_eq!(na, serde_json::json!({ "status": "notApplicable" }));

        let zero = serde_json::to_value(Delta::Available {
            delta_count: 0,
            delta_rate: 0.0,
            previous_total: 5,
            previous_rate: 1.0,
        })
        .unwrap();
        assert_eq!(zero["status"], "available");
        assert_eq!(zero["deltaCount"], 0);
    }

    #[test]
    fn selection_deserializes_with_missing_dimensions() {
        let selection: FilterSelection =
            serde_json::from_str(r#"{ "areas": ["Central"] }"#).unwrap();
        assert_eq!(selection.areas, vec!["Central"]);
        assert!(selection.crime_categories.is_empty());
        assert!(selection.genders.is_empty());
    }
}
