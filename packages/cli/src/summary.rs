//! Plain-text rendering of a dashboard view for the terminal.

use chrono::NaiveDate;
use crime_dashboard_analytics_models::{
    BarChart, DashboardState, DashboardView, DateRange, FilterSelection,
};
use crime_dashboard_loader::Dataset;

/// Number of rows printed per breakdown.
const BREAKDOWN_ROWS: usize = 5;

/// Builds the dashboard state for a command-line request.
///
/// A missing end of the range is taken from the dataset's extent; with
/// neither end given the whole dataset is used.
#[must_use]
pub fn state_for(
    dataset: &Dataset,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    selection: FilterSelection,
) -> DashboardState {
    let range = match (from, to, dataset.bounds()) {
        (None, None, _) => None,
        (from, to, Some(bounds)) => Some(DateRange::new(
            from.unwrap_or(bounds.min),
            to.unwrap_or(bounds.max),
        )),
        (Some(from), to, None) => Some(DateRange::new(from, to.unwrap_or(from))),
        (None, Some(to), None) => Some(DateRange::new(to, to)),
    };
    DashboardState { range, selection }
}

fn breakdown(out: &mut String, chart: &BarChart) {
    out.push_str(&format!("\n{}\n", chart.title));
    if let Some(placeholder) = &chart.placeholder {
        out.push_str(&format!("  {placeholder}\n"));
        return;
    }
    let rows = &chart.bars[..chart.bars.len().min(BREAKDOWN_ROWS)];
    let width = rows.iter().map(|b| b.label.len()).max().unwrap_or(0);
    for bar in rows {
        out.push_str(&format!("  {:<width$}  {:>8}\n", bar.label, bar.count));
    }
}

/// Formats the headline metrics and the main breakdowns of `view`.
#[must_use]
pub fn format_summary(view: &DashboardView) -> String {
    let mut out = match view.range {
        Some(range) => format!(
            "Crime summary {} to {} ({} days)\n",
            range.start, range.end, view.duration_days
        ),
        None => "Crime summary (no data)\n".to_string(),
    };
    if let Some(error) = &view.range_error {
        out.push_str(&format!("Warning: {error}; showing the full dataset\n"));
    }
    out.push('\n');

    for card in &view.cards {
        out.push_str(&format!("{:<24} {:>12}", card.label, card.value));
        if let Some(delta) = &card.delta {
            out.push_str(&format!("  ({delta})"));
        }
        out.push('\n');
    }
    if !view.comparison_valid && view.range_error.is_none() {
        out.push_str("(no previous period in the dataset to compare with)\n");
    }

    breakdown(&mut out, &view.charts.by_area);
    breakdown(&mut out, &view.charts.by_crime_category);
    breakdown(&mut out, &view.charts.by_premise);

    out
}
