//! The dashboard as a pure function of its inputs.
//!
//! [`render`] is invoked once per state change and recomputes the filtered
//! views, metrics, and every chart from scratch. Nothing is retained between
//! calls.

use crime_dashboard_analytics_models::{DashboardState, DashboardView, DatasetBounds};
use crime_dashboard_loader::Dataset;
use rand::Rng;

use crate::{charts, filter, metrics};

/// Bounds of `dataset` for the date pickers, `None` when it is empty.
#[must_use]
pub fn bounds(dataset: &Dataset) -> Option<DatasetBounds> {
    dataset.bounds().map(|b| DatasetBounds {
        min_date: b.min,
        max_date: b.max,
        record_count: dataset.len() as u64,
    })
}

/// Computes the full view model for `state`.
///
/// `rng` drives the density map sample; pass a seeded generator for
/// reproducible output.
pub fn render<R: Rng + ?Sized>(
    dataset: &Dataset,
    state: &DashboardState,
    rng: &mut R,
) -> DashboardView {
    let outcome = filter::apply(dataset, state.range, &state.selection);
    let metrics = metrics::compute(
        &outcome.primary,
        outcome.comparison.as_ref(),
        outcome.duration_days,
    );
    let cards = metrics::cards(&metrics);
    let charts = charts::render_all(&outcome.primary, rng);

    DashboardView {
        bounds: bounds(dataset),
        range: outcome.range,
        range_error: outcome.range_error,
        duration_days: outcome.duration_days,
        comparison_window: outcome.comparison_window,
        comparison_valid: outcome.comparison_valid,
        options: outcome.options,
        metrics,
        cards,
        charts,
    }
}
