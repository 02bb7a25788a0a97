//! Filter engine.
//!
//! Narrows the base dataset to the primary view for a date range and
//! categorical selection, and computes the equal-length comparison period
//! that immediately precedes the range.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use crime_dashboard_analytics_models::{
    ComparisonWindow, DateRange, FilterOptions, FilterSelection, RangeError,
};
use crime_dashboard_incident_models::IncidentRecord;
use crime_dashboard_loader::Dataset;

use crate::View;

/// Result of applying the filters to a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome<'a> {
    /// Effective date range (the requested one, or the dataset bounds when
    /// none was given). `None` only for an empty dataset.
    pub range: Option<DateRange>,
    /// Set when the requested range was invalid. The primary view then
    /// falls back to the full dataset.
    pub range_error: Option<RangeError>,
    /// Date- and category-filtered records.
    pub primary: View<'a>,
    /// Comparison period records; `None` unless `comparison_valid`.
    pub comparison: Option<View<'a>>,
    /// The comparison window, computed for any valid range whose window is
    /// representable.
    pub comparison_window: Option<ComparisonWindow>,
    /// Whether the comparison window starts on or after the first record.
    pub comparison_valid: bool,
    /// Length of the range in days, 0 when the range is invalid.
    pub duration_days: i64,
    /// Multi-select options from the date-filtered set.
    pub options: FilterOptions,
}

/// Midnight at the start of `date`.
#[must_use]
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// 23:59:59 at the end of `date`.
#[must_use]
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let (last_second, _) = NaiveTime::MIN.overflowing_sub_signed(TimeDelta::seconds(1));
    date.and_time(last_second)
}

/// Number of days in an inclusive range: `(end - start).days + 1`.
#[must_use]
pub fn duration_days(range: &DateRange) -> i64 {
    range.end.signed_duration_since(range.start).num_days() + 1
}

/// The window of `duration_days` days ending one second before the range
/// starts.
///
/// `None` when the window would start before the earliest representable
/// date.
#[must_use]
pub fn comparison_window(range: &DateRange) -> Option<ComparisonWindow> {
    let start = start_of_day(range.start);
    let length = TimeDelta::try_days(duration_days(range))?;
    Some(ComparisonWindow {
        start: start.checked_sub_signed(length)?,
        end: start.checked_sub_signed(TimeDelta::seconds(1))?,
    })
}

fn within<'a>(view: &View<'a>, start: NaiveDateTime, end: NaiveDateTime) -> View<'a> {
    view.filter(|r| {
        let at = r.occurred_at();
        start <= at && at <= end
    })
}

fn selected(values: &[String], value: &str) -> bool {
    values.is_empty() || values.iter().any(|v| v == value)
}

/// Applies the categorical selection. Empty dimensions do not restrict.
#[must_use]
pub fn apply_selection<'a>(view: &View<'a>, selection: &FilterSelection) -> View<'a> {
    view.filter(|r| {
        selected(&selection.areas, &r.area)
            && selected(&selection.crime_categories, &r.crime_category)
            && selected(&selection.genders, &r.victim_gender)
    })
}

fn unique(view: &View<'_>, key: fn(&IncidentRecord) -> &str) -> Vec<String> {
    view.iter()
        .map(key)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Sorted, unique multi-select options present in `view`.
#[must_use]
pub fn options_for(view: &View<'_>) -> FilterOptions {
    FilterOptions {
        areas: unique(view, |r| &r.area),
        crime_categories: unique(view, |r| &r.crime_category),
        genders: unique(view, |r| &r.victim_gender),
    }
}

/// Filters `dataset` to the requested range and selection.
///
/// A missing range defaults to the dataset bounds. An invalid range
/// (`start > end`) is reported through [`FilterOutcome::range_error`] and
/// the full dataset is used instead, with no comparison period. The
/// comparison view is only computed when the comparison window starts on
/// or after the earliest record, and it is never narrowed by the
/// categorical selection.
#[must_use]
pub fn apply<'a>(
    dataset: &'a Dataset,
    range: Option<DateRange>,
    selection: &FilterSelection,
) -> FilterOutcome<'a> {
    let range = range.or_else(|| {
        dataset
            .bounds()
            .map(|bounds| DateRange::new(bounds.min, bounds.max))
    });
    let all = View::all(dataset);

    let (date_filtered, range_error, days, window) = match range {
        None => (all.clone(), None, 0, None),
        Some(range) => match range.validate() {
            Err(e) => {
                log::warn!("{e}; falling back to the full dataset");
                (all.clone(), Some(e), 0, None)
            }
            Ok(()) => (
                within(&all, start_of_day(range.start), end_of_day(range.end)),
                None,
                duration_days(&range),
                comparison_window(&range),
            ),
        },
    };

    let comparison_valid = window
        .zip(dataset.min_date())
        .is_some_and(|(w, min)| w.start >= start_of_day(min));

    let comparison = window
        .filter(|_| comparison_valid)
        .map(|w| within(&all, w.start, w.end));

    let options = options_for(&date_filtered);
    let primary = apply_selection(&date_filtered, selection);

    log::debug!(
        "Filtered {} of {} records ({} days, comparison {})",
        primary.len(),
        dataset.len(),
        days,
        if comparison_valid { "valid" } else { "n/a" }
    );

    FilterOutcome {
        range,
        range_error,
        primary,
        comparison,
        comparison_window: window,
        comparison_valid,
        duration_days: days,
        options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, record};

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            record("2021-01-01", "A").with_victim_gender("M"),
            record("2021-01-02", "B"),
            record("2021-01-03", "A").with_crime_category("Theft"),
            record("2021-01-04", "C"),
            record("2021-01-05", "A"),
            record("2021-01-06", "B"),
        ])
    }

    fn range(start: &str, end: &str) -> Option<DateRange> {
        Some(DateRange::new(date(start), date(end)))
    }

    #[test]
    fn primary_view_is_within_range_inclusive() {
        let ds = dataset();
        let outcome = apply(&ds, range("2021-01-02", "2021-01-04"), &FilterSelection::default());

        assert_eq!(outcome.primary.len(), 3);
        for r in outcome.primary.iter() {
            assert!(r.occurred_on >= date("2021-01-02") && r.occurred_on <= date("2021-01-04"));
            assert!(ds.records().contains(r));
        }
        assert_eq!(outcome.duration_days, 3);
        assert!(outcome.range_error.is_none());
    }

    #[test]
    fn comparison_window_is_equal_length_and_adjacent() {
        let r = DateRange::new(date("2021-01-04"), date("2021-01-06"));
        let w = comparison_window(&r).unwrap();
        assert_eq!(w.start, start_of_day(date("2021-01-01")));
        assert_eq!(
            w.end,
            NaiveDate::from_ymd_opt(2021, 1, 3)
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap()
        );
        assert_eq!(
            (w.end + TimeDelta::seconds(1) - w.start).num_days(),
            duration_days(&r)
        );
    }

    #[test]
    fn comparison_view_is_computed_when_window_fits() {
        let ds = dataset();
        let outcome = apply(&ds, range("2021-01-04", "2021-01-06"), &FilterSelection::default());
        assert!(outcome.comparison_valid);
        assert_eq!(outcome.comparison.as_ref().map(View::len), Some(3));
    }

    #[test]
    fn comparison_before_first_record_is_invalid() {
        let ds = dataset();
        let outcome = apply(&ds, range("2021-01-02", "2021-01-03"), &FilterSelection::default());
        assert!(!outcome.comparison_valid);
        assert!(outcome.comparison.is_none());
        assert!(outcome.comparison_window.is_some());
    }

    #[test]
    fn invalid_range_falls_back_to_full_dataset() {
        let ds = dataset();
        let outcome = apply(&ds, range("2021-01-05", "2021-01-02"), &FilterSelection::default());
        assert!(matches!(
            outcome.range_error,
            Some(RangeError::StartAfterEnd { .. })
        ));
        assert_eq!(outcome.primary.len(), ds.len());
        assert!(!outcome.comparison_valid);
        assert!(outcome.comparison.is_none());
        assert_eq!(outcome.duration_days, 0);
    }

    #[test]
    fn missing_range_defaults_to_dataset_bounds() {
        let ds = dataset();
        let outcome = apply(&ds, None, &FilterSelection::default());
        assert_eq!(outcome.range, range("2021-01-01", "2021-01-06"));
        assert_eq!(outcome.primary.len(), ds.len());
        assert_eq!(outcome.duration_days, 6);
    }

    #[test]
    fn empty_selection_is_a_no_op() {
        let ds = dataset();
        let all = View::all(&ds);
        assert_eq!(apply_selection(&all, &FilterSelection::default()), all);
    }

    #[test]
    fn selections_apply_to_primary_view_only() {
        let ds = dataset();
        let selection = FilterSelection {
            areas: vec!["A".to_string()],
            ..FilterSelection::default()
        };
        let outcome = apply(&ds, range("2021-01-04", "2021-01-06"), &selection);
        assert_eq!(outcome.primary.len(), 1);
        assert!(outcome.primary.iter().all(|r| r.area == "A"));
        // The comparison period is not narrowed by the selection.
        assert_eq!(outcome.comparison.as_ref().map(View::len), Some(3));
    }

    #[test]
    fn dimensions_combine_with_and() {
        let ds = dataset();
        let selection = FilterSelection {
            areas: vec!["A".to_string(), "B".to_string()],
            crime_categories: vec!["Assault".to_string()],
            genders: vec!["F".to_string()],
        };
        let outcome = apply(&ds, None, &selection);
        let days: Vec<String> = outcome
            .primary
            .iter()
            .map(|r| r.occurred_on.to_string())
            .collect();
        assert_eq!(days, vec!["2021-01-02", "2021-01-05", "2021-01-06"]);
    }

    #[test]
    fn options_come_from_date_filtered_set() {
        let ds = dataset();
        let selection = FilterSelection {
            areas: vec!["A".to_string()],
            ..FilterSelection::default()
        };
        let outcome = apply(&ds, range("2021-01-01", "2021-01-03"), &selection);
        assert_eq!(outcome.options.areas, vec!["A", "B"]);
        assert_eq!(outcome.options.crime_categories, vec!["Assault", "Theft"]);
        assert_eq!(outcome.options.genders, vec!["F", "M"]);
    }

    #[test]
    fn end_of_day_is_last_second() {
        assert_eq!(
            end_of_day(date("2021-01-03")),
            date("2021-01-03").and_hms_opt(23, 59, 59).unwrap()
        );
        assert_eq!(
            end_of_day(NaiveDate::MAX),
            NaiveDate::MAX.and_hms_opt(23, 59, 59).unwrap()
        );
    }

    #[test]
    fn extreme_range_ends_do_not_overflow() {
        let ds = dataset();

        let outcome = apply(
            &ds,
            Some(DateRange::new(date("2021-01-01"), NaiveDate::MAX)),
            &FilterSelection::default(),
        );
        assert!(outcome.range_error.is_none());
        assert_eq!(outcome.primary.len(), ds.len());
        assert!(outcome.comparison_window.is_none());
        assert!(!outcome.comparison_valid);
        assert!(outcome.comparison.is_none());

        let outcome = apply(
            &ds,
            Some(DateRange::new(NaiveDate::MIN, date("2021-01-03"))),
            &FilterSelection::default(),
        );
        assert_eq!(outcome.primary.len(), 3);
        assert!(outcome.comparison_window.is_none());
        assert!(!outcome.comparison_valid);
    }

    #[test]
    fn empty_dataset_yields_empty_outcome() {
        let ds = Dataset::empty();
        let outcome = apply(&ds, None, &FilterSelection::default());
        assert!(outcome.range.is_none());
        assert!(outcome.primary.is_empty());
        assert!(!outcome.comparison_valid);
        assert_eq!(outcome.options, FilterOptions::default());
    }
}
