//! Headline metrics and their period-over-period deltas.

use std::collections::BTreeMap;

use crime_dashboard_analytics_models::{Delta, DeltaColor, MetricCard, Metrics, NOT_AVAILABLE};
use crime_dashboard_incident_models::IncidentRecord;

use crate::View;
use crate::format::{format_count, format_rate, format_signed_count, format_signed_rate};

/// Suffix appended to every delta annotation.
pub const DELTA_SUFFIX: &str = "from previous period";

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Incidents per day, rounded to two decimals. Zero when `duration_days`
/// is not positive.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rate_per_day(total: u64, duration_days: i64) -> f64 {
    if duration_days <= 0 {
        return 0.0;
    }
    round2(total as f64 / duration_days as f64)
}

/// Most frequent value in `counts`, ties broken by the lexically smallest
/// value. `None` when `counts` is empty.
#[must_use]
pub fn mode<'a>(counts: &BTreeMap<&'a str, u64>) -> Option<&'a str> {
    let mut best: Option<(&str, u64)> = None;
    // BTreeMap iterates in ascending key order, so only a strictly greater
    // count replaces the current best.
    for (&value, &count) in counts {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

fn mode_or_na<'a>(view: &View<'a>, key: impl Fn(&'a IncidentRecord) -> &'a str) -> String {
    mode(&view.count_by(key)).unwrap_or(NOT_AVAILABLE).to_string()
}

/// Computes the headline metrics of `view`.
///
/// `comparison` is the equal-length period preceding the view's range, or
/// `None` when that period starts before the dataset does; in that case
/// the delta is [`Delta::NotApplicable`] rather than zero.
#[must_use]
pub fn compute(view: &View<'_>, comparison: Option<&View<'_>>, duration_days: i64) -> Metrics {
    let total_count = view.len() as u64;
    let rate = rate_per_day(total_count, duration_days);

    let delta = comparison.map_or(Delta::NotApplicable, |previous| {
        let previous_total = previous.len() as u64;
        let previous_rate = rate_per_day(previous_total, duration_days);
        Delta::Available {
            delta_count: i64::try_from(total_count).unwrap_or(i64::MAX)
                - i64::try_from(previous_total).unwrap_or(i64::MAX),
            delta_rate: round2(rate - previous_rate),
            previous_total,
            previous_rate,
        }
    });

    Metrics {
        total_count,
        rate_per_day: rate,
        top_area: mode_or_na(view, |r| r.area.as_str()),
        top_crime: mode_or_na(view, |r| r.crime.as_str()),
        delta,
    }
}

/// Display-ready cards for the four headline metrics.
///
/// Count cards carry a signed delta annotation when a comparison period
/// exists. Deltas use inverse colouring since an increase in crime is bad.
#[must_use]
pub fn cards(metrics: &Metrics) -> Vec<MetricCard> {
    let (count_delta, rate_delta) = match &metrics.delta {
        Delta::Available {
            delta_count,
            delta_rate,
            ..
        } => (
            Some(format!("{} {DELTA_SUFFIX}", format_signed_count(*delta_count))),
            Some(format!("{} {DELTA_SUFFIX}", format_signed_rate(*delta_rate))),
        ),
        Delta::NotApplicable => (None, None),
    };

    vec![
        MetricCard {
            label: "Total Crimes".to_string(),
            value: format_count(metrics.total_count),
            delta: count_delta,
            delta_color: DeltaColor::Inverse,
        },
        MetricCard {
            label: "Average Crimes per Day".to_string(),
            value: format_rate(metrics.rate_per_day),
            delta: rate_delta,
            delta_color: DeltaColor::Inverse,
        },
        MetricCard {
            label: "Most Dangerous Area".to_string(),
            value: metrics.top_area.clone(),
            delta: None,
            delta_color: DeltaColor::Off,
        },
        MetricCard {
            label: "Most Frequent Crime".to_string(),
            value: metrics.top_crime.clone(),
            delta: None,
            delta_color: DeltaColor::Off,
        },
    ]
}

#[cfg(test)]
mod tests {
    use crime_dashboard_analytics_models::{DateRange, FilterSelection};
    use crime_dashboard_loader::Dataset;

    use super::*;
    use crate::filter;
    use crate::test_support::{date, record};

    fn three_records() -> Dataset {
        Dataset::from_records(vec![
            record("2021-01-01", "A"),
            record("2021-01-02", "B"),
            record("2021-01-03", "A"),
        ])
    }

    fn metrics_for(ds: &Dataset, start: &str, end: &str) -> Metrics {
        let outcome = filter::apply(
            ds,
            Some(DateRange::new(date(start), date(end))),
            &FilterSelection::default(),
        );
        compute(
            &outcome.primary,
            outcome.comparison.as_ref(),
            outcome.duration_days,
        )
    }

    #[test]
    fn three_day_range_counts_all_and_picks_area_a() {
        let m = metrics_for(&three_records(), "2021-01-01", "2021-01-03");
        assert_eq!(m.total_count, 3);
        assert_eq!(m.top_area, "A");
        assert!((m.rate_per_day - 1.0).abs() < f64::EPSILON);
        assert_eq!(m.delta, Delta::NotApplicable);
    }

    #[test]
    fn single_day_range_picks_area_b() {
        let m = metrics_for(&three_records(), "2021-01-02", "2021-01-02");
        assert_eq!(m.total_count, 1);
        assert_eq!(m.top_area, "B");
        assert_eq!(
            m.delta,
            Delta::Available {
                delta_count: 0,
                delta_rate: 0.0,
                previous_total: 1,
                previous_rate: 1.0,
            }
        );
    }

    #[test]
    fn rate_is_rounded_and_zero_for_non_positive_duration() {
        assert!((rate_per_day(10, 3) - 3.33).abs() < f64::EPSILON);
        assert!(rate_per_day(10, 0).abs() < f64::EPSILON);
        assert!(rate_per_day(10, -4).abs() < f64::EPSILON);
    }

    #[test]
    fn mode_ties_go_to_lexically_smallest() {
        let counts = BTreeMap::from([("Newton", 2), ("Central", 2), ("Hollywood", 1)]);
        assert_eq!(mode(&counts), Some("Central"));
        assert_eq!(mode(&BTreeMap::new()), None);
    }

    #[test]
    fn empty_view_reports_not_available() {
        let m = compute(&View::default(), None, 7);
        assert_eq!(m.total_count, 0);
        assert_eq!(m.top_area, NOT_AVAILABLE);
        assert_eq!(m.top_crime, NOT_AVAILABLE);
        assert!(m.rate_per_day.abs() < f64::EPSILON);
    }

    #[test]
    fn cards_format_deltas_with_sign() {
        let ds = Dataset::from_records(vec![
            record("2021-01-01", "A"),
            record("2021-01-03", "A"),
            record("2021-01-03", "B"),
            record("2021-01-04", "B"),
        ]);
        let m = metrics_for(&ds, "2021-01-03", "2021-01-04");
        let cards = cards(&m);

        assert_eq!(cards.len(), 4);
        assert_eq!(cards[0].label, "Total Crimes");
        assert_eq!(cards[0].value, "3");
        assert_eq!(cards[0].delta.as_deref(), Some("+2 from previous period"));
        assert_eq!(cards[0].delta_color, DeltaColor::Inverse);
        assert_eq!(cards[1].value, "1.50");
        assert_eq!(cards[1].delta.as_deref(), Some("+1.00 from previous period"));
        assert_eq!(cards[2].value, "B");
        assert_eq!(cards[3].value, "BATTERY - SIMPLE ASSAULT");
    }

    #[test]
    fn cards_omit_deltas_when_not_applicable() {
        let m = metrics_for(&three_records(), "2021-01-01", "2021-01-03");
        assert!(cards(&m).iter().all(|c| c.delta.is_none()));
    }
}
