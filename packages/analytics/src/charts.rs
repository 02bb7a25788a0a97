//! Chart renderers.
//!
//! Each renderer maps a filtered [`View`] to a chart specification. None of
//! them fail: an empty view yields a chart with no data and a placeholder
//! message.

use std::collections::{BTreeMap, BTreeSet};

use crime_dashboard_analytics_models::{
    BarChart, COLOR_SCALE, CategoryCount, DashboardCharts, DensityMap, DensityPoint,
    EMPTY_PLACEHOLDER, Heatmap, HexBin, LINE_COLOR, LatLon, LineChart, MARKER_COLOR, Orientation,
    PIE_COLORS, PieChart, TimeSeriesPoint,
};
use crime_dashboard_incident_models::{
    AgeBand, DayOfWeek, IncidentRecord, NOT_SPECIFIED, UNKNOWN_SENTINEL, parse_month_period,
};
use h3o::{LatLng, Resolution};
use rand::Rng;

use crate::View;

/// Maximum number of incidents plotted on the density map.
pub const MAP_SAMPLE_LIMIT: usize = 20_000;

/// Number of bars kept by the top-N charts and heatmap rows.
pub const TOP_N: usize = 10;

/// H3 resolution of the density map hexbins (~460m edge).
pub const HEX_RESOLUTION: u8 = 8;

const MAP_ZOOM: u8 = 10;
const MAP_RADIUS: u32 = 10;
const MAP_OPACITY: f64 = 0.7;
const PIE_HOLE: f64 = 0.3;
const COUNT_LABEL: &str = "Number of Crimes";

fn placeholder(view: &View<'_>) -> Option<String> {
    view.is_empty().then(|| EMPTY_PLACEHOLDER.to_string())
}

/// Counts sorted by descending count, ties by ascending label.
fn descending(counts: BTreeMap<&str, u64>) -> Vec<CategoryCount> {
    let mut bars: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(label, count)| CategoryCount::new(label, count))
        .collect();
    // Stable sort keeps the BTreeMap's ascending label order among ties.
    bars.sort_by(|a, b| b.count.cmp(&a.count));
    bars
}

fn bar_chart(
    view: &View<'_>,
    title: &str,
    category_label: &str,
    orientation: Orientation,
    bars: Vec<CategoryCount>,
) -> BarChart {
    BarChart {
        title: title.to_string(),
        category_label: category_label.to_string(),
        value_label: COUNT_LABEL.to_string(),
        orientation,
        bars,
        color_scale: COLOR_SCALE.to_string(),
        placeholder: placeholder(view),
    }
}

/// Geographic density of a uniform random sample of at most
/// [`MAP_SAMPLE_LIMIT`] incidents, with the sample also aggregated into H3
/// cells at [`HEX_RESOLUTION`].
pub fn density_map<R: Rng + ?Sized>(view: &View<'_>, rng: &mut R) -> DensityMap {
    let sample: Vec<&IncidentRecord> = if view.len() > MAP_SAMPLE_LIMIT {
        let mut indices = rand::seq::index::sample(rng, view.len(), MAP_SAMPLE_LIMIT).into_vec();
        indices.sort_unstable();
        indices.into_iter().map(|i| view.records()[i]).collect()
    } else {
        view.records().to_vec()
    };

    log::debug!(
        "Density map: sampled {} of {} incidents",
        sample.len(),
        view.len()
    );

    let points: Vec<DensityPoint> = sample
        .iter()
        .map(|r| DensityPoint {
            lat: r.latitude,
            lon: r.longitude,
            weight: 1.0,
            area: r.area.clone(),
            crime_category: r.crime_category.clone(),
        })
        .collect();

    DensityMap {
        title: "Crime Density Map".to_string(),
        center: mean_center(&sample),
        hexbins: hexbins(&sample),
        points,
        hex_resolution: HEX_RESOLUTION,
        zoom: MAP_ZOOM,
        radius: MAP_RADIUS,
        opacity: MAP_OPACITY,
        color_scale: COLOR_SCALE.to_string(),
        population: view.len() as u64,
        placeholder: placeholder(view),
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean_center(sample: &[&IncidentRecord]) -> Option<LatLon> {
    if sample.is_empty() {
        return None;
    }
    let n = sample.len() as f64;
    let lat = sample.iter().map(|r| r.latitude).sum::<f64>() / n;
    let lon = sample.iter().map(|r| r.longitude).sum::<f64>() / n;
    Some(LatLon { lat, lon })
}

fn hexbins(sample: &[&IncidentRecord]) -> Vec<HexBin> {
    let Ok(resolution) = Resolution::try_from(HEX_RESOLUTION) else {
        return Vec::new();
    };

    let mut counts: BTreeMap<u64, u64> = BTreeMap::new();
    let mut skipped = 0_u64;
    for record in sample {
        let Ok(coord) = LatLng::new(record.latitude, record.longitude) else {
            skipped += 1;
            continue;
        };
        *counts.entry(u64::from(coord.to_cell(resolution))).or_default() += 1;
    }
    if skipped > 0 {
        log::debug!("Skipped {skipped} incidents with invalid coordinates for hexbins");
    }

    let mut bins: Vec<HexBin> = counts
        .into_iter()
        .filter_map(|(index, count)| {
            let cell = h3o::CellIndex::try_from(index).ok()?;
            let center = LatLng::from(cell);
            Some(HexBin {
                cell: cell.to_string(),
                lat: center.lat(),
                lon: center.lng(),
                count,
            })
        })
        .collect();
    bins.sort_by(|a, b| b.count.cmp(&a.count));
    bins
}

/// Incidents per month, in chronological order.
#[must_use]
pub fn monthly_trend(view: &View<'_>) -> LineChart {
    let mut periods: Vec<(&str, u64)> = view
        .count_by(|r| r.month_period.as_str())
        .into_iter()
        .collect();
    periods.sort_by_key(|(period, _)| parse_month_period(period));

    LineChart {
        title: "Crimes per Month".to_string(),
        points: periods
            .into_iter()
            .map(|(period, count)| TimeSeriesPoint {
                period: period.to_string(),
                count,
            })
            .collect(),
        line_color: LINE_COLOR.to_string(),
        marker_color: MARKER_COLOR.to_string(),
        placeholder: placeholder(view),
    }
}

/// Incidents per area, most affected first.
#[must_use]
pub fn by_area(view: &View<'_>) -> BarChart {
    bar_chart(
        view,
        "Crime Rate by Area",
        "Area",
        Orientation::Horizontal,
        descending(view.count_by(|r| r.area.as_str())),
    )
}

/// Incidents per crime category, most frequent first.
#[must_use]
pub fn by_crime_category(view: &View<'_>) -> BarChart {
    bar_chart(
        view,
        "Most Frequent Crime Categories",
        "Crime Category",
        Orientation::Horizontal,
        descending(view.count_by(|r| r.crime_category.as_str())),
    )
}

/// Incidents per hour of day, for the hours present in the view.
#[must_use]
pub fn by_hour(view: &View<'_>) -> BarChart {
    let bars = view
        .count_by(|r| r.hour)
        .into_iter()
        .map(|(hour, count)| CategoryCount::new(hour.to_string(), count))
        .collect();
    bar_chart(
        view,
        "Crimes per Hour (24h)",
        "Hour of Day",
        Orientation::Vertical,
        bars,
    )
}

/// Incidents per day of week, Monday through Sunday. Days without
/// incidents are included with a zero count.
#[must_use]
pub fn by_day_of_week(view: &View<'_>) -> BarChart {
    let counts = view.count_by(|r| r.day_of_week);
    let bars = DayOfWeek::all()
        .into_iter()
        .map(|day| CategoryCount::new(day.to_string(), counts.get(&day).copied().unwrap_or(0)))
        .collect();
    bar_chart(
        view,
        "Crimes per Day of Week",
        "Day of Week",
        Orientation::Vertical,
        bars,
    )
}

/// Share of incidents per victim gender.
#[must_use]
pub fn victim_gender(view: &View<'_>) -> PieChart {
    PieChart {
        title: "Victim Gender Proportion".to_string(),
        slices: descending(view.count_by(|r| r.victim_gender.as_str())),
        hole: PIE_HOLE,
        colors: PIE_COLORS.iter().map(ToString::to_string).collect(),
        placeholder: placeholder(view),
    }
}

/// Incidents per victim age band, youngest first with `Not Specified` last.
/// Only bands present in the view are included.
#[must_use]
pub fn by_age_band(view: &View<'_>) -> BarChart {
    let counts = view.count_by(|r| r.victim_age_band);
    let bars = AgeBand::all()
        .into_iter()
        .filter_map(|band| {
            counts
                .get(&band)
                .map(|&count| CategoryCount::new(band.to_string(), count))
        })
        .collect();
    bar_chart(
        view,
        "Crimes per Age Group",
        "Age Group",
        Orientation::Vertical,
        bars,
    )
}

/// The [`TOP_N`] most frequent victim ethnicities.
#[must_use]
pub fn by_ethnicity(view: &View<'_>) -> BarChart {
    let mut bars = descending(view.count_by(|r| r.victim_ethnicity.as_str()));
    bars.truncate(TOP_N);
    bar_chart(
        view,
        "Top 10 Victim Ethnicities",
        "Ethnicity",
        Orientation::Horizontal,
        bars,
    )
}

/// The [`TOP_N`] most frequent weapons, ignoring unrecorded ones.
#[must_use]
pub fn by_weapon(view: &View<'_>) -> BarChart {
    let mut bars: Vec<CategoryCount> = descending(view.count_by(|r| r.weapon.as_str()))
        .into_iter()
        .filter(|bar| bar.label != NOT_SPECIFIED && bar.label != UNKNOWN_SENTINEL)
        .collect();
    bars.truncate(TOP_N);
    bar_chart(
        view,
        "Top 10 Weapons (Excluding Not Specified)",
        "Weapon",
        Orientation::Horizontal,
        bars,
    )
}

/// The [`TOP_N`] most frequent premises.
#[must_use]
pub fn by_premise(view: &View<'_>) -> BarChart {
    let mut bars = descending(view.count_by(|r| r.premise.as_str()));
    bars.truncate(TOP_N);
    bar_chart(
        view,
        "Top 10 Premises",
        "Premise",
        Orientation::Horizontal,
        bars,
    )
}

/// Cross-tabulation of the [`TOP_N`] most frequent premises against every
/// crime category present in the view.
#[must_use]
pub fn premise_vs_category(view: &View<'_>) -> Heatmap {
    let mut premises = descending(view.count_by(|r| r.premise.as_str()));
    premises.truncate(TOP_N);
    let rows: Vec<String> = premises.into_iter().map(|p| p.label).collect();

    let columns: Vec<String> = view
        .iter()
        .map(|r| r.crime_category.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let cells = view.count_by(|r| (r.premise.as_str(), r.crime_category.as_str()));
    let values = rows
        .iter()
        .map(|premise| {
            columns
                .iter()
                .map(|category| {
                    cells
                        .get(&(premise.as_str(), category.as_str()))
                        .copied()
                        .unwrap_or(0)
                })
                .collect()
        })
        .collect();

    Heatmap {
        title: "Premise vs Crime Category".to_string(),
        row_label: "Premise".to_string(),
        column_label: "Crime Category".to_string(),
        rows,
        columns,
        values,
        color_scale: COLOR_SCALE.to_string(),
        placeholder: placeholder(view),
    }
}

/// Renders every chart for `view`.
pub fn render_all<R: Rng + ?Sized>(view: &View<'_>, rng: &mut R) -> DashboardCharts {
    DashboardCharts {
        density_map: density_map(view, rng),
        monthly_trend: monthly_trend(view),
        by_area: by_area(view),
        by_crime_category: by_crime_category(view),
        by_hour: by_hour(view),
        by_day_of_week: by_day_of_week(view),
        victim_gender: victim_gender(view),
        by_age_band: by_age_band(view),
        by_ethnicity: by_ethnicity(view),
        by_weapon: by_weapon(view),
        by_premise: by_premise(view),
        premise_vs_category: premise_vs_category(view),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;

    use super::*;
    use crate::test_support::{date, record};

    fn labels(chart: &BarChart) -> Vec<&str> {
        chart.bars.iter().map(|b| b.label.as_str()).collect()
    }

    fn counts(chart: &BarChart) -> Vec<u64> {
        chart.bars.iter().map(|b| b.count).collect()
    }

    #[test]
    fn day_of_week_always_has_seven_days() {
        // 2021-01-04 is a Monday, 2021-01-06 a Wednesday.
        let records = vec![
            record("2021-01-04", "A"),
            record("2021-01-06", "A"),
            record("2021-01-06", "B"),
        ];
        let view = View::from_records(records.iter().collect());
        let chart = by_day_of_week(&view);
        assert_eq!(
            labels(&chart),
            vec![
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
                "Sunday"
            ]
        );
        assert_eq!(counts(&chart), vec![1, 0, 2, 0, 0, 0, 0]);

        let empty = by_day_of_week(&View::default());
        assert_eq!(empty.bars.len(), 7);
        assert!(empty.bars.iter().all(|b| b.count == 0));
        assert!(empty.placeholder.is_some());
    }

    #[test]
    fn age_bands_follow_canonical_order() {
        let records = vec![
            record("2021-01-01", "A").with_victim_age_band(AgeBand::NotSpecified),
            record("2021-01-01", "A").with_victim_age_band(AgeBand::Over65),
            record("2021-01-01", "A").with_victim_age_band(AgeBand::Under18),
            record("2021-01-01", "A").with_victim_age_band(AgeBand::Under18),
        ];
        let view = View::from_records(records.iter().collect());
        let chart = by_age_band(&view);
        assert_eq!(labels(&chart), vec!["<18", "65+", "Not Specified"]);
        assert_eq!(counts(&chart), vec![2, 1, 1]);
    }

    #[test]
    fn weapons_exclude_unrecorded_values() {
        let mut records = vec![
            record("2021-01-01", "A").with_weapon(NOT_SPECIFIED),
            record("2021-01-01", "A").with_weapon(NOT_SPECIFIED),
            record("2021-01-01", "A").with_weapon(UNKNOWN_SENTINEL),
            record("2021-01-01", "A").with_weapon("KNIFE"),
        ];
        for i in 0..12 {
            records.push(record("2021-01-01", "A").with_weapon(format!("WEAPON {i:02}")));
        }
        let view = View::from_records(records.iter().collect());
        let chart = by_weapon(&view);
        assert_eq!(chart.bars.len(), TOP_N);
        assert!(
            chart
                .bars
                .iter()
                .all(|b| b.label != NOT_SPECIFIED && b.label != UNKNOWN_SENTINEL)
        );
        assert_eq!(chart.bars[0].label, "KNIFE");
    }

    #[test]
    fn area_bars_are_descending() {
        let records = vec![
            record("2021-01-01", "B"),
            record("2021-01-01", "C"),
            record("2021-01-01", "C"),
            record("2021-01-01", "A"),
            record("2021-01-01", "C"),
            record("2021-01-01", "A"),
        ];
        let view = View::from_records(records.iter().collect());
        let chart = by_area(&view);
        assert_eq!(labels(&chart), vec!["C", "A", "B"]);
        assert_eq!(counts(&chart), vec![3, 2, 1]);
        assert_eq!(chart.orientation, Orientation::Horizontal);
    }

    #[test]
    fn hours_are_ascending() {
        let records = vec![
            IncidentRecord::new(date("2021-01-01"), 23, 34.0, -118.0),
            IncidentRecord::new(date("2021-01-01"), 3, 34.0, -118.0),
            IncidentRecord::new(date("2021-01-01"), 23, 34.0, -118.0),
        ];
        let view = View::from_records(records.iter().collect());
        let chart = by_hour(&view);
        assert_eq!(labels(&chart), vec!["3", "23"]);
        assert_eq!(counts(&chart), vec![1, 2]);
    }

    #[test]
    fn monthly_trend_is_chronological() {
        let records = vec![
            record("2021-02-10", "A"),
            record("2020-12-31", "A"),
            record("2021-01-15", "A"),
            record("2021-01-16", "A"),
        ];
        let view = View::from_records(records.iter().collect());
        let chart = monthly_trend(&view);
        let periods: Vec<&str> = chart.points.iter().map(|p| p.period.as_str()).collect();
        assert_eq!(periods, vec!["2020-12", "2021-01", "2021-02"]);
        assert_eq!(chart.points[1].count, 2);
    }

    #[test]
    fn heatmap_uses_top_premises_and_all_categories() {
        let mut records = Vec::new();
        for i in 0..12_u64 {
            for _ in 0..=i {
                records.push(
                    record("2021-01-01", "A")
                        .with_premise(format!("PREMISE {i:02}"))
                        .with_crime_category(if i % 2 == 0 { "Assault" } else { "Theft" }),
                );
            }
        }
        let view = View::from_records(records.iter().collect());
        let heatmap = premise_vs_category(&view);

        assert_eq!(heatmap.rows.len(), TOP_N);
        assert_eq!(heatmap.rows[0], "PREMISE 11");
        assert!(!heatmap.rows.contains(&"PREMISE 00".to_string()));
        assert_eq!(heatmap.columns, vec!["Assault", "Theft"]);
        assert_eq!(heatmap.values[0], vec![0, 12]);
        assert_eq!(heatmap.values[1], vec![11, 0]);
    }

    #[test]
    fn density_map_caps_sample_size() {
        let records: Vec<IncidentRecord> = (0..MAP_SAMPLE_LIMIT + 500)
            .map(|_| IncidentRecord::new(date("2021-01-01"), 0, 34.05, -118.24))
            .collect();
        let view = View::from_records(records.iter().collect());
        let mut rng = StdRng::seed_from_u64(7);
        let map = density_map(&view, &mut rng);

        assert_eq!(map.points.len(), MAP_SAMPLE_LIMIT);
        assert_eq!(map.population, (MAP_SAMPLE_LIMIT + 500) as u64);
        assert_eq!(map.hexbins.len(), 1);
        assert_eq!(map.hexbins[0].count, MAP_SAMPLE_LIMIT as u64);
        let center = map.center.unwrap();
        assert!((center.lat - 34.05).abs() < 1e-9);
        assert!((center.lon + 118.24).abs() < 1e-9);
    }

    #[test]
    fn density_map_uses_whole_view_when_small() {
        let records = vec![record("2021-01-01", "A"), record("2021-01-02", "B")];
        let view = View::from_records(records.iter().collect());
        let map = density_map(&view, &mut StdRng::seed_from_u64(1));
        assert_eq!(map.points.len(), 2);
        assert_eq!(map.zoom, 10);
        assert_eq!(map.radius, 10);
        assert!(map.placeholder.is_none());
    }

    #[test]
    fn empty_view_renders_placeholders() {
        let charts = render_all(&View::default(), &mut StdRng::seed_from_u64(0));
        assert!(charts.density_map.points.is_empty());
        assert!(charts.density_map.center.is_none());
        assert!(charts.density_map.placeholder.is_some());
        assert!(charts.monthly_trend.points.is_empty());
        assert!(charts.monthly_trend.placeholder.is_some());
        assert!(charts.by_area.bars.is_empty());
        assert!(charts.victim_gender.slices.is_empty());
        assert!(charts.premise_vs_category.rows.is_empty());
        assert!(charts.premise_vs_category.placeholder.is_some());
    }
}
