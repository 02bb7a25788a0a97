//! Row-level parsing and cleaning for the crime CSV.
//!
//! Turns one raw CSV row into either a cleaned [`IncidentRecord`], a
//! [`DropReason`] for rows the cleaning rules discard, or a parse error for
//! rows that are malformed.

use chrono::{NaiveDate, NaiveDateTime};
use crime_dashboard_incident_models::{AgeBand, IncidentRecord, normalize_sentinel};
use serde::Deserialize;

/// Date formats accepted for `occurrence_date`, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Datetime formats accepted for `occurrence_date`, tried in order. Only
/// the date part is kept.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
];

/// One CSV row as it appears in the source file.
///
/// Columns not listed here are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawIncidentRow {
    /// Occurrence date (see [`parse_occurrence_date`] for formats).
    pub occurrence_date: String,
    /// Time of day, `HH:MM[:SS]` or `HHMM`.
    pub occurrence_time: String,
    /// Reporting area.
    pub area: String,
    /// Broad crime category.
    pub crime_category: String,
    /// Specific crime description.
    pub crime: String,
    /// Victim age; may be blank.
    #[serde(default)]
    pub victim_age: Option<String>,
    /// Victim gender.
    #[serde(default)]
    pub victim_gender: Option<String>,
    /// Victim ethnicity.
    #[serde(default)]
    pub victim_ethnicity: Option<String>,
    /// Weapon.
    #[serde(default)]
    pub weapon: Option<String>,
    /// Premise.
    #[serde(default)]
    pub premise: Option<String>,
    /// Latitude.
    pub latitude: String,
    /// Longitude.
    pub longitude: String,
}

/// Why a well-formed row was left out of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DropReason {
    /// Victim age was negative.
    NegativeAge,
    /// Latitude or longitude was exactly zero.
    ZeroCoordinate,
    /// Latitude or longitude was blank.
    MissingCoordinate,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeAge => write!(f, "negative victim age"),
            Self::ZeroCoordinate => write!(f, "zero coordinate"),
            Self::MissingCoordinate => write!(f, "missing coordinate"),
        }
    }
}

/// Result of cleaning one row.
#[derive(Debug, Clone, PartialEq)]
pub enum CleanedRow {
    /// The row survived cleaning.
    Kept(IncidentRecord),
    /// The row was discarded by a cleaning rule.
    Dropped(DropReason),
}

/// Parses an occurrence date, keeping only the calendar date.
#[must_use]
pub fn parse_occurrence_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parses the hour of day from a time string.
///
/// The hour is the first colon-delimited token. A bare three- or four-digit
/// token without a colon is read as `HHMM` (`"1230"` is hour 12). Returns
/// `None` when the hour is not an integer in `0..=23`.
#[must_use]
pub fn parse_hour(s: &str) -> Option<u8> {
    let s = s.trim();
    let token = s.split(':').next()?.trim();
    let value: u32 = token.parse().ok()?;
    let hour = if !s.contains(':') && token.len() > 2 {
        value / 100
    } else {
        value
    };
    u8::try_from(hour).ok().filter(|h| *h <= 23)
}

/// Parses a victim age. Blank or non-numeric values yield `None`.
#[must_use]
pub fn parse_age(s: Option<&str>) -> Option<f64> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|a| a.is_finite())
}

fn parse_coordinate(s: &str, column: &str) -> Result<Option<f64>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    s.parse::<f64>()
        .map(Some)
        .map_err(|e| format!("invalid {column} '{s}': {e}"))
}

/// Cleans one raw row.
///
/// # Errors
///
/// Returns a description of the problem when the row is malformed: an
/// unparseable date, time, or coordinate.
pub fn clean_row(raw: &RawIncidentRow) -> Result<CleanedRow, String> {
    let occurred_on = parse_occurrence_date(&raw.occurrence_date)
        .ok_or_else(|| format!("invalid occurrence_date '{}'", raw.occurrence_date))?;
    let hour = parse_hour(&raw.occurrence_time)
        .ok_or_else(|| format!("invalid occurrence_time '{}'", raw.occurrence_time))?;

    let age = parse_age(raw.victim_age.as_deref());
    if age.is_some_and(|a| a < 0.0) {
        return Ok(CleanedRow::Dropped(DropReason::NegativeAge));
    }

    let latitude = parse_coordinate(&raw.latitude, "latitude")?;
    let longitude = parse_coordinate(&raw.longitude, "longitude")?;
    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        return Ok(CleanedRow::Dropped(DropReason::MissingCoordinate));
    };
    if latitude == 0.0 || longitude == 0.0 {
        return Ok(CleanedRow::Dropped(DropReason::ZeroCoordinate));
    }

    let record = IncidentRecord::new(occurred_on, hour, latitude, longitude)
        .with_area(normalize_sentinel(&raw.area))
        .with_crime_category(normalize_sentinel(&raw.crime_category))
        .with_crime(normalize_sentinel(&raw.crime))
        .with_victim_gender(normalize_sentinel(
            raw.victim_gender.as_deref().unwrap_or_default(),
        ))
        .with_victim_ethnicity(normalize_sentinel(
            raw.victim_ethnicity.as_deref().unwrap_or_default(),
        ))
        .with_victim_age_band(age.map_or(AgeBand::NotSpecified, AgeBand::from_age))
        .with_weapon(normalize_sentinel(raw.weapon.as_deref().unwrap_or_default()))
        .with_premise(normalize_sentinel(
            raw.premise.as_deref().unwrap_or_default(),
        ));

    Ok(CleanedRow::Kept(record))
}
