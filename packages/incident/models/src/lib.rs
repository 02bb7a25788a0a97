#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crime incident record types, victim age bands, and categorical sentinels.
//!
//! This crate defines the cleaned, in-memory shape of one reported crime
//! occurrence as used across the dashboard. The loader produces these
//! records once per process and every downstream view borrows them.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Replacement value for missing, blank, or `"Unknown"` categorical values.
pub const NOT_SPECIFIED: &str = "Not Specified";

/// Raw sentinel the source data uses for unknown categorical values.
pub const UNKNOWN_SENTINEL: &str = "Unknown";

/// Remaps the `"Unknown"` sentinel and blank strings to [`NOT_SPECIFIED`].
///
/// Any other value is returned trimmed.
#[must_use]
pub fn normalize_sentinel(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == UNKNOWN_SENTINEL {
        NOT_SPECIFIED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Victim age band.
///
/// Bands are right-open: `[0,18)`, `[18,25)`, `[25,35)`, `[35,45)`,
/// `[45,55)`, `[55,65)` and a closed `[65,120]`. Anything outside those
/// bands, or an age that could not be parsed, is [`AgeBand::NotSpecified`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum AgeBand {
    /// Under 18.
    #[serde(rename = "<18")]
    #[strum(serialize = "<18")]
    Under18,
    /// 18 to 24.
    #[serde(rename = "18-24")]
    #[strum(serialize = "18-24")]
    From18To24,
    /// 25 to 34.
    #[serde(rename = "25-34")]
    #[strum(serialize = "25-34")]
    From25To34,
    /// 35 to 44.
    #[serde(rename = "35-44")]
    #[strum(serialize = "35-44")]
    From35To44,
    /// 45 to 54.
    #[serde(rename = "45-54")]
    #[strum(serialize = "45-54")]
    From45To54,
    /// 55 to 64.
    #[serde(rename = "55-64")]
    #[strum(serialize = "55-64")]
    From55To64,
    /// 65 and over (up to 120).
    #[serde(rename = "65+")]
    #[strum(serialize = "65+")]
    Over65,
    /// Missing, unparseable, or implausible age.
    #[serde(rename = "Not Specified")]
    #[strum(serialize = "Not Specified")]
    NotSpecified,
}

impl AgeBand {
    /// Oldest age that still lands in a real band.
    pub const MAX_AGE: f64 = 120.0;

    /// Buckets a non-negative age into its band.
    ///
    /// Negative ages are not bucketed here; the loader drops those rows
    /// before banding. A negative or non-finite value maps to
    /// [`AgeBand::NotSpecified`].
    #[must_use]
    pub fn from_age(age: f64) -> Self {
        if !age.is_finite() || age < 0.0 || age > Self::MAX_AGE {
            return Self::NotSpecified;
        }
        match age {
            a if a < 18.0 => Self::Under18,
            a if a < 25.0 => Self::From18To24,
            a if a < 35.0 => Self::From25To34,
            a if a < 45.0 => Self::From35To44,
            a if a < 55.0 => Self::From45To54,
            a if a < 65.0 => Self::From55To64,
            _ => Self::Over65,
        }
    }

    /// Descriptive life-stage label shown next to the band.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Under18 => "Child",
            Self::From18To24 => "Young Adult",
            Self::From25To34 => "Adult",
            Self::From35To44 => "Middle-aged",
            Self::From45To54 => "Mature Adult",
            Self::From55To64 => "Senior",
            Self::Over65 => "Elderly",
            Self::NotSpecified => NOT_SPECIFIED,
        }
    }

    /// Returns all bands in canonical order, ending with
    /// [`AgeBand::NotSpecified`].
    #[must_use]
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

/// Day of the week, in the Monday-first order the dashboard displays.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum DayOfWeek {
    /// Monday
    Monday,
    /// Tuesday
    Tuesday,
    /// Wednesday
    Wednesday,
    /// Thursday
    Thursday,
    /// Friday
    Friday,
    /// Saturday
    Saturday,
    /// Sunday
    Sunday,
}

impl DayOfWeek {
    /// Returns the day a calendar date falls on.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }

    /// Returns all seven days, Monday through Sunday.
    #[must_use]
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

/// Formats the `"YYYY-MM"` month period a date belongs to.
#[must_use]
pub fn month_period(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Parses a `"YYYY-MM"` month period back into the first day of that month.
#[must_use]
pub fn parse_month_period(period: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{period}-01"), "%Y-%m-%d").ok()
}

/// One cleaned crime occurrence.
///
/// Derived columns (day of week, month period, year) are computed from the
/// occurrence date when the record is created and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// Calendar date the crime occurred on.
    pub occurred_on: NaiveDate,
    /// Hour of day (0-23).
    pub hour: u8,
    /// Day of week of `occurred_on`.
    pub day_of_week: DayOfWeek,
    /// `"YYYY-MM"` period of `occurred_on`.
    pub month_period: String,
    /// Year of `occurred_on`.
    pub year: i32,
    /// Reporting area name.
    pub area: String,
    /// Broad crime category.
    pub crime_category: String,
    /// Specific crime description.
    pub crime: String,
    /// Victim gender.
    pub victim_gender: String,
    /// Victim ethnicity.
    pub victim_ethnicity: String,
    /// Victim age band.
    pub victim_age_band: AgeBand,
    /// Weapon used.
    pub weapon: String,
    /// Premise (location type).
    pub premise: String,
    /// Latitude (never zero).
    pub latitude: f64,
    /// Longitude (never zero).
    pub longitude: f64,
}

impl IncidentRecord {
    /// Creates a record with its date-derived columns filled in and every
    /// categorical field set to [`NOT_SPECIFIED`].
    #[must_use]
    pub fn new(occurred_on: NaiveDate, hour: u8, latitude: f64, longitude: f64) -> Self {
        Self {
            occurred_on,
            hour,
            day_of_week: DayOfWeek::of(occurred_on),
            month_period: month_period(occurred_on),
            year: occurred_on.year(),
            area: NOT_SPECIFIED.to_string(),
            crime_category: NOT_SPECIFIED.to_string(),
            crime: NOT_SPECIFIED.to_string(),
            victim_gender: NOT_SPECIFIED.to_string(),
            victim_ethnicity: NOT_SPECIFIED.to_string(),
            victim_age_band: AgeBand::NotSpecified,
            weapon: NOT_SPECIFIED.to_string(),
            premise: NOT_SPECIFIED.to_string(),
            latitude,
            longitude,
        }
    }

    /// Sets the reporting area.
    #[must_use]
    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = area.into();
        self
    }

    /// Sets the broad crime category.
    #[must_use]
    pub fn with_crime_category(mut self, category: impl Into<String>) -> Self {
        self.crime_category = category.into();
        self
    }

    /// Sets the specific crime description.
    #[must_use]
    pub fn with_crime(mut self, crime: impl Into<String>) -> Self {
        self.crime = crime.into();
        self
    }

    /// Sets the victim gender.
    #[must_use]
    pub fn with_victim_gender(mut self, gender: impl Into<String>) -> Self {
        self.victim_gender = gender.into();
        self
    }

    /// Sets the victim ethnicity.
    #[must_use]
    pub fn with_victim_ethnicity(mut self, ethnicity: impl Into<String>) -> Self {
        self.victim_ethnicity = ethnicity.into();
        self
    }

    /// Sets the victim age band.
    #[must_use]
    pub const fn with_victim_age_band(mut self, band: AgeBand) -> Self {
        self.victim_age_band = band;
        self
    }

    /// Sets the weapon.
    #[must_use]
    pub fn with_weapon(mut self, weapon: impl Into<String>) -> Self {
        self.weapon = weapon.into();
        self
    }

    /// Sets the premise.
    #[must_use]
    pub fn with_premise(mut self, premise: impl Into<String>) -> Self {
        self.premise = premise.into();
        self
    }

    /// Occurrence timestamp at the start of `occurred_on`.
    ///
    /// Date-range filtering compares against this value.
    #[must_use]
    pub fn occurred_at(&self) -> NaiveDateTime {
        self.occurred_on.and_time(NaiveTime::MIN)
    }
}
