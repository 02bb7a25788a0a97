#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crime dataset loader.
//!
//! Reads the pre-cleaned crime CSV into an immutable [`Dataset`], deriving
//! date columns and applying the cleaning rules in [`parsing`]. A
//! [`DatasetLoader`] memoizes datasets per source path so the file is read
//! at most once per process. [`fetch::ensure_local`] performs the optional
//! one-time download when the file is not present yet.

pub mod fetch;
pub mod parsing;
pub mod progress;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use crime_dashboard_incident_models::IncidentRecord;

use crate::parsing::{CleanedRow, DropReason, RawIncidentRow, clean_row};

/// Default location of the cleaned dataset, relative to the working
/// directory.
pub const DEFAULT_DATA_PATH: &str = "data/crime_data_clean.csv";

/// Errors that can occur while loading the dataset.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The source file does not exist.
    #[error("Data file not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// A row could not be parsed.
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number in the source file (0 when unknown).
        line: u64,
        /// Description of what went wrong.
        message: String,
    },

    /// CSV reader error (bad header, invalid UTF-8, ...).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Downloading the dataset failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Inclusive date bounds of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    /// Earliest occurrence date.
    pub min: NaiveDate,
    /// Latest occurrence date.
    pub max: NaiveDate,
}

/// The full cleaned incident table.
///
/// Immutable once built. Downstream code borrows records from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<IncidentRecord>,
    bounds: Option<DateBounds>,
}

impl Dataset {
    /// Builds a dataset from already-cleaned records.
    #[must_use]
    pub fn from_records(records: Vec<IncidentRecord>) -> Self {
        let bounds = records
            .iter()
            .map(|r| r.occurred_on)
            .fold(None, |acc: Option<DateBounds>, date| {
                Some(acc.map_or(DateBounds { min: date, max: date }, |b| DateBounds {
                    min: b.min.min(date),
                    max: b.max.max(date),
                }))
            });
        Self { records, bounds }
    }

    /// The empty-dataset sentinel used when loading failed.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// All records.
    #[must_use]
    pub fn records(&self) -> &[IncidentRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest occurrence dates, `None` when empty.
    #[must_use]
    pub const fn bounds(&self) -> Option<DateBounds> {
        self.bounds
    }

    /// Earliest occurrence date, `None` when empty.
    #[must_use]
    pub fn min_date(&self) -> Option<NaiveDate> {
        self.bounds.map(|b| b.min)
    }

    /// Latest occurrence date, `None` when empty.
    #[must_use]
    pub fn max_date(&self) -> Option<NaiveDate> {
        self.bounds.map(|b| b.max)
    }
}

/// Reads and cleans a dataset from any CSV source.
///
/// # Errors
///
/// Returns [`LoadError::Parse`] on the first malformed row, or
/// [`LoadError::Csv`] if the CSV itself is unreadable.
pub fn read_dataset<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let mut row = csv::StringRecord::new();
    let mut records = Vec::new();
    let mut dropped: BTreeMap<DropReason, u64> = BTreeMap::new();

    loop {
        match reader.read_record(&mut row) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                return Err(LoadError::Parse {
                    line: e.position().map_or(0, csv::Position::line),
                    message: e.to_string(),
                });
            }
        }

        let line = row.position().map_or(0, csv::Position::line);
        let raw: RawIncidentRow = row
            .deserialize(Some(&headers))
            .map_err(|e| LoadError::Parse {
                line,
                message: e.to_string(),
            })?;

        match clean_row(&raw).map_err(|message| LoadError::Parse { line, message })? {
            CleanedRow::Kept(record) => records.push(record),
            CleanedRow::Dropped(reason) => *dropped.entry(reason).or_default() += 1,
        }
    }

    for (reason, count) in &dropped {
        log::debug!("Dropped {count} rows: {reason}");
    }
    log::info!(
        "Loaded {} records ({} dropped)",
        records.len(),
        dropped.values().sum::<u64>()
    );

    Ok(Dataset::from_records(records))
}

/// Loads datasets from disk and memoizes them per source path.
///
/// Datasets are never reloaded: a second [`DatasetLoader::load`] of the
/// same path returns the same [`Arc`].
#[derive(Debug, Default)]
pub struct DatasetLoader {
    cache: Mutex<BTreeMap<PathBuf, Arc<Dataset>>>,
}

impl DatasetLoader {
    /// Creates a loader with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the dataset at `path`, reading the file only on first use.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NotFound`] if the file is missing, or any
    /// error from [`read_dataset`].
    pub fn load(&self, path: &Path) -> Result<Arc<Dataset>, LoadError> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(dataset) = cache.get(path) {
            log::debug!("Using cached dataset for {}", path.display());
            return Ok(Arc::clone(dataset));
        }

        let file = std::fs::File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                LoadError::Io(e)
            }
        })?;

        log::info!("Loading dataset from {}", path.display());
        let dataset = Arc::new(read_dataset(std::io::BufReader::new(file))?);
        cache.insert(path.to_path_buf(), Arc::clone(&dataset));

        Ok(dataset)
    }

    /// Whether `path` has already been loaded.
    #[must_use]
    pub fn is_cached(&self, path: &Path) -> bool {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }
}
