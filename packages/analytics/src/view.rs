//! Borrowed, filtered subsets of the base dataset.

use std::collections::BTreeMap;

use crime_dashboard_incident_models::IncidentRecord;
use crime_dashboard_loader::Dataset;

/// A filtered subset of the base dataset.
///
/// Views borrow records from the immutable [`Dataset`]; filtering produces
/// a new view and never touches the base set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct View<'a> {
    records: Vec<&'a IncidentRecord>,
}

impl<'a> View<'a> {
    /// A view over every record in the dataset.
    #[must_use]
    pub fn all(dataset: &'a Dataset) -> Self {
        Self {
            records: dataset.records().iter().collect(),
        }
    }

    /// A view over the given records.
    #[must_use]
    pub const fn from_records(records: Vec<&'a IncidentRecord>) -> Self {
        Self { records }
    }

    /// Records in this view, in dataset order.
    #[must_use]
    pub fn records(&self) -> &[&'a IncidentRecord] {
        &self.records
    }

    /// Iterates over the records in this view.
    pub fn iter(&self) -> impl Iterator<Item = &'a IncidentRecord> + '_ {
        self.records.iter().copied()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns a new view with only the records matching `predicate`.
    #[must_use]
    pub fn filter(&self, predicate: impl Fn(&IncidentRecord) -> bool) -> Self {
        Self {
            records: self.iter().filter(|r| predicate(r)).collect(),
        }
    }

    /// Counts records per key.
    pub fn count_by<K: Ord>(&self, key: impl Fn(&'a IncidentRecord) -> K) -> BTreeMap<K, u64> {
        let mut counts = BTreeMap::new();
        for record in self.iter() {
            *counts.entry(key(record)).or_default() += 1;
        }
        counts
    }
}
