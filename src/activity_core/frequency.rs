//! Per-identifier occurrence counting with a count → identifiers inverse index

use super::record::Record;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Occurrence count → identifiers currently holding that count
pub type InverseIndex = BTreeMap<usize, HashSet<String>>;

/// Single-pass frequency aggregation for one query.
///
/// Invariant: every identifier seen so far sits in exactly one bucket of the
/// inverse index, the one matching its entry in the count index. Empty
/// buckets are pruned.
#[derive(Debug, Default)]
pub struct FrequencyAggregator {
    counts: HashMap<String, usize>,
    buckets: InverseIndex,
}

impl FrequencyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, record: &Record) {
        self.add_identifier(record.identifier());
    }

    pub fn add_identifier(&mut self, identifier: &str) {
        let count = self.counts.entry(identifier.to_string()).or_insert(0);
        let previous = *count;
        *count += 1;

        self.buckets
            .entry(previous + 1)
            .or_default()
            .insert(identifier.to_string());

        if previous > 0 {
            if let Some(bucket) = self.buckets.get_mut(&previous) {
                bucket.remove(identifier);
                if bucket.is_empty() {
                    self.buckets.remove(&previous);
                }
            }
        }
    }

    pub fn count_of(&self, identifier: &str) -> usize {
        self.counts.get(identifier).copied().unwrap_or(0)
    }

    pub fn distinct_identifiers(&self) -> usize {
        self.counts.len()
    }

    pub fn inverse_index(&self) -> &InverseIndex {
        &self.buckets
    }

    pub fn into_inverse_index(self) -> InverseIndex {
        self.buckets
    }
}

/// Aggregate a finite, already-windowed sequence of records
pub fn aggregate<'a>(records: impl IntoIterator<Item = &'a Record>) -> InverseIndex {
    let mut aggregator = FrequencyAggregator::new();
    for record in records {
        aggregator.add_record(record);
    }
    aggregator.into_inverse_index()
}
