//! Most-active query over a record source
//!
//! Each query builds its own count and inverse indexes and drops them when it
//! returns; nothing is shared between queries.

use super::frequency::FrequencyAggregator;
use super::record::parse_day;
use super::selector::{max_count, select_most_active};
use super::window::WithinDay;
use crate::datasource::RecordSource;
use crate::error::ActivityError;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

/// Outcome of one query, with the identifiers sorted for stable output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityReport {
    pub date: NaiveDate,
    /// Occurrences of each most-active identifier; 0 when the day had no records
    pub count: usize,
    /// Records that fell inside the day
    pub window_size: usize,
    pub identifiers: Vec<String>,
}

pub struct ActivityProcessor<S> {
    source: S,
}

impl<S: RecordSource> ActivityProcessor<S> {
    /// Wrap a source, validating it first
    pub fn new(source: S) -> Result<Self, ActivityError> {
        source.validate()?;
        log::debug!("✅ {} source validated", source.source_type());
        Ok(Self { source })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Identifiers that occurred most often on `day` (`YYYY-MM-DD`)
    pub fn most_active(&self, day: &str) -> Result<HashSet<String>, ActivityError> {
        let date = parse_day(day).ok_or_else(|| ActivityError::InvalidInput(day.to_string()))?;
        self.most_active_on(date)
    }

    pub fn most_active_on(&self, date: NaiveDate) -> Result<HashSet<String>, ActivityError> {
        let aggregator = self.aggregate_day(date)?;
        Ok(select_most_active(aggregator.inverse_index()))
    }

    /// Same query as [`most_active`](Self::most_active), with counts attached
    pub fn activity_report(&self, day: &str) -> Result<ActivityReport, ActivityError> {
        let date = parse_day(day).ok_or_else(|| ActivityError::InvalidInput(day.to_string()))?;
        let aggregator = self.aggregate_day(date)?;

        let index = aggregator.inverse_index();
        let mut identifiers: Vec<String> = select_most_active(index).into_iter().collect();
        identifiers.sort();
        let window_size = index.iter().map(|(count, ids)| count * ids.len()).sum();

        Ok(ActivityReport {
            date,
            count: max_count(index).unwrap_or(0),
            window_size,
            identifiers,
        })
    }

    fn aggregate_day(&self, date: NaiveDate) -> Result<FrequencyAggregator, ActivityError> {
        log::info!("🔎 Aggregating {} records for {}", self.source.source_type(), date);

        let mut aggregator = FrequencyAggregator::new();
        let mut window_size = 0usize;
        for record in self.source.ordered_records()?.within_day(date) {
            aggregator.add_record(&record?);
            window_size += 1;
        }

        log::debug!(
            "📊 {}: {} records, {} distinct identifiers",
            date,
            window_size,
            aggregator.distinct_identifiers()
        );
        Ok(aggregator)
    }
}
