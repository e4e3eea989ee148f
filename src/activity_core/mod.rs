//! Activity Core - Most Active Identifier Engine
//!
//! Finds the identifier(s) that occurred most often on one calendar day in a
//! timestamp-descending event log, in a single pass.
//!
//! # Architecture
//!
//! ```text
//! RecordSource (CSV / SQLite) → DayWindow (skip newer, stop at older)
//!     ↓
//! FrequencyAggregator (count index + count → identifiers inverse index)
//!     ↓
//! select_most_active (highest-count bucket, ties kept)
//!     ↓
//! ReportWriter::write_report → lines or JSONL
//! ```

pub mod frequency;
pub mod processor;
pub mod record;
pub mod selector;
pub mod window;

pub use frequency::{aggregate, FrequencyAggregator, InverseIndex};
pub use processor::{ActivityProcessor, ActivityReport};
pub use record::{parse_day, parse_timestamp, validate_identifier, Record, RecordError};
pub use selector::{max_count, select_most_active};
pub use window::{DayWindow, WithinDay};
