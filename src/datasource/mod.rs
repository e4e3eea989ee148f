//! Record sources feeding the activity core
//!
//! A source validates its structure up front and then hands out a lazy,
//! timestamp-descending stream of records. Row-level problems are resolved by
//! the source according to its [`RowErrorPolicy`] before the core sees them.
//!
//! ```text
//! CSV file ──┐
//!            ├─→ RecordSource::ordered_records() → RowErrorPolicy → Record stream
//! SQLite ────┘
//! ```

pub mod csv_source;
pub mod sqlite_source;

pub use csv_source::CsvRecordSource;
pub use sqlite_source::SqliteRecordSource;

use crate::activity_core::record::{Record, RecordError};
use std::path::PathBuf;

#[derive(Debug)]
pub enum DataSourceError {
    NotFound(PathBuf),
    Io(std::io::Error),
    Malformed(String),
    MissingColumns(Vec<String>),
    MalformedRow { position: usize, reason: String },
    Database(rusqlite::Error),
}

impl From<std::io::Error> for DataSourceError {
    fn from(err: std::io::Error) -> Self {
        DataSourceError::Io(err)
    }
}

impl From<rusqlite::Error> for DataSourceError {
    fn from(err: rusqlite::Error) -> Self {
        DataSourceError::Database(err)
    }
}

impl std::fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSourceError::NotFound(path) => write!(f, "File not found at: {}", path.display()),
            DataSourceError::Io(e) => write!(f, "IO error: {}", e),
            DataSourceError::Malformed(msg) => write!(f, "Malformed data source: {}", msg),
            DataSourceError::MissingColumns(cols) => {
                write!(f, "Data source does not contain expected columns: {}", cols.join(", "))
            }
            DataSourceError::MalformedRow { position, reason } => {
                write!(f, "Malformed row {}: {}", position, reason)
            }
            DataSourceError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for DataSourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataSourceError::Io(e) => Some(e),
            DataSourceError::Database(e) => Some(e),
            _ => None,
        }
    }
}

/// What a source does with a row it cannot turn into a [`Record`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowErrorPolicy {
    /// Drop the row and keep reading
    #[default]
    Tolerant,
    /// Surface the first malformed row as an error
    Strict,
}

impl RowErrorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowErrorPolicy::Tolerant => "tolerant",
            RowErrorPolicy::Strict => "strict",
        }
    }
}

/// Lazy record stream handed out by a source
pub type RecordStream<'a> = Box<dyn Iterator<Item = Result<Record, DataSourceError>> + 'a>;

/// A row as parsed by a source: its position (1-based, as the source counts
/// rows) and either a record or the reason it was rejected
pub type RawRow = (usize, Result<Record, RecordError>);

/// Capability interface implemented by every record backend
pub trait RecordSource {
    /// Check the source exists, is readable and carries the required fields
    fn validate(&self) -> Result<(), DataSourceError>;

    /// Records ordered by timestamp descending, read lazily
    fn ordered_records(&self) -> Result<RecordStream<'_>, DataSourceError>;

    /// Backend name for logging
    fn source_type(&self) -> &'static str;
}

/// Resolve row-level errors according to `policy`.
///
/// Source-level errors (I/O, database) always pass through.
pub fn apply_row_policy<'a, I>(rows: I, policy: RowErrorPolicy) -> RecordStream<'a>
where
    I: Iterator<Item = Result<RawRow, DataSourceError>> + 'a,
{
    match policy {
        RowErrorPolicy::Tolerant => Box::new(rows.filter_map(|row| match row {
            Ok((_, Ok(record))) => Some(Ok(record)),
            Ok((position, Err(e))) => {
                log::warn!("Skipping row {}: {}", position, e);
                None
            }
            Err(e) => Some(Err(e)),
        })),
        RowErrorPolicy::Strict => Box::new(rows.map(|row| match row {
            Ok((_, Ok(record))) => Ok(record),
            Ok((position, Err(e))) => Err(DataSourceError::MalformedRow {
                position,
                reason: e.to_string(),
            }),
            Err(e) => Err(e),
        })),
    }
}
