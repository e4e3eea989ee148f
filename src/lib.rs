pub mod activity_core;
pub mod config;
pub mod datasource;
pub mod error;
pub mod output;

pub use activity_core::{ActivityProcessor, ActivityReport, Record};
pub use datasource::{CsvRecordSource, DataSourceError, RecordSource, RowErrorPolicy, SqliteRecordSource};
pub use error::ActivityError;
