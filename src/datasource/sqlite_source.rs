//! SQLite-backed record source with a keyset cursor
//!
//! Reads `(identifier, timestamp)` rows from a single table, newest first, one
//! page at a time. Each page resumes strictly after the last `(timestamp, rowid)`
//! seen, so a query that stops early never pulls the remaining pages.
//! Timestamps are stored as RFC 3339 TEXT in a single UTC offset so that text
//! order matches time order. Rows with a NULL timestamp are never returned.

use super::{apply_row_policy, DataSourceError, RawRow, RecordSource, RecordStream, RowErrorPolicy};
use crate::activity_core::record::{Record, RecordError};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OpenFlags};
use std::collections::VecDeque;
use std::path::Path;

pub const DEFAULT_TABLE: &str = "events";
const PAGE_SIZE: i64 = 1000;

/// SQLite record source
pub struct SqliteRecordSource {
    conn: Connection,
    table: String,
    policy: RowErrorPolicy,
}

impl SqliteRecordSource {
    /// Open a database read-only
    pub fn open(
        db_path: impl AsRef<Path>,
        table: &str,
        policy: RowErrorPolicy,
    ) -> Result<Self, DataSourceError> {
        let db_path = db_path.as_ref();
        if !db_path.exists() {
            return Err(DataSourceError::NotFound(db_path.to_path_buf()));
        }
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DataSourceError::Malformed(format!("Invalid table name: {}", table)));
        }

        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch("PRAGMA query_only = ON")?;

        log::info!("📥 SQLite source opened: {} (table={})", db_path.display(), table);

        Ok(Self {
            conn,
            table: table.to_string(),
            policy,
        })
    }

    fn page_query(&self) -> String {
        format!(
            "SELECT identifier, timestamp, rowid FROM {}
             WHERE timestamp IS NOT NULL
               AND (?1 IS NULL OR (timestamp, rowid) < (?1, ?2))
             ORDER BY timestamp DESC, rowid DESC
             LIMIT ?3",
            self.table
        )
    }
}

impl RecordSource for SqliteRecordSource {
    fn validate(&self) -> Result<(), DataSourceError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1)")?;
        let columns = stmt
            .query_map([&self.table], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        if columns.is_empty() {
            return Err(DataSourceError::Malformed(format!(
                "Table not found: {}",
                self.table
            )));
        }

        let missing: Vec<String> = ["identifier", "timestamp"]
            .iter()
            .filter(|name| !columns.iter().any(|c| c.as_str() == **name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DataSourceError::MissingColumns(missing));
        }

        Ok(())
    }

    fn ordered_records(&self) -> Result<RecordStream<'_>, DataSourceError> {
        let rows = PagedRows {
            source: self,
            query: self.page_query(),
            cursor: None,
            buffer: VecDeque::new(),
            position: 0,
            exhausted: false,
        };
        Ok(apply_row_policy(rows, self.policy))
    }

    fn source_type(&self) -> &'static str {
        "sqlite"
    }
}

struct PagedRows<'a> {
    source: &'a SqliteRecordSource,
    query: String,
    cursor: Option<(Value, i64)>,
    buffer: VecDeque<RawRow>,
    position: usize,
    exhausted: bool,
}

impl PagedRows<'_> {
    fn fetch_page(&mut self) -> Result<(), DataSourceError> {
        let mut stmt = self.source.conn.prepare_cached(&self.query)?;
        let (cursor_ts, cursor_id) = match &self.cursor {
            Some((ts, id)) => (Some(ts), Some(*id)),
            None => (None, None),
        };

        // Cells are read untyped so a bad value only rejects its own row
        let page = stmt
            .query_map(params![cursor_ts, cursor_id, PAGE_SIZE], |row| {
                Ok((
                    row.get::<_, Value>(0)?,
                    row.get::<_, Value>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if (page.len() as i64) < PAGE_SIZE {
            self.exhausted = true;
        }
        if let Some((_, ts, id)) = page.last() {
            self.cursor = Some((ts.clone(), *id));
        }

        for (identifier, timestamp, _) in page {
            self.position += 1;
            self.buffer.push_back((self.position, to_record(identifier, timestamp)));
        }

        log::debug!(
            "📥 Fetched page from {}, cursor at row {}",
            self.source.table,
            self.position
        );
        Ok(())
    }
}

fn to_record(identifier: Value, timestamp: Value) -> Result<Record, RecordError> {
    let timestamp = match timestamp {
        Value::Text(ts) => ts,
        Value::Null => return Err(RecordError::MissingField("timestamp")),
        _ => return Err(RecordError::NonTextField("timestamp")),
    };
    match identifier {
        Value::Text(identifier) => Record::parse(&identifier, &timestamp),
        Value::Null => Err(RecordError::MissingField("identifier")),
        _ => Err(RecordError::NonTextField("identifier")),
    }
}

impl Iterator for PagedRows<'_> {
    type Item = Result<RawRow, DataSourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}
