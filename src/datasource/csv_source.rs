//! CSV file record source
//!
//! Expects a header row naming an identifier column (`identifier`, or the
//! older `cookie` header) and a `timestamp` column. Rows are read one line at
//! a time, so only the part of the file the query needs is ever read.
//! Fields are split on `,` with surrounding quotes stripped; quoted commas are
//! not supported.

use super::{apply_row_policy, DataSourceError, RawRow, RecordSource, RecordStream, RowErrorPolicy};
use crate::activity_core::record::{Record, RecordError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

pub const IDENTIFIER_COLUMNS: [&str; 2] = ["identifier", "cookie"];
pub const TIMESTAMP_COLUMN: &str = "timestamp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnLayout {
    identifier: usize,
    timestamp: usize,
}

impl ColumnLayout {
    fn from_header(header: &str) -> Result<Self, DataSourceError> {
        let columns: Vec<&str> = split_fields(header).collect();
        let position = |name: &str| columns.iter().position(|c| *c == name);

        let identifier = IDENTIFIER_COLUMNS.iter().find_map(|&name| position(name));
        let timestamp = position(TIMESTAMP_COLUMN);

        match (identifier, timestamp) {
            (Some(identifier), Some(timestamp)) => Ok(Self {
                identifier,
                timestamp,
            }),
            _ => Err(missing_columns()),
        }
    }

    fn parse_row(&self, line: &str) -> Result<Record, RecordError> {
        let fields: Vec<&str> = split_fields(line).collect();
        let identifier = fields
            .get(self.identifier)
            .ok_or(RecordError::MissingField(IDENTIFIER_COLUMNS[0]))?;
        let timestamp = fields
            .get(self.timestamp)
            .ok_or(RecordError::MissingField(TIMESTAMP_COLUMN))?;
        Record::parse(identifier, timestamp)
    }
}

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(',').map(|field| field.trim().trim_matches('"'))
}

fn missing_columns() -> DataSourceError {
    DataSourceError::MissingColumns(vec![
        IDENTIFIER_COLUMNS[0].to_string(),
        TIMESTAMP_COLUMN.to_string(),
    ])
}

fn decode_line(bytes: Vec<u8>) -> Option<String> {
    let mut line = String::from_utf8(bytes).ok()?;
    if line.ends_with('\r') {
        line.pop();
    }
    Some(line)
}

/// CSV-backed record source. The file must be sorted by timestamp descending.
pub struct CsvRecordSource {
    path: PathBuf,
    policy: RowErrorPolicy,
}

impl CsvRecordSource {
    pub fn new(path: impl AsRef<Path>, policy: RowErrorPolicy) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            policy,
        }
    }

    fn open(&self) -> Result<(BufReader<File>, ColumnLayout), DataSourceError> {
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DataSourceError::NotFound(self.path.clone()),
            _ => DataSourceError::Io(e),
        })?;
        let mut reader = BufReader::new(file);

        let mut header = Vec::new();
        if reader.read_until(b'\n', &mut header)? == 0 {
            return Err(missing_columns());
        }
        let header = decode_line(header)
            .ok_or_else(|| DataSourceError::Malformed("Malformed CSV file.".to_string()))?;
        let header = header.trim_start_matches('\u{feff}');

        let layout = ColumnLayout::from_header(header)?;
        Ok((reader, layout))
    }
}

impl RecordSource for CsvRecordSource {
    fn validate(&self) -> Result<(), DataSourceError> {
        self.open().map(|_| ())
    }

    fn ordered_records(&self) -> Result<RecordStream<'_>, DataSourceError> {
        let (reader, layout) = self.open()?;
        log::debug!("📖 Reading records from {}", self.path.display());

        // Header is line 1
        let rows = reader
            .split(b'\n')
            .enumerate()
            .filter_map(move |(index, bytes)| {
                let line_number = index + 2;
                let bytes = match bytes {
                    Ok(bytes) => bytes,
                    Err(e) => return Some(Err(DataSourceError::Io(e))),
                };
                let row: RawRow = match decode_line(bytes) {
                    Some(line) if line.trim().is_empty() => return None,
                    Some(line) => (line_number, layout.parse_row(&line)),
                    None => (line_number, Err(RecordError::InvalidEncoding)),
                };
                Some(Ok(row))
            });

        Ok(apply_row_policy(rows, self.policy))
    }

    fn source_type(&self) -> &'static str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_missing_file() {
        let source = CsvRecordSource::new("/path/invalid", RowErrorPolicy::Tolerant);
        assert!(matches!(source.validate(), Err(DataSourceError::NotFound(_))));
    }

    #[test]
    fn test_missing_columns() {
        let dir = tempdir().unwrap();
        let path = write_csv(&dir, "bad.csv", b"user,when\nabc,2018-12-09T14:19:00+00:00\n");

        let source = CsvRecordSource::new(&path, RowErrorPolicy::Tolerant);
        assert!(matches!(source.validate(), Err(DataSourceError::MissingColumns(_))));
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let path = write_csv(&dir, "empty.csv", b"");

        let source = CsvRecordSource::new(&path, RowErrorPolicy::Tolerant);
        assert!(matches!(source.validate(), Err(DataSourceError::MissingColumns(_))));
    }

    #[test]
    fn test_binary_header_is_malformed() {
        let dir = tempdir().unwrap();
        let path = write_csv(&dir, "binary.csv", &[0xff, 0xfe, 0x00, 0x81, b'\n']);

        let source = CsvRecordSource::new(&path, RowErrorPolicy::Tolerant);
        assert!(matches!(source.validate(), Err(DataSourceError::Malformed(_))));
    }

    #[test]
    fn test_column_order_and_aliases() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            &dir,
            "reordered.csv",
            b"timestamp,source,identifier\r\n2018-12-09T14:19:00+00:00,web, abc \r\n",
        );

        let source = CsvRecordSource::new(&path, RowErrorPolicy::Strict);
        source.validate().unwrap();
        let records: Vec<Record> = source.ordered_records().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier(), "abc");

        let legacy = write_csv(&dir, "legacy.csv", b"cookie,timestamp\nxyz,2018-12-09T14:19:00+00:00\n");
        let source = CsvRecordSource::new(&legacy, RowErrorPolicy::Strict);
        let records: Vec<Record> = source.ordered_records().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(records[0].identifier(), "xyz");
    }

    #[test]
    fn test_tolerant_skips_bad_rows() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            &dir,
            "rows.csv",
            b"identifier,timestamp\n\
              abc,2018-12-09T14:19:00+00:00\n\
              ,2018-12-09T12:00:00+00:00\n\
              \n\
              def,2018-26-26T00:00:00+00:00\n\
              ghi\n\
              jkl,2018-12-08T09:30:00+00:00\n",
        );

        let source = CsvRecordSource::new(&path, RowErrorPolicy::Tolerant);
        let ids: Vec<String> = source
            .ordered_records()
            .unwrap()
            .map(|r| r.unwrap().identifier().to_string())
            .collect();
        assert_eq!(ids, vec!["abc", "jkl"]);
    }

    #[test]
    fn test_strict_reports_line_number() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            &dir,
            "rows.csv",
            b"identifier,timestamp\nabc,2018-12-09T14:19:00+00:00\n\ndef,garbage\n",
        );

        let source = CsvRecordSource::new(&path, RowErrorPolicy::Strict);
        let results: Vec<_> = source.ordered_records().unwrap().collect();
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(DataSourceError::MalformedRow { position: 4, .. })
        ));
    }
}
