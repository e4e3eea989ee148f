//! Result writers - one identifier per line, as plain text or JSONL

use crate::activity_core::ActivityReport;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

#[derive(Debug)]
pub enum OutputError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl From<std::io::Error> for OutputError {
    fn from(err: std::io::Error) -> Self {
        OutputError::Io(err)
    }
}

impl From<serde_json::Error> for OutputError {
    fn from(err: serde_json::Error) -> Self {
        OutputError::Serialization(err)
    }
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "IO error: {}", e),
            OutputError::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for OutputError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Lines,
    Jsonl,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Lines => "lines",
            OutputFormat::Jsonl => "jsonl",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lines" | "text" => Some(OutputFormat::Lines),
            "jsonl" | "json" => Some(OutputFormat::Jsonl),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct IdentifierLine<'a> {
    identifier: &'a str,
    date: NaiveDate,
    count: usize,
}

pub struct ReportWriter<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    /// Emit each most-active identifier on its own line
    pub fn write_report(&mut self, report: &ActivityReport) -> Result<(), OutputError> {
        for identifier in &report.identifiers {
            match self.format {
                OutputFormat::Lines => writeln!(self.out, "{}", identifier)?,
                OutputFormat::Jsonl => {
                    let line = IdentifierLine {
                        identifier,
                        date: report.date,
                        count: report.count,
                    };
                    writeln!(self.out, "{}", serde_json::to_string(&line)?)?;
                }
            }
        }
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ActivityReport {
        ActivityReport {
            date: NaiveDate::from_ymd_opt(2018, 12, 8).unwrap(),
            count: 1,
            window_size: 3,
            identifiers: vec!["4sMM2LxV07bPJzwf".to_string(), "SAZuXPGUrfbcn5UA".to_string()],
        }
    }

    #[test]
    fn test_lines_output() {
        let mut writer = ReportWriter::new(Vec::new(), OutputFormat::Lines);
        writer.write_report(&report()).unwrap();

        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, "4sMM2LxV07bPJzwf\nSAZuXPGUrfbcn5UA\n");
    }

    #[test]
    fn test_jsonl_output() {
        let mut writer = ReportWriter::new(Vec::new(), OutputFormat::Jsonl);
        writer.write_report(&report()).unwrap();

        let out = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["identifier"], "4sMM2LxV07bPJzwf");
        assert_eq!(lines[0]["date"], "2018-12-08");
        assert_eq!(lines[1]["count"], 1);
    }

    #[test]
    fn test_empty_report_writes_nothing() {
        let mut empty = report();
        empty.identifiers.clear();

        let mut writer = ReportWriter::new(Vec::new(), OutputFormat::Jsonl);
        writer.write_report(&empty).unwrap();
        assert!(writer.into_inner().is_empty());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(OutputFormat::from_str("JSONL"), Some(OutputFormat::Jsonl));
        assert_eq!(OutputFormat::from_str("lines"), Some(OutputFormat::Lines));
        assert_eq!(OutputFormat::from_str("xml"), None);
    }
}
