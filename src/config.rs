use crate::datasource::sqlite_source::DEFAULT_TABLE;
use crate::datasource::RowErrorPolicy;
use crate::output::OutputFormat;
use clap::Parser;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Csv,
    Sqlite,
}

impl BackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::Csv => "csv",
            BackendType::Sqlite => "sqlite",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(BackendType::Csv),
            "sqlite" => Some(BackendType::Sqlite),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "most_active_cookie")]
#[command(about = "Print the identifier(s) seen most often on a given day")]
#[command(version)]
pub struct Cli {
    /// Day to query, e.g. 2018-12-09
    #[arg(short, long)]
    pub day: String,

    /// Event log path (CSV file, or SQLite database with --backend sqlite)
    #[arg(short, long)]
    pub file: PathBuf,

    /// Fail on the first malformed row instead of skipping it
    #[arg(long, conflicts_with = "ignore_error")]
    pub strict: bool,

    /// Skip malformed rows (default)
    #[arg(long)]
    pub ignore_error: bool,

    /// Record source: csv or sqlite [env: ACTIVITY_BACKEND, default: csv]
    #[arg(long)]
    pub backend: Option<String>,

    /// SQLite table holding the events [env: ACTIVITY_SQLITE_TABLE, default: events]
    #[arg(long)]
    pub table: Option<String>,

    /// Output format: lines or jsonl [env: ACTIVITY_OUTPUT_FORMAT, default: lines]
    #[arg(long)]
    pub format: Option<String>,
}

/// Resolved settings for one query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    pub day: String,
    pub path: PathBuf,
    pub backend: BackendType,
    pub table: String,
    pub row_policy: RowErrorPolicy,
    pub output_format: OutputFormat,
}

impl QueryConfig {
    /// Merge CLI arguments with environment fallbacks
    ///
    /// Environment variables (used only when the matching flag is absent):
    /// - `ACTIVITY_BACKEND` (default: csv)
    /// - `ACTIVITY_SQLITE_TABLE` (default: events)
    /// - `ACTIVITY_OUTPUT_FORMAT` (default: lines)
    /// - `ACTIVITY_STRICT_ROWS` (default: false)
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let backend = match cli.backend {
            Some(value) => BackendType::from_str(&value)
                .ok_or_else(|| ConfigError::InvalidValue(format!("unknown backend '{}'", value)))?,
            None => env::var("ACTIVITY_BACKEND")
                .ok()
                .and_then(|s| {
                    let parsed = BackendType::from_str(&s);
                    if parsed.is_none() {
                        log::warn!("Invalid ACTIVITY_BACKEND '{}', defaulting to csv", s);
                    }
                    parsed
                })
                .unwrap_or(BackendType::Csv),
        };

        let output_format = match cli.format {
            Some(value) => OutputFormat::from_str(&value)
                .ok_or_else(|| ConfigError::InvalidValue(format!("unknown format '{}'", value)))?,
            None => env::var("ACTIVITY_OUTPUT_FORMAT")
                .ok()
                .and_then(|s| {
                    let parsed = OutputFormat::from_str(&s);
                    if parsed.is_none() {
                        log::warn!("Invalid ACTIVITY_OUTPUT_FORMAT '{}', defaulting to lines", s);
                    }
                    parsed
                })
                .unwrap_or_default(),
        };

        let row_policy = if cli.strict {
            RowErrorPolicy::Strict
        } else if cli.ignore_error {
            RowErrorPolicy::Tolerant
        } else {
            let strict = env::var("ACTIVITY_STRICT_ROWS")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse::<bool>()
                .unwrap_or(false);
            if strict {
                RowErrorPolicy::Strict
            } else {
                RowErrorPolicy::Tolerant
            }
        };

        let table = cli
            .table
            .or_else(|| env::var("ACTIVITY_SQLITE_TABLE").ok())
            .unwrap_or_else(|| DEFAULT_TABLE.to_string());

        Ok(Self {
            day: cli.day,
            path: cli.file,
            backend,
            table,
            row_policy,
            output_format,
        })
    }
}
