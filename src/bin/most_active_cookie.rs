//! Most Active Cookie - prints the identifier(s) seen most often on one day
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin most_active_cookie -- -f cookie_log.csv -d 2018-12-09
//! cargo run --release --bin most_active_cookie -- -f events.db --backend sqlite -d 2018-12-09 --format jsonl
//! ```
//!
//! ## Environment Variables
//!
//! - ACTIVITY_BACKEND - csv or sqlite (default: csv)
//! - ACTIVITY_SQLITE_TABLE - Table read by the sqlite backend (default: events)
//! - ACTIVITY_OUTPUT_FORMAT - lines or jsonl (default: lines)
//! - ACTIVITY_STRICT_ROWS - Fail on the first malformed row (default: false)
//! - RUST_LOG - Logging level (optional, default: warn)

use clap::Parser;
use most_active::config::{BackendType, Cli, QueryConfig};
use most_active::output::ReportWriter;
use most_active::{ActivityProcessor, ActivityReport, CsvRecordSource, RecordSource, SqliteRecordSource};
use std::process::ExitCode;

fn run_query<S: RecordSource>(source: S, day: &str) -> Result<ActivityReport, Box<dyn std::error::Error>> {
    let processor = ActivityProcessor::new(source)?;
    Ok(processor.activity_report(day)?)
}

fn run(config: &QueryConfig) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("🚀 Most active query for {}", config.day);
    log::info!("   Source: {} ({})", config.path.display(), config.backend.as_str());
    log::info!("   Row errors: {}", config.row_policy.as_str());
    log::info!("   Output: {}", config.output_format.as_str());

    let report = match config.backend {
        BackendType::Csv => run_query(CsvRecordSource::new(&config.path, config.row_policy), &config.day)?,
        BackendType::Sqlite => run_query(
            SqliteRecordSource::open(&config.path, &config.table, config.row_policy)?,
            &config.day,
        )?,
    };

    log::info!(
        "✅ {} identifier(s) at {} occurrence(s), {} records on {}",
        report.identifiers.len(),
        report.count,
        report.window_size,
        report.date
    );

    let stdout = std::io::stdout();
    let mut writer = ReportWriter::new(stdout.lock(), config.output_format);
    writer.write_report(&report)?;
    Ok(())
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let result = QueryConfig::from_cli(cli)
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|config| run(&config));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
