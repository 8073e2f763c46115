//! `agile-flow`: flow metrics from a JIRA filter.
//!
//! # Usage
//!
//! ```text
//! agile-flow --config agile-flow.toml fetch --output tickets.json
//! agile-flow report --input tickets.json --kind lead-time-percentile --start 2016-05-15
//! agile-flow report --kind sla --output sla.csv
//! agile-flow report --kind throughput --sheet Throughput
//! ```
//!
//! Logs go to stderr (`RUST_LOG` adjusts the level); CSV and JSON output go
//! to stdout unless `--output` or `--sheet` is given.

mod config;
mod run;

use std::path::PathBuf;

use agile_report::ReportKind;
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{config::AppConfig, run::ReportOptions};

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "agile-flow", author, version, about = "Agile flow metrics from JIRA")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "agile-flow.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Fetch tickets from JIRA and write them as JSON.
  Fetch {
    /// Write to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
  },
  /// Analyse tickets and write a CSV report or a worksheet.
  Report(ReportArgs),
}

#[derive(Args, Debug)]
struct ReportArgs {
  /// Read tickets from a JSON file written by `fetch` instead of JIRA.
  #[arg(short, long, value_name = "FILE")]
  input: Option<PathBuf>,

  /// Report to build; overrides `report.kind` from the config.
  #[arg(short, long)]
  kind: Option<ReportKind>,

  /// First day of the window (YYYY-MM-DD, UTC).
  #[arg(long)]
  start: Option<NaiveDate>,

  /// Last day of the window (YYYY-MM-DD, UTC). Defaults to now.
  #[arg(long)]
  end: Option<NaiveDate>,

  /// Leave out the header row.
  #[arg(long)]
  no_header: bool,

  /// Write to this file instead of stdout.
  #[arg(short, long, value_name = "FILE")]
  output: Option<PathBuf>,

  /// Overwrite this worksheet of the `[sheet]` spreadsheet. CSV is then
  /// written only when `--output` is also given.
  #[arg(long, value_name = "NAME")]
  sheet: Option<String>,
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let config = AppConfig::load(&cli.config)?;

  match cli.command {
    Command::Fetch { output } => {
      let tickets = run::fetch_tickets(&config).await?;
      run::write_tickets(&tickets, output.as_deref())?;
    }
    Command::Report(args) => {
      let tickets = match &args.input {
        Some(path) => run::read_tickets(path)?,
        None => run::fetch_tickets(&config).await?,
      };
      let options = ReportOptions {
        kind:   args.kind,
        start:  args.start,
        end:    args.end,
        header: !args.no_header,
      };
      let report = run::build_report(&config, &options, &tickets, Utc::now())?;
      match &args.sheet {
        Some(worksheet) => {
          run::write_sheet(&config, worksheet, &report).await?;
          if let Some(path) = &args.output {
            run::write_report(&report, Some(path))?;
          }
        }
        None => run::write_report(&report, args.output.as_deref())?,
      }
    }
  }

  Ok(())
}
