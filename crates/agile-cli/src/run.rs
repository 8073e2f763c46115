//! The fetch → analyze → report → write pipeline.

use std::{
  fs::File,
  io::{self, BufReader, BufWriter, Write},
  path::Path,
};

use agile_core::{Timestamp, analyzer::Analysis, ticket::Ticket};
use agile_csv::CsvWriter;
use agile_gsheet::SheetWriter;
use agile_jira::JiraFetcher;
use agile_report::{AnyReporter, Report, ReportKind, Reporter};
use anyhow::{Context as _, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use tracing::{info, warn};

use crate::config::AppConfig;

/// Days covered when no start date is given.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Overrides for one `report` run.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
  pub kind:   Option<ReportKind>,
  pub start:  Option<NaiveDate>,
  pub end:    Option<NaiveDate>,
  pub header: bool,
}

// ─── Tickets ─────────────────────────────────────────────────────────────────

pub async fn fetch_tickets(config: &AppConfig) -> Result<Vec<Ticket>> {
  let jira = config
    .jira
    .clone()
    .context("no [jira] section configured; pass --input to report from a file")?;
  let fetcher = JiraFetcher::new(jira).context("invalid JIRA configuration")?;
  fetcher.fetch().await.context("failed to fetch tickets from JIRA")
}

pub fn read_tickets(path: &Path) -> Result<Vec<Ticket>> {
  let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
  serde_json::from_reader(BufReader::new(file))
    .with_context(|| format!("failed to parse tickets from {}", path.display()))
}

pub fn write_tickets(tickets: &[Ticket], output: Option<&Path>) -> Result<()> {
  let mut out = open_output(output)?;
  serde_json::to_writer_pretty(&mut out, tickets).context("failed to serialise tickets")?;
  writeln!(out).context("failed to write tickets")?;
  out.flush().context("failed to write tickets")
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// The reporting window: whole days in UTC, ending today and spanning
/// [`DEFAULT_WINDOW_DAYS`] unless given.
pub fn resolve_range(
  start: Option<NaiveDate>,
  end: Option<NaiveDate>,
  now: DateTime<Utc>,
) -> (Timestamp, Timestamp) {
  let end = match end {
    Some(day) => day.and_time(NaiveTime::MIN).and_utc() + TimeDelta::days(1) - TimeDelta::seconds(1),
    None => now,
  };
  let start = match start {
    Some(day) => day.and_time(NaiveTime::MIN).and_utc(),
    None => (end.date_naive() - TimeDelta::days(DEFAULT_WINDOW_DAYS))
      .and_time(NaiveTime::MIN)
      .and_utc(),
  };
  (start.fixed_offset(), end.fixed_offset())
}

fn warn_ignored(analysis: &Analysis<'_>) {
  for ignored in &analysis.ignored {
    warn!(
      key = %ignored.ticket.key,
      phase = %ignored.phase,
      states = ?ignored.states,
      "ticket has no state matching this phase, left out of the report"
    );
  }
}

/// Analyse `tickets` and build the configured report.
pub fn build_report(
  config: &AppConfig,
  options: &ReportOptions,
  tickets: &[Ticket],
  now: DateTime<Utc>,
) -> Result<Report> {
  let analyzer = config.phases.analyzer().context("invalid [phases] configuration")?;
  let analysis = analyzer.analyze(tickets);
  warn_ignored(&analysis);

  let mut settings = config.report.clone();
  if let Some(kind) = options.kind {
    settings.kind = kind;
  }
  let mut reporter = AnyReporter::from_settings(&settings);
  let (start, end) = resolve_range(options.start, options.end, now);
  reporter.set_start_date(start);
  reporter.set_end_date(end);
  info!(
    kind = %reporter.kind(),
    start = ?reporter.start_date(),
    end = ?reporter.end_date(),
    "building report"
  );

  reporter
    .report_on(&analysis.analyzed, options.header)
    .with_context(|| format!("failed to build {} report", reporter.kind()))
}

pub fn write_report(report: &Report, output: Option<&Path>) -> Result<()> {
  let out = open_output(output)?;
  CsvWriter::new().write(out, report).context("failed to write CSV")
}

/// Overwrite `worksheet` in the configured spreadsheet with `report`.
pub async fn write_sheet(config: &AppConfig, worksheet: &str, report: &Report) -> Result<()> {
  let sheet = config
    .sheet
    .as_ref()
    .context("no [sheet] section configured; needed for --sheet")?;
  let writer = SheetWriter::connect(sheet)
    .await
    .context("failed to authenticate with Google Sheets")?;
  writer
    .write(worksheet, report)
    .await
    .with_context(|| format!("failed to write worksheet {worksheet:?}"))
}

fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
  Ok(match output {
    Some(path) => Box::new(BufWriter::new(
      File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
    )),
    None => Box::new(io::stdout().lock()),
  })
}
