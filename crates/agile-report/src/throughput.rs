//! Completed tickets per week.

use agile_core::ticket::AnalyzedTicket;
use tracing::debug;

use crate::{
  Result,
  report::{Report, Summary},
  reporter::{Period, Reporter},
  row,
  window::{Alignment, IntoTimestamp, ReportWindow, in_week},
};

/// Counts tickets by the week in which they ended.
#[derive(Debug, Clone)]
pub struct ThroughputReporter {
  window: ReportWindow,
  period: Period,
}

impl ThroughputReporter {
  pub fn new(title: impl Into<String>) -> Self {
    Self {
      window: ReportWindow::new(title),
      period: Period::default(),
    }
  }

  /// Set the bucketing period. Boundaries already set are re-aligned on
  /// the next read.
  pub fn with_period(mut self, period: Period) -> Self {
    self.period = period;
    self
  }

  pub fn set_period(&mut self, period: Period) { self.period = period; }

  pub fn period(&self) -> Period { self.period }

  pub fn with_range(mut self, start: impl IntoTimestamp, end: impl IntoTimestamp) -> Self {
    self.window.set_start(start);
    self.window.set_end(end);
    self
  }
}

impl Reporter for ThroughputReporter {
  fn window(&self) -> &ReportWindow { &self.window }

  fn window_mut(&mut self) -> &mut ReportWindow { &mut self.window }

  fn alignment(&self) -> Alignment { self.period.alignment() }

  fn report_on(&self, issues: &[AnalyzedTicket], header: bool) -> Result<Report> {
    let range = self.date_range()?;
    let mut summary = Summary::new(self.title(), &range);
    summary.period = Some(self.period);

    let mut report = Report::new(summary, row!["Week", "Completed"], header);
    let completed = self.filter_issues(issues)?;
    debug!(title = self.title(), tickets = completed.len(), "counting throughput");

    for week in range.starts_of_weeks() {
      let count = completed
        .iter()
        .filter_map(|t| t.ended.entered_at)
        .filter(|at| in_week(week, *at))
        .count();
      report.push(row![week, count]);
    }

    Ok(report)
  }
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, TimeZone, Utc};

  use super::*;
  use crate::Cell;

  fn naive(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, s).unwrap()
  }

  #[test]
  fn weekly_period_aligns_to_whole_weeks() {
    let reporter = ThroughputReporter::new("Foo")
      .with_period(Period::Weekly)
      .with_range(naive(2016, 5, 21, 0, 0, 0), naive(2016, 6, 21, 23, 59, 59));

    assert_eq!(
      reporter.start_date(),
      Some(Utc.with_ymd_and_hms(2016, 5, 15, 0, 0, 0).unwrap().fixed_offset())
    );
    assert_eq!(
      reporter.end_date(),
      Some(Utc.with_ymd_and_hms(2016, 6, 25, 23, 59, 59).unwrap().fixed_offset())
    );
  }

  #[test]
  fn period_set_after_dates_still_aligns() {
    let mut reporter = ThroughputReporter::new("Foo")
      .with_period(Period::Daily)
      .with_range(naive(2016, 5, 21, 0, 0, 0), naive(2016, 6, 21, 23, 59, 59));
    assert_eq!(
      reporter.start_date(),
      Some(Utc.with_ymd_and_hms(2016, 5, 21, 0, 0, 0).unwrap().fixed_offset())
    );

    reporter.set_period(Period::Weekly);
    assert_eq!(
      reporter.start_date(),
      Some(Utc.with_ymd_and_hms(2016, 5, 15, 0, 0, 0).unwrap().fixed_offset())
    );
  }

  #[test]
  fn empty_input_yields_zero_weeks() {
    let reporter = ThroughputReporter::new("Foo")
      .with_range(naive(2016, 5, 15, 0, 0, 0), naive(2016, 5, 28, 23, 59, 59));
    let report = reporter.report_on(&[], true).unwrap();

    let week = |d| Cell::Date(NaiveDate::from_ymd_opt(2016, 5, d).unwrap());
    assert_eq!(report.table, vec![
      row!["Week", "Completed"],
      vec![week(15), Cell::Int(0)],
      vec![week(22), Cell::Int(0)],
    ]);
    assert_eq!(report.summary.period, Some(Period::Weekly));
  }

  #[test]
  fn missing_range_is_an_error() {
    let reporter = ThroughputReporter::new("Foo");
    assert!(matches!(
      reporter.report_on(&[], true),
      Err(crate::Error::MissingDateRange)
    ));
  }
}
