//! Rolling lead and cycle time percentiles.

use std::collections::VecDeque;

use agile_core::ticket::AnalyzedTicket;
use tracing::debug;

use crate::{
  Result,
  report::{Report, Summary},
  reporter::Reporter,
  row,
  window::{Alignment, IntoTimestamp, ReportWindow, in_week},
};

/// Rows returned when no window size is configured.
pub const DEFAULT_NUM_WEEKS: usize = 4;

/// Weeks of samples each percentile row is computed over.
pub const SAMPLE_WEEKS: usize = 4;

/// The percentiles reported, in column order.
pub const PERCENTILES: [f64; 3] = [50.0, 75.0, 95.0];

/// Which duration a [`TimePercentileReporter`] measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeMetric {
  /// Committed to ended.
  Lead,
  /// Started to ended.
  Cycle,
}

impl TimeMetric {
  fn measure(self, ticket: &AnalyzedTicket) -> Option<i64> {
    match self {
      Self::Lead => ticket.lead_time(),
      Self::Cycle => ticket.cycle_time(),
    }
  }
}

/// Emits the 50th, 75th and 95th percentile of a ticket duration for each
/// week, computed over that week and up to three weeks before it.
#[derive(Debug, Clone)]
pub struct TimePercentileReporter {
  window:    ReportWindow,
  metric:    TimeMetric,
  num_weeks: usize,
}

impl TimePercentileReporter {
  pub fn new(title: impl Into<String>, metric: TimeMetric) -> Self {
    Self {
      window: ReportWindow::new(title),
      metric,
      num_weeks: DEFAULT_NUM_WEEKS,
    }
  }

  pub fn lead_time(title: impl Into<String>) -> Self { Self::new(title, TimeMetric::Lead) }

  pub fn cycle_time(title: impl Into<String>) -> Self { Self::new(title, TimeMetric::Cycle) }

  /// Keep only the last `num_weeks` rows of the weekly series.
  pub fn with_num_weeks(mut self, num_weeks: usize) -> Self {
    self.num_weeks = num_weeks;
    self
  }

  pub fn with_range(mut self, start: impl IntoTimestamp, end: impl IntoTimestamp) -> Self {
    self.window.set_start(start);
    self.window.set_end(end);
    self
  }

  pub fn metric(&self) -> TimeMetric { self.metric }

  pub fn num_weeks(&self) -> usize { self.num_weeks }
}

/// The `pct`th percentile of `sorted`, interpolating linearly between the
/// two closest ranks. `sorted` must be ascending and non-empty.
fn interpolate(sorted: &[i64], pct: f64) -> f64 {
  let rank = pct / 100.0 * (sorted.len() - 1) as f64;
  let lower = rank.floor() as usize;
  let upper = rank.ceil() as usize;
  let (lo, hi) = (sorted[lower] as f64, sorted[upper] as f64);
  lo + (hi - lo) * (rank - lower as f64)
}

/// Each of [`PERCENTILES`] over `samples`, rounded half to even. All zeros
/// when there are no samples.
pub fn percentiles(samples: &[i64]) -> [i64; 3] {
  if samples.is_empty() {
    return [0; 3];
  }
  let mut sorted = samples.to_vec();
  sorted.sort_unstable();
  PERCENTILES.map(|pct| interpolate(&sorted, pct).round_ties_even() as i64)
}

impl Reporter for TimePercentileReporter {
  fn window(&self) -> &ReportWindow { &self.window }

  fn window_mut(&mut self) -> &mut ReportWindow { &mut self.window }

  fn alignment(&self) -> Alignment { Alignment::SundayToSaturday }

  fn report_on(&self, issues: &[AnalyzedTicket], header: bool) -> Result<Report> {
    let range = self.date_range()?;
    let mut summary = Summary::new(self.title(), &range);
    summary.num_weeks = Some(self.num_weeks);

    let completed = self.filter_issues(issues)?;
    let mut buffer: VecDeque<Vec<i64>> = VecDeque::with_capacity(SAMPLE_WEEKS + 1);
    let mut rows = Vec::new();

    for week in range.starts_of_weeks() {
      let samples = completed
        .iter()
        .filter(|t| t.ended.entered_at.is_some_and(|at| in_week(week, at)))
        .filter_map(|t| {
          let value = self.metric.measure(t);
          if value.is_none() {
            debug!(key = %t.key, metric = ?self.metric, "unresolved phase, no sample");
          }
          value
        })
        .collect();
      buffer.push_back(samples);
      if buffer.len() > SAMPLE_WEEKS {
        buffer.pop_front();
      }

      let pooled: Vec<i64> = buffer.iter().flatten().copied().collect();
      let [p50, p75, p95] = percentiles(&pooled);
      rows.push(row![week, p50, p75, p95]);
    }

    let mut report = Report::new(summary, row!["Week", "50th", "75th", "95th"], header);
    let skip = rows.len().saturating_sub(self.num_weeks);
    for row in rows.into_iter().skip(skip) {
      report.push(row);
    }

    Ok(report)
  }
}
