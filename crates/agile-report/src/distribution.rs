//! Lead time histogram for tickets completed in the window.

use agile_core::ticket::AnalyzedTicket;
use tracing::debug;

use crate::{
  Result,
  report::{Report, Summary},
  reporter::Reporter,
  row,
  window::{Alignment, IntoTimestamp, ReportWindow},
};

/// One row per whole-day lead time from 1 up to the largest observed.
#[derive(Debug, Clone)]
pub struct LeadTimeDistributionReporter {
  window: ReportWindow,
}

impl LeadTimeDistributionReporter {
  pub fn new(title: impl Into<String>) -> Self {
    Self { window: ReportWindow::new(title) }
  }

  pub fn with_range(mut self, start: impl IntoTimestamp, end: impl IntoTimestamp) -> Self {
    self.window.set_start(start);
    self.window.set_end(end);
    self
  }
}

/// Count of `values` per integer bucket `0..=max`. Negative values fall
/// outside every bucket.
pub fn histogram(values: &[i64]) -> Vec<usize> {
  let Some(max) = values.iter().copied().filter(|v| *v >= 0).max() else {
    return Vec::new();
  };
  let mut counts = vec![0; max as usize + 1];
  for v in values.iter().filter(|v| **v >= 0) {
    counts[*v as usize] += 1;
  }
  counts
}

impl Reporter for LeadTimeDistributionReporter {
  fn window(&self) -> &ReportWindow { &self.window }

  fn window_mut(&mut self) -> &mut ReportWindow { &mut self.window }

  fn alignment(&self) -> Alignment { Alignment::SundayToSaturday }

  fn report_on(&self, issues: &[AnalyzedTicket], header: bool) -> Result<Report> {
    let summary = Summary::new(self.title(), &self.date_range()?);
    let mut report = Report::new(summary, row!["Lead Time", "Tickets"], header);

    let lead_times: Vec<i64> = self
      .filter_issues(issues)?
      .into_iter()
      .filter_map(|t| {
        let lead_time = t.lead_time();
        if lead_time.is_none() {
          debug!(key = %t.key, "no lead time, leaving out of distribution");
        }
        lead_time
      })
      .collect();

    // Same-day tickets are counted in bucket 0 but that row has never been
    // part of this report's output.
    for (days, count) in histogram(&lead_times).into_iter().enumerate().skip(1) {
      report.push(row![days, count]);
    }

    Ok(report)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn histogram_covers_zero_to_max() {
    assert_eq!(histogram(&[2, 2, 5, 0]), vec![1, 0, 2, 0, 0, 1]);
    assert_eq!(histogram(&[]), Vec::<usize>::new());
  }

  #[test]
  fn histogram_ignores_negative_values() {
    assert_eq!(histogram(&[-3, 1]), vec![0, 1]);
    assert_eq!(histogram(&[-3]), Vec::<usize>::new());
  }
}
