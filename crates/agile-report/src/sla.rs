//! Lead time SLA breaches per week.

use std::collections::{BTreeMap, BTreeSet};

use agile_core::ticket::AnalyzedTicket;
use tracing::debug;

use crate::{
  Error, Result,
  report::{Cell, Report, Summary},
  reporter::Reporter,
  row,
  window::{Alignment, IntoTimestamp, ReportWindow, in_week},
};

/// Counts, per week and ticket type, the completed tickets whose lead time
/// exceeded that type's threshold.
#[derive(Debug, Clone)]
pub struct SlaReporter {
  window:     ReportWindow,
  thresholds: BTreeMap<String, i64>,
}

impl SlaReporter {
  /// `thresholds` maps ticket type to the maximum acceptable lead time in
  /// days.
  pub fn new(title: impl Into<String>, thresholds: BTreeMap<String, i64>) -> Self {
    Self {
      window: ReportWindow::new(title),
      thresholds,
    }
  }

  pub fn with_range(mut self, start: impl IntoTimestamp, end: impl IntoTimestamp) -> Self {
    self.window.set_start(start);
    self.window.set_end(end);
    self
  }

  pub fn thresholds(&self) -> &BTreeMap<String, i64> { &self.thresholds }

  /// Exact match first; configuration layers may have lowercased the keys.
  fn threshold(&self, ticket_type: &str) -> Result<i64> {
    self
      .thresholds
      .get(ticket_type)
      .or_else(|| {
        self
          .thresholds
          .iter()
          .find(|(key, _)| key.eq_ignore_ascii_case(ticket_type))
          .map(|(_, limit)| limit)
      })
      .copied()
      .ok_or_else(|| Error::MissingSlaThreshold(ticket_type.to_string()))
  }
}

impl Reporter for SlaReporter {
  fn window(&self) -> &ReportWindow { &self.window }

  fn window_mut(&mut self) -> &mut ReportWindow { &mut self.window }

  fn alignment(&self) -> Alignment { Alignment::SundayToSaturday }

  fn report_on(&self, issues: &[AnalyzedTicket], header: bool) -> Result<Report> {
    let range = self.date_range()?;
    let mut summary = Summary::new(self.title(), &range);
    summary.sla = Some(self.thresholds.clone());

    let completed = self.filter_issues(issues)?;
    let types: BTreeSet<&str> = completed.iter().map(|t| t.ticket_type.as_str()).collect();
    let limits = types
      .iter()
      .map(|t| self.threshold(t).map(|limit| (*t, limit)))
      .collect::<Result<Vec<_>>>()?;

    let mut header_row = row!["Week"];
    header_row.extend(types.iter().map(|t| Cell::from(*t)));
    let mut report = Report::new(summary, header_row, header);

    for week in range.starts_of_weeks() {
      let mut row = row![week];
      for (ticket_type, limit) in &limits {
        let breaches = completed
          .iter()
          .filter(|t| t.ticket_type == *ticket_type)
          .filter(|t| t.ended.entered_at.is_some_and(|at| in_week(week, at)))
          .filter(|t| match t.lead_time() {
            Some(days) => days > *limit,
            None => {
              debug!(key = %t.key, "no lead time, not counted against SLA");
              false
            }
          })
          .count();
        row.push(breaches.into());
      }
      report.push(row);
    }

    Ok(report)
  }
}
