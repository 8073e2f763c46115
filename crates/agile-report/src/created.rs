//! Tickets committed per week, split by ticket type.

use std::collections::BTreeSet;

use agile_core::ticket::AnalyzedTicket;

use crate::{
  Result,
  report::{Cell, Report, Summary},
  reporter::Reporter,
  row,
  window::{Alignment, IntoTimestamp, ReportWindow, filter_on_committed, in_week},
};

/// Counts tickets by the week in which they were committed, one column per
/// ticket type seen in the window.
#[derive(Debug, Clone)]
pub struct CreatedReporter {
  window: ReportWindow,
}

impl CreatedReporter {
  pub fn new(title: impl Into<String>) -> Self {
    Self { window: ReportWindow::new(title) }
  }

  pub fn with_range(mut self, start: impl IntoTimestamp, end: impl IntoTimestamp) -> Self {
    self.window.set_start(start);
    self.window.set_end(end);
    self
  }
}

impl Reporter for CreatedReporter {
  fn window(&self) -> &ReportWindow { &self.window }

  fn window_mut(&mut self) -> &mut ReportWindow { &mut self.window }

  fn alignment(&self) -> Alignment { Alignment::SundayToSaturday }

  fn filter_issues<'a>(
    &self,
    issues: &'a [AnalyzedTicket],
  ) -> Result<Vec<&'a AnalyzedTicket>> {
    Ok(filter_on_committed(&self.date_range()?, issues))
  }

  fn report_on(&self, issues: &[AnalyzedTicket], header: bool) -> Result<Report> {
    let range = self.date_range()?;
    let committed = self.filter_issues(issues)?;
    let types: BTreeSet<&str> = committed.iter().map(|t| t.ticket_type.as_str()).collect();

    let mut header_row = row!["Week"];
    header_row.extend(types.iter().map(|t| Cell::from(*t)));
    let mut report = Report::new(Summary::new(self.title(), &range), header_row, header);

    for week in range.starts_of_weeks() {
      let mut row = row![week];
      for ticket_type in &types {
        let count = committed
          .iter()
          .filter(|t| t.ticket_type == *ticket_type)
          .filter(|t| t.committed.entered_at.is_some_and(|at| in_week(week, at)))
          .count();
        row.push(count.into());
      }
      report.push(row);
    }

    Ok(report)
  }
}
