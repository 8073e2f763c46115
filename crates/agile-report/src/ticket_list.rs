//! Per-ticket detail listing.

use agile_core::ticket::{AnalyzedTicket, Phase, PhaseMarker};

use crate::{
  Result,
  report::{Cell, Report, Row, Summary},
  reporter::Reporter,
  row,
  window::{Alignment, IntoTimestamp, ReportWindow},
};

/// Lists each ticket completed in the window with its phase markers, in
/// order of completion.
#[derive(Debug, Clone)]
pub struct TicketReporter {
  window: ReportWindow,
}

impl TicketReporter {
  pub fn new(title: impl Into<String>) -> Self {
    Self { window: ReportWindow::new(title) }
  }

  pub fn with_range(mut self, start: impl IntoTimestamp, end: impl IntoTimestamp) -> Self {
    self.window.set_start(start);
    self.window.set_end(end);
    self
  }
}

fn marker_cells(marker: &PhaseMarker) -> [Cell; 2] {
  [marker.state.clone().into(), marker.entered_at.into()]
}

fn detail_row(ticket: &AnalyzedTicket) -> Row {
  let mut row = row![ticket.key.as_str(), ticket.lead_time()];
  for phase in Phase::ALL {
    row.extend(marker_cells(ticket.marker(phase)));
  }
  row
}

impl Reporter for TicketReporter {
  fn window(&self) -> &ReportWindow { &self.window }

  fn window_mut(&mut self) -> &mut ReportWindow { &mut self.window }

  fn alignment(&self) -> Alignment { Alignment::SundayToSaturday }

  fn report_on(&self, issues: &[AnalyzedTicket], header: bool) -> Result<Report> {
    let summary = Summary::new(self.title(), &self.date_range()?);
    let header_row = row![
      "Key",
      "Lead Time",
      "Commit State",
      "Commit At",
      "Start State",
      "Start At",
      "End State",
      "End At",
    ];
    let mut report = Report::new(summary, header_row, header);

    let mut completed = self.filter_issues(issues)?;
    completed.sort_by_key(|t| t.ended.entered_at);
    for ticket in completed {
      report.push(detail_row(ticket));
    }

    Ok(report)
  }
}
