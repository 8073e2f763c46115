//! The `Reporter` capability and the closed set of reporter variants.

use std::{collections::BTreeMap, fmt, str::FromStr};

use agile_core::{Timestamp, ticket::AnalyzedTicket};
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  created::CreatedReporter,
  distribution::LeadTimeDistributionReporter,
  percentile::TimePercentileReporter,
  report::Report,
  sla::SlaReporter,
  throughput::ThroughputReporter,
  ticket_list::TicketReporter,
  window::{Alignment, DateRange, IntoTimestamp, ReportWindow, filter_on_ended},
};

/// A windowed aggregation over analysed tickets.
///
/// Implementors own a [`ReportWindow`] and choose an [`Alignment`]; the
/// boundary accessors re-apply that alignment on every read.
pub trait Reporter {
  fn window(&self) -> &ReportWindow;
  fn window_mut(&mut self) -> &mut ReportWindow;

  /// How configured boundaries snap to the calendar.
  fn alignment(&self) -> Alignment { Alignment::Unaligned }

  fn title(&self) -> &str { &self.window().title }

  /// Snap a start boundary. Identity unless the reporter aligns.
  fn valid_start_date(&self, target: Timestamp) -> Timestamp {
    self.alignment().start(target)
  }

  /// Snap an end boundary. Identity unless the reporter aligns.
  fn valid_end_date(&self, target: Timestamp) -> Timestamp {
    self.alignment().end(target)
  }

  /// The effective start date, or `None` when it was never set.
  fn start_date(&self) -> Option<Timestamp> {
    self.window().raw_start().map(|t| self.valid_start_date(t))
  }

  /// The effective end date, or `None` when it was never set.
  fn end_date(&self) -> Option<Timestamp> {
    self.window().raw_end().map(|t| self.valid_end_date(t))
  }

  fn set_start_date(&mut self, value: impl IntoTimestamp)
  where
    Self: Sized,
  {
    self.window_mut().set_start(value);
  }

  fn set_end_date(&mut self, value: impl IntoTimestamp)
  where
    Self: Sized,
  {
    self.window_mut().set_end(value);
  }

  /// Both effective boundaries.
  fn date_range(&self) -> Result<DateRange> {
    self.window().range(self.alignment())
  }

  /// Tickets this reporter aggregates. Defaults to those that ended inside
  /// the window.
  fn filter_issues<'a>(
    &self,
    issues: &'a [AnalyzedTicket],
  ) -> Result<Vec<&'a AnalyzedTicket>> {
    Ok(filter_on_ended(&self.date_range()?, issues))
  }

  /// Build the report, with a header row first when `header` is set.
  fn report_on(&self, issues: &[AnalyzedTicket], header: bool) -> Result<Report>;
}

// ─── Period ──────────────────────────────────────────────────────────────────

/// Bucketing period for throughput. Only `Weekly` snaps the window to
/// Sunday-to-Saturday weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
  Daily,
  #[default]
  Weekly,
  Monthly,
}

impl Period {
  pub fn alignment(self) -> Alignment {
    match self {
      Self::Weekly => Alignment::SundayToSaturday,
      Self::Daily | Self::Monthly => Alignment::Unaligned,
    }
  }
}

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// Name of a reporter variant, as used in configuration and on the command
/// line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
  #[default]
  Throughput,
  LeadTimeDistribution,
  Tickets,
  Created,
  Sla,
  LeadTimePercentile,
  CycleTimePercentile,
}

impl ReportKind {
  pub const ALL: [ReportKind; 7] = [
    Self::Throughput,
    Self::LeadTimeDistribution,
    Self::Tickets,
    Self::Created,
    Self::Sla,
    Self::LeadTimePercentile,
    Self::CycleTimePercentile,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Throughput => "throughput",
      Self::LeadTimeDistribution => "lead-time-distribution",
      Self::Tickets => "tickets",
      Self::Created => "created",
      Self::Sla => "sla",
      Self::LeadTimePercentile => "lead-time-percentile",
      Self::CycleTimePercentile => "cycle-time-percentile",
    }
  }

  /// Title used when none is configured.
  pub fn default_title(self) -> &'static str {
    match self {
      Self::Throughput => "Throughput",
      Self::LeadTimeDistribution => "Lead Time Distribution",
      Self::Tickets => "Tickets",
      Self::Created => "Created Tickets",
      Self::Sla => "SLA Breaches",
      Self::LeadTimePercentile => "Lead Time Percentiles",
      Self::CycleTimePercentile => "Cycle Time Percentiles",
    }
  }
}

impl fmt::Display for ReportKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ReportKind {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|kind| kind.as_str() == s)
      .ok_or_else(|| {
        let known: Vec<_> = Self::ALL.iter().map(|k| k.as_str()).collect();
        format!("unknown report kind {s:?} (expected one of {})", known.join(", "))
      })
  }
}

// ─── Settings ────────────────────────────────────────────────────────────────

fn default_num_weeks() -> usize { crate::percentile::DEFAULT_NUM_WEEKS }

/// Declarative reporter configuration, as read from the `[report]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
  #[serde(default)]
  pub kind:      ReportKind,
  #[serde(default)]
  pub title:     Option<String>,
  #[serde(default)]
  pub period:    Option<Period>,
  #[serde(default = "default_num_weeks")]
  pub num_weeks: usize,
  /// Ticket type to maximum lead time in days.
  #[serde(default)]
  pub sla:       BTreeMap<String, i64>,
}

impl Default for ReportSettings {
  fn default() -> Self {
    Self {
      kind:      ReportKind::default(),
      title:     None,
      period:    None,
      num_weeks: default_num_weeks(),
      sla:       BTreeMap::new(),
    }
  }
}

// ─── AnyReporter ─────────────────────────────────────────────────────────────

/// One of the seven reporter variants.
#[derive(Debug, Clone)]
pub enum AnyReporter {
  Throughput(ThroughputReporter),
  LeadTimeDistribution(LeadTimeDistributionReporter),
  Ticket(TicketReporter),
  Created(CreatedReporter),
  Sla(SlaReporter),
  LeadTimePercentile(TimePercentileReporter),
  CycleTimePercentile(TimePercentileReporter),
}

impl AnyReporter {
  /// Build the configured variant. The date window is left unset.
  pub fn from_settings(settings: &ReportSettings) -> Self {
    let title = settings
      .title
      .clone()
      .unwrap_or_else(|| settings.kind.default_title().to_string());

    match settings.kind {
      ReportKind::Throughput => Self::Throughput(
        ThroughputReporter::new(title).with_period(settings.period.unwrap_or_default()),
      ),
      ReportKind::LeadTimeDistribution => {
        Self::LeadTimeDistribution(LeadTimeDistributionReporter::new(title))
      }
      ReportKind::Tickets => Self::Ticket(TicketReporter::new(title)),
      ReportKind::Created => Self::Created(CreatedReporter::new(title)),
      ReportKind::Sla => Self::Sla(SlaReporter::new(title, settings.sla.clone())),
      ReportKind::LeadTimePercentile => Self::LeadTimePercentile(
        TimePercentileReporter::lead_time(title).with_num_weeks(settings.num_weeks),
      ),
      ReportKind::CycleTimePercentile => Self::CycleTimePercentile(
        TimePercentileReporter::cycle_time(title).with_num_weeks(settings.num_weeks),
      ),
    }
  }

  pub fn kind(&self) -> ReportKind {
    match self {
      Self::Throughput(_) => ReportKind::Throughput,
      Self::LeadTimeDistribution(_) => ReportKind::LeadTimeDistribution,
      Self::Ticket(_) => ReportKind::Tickets,
      Self::Created(_) => ReportKind::Created,
      Self::Sla(_) => ReportKind::Sla,
      Self::LeadTimePercentile(_) => ReportKind::LeadTimePercentile,
      Self::CycleTimePercentile(_) => ReportKind::CycleTimePercentile,
    }
  }

  fn inner(&self) -> &dyn Reporter {
    match self {
      Self::Throughput(r) => r,
      Self::LeadTimeDistribution(r) => r,
      Self::Ticket(r) => r,
      Self::Created(r) => r,
      Self::Sla(r) => r,
      Self::LeadTimePercentile(r) | Self::CycleTimePercentile(r) => r,
    }
  }

  fn inner_mut(&mut self) -> &mut dyn Reporter {
    match self {
      Self::Throughput(r) => r,
      Self::LeadTimeDistribution(r) => r,
      Self::Ticket(r) => r,
      Self::Created(r) => r,
      Self::Sla(r) => r,
      Self::LeadTimePercentile(r) | Self::CycleTimePercentile(r) => r,
    }
  }
}

impl Reporter for AnyReporter {
  fn window(&self) -> &ReportWindow { self.inner().window() }

  fn window_mut(&mut self) -> &mut ReportWindow { self.inner_mut().window_mut() }

  fn alignment(&self) -> Alignment { self.inner().alignment() }

  fn filter_issues<'a>(
    &self,
    issues: &'a [AnalyzedTicket],
  ) -> Result<Vec<&'a AnalyzedTicket>> {
    self.inner().filter_issues(issues)
  }

  fn report_on(&self, issues: &[AnalyzedTicket], header: bool) -> Result<Report> {
    self.inner().report_on(issues, header)
  }
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, TimeZone, Utc};

  use super::*;
  use crate::percentile::TimeMetric;

  #[test]
  fn kinds_parse_from_their_names() {
    for kind in ReportKind::ALL {
      assert_eq!(kind.as_str().parse::<ReportKind>(), Ok(kind));
    }
    assert!("velocity".parse::<ReportKind>().is_err());
  }

  #[test]
  fn settings_deserialise_with_defaults() {
    let settings: ReportSettings =
      serde_json::from_str(r#"{"kind": "sla", "sla": {"Bug": 3}}"#).unwrap();
    assert_eq!(settings.kind, ReportKind::Sla);
    assert_eq!(settings.num_weeks, 4);
    assert_eq!(settings.sla.get("Bug"), Some(&3));
    assert_eq!(settings.title, None);
  }

  #[test]
  fn from_settings_builds_every_kind() {
    for kind in ReportKind::ALL {
      let settings = ReportSettings {
        kind,
        ..Default::default()
      };
      let reporter = AnyReporter::from_settings(&settings);
      assert_eq!(reporter.kind(), kind);
      assert_eq!(reporter.title(), kind.default_title());
    }
  }

  #[test]
  fn from_settings_carries_parameters() {
    let settings = ReportSettings {
      kind: ReportKind::Throughput,
      period: Some(Period::Daily),
      num_weeks: 6,
      sla: BTreeMap::from([("Bug".to_string(), 3)]),
      ..Default::default()
    };
    let AnyReporter::Throughput(throughput) = AnyReporter::from_settings(&settings) else {
      panic!("expected a throughput reporter");
    };
    assert_eq!(throughput.period(), Period::Daily);

    let settings = ReportSettings { kind: ReportKind::Sla, ..settings };
    let AnyReporter::Sla(sla) = AnyReporter::from_settings(&settings) else {
      panic!("expected an SLA reporter");
    };
    assert_eq!(sla.thresholds().get("Bug"), Some(&3));

    let settings = ReportSettings { kind: ReportKind::CycleTimePercentile, ..settings };
    let AnyReporter::CycleTimePercentile(percentile) = AnyReporter::from_settings(&settings) else {
      panic!("expected a cycle time percentile reporter");
    };
    assert_eq!(percentile.metric(), TimeMetric::Cycle);
    assert_eq!(percentile.num_weeks(), 6);
  }

  #[test]
  fn any_reporter_delegates_alignment() {
    let settings = ReportSettings {
      kind: ReportKind::Throughput,
      period: Some(Period::Daily),
      ..Default::default()
    };
    let mut reporter = AnyReporter::from_settings(&settings);
    let start = NaiveDate::from_ymd_opt(2016, 5, 21).unwrap().and_hms_opt(0, 0, 0).unwrap();
    reporter.set_start_date(start);
    assert_eq!(
      reporter.start_date(),
      Some(Utc.with_ymd_and_hms(2016, 5, 21, 0, 0, 0).unwrap().fixed_offset())
    );
  }
}
