//! Report windows, calendar alignment and week walking.
//!
//! A window stores the boundaries exactly as given (after naive values are
//! pinned to UTC). Alignment is applied on every read through [`Alignment`],
//! never cached, so changing one boundary or the alignment rule after the
//! fact keeps both boundaries consistent.

use agile_core::{Timestamp, ticket::AnalyzedTicket};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeDelta, Utc, Weekday};

use crate::{Error, Result};

// ─── Boundary input ──────────────────────────────────────────────────────────

/// Values accepted as a window boundary. Naive date-times are taken to be
/// UTC; aware ones keep their offset.
pub trait IntoTimestamp {
  fn into_timestamp(self) -> Timestamp;
}

impl IntoTimestamp for Timestamp {
  fn into_timestamp(self) -> Timestamp { self }
}

impl IntoTimestamp for DateTime<Utc> {
  fn into_timestamp(self) -> Timestamp { self.fixed_offset() }
}

impl IntoTimestamp for NaiveDateTime {
  fn into_timestamp(self) -> Timestamp { self.and_utc().fixed_offset() }
}

// ─── Week walking ────────────────────────────────────────────────────────────

/// Step back one day at a time until `target` falls on `day`.
pub fn walk_back_to_weekday(mut target: Timestamp, day: Weekday) -> Timestamp {
  while target.weekday() != day {
    target -= TimeDelta::days(1);
  }
  target
}

/// Step forward one day at a time until `target` falls on `day`.
pub fn walk_forward_to_weekday(mut target: Timestamp, day: Weekday) -> Timestamp {
  while target.weekday() != day {
    target += TimeDelta::days(1);
  }
  target
}

/// How a reporter snaps its configured boundaries to the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
  /// Boundaries pass through unchanged.
  #[default]
  Unaligned,
  /// Start snaps back to Sunday, end forward to Saturday. Time of day is
  /// kept.
  SundayToSaturday,
}

impl Alignment {
  pub fn start(self, target: Timestamp) -> Timestamp {
    match self {
      Self::Unaligned => target,
      Self::SundayToSaturday => walk_back_to_weekday(target, Weekday::Sun),
    }
  }

  pub fn end(self, target: Timestamp) -> Timestamp {
    match self {
      Self::Unaligned => target,
      Self::SundayToSaturday => walk_forward_to_weekday(target, Weekday::Sat),
    }
  }
}

// ─── Window ──────────────────────────────────────────────────────────────────

/// Title and raw (unaligned) boundaries shared by every reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportWindow {
  pub title: String,
  start:     Option<Timestamp>,
  end:       Option<Timestamp>,
}

impl ReportWindow {
  pub fn new(title: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      start: None,
      end:   None,
    }
  }

  pub fn set_start(&mut self, value: impl IntoTimestamp) {
    self.start = Some(value.into_timestamp());
  }

  pub fn set_end(&mut self, value: impl IntoTimestamp) {
    self.end = Some(value.into_timestamp());
  }

  /// The start date as configured, before alignment.
  pub fn raw_start(&self) -> Option<Timestamp> { self.start }

  /// The end date as configured, before alignment.
  pub fn raw_end(&self) -> Option<Timestamp> { self.end }

  /// Both boundaries with `alignment` applied.
  pub fn range(&self, alignment: Alignment) -> Result<DateRange> {
    match (self.start, self.end) {
      (Some(start), Some(end)) => Ok(DateRange {
        start: alignment.start(start),
        end:   alignment.end(end),
      }),
      _ => Err(Error::MissingDateRange),
    }
  }
}

// ─── Range ───────────────────────────────────────────────────────────────────

/// An aligned, inclusive `[start, end]` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
  pub start: Timestamp,
  pub end:   Timestamp,
}

impl DateRange {
  pub fn contains(&self, at: Timestamp) -> bool {
    self.start <= at && at <= self.end
  }

  /// Successive 7-day steps from the start date up to the end date.
  pub fn starts_of_weeks(&self) -> WeekStarts {
    WeekStarts {
      next: Some(self.start.date_naive()),
      last: self.end.date_naive(),
    }
  }
}

/// Lazy, finite sequence of week-start dates. Clone it to walk again.
#[derive(Debug, Clone)]
pub struct WeekStarts {
  next: Option<NaiveDate>,
  last: NaiveDate,
}

impl Iterator for WeekStarts {
  type Item = NaiveDate;

  fn next(&mut self) -> Option<NaiveDate> {
    let current = self.next.filter(|d| *d <= self.last)?;
    self.next = current.checked_add_signed(TimeDelta::days(7));
    Some(current)
  }
}

/// Whether `at` falls on a local calendar date within the week starting on
/// `week_start` (that day plus the following six).
pub fn in_week(week_start: NaiveDate, at: Timestamp) -> bool {
  let day = at.date_naive();
  week_start <= day && day < week_start + TimeDelta::days(7)
}

// ─── Filtering ───────────────────────────────────────────────────────────────

/// Tickets whose `ended` timestamp falls inside `range`. Tickets that never
/// ended are left out.
pub fn filter_on_ended<'a>(
  range: &DateRange,
  tickets: &'a [AnalyzedTicket],
) -> Vec<&'a AnalyzedTicket> {
  tickets
    .iter()
    .filter(|t| t.ended.entered_at.is_some_and(|at| range.contains(at)))
    .collect()
}

/// Tickets whose `committed` timestamp falls inside `range`.
///
/// Unlike [`filter_on_ended`] the ended marker may be unresolved, so work
/// still in flight is counted.
pub fn filter_on_committed<'a>(
  range: &DateRange,
  tickets: &'a [AnalyzedTicket],
) -> Vec<&'a AnalyzedTicket> {
  tickets
    .iter()
    .filter(|t| t.committed.entered_at.is_some_and(|at| range.contains(at)))
    .collect()
}

#[cfg(test)]
mod tests {
  use agile_core::ticket::PhaseMarker;
  use chrono::{FixedOffset, TimeZone};

  use super::*;

  fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> Timestamp {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap().fixed_offset()
  }

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn window(start: Timestamp, end: Timestamp) -> ReportWindow {
    let mut w = ReportWindow::new("Foo");
    w.set_start(start);
    w.set_end(end);
    w
  }

  #[test]
  fn naive_boundaries_become_utc() {
    let mut w = ReportWindow::new("Foo");
    w.set_start(date(2016, 5, 21).and_hms_opt(0, 0, 0).unwrap());
    assert_eq!(w.raw_start(), Some(utc(2016, 5, 21, 0, 0, 0)));
    assert_eq!(w.raw_start().unwrap().offset().local_minus_utc(), 0);
  }

  #[test]
  fn aware_boundaries_keep_their_offset() {
    let tz = FixedOffset::east_opt(2 * 3600).unwrap();
    let at = tz.with_ymd_and_hms(2016, 5, 21, 0, 0, 0).unwrap();
    let mut w = ReportWindow::new("Foo");
    w.set_end(at);
    assert_eq!(w.raw_end().unwrap().offset(), &tz);
  }

  #[test]
  fn walks_to_weekdays() {
    // 2016-05-21 is a Saturday.
    let sat = utc(2016, 5, 21, 10, 0, 0);
    assert_eq!(walk_back_to_weekday(sat, Weekday::Sun), utc(2016, 5, 15, 10, 0, 0));
    assert_eq!(walk_forward_to_weekday(sat, Weekday::Sat), sat);
    assert_eq!(walk_forward_to_weekday(sat, Weekday::Mon), utc(2016, 5, 23, 10, 0, 0));
  }

  #[test]
  fn week_alignment() {
    let w = window(utc(2016, 5, 21, 0, 0, 0), utc(2016, 6, 21, 23, 59, 59));
    let range = w.range(Alignment::SundayToSaturday).unwrap();
    assert_eq!(range.start, utc(2016, 5, 15, 0, 0, 0));
    assert_eq!(range.end, utc(2016, 6, 25, 23, 59, 59));

    let unaligned = w.range(Alignment::Unaligned).unwrap();
    assert_eq!(unaligned.start, utc(2016, 5, 21, 0, 0, 0));
  }

  #[test]
  fn alignment_is_idempotent() {
    let start = utc(2016, 5, 18, 0, 0, 0);
    let once = Alignment::SundayToSaturday.start(start);
    assert_eq!(Alignment::SundayToSaturday.start(once), once);
  }

  #[test]
  fn missing_boundary_is_an_error() {
    let mut w = ReportWindow::new("Foo");
    w.set_start(utc(2016, 5, 15, 0, 0, 0));
    assert!(matches!(w.range(Alignment::Unaligned), Err(Error::MissingDateRange)));
  }

  #[test]
  fn weeks_are_restartable() {
    let range = DateRange {
      start: utc(2016, 5, 15, 0, 0, 0),
      end:   utc(2016, 6, 4, 23, 59, 59),
    };
    let weeks = range.starts_of_weeks();
    let first: Vec<_> = weeks.clone().collect();
    let second: Vec<_> = weeks.collect();
    assert_eq!(first, vec![date(2016, 5, 15), date(2016, 5, 22), date(2016, 5, 29)]);
    assert_eq!(first, second);
  }

  #[test]
  fn week_membership_uses_local_date() {
    let week = date(2016, 5, 15);
    assert!(in_week(week, utc(2016, 5, 21, 23, 59, 59)));
    assert!(!in_week(week, utc(2016, 5, 22, 0, 0, 0)));
    assert!(!in_week(week, utc(2016, 5, 14, 23, 59, 59)));
  }

  fn analyzed(key: &str, committed: Option<Timestamp>, ended: Option<Timestamp>) -> AnalyzedTicket {
    let marker = |at: Option<Timestamp>, state: &str| {
      at.map_or_else(PhaseMarker::unresolved, |at| PhaseMarker::new(state, at))
    };
    AnalyzedTicket::new(
      key,
      marker(committed, "Committed"),
      PhaseMarker::unresolved(),
      marker(ended, "Ended"),
    )
  }

  #[test]
  fn ended_filter_is_inclusive_and_skips_open_tickets() {
    let range = DateRange {
      start: utc(2016, 5, 15, 0, 0, 0),
      end:   utc(2016, 5, 21, 23, 59, 59),
    };
    let tickets = vec![
      analyzed("A", None, Some(utc(2016, 5, 15, 0, 0, 0))),
      analyzed("B", None, Some(utc(2016, 5, 21, 23, 59, 59))),
      analyzed("C", None, Some(utc(2016, 5, 22, 0, 0, 0))),
      analyzed("D", None, None),
    ];
    let keys: Vec<_> = filter_on_ended(&range, &tickets).iter().map(|t| t.key.as_str()).collect();
    assert_eq!(keys, ["A", "B"]);
  }

  #[test]
  fn committed_filter_keeps_in_flight_tickets() {
    let range = DateRange {
      start: utc(2016, 5, 15, 0, 0, 0),
      end:   utc(2016, 5, 21, 23, 59, 59),
    };
    let tickets = vec![
      analyzed("A", Some(utc(2016, 5, 16, 0, 0, 0)), None),
      analyzed("B", Some(utc(2016, 5, 17, 0, 0, 0)), Some(utc(2016, 6, 1, 0, 0, 0))),
      analyzed("C", Some(utc(2016, 4, 1, 0, 0, 0)), Some(utc(2016, 5, 16, 0, 0, 0))),
      analyzed("D", None, None),
    ];
    let keys: Vec<_> = filter_on_committed(&range, &tickets).iter().map(|t| t.key.as_str()).collect();
    assert_eq!(keys, ["A", "B"]);
  }
}
