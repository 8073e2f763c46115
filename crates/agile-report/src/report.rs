//! The report value handed to writers.

use std::{collections::BTreeMap, fmt};

use agile_core::Timestamp;
use chrono::NaiveDate;
use serde::Serialize;

use crate::{reporter::Period, window::DateRange};

// ─── Cells ───────────────────────────────────────────────────────────────────

/// One printable value in a report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
  Text(String),
  Int(i64),
  Date(NaiveDate),
  Timestamp(Timestamp),
  /// An unresolved value, e.g. the start of a ticket that never started.
  Empty,
}

impl fmt::Display for Cell {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Cell::Text(s) => f.write_str(s),
      Cell::Int(n) => write!(f, "{n}"),
      Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
      Cell::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%:z")),
      Cell::Empty => Ok(()),
    }
  }
}

impl From<&str> for Cell {
  fn from(s: &str) -> Self { Cell::Text(s.to_string()) }
}

impl From<String> for Cell {
  fn from(s: String) -> Self { Cell::Text(s) }
}

impl From<i64> for Cell {
  fn from(n: i64) -> Self { Cell::Int(n) }
}

impl From<usize> for Cell {
  fn from(n: usize) -> Self { Cell::Int(n as i64) }
}

impl From<NaiveDate> for Cell {
  fn from(d: NaiveDate) -> Self { Cell::Date(d) }
}

impl From<Timestamp> for Cell {
  fn from(ts: Timestamp) -> Self { Cell::Timestamp(ts) }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
  fn from(value: Option<T>) -> Self { value.map_or(Cell::Empty, Into::into) }
}

pub type Row = Vec<Cell>;

/// Build a [`Row`] from heterogeneous values.
#[macro_export]
macro_rules! row {
  ($($value:expr),* $(,)?) => {
    vec![$($crate::Cell::from($value)),*]
  };
}

// ─── Summary ─────────────────────────────────────────────────────────────────

/// Report metadata: what was reported on and with which parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
  pub title:      String,
  /// The effective (aligned) window start.
  pub start_date: Timestamp,
  /// The effective (aligned) window end.
  pub end_date:   Timestamp,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub period:     Option<Period>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub num_weeks:  Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sla:        Option<BTreeMap<String, i64>>,
}

impl Summary {
  pub fn new(title: impl Into<String>, range: &DateRange) -> Self {
    Self {
      title:      title.into(),
      start_date: range.start,
      end_date:   range.end,
      period:     None,
      num_weeks:  None,
      sla:        None,
    }
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// A table plus summary. The first row is a header unless the reporter was
/// asked to leave it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
  pub table:   Vec<Row>,
  pub summary: Summary,
}

impl Report {
  /// Start a report, with `header` as its first row when `include_header`.
  pub fn new(summary: Summary, header: Row, include_header: bool) -> Self {
    let table = if include_header { vec![header] } else { Vec::new() };
    Self { table, summary }
  }

  pub fn push(&mut self, row: Row) { self.table.push(row); }

  /// Number of columns in the widest row.
  pub fn width(&self) -> usize {
    self.table.iter().map(Vec::len).max().unwrap_or(0)
  }
}
