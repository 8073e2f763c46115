//! Error type for `agile-report`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The SLA configuration has no threshold for a ticket type that appeared
  /// in the report window.
  #[error("no SLA threshold configured for ticket type {0:?}")]
  MissingSlaThreshold(String),

  #[error("report window needs both a start and an end date")]
  MissingDateRange,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
