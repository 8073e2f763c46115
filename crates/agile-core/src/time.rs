//! Timestamp helpers.
//!
//! Every instant in the pipeline is timezone-aware. A value without offset
//! information is rejected at the edge rather than guessed at.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};

use crate::{Error, Result};

/// A timezone-aware instant. The original offset is kept so calendar
/// bucketing happens in the ticket's own local date.
pub type Timestamp = DateTime<FixedOffset>;

/// Parse an RFC 3339 timestamp. Naive timestamps are refused.
pub fn parse_timestamp(raw: &str) -> Result<Timestamp> {
  DateTime::parse_from_rfc3339(raw).map_err(|e| {
    if raw.parse::<NaiveDateTime>().is_ok() {
      Error::InvalidFlowEvent(format!("timestamp {raw:?} has no offset"))
    } else {
      Error::InvalidFlowEvent(format!("unparsable timestamp {raw:?}: {e}"))
    }
  })
}

/// Whole days from `from` to `to`, floored like a calendar-day count
/// (so a negative span of a day and a half yields -2).
pub fn whole_days(from: Timestamp, to: Timestamp) -> i64 {
  let span = to - from;
  let days = span.num_days();
  if span < TimeDelta::days(days) { days - 1 } else { days }
}
