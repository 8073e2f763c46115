//! Error types for `agile-core`.

use thiserror::Error;

use crate::ticket::Phase;

#[derive(Debug, Error)]
pub enum Error {
  /// A flow-log entry was not a `{state, entered_at}` mapping, or its
  /// timestamp was unparsable or lacked an offset.
  #[error("invalid flow event: {0}")]
  InvalidFlowEvent(String),

  #[error("analyzer has no candidate states for the {0} phase")]
  MisconfiguredAnalyzer(Phase),

  #[error("{key} is missing flow_log information for {phase}: {states:?}")]
  MissingPhaseInformation {
    key:    String,
    phase:  Phase,
    states: Vec<String>,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
