//! Tickets, before and after phase analysis.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  flow::{FlowEvent, FlowLog},
  time::{Timestamp, whole_days},
};

/// Category label used when the source does not provide one.
pub const DEFAULT_TICKET_TYPE: &str = "Ticket";

fn default_ticket_type() -> String { DEFAULT_TICKET_TYPE.to_string() }

// ─── Ticket ──────────────────────────────────────────────────────────────────

/// A raw ticket as fetched from the system of record.
///
/// The flow log is filled in while converting from the source and treated as
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
  pub key:         String,
  #[serde(default)]
  pub title:       String,
  #[serde(rename = "type", default = "default_ticket_type")]
  pub ticket_type: String,
  #[serde(default)]
  pub created_at:  Option<Timestamp>,
  #[serde(default)]
  pub updated_at:  Option<Timestamp>,
  #[serde(default)]
  pub flow_log:    FlowLog,
}

impl Ticket {
  pub fn new(key: impl Into<String>) -> Self {
    Self {
      key:         key.into(),
      title:       String::new(),
      ticket_type: default_ticket_type(),
      created_at:  None,
      updated_at:  None,
      flow_log:    FlowLog::new(),
    }
  }

  pub fn with_title(mut self, title: impl Into<String>) -> Self {
    self.title = title.into();
    self
  }

  pub fn with_type(mut self, ticket_type: impl Into<String>) -> Self {
    self.ticket_type = ticket_type.into();
    self
  }
}

// ─── Phases ──────────────────────────────────────────────────────────────────

/// A semantic milestone in a ticket's life, mapped from raw state names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
  Committed,
  Started,
  Ended,
}

impl Phase {
  /// All phases, in the order the analyzer resolves them.
  pub const ALL: [Phase; 3] = [Phase::Committed, Phase::Started, Phase::Ended];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Committed => "committed",
      Self::Started => "started",
      Self::Ended => "ended",
    }
  }
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The flow event selected for a phase. Both fields are `None` when no
/// candidate state matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMarker {
  pub state:      Option<String>,
  pub entered_at: Option<Timestamp>,
}

impl PhaseMarker {
  pub fn new(state: impl Into<String>, entered_at: Timestamp) -> Self {
    Self {
      state:      Some(state.into()),
      entered_at: Some(entered_at),
    }
  }

  pub fn unresolved() -> Self { Self::default() }

  pub fn is_resolved(&self) -> bool { self.entered_at.is_some() }
}

impl From<&FlowEvent> for PhaseMarker {
  fn from(event: &FlowEvent) -> Self {
    Self::new(event.state.clone(), event.entered_at)
  }
}

// ─── AnalyzedTicket ──────────────────────────────────────────────────────────

/// A ticket seen through a phase configuration. Produced by the analyzer and
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedTicket {
  pub key:         String,
  pub title:       String,
  #[serde(rename = "type")]
  pub ticket_type: String,
  pub committed:   PhaseMarker,
  pub started:     PhaseMarker,
  pub ended:       PhaseMarker,
}

impl AnalyzedTicket {
  pub fn new(
    key: impl Into<String>,
    committed: PhaseMarker,
    started: PhaseMarker,
    ended: PhaseMarker,
  ) -> Self {
    Self {
      key: key.into(),
      title: String::new(),
      ticket_type: default_ticket_type(),
      committed,
      started,
      ended,
    }
  }

  pub fn with_type(mut self, ticket_type: impl Into<String>) -> Self {
    self.ticket_type = ticket_type.into();
    self
  }

  pub fn marker(&self, phase: Phase) -> &PhaseMarker {
    match phase {
      Phase::Committed => &self.committed,
      Phase::Started => &self.started,
      Phase::Ended => &self.ended,
    }
  }

  /// Whole days from committed to ended; `None` if either is unresolved.
  pub fn lead_time(&self) -> Option<i64> {
    Some(whole_days(self.committed.entered_at?, self.ended.entered_at?))
  }

  /// Whole days from started to ended; `None` if either is unresolved.
  pub fn cycle_time(&self) -> Option<i64> {
    Some(whole_days(self.started.entered_at?, self.ended.entered_at?))
  }
}

impl fmt::Display for AnalyzedTicket {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.ended.entered_at {
      Some(at) => write!(f, "{} -- Ended: {}", self.key, at),
      None => write!(f, "{} -- Ended: -", self.key),
    }
  }
}
