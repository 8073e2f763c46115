//! Phase analysis: mapping raw state transitions onto semantic phases.
//!
//! Each phase is configured with an ordered list of candidate state names.
//! Candidates are tried in configuration order, not time order: the first
//! candidate with any matching event wins and later candidates are never
//! consulted. Among the winning candidate's events, `committed` and `started`
//! take the oldest and `ended` takes the newest, so a ticket that bounces
//! back into "In Progress" keeps its first start and its final completion.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  flow::{FlowEvent, FlowLog},
  ticket::{AnalyzedTicket, Phase, PhaseMarker, Ticket},
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Candidate state names for each phase, most specific first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseStates {
  pub committed: Vec<String>,
  pub started:   Vec<String>,
  pub ended:     Vec<String>,
}

impl PhaseStates {
  pub fn new<S: Into<String>>(
    committed: impl IntoIterator<Item = S>,
    started: impl IntoIterator<Item = S>,
    ended: impl IntoIterator<Item = S>,
  ) -> Self {
    Self {
      committed: committed.into_iter().map(Into::into).collect(),
      started:   started.into_iter().map(Into::into).collect(),
      ended:     ended.into_iter().map(Into::into).collect(),
    }
  }

  pub fn for_phase(&self, phase: Phase) -> &[String] {
    match phase {
      Phase::Committed => &self.committed,
      Phase::Started => &self.started,
      Phase::Ended => &self.ended,
    }
  }
}

/// What to do with a ticket when a phase cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
  /// Exclude the ticket and record it as ignored.
  #[default]
  Strict,
  /// Keep the ticket with the phase left unresolved.
  Partial,
}

/// Which of several events for the same state a phase keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
  Oldest,
  Newest,
}

impl DuplicatePolicy {
  pub fn for_phase(phase: Phase) -> Self {
    match phase {
      Phase::Committed | Phase::Started => Self::Oldest,
      Phase::Ended => Self::Newest,
    }
  }
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// A ticket strict analysis refused, with the phase that failed to resolve.
#[derive(Debug, Clone)]
pub struct IgnoredTicket<'a> {
  pub ticket: &'a Ticket,
  pub phase:  Phase,
  /// The candidate states that found no match.
  pub states: Vec<String>,
}

/// The outcome of analysing a batch. `ignored` is always empty in
/// [`AnalysisMode::Partial`].
#[derive(Debug, Clone, Default)]
pub struct Analysis<'a> {
  pub analyzed: Vec<AnalyzedTicket>,
  pub ignored:  Vec<IgnoredTicket<'a>>,
}

// ─── Analyzer ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PhaseAnalyzer {
  states: PhaseStates,
  mode:   AnalysisMode,
}

impl PhaseAnalyzer {
  /// Every phase needs at least one candidate state.
  pub fn new(states: PhaseStates, mode: AnalysisMode) -> Result<Self> {
    if let Some(phase) = Phase::ALL
      .into_iter()
      .find(|p| states.for_phase(*p).is_empty())
    {
      return Err(Error::MisconfiguredAnalyzer(phase));
    }
    Ok(Self { states, mode })
  }

  pub fn strict(states: PhaseStates) -> Result<Self> {
    Self::new(states, AnalysisMode::Strict)
  }

  pub fn partial(states: PhaseStates) -> Result<Self> {
    Self::new(states, AnalysisMode::Partial)
  }

  pub fn states(&self) -> &PhaseStates { &self.states }

  pub fn mode(&self) -> AnalysisMode { self.mode }

  /// Analyse a batch. A ticket that fails strict analysis lands in
  /// `ignored`; it never aborts the rest of the batch.
  pub fn analyze<'a>(&self, tickets: &'a [Ticket]) -> Analysis<'a> {
    let mut analysis = Analysis::default();
    for ticket in tickets {
      match self.resolve(ticket) {
        Ok(analyzed) => analysis.analyzed.push(analyzed),
        Err(phase) => {
          let states = self.states.for_phase(phase).to_vec();
          tracing::debug!(key = %ticket.key, %phase, ?states, "ignoring ticket");
          analysis.ignored.push(IgnoredTicket {
            ticket,
            phase,
            states,
          });
        }
      }
    }
    tracing::info!(
      analyzed = analysis.analyzed.len(),
      ignored = analysis.ignored.len(),
      "analysis complete"
    );
    analysis
  }

  /// Resolve all three phases for one ticket.
  ///
  /// Fails with [`Error::MissingPhaseInformation`] in strict mode when a
  /// phase has no matching event; phases are checked in
  /// committed / started / ended order.
  pub fn analyze_ticket(&self, ticket: &Ticket) -> Result<AnalyzedTicket> {
    self
      .resolve(ticket)
      .map_err(|phase| Error::MissingPhaseInformation {
        key: ticket.key.clone(),
        phase,
        states: self.states.for_phase(phase).to_vec(),
      })
  }

  /// `Err` carries the first unresolved phase; only strict mode fails.
  fn resolve(&self, ticket: &Ticket) -> std::result::Result<AnalyzedTicket, Phase> {
    let markers = Phase::ALL.map(|phase| {
      let candidates = self.states.for_phase(phase);
      find_phase_entry(&ticket.flow_log, candidates, DuplicatePolicy::for_phase(phase))
        .map(PhaseMarker::from)
        .ok_or(phase)
    });

    if self.mode == AnalysisMode::Strict
      && let Some(Err(phase)) = markers.iter().find(|m| m.is_err())
    {
      return Err(*phase);
    }

    let [committed, started, ended] = markers.map(|m| m.unwrap_or_default());

    Ok(AnalyzedTicket {
      key: ticket.key.clone(),
      title: ticket.title.clone(),
      ticket_type: ticket.ticket_type.clone(),
      committed,
      started,
      ended,
    })
  }
}

/// Pick the event for one phase.
///
/// Scans `candidates` in order; the first name with any event in `log`
/// decides the phase, and `policy` chooses among that name's events.
pub fn find_phase_entry<'a>(
  log: &'a FlowLog,
  candidates: &[String],
  policy: DuplicatePolicy,
) -> Option<&'a FlowEvent> {
  candidates.iter().find_map(|name| {
    let mut matching = log.iter().filter(|e| &e.state == name);
    match policy {
      DuplicatePolicy::Oldest => matching.next(),
      DuplicatePolicy::Newest => matching.last(),
    }
  })
}
