//! The flow log, an ordered record of the states a ticket has entered.
//!
//! The log is always sorted ascending by `entered_at`; appending re-sorts.
//! Entries are never deduplicated: re-entering a state, even at the same
//! instant, adds another entry.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  Error, Result,
  time::{Timestamp, parse_timestamp},
};

// ─── FlowEvent ───────────────────────────────────────────────────────────────

/// A single state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEvent {
  pub state:      String,
  pub entered_at: Timestamp,
}

impl FlowEvent {
  pub fn new(state: impl Into<String>, entered_at: Timestamp) -> Self {
    Self {
      state: state.into(),
      entered_at,
    }
  }

  /// Validate a loosely-typed `{state, entered_at}` mapping.
  ///
  /// `state` may be a string, number or boolean and is coerced to text.
  /// `entered_at` must be an RFC 3339 string carrying an offset.
  pub fn from_value(value: &Value) -> Result<Self> {
    let Value::Object(map) = value else {
      return Err(Error::InvalidFlowEvent(format!(
        "expected an object with 'state' and 'entered_at', got {value}"
      )));
    };

    let state = match map.get("state") {
      Some(Value::String(s)) => s.clone(),
      Some(Value::Number(n)) => n.to_string(),
      Some(Value::Bool(b)) => b.to_string(),
      Some(other) => {
        return Err(Error::InvalidFlowEvent(format!(
          "'state' must be text, got {other}"
        )));
      }
      None => return Err(Error::InvalidFlowEvent("missing 'state'".into())),
    };
    if state.is_empty() {
      return Err(Error::InvalidFlowEvent("'state' is empty".into()));
    }

    let entered_at = match map.get("entered_at") {
      Some(Value::String(raw)) => parse_timestamp(raw)?,
      Some(other) => {
        return Err(Error::InvalidFlowEvent(format!(
          "'entered_at' must be a timestamp string, got {other}"
        )));
      }
      None => {
        return Err(Error::InvalidFlowEvent("missing 'entered_at'".into()));
      }
    };

    Ok(Self { state, entered_at })
  }
}

// ─── FlowLog ─────────────────────────────────────────────────────────────────

/// Transition history for one ticket, sorted ascending by `entered_at`.
///
/// Serialises as a plain array of events. Deserialisation runs every element
/// through [`FlowEvent::from_value`], so a log read from disk obeys the same
/// rules as one built in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Value>", into = "Vec<FlowEvent>")]
pub struct FlowLog {
  events: Vec<FlowEvent>,
}

impl FlowLog {
  pub fn new() -> Self { Self::default() }

  /// Insert `event`, keeping the log sorted. Events with equal timestamps
  /// keep their insertion order.
  pub fn append(&mut self, event: FlowEvent) {
    self.events.push(event);
    self.events.sort_by_key(|e| e.entered_at);
  }

  /// Validate and insert a raw mapping. On error the log is unchanged.
  pub fn append_value(&mut self, value: &Value) -> Result<()> {
    let event = FlowEvent::from_value(value)?;
    self.append(event);
    Ok(())
  }

  pub fn iter(&self) -> std::slice::Iter<'_, FlowEvent> { self.events.iter() }

  pub fn len(&self) -> usize { self.events.len() }

  pub fn is_empty(&self) -> bool { self.events.is_empty() }

  pub fn as_slice(&self) -> &[FlowEvent] { &self.events }
}

impl<'a> IntoIterator for &'a FlowLog {
  type IntoIter = std::slice::Iter<'a, FlowEvent>;
  type Item = &'a FlowEvent;

  fn into_iter(self) -> Self::IntoIter { self.events.iter() }
}

impl TryFrom<Vec<Value>> for FlowLog {
  type Error = Error;

  fn try_from(values: Vec<Value>) -> Result<Self> {
    let mut log = FlowLog::new();
    for value in &values {
      log.append_value(value)?;
    }
    Ok(log)
  }
}

impl From<FlowLog> for Vec<FlowEvent> {
  fn from(log: FlowLog) -> Self { log.events }
}
