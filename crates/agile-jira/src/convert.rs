//! JIRA issue to [`Ticket`] conversion.

use agile_core::{
  Timestamp,
  flow::FlowEvent,
  ticket::{DEFAULT_TICKET_TYPE, Ticket},
};
use chrono::DateTime;

use crate::{
  Error, Result,
  models::{HistoryItem, JiraIssue},
};

/// State recorded for the moment an issue was created.
pub const CREATED_STATE: &str = "Created";

/// Format JIRA uses for timestamps, e.g. `2016-03-30T17:27:09.000+0000`.
pub const JIRA_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Parse a JIRA timestamp, falling back to RFC 3339.
pub fn parse_jira_time(raw: &str) -> Option<Timestamp> {
  DateTime::parse_from_str(raw, JIRA_TIME_FORMAT)
    .or_else(|_| DateTime::parse_from_rfc3339(raw))
    .ok()
}

fn timestamp(key: &str, field: &'static str, raw: &str) -> Result<Timestamp> {
  parse_jira_time(raw).ok_or_else(|| Error::InvalidTimestamp {
    key: key.to_string(),
    field,
    value: raw.to_string(),
  })
}

fn status_change(item: &HistoryItem) -> Option<&str> {
  match item.field.as_str() {
    "status" => item.to_value.as_deref().filter(|s| !s.is_empty()),
    _ => None,
  }
}

/// Build a ticket whose flow log starts with a `Created` event at the
/// creation time, followed by one event per status change.
pub fn convert_issue(issue: &JiraIssue) -> Result<Ticket> {
  let key = issue.key.as_str();
  let fields = &issue.fields;

  let mut ticket = Ticket::new(key)
    .with_title(fields.summary.clone().unwrap_or_default())
    .with_type(
      fields
        .issuetype
        .as_ref()
        .map_or(DEFAULT_TICKET_TYPE, |t| t.name.as_str()),
    );

  let created_at = timestamp(key, "created", &fields.created)?;
  ticket.created_at = Some(created_at);
  ticket.updated_at = fields
    .updated
    .as_deref()
    .map(|raw| timestamp(key, "updated", raw))
    .transpose()?;
  ticket.flow_log.append(FlowEvent::new(CREATED_STATE, created_at));

  for history in issue.changelog.iter().flat_map(|c| &c.histories) {
    let changes: Vec<&str> = history.items.iter().filter_map(status_change).collect();
    if changes.is_empty() {
      continue;
    }
    let entered_at = timestamp(key, "history", &history.created)?;
    for state in changes {
      ticket.flow_log.append(FlowEvent::new(state, entered_at));
    }
  }

  Ok(ticket)
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::*;

  fn issue(json: &str) -> JiraIssue { serde_json::from_str(json).expect("valid issue JSON") }

  #[test]
  fn parses_jira_and_rfc3339_times() {
    let expected = Utc.with_ymd_and_hms(2016, 3, 30, 17, 27, 9).unwrap().fixed_offset();
    assert_eq!(parse_jira_time("2016-03-30T17:27:09.000+0000"), Some(expected));
    assert_eq!(parse_jira_time("2016-03-30T17:27:09Z"), Some(expected));
    assert_eq!(parse_jira_time("2016-03-30T17:27:09"), None);
    assert_eq!(parse_jira_time("yesterday"), None);
  }

  #[test]
  fn converts_issue_with_status_history() {
    let ticket = convert_issue(&issue(
      r#"{
        "key": "TEST-1",
        "fields": {
          "summary": "Fix the thing",
          "issuetype": {"name": "Bug"},
          "created": "2016-03-30T17:27:09.000+0000",
          "updated": "2016-04-05T12:00:00.000-0500"
        },
        "changelog": {"histories": [
          {"created": "2016-04-03T09:00:00.000+0000",
           "items": [{"field": "status", "toString": "Done"}]},
          {"created": "2016-03-31T09:00:00.000+0000",
           "items": [
             {"field": "assignee", "toString": "Alice"},
             {"field": "status", "toString": "In Progress"}
           ]},
          {"created": "not a date", "items": [{"field": "labels", "toString": "x"}]}
        ]}
      }"#,
    ))
    .unwrap();

    assert_eq!(ticket.key, "TEST-1");
    assert_eq!(ticket.title, "Fix the thing");
    assert_eq!(ticket.ticket_type, "Bug");
    assert_eq!(ticket.updated_at.unwrap().offset().local_minus_utc(), -5 * 3600);

    let states: Vec<_> = ticket.flow_log.iter().map(|e| e.state.as_str()).collect();
    assert_eq!(states, ["Created", "In Progress", "Done"]);
    assert_eq!(ticket.flow_log.as_slice()[0].entered_at, ticket.created_at.unwrap());
  }

  #[test]
  fn blank_status_changes_are_skipped() {
    let ticket = convert_issue(&issue(
      r#"{
        "key": "TEST-4",
        "fields": {"created": "2016-03-30T17:27:09.000+0000"},
        "changelog": {"histories": [
          {"created": "2016-03-31T09:00:00.000+0000",
           "items": [{"field": "status", "toString": ""}]},
          {"created": "2016-04-01T09:00:00.000+0000",
           "items": [{"field": "status", "toString": null}]},
          {"created": "2016-04-02T09:00:00.000+0000",
           "items": [{"field": "status", "toString": "Done"}]}
        ]}
      }"#,
    ))
    .unwrap();

    let states: Vec<_> = ticket.flow_log.iter().map(|e| e.state.as_str()).collect();
    assert_eq!(states, ["Created", "Done"]);
  }

  #[test]
  fn missing_type_and_changelog_use_defaults() {
    let ticket = convert_issue(&issue(
      r#"{"key": "TEST-2", "fields": {"created": "2016-03-30T17:27:09.000+0000"}}"#,
    ))
    .unwrap();

    assert_eq!(ticket.ticket_type, "Ticket");
    assert_eq!(ticket.title, "");
    assert_eq!(ticket.updated_at, None);
    assert_eq!(ticket.flow_log.len(), 1);
  }

  #[test]
  fn bad_created_time_is_an_error() {
    let err = convert_issue(&issue(r#"{"key": "TEST-3", "fields": {"created": "soon"}}"#))
      .unwrap_err();
    assert!(matches!(err, Error::InvalidTimestamp { field: "created", .. }));
  }
}
