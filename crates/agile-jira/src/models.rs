//! Response shapes for `/rest/api/2/search` with `expand=changelog`.
//!
//! Only the fields the converter reads are modelled; everything else in the
//! payload is ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
  #[serde(default)]
  pub start_at:    usize,
  #[serde(default)]
  pub max_results: usize,
  #[serde(default)]
  pub total:       usize,
  #[serde(default)]
  pub issues:      Vec<JiraIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssue {
  pub key:       String,
  pub fields:    IssueFields,
  #[serde(default)]
  pub changelog: Option<Changelog>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueFields {
  #[serde(default)]
  pub summary:   Option<String>,
  #[serde(default)]
  pub issuetype: Option<IssueType>,
  pub created:   String,
  #[serde(default)]
  pub updated:   Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueType {
  pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Changelog {
  #[serde(default)]
  pub histories: Vec<History>,
}

/// One edit of an issue, possibly touching several fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
  pub created: String,
  #[serde(default)]
  pub items:   Vec<HistoryItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
  pub field:     String,
  #[serde(rename = "toString", default)]
  pub to_value:  Option<String>,
}
