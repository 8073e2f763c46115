//! Paginated, retrying search against a saved JIRA filter.

use std::{collections::BTreeMap, time::Duration};

use agile_core::ticket::Ticket;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  convert::convert_issue,
  credentials::Credentials,
  models::SearchPage,
};

fn default_max_results() -> usize { 999 }
fn default_page_size() -> usize { 100 }
fn default_max_retries() -> u32 { 3 }
fn default_timeout_secs() -> u64 { 30 }

/// Fetcher settings, as read from the `[jira]` configuration table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
  /// Base URL of the JIRA instance, including scheme.
  pub url:          String,
  /// Flat credential map; see [`Credentials::from_map`].
  #[serde(default)]
  pub auth:         BTreeMap<String, String>,
  /// Saved filter whose issues are fetched.
  pub filter_id:    u64,
  /// Upper bound on issues fetched in total.
  #[serde(default = "default_max_results")]
  pub max_results:  usize,
  #[serde(default = "default_page_size")]
  pub page_size:    usize,
  #[serde(default = "default_max_retries")]
  pub max_retries:  u32,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl FetcherConfig {
  pub fn new(url: impl Into<String>, auth: BTreeMap<String, String>, filter_id: u64) -> Self {
    Self {
      url: url.into(),
      auth,
      filter_id,
      max_results: default_max_results(),
      page_size: default_page_size(),
      max_retries: default_max_retries(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

/// Fetches the issues of one saved filter and converts them to tickets.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct JiraFetcher {
  client:      Client,
  config:      FetcherConfig,
  credentials: Credentials,
}

impl JiraFetcher {
  /// Validates the credential map up front; a bad map never reaches the
  /// network.
  pub fn new(config: FetcherConfig) -> Result<Self> {
    let credentials = Credentials::from_map(&config.auth)?;
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config, credentials })
  }

  fn url(&self) -> String {
    format!("{}/rest/api/2/search", self.config.url.trim_end_matches('/'))
  }

  fn auth(&self, req: RequestBuilder) -> Result<RequestBuilder> {
    match &self.credentials {
      Credentials::Basic { username, password } => Ok(req.basic_auth(username, Some(password))),
      // TODO: sign requests with OAuth 1.0a RSA-SHA1 using `key_cert`.
      Credentials::OAuth { .. } => Err(Error::UnsupportedAuth(self.credentials.scheme())),
    }
  }

  /// Fetch every issue in the filter, up to `max_results`, and convert each
  /// to a [`Ticket`].
  pub async fn fetch(&self) -> Result<Vec<Ticket>> {
    let jql = format!("filter={}", self.config.filter_id);
    let mut tickets = Vec::new();
    let mut start_at: usize = 0;

    while tickets.len() < self.config.max_results {
      let page_size = self.config.page_size.min(self.config.max_results - tickets.len());
      let query = [
        ("jql", jql.clone()),
        ("startAt", start_at.to_string()),
        ("maxResults", page_size.to_string()),
        ("expand", "changelog".to_string()),
      ];
      let page: SearchPage = self.request_with_retry(&query).await?;
      let received = page.issues.len();
      debug!(start_at, received, total = page.total, "fetched search page");

      for issue in &page.issues {
        tickets.push(convert_issue(issue)?);
      }

      start_at += received;
      if received == 0 || start_at >= page.total {
        break;
      }
    }

    tickets.truncate(self.config.max_results);
    info!(filter_id = self.config.filter_id, tickets = tickets.len(), "fetched tickets");
    Ok(tickets)
  }

  async fn request_with_retry<T: DeserializeOwned>(
    &self,
    query: &[(&str, String)],
  ) -> Result<T> {
    let mut last_error = String::new();
    let mut rate_limited = false;

    for attempt in 0..=self.config.max_retries {
      // A Retry-After wait already spaced this attempt out.
      if attempt > 0 && !std::mem::take(&mut rate_limited) {
        let backoff_secs = std::cmp::min(1u64 << attempt, 30);
        warn!(attempt, backoff_secs, "retrying after backoff");
        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
      }

      let request = self.auth(self.client.get(self.url()).query(query))?;
      let response = match request.send().await {
        Ok(resp) => resp,
        Err(e) => {
          last_error = e.to_string();
          if e.is_timeout() || e.is_connect() {
            continue;
          }
          return Err(Error::Request(e));
        }
      };

      let status = response.status();

      if status.is_success() {
        return Ok(response.json::<T>().await?);
      }

      if status == StatusCode::TOO_MANY_REQUESTS {
        if let Some(retry_after) = response
          .headers()
          .get(reqwest::header::RETRY_AFTER)
          .and_then(|v| v.to_str().ok())
          .and_then(|v| v.parse::<u64>().ok())
        {
          let wait = std::cmp::min(retry_after, 60);
          warn!(wait, "rate-limited, waiting Retry-After");
          tokio::time::sleep(Duration::from_secs(wait)).await;
          rate_limited = true;
        }
        last_error = "429 Too Many Requests".to_string();
        continue;
      }

      if status.is_server_error() {
        let body = response.text().await.unwrap_or_default();
        last_error = format!("{status}: {body}");
        continue;
      }

      let body = response.text().await.unwrap_or_default();
      return Err(Error::Http { status, body });
    }

    Err(Error::MaxRetriesExceeded {
      attempts: self.config.max_retries + 1,
      last_error,
    })
  }
}
