//! Error types for the JIRA fetcher.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The credential map matched neither the basic nor the OAuth key set.
  #[error(
    "credentials must be exactly {{username, password}} or {{access_token, \
     access_token_secret, consumer_key, key_cert}}, got {keys:?}"
  )]
  MisconfiguredCredentials { keys: Vec<String> },

  #[error("{0} authentication is not supported by this fetcher")]
  UnsupportedAuth(&'static str),

  #[error("HTTP {status}: {body}")]
  Http { status: StatusCode, body: String },

  #[error("request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("max retries exceeded after {attempts} attempts: {last_error}")]
  MaxRetriesExceeded { attempts: u32, last_error: String },

  #[error("invalid {field} timestamp on {key}: {value:?}")]
  InvalidTimestamp {
    key:   String,
    field: &'static str,
    value: String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
