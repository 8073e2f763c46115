//! Error types for the spreadsheet writer.

use std::{io, path::PathBuf};

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to read service account key {path}: {source}")]
  KeyFile {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to build service account authenticator: {0}")]
  Authenticator(#[source] io::Error),

  #[error("token request failed: {0}")]
  Token(#[from] yup_oauth2::Error),

  #[error("token response carried no access token")]
  MissingToken,

  #[error("invalid Sheets base URL {0:?}")]
  InvalidBaseUrl(String),

  #[error("HTTP {status}: {body}")]
  Http { status: StatusCode, body: String },

  #[error("request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("addSheet reply did not describe worksheet {0:?}")]
  MissingAddSheetReply(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
