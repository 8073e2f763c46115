//! Credential sets accepted by the fetcher.

use std::{collections::BTreeMap, fmt};

use crate::{Error, Result};

pub const BASIC_AUTH_KEYS: [&str; 2] = ["password", "username"];
pub const OAUTH_KEYS: [&str; 4] =
  ["access_token", "access_token_secret", "consumer_key", "key_cert"];

/// Authentication for the JIRA REST API. The two variants are mutually
/// exclusive.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
  Basic {
    username: String,
    password: String,
  },
  OAuth {
    access_token:        String,
    access_token_secret: String,
    consumer_key:        String,
    key_cert:            String,
  },
}

impl Credentials {
  /// Build from a flat key/value map, as found in a configuration file.
  ///
  /// The keys must be exactly one of [`BASIC_AUTH_KEYS`] or [`OAUTH_KEYS`].
  pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self> {
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    let take = |key: &str| map.get(key).cloned().unwrap_or_default();

    if keys == BASIC_AUTH_KEYS {
      Ok(Self::Basic {
        username: take("username"),
        password: take("password"),
      })
    } else if keys == OAUTH_KEYS {
      Ok(Self::OAuth {
        access_token:        take("access_token"),
        access_token_secret: take("access_token_secret"),
        consumer_key:        take("consumer_key"),
        key_cert:            take("key_cert"),
      })
    } else {
      Err(Error::MisconfiguredCredentials {
        keys: keys.into_iter().map(str::to_string).collect(),
      })
    }
  }

  pub fn scheme(&self) -> &'static str {
    match self {
      Self::Basic { .. } => "basic",
      Self::OAuth { .. } => "OAuth",
    }
  }
}

// Secrets stay out of logs.
impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Basic { username, .. } => f
        .debug_struct("Basic")
        .field("username", username)
        .finish_non_exhaustive(),
      Self::OAuth { consumer_key, .. } => f
        .debug_struct("OAuth")
        .field("consumer_key", consumer_key)
        .finish_non_exhaustive(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
  }

  #[test]
  fn basic_credentials() {
    let creds = Credentials::from_map(&map(&[("username", "foo"), ("password", "bar")])).unwrap();
    assert_eq!(creds, Credentials::Basic {
      username: "foo".into(),
      password: "bar".into(),
    });
    assert_eq!(creds.scheme(), "basic");
  }

  #[test]
  fn oauth_credentials() {
    let creds = Credentials::from_map(&map(&[
      ("access_token", "a"),
      ("access_token_secret", "b"),
      ("consumer_key", "c"),
      ("key_cert", "d"),
    ]))
    .unwrap();
    assert!(matches!(creds, Credentials::OAuth { ref key_cert, .. } if key_cert == "d"));
  }

  #[test]
  fn mixed_or_partial_sets_are_rejected() {
    for pairs in [
      vec![("username", "foo")],
      vec![("username", "foo"), ("password", "bar"), ("consumer_key", "c")],
      vec![("token", "x")],
      vec![],
    ] {
      let err = Credentials::from_map(&map(&pairs)).unwrap_err();
      assert!(matches!(err, Error::MisconfiguredCredentials { .. }));
    }
  }

  #[test]
  fn debug_hides_secrets() {
    let creds = Credentials::from_map(&map(&[("username", "foo"), ("password", "hunter2")])).unwrap();
    assert!(!format!("{creds:?}").contains("hunter2"));
  }
}
