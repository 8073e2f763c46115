//! JIRA ticket source.
//!
//! Validates credentials at construction, pages through a saved filter's
//! issues with their changelog, and converts each issue into an
//! [`agile_core::ticket::Ticket`] whose flow log holds a synthetic `Created`
//! event followed by the issue's status changes.
//!
//! # Quick start
//!
//! ```no_run
//! use std::collections::BTreeMap;
//!
//! use agile_jira::{FetcherConfig, JiraFetcher};
//!
//! # async fn demo() -> agile_jira::Result<()> {
//! let auth = BTreeMap::from([
//!   ("username".to_string(), "me".to_string()),
//!   ("password".to_string(), "secret".to_string()),
//! ]);
//! let fetcher = JiraFetcher::new(FetcherConfig::new("https://jira.example.com", auth, 1234))?;
//! let tickets = fetcher.fetch().await?;
//! println!("{} tickets", tickets.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod convert;
pub mod credentials;
pub mod error;
pub mod models;

pub use client::{FetcherConfig, JiraFetcher};
pub use credentials::Credentials;
pub use error::{Error, Result};
