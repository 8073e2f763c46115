//! Core types for agile flow analytics.
//!
//! Tickets carry an ordered log of state transitions; the [`PhaseAnalyzer`]
//! maps that log onto the committed / started / ended phases from which lead
//! and cycle times are derived.
//!
//! Pure synchronous code; no I/O happens in this crate.
//!
//! [`PhaseAnalyzer`]: analyzer::PhaseAnalyzer

pub mod analyzer;
pub mod error;
pub mod flow;
pub mod ticket;
pub mod time;

pub use error::{Error, Result};
pub use time::Timestamp;
