//! Windowed reports over analysed tickets.
//!
//! Every reporter filters a batch of [`AnalyzedTicket`]s to its date window,
//! buckets them by week where relevant, and aggregates them into a
//! [`Report`]: a table of rows plus a summary.
//!
//! # Quick start
//!
//! ```no_run
//! use agile_report::{Reporter, throughput::ThroughputReporter, Period};
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2016, 5, 21).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let end = NaiveDate::from_ymd_opt(2016, 6, 21).unwrap().and_hms_opt(23, 59, 59).unwrap();
//! let reporter = ThroughputReporter::new("Weekly Throughput")
//!   .with_period(Period::Weekly)
//!   .with_range(start, end);
//! let report = reporter.report_on(&[], true).unwrap();
//! assert_eq!(report.table[0].len(), 2);
//! ```
//!
//! [`AnalyzedTicket`]: agile_core::ticket::AnalyzedTicket

pub mod created;
pub mod distribution;
pub mod error;
pub mod percentile;
pub mod report;
pub mod reporter;
pub mod sla;
pub mod throughput;
pub mod ticket_list;
pub mod window;

pub use error::{Error, Result};
pub use report::{Cell, Report, Row, Summary};
pub use reporter::{AnyReporter, Period, ReportKind, ReportSettings, Reporter};
