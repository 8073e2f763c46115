//! Google Sheets output for reports.
//!
//! Authenticates with a service account key, finds (or adds) the named
//! worksheet, resizes it to the report's rows × columns, clears it, and
//! writes the table starting at `A1`.
//!
//! # Quick start
//!
//! ```no_run
//! use agile_gsheet::{SheetConfig, SheetWriter};
//! use agile_report::Report;
//!
//! # async fn demo(report: Report) -> agile_gsheet::Result<()> {
//! let config = SheetConfig::new("1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms", "service-account.json");
//! let writer = SheetWriter::connect(&config).await?;
//! writer.write("Throughput", &report).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod models;
pub mod writer;

pub use error::{Error, Result};
pub use writer::{SheetConfig, SheetWriter};
