//! CSV output for reports.
//!
//! Writes a [`Report`]'s table verbatim, one record per row, with standard
//! CSV quoting. The summary is not written.
//!
//! # Quick start
//!
//! ```no_run
//! use agile_csv::CsvWriter;
//! # fn demo(report: &agile_report::Report) -> agile_csv::Result<()> {
//! CsvWriter::new().write(std::io::stdout(), report)?;
//! # Ok(())
//! # }
//! ```

pub mod error;

use std::io;

use agile_report::{Report, Row};
pub use error::{Error, Result};
use tracing::debug;

/// Serialises report tables as CSV.
#[derive(Debug, Clone)]
pub struct CsvWriter {
  delimiter: u8,
}

impl Default for CsvWriter {
  fn default() -> Self { Self { delimiter: b',' } }
}

impl CsvWriter {
  pub fn new() -> Self { Self::default() }

  /// Use `delimiter` between fields instead of a comma.
  pub fn with_delimiter(mut self, delimiter: u8) -> Self {
    self.delimiter = delimiter;
    self
  }

  /// Write every row of `report` to `destination`. Rows may differ in
  /// length.
  pub fn write<W: io::Write>(&self, destination: W, report: &Report) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
      .delimiter(self.delimiter)
      .flexible(true)
      .terminator(csv::Terminator::Any(b'\n'))
      .from_writer(destination);

    for row in &report.table {
      writer.write_record(render(row))?;
    }
    writer.flush()?;

    debug!(title = %report.summary.title, rows = report.table.len(), "wrote CSV report");
    Ok(())
  }

  /// Render `report` to an in-memory string.
  pub fn to_csv_string(&self, report: &Report) -> Result<String> {
    let mut buf = Vec::new();
    self.write(&mut buf, report)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
  }
}

fn render(row: &Row) -> Vec<String> { row.iter().map(ToString::to_string).collect() }
