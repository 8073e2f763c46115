//! Layered configuration for `agile-flow`.
//!
//! A TOML file is read first, then `AGILE_FLOW__*` environment variables
//! override individual keys (`AGILE_FLOW__JIRA__FILTER_ID=1234`).

use std::path::Path;

use agile_core::analyzer::{AnalysisMode, PhaseAnalyzer, PhaseStates};
use agile_gsheet::SheetConfig;
use agile_jira::FetcherConfig;
use agile_report::ReportSettings;
use anyhow::Context as _;
use serde::Deserialize;

pub const ENV_PREFIX: &str = "AGILE_FLOW";

fn default_strict() -> bool { true }

/// Candidate states per phase, most specific first.
#[derive(Debug, Clone, Deserialize)]
pub struct PhaseConfig {
  pub committed: Vec<String>,
  pub started:   Vec<String>,
  pub ended:     Vec<String>,
  /// Drop tickets with an unresolved phase instead of keeping them
  /// partially analysed.
  #[serde(default = "default_strict")]
  pub strict:    bool,
}

impl PhaseConfig {
  pub fn analyzer(&self) -> agile_core::Result<PhaseAnalyzer> {
    let states = PhaseStates::new(
      self.committed.iter().cloned(),
      self.started.iter().cloned(),
      self.ended.iter().cloned(),
    );
    let mode = if self.strict { AnalysisMode::Strict } else { AnalysisMode::Partial };
    PhaseAnalyzer::new(states, mode)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Needed only when tickets are fetched rather than read from a file.
  #[serde(default)]
  pub jira:   Option<FetcherConfig>,
  pub phases: PhaseConfig,
  #[serde(default)]
  pub report: ReportSettings,
  /// Needed only when a report is written with `--sheet`.
  #[serde(default)]
  pub sheet:  Option<SheetConfig>,
}

impl AppConfig {
  /// Load `path` (if it exists) layered under the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix(ENV_PREFIX)
          .prefix_separator("__")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise AppConfig")
  }
}
