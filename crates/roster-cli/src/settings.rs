//! Run configuration: an optional TOML file overlaid with `ROSTER__*`
//! environment variables.

use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use roster_pipeline::{BatchSettings, RetryPolicy};
use roster_providers::{ReportConfig, WatchlistAConfig, WatchlistBConfig};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Header of the dataset column holding the subject identifier.
  pub identifier_column: String,
  pub block_size:        usize,
  pub block_pause_secs:  u64,
  pub retry:             RetryPolicy,
  /// Directory the per-provider audit files are appended to.
  pub audit_dir:         PathBuf,

  pub watchlist_a: Option<WatchlistAConfig>,
  pub watchlist_b: Option<WatchlistBConfig>,
  pub report:      Option<ReportConfig>,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      identifier_column: "Rut".to_owned(),
      block_size:        10,
      block_pause_secs:  0,
      retry:             RetryPolicy::default(),
      audit_dir:         PathBuf::from("output_files"),
      watchlist_a:       None,
      watchlist_b:       None,
      report:            None,
    }
  }
}

impl Settings {
  /// Layer `path` (if it exists) under the `ROSTER` environment.
  pub fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path.into()).required(false))
      .add_source(
        config::Environment::with_prefix("ROSTER")
          .prefix_separator("__")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("invalid configuration")
  }

  pub fn batch(&self) -> BatchSettings {
    BatchSettings {
      block_size:  self.block_size,
      block_pause: Duration::from_secs(self.block_pause_secs),
      retry:       self.retry,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use roster_providers::ReportAuth;

  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load(dir.path().join("absent.toml")).unwrap();

    assert_eq!(settings.identifier_column, "Rut");
    assert_eq!(settings.block_size, 10);
    assert_eq!(settings.retry, RetryPolicy::default());
    assert!(settings.watchlist_a.is_none());
  }

  #[test]
  fn file_sections_configure_providers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.toml");
    fs::write(
      &path,
      r#"
identifier_column = "RUT"
block_size = 25
block_pause_secs = 3

[retry]
max_attempts = 2

[watchlist_b]
base_url = "https://aml.example.com/api"
api_key = "k3y"

[report]
base_url = "https://bureau.example.com/report"
token_url = "https://bureau.example.com/token"
scope = "reports"

[report.person]
client_id = "p-id"
client_secret = "p-secret"

[report.person.product]
bill_to = "B1"
ship_to = "S1"
product_name = "PLAT"
product_orch = "PLATV1"
customer = "C"
model = "M"

[report.corporation]
token = "static"

[report.corporation.product]
bill_to = "B2"
ship_to = "S2"
product_name = "CORP"
product_orch = "CORPV1"
customer = "C"
model = "M"
"#,
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    let batch = settings.batch();

    assert_eq!(settings.identifier_column, "RUT");
    assert_eq!(batch.block_size, 25);
    assert_eq!(batch.block_pause, Duration::from_secs(3));
    assert_eq!(batch.retry.max_attempts, 2);
    assert_eq!(batch.retry.delay, Duration::from_secs(2));
    assert!(settings.watchlist_a.is_none());
    assert_eq!(settings.watchlist_b.unwrap().api_key, "k3y");

    let report = settings.report.unwrap();
    assert!(matches!(report.person.auth, ReportAuth::Credentials { .. }));
    assert!(matches!(report.corporation.auth, ReportAuth::Token { ref token } if token == "static"));
    assert_eq!(report.corporation.product.configuration, "Config");
  }
}
