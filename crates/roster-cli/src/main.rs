//! `roster`: batch compliance screening over a CSV roster.
//!
//! Reads `roster.toml` (or the path given with `--config`) and `ROSTER__*`
//! environment variables, then runs the selected stages over the dataset,
//! persisting after every block. Re-running is always safe: records that
//! are already resolved are skipped without provider calls.

mod run;
mod settings;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::{Instrument as _, info_span, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::settings::Settings;

#[derive(Parser)]
#[command(author, version, about = "Batch compliance screening for a subject roster")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "roster.toml")]
  config: PathBuf,

  /// The roster CSV. Updated in place.
  dataset: PathBuf,

  /// Which stages to run.
  #[arg(value_enum, default_value_t = Stage::Run)]
  stage: Stage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Stage {
  /// Case preparation followed by screening.
  Run,
  Prepare,
  Screen,
  /// Contact enrichment from credit reports.
  Enrich,
  /// Preparation, screening and enrichment.
  All,
}

impl Stage {
  pub fn prepares(self) -> bool { matches!(self, Self::Run | Self::Prepare | Self::All) }

  pub fn screens(self) -> bool { matches!(self, Self::Run | Self::Screen | Self::All) }

  pub fn enriches(self) -> bool { matches!(self, Self::Enrich | Self::All) }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  let run_id = Uuid::new_v4();
  let span = info_span!("run", %run_id, dataset = %cli.dataset.display(), stage = ?cli.stage);
  run::execute(cli.stage, &cli.dataset, &settings).instrument(span).await
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;

  #[test]
  fn cli_is_well_formed() { Cli::command().debug_assert(); }

  #[test]
  fn stage_defaults_to_run() {
    let cli = Cli::try_parse_from(["roster", "clients.csv"]).unwrap();
    assert_eq!(cli.stage, Stage::Run);
    assert_eq!(cli.config, PathBuf::from("roster.toml"));
  }

  #[test]
  fn stage_selection() {
    let cli = Cli::try_parse_from(["roster", "-c", "x.toml", "clients.csv", "enrich"]).unwrap();
    assert_eq!(cli.stage, Stage::Enrich);
    assert!(cli.stage.enriches() && !cli.stage.screens() && !cli.stage.prepares());
    assert!(Stage::All.prepares() && Stage::All.screens() && Stage::All.enriches());
    assert!(Stage::Run.prepares() && Stage::Run.screens() && !Stage::Run.enriches());
  }
}
