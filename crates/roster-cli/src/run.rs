//! Wiring: open the store and sink, build the configured providers, and
//! drive the selected stages.

use std::path::Path;

use anyhow::Context as _;
use chrono::Utc;
use roster_core::{audit::AuditSink, provider::ScreeningSource, store::RecordStore};
use roster_pipeline::{BatchDriver, StageSummary};
use roster_providers::{ReportClient, WatchlistAClient, WatchlistBClient};
use roster_store_csv::{CsvAuditSink, CsvRecordStore};
use tracing::{info, warn};

use crate::{Stage, settings::Settings};

/// Providers built from the settings. An absent section leaves its slot
/// empty and the stages that need it are skipped.
struct Providers {
  watchlist_a: Option<WatchlistAClient>,
  watchlist_b: Option<WatchlistBClient>,
  report:      Option<ReportClient>,
}

impl Providers {
  fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
    Ok(Self {
      watchlist_a: settings
        .watchlist_a
        .clone()
        .map(WatchlistAClient::new)
        .transpose()
        .context("invalid watchlist_a settings")?,
      watchlist_b: settings
        .watchlist_b
        .clone()
        .map(WatchlistBClient::new)
        .transpose()
        .context("invalid watchlist_b settings")?,
      report:      settings
        .report
        .clone()
        .map(ReportClient::new)
        .transpose()
        .context("invalid report settings")?,
    })
  }
}

pub async fn execute(stage: Stage, dataset: &Path, settings: &Settings) -> anyhow::Result<()> {
  let started = Utc::now();

  // Everything that can fail for the whole run is checked before the first
  // provider call.
  let mut store = CsvRecordStore::open(dataset, &settings.identifier_column)
    .with_context(|| format!("failed to load roster {}", dataset.display()))?;
  let mut sink = CsvAuditSink::new(&settings.audit_dir).with_context(|| {
    format!("failed to prepare audit directory {}", settings.audit_dir.display())
  })?;
  let providers = Providers::from_settings(settings)?;

  let mut driver = BatchDriver::new(&mut store, &mut sink, settings.batch());
  let mut totals = StageSummary::default();

  if stage.prepares() {
    match &providers.watchlist_a {
      Some(client) => {
        let summary = driver.prepare_cases(client).await.context("case preparation failed")?;
        totals += summary;
      }
      None => warn!("no [watchlist_a] settings, skipping case preparation"),
    }
  }

  if stage.screens() {
    let mut screened = false;
    if let Some(client) = &providers.watchlist_a {
      screen_with(&mut driver, client, &mut totals).await?;
      screened = true;
    }
    if let Some(client) = &providers.watchlist_b {
      screen_with(&mut driver, client, &mut totals).await?;
      screened = true;
    }
    if !screened {
      warn!("no [watchlist_a] or [watchlist_b] settings, skipping screening");
    }
  }

  if stage.enriches() {
    match &providers.report {
      Some(client) => {
        let summary =
          driver.enrich_contacts(client).await.context("contact enrichment failed")?;
        totals += summary;
      }
      None => warn!("no [report] settings, skipping contact enrichment"),
    }
  }

  let elapsed = Utc::now() - started;
  info!(
    started_at = %started.to_rfc3339(),
    elapsed_secs = elapsed.num_milliseconds() as f64 / 1000.0,
    processed = totals.processed,
    skipped = totals.skipped,
    resolved = totals.resolved,
    negative = totals.negative,
    deferred = totals.deferred,
    "run complete"
  );
  Ok(())
}

async fn screen_with<St, Sk, S>(
  driver: &mut BatchDriver<'_, St, Sk>,
  source: &S,
  totals: &mut StageSummary,
) -> anyhow::Result<()>
where
  St: RecordStore,
  Sk: AuditSink,
  S: ScreeningSource,
{
  let provider = source.provider();
  let summary = driver
    .screen(source)
    .await
    .with_context(|| format!("screening against {provider} failed"))?;
  *totals += summary;
  Ok(())
}
