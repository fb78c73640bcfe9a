//! The batch driver.
//!
//! Walks the store in fixed-size blocks, runs one stage over every record in
//! the block, forwards audit rows to the sink, persists, then pauses before
//! the next block. Records are processed strictly one at a time, so a
//! persisted snapshot always sits on a block boundary.

use std::{
  ops::Range,
  time::{Duration, Instant},
};

use roster_core::{
  audit::AuditSink,
  provider::{CaseRegistry, ReportSource, ScreeningSource},
  store::RecordStore,
};
use tracing::{info, instrument};

use crate::{
  Error, Result,
  enrich::{EnrichOutcome, enrich},
  prepare::{PrepareOutcome, prepare},
  retry::RetryPolicy,
  screen::{ScreenOutcome, screen},
};

/// Pacing for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
  /// Records per persisted block. Zero is treated as one.
  pub block_size:  usize,
  /// Sleep between consecutive blocks.
  pub block_pause: Duration,
  pub retry:       RetryPolicy,
}

impl Default for BatchSettings {
  fn default() -> Self {
    Self { block_size: 10, block_pause: Duration::ZERO, retry: RetryPolicy::default() }
  }
}

/// Counts for one stage over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageSummary {
  /// Records visited.
  pub processed: usize,
  /// Records skipped because the stage had nothing to do for them.
  pub skipped:   usize,
  /// Records whose state advanced.
  pub resolved:  usize,
  /// Definite negatives: rejected case requests, reports not on file.
  pub negative:  usize,
  /// Records left for a later run after a provider failure.
  pub deferred:  usize,
  pub blocks:    usize,
  pub elapsed:   Duration,
}

impl std::ops::AddAssign for StageSummary {
  fn add_assign(&mut self, other: Self) {
    self.processed += other.processed;
    self.skipped += other.skipped;
    self.resolved += other.resolved;
    self.negative += other.negative;
    self.deferred += other.deferred;
    self.blocks += other.blocks;
    self.elapsed += other.elapsed;
  }
}

pub struct BatchDriver<'a, St, Sk> {
  store:    &'a mut St,
  sink:     &'a mut Sk,
  settings: BatchSettings,
}

impl<'a, St: RecordStore, Sk: AuditSink> BatchDriver<'a, St, Sk> {
  pub fn new(store: &'a mut St, sink: &'a mut Sk, settings: BatchSettings) -> Self {
    Self { store, sink, settings }
  }

  // ── Stages ──

  /// Make sure every record has a case with `registry`.
  #[instrument(skip_all, name = "prepare")]
  pub async fn prepare_cases<P: CaseRegistry>(&mut self, registry: &P) -> Result<StageSummary> {
    let started = Instant::now();
    let mut summary = StageSummary::default();
    let blocks = self.blocks();
    let total = blocks.len();

    for (n, block) in blocks.into_iter().enumerate() {
      for index in block.clone() {
        let record = &mut self.store.records_mut()[index];
        let outcome = prepare(registry, &self.settings.retry, record).await;
        summary.processed += 1;
        match outcome {
          PrepareOutcome::AlreadyResolved => summary.skipped += 1,
          PrepareOutcome::Found | PrepareOutcome::Created => summary.resolved += 1,
          PrepareOutcome::Rejected => summary.negative += 1,
          PrepareOutcome::Deferred(_) => summary.deferred += 1,
        }
      }
      self.finish_block(n, total, &block).await?;
      summary.blocks += 1;
    }

    summary.elapsed = started.elapsed();
    log_summary("prepare", &summary);
    Ok(summary)
  }

  /// Screen every record against `source`, appending audit rows as flags
  /// are written.
  #[instrument(skip_all, name = "screen", fields(provider = %source.provider()))]
  pub async fn screen<S: ScreeningSource>(&mut self, source: &S) -> Result<StageSummary> {
    let started = Instant::now();
    let mut summary = StageSummary::default();
    let blocks = self.blocks();
    let total = blocks.len();

    for (n, block) in blocks.into_iter().enumerate() {
      for index in block.clone() {
        let record = &mut self.store.records_mut()[index];
        let outcome = screen(source, &self.settings.retry, record).await;
        summary.processed += 1;
        match outcome {
          ScreenOutcome::AlreadyScreened | ScreenOutcome::NoCase => summary.skipped += 1,
          ScreenOutcome::Screened(classification) => {
            summary.resolved += 1;
            for row in &classification.audit {
              self.sink.append(row).map_err(|e| Error::Audit(Box::new(e)))?;
            }
          }
          ScreenOutcome::Deferred(_) => summary.deferred += 1,
        }
      }
      self.finish_block(n, total, &block).await?;
      summary.blocks += 1;
    }

    summary.elapsed = started.elapsed();
    log_summary("screen", &summary);
    Ok(summary)
  }

  /// Fill contact fields from credit-bureau reports.
  #[instrument(skip_all, name = "enrich")]
  pub async fn enrich_contacts<R: ReportSource>(&mut self, source: &R) -> Result<StageSummary> {
    let started = Instant::now();
    let mut summary = StageSummary::default();
    let blocks = self.blocks();
    let total = blocks.len();

    for (n, block) in blocks.into_iter().enumerate() {
      for index in block.clone() {
        let record = &mut self.store.records_mut()[index];
        let outcome = enrich(source, &self.settings.retry, record).await;
        summary.processed += 1;
        match outcome {
          EnrichOutcome::AlreadyProcessed => summary.skipped += 1,
          EnrichOutcome::Enriched => summary.resolved += 1,
          EnrichOutcome::NotFound => summary.negative += 1,
          EnrichOutcome::Deferred(_) => summary.deferred += 1,
        }
      }
      self.finish_block(n, total, &block).await?;
      summary.blocks += 1;
    }

    summary.elapsed = started.elapsed();
    log_summary("enrich", &summary);
    Ok(summary)
  }

  // ── Blocks ──

  fn blocks(&self) -> Vec<Range<usize>> {
    let len = self.store.records().len();
    let size = self.settings.block_size.max(1);
    (0..len).step_by(size).map(|start| start..(start + size).min(len)).collect()
  }

  async fn finish_block(&mut self, n: usize, total: usize, block: &Range<usize>) -> Result<()> {
    self.store.persist().map_err(|e| Error::Persist(Box::new(e)))?;
    info!(
      block = n + 1,
      blocks = total,
      first = block.start,
      last = block.end - 1,
      "block persisted"
    );
    if n + 1 < total && !self.settings.block_pause.is_zero() {
      tokio::time::sleep(self.settings.block_pause).await;
    }
    Ok(())
  }
}

fn log_summary(stage: &str, summary: &StageSummary) {
  info!(
    stage,
    processed = summary.processed,
    skipped = summary.skipped,
    resolved = summary.resolved,
    negative = summary.negative,
    deferred = summary.deferred,
    elapsed_ms = summary.elapsed.as_millis() as u64,
    "stage complete"
  );
}
