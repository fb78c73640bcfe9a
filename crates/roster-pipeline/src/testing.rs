//! Scripted in-memory providers, store and sink for stage and driver tests.

use std::{
  collections::VecDeque,
  convert::Infallible,
  sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use roster_core::{
  ProviderError,
  audit::{AuditRow, AuditSink},
  identifier::{Identifier, SubjectKind},
  payload::{ContactReport, ScreeningPayload},
  provider::{
    CaseRef, CaseRegistry, Creation, Lookup, Provider, ReportSource, ScreeningSource,
  },
  record::Record,
  store::RecordStore,
};

type Reply<T> = Result<T, ProviderError>;

pub fn record(identifier: &str) -> Record { Record::new(Identifier::parse(identifier).unwrap()) }

fn next<T>(queue: &Mutex<VecDeque<Reply<T>>>, fallback: T) -> Reply<T> {
  queue.lock().unwrap().pop_front().unwrap_or(Ok(fallback))
}

// ─── Providers ───────────────────────────────────────────────────────────────

/// Replies are consumed in order; an exhausted script answers "not found"
/// for lookups and "rejected" for creations.
#[derive(Default)]
pub struct FakeRegistry {
  finds:        Mutex<VecDeque<Reply<Lookup<CaseRef>>>>,
  creates:      Mutex<VecDeque<Reply<Creation>>>,
  find_calls:   AtomicUsize,
  create_calls: AtomicUsize,
}

impl FakeRegistry {
  pub fn new() -> Self { Self::default() }

  pub fn find(self, reply: Reply<Lookup<CaseRef>>) -> Self {
    self.finds.lock().unwrap().push_back(reply);
    self
  }

  pub fn create(self, reply: Reply<Creation>) -> Self {
    self.creates.lock().unwrap().push_back(reply);
    self
  }

  pub fn find_calls(&self) -> usize { self.find_calls.load(Ordering::SeqCst) }

  pub fn create_calls(&self) -> usize { self.create_calls.load(Ordering::SeqCst) }
}

impl CaseRegistry for FakeRegistry {
  async fn find_case(&self, _identifier: &Identifier) -> Reply<Lookup<CaseRef>> {
    self.find_calls.fetch_add(1, Ordering::SeqCst);
    next(&self.finds, Lookup::NotFound)
  }

  async fn create_case(&self, _identifier: &Identifier) -> Reply<Creation> {
    self.create_calls.fetch_add(1, Ordering::SeqCst);
    next(&self.creates, Creation::Rejected)
  }
}

pub struct FakeSource {
  provider:  Provider,
  responses: Mutex<VecDeque<Reply<Lookup<ScreeningPayload>>>>,
  calls:     AtomicUsize,
}

impl FakeSource {
  pub fn new(provider: Provider) -> Self {
    Self { provider, responses: Mutex::default(), calls: AtomicUsize::new(0) }
  }

  pub fn respond(self, reply: Reply<Lookup<ScreeningPayload>>) -> Self {
    self.responses.lock().unwrap().push_back(reply);
    self
  }

  pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

impl ScreeningSource for FakeSource {
  fn provider(&self) -> Provider { self.provider }

  async fn fetch(&self, _record: &Record) -> Reply<Lookup<ScreeningPayload>> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    next(&self.responses, Lookup::NotFound)
  }
}

#[derive(Default)]
pub struct FakeReports {
  responses: Mutex<VecDeque<Reply<Lookup<ContactReport>>>>,
  kinds:     Mutex<Vec<SubjectKind>>,
}

impl FakeReports {
  pub fn new() -> Self { Self::default() }

  pub fn respond(self, reply: Reply<Lookup<ContactReport>>) -> Self {
    self.responses.lock().unwrap().push_back(reply);
    self
  }

  /// The subject kind of every request made so far.
  pub fn kinds(&self) -> Vec<SubjectKind> { self.kinds.lock().unwrap().clone() }
}

impl ReportSource for FakeReports {
  async fn fetch_report(
    &self,
    _identifier: &Identifier,
    kind: SubjectKind,
  ) -> Reply<Lookup<ContactReport>> {
    self.kinds.lock().unwrap().push(kind);
    next(&self.responses, Lookup::NotFound)
  }
}

// ─── Store and sink ──────────────────────────────────────────────────────────

/// Keeps every persisted snapshot so tests can inspect block boundaries.
#[derive(Default)]
pub struct MemoryStore {
  pub records:   Vec<Record>,
  pub snapshots: Vec<Vec<Record>>,
  pub fail:      bool,
}

impl MemoryStore {
  pub fn new(records: Vec<Record>) -> Self { Self { records, ..Self::default() } }
}

#[derive(Debug, thiserror::Error)]
#[error("disk full")]
pub struct DiskFull;

impl RecordStore for MemoryStore {
  type Error = DiskFull;

  fn records(&self) -> &[Record] { &self.records }

  fn records_mut(&mut self) -> &mut [Record] { &mut self.records }

  fn persist(&mut self) -> Result<(), DiskFull> {
    if self.fail {
      return Err(DiskFull);
    }
    self.snapshots.push(self.records.clone());
    Ok(())
  }
}

#[derive(Default)]
pub struct MemorySink {
  pub rows: Vec<AuditRow>,
}

impl AuditSink for MemorySink {
  type Error = Infallible;

  fn append(&mut self, row: &AuditRow) -> Result<(), Infallible> {
    self.rows.push(row.clone());
    Ok(())
  }
}
