//! [`CsvAuditSink`]: one append-only CSV file per provider.

use std::{
  collections::{HashMap, hash_map::Entry},
  fs::{self, File, OpenOptions},
  path::{Path, PathBuf},
};

use roster_core::{
  audit::{AuditRow, AuditSink},
  provider::Provider,
};
use tracing::debug;

use crate::{Error, Result};

/// Writes audit rows to `<dir>/<provider>_audit.csv`.
///
/// Files are opened lazily in append mode. The header is written only when
/// the file is new or empty, so rows from earlier runs are kept. Each row is
/// flushed as soon as it is written.
#[derive(Debug)]
pub struct CsvAuditSink {
  dir:     PathBuf,
  writers: HashMap<Provider, csv::Writer<File>>,
}

impl CsvAuditSink {
  /// Create the sink, creating `dir` if needed.
  pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref().to_path_buf();
    fs::create_dir_all(&dir)?;
    Ok(Self { dir, writers: HashMap::new() })
  }

  pub fn path_for(&self, provider: Provider) -> PathBuf {
    self.dir.join(format!("{provider}_audit.csv"))
  }

  fn writer(&mut self, provider: Provider) -> Result<&mut csv::Writer<File>> {
    let path = self.path_for(provider);
    match self.writers.entry(provider) {
      Entry::Occupied(entry) => Ok(entry.into_mut()),
      Entry::Vacant(entry) => Ok(entry.insert(open_writer(&path, provider)?)),
    }
  }
}

fn open_writer(path: &Path, provider: Provider) -> Result<csv::Writer<File>> {
  let file = OpenOptions::new().create(true).append(true).open(path)?;
  let fresh = file.metadata()?.len() == 0;

  let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);
  let header = AuditRow::header(provider);
  if fresh && !header.is_empty() {
    writer.write_record(header)?;
    writer.flush()?;
    debug!(path = %path.display(), "started audit file");
  }
  Ok(writer)
}

impl AuditSink for CsvAuditSink {
  type Error = Error;

  fn append(&mut self, row: &AuditRow) -> Result<()> {
    let writer = self.writer(row.provider)?;
    writer.write_record(&row.cells)?;
    writer.flush()?;
    Ok(())
  }
}
