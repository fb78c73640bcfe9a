//! [`CsvRecordStore`]: the roster dataset as a [`RecordStore`].

use std::{
  collections::HashSet,
  fs::{self, OpenOptions},
  io::{self, Write},
  path::{Path, PathBuf},
};

use roster_core::{
  identifier::Identifier,
  record::Record,
  store::RecordStore,
};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  encode::{
    decode_case_flag, decode_case_id, decode_flag, decode_phones, decode_text,
    encode_case_id, encode_flag, encode_phones, encode_text,
  },
  schema::{Column, address_column, status_columns},
};

/// One data row of the file, in original order.
#[derive(Debug)]
enum Row {
  /// Backs `records[index]`.
  Keyed { index: usize, cells: Vec<String> },
  /// Unusable identifier. Written back as read and never handed to a stage.
  Unkeyed(Vec<String>),
}

impl Row {
  fn cells_mut(&mut self) -> &mut Vec<String> {
    match self {
      Self::Keyed { cells, .. } | Self::Unkeyed(cells) => cells,
    }
  }
}

/// A roster loaded from a CSV file.
///
/// Columns the store does not own keep their values and their original
/// order. Missing status columns are appended after them.
#[derive(Debug)]
pub struct CsvRecordStore {
  path:    PathBuf,
  headers: Vec<String>,
  /// Raw cells per row, aligned with `headers`.
  rows:    Vec<Row>,
  records: Vec<Record>,
}

impl CsvRecordStore {
  /// Load `path`, keyed by `identifier_column`.
  ///
  /// Fails before touching any record if the file cannot be read or
  /// rewritten, or the identifier column is missing. Later duplicates of an
  /// identifier are dropped. Rows with a blank or malformed identifier are
  /// kept in the file but are not records.
  pub fn open(path: impl AsRef<Path>, identifier_column: &str) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let mut reader = csv::ReaderBuilder::new()
      .flexible(true)
      .from_path(&path)?;

    let mut headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    if let Some(first) = headers.first_mut() {
      *first = first.trim_start_matches('\u{feff}').to_owned();
    }
    if headers.iter().all(|h| h.trim().is_empty()) {
      return Err(Error::EmptyDataset(path));
    }
    let key = headers
      .iter()
      .position(|h| h.trim() == identifier_column)
      .ok_or_else(|| Error::MissingColumn {
        path:   path.clone(),
        column: identifier_column.to_owned(),
      })?;
    check_writable(&path)?;

    let width = headers.len();
    for column in status_columns() {
      if !headers.iter().any(|h| h == column) {
        headers.push(column.to_owned());
      }
    }
    let columns: Vec<Column> = headers.iter().map(|h| Column::classify(h)).collect();

    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
      let line = line + 2;
      let row = row?;
      let mut cells: Vec<String> = row.iter().map(str::to_owned).collect();
      if cells.len() > width {
        warn!(line, extra = cells.len() - width, "ignoring cells beyond the header");
        cells.truncate(width);
      }
      cells.resize(headers.len(), String::new());

      let raw = cells[key].as_str();
      let identifier = match Identifier::parse(raw) {
        Ok(identifier) => identifier,
        Err(err) => {
          warn!(line, value = raw, error = %err, "keeping row with unusable identifier unscreened");
          rows.push(Row::Unkeyed(cells));
          continue;
        }
      };
      if !seen.insert(identifier.clone()) {
        warn!(line, identifier = %identifier, "dropping duplicate identifier");
        continue;
      }

      let index = records.len();
      records.push(decode_record(identifier, &columns, &cells));
      rows.push(Row::Keyed { index, cells });
    }

    info!(path = %path.display(), records = records.len(), rows = rows.len(), "loaded roster");
    Ok(Self { path, headers, rows, records })
  }

  pub fn path(&self) -> &Path { &self.path }

  /// Write the current state to a temp file beside the dataset. The
  /// dataset itself is untouched until the returned file is persisted.
  pub(crate) fn write_snapshot(&mut self) -> Result<NamedTempFile> {
    self.grow_address_columns();
    let columns: Vec<Column> = self.headers.iter().map(|h| Column::classify(h)).collect();

    let mut tmp = NamedTempFile::new_in(parent_dir(&self.path))?;
    {
      let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
      writer.write_record(&self.headers)?;
      for row in &self.rows {
        match row {
          Row::Keyed { index, cells } => {
            writer.write_record(encode_row(&self.records[*index], &columns, cells))?;
          }
          Row::Unkeyed(cells) => writer.write_record(cells)?,
        }
      }
      writer.flush()?;
    }
    tmp.as_file_mut().flush()?;
    // Temp files are created owner-only; keep the dataset's own mode.
    let permissions = fs::metadata(&self.path)?.permissions();
    tmp.as_file().set_permissions(permissions)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
  }

  /// Make sure there is an `Address N` column for every address held by any
  /// record.
  fn grow_address_columns(&mut self) {
    let needed = self.records.iter().map(|r| r.contact.addresses.len()).max().unwrap_or(0);
    for n in 1..=needed {
      let name = address_column(n);
      if !self.headers.contains(&name) {
        self.headers.push(name);
        for row in &mut self.rows {
          row.cells_mut().push(String::new());
        }
      }
    }
  }
}

fn parent_dir(path: &Path) -> &Path {
  match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  }
}

/// Every persist replaces the dataset through a temp file in its directory,
/// so both must be writable before the first provider call.
fn check_writable(path: &Path) -> Result<()> {
  let unwritable = |source| Error::Unwritable { path: path.to_path_buf(), source };

  if fs::metadata(path)?.permissions().readonly() {
    return Err(unwritable(io::Error::new(
      io::ErrorKind::PermissionDenied,
      "dataset is read-only",
    )));
  }
  OpenOptions::new().append(true).open(path).map_err(unwritable)?;
  NamedTempFile::new_in(parent_dir(path)).map_err(unwritable)?;
  Ok(())
}

impl RecordStore for CsvRecordStore {
  type Error = Error;

  fn records(&self) -> &[Record] { &self.records }

  fn records_mut(&mut self) -> &mut [Record] { &mut self.records }

  fn persist(&mut self) -> Result<()> {
    let tmp = self.write_snapshot()?;
    tmp.persist(&self.path)?;
    debug!(path = %self.path.display(), records = self.records.len(), "persisted roster");
    Ok(())
  }
}

// ─── Row codec ───────────────────────────────────────────────────────────────

fn decode_record(identifier: Identifier, columns: &[Column], cells: &[String]) -> Record {
  let mut record = Record::new(identifier);
  let mut addresses: Vec<(usize, String)> = Vec::new();

  for (column, cell) in columns.iter().zip(cells) {
    match *column {
      Column::CaseId => record.case_id = decode_case_id(cell),
      Column::CaseExists => record.case_exists = decode_case_flag(cell),
      Column::CaseRequested => record.case_requested = decode_case_flag(cell),
      Column::Flag(provider, risk) => record.flags.set(provider, risk, decode_flag(cell)),
      Column::ContactProcessed => record.contact.processed = decode_flag(cell),
      Column::Phone => record.contact.phones = decode_phones(cell),
      Column::Email => record.contact.email = decode_text(cell),
      Column::Address(slot) => {
        if let Some(address) = decode_text(cell) {
          addresses.push((slot, address));
        }
      }
      Column::Passthrough => {}
    }
  }

  addresses.sort_by_key(|(slot, _)| *slot);
  record.contact.addresses = addresses.into_iter().map(|(_, a)| a).collect();
  record
}

fn encode_row(record: &Record, columns: &[Column], cells: &[String]) -> Vec<String> {
  let contact = &record.contact;
  columns
    .iter()
    .zip(cells)
    .map(|(column, cell)| match *column {
      Column::CaseId => encode_case_id(record.case_id.as_deref()).to_owned(),
      Column::CaseExists => encode_flag(record.case_exists).to_owned(),
      Column::CaseRequested => encode_flag(record.case_requested).to_owned(),
      Column::Flag(provider, risk) => encode_flag(record.flags.get(provider, risk)).to_owned(),
      Column::ContactProcessed => encode_flag(contact.processed).to_owned(),
      Column::Phone => encode_phones(&contact.phones),
      Column::Email => encode_text(contact.email.as_deref()).to_owned(),
      Column::Address(slot) => encode_text(contact.addresses.get(slot).map(String::as_str)).to_owned(),
      Column::Passthrough => cell.clone(),
    })
    .collect()
}
