//! Error type for `roster-store-csv`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  /// The temp file was written but could not be moved over the dataset.
  #[error("failed to replace dataset: {0}")]
  Persist(#[from] tempfile::PersistError),

  #[error("dataset {path} has no {column:?} column")]
  MissingColumn { path: PathBuf, column: String },

  #[error("dataset {path} cannot be rewritten: {source}")]
  Unwritable { path: PathBuf, source: std::io::Error },

  #[error("dataset {0} has no header row")]
  EmptyDataset(PathBuf),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
