//! Run-level errors. Record-level failures never surface here; they are
//! contained by the stages and reported through outcomes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to persist record store: {0}")]
  Persist(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("failed to append audit row: {0}")]
  Audit(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
