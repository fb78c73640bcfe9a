//! The `RecordStore` trait.
//!
//! Implemented by storage backends (e.g. `roster-store-csv`). The pipeline
//! mutates records in place and asks the store to persist after each block.

use crate::record::Record;

/// An ordered, in-memory snapshot of the roster with durable persistence.
///
/// There is a single writer; implementations need no locking, but
/// [`persist`](RecordStore::persist) must never leave a half-written snapshot
/// behind.
pub trait RecordStore {
  type Error: std::error::Error + Send + Sync + 'static;

  fn records(&self) -> &[Record];

  fn records_mut(&mut self) -> &mut [Record];

  /// Durably replace the stored snapshot with the current in-memory state.
  fn persist(&mut self) -> Result<(), Self::Error>;
}
