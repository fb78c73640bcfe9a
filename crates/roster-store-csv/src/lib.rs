//! CSV backend for the roster record store and the audit output sink.
//!
//! The roster is read fully into memory, mutated in place by the pipeline,
//! and rewritten as a whole on every [`persist`](roster_core::store::RecordStore::persist)
//! through a temp file in the same directory followed by a rename.

mod encode;
mod schema;
mod sink;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use sink::CsvAuditSink;
pub use store::CsvRecordStore;
