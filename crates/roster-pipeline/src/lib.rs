//! Record-state orchestration for roster screening.
//!
//! Three per-record stages ([`prepare`], [`screen`], [`enrich`]) and the
//! [`BatchDriver`] that walks a [`RecordStore`](roster_core::store::RecordStore)
//! block by block, persisting after each one. Everything here is generic
//! over the capability traits in `roster-core`; the driver owns no provider
//! and no storage of its own.

pub mod driver;
pub mod enrich;
pub mod error;
pub mod prepare;
pub mod retry;
pub mod screen;

pub use driver::{BatchDriver, BatchSettings, StageSummary};
pub use enrich::{EnrichOutcome, enrich};
pub use error::{Error, Result};
pub use prepare::{PrepareOutcome, prepare};
pub use retry::RetryPolicy;
pub use screen::{ScreenOutcome, screen};

#[cfg(test)]
mod testing;
