//! HTTP adapters for the external screening providers.
//!
//! Each client implements the `roster-core` capability traits it supports
//! and maps transport results onto the core outcome taxonomy: 404 is
//! [`Lookup::NotFound`](roster_core::provider::Lookup::NotFound), 5xx and
//! network failures are transient, any other status is fatal for the
//! record, and an undecodable body is a payload error.

mod http;
mod report;
mod watchlist_a;
mod watchlist_b;

pub mod error;

pub use error::{Error, Result};
pub use report::{ProductData, ReportAuth, ReportClient, ReportConfig, ReportProfile};
pub use watchlist_a::{WatchlistAClient, WatchlistAConfig};
pub use watchlist_b::{WatchlistBClient, WatchlistBConfig};
