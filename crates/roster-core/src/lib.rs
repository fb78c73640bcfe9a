//! Core types and trait definitions for roster screening.
//!
//! This crate is deliberately free of HTTP and file-system dependencies. It
//! holds the record model, the typed provider payloads, the classification
//! rules that reduce those payloads to risk flags, and the capability traits
//! that storage backends and provider clients implement.

pub mod audit;
pub mod classify;
pub mod error;
pub mod identifier;
pub mod payload;
pub mod provider;
pub mod record;
pub mod store;

pub use error::{Error, ProviderError, Result};
