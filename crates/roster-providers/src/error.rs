//! Error type for `roster-providers`.
//!
//! Covers client construction only. Failures of individual calls are
//! reported as [`roster_core::ProviderError`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Client(#[from] reqwest::Error),

  #[error("invalid base url {url:?}: {reason}")]
  BaseUrl { url: String, reason: &'static str },

  /// OAuth credentials were given without a token endpoint.
  #[error("report provider uses client credentials but has no token_url")]
  MissingTokenUrl,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
