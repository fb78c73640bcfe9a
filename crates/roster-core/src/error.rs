//! Error types for `roster-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("identifier is empty")]
  EmptyIdentifier,

  #[error("identifier {0:?} contains invalid characters")]
  InvalidIdentifier(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure of a single provider call, classified by what the caller may do
/// about it.
///
/// A 404 is never represented here: providers report it as
/// [`Lookup::NotFound`](crate::provider::Lookup::NotFound).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
  /// 5xx or network failure. The call may be retried; record state must not
  /// advance.
  #[error("transient provider failure (status {status:?}): {message}")]
  Transient { status: Option<u16>, message: String },

  /// Any other unexpected status. Fatal for this record in this run.
  #[error("unexpected provider response (status {status:?}): {message}")]
  Fatal { status: Option<u16>, message: String },

  /// The response arrived but could not be decoded.
  #[error("malformed provider payload: {0}")]
  Payload(String),
}

impl ProviderError {
  /// Classify a non-success, non-404 HTTP status.
  pub fn from_status(status: u16, body: impl Into<String>) -> Self {
    let message = body.into();
    if (500..600).contains(&status) {
      Self::Transient { status: Some(status), message }
    } else {
      Self::Fatal { status: Some(status), message }
    }
  }

  pub fn is_transient(&self) -> bool { matches!(self, Self::Transient { .. }) }

  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Transient { status, .. } | Self::Fatal { status, .. } => *status,
      Self::Payload(_) => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn server_errors_are_transient() {
    assert!(ProviderError::from_status(500, "boom").is_transient());
    assert!(ProviderError::from_status(503, "").is_transient());
  }

  #[test]
  fn other_statuses_are_fatal() {
    let err = ProviderError::from_status(401, "denied");
    assert!(!err.is_transient());
    assert_eq!(err.status(), Some(401));
    assert!(!ProviderError::from_status(422, "").is_transient());
  }
}
