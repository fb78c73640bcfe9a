//! Bounded, fixed-delay retry around provider calls.

use std::{future::Future, time::Duration};

use roster_core::{ProviderError, identifier::Identifier};
use serde::Deserialize;
use tracing::warn;

/// How often, and how far apart, a transient provider failure is retried.
///
/// Only [`ProviderError::Transient`] is retried. After `max_attempts` the
/// last error is returned and the record is left for a future run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
  pub max_attempts: u32,
  #[serde(rename = "delay_secs", deserialize_with = "secs")]
  pub delay:        Duration,
}

fn secs<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
  Ok(Duration::from_secs(u64::deserialize(d)?))
}

impl Default for RetryPolicy {
  fn default() -> Self { Self { max_attempts: 5, delay: Duration::from_secs(2) } }
}

impl RetryPolicy {
  /// A policy that calls exactly once.
  pub fn none() -> Self { Self { max_attempts: 1, delay: Duration::ZERO } }

  pub async fn run<T, F, Fut>(&self, identifier: &Identifier, mut call: F) -> Result<T, ProviderError>
  where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
  {
    let max_attempts = self.max_attempts.max(1);
    let mut attempt = 1;
    loop {
      match call().await {
        Err(err) if err.is_transient() && attempt < max_attempts => {
          warn!(
            identifier = %identifier,
            attempt,
            max_attempts,
            error = %err,
            "transient provider failure, retrying"
          );
          if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
          }
          attempt += 1;
        }
        other => return other,
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicU32, Ordering};

  use super::*;

  fn id() -> Identifier { Identifier::parse("76431161-2").unwrap() }

  fn policy(max_attempts: u32) -> RetryPolicy { RetryPolicy { max_attempts, delay: Duration::ZERO } }

  #[tokio::test]
  async fn transient_errors_are_retried_until_success() {
    let counter = AtomicU32::new(0);
    let calls = &counter;
    let result = policy(3)
      .run(&id(), move || async move {
        if calls.fetch_add(1, Ordering::SeqCst) < 2 {
          Err(ProviderError::from_status(503, "busy"))
        } else {
          Ok(7)
        }
      })
      .await;

    assert_eq!(result, Ok(7));
    assert_eq!(counter.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn gives_up_after_max_attempts() {
    let counter = AtomicU32::new(0);
    let calls = &counter;
    let result: Result<(), _> = policy(4)
      .run(&id(), move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::from_status(500, "down"))
      })
      .await;

    assert!(result.unwrap_err().is_transient());
    assert_eq!(counter.load(Ordering::SeqCst), 4);
  }

  #[tokio::test]
  async fn fatal_errors_are_not_retried() {
    let counter = AtomicU32::new(0);
    let calls = &counter;
    let result: Result<(), _> = policy(5)
      .run(&id(), move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::from_status(403, "forbidden"))
      })
      .await;

    assert!(result.is_err());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn zero_attempts_still_calls_once() {
    let counter = AtomicU32::new(0);
    let calls = &counter;
    let _ = policy(0)
      .run(&id(), move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, ProviderError>(())
      })
      .await;
    assert_eq!(counter.load(Ordering::SeqCst), 1);
  }
}
