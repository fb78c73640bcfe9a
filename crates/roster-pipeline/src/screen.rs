//! Screening: fetch a provider payload for one record, classify it, and
//! write the resulting flags back.

use roster_core::{
  ProviderError,
  classify::{Classification, classify},
  provider::ScreeningSource,
  record::Record,
};
use tracing::{debug, info, warn};

use crate::retry::RetryPolicy;

/// What screening did to one record.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenOutcome {
  /// Every flag this provider owns was already set; no call was made.
  AlreadyScreened,
  /// The provider is case-keyed and the record has no case id yet.
  NoCase,
  /// Flags were written. The classification carries the audit rows.
  Screened(Classification),
  /// A provider failure left the flags unset.
  Deferred(ProviderError),
}

/// Screen a single record against `source`.
///
/// Flags move from unset to a definite value only on a successful response
/// (including a confirmed not-found). Transient, fatal and payload errors
/// leave the record untouched.
pub async fn screen<S: ScreeningSource>(
  source: &S,
  retry: &RetryPolicy,
  record: &mut Record,
) -> ScreenOutcome {
  let provider = source.provider();

  if record.flags.is_screened(provider) {
    debug!(identifier = %record.identifier, %provider, "already screened, skipping");
    return ScreenOutcome::AlreadyScreened;
  }
  if provider.requires_case() && !record.has_case() {
    debug!(identifier = %record.identifier, %provider, "no case id yet, skipping");
    return ScreenOutcome::NoCase;
  }

  let snapshot: &Record = record;
  let lookup = match retry.run(&snapshot.identifier, move || source.fetch(snapshot)).await {
    Ok(lookup) => lookup,
    Err(err) => {
      warn!(identifier = %record.identifier, %provider, error = %err, "screening failed, deferring record");
      return ScreenOutcome::Deferred(err);
    }
  };

  let classification = classify(provider, &record.identifier, lookup);
  classification.result.apply_to(&mut record.flags);
  info!(
    identifier = %record.identifier,
    %provider,
    pep = classification.result.is_pep(),
    watchlist = classification.result.is_watchlist_hit(),
    judicial = classification.result.is_judicial(),
    "screened"
  );
  ScreenOutcome::Screened(classification)
}

#[cfg(test)]
mod tests {
  use roster_core::{
    payload::{ScreeningPayload, WatchlistReport},
    provider::{Lookup, Provider},
    record::{Flag, Risk},
  };
  use serde_json::json;

  use super::*;
  use crate::testing::{FakeSource, record};

  fn pep_report() -> ScreeningPayload {
    let report: WatchlistReport = serde_json::from_value(json!({
      "watchlists": [{
        "total_hits": 1,
        "total_blacklist_hits": 0,
        "hits": [{
          "full_name": "Jane Doe",
          "list_matches": [{ "category": "PEP", "program": "PEP Chile" }]
        }]
      }]
    }))
    .unwrap();
    ScreeningPayload::Watchlists(report)
  }

  fn with_case(id: &str) -> Record {
    let mut r = record(id);
    r.case_id = Some("evl_1".into());
    r
  }

  #[tokio::test]
  async fn pep_match_sets_flags_and_one_audit_row() {
    let source = FakeSource::new(Provider::WatchlistA).respond(Ok(Lookup::Found(pep_report())));
    let mut r = with_case("17640242-3");

    let outcome = screen(&source, &RetryPolicy::none(), &mut r).await;

    let ScreenOutcome::Screened(classification) = outcome else {
      panic!("expected screened, got {outcome:?}");
    };
    assert_eq!(classification.audit.len(), 1);
    assert_eq!(r.flags.get(Provider::WatchlistA, Risk::Pep), Flag::Yes);
    assert_eq!(r.flags.get(Provider::WatchlistA, Risk::Watchlist), Flag::No);
  }

  #[tokio::test]
  async fn not_found_is_a_confirmed_negative() {
    let source = FakeSource::new(Provider::WatchlistB).respond(Ok(Lookup::NotFound));
    let mut r = record("17640242-3");

    let outcome = screen(&source, &RetryPolicy::none(), &mut r).await;

    let ScreenOutcome::Screened(classification) = outcome else {
      panic!("expected screened, got {outcome:?}");
    };
    assert_eq!(classification.audit.len(), 1);
    for risk in Provider::WatchlistB.risks() {
      assert_eq!(r.flags.get(Provider::WatchlistB, *risk), Flag::No);
    }
  }

  #[tokio::test]
  async fn server_error_leaves_flags_unset() {
    let source = FakeSource::new(Provider::WatchlistB)
      .respond(Err(ProviderError::from_status(500, "internal")));
    let mut r = record("17640242-3");
    let before = r.clone();

    let outcome = screen(&source, &RetryPolicy::none(), &mut r).await;

    assert!(matches!(outcome, ScreenOutcome::Deferred(_)));
    assert_eq!(r, before);
  }

  #[tokio::test]
  async fn malformed_payload_leaves_flags_unset() {
    let source = FakeSource::new(Provider::WatchlistB)
      .respond(Err(ProviderError::Payload("expected object".into())));
    let mut r = record("17640242-3");

    let outcome = screen(&source, &RetryPolicy::none(), &mut r).await;

    assert!(matches!(outcome, ScreenOutcome::Deferred(ProviderError::Payload(_))));
    assert!(!r.flags.is_screened(Provider::WatchlistB));
  }

  #[tokio::test]
  async fn screened_record_is_skipped_without_a_call() {
    let source = FakeSource::new(Provider::WatchlistA);
    let mut r = with_case("17640242-3");
    r.flags.set(Provider::WatchlistA, Risk::Pep, Flag::No);
    r.flags.set(Provider::WatchlistA, Risk::Watchlist, Flag::Yes);

    let outcome = screen(&source, &RetryPolicy::none(), &mut r).await;

    assert_eq!(outcome, ScreenOutcome::AlreadyScreened);
    assert_eq!(source.calls(), 0);
  }

  #[tokio::test]
  async fn partially_screened_record_is_fetched_again() {
    let source = FakeSource::new(Provider::WatchlistA).respond(Ok(Lookup::NotFound));
    let mut r = with_case("17640242-3");
    r.flags.set(Provider::WatchlistA, Risk::Pep, Flag::No);

    let outcome = screen(&source, &RetryPolicy::none(), &mut r).await;

    assert!(matches!(outcome, ScreenOutcome::Screened(_)));
    assert_eq!(source.calls(), 1);
    assert!(r.flags.is_screened(Provider::WatchlistA));
  }

  #[tokio::test]
  async fn case_keyed_provider_needs_a_case() {
    let source = FakeSource::new(Provider::WatchlistA);
    let mut r = record("17640242-3");

    let outcome = screen(&source, &RetryPolicy::none(), &mut r).await;

    assert_eq!(outcome, ScreenOutcome::NoCase);
    assert_eq!(source.calls(), 0);
  }
}
