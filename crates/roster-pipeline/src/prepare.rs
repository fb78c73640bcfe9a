//! Case preparation: make sure a case-keyed provider has a case for the
//! subject, and record its id.

use roster_core::{
  ProviderError,
  provider::{CaseRegistry, Creation, Lookup},
  record::{Flag, Record},
};
use tracing::{debug, info, warn};

use crate::retry::RetryPolicy;

/// What case preparation did to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareOutcome {
  /// The record already carried a case id; no provider call was made.
  AlreadyResolved,
  /// An existing case was found.
  Found,
  /// A new case was created and its id stored.
  Created,
  /// The provider refused to create a case, or accepted without an id.
  Rejected,
  /// A provider failure left the record untouched.
  Deferred(ProviderError),
}

impl PrepareOutcome {
  pub fn is_resolved(&self) -> bool { matches!(self, Self::Found | Self::Created) }
}

/// Run case preparation for a single record.
///
/// A record that already has a case id is never sent to the provider, and
/// an existing id is never replaced. On any provider failure the record is
/// left exactly as it was so a later run can pick it up.
pub async fn prepare<P: CaseRegistry>(
  registry: &P,
  retry: &RetryPolicy,
  record: &mut Record,
) -> PrepareOutcome {
  if record.has_case() {
    debug!(identifier = %record.identifier, "case already prepared, skipping");
    return PrepareOutcome::AlreadyResolved;
  }

  let identifier = record.identifier.clone();
  let id = &identifier;

  let existing = match retry.run(id, move || registry.find_case(id)).await {
    Ok(lookup) => lookup,
    Err(err) => {
      warn!(identifier = %id, error = %err, "case lookup failed, deferring record");
      return PrepareOutcome::Deferred(err);
    }
  };

  if let Lookup::Found(case) = existing {
    record.case_exists = Flag::Yes;
    if case.id.is_some_and(|case_id| record.assign_case_id(case_id)) {
      info!(identifier = %id, case_id = ?record.case_id, "found existing case");
    } else {
      warn!(identifier = %id, "provider reports an existing case without an id");
    }
    return PrepareOutcome::Found;
  }

  record.case_exists = Flag::No;
  match retry.run(id, move || registry.create_case(id)).await {
    Ok(Creation::Created(case_id)) => {
      if case_id.is_some_and(|case_id| record.assign_case_id(case_id)) {
        record.case_requested = Flag::Yes;
        info!(identifier = %id, case_id = ?record.case_id, "created case");
        PrepareOutcome::Created
      } else {
        record.case_requested = Flag::No;
        warn!(identifier = %id, "case accepted without a usable id, treating as rejected");
        PrepareOutcome::Rejected
      }
    }
    Ok(Creation::Rejected) => {
      record.case_requested = Flag::No;
      warn!(identifier = %id, "provider rejected case creation");
      PrepareOutcome::Rejected
    }
    Err(err) => {
      warn!(identifier = %id, error = %err, "case creation failed, deferring record");
      PrepareOutcome::Deferred(err)
    }
  }
}
