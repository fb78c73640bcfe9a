//! Contact enrichment from the credit-bureau report.

use roster_core::{
  ProviderError,
  provider::{Lookup, ReportSource},
  record::{ContactDetails, Flag, Record},
};
use tracing::{debug, info, warn};

use crate::retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichOutcome {
  AlreadyProcessed,
  /// Contact fields were filled from a report.
  Enriched,
  /// The bureau has no report; the record is marked processed with no data.
  NotFound,
  Deferred(ProviderError),
}

/// Fetch the report for one record and copy its contact data.
pub async fn enrich<R: ReportSource>(
  source: &R,
  retry: &RetryPolicy,
  record: &mut Record,
) -> EnrichOutcome {
  if record.contact.processed.is_yes() {
    debug!(identifier = %record.identifier, "contact data already processed, skipping");
    return EnrichOutcome::AlreadyProcessed;
  }

  let identifier = record.identifier.clone();
  let id = &identifier;
  let kind = id.kind();

  match retry.run(id, move || source.fetch_report(id, kind)).await {
    Ok(Lookup::Found(report)) => {
      record.contact = ContactDetails {
        processed: Flag::Yes,
        phones:    report.phones(),
        email:     report.email(),
        addresses: report.addresses(),
      };
      info!(
        identifier = %id,
        phones = record.contact.phones.len(),
        addresses = record.contact.addresses.len(),
        email = record.contact.email.is_some(),
        "enriched contact data"
      );
      EnrichOutcome::Enriched
    }
    Ok(Lookup::NotFound) => {
      record.contact.processed = Flag::Yes;
      info!(identifier = %id, "no report on file");
      EnrichOutcome::NotFound
    }
    Err(err) => {
      warn!(identifier = %id, error = %err, "report fetch failed, deferring record");
      EnrichOutcome::Deferred(err)
    }
  }
}
