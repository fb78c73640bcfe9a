//! Reduction of raw screening payloads to risk categories and flags.
//!
//! Classification is an OR over every sub-result in a payload: one positive
//! sub-result is enough to raise a category, and a successfully queried
//! payload with no positive sub-result yields a negative (not unset) flag.

use std::collections::BTreeSet;

use strum::{AsRefStr, Display};

use crate::{
  audit::{AuditRow, NOT_APPLICABLE, yes_no},
  identifier::Identifier,
  payload::{AmlReport, ScreeningPayload, WatchlistReport},
  provider::{Lookup, Provider},
  record::{Flag, Risk, RiskFlags},
};

// ─── Categories ──────────────────────────────────────────────────────────────

/// The fixed vocabulary of category tags a payload can raise.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Display,
  AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Category {
  Pep,
  PepHistorical,
  PepCandidate,
  PepRelated,
  Judicial,
  PersonRelated,
  SanctionsList,
  NegativeNews,
  Vip,
  Blacklist,
  /// State-owned entity; treated as politically exposed.
  StateOwned,
}

impl Category {
  pub fn is_pep_family(self) -> bool {
    matches!(
      self,
      Self::Pep
        | Self::PepHistorical
        | Self::PepCandidate
        | Self::PepRelated
        | Self::Vip
        | Self::StateOwned
        | Self::SanctionsList
    )
  }

  pub fn is_watchlist_family(self) -> bool {
    matches!(self, Self::Blacklist | Self::NegativeNews | Self::PersonRelated)
  }
}

// ─── Result ──────────────────────────────────────────────────────────────────

/// The normalized outcome of one (record, provider) query. Only its derived
/// booleans are written back to the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreeningResult {
  pub provider:       Provider,
  pub category_hits:  BTreeSet<Category>,
  /// Sum of the per-watchlist blacklist-hit counters.
  pub blacklist_hits: u64,
}

impl ScreeningResult {
  pub fn empty(provider: Provider) -> Self {
    Self { provider, category_hits: BTreeSet::new(), blacklist_hits: 0 }
  }

  fn raise(&mut self, category: Category, when: bool) {
    if when {
      self.category_hits.insert(category);
    }
  }

  pub fn is_pep(&self) -> bool {
    self.category_hits.iter().any(|c| c.is_pep_family())
  }

  pub fn is_watchlist_hit(&self) -> bool {
    self.blacklist_hits > 0 || self.category_hits.iter().any(|c| c.is_watchlist_family())
  }

  pub fn is_judicial(&self) -> bool { self.category_hits.contains(&Category::Judicial) }

  /// Write the derived flags for every risk this provider covers.
  pub fn apply_to(&self, flags: &mut RiskFlags) {
    for risk in self.provider.risks() {
      let value = match risk {
        Risk::Pep => self.is_pep(),
        Risk::Watchlist => self.is_watchlist_hit(),
        Risk::Judicial => self.is_judicial(),
      };
      flags.set(self.provider, *risk, Flag::from_bool(value));
    }
  }
}

/// A screening result with the audit rows that trace it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
  pub result: ScreeningResult,
  pub audit:  Vec<AuditRow>,
}

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Classify a successful provider response. `NotFound` is a confirmed
/// negative and produces a single all-"No" audit row.
pub fn classify(
  provider: Provider,
  identifier: &Identifier,
  lookup: Lookup<ScreeningPayload>,
) -> Classification {
  match lookup {
    Lookup::NotFound => negative(provider, identifier),
    Lookup::Found(ScreeningPayload::Watchlists(report)) => {
      classify_watchlists(provider, identifier, &report)
    }
    Lookup::Found(ScreeningPayload::Aml(report)) => classify_aml(provider, identifier, &report),
  }
}

fn negative(provider: Provider, identifier: &Identifier) -> Classification {
  Classification {
    result: ScreeningResult::empty(provider),
    audit:  vec![AuditRow::negative(provider, identifier)],
  }
}

// ─── Nested watchlist payloads ───────────────────────────────────────────────

/// Watchlist → hit → list-match hierarchy. PEP status comes from list-match
/// category/program strings; watchlist status from blacklist-hit counters.
fn classify_watchlists(
  provider: Provider,
  identifier: &Identifier,
  report: &WatchlistReport,
) -> Classification {
  if report.watchlists.is_empty() {
    return negative(provider, identifier);
  }

  let mut result = ScreeningResult::empty(provider);
  let mut audit = Vec::new();
  let text = |v: &Option<String>| v.clone().unwrap_or_default();

  for (n, watchlist) in report.watchlists.iter().enumerate() {
    result.blacklist_hits += watchlist.total_blacklist_hits;
    let listed = watchlist.total_blacklist_hits > 0;
    result.raise(Category::Blacklist, listed);

    let prefix = vec![
      identifier.to_string(),
      format!("Watchlist #{}", n + 1),
      text(&watchlist.watchlistable_name),
      watchlist.total_hits.to_string(),
      watchlist.total_blacklist_hits.to_string(),
      text(&watchlist.source),
      text(&watchlist.risk_level),
    ];
    let row = |hit: [String; 3], matched: [String; 3], pep: bool| {
      let mut cells = prefix.clone();
      cells.extend(hit);
      cells.extend(matched);
      cells.push(yes_no(pep).to_owned());
      cells.push(yes_no(listed).to_owned());
      AuditRow { provider, cells }
    };
    let na = || [NOT_APPLICABLE.to_owned(), NOT_APPLICABLE.to_owned(), NOT_APPLICABLE.to_owned()];

    if watchlist.hits.is_empty() {
      audit.push(row(na(), na(), false));
      continue;
    }

    for hit in &watchlist.hits {
      let hit_cells = [text(&hit.full_name), text(&hit.hit_type), text(&hit.risk_level)];

      if hit.list_matches.is_empty() {
        audit.push(row(hit_cells, na(), false));
        continue;
      }

      for matched in &hit.list_matches {
        let sanctions = matched.mentions_sanctions();
        let pep = matched.mentions_pep();
        result.raise(Category::Pep, pep);
        result.raise(Category::SanctionsList, sanctions);
        audit.push(row(
          hit_cells.clone(),
          [text(&matched.source), text(&matched.program), text(&matched.remarks)],
          pep || sanctions,
        ));
      }
    }
  }

  Classification { result, audit }
}

// ─── Flat registry payloads ──────────────────────────────────────────────────

/// One list per registry. Every non-empty list raises its category; the
/// audit row records which lists were non-empty.
fn classify_aml(
  provider: Provider,
  identifier: &Identifier,
  report: &AmlReport,
) -> Classification {
  let r = &report.results;
  let dj = &r.declarative;
  let mut result = ScreeningResult::empty(provider);

  result.raise(Category::Pep, !r.pep.is_empty() || !r.public_official.is_empty());
  result.raise(Category::PepHistorical, !r.pep_historical.is_empty());
  result.raise(Category::PepCandidate, !r.pep_candidate.is_empty());
  result.raise(
    Category::PepRelated,
    !r.pep_related.is_empty() || !r.pep_historical_related.is_empty(),
  );
  result.raise(Category::Vip, !r.vip.is_empty());
  result.raise(Category::Judicial, !r.judicial.is_empty());
  result.raise(Category::PersonRelated, !r.person.is_empty());
  result.raise(Category::Blacklist, !dj.watchlist.is_empty());
  result.raise(Category::NegativeNews, !dj.adverse_media.is_empty() || !r.negative.is_empty());
  result.raise(Category::StateOwned, !dj.state_owned.is_empty());

  let mut cells = vec![identifier.to_string()];
  cells.extend(
    [
      !r.pep.is_empty(),
      !r.pep_historical.is_empty(),
      !r.pep_candidate.is_empty(),
      !r.public_official.is_empty(),
      !r.judicial.is_empty(),
      !r.person.is_empty(),
      !dj.is_empty(),
      !r.negative.is_empty(),
      !r.vip.is_empty(),
      !r.pep_related.is_empty(),
      !r.pep_historical_related.is_empty(),
    ]
    .into_iter()
    .map(|present| yes_no(present).to_owned()),
  );

  Classification { result, audit: vec![AuditRow { provider, cells }] }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::audit::{NO, WATCHLIST_A_HEADER, WATCHLIST_B_HEADER, YES};

  fn id() -> Identifier { Identifier::parse("76431161-2").unwrap() }

  fn watchlists(value: serde_json::Value) -> Lookup<ScreeningPayload> {
    Lookup::Found(ScreeningPayload::Watchlists(serde_json::from_value(value).unwrap()))
  }

  fn aml(value: serde_json::Value) -> Lookup<ScreeningPayload> {
    Lookup::Found(ScreeningPayload::Aml(serde_json::from_value(value).unwrap()))
  }

  fn column(header: &[&str], name: &str) -> usize {
    header.iter().position(|h| *h == name).unwrap()
  }

  // ─── Watchlist A ──────────────────────────────────────────────────────────

  #[test]
  fn single_pep_match_without_blacklist_hits() {
    let c = classify(
      Provider::WatchlistA,
      &id(),
      watchlists(json!({ "watchlists": [{
        "total_hits": 1,
        "total_blacklist_hits": 0,
        "hits": [{ "full_name": "ACME SPA", "list_matches": [
          { "category": "PEP", "program": "Chile", "source": "local" }
        ]}]
      }]})),
    );

    assert!(c.result.is_pep());
    assert!(!c.result.is_watchlist_hit());
    assert_eq!(c.audit.len(), 1);

    let row = &c.audit[0].cells;
    assert_eq!(row.len(), WATCHLIST_A_HEADER.len());
    assert_eq!(row[column(WATCHLIST_A_HEADER, "PEP")], YES);
    assert_eq!(row[column(WATCHLIST_A_HEADER, "Watchlist Hit")], NO);
    assert_eq!(row[column(WATCHLIST_A_HEADER, "Name")], "");
    assert_eq!(row[column(WATCHLIST_A_HEADER, "Hit")], "ACME SPA");

    let mut flags = RiskFlags::default();
    c.result.apply_to(&mut flags);
    assert_eq!(flags.get(Provider::WatchlistA, Risk::Pep), Flag::Yes);
    assert_eq!(flags.get(Provider::WatchlistA, Risk::Watchlist), Flag::No);
    assert_eq!(flags.get(Provider::WatchlistA, Risk::Judicial), Flag::Unset);
  }

  #[test]
  fn sanctions_match_raises_pep() {
    let c = classify(
      Provider::WatchlistA,
      &id(),
      watchlists(json!({ "watchlists": [{
        "total_blacklist_hits": 0,
        "hits": [{ "full_name": "ACME SPA", "list_matches": [
          { "category": "Sanctions", "program": "OFAC SDN" }
        ]}]
      }]})),
    );

    assert!(c.result.category_hits.contains(&Category::SanctionsList));
    assert!(c.result.is_pep());

    let mut flags = RiskFlags::default();
    c.result.apply_to(&mut flags);
    assert_eq!(flags.get(Provider::WatchlistA, Risk::Pep), Flag::Yes);
    assert_eq!(c.audit[0].cells[column(WATCHLIST_A_HEADER, "PEP")], YES);
  }

  #[test]
  fn blacklist_counter_marks_watchlist_hit() {
    let c = classify(
      Provider::WatchlistA,
      &id(),
      watchlists(json!({ "watchlists": [
        { "total_blacklist_hits": 0, "hits": [] },
        { "total_blacklist_hits": 3, "hits": [] }
      ]})),
    );
    assert!(c.result.is_watchlist_hit());
    assert!(!c.result.is_pep());
    assert_eq!(c.result.blacklist_hits, 3);
    assert_eq!(c.audit.len(), 2);
  }

  #[test]
  fn one_audit_row_per_list_match_and_placeholder_rows() {
    let c = classify(
      Provider::WatchlistA,
      &id(),
      watchlists(json!({ "watchlists": [{
        "hits": [
          { "full_name": "A", "list_matches": [{ "category": "x" }, { "category": "y" }] },
          { "full_name": "B", "list_matches": [] }
        ]
      }]})),
    );
    assert_eq!(c.audit.len(), 3);
    let last = &c.audit[2].cells;
    assert_eq!(last[column(WATCHLIST_A_HEADER, "Hit")], "B");
    assert_eq!(last[column(WATCHLIST_A_HEADER, "Program")], NOT_APPLICABLE);
  }

  #[test]
  fn classification_does_not_depend_on_sub_result_order() {
    let pep = json!({ "total_blacklist_hits": 0, "hits": [
      { "list_matches": [{ "category": "Other", "program": "PEP registry" }] }
    ]});
    let clean = json!({ "total_blacklist_hits": 0, "hits": [
      { "list_matches": [{ "category": "Other", "program": "Other" }] }
    ]});

    let forward = classify(
      Provider::WatchlistA,
      &id(),
      watchlists(json!({ "watchlists": [pep.clone(), clean.clone()] })),
    );
    let backward = classify(
      Provider::WatchlistA,
      &id(),
      watchlists(json!({ "watchlists": [clean, pep] })),
    );
    assert!(forward.result.is_pep());
    assert_eq!(forward.result, backward.result);
  }

  #[test]
  fn empty_watchlists_are_a_confirmed_negative() {
    let c = classify(Provider::WatchlistA, &id(), watchlists(json!({ "watchlists": [] })));
    assert!(!c.result.is_pep());
    assert_eq!(c.audit, vec![AuditRow::negative(Provider::WatchlistA, &id())]);
  }

  // ─── Watchlist B ──────────────────────────────────────────────────────────

  #[test]
  fn not_found_yields_negative_flags_and_row() {
    let c = classify(Provider::WatchlistB, &id(), Lookup::NotFound);
    let mut flags = RiskFlags::default();
    c.result.apply_to(&mut flags);

    assert!(flags.is_screened(Provider::WatchlistB));
    assert_eq!(flags.get(Provider::WatchlistB, Risk::Pep), Flag::No);
    assert_eq!(flags.get(Provider::WatchlistB, Risk::Judicial), Flag::No);
    assert_eq!(c.audit.len(), 1);
  }

  #[test]
  fn registry_lists_map_to_flags() {
    let c = classify(
      Provider::WatchlistB,
      &id(),
      aml(json!({ "status": "OK", "results": {
        "pjudResults": [{ "id": "1", "delito": "fraude" }],
        "negativeResults": [{ "id": "2" }]
      }})),
    );
    assert!(c.result.is_judicial());
    assert!(c.result.is_watchlist_hit());
    assert!(!c.result.is_pep());

    let row = &c.audit[0].cells;
    assert_eq!(row.len(), WATCHLIST_B_HEADER.len());
    assert_eq!(row[column(WATCHLIST_B_HEADER, "Judicial")], YES);
    assert_eq!(row[column(WATCHLIST_B_HEADER, "Negative")], YES);
    assert_eq!(row[column(WATCHLIST_B_HEADER, "PEP")], NO);
  }

  #[test]
  fn pep_family_lists_raise_pep() {
    for key in [
      "pepResults",
      "pepHResults",
      "pepCResults",
      "fpResults",
      "vipResults",
      "pepRelacionados",
      "pepHRelacionados",
    ] {
      let c = classify(
        Provider::WatchlistB,
        &id(),
        aml(json!({ "results": { key: [{ "id": "1" }] } })),
      );
      assert!(c.result.is_pep(), "{key} should raise PEP");
      assert!(!c.result.is_watchlist_hit(), "{key} should not raise watchlist");
    }
  }

  #[test]
  fn declarative_sub_results_split_between_pep_and_watchlist() {
    let watch = classify(
      Provider::WatchlistB,
      &id(),
      aml(json!({ "results": { "djResults": { "ameResults": [{ "id": "1" }] } } })),
    );
    assert!(watch.result.is_watchlist_hit());
    assert!(!watch.result.is_pep());

    let state_owned = classify(
      Provider::WatchlistB,
      &id(),
      aml(json!({ "results": { "djResults": { "socResults": [{ "id": "1" }] } } })),
    );
    assert!(state_owned.result.is_pep());
    assert!(!state_owned.result.is_watchlist_hit());
    let row = &state_owned.audit[0].cells;
    assert_eq!(row[column(WATCHLIST_B_HEADER, "Declarative")], YES);
  }

  #[test]
  fn person_registry_is_a_watchlist_hit() {
    let c = classify(
      Provider::WatchlistB,
      &id(),
      aml(json!({ "results": { "personResults": [{ "id": "1" }] } })),
    );
    assert!(c.result.is_watchlist_hit());
    assert!(c.result.category_hits.contains(&Category::PersonRelated));
  }
}
