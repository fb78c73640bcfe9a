//! The screening record: one row of the roster and its mutable status.
//!
//! Status values are three-valued internally ([`Flag`]); their display
//! strings only exist at the persistence boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{identifier::Identifier, provider::Provider};

// ─── Flag ────────────────────────────────────────────────────────────────────

/// A tri-state status value.
///
/// `Unset` means "not yet evaluated" and is distinct from `No` (evaluated,
/// negative).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
  #[default]
  Unset,
  Yes,
  No,
}

impl Flag {
  pub fn from_bool(value: bool) -> Self {
    if value { Self::Yes } else { Self::No }
  }

  pub fn is_set(self) -> bool { self != Self::Unset }

  pub fn is_yes(self) -> bool { self == Self::Yes }
}

// ─── Risk flags ──────────────────────────────────────────────────────────────

/// The risk categories a provider can vouch for.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Risk {
  Pep,
  Watchlist,
  Judicial,
}

/// One flag per (provider, risk) pair. Pairs that were never written read as
/// [`Flag::Unset`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskFlags(BTreeMap<(Provider, Risk), Flag>);

impl RiskFlags {
  pub fn get(&self, provider: Provider, risk: Risk) -> Flag {
    self.0.get(&(provider, risk)).copied().unwrap_or_default()
  }

  pub fn set(&mut self, provider: Provider, risk: Risk, flag: Flag) {
    self.0.insert((provider, risk), flag);
  }

  /// True when every risk `provider` reports on has been evaluated.
  pub fn is_screened(&self, provider: Provider) -> bool {
    provider
      .risks()
      .iter()
      .all(|risk| self.get(provider, *risk).is_set())
  }

  pub fn iter(&self) -> impl Iterator<Item = (Provider, Risk, Flag)> + '_ {
    self.0.iter().map(|((p, r), f)| (*p, *r, *f))
  }
}

// ─── Contact details ─────────────────────────────────────────────────────────

/// Contact data harvested from the credit-bureau report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
  pub processed: Flag,
  pub phones:    Vec<String>,
  pub email:     Option<String>,
  pub addresses: Vec<String>,
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One subject being screened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
  pub identifier:     Identifier,
  /// Provider-side case id; `None` until case preparation succeeds.
  pub case_id:        Option<String>,
  pub case_exists:    Flag,
  pub case_requested: Flag,
  pub flags:          RiskFlags,
  pub contact:        ContactDetails,
}

impl Record {
  /// A fresh record with the defaults used for newly created status columns.
  pub fn new(identifier: Identifier) -> Self {
    Self {
      identifier,
      case_id: None,
      case_exists: Flag::No,
      case_requested: Flag::No,
      flags: RiskFlags::default(),
      contact: ContactDetails::default(),
    }
  }

  pub fn has_case(&self) -> bool { self.case_id.is_some() }

  /// Store a case id unless one is already present. Returns whether the id
  /// was written.
  pub fn assign_case_id(&mut self, case_id: String) -> bool {
    if self.has_case() || case_id.trim().is_empty() {
      return false;
    }
    self.case_id = Some(case_id);
    true
  }
}
