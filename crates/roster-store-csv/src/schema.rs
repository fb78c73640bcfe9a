//! Column names for the screening state kept alongside the roster's own
//! columns.

use roster_core::{provider::Provider, record::Risk};

pub const CASE_ID: &str = "Case Id";
pub const CASE_EXISTS: &str = "Case Exists";
pub const CASE_REQUESTED: &str = "Case Requested";

pub const CONTACT_PROCESSED: &str = "Contact Processed";
pub const PHONE: &str = "Phone";
pub const EMAIL: &str = "Email";

const ADDRESS_PREFIX: &str = "Address ";

/// Every (provider, risk) flag that has a column, in column order.
pub const FLAG_COLUMNS: &[(Provider, Risk, &str)] = &[
  (Provider::WatchlistA, Risk::Pep, "PEP"),
  (Provider::WatchlistA, Risk::Watchlist, "Watchlist"),
  (Provider::WatchlistB, Risk::Pep, "PEP B"),
  (Provider::WatchlistB, Risk::Watchlist, "Watchlist B"),
  (Provider::WatchlistB, Risk::Judicial, "Judicial B"),
];

/// Fixed status columns appended to a dataset that lacks them, in order.
/// Address columns are not listed; they grow with the data.
pub fn status_columns() -> impl Iterator<Item = &'static str> {
  [CASE_ID, CASE_EXISTS, CASE_REQUESTED]
    .into_iter()
    .chain(FLAG_COLUMNS.iter().map(|(_, _, name)| *name))
    .chain([CONTACT_PROCESSED, PHONE, EMAIL])
}

/// `Address 1`, `Address 2`, ...
pub fn address_column(n: usize) -> String { format!("{ADDRESS_PREFIX}{n}") }

/// The 1-based position of an `Address N` column.
pub fn address_index(name: &str) -> Option<usize> {
  name.strip_prefix(ADDRESS_PREFIX)?.trim().parse().ok().filter(|n| *n > 0)
}

/// A column whose cells the store owns and rewrites from record state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
  CaseId,
  CaseExists,
  CaseRequested,
  Flag(Provider, Risk),
  ContactProcessed,
  Phone,
  Email,
  /// Zero-based address slot.
  Address(usize),
  /// Any other column, copied through untouched.
  Passthrough,
}

impl Column {
  pub fn classify(name: &str) -> Self {
    match name {
      CASE_ID => Self::CaseId,
      CASE_EXISTS => Self::CaseExists,
      CASE_REQUESTED => Self::CaseRequested,
      CONTACT_PROCESSED => Self::ContactProcessed,
      PHONE => Self::Phone,
      EMAIL => Self::Email,
      other => {
        if let Some((provider, risk, _)) = FLAG_COLUMNS.iter().find(|(_, _, n)| *n == other) {
          Self::Flag(*provider, *risk)
        } else if let Some(n) = address_index(other) {
          Self::Address(n - 1)
        } else {
          Self::Passthrough
        }
      }
    }
  }
}
