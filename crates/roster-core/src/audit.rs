//! Audit rows and the append-only sink they are written to.
//!
//! Rows are flat tuples of display strings. They are written once and never
//! read back within a run.

use crate::{identifier::Identifier, provider::Provider};

pub const YES: &str = "Si";
pub const NO: &str = "No";
pub const NOT_APPLICABLE: &str = "N/A";

pub fn yes_no(value: bool) -> &'static str { if value { YES } else { NO } }

/// Columns of the watchlist-A audit file: one row per list match.
pub const WATCHLIST_A_HEADER: &[&str] = &[
  "RUT",
  "Watchlist",
  "Name",
  "Total Hits",
  "Total Blacklist Hits",
  "Source",
  "Risk Level",
  "Hit",
  "Hit Type",
  "Hit Risk Level",
  "Match Source",
  "Program",
  "Remarks",
  "PEP",
  "Watchlist Hit",
];

/// Columns of the watchlist-B audit file: one row per subject.
pub const WATCHLIST_B_HEADER: &[&str] = &[
  "RUT",
  "PEP",
  "PEP Historical",
  "PEP Candidate",
  "Public Official",
  "Judicial",
  "Person Registry",
  "Declarative",
  "Negative",
  "VIP",
  "PEP Related",
  "PEP Historical Related",
];

/// One audit line for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRow {
  pub provider: Provider,
  pub cells:    Vec<String>,
}

impl AuditRow {
  /// The header row of the audit file for `provider`. Providers that keep no
  /// audit trail have an empty header.
  pub fn header(provider: Provider) -> &'static [&'static str] {
    match provider {
      Provider::Report => &[],
      Provider::WatchlistA => WATCHLIST_A_HEADER,
      Provider::WatchlistB => WATCHLIST_B_HEADER,
    }
  }

  /// A row coded entirely "No", for a subject the provider has nothing on.
  pub fn negative(provider: Provider, identifier: &Identifier) -> Self {
    let width = Self::header(provider).len().max(1);
    let mut cells = Vec::with_capacity(width);
    cells.push(identifier.to_string());
    cells.resize(width, NO.to_owned());
    Self { provider, cells }
  }
}

/// Append-only destination for audit rows.
pub trait AuditSink {
  type Error: std::error::Error + Send + Sync + 'static;

  fn append(&mut self, row: &AuditRow) -> Result<(), Self::Error>;
}
