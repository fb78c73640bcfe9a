//! Conversions between record state and the display strings kept in the
//! dataset's cells.
//!
//! Flags are written as `S/I` (not yet evaluated), `Si` and `No`. Reading is
//! more lenient, since the dataset may have been edited by hand.

use roster_core::record::Flag;

pub const UNSET: &str = "S/I";
pub const YES: &str = "Si";
pub const NO: &str = "No";

// ─── Flag ────────────────────────────────────────────────────────────────────

pub fn encode_flag(flag: Flag) -> &'static str {
  match flag {
    Flag::Unset => UNSET,
    Flag::Yes => YES,
    Flag::No => NO,
  }
}

/// Blank and unrecognised cells read as [`Flag::Unset`], so the record is
/// evaluated again.
pub fn decode_flag(cell: &str) -> Flag {
  match cell.trim().to_lowercase().as_str() {
    "si" | "sí" | "s" | "yes" | "y" | "true" => Flag::Yes,
    "no" | "n" | "false" => Flag::No,
    _ => Flag::Unset,
  }
}

/// Case status columns default to `No` rather than unset.
pub fn decode_case_flag(cell: &str) -> Flag {
  match decode_flag(cell) {
    Flag::Unset => Flag::No,
    flag => flag,
  }
}

// ─── Case id ─────────────────────────────────────────────────────────────────

pub fn encode_case_id(case_id: Option<&str>) -> &str { case_id.unwrap_or(NO) }

pub fn decode_case_id(cell: &str) -> Option<String> {
  let cell = cell.trim();
  if cell.is_empty() || cell.eq_ignore_ascii_case(NO) || cell == UNSET {
    None
  } else {
    Some(cell.to_owned())
  }
}

// ─── Contact fields ──────────────────────────────────────────────────────────

/// Optional text; absent values are written as `S/I`.
pub fn encode_text(value: Option<&str>) -> &str { value.unwrap_or(UNSET) }

pub fn decode_text(cell: &str) -> Option<String> {
  let cell = cell.trim();
  (!cell.is_empty() && cell != UNSET).then(|| cell.to_owned())
}

/// Phones share one cell, each followed by `"; "`.
pub fn encode_phones(phones: &[String]) -> String {
  if phones.is_empty() {
    return UNSET.to_owned();
  }
  phones.iter().map(|p| format!("{p}; ")).collect()
}

pub fn decode_phones(cell: &str) -> Vec<String> {
  if cell.trim() == UNSET {
    return Vec::new();
  }
  cell
    .split(';')
    .map(str::trim)
    .filter(|p| !p.is_empty())
    .map(str::to_owned)
    .collect()
}
