//! Text encodings shared by every store.
//!
//! Timestamps are written as RFC 3339. Rows created by older writers may
//! carry SQLite's `CURRENT_TIMESTAMP` form instead, so both are accepted.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::{Error, Result};

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

/// Decode a stored timestamp. An empty cell means "unknown".
pub fn decode_dt(s: &str) -> Result<Option<DateTime<Utc>>> {
  let s = s.trim();
  if s.is_empty() {
    return Ok(None);
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(Some(dt.with_timezone(&Utc)));
  }
  NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|naive| Some(naive.and_utc()))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn encode_opt_dt(dt: Option<DateTime<Utc>>) -> String {
  dt.map(encode_dt).unwrap_or_default()
}

/// Join normalized key parts with the ASCII unit separator.
pub fn encode_key(parts: &[&str]) -> String { parts.join("\u{1f}") }

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn rfc3339_roundtrip() {
    let dt = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
    assert_eq!(decode_dt(&encode_dt(dt)).unwrap(), Some(dt));
  }

  #[test]
  fn sqlite_timestamp_accepted() {
    let dt = decode_dt("2024-03-01 12:30:00").unwrap().unwrap();
    assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap());
  }

  #[test]
  fn empty_is_unknown() {
    assert_eq!(decode_dt("  ").unwrap(), None);
  }

  #[test]
  fn garbage_is_an_error() {
    assert!(decode_dt("yesterday").is_err());
  }
}
