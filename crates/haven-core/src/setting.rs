//! Key-value settings used for feature toggles and site configuration.

use serde::{Deserialize, Serialize};

use crate::{Result, Row};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
  pub key:   String,
  pub value: String,
}

impl Setting {
  pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
    Self { key: key.into(), value: value.into() }
  }

  pub fn from_row(row: &Row) -> Result<Self> {
    Ok(Self { key: row.key("key")?, value: row.text("value")? })
  }
}

/// Interpret a stored setting as a toggle.
pub fn parse_bool(value: &str) -> Option<bool> {
  match value.trim().to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Some(true),
    "0" | "false" | "no" | "off" | "" => Some(false),
    _ => None,
  }
}

pub fn encode_bool(value: bool) -> &'static str {
  if value { "1" } else { "0" }
}
