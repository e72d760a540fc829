//! Remote credentials and timeouts.

use std::{fmt, time::Duration};

use serde::Deserialize;

pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Connection settings for the D1 query API.
///
/// Deserialised from the `[remote]` table of the server config. The remote
/// counts as configured only when all three identifiers are real values.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
  pub account_id:          String,
  pub api_token:           String,
  pub database_id:         String,
  pub api_base:            String,
  /// Timeout for ordinary statements.
  pub timeout_secs:        u64,
  /// Timeout for schema creation and migration statements.
  pub schema_timeout_secs: u64,
  /// Retry a demoted remote after this many seconds (doubling per failure).
  /// `None` keeps the remote demoted until restart.
  pub reprobe_secs:        Option<u64>,
}

impl Default for RemoteConfig {
  fn default() -> Self {
    Self {
      account_id:          String::new(),
      api_token:           String::new(),
      database_id:         String::new(),
      api_base:            DEFAULT_API_BASE.to_owned(),
      timeout_secs:        10,
      schema_timeout_secs: 20,
      reprobe_secs:        None,
    }
  }
}

impl RemoteConfig {
  pub fn new(
    account_id: impl Into<String>,
    api_token: impl Into<String>,
    database_id: impl Into<String>,
  ) -> Self {
    Self {
      account_id: account_id.into(),
      api_token: api_token.into(),
      database_id: database_id.into(),
      ..Self::default()
    }
  }

  /// All three credentials present and none of them a placeholder.
  pub fn is_configured(&self) -> bool {
    [&self.account_id, &self.api_token, &self.database_id]
      .iter()
      .all(|v| !is_placeholder(v))
  }

  pub fn endpoint(&self) -> String {
    format!(
      "{}/accounts/{}/d1/database/{}/query",
      self.api_base.trim_end_matches('/'),
      self.account_id.trim(),
      self.database_id.trim()
    )
  }

  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }

  pub fn schema_timeout(&self) -> Duration { Duration::from_secs(self.schema_timeout_secs) }

  pub fn reprobe_after(&self) -> Option<Duration> { self.reprobe_secs.map(Duration::from_secs) }

  /// Fill blank credentials from the `CF_ACCOUNT_ID`, `CF_API_TOKEN` and
  /// `CF_D1_DATABASE_ID` environment variables.
  pub fn fill_from_env(&mut self) {
    fill(&mut self.account_id, "CF_ACCOUNT_ID");
    fill(&mut self.api_token, "CF_API_TOKEN");
    fill(&mut self.database_id, "CF_D1_DATABASE_ID");
  }
}

fn fill(field: &mut String, var: &str) {
  if field.trim().is_empty()
    && let Ok(value) = std::env::var(var)
  {
    *field = value;
  }
}

// The token never reaches logs.
impl fmt::Debug for RemoteConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RemoteConfig")
      .field("account_id", &self.account_id)
      .field("api_token", &if self.api_token.is_empty() { "" } else { "<redacted>" })
      .field("database_id", &self.database_id)
      .field("api_base", &self.api_base)
      .field("timeout_secs", &self.timeout_secs)
      .field("schema_timeout_secs", &self.schema_timeout_secs)
      .field("reprobe_secs", &self.reprobe_secs)
      .finish()
  }
}

const PLACEHOLDERS: &[&str] = &[
  "your_account_id",
  "your-account-id",
  "your_api_token",
  "your-api-token",
  "your_database_id",
  "your-database-id",
  "changeme",
  "placeholder",
  "xxx",
];

/// True for blank values and the stand-ins shipped in sample `.env` files.
pub fn is_placeholder(value: &str) -> bool {
  let v = value.trim().to_ascii_lowercase();
  v.is_empty()
    || PLACEHOLDERS.contains(&v.as_str())
    || v.starts_with("your")
    || (v.starts_with('<') && v.ends_with('>'))
}
