//! [`Settings`]: key-value upserts.

use super::{fetch, fetch_one, run};
use crate::{
  Result, SqlExecutor, Value,
  setting::{Setting, encode_bool, parse_bool},
};

pub struct Settings<'a, E> {
  exec: &'a E,
}

impl<'a, E: SqlExecutor> Settings<'a, E> {
  pub fn new(exec: &'a E) -> Self { Self { exec } }

  pub async fn get(&self, key: &str) -> Result<Option<String>> {
    let setting = fetch_one(
      self.exec,
      "SELECT key, value FROM settings WHERE key = ?1",
      &[Value::from(key)],
      Setting::from_row,
    )
    .await?;
    Ok(setting.map(|s| s.value))
  }

  /// Read a toggle. Missing or unparseable values fall back to `default`.
  pub async fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
    Ok(
      self
        .get(key)
        .await?
        .and_then(|v| parse_bool(&v))
        .unwrap_or(default),
    )
  }

  pub async fn all(&self) -> Result<Vec<Setting>> {
    fetch(
      self.exec,
      "SELECT key, value FROM settings ORDER BY key",
      &[],
      Setting::from_row,
    )
    .await
  }

  /// Insert or overwrite.
  pub async fn set(&self, key: &str, value: &str) -> Result<()> {
    run(
      self.exec,
      "INSERT INTO settings (key, value) VALUES (?1, ?2)
       ON CONFLICT(key) DO UPDATE SET value = excluded.value",
      &[Value::from(key), Value::from(value)],
    )
    .await?;
    Ok(())
  }

  pub async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
    self.set(key, encode_bool(value)).await
  }

  pub async fn remove(&self, key: &str) -> Result<bool> {
    let rows = run(
      self.exec,
      "DELETE FROM settings WHERE key = ?1 RETURNING key",
      &[Value::from(key)],
    )
    .await?;
    Ok(!rows.is_empty())
  }

  /// Replace the whole table with `settings`.
  pub async fn save_all(&self, settings: &[Setting]) -> Result<()> {
    run(self.exec, "DELETE FROM settings", &[]).await?;
    for s in settings {
      run(
        self.exec,
        "INSERT INTO settings (key, value) VALUES (?1, ?2)",
        &[Value::from(&s.key), Value::from(&s.value)],
      )
      .await?;
    }
    Ok(())
  }
}
