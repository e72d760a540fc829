//! Typed repositories over any [`SqlExecutor`].
//!
//! Each repository borrows an executor and maps raw rows into entities.
//! Charities and books are written with a single keyed UPSERT; settings and
//! counters also support a full-table rewrite for small snapshots.

mod books;
mod charities;
mod contacts;
mod counters;
mod settings;

pub use books::Books;
pub use charities::Charities;
pub use contacts::Contacts;
pub use counters::Counters;
pub use settings::Settings;

use crate::{Error, Result, Row, SqlExecutor, Value};

/// Setting key recording that the default charities were inserted once.
pub const CHARITIES_SEEDED: &str = "charities_seeded";

async fn run<E: SqlExecutor>(exec: &E, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
  exec.execute(sql, params).await.map_err(Error::store)
}

async fn fetch<E, T>(
  exec: &E,
  sql: &str,
  params: &[Value],
  decode: fn(&Row) -> Result<T>,
) -> Result<Vec<T>>
where
  E: SqlExecutor,
{
  run(exec, sql, params).await?.iter().map(decode).collect()
}

async fn fetch_one<E, T>(
  exec: &E,
  sql: &str,
  params: &[Value],
  decode: fn(&Row) -> Result<T>,
) -> Result<Option<T>>
where
  E: SqlExecutor,
{
  Ok(fetch(exec, sql, params, decode).await?.into_iter().next())
}

/// Reject an edit that would give row `id` the dedup key of another row.
async fn ensure_key_free<E: SqlExecutor>(
  exec: &E,
  table: &str,
  entity: &'static str,
  key: &str,
  id: i64,
) -> Result<()> {
  if key.is_empty() {
    return Ok(());
  }

  let sql = format!("SELECT id FROM {table} WHERE dedup_key = ?1 AND id <> ?2 LIMIT 1");
  let rows = run(exec, &sql, &[Value::Text(key.to_owned()), Value::Integer(id)]).await?;
  match rows.first() {
    None => Ok(()),
    Some(row) => Err(Error::Invalid {
      entity,
      reason: format!("duplicates existing {entity} {}", row.id("id")?),
    }),
  }
}

/// `?1, ?2, ..., ?n`
fn placeholders(n: usize) -> String {
  (1..=n).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ")
}

/// `a = ?1, b = ?2, ...` for an insert column list.
fn assignments(columns: &str) -> String {
  columns
    .split(',')
    .map(str::trim)
    .enumerate()
    .map(|(i, c)| format!("{c} = ?{}", i + 1))
    .collect::<Vec<_>>()
    .join(", ")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn placeholder_list() {
    assert_eq!(placeholders(3), "?1, ?2, ?3");
  }

  #[test]
  fn assignment_list() {
    assert_eq!(assignments("a, b,\n c"), "a = ?1, b = ?2, c = ?3");
  }
}
