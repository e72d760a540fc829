//! [`Counters`]: per-slug completion and view tallies.

use super::{fetch, fetch_one, run};
use crate::{
  Error, Result, SqlExecutor, Value,
  counter::{Counter, CounterField},
};

pub struct Counters<'a, E> {
  exec: &'a E,
}

impl<'a, E: SqlExecutor> Counters<'a, E> {
  pub fn new(exec: &'a E) -> Self { Self { exec } }

  pub async fn all(&self) -> Result<Vec<Counter>> {
    fetch(
      self.exec,
      "SELECT slug, completions, views FROM counters ORDER BY slug",
      &[],
      Counter::from_row,
    )
    .await
  }

  pub async fn get(&self, slug: &str) -> Result<Option<Counter>> {
    fetch_one(
      self.exec,
      "SELECT slug, completions, views FROM counters WHERE slug = ?1",
      &[Value::from(slug)],
      Counter::from_row,
    )
    .await
  }

  /// Add one to `field` for `slug`, creating the row on first use.
  pub async fn bump(&self, slug: &str, field: CounterField) -> Result<Counter> {
    let slug = checked_slug(slug)?;
    let col = field.column();
    let sql = format!(
      "INSERT INTO counters (slug, {col}) VALUES (?1, 1)
       ON CONFLICT(slug) DO UPDATE SET {col} = counters.{col} + 1
       RETURNING slug, completions, views"
    );

    fetch_one(self.exec, &sql, &[Value::from(slug)], Counter::from_row)
      .await?
      .ok_or_else(|| Error::not_found("counter", slug))
  }

  /// Replace the whole table with `counters` (delete-all, then re-insert).
  pub async fn save_all(&self, counters: &[Counter]) -> Result<()> {
    run(self.exec, "DELETE FROM counters", &[]).await?;
    for c in counters {
      run(
        self.exec,
        "INSERT INTO counters (slug, completions, views) VALUES (?1, ?2, ?3)",
        &[
          Value::from(checked_slug(&c.slug)?),
          Value::Integer(c.completions),
          Value::Integer(c.views),
        ],
      )
      .await?;
    }
    Ok(())
  }
}

fn checked_slug(slug: &str) -> Result<&str> {
  let slug = slug.trim();
  if slug.is_empty() {
    return Err(Error::Invalid { entity: "counter", reason: "slug is required".into() });
  }
  Ok(slug)
}
