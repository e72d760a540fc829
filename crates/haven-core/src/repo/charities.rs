//! [`Charities`]: reads, keyed upserts and self-healing loads.

use std::collections::HashSet;

use chrono::Utc;

use super::{CHARITIES_SEEDED, Settings, assignments, ensure_key_free, fetch_one, placeholders, run};
use crate::{
  Error, Result, SqlExecutor, Value,
  charity::{self, Charity, INSERT_COLUMNS},
  dedup::dedupe,
};

pub struct Charities<'a, E> {
  exec: &'a E,
}

impl<'a, E: SqlExecutor> Charities<'a, E> {
  pub fn new(exec: &'a E) -> Self { Self { exec } }

  /// Load every charity, deduplicated.
  ///
  /// Duplicates found here are written back immediately: dropped rows are
  /// deleted by id and survivors are rewritten with their merged fields.
  /// Rows whose stored `dedup_key` is stale are rewritten too.
  pub async fn list(&self) -> Result<Vec<Charity>> {
    let rows = run(self.exec, "SELECT * FROM charities ORDER BY id", &[]).await?;

    let mut stale = HashSet::new();
    let mut loaded = Vec::with_capacity(rows.len());
    for row in &rows {
      let c = Charity::from_row(row)?;
      if row.text("dedup_key")? != c.key_string()
        && let Some(id) = c.id
      {
        stale.insert(id);
      }
      loaded.push(c);
    }

    let out = dedupe(loaded);
    if !out.changed() && stale.is_empty() {
      return Ok(out.records);
    }

    for id in &out.dropped {
      run(self.exec, "DELETE FROM charities WHERE id = ?1", &[Value::Integer(*id)]).await?;
    }
    for c in &out.records {
      if let Some(id) = c.id
        && (out.absorbers.contains(&id) || stale.contains(&id))
      {
        self.write(id, c).await?;
      }
    }

    tracing::info!(
      loaded = rows.len(),
      kept = out.records.len(),
      rekeyed = stale.len(),
      "healed charities table"
    );
    Ok(out.records)
  }

  pub async fn get(&self, id: i64) -> Result<Option<Charity>> {
    fetch_one(
      self.exec,
      "SELECT * FROM charities WHERE id = ?1",
      &[Value::Integer(id)],
      Charity::from_row,
    )
    .await
  }

  /// Insert a charity, or merge it into the row with the same dedup key.
  ///
  /// The merge follows the dedup rules: capability flags are OR-ed and
  /// blank text fields on the stored row are filled from the new one.
  pub async fn upsert(&self, charity: Charity) -> Result<Charity> {
    let mut charity = charity.normalized();
    charity.validate()?;
    charity.created_at.get_or_insert_with(Utc::now);

    let sql = format!(
      "INSERT INTO charities ({INSERT_COLUMNS}) VALUES ({})
       ON CONFLICT(dedup_key) WHERE dedup_key <> '' DO UPDATE SET
         description       = {},
         logo_url          = {},
         phone             = {},
         email             = {},
         text_number       = {},
         has_helpline      = {},
         has_volunteers    = {},
         has_crisis_info   = {},
         has_text_support  = {},
         has_email_support = {},
         has_live_chat     = {}
       RETURNING *",
      placeholders(15),
      fill_blank("description"),
      fill_blank("logo_url"),
      fill_blank("phone"),
      fill_blank("email"),
      fill_blank("text_number"),
      or_flag("has_helpline"),
      or_flag("has_volunteers"),
      or_flag("has_crisis_info"),
      or_flag("has_text_support"),
      or_flag("has_email_support"),
      or_flag("has_live_chat"),
    );

    fetch_one(self.exec, &sql, &charity.insert_params(), Charity::from_row)
      .await?
      .ok_or_else(|| Error::not_found("charity", &charity.name))
  }

  /// Replace every field of the charity with primary key `id`.
  pub async fn update(&self, id: i64, charity: Charity) -> Result<Charity> {
    let existing = self
      .get(id)
      .await?
      .ok_or_else(|| Error::not_found("charity", id))?;

    let mut charity = charity.normalized();
    charity.validate()?;
    charity.id = Some(id);
    charity.created_at = charity.created_at.or(existing.created_at);

    ensure_key_free(self.exec, "charities", "charity", &charity.key_string(), id).await?;
    self.write(id, &charity).await
  }

  pub async fn delete(&self, id: i64) -> Result<bool> {
    let rows = run(
      self.exec,
      "DELETE FROM charities WHERE id = ?1 RETURNING id",
      &[Value::Integer(id)],
    )
    .await?;
    Ok(!rows.is_empty())
  }

  /// Deduplicate a batch, then upsert each survivor.
  pub async fn import(&self, batch: Vec<Charity>) -> Result<Vec<Charity>> {
    let batch = dedupe(batch.into_iter().map(Charity::normalized)).records;
    let mut stored = Vec::with_capacity(batch.len());
    for c in batch {
      stored.push(self.upsert(c).await?);
    }
    Ok(stored)
  }

  /// Insert the starter charities the first time the directory is empty.
  ///
  /// Returns how many were inserted. Runs at most once per store: an admin
  /// who deletes every charity does not get the defaults back.
  pub async fn seed_defaults(&self) -> Result<usize> {
    let settings = Settings::new(self.exec);
    if settings.get_bool(CHARITIES_SEEDED, false).await? {
      return Ok(0);
    }

    let existing = run(self.exec, "SELECT id FROM charities LIMIT 1", &[]).await?;
    let inserted = if existing.is_empty() {
      self.import(charity::defaults()).await?.len()
    } else {
      0
    };

    settings.set_bool(CHARITIES_SEEDED, true).await?;
    if inserted > 0 {
      tracing::info!(inserted, "seeded default charities");
    }
    Ok(inserted)
  }

  async fn write(&self, id: i64, charity: &Charity) -> Result<Charity> {
    let sql = format!(
      "UPDATE charities SET {} WHERE id = ?16 RETURNING *",
      assignments(INSERT_COLUMNS)
    );
    let mut params = charity.insert_params();
    params.push(Value::Integer(id));

    fetch_one(self.exec, &sql, &params, Charity::from_row)
      .await?
      .ok_or_else(|| Error::not_found("charity", id))
  }
}

/// Keep the stored value unless it is blank. Legacy rows may hold NULL.
fn fill_blank(column: &str) -> String {
  format!(
    "CASE WHEN coalesce(charities.{column}, '') = '' THEN excluded.{column} \
     ELSE charities.{column} END"
  )
}

fn or_flag(column: &str) -> String {
  format!("max(coalesce(charities.{column}, 0), excluded.{column})")
}
