//! Schema creation and migration across both stores.

use haven_core::{
  Value,
  schema::{INTROSPECT_COLUMNS, SchemaChanges},
};
use haven_store_d1::RemoteStore;
use serde::Serialize;

use crate::{Result, Router};

/// Outcome of [`Router::ensure_schema`].
#[derive(Debug, Clone, Serialize)]
pub struct SchemaReport {
  pub local:  SchemaChanges,
  /// `None` when no remote is configured.
  pub remote: Option<SchemaChanges>,
}

impl SchemaReport {
  /// No store needed any work and nothing was skipped or deferred.
  pub fn is_settled(&self) -> bool {
    self.local.is_empty() && self.remote.as_ref().is_none_or(SchemaChanges::is_empty)
  }
}

impl Router {
  /// Create missing tables and add missing columns on both stores.
  ///
  /// Idempotent. Local failures are returned. Remote failures are logged:
  /// a failed `CREATE` demotes the remote and skips the rest of the remote
  /// pass, a failed introspection skips that table, and a failed index is
  /// deferred to the next run.
  ///
  /// The remote is migrated whatever its current health, so a demoted
  /// remote is still brought up to date.
  pub async fn ensure_schema(&self) -> Result<SchemaReport> {
    let local = self.local.sync_schema().await?;

    let remote = match &self.remote {
      Some(remote) => Some(self.migrate_remote(remote).await?),
      None => None,
    };

    let report = SchemaReport { local, remote };
    if report.is_settled() {
      tracing::debug!("schema up to date");
    } else {
      tracing::info!(?report, "schema pass finished");
    }
    Ok(report)
  }

  async fn migrate_remote(&self, remote: &RemoteStore) -> Result<SchemaChanges> {
    let tables = self.local.schema().tables;
    let timeout = self.schema_timeout;
    let mut changes = SchemaChanges::default();

    for table in tables {
      if let Err(e) = remote.query(&table.create_sql(), &[], timeout).await {
        tracing::warn!(table = table.name, error = %e, "remote schema creation failed");
        self.demote(&e).await?;
        changes.skipped_tables = tables.iter().map(|t| t.name.to_owned()).collect();
        return Ok(changes);
      }
    }

    for table in tables {
      let existing = match remote.query(INTROSPECT_COLUMNS, &[Value::from(table.name)], timeout).await
      {
        Ok(rows) => rows
          .iter()
          .filter_map(|r| r.get("name").and_then(Value::as_str).map(str::to_owned))
          .collect::<Vec<_>>(),
        Err(e) => {
          tracing::warn!(table = table.name, error = %e, "cannot read remote columns; skipping table");
          changes.skipped_tables.push(table.name.to_owned());
          continue;
        }
      };

      for (column, alter) in table.missing_columns(&existing) {
        match remote.query(&alter, &[], timeout).await {
          Ok(_) => changes.added_columns.push(format!("{}.{}", table.name, column.name)),
          Err(e) => tracing::warn!(
            table = table.name,
            column = column.name,
            error = %e,
            "remote column migration failed"
          ),
        }
      }
    }

    for table in tables {
      for index in table.indexes {
        if let Err(e) = remote.query(index, &[], timeout).await {
          tracing::warn!(table = table.name, error = %e, "deferring remote index creation");
          changes.deferred_indexes.push((*index).to_owned());
        }
      }
    }

    Ok(changes)
  }
}
