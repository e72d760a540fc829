//! Applies a [`Schema`] to a live SQLite connection.
//!
//! Runs on the connection thread at open time and whenever the router
//! mirrors the schema after a remote failure. Every step is idempotent.

use haven_core::schema::{INTROSPECT_COLUMNS, Schema, SchemaChanges};

pub fn apply(conn: &rusqlite::Connection, schema: &Schema) -> rusqlite::Result<SchemaChanges> {
  let mut changes = SchemaChanges::default();

  for table in schema.tables {
    let existing = columns(conn, table.name)?;
    conn.execute(&table.create_sql(), [])?;
    if existing.is_empty() {
      changes.created.push(table.name.to_owned());
      continue;
    }

    for (column, alter) in table.missing_columns(&existing) {
      conn.execute(&alter, [])?;
      changes.added_columns.push(format!("{}.{}", table.name, column.name));
    }
  }

  // Legacy duplicates can block a unique index until the next self-healing
  // read cleans them up.
  for table in schema.tables {
    for index in table.indexes {
      if let Err(e) = conn.execute(index, []) {
        tracing::warn!(table = table.name, error = %e, "deferring index creation");
        changes.deferred_indexes.push((*index).to_owned());
      }
    }
  }

  Ok(changes)
}

pub fn columns(conn: &rusqlite::Connection, table: &str) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn.prepare(INTROSPECT_COLUMNS)?;
  stmt
    .query_map([table], |row| row.get(0))?
    .collect::<rusqlite::Result<Vec<String>>>()
}
