//! Declarative schema shared by the local and remote stores.
//!
//! Tables are created with `CREATE TABLE IF NOT EXISTS` and then upgraded
//! column by column: any declared column missing from the live table is
//! added with `ALTER TABLE ... ADD COLUMN` and a default. Nothing is ever
//! dropped or renamed, so older data survives every upgrade.

use serde::Serialize;

/// Lists a table's live columns. Bind the table name as `?1`.
pub const INTROSPECT_COLUMNS: &str = "SELECT name FROM pragma_table_info(?1)";

/// What one schema pass changed on one store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaChanges {
  /// Tables that did not exist before this pass.
  pub created:          Vec<String>,
  /// `table.column` for every column added by migration.
  pub added_columns:    Vec<String>,
  /// Tables whose columns could not be read; left unmigrated.
  pub skipped_tables:   Vec<String>,
  /// Index statements that failed and will be retried next pass.
  pub deferred_indexes: Vec<String>,
}

impl SchemaChanges {
  pub fn is_empty(&self) -> bool {
    self.created.is_empty()
      && self.added_columns.is_empty()
      && self.skipped_tables.is_empty()
      && self.deferred_indexes.is_empty()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
  /// `INTEGER PRIMARY KEY AUTOINCREMENT`
  RowId,
  /// `TEXT PRIMARY KEY`
  Key,
  /// `TEXT NOT NULL DEFAULT ''`
  Text,
  /// `INTEGER NOT NULL DEFAULT 0`, used for counters and 0/1 flags.
  Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
  pub name: &'static str,
  pub kind: ColumnKind,
}

impl Column {
  pub const fn row_id(name: &'static str) -> Self { Self { name, kind: ColumnKind::RowId } }

  pub const fn key(name: &'static str) -> Self { Self { name, kind: ColumnKind::Key } }

  pub const fn text(name: &'static str) -> Self { Self { name, kind: ColumnKind::Text } }

  pub const fn integer(name: &'static str) -> Self { Self { name, kind: ColumnKind::Integer } }

  pub fn definition(&self) -> String {
    let decl = match self.kind {
      ColumnKind::RowId => "INTEGER PRIMARY KEY AUTOINCREMENT",
      ColumnKind::Key => "TEXT PRIMARY KEY NOT NULL",
      ColumnKind::Text => "TEXT NOT NULL DEFAULT ''",
      ColumnKind::Integer => "INTEGER NOT NULL DEFAULT 0",
    };
    format!("{} {decl}", self.name)
  }

  /// Primary keys cannot be added to an existing SQLite table.
  pub fn is_additive(&self) -> bool { matches!(self.kind, ColumnKind::Text | ColumnKind::Integer) }
}

#[derive(Debug, Clone, Copy)]
pub struct Table {
  pub name:    &'static str,
  pub columns: &'static [Column],
  /// `CREATE INDEX IF NOT EXISTS` statements, run after column migration.
  pub indexes: &'static [&'static str],
}

impl Table {
  pub fn create_sql(&self) -> String {
    let cols: Vec<String> = self.columns.iter().map(Column::definition).collect();
    format!("CREATE TABLE IF NOT EXISTS {} (\n  {}\n)", self.name, cols.join(",\n  "))
  }

  /// `ALTER TABLE` statements for every declared additive column that is
  /// absent from `existing`. Comparison is case-insensitive, like SQLite's.
  pub fn missing_columns(&self, existing: &[String]) -> Vec<(&'static Column, String)> {
    self
      .columns
      .iter()
      .filter(|c| c.is_additive())
      .filter(|c| !existing.iter().any(|e| e.eq_ignore_ascii_case(c.name)))
      .map(|c| (c, format!("ALTER TABLE {} ADD COLUMN {}", self.name, c.definition())))
      .collect()
  }

  pub fn column_names(&self) -> impl Iterator<Item = &'static str> {
    self.columns.iter().map(|c| c.name)
  }
}

/// An ordered set of tables.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
  pub tables: &'static [Table],
}

impl Schema {
  pub const fn new(tables: &'static [Table]) -> Self { Self { tables } }

  /// A schema with no tables, for stores whose layout is managed elsewhere.
  pub const fn empty() -> Self { Self { tables: &[] } }

  pub fn table(&self, name: &str) -> Option<&Table> {
    self.tables.iter().find(|t| t.name == name)
  }
}

// ─── The directory schema ────────────────────────────────────────────────────

const CHARITIES: Table = Table {
  name:    "charities",
  columns: &[
    Column::row_id("id"),
    Column::text("name"),
    Column::text("description"),
    Column::text("site_url"),
    Column::text("logo_url"),
    Column::text("phone"),
    Column::text("email"),
    Column::text("text_number"),
    Column::integer("has_helpline"),
    Column::integer("has_volunteers"),
    Column::integer("has_crisis_info"),
    Column::integer("has_text_support"),
    Column::integer("has_email_support"),
    Column::integer("has_live_chat"),
    Column::text("created_at"),
    Column::text("dedup_key"),
  ],
  indexes: &[
    "CREATE UNIQUE INDEX IF NOT EXISTS charities_dedup_key_idx \
     ON charities(dedup_key) WHERE dedup_key <> ''",
  ],
};

const BOOKS: Table = Table {
  name:    "books",
  columns: &[
    Column::row_id("id"),
    Column::text("title"),
    Column::text("author"),
    Column::text("description"),
    Column::text("affiliate_url"),
    Column::text("cover_url"),
    Column::integer("view_count"),
    Column::integer("scroll_count"),
    Column::text("created_at"),
    Column::text("dedup_key"),
  ],
  indexes: &[
    "CREATE UNIQUE INDEX IF NOT EXISTS books_dedup_key_idx \
     ON books(dedup_key) WHERE dedup_key <> ''",
  ],
};

const SETTINGS: Table = Table {
  name:    "settings",
  columns: &[Column::key("key"), Column::text("value")],
  indexes: &[],
};

const COUNTERS: Table = Table {
  name:    "counters",
  columns: &[
    Column::key("slug"),
    Column::integer("completions"),
    Column::integer("views"),
  ],
  indexes: &[],
};

const CONTACTS: Table = Table {
  name:    "contacts",
  columns: &[
    Column::row_id("id"),
    Column::text("name"),
    Column::text("email"),
    Column::text("message"),
    Column::text("created_at"),
  ],
  indexes: &[],
};

const MEDIA: Table = Table {
  name:    "media",
  columns: &[
    Column::row_id("id"),
    Column::text("filename"),
    Column::text("url"),
    Column::text("media_type"),
    Column::text("uploaded_at"),
  ],
  indexes: &[],
};

// `steps` holds a JSON array of strings.
const ACTIVITIES: Table = Table {
  name:    "activities",
  columns: &[
    Column::row_id("id"),
    Column::text("slug"),
    Column::text("title"),
    Column::text("description"),
    Column::text("steps"),
    Column::text("created_at"),
  ],
  indexes: &["CREATE INDEX IF NOT EXISTS activities_slug_idx ON activities(slug)"],
};

const DIRECTORY_TABLES: &[Table] =
  &[CHARITIES, BOOKS, SETTINGS, COUNTERS, CONTACTS, MEDIA, ACTIVITIES];

/// Every table the directory site persists.
pub const DIRECTORY: Schema = Schema::new(DIRECTORY_TABLES);
