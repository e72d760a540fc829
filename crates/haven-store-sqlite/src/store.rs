//! [`LocalStore`]: the SQLite implementation of [`SqlExecutor`].

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use haven_core::{
  Row, SqlExecutor, Value,
  schema::{DIRECTORY, Schema, SchemaChanges},
};
use tokio::sync::OnceCell;

use crate::{
  Result,
  encode::{encode_value, run_statement},
  schema,
};

/// How long a statement waits on a locked database file before failing.
/// Many short-lived requests share one file, so this is generous.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
  File(PathBuf),
  Memory,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The local fallback store, backed by a single SQLite file.
///
/// Nothing touches the disk until the first statement runs. Cloning is
/// cheap and clones share one connection.
#[derive(Clone)]
pub struct LocalStore {
  inner: Arc<Inner>,
}

struct Inner {
  location:     Location,
  schema:       Schema,
  busy_timeout: Duration,
  conn:         OnceCell<tokio_rusqlite::Connection>,
}

impl LocalStore {
  pub fn new(location: Location, schema: Schema, busy_timeout: Duration) -> Self {
    Self {
      inner: Arc::new(Inner {
        location,
        schema,
        busy_timeout,
        conn: OnceCell::new(),
      }),
    }
  }

  /// A store at `path` carrying the full directory schema.
  pub fn file(path: impl Into<PathBuf>) -> Self {
    Self::new(Location::File(path.into()), DIRECTORY, DEFAULT_BUSY_TIMEOUT)
  }

  /// An in-memory store carrying the full directory schema; useful for
  /// testing.
  pub fn in_memory() -> Self { Self::new(Location::Memory, DIRECTORY, DEFAULT_BUSY_TIMEOUT) }

  pub fn schema(&self) -> &Schema { &self.inner.schema }

  /// Whether the connection has been opened yet.
  pub fn is_open(&self) -> bool { self.inner.conn.initialized() }

  /// Open the store now instead of on first use.
  pub async fn open(&self) -> Result<()> {
    self.conn().await?;
    Ok(())
  }

  /// Re-apply the schema: create missing tables, add missing columns,
  /// retry deferred indexes. Idempotent.
  ///
  /// On a store that is not open yet this opens it and reports what the
  /// open itself changed.
  pub async fn sync_schema(&self) -> Result<SchemaChanges> {
    let mut opened = None;
    let conn = self
      .inner
      .conn
      .get_or_try_init(|| async {
        let (conn, changes) = self.connect().await?;
        opened = Some(changes);
        Ok::<_, crate::Error>(conn)
      })
      .await?;

    let changes = match opened {
      Some(changes) => changes,
      None => {
        let schema = self.inner.schema;
        conn.call(move |c| Ok(schema::apply(c, &schema)?)).await?
      }
    };
    if !changes.is_empty() {
      tracing::info!(?changes, "local schema updated");
    }
    Ok(changes)
  }

  /// Live column names of `table`, in declaration order.
  pub async fn table_columns(&self, table: &str) -> Result<Vec<String>> {
    let conn = self.conn().await?;
    let table = table.to_owned();
    Ok(conn.call(move |c| Ok(schema::columns(c, &table)?)).await?)
  }

  async fn conn(&self) -> Result<&tokio_rusqlite::Connection> {
    self
      .inner
      .conn
      .get_or_try_init(|| async { Ok::<_, crate::Error>(self.connect().await?.0) })
      .await
  }

  async fn connect(&self) -> Result<(tokio_rusqlite::Connection, SchemaChanges)> {
    let conn = match &self.inner.location {
      Location::File(path) => {
        create_parent_dir(path).await?;
        tokio_rusqlite::Connection::open(path.clone()).await?
      }
      Location::Memory => tokio_rusqlite::Connection::open_in_memory().await?,
    };

    let schema = self.inner.schema;
    let busy_timeout = self.inner.busy_timeout;
    let wal = matches!(self.inner.location, Location::File(_));

    let changes = conn
      .call(move |c| {
        c.busy_timeout(busy_timeout)?;
        if wal {
          // journal_mode reports the resulting mode as a row.
          c.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
        }
        Ok(schema::apply(c, &schema)?)
      })
      .await?;

    tracing::debug!(location = ?self.inner.location, ?changes, "opened local store");
    Ok((conn, changes))
  }
}

async fn create_parent_dir(path: &Path) -> Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    tokio::fs::create_dir_all(parent).await?;
  }
  Ok(())
}

// ─── SqlExecutor impl ────────────────────────────────────────────────────────

impl SqlExecutor for LocalStore {
  type Error = crate::Error;

  async fn execute(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
    let conn = self.conn().await?;
    let sql = sql.to_owned();
    let params: Vec<_> = params.iter().map(encode_value).collect();

    Ok(conn.call(move |c| Ok(run_statement(c, &sql, params)?)).await?)
  }
}
