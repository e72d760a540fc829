//! [`Router`]: remote first, local on failure.

use std::{fmt, sync::Arc, time::Duration};

use haven_core::{Row, SqlExecutor, Value};
use haven_store_d1::{RemoteConfig, RemoteStore};
use haven_store_sqlite::LocalStore;
use serde::Serialize;

use crate::{Error, Result, StoreHealth};

/// Which store the next statement will reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveStore {
  Remote,
  Local,
}

impl fmt::Display for ActiveStore {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      ActiveStore::Remote => "remote",
      ActiveStore::Local => "local",
    })
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
  pub remote_configured: bool,
  pub remote_available:  bool,
  pub active_store:      ActiveStore,
}

// ─── Router ──────────────────────────────────────────────────────────────────

pub struct Router {
  pub(crate) local:          LocalStore,
  pub(crate) remote:         Option<RemoteStore>,
  pub(crate) health:         Arc<StoreHealth>,
  pub(crate) schema_timeout: Duration,
}

impl Router {
  pub fn new(
    local: LocalStore,
    remote: Option<RemoteStore>,
    health: Arc<StoreHealth>,
    schema_timeout: Duration,
  ) -> Self {
    Self { local, remote, health, schema_timeout }
  }

  /// A router with no remote; every statement runs locally.
  pub fn local_only(local: LocalStore) -> Self {
    Self::new(local, None, Arc::default(), Duration::ZERO)
  }

  /// Build a router from remote settings. An unconfigured remote (missing
  /// or placeholder credentials) yields a local-only router.
  pub fn from_config(local: LocalStore, config: &RemoteConfig) -> Result<Self> {
    if !config.is_configured() {
      tracing::info!("remote store not configured; using local store only");
      return Ok(Self::local_only(local));
    }

    let remote = RemoteStore::new(config).map_err(Error::RemoteSetup)?;
    let health = match config.reprobe_after() {
      Some(after) => StoreHealth::with_reprobe(after),
      None => StoreHealth::new(),
    };
    tracing::info!(endpoint = remote.endpoint(), "remote store configured");

    Ok(Self::new(local, Some(remote), Arc::new(health), config.schema_timeout()))
  }

  pub fn local(&self) -> &LocalStore { &self.local }

  pub fn remote(&self) -> Option<&RemoteStore> { self.remote.as_ref() }

  pub fn health(&self) -> &Arc<StoreHealth> { &self.health }

  pub fn active_store(&self) -> ActiveStore {
    match &self.remote {
      Some(_) if self.health.is_available() => ActiveStore::Remote,
      _ => ActiveStore::Local,
    }
  }

  pub fn health_report(&self) -> HealthReport {
    HealthReport {
      remote_configured: self.remote.is_some(),
      remote_available:  self.remote.is_some() && self.health.is_available(),
      active_store:      self.active_store(),
    }
  }

  /// Run one statement with the remote's default timeout.
  pub async fn execute(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
    let timeout = self.remote.as_ref().map(RemoteStore::timeout).unwrap_or_default();
    self.execute_with_timeout(sql, params, timeout).await
  }

  /// Run one statement, giving the remote at most `timeout` to answer.
  pub async fn execute_with_timeout(
    &self,
    sql: &str,
    params: &[Value],
    timeout: Duration,
  ) -> Result<Vec<Row>> {
    if let Some(remote) = &self.remote
      && self.health.should_try_remote()
    {
      match remote.query(sql, params, timeout).await {
        Ok(rows) => {
          if self.health.mark_available() {
            tracing::info!("remote store reachable again");
          }
          return Ok(rows);
        }
        Err(e) => self.demote(&e).await?,
      }
    }

    Ok(self.local.execute(sql, params).await?)
  }

  /// Mark the remote unavailable and make sure the local store can take
  /// over. Only the first failure mirrors the schema.
  pub(crate) async fn demote(&self, error: &haven_store_d1::Error) -> Result<()> {
    if self.health.mark_unavailable() {
      tracing::warn!(%error, "remote store failed; falling back to local store");
      self.local.sync_schema().await?;
    } else {
      tracing::debug!(%error, "remote probe failed");
    }
    Ok(())
  }
}

impl SqlExecutor for Router {
  type Error = Error;

  async fn execute(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
    Router::execute(self, sql, params).await
  }
}
