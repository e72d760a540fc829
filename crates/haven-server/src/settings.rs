//! Server configuration: an optional TOML file overlaid with `HAVEN_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use haven_store_d1::RemoteConfig;
use serde::Deserialize;

/// Runtime server configuration.
///
/// Nested keys come from the environment with `__` as the separator, e.g.
/// `HAVEN_REMOTE__API_TOKEN`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite fallback file; defaults to `<data dir>/haven/haven.db`.
  pub store_path: Option<PathBuf>,
  pub remote:     RemoteConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_owned(),
      port:       8080,
      store_path: None,
      remote:     RemoteConfig::default(),
    }
  }
}

impl ServerConfig {
  /// Load from `path` (which may be absent) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(
        config::Environment::with_prefix("HAVEN")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read config file")?;
    Self::from_settings(settings)
  }

  pub(crate) fn from_settings(settings: config::Config) -> anyhow::Result<Self> {
    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.remote.fill_from_env();
    Ok(cfg)
  }

  pub fn store_path(&self) -> PathBuf {
    match &self.store_path {
      Some(path) => expand_tilde(path),
      None => default_store_path(),
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

pub fn default_store_path() -> PathBuf {
  dirs::data_dir()
    .unwrap_or_else(|| PathBuf::from("."))
    .join("haven")
    .join("haven.db")
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}
