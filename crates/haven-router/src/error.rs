//! Error type for `haven-router`.
//!
//! Remote failures never appear here: the router logs them and falls back.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The local store failed. There is nothing left to fall back to.
  #[error("local store error: {0}")]
  Local(#[from] haven_store_sqlite::Error),

  /// The remote HTTP client could not be constructed.
  #[error("remote client setup failed: {0}")]
  RemoteSetup(#[source] haven_store_d1::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
