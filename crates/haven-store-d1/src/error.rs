//! Error type for `haven-store-d1`.
//!
//! Every variant means "the remote is not usable right now"; the router
//! absorbs them all and falls back to the local store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Connection failure, TLS failure or timeout.
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("remote returned {status}: {message}")]
  Status { status: u16, message: String },

  /// A 2xx response with `"success": false`.
  #[error("remote declined query: {0}")]
  Declined(String),

  #[error("undecodable response: {0}")]
  Decode(#[from] serde_json::Error),

  /// Valid JSON that is not a D1 result.
  #[error("unexpected response shape: {0}")]
  Shape(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
