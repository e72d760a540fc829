//! Error types for `haven-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A required column was absent from a row.
  #[error("missing column: {0}")]
  MissingColumn(&'static str),

  #[error("column {column} holds {found}, expected {expected}")]
  ColumnType {
    column:   &'static str,
    expected: &'static str,
    found:    &'static str,
  },

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A record failed validation before it was written.
  #[error("invalid {entity}: {reason}")]
  Invalid {
    entity: &'static str,
    reason: String,
  },

  #[error("{entity} not found: {id}")]
  NotFound {
    entity: &'static str,
    id:     String,
  },

  /// Any error raised by the underlying executor.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(err))
  }

  pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
    Error::NotFound { entity, id: id.to_string() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
