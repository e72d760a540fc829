//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<haven_core::Error> for ApiError {
  fn from(err: haven_core::Error) -> Self {
    match err {
      haven_core::Error::NotFound { .. } => ApiError::NotFound(err.to_string()),
      haven_core::Error::Invalid { .. } => ApiError::BadRequest(err.to_string()),
      other => ApiError::Store(Box::new(other)),
    }
  }
}

impl From<haven_router::Error> for ApiError {
  fn from(err: haven_router::Error) -> Self { ApiError::Store(Box::new(err)) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error in handler");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
