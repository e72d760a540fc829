//! Handlers for `/counters` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/counters` | All counters |
//! | `POST` | `/counters/{slug}/completions` | Count an activity completion |
//! | `POST` | `/counters/{slug}/views` | Count a page view |

use axum::{
  Json,
  extract::{Path, State},
};
use haven_core::{
  counter::{Counter, CounterField},
  repo::Counters,
};

use crate::{Store, error::ApiError};

/// `GET /counters`
pub async fn list(State(store): State<Store>) -> Result<Json<Vec<Counter>>, ApiError> {
  Ok(Json(Counters::new(store.as_ref()).all().await?))
}

/// `POST /counters/{slug}/{field}`
pub async fn bump(
  State(store): State<Store>,
  Path((slug, field)): Path<(String, CounterField)>,
) -> Result<Json<Counter>, ApiError> {
  Ok(Json(Counters::new(store.as_ref()).bump(&slug, field).await?))
}
