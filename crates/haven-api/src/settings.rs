//! Handlers for `/settings` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/settings` | All settings, ordered by key |
//! | `GET`    | `/settings/{key}` | 404 if unset |
//! | `PUT`    | `/settings/{key}` | Body: `{"value":"1"}` |
//! | `DELETE` | `/settings/{key}` | 204, or 404 if unset |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use haven_core::{repo::Settings, setting::Setting};
use serde::Deserialize;

use crate::{Store, error::ApiError};

/// `GET /settings`
pub async fn list(State(store): State<Store>) -> Result<Json<Vec<Setting>>, ApiError> {
  Ok(Json(Settings::new(store.as_ref()).all().await?))
}

/// `GET /settings/{key}`
pub async fn get_one(
  State(store): State<Store>,
  Path(key): Path<String>,
) -> Result<Json<Setting>, ApiError> {
  match Settings::new(store.as_ref()).get(&key).await? {
    Some(value) => Ok(Json(Setting::new(key, value))),
    None => Err(ApiError::NotFound(format!("setting {key}"))),
  }
}

#[derive(Debug, Deserialize)]
pub struct PutBody {
  pub value: String,
}

/// `PUT /settings/{key}`
pub async fn put(
  State(store): State<Store>,
  Path(key): Path<String>,
  Json(body): Json<PutBody>,
) -> Result<Json<Setting>, ApiError> {
  if key.trim().is_empty() {
    return Err(ApiError::BadRequest("setting key must not be blank".into()));
  }
  Settings::new(store.as_ref()).set(&key, &body.value).await?;
  Ok(Json(Setting::new(key, body.value)))
}

/// `DELETE /settings/{key}`
pub async fn delete(
  State(store): State<Store>,
  Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
  if Settings::new(store.as_ref()).remove(&key).await? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("setting {key}")))
  }
}
