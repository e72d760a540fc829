//! Handlers for `/charities` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/charities` | Self-healing: duplicates are merged on read |
//! | `POST`   | `/charities` | Upsert by name + site; merges into an existing entry |
//! | `GET`    | `/charities/{id}` | 404 if not found |
//! | `PUT`    | `/charities/{id}` | Replace fields; 404 if not found, 400 if it would duplicate another entry |
//! | `DELETE` | `/charities/{id}` | 204, or 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use haven_core::{charity::Charity, repo::Charities};

use crate::{Store, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /charities`
pub async fn list(State(store): State<Store>) -> Result<Json<Vec<Charity>>, ApiError> {
  Ok(Json(Charities::new(store.as_ref()).list().await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /charities`. The admin form insists on a description, a logo and a
/// website as well as the name.
pub async fn create(
  State(store): State<Store>,
  Json(body): Json<Charity>,
) -> Result<impl IntoResponse, ApiError> {
  let missing: Vec<&str> = [
    ("name", &body.name),
    ("description", &body.description),
    ("logo_url", &body.logo_url),
    ("site_url", &body.site_url),
  ]
  .into_iter()
  .filter(|(_, v)| v.trim().is_empty())
  .map(|(k, _)| k)
  .collect();
  if !missing.is_empty() {
    return Err(ApiError::BadRequest(format!("missing required fields: {}", missing.join(", "))));
  }

  let charity = Charities::new(store.as_ref()).upsert(body).await?;
  Ok((StatusCode::CREATED, Json(charity)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /charities/{id}`
pub async fn get_one(
  State(store): State<Store>,
  Path(id): Path<i64>,
) -> Result<Json<Charity>, ApiError> {
  Charities::new(store.as_ref())
    .get(id)
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("charity {id}")))
}

// ─── Update / delete ──────────────────────────────────────────────────────────

/// `PUT /charities/{id}`
pub async fn update(
  State(store): State<Store>,
  Path(id): Path<i64>,
  Json(body): Json<Charity>,
) -> Result<Json<Charity>, ApiError> {
  Ok(Json(Charities::new(store.as_ref()).update(id, body).await?))
}

/// `DELETE /charities/{id}`
pub async fn delete(
  State(store): State<Store>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  if Charities::new(store.as_ref()).delete(id).await? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("charity {id}")))
  }
}
