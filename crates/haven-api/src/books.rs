//! Handlers for `/books` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/books` | Self-healing: duplicates are merged on read |
//! | `POST`   | `/books` | Upsert by title + author + link; counters add up |
//! | `GET`    | `/books/{id}` | 404 if not found |
//! | `PUT`    | `/books/{id}` | Replace fields; 404 if not found |
//! | `DELETE` | `/books/{id}` | 204, or 404 if not found |
//! | `POST`   | `/books/{id}/view` | Count an affiliate click |
//! | `POST`   | `/books/{id}/scroll` | Count a carousel impression |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use haven_core::{book::Book, repo::Books};

use crate::{Store, error::ApiError};

/// `GET /books`
pub async fn list(State(store): State<Store>) -> Result<Json<Vec<Book>>, ApiError> {
  Ok(Json(Books::new(store.as_ref()).list().await?))
}

/// `POST /books`
pub async fn create(
  State(store): State<Store>,
  Json(body): Json<Book>,
) -> Result<impl IntoResponse, ApiError> {
  let book = Books::new(store.as_ref()).upsert(body).await?;
  Ok((StatusCode::CREATED, Json(book)))
}

/// `GET /books/{id}`
pub async fn get_one(
  State(store): State<Store>,
  Path(id): Path<i64>,
) -> Result<Json<Book>, ApiError> {
  Books::new(store.as_ref())
    .get(id)
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("book {id}")))
}

/// `PUT /books/{id}`
pub async fn update(
  State(store): State<Store>,
  Path(id): Path<i64>,
  Json(body): Json<Book>,
) -> Result<Json<Book>, ApiError> {
  Ok(Json(Books::new(store.as_ref()).update(id, body).await?))
}

/// `DELETE /books/{id}`
pub async fn delete(
  State(store): State<Store>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  if Books::new(store.as_ref()).delete(id).await? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("book {id}")))
  }
}

// ─── Engagement ───────────────────────────────────────────────────────────────

/// `POST /books/{id}/view`
pub async fn view(
  State(store): State<Store>,
  Path(id): Path<i64>,
) -> Result<Json<Book>, ApiError> {
  Ok(Json(Books::new(store.as_ref()).record_view(id).await?))
}

/// `POST /books/{id}/scroll`
pub async fn scroll(
  State(store): State<Store>,
  Path(id): Path<i64>,
) -> Result<Json<Book>, ApiError> {
  Ok(Json(Books::new(store.as_ref()).record_scroll(id).await?))
}
