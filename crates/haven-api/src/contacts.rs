//! Handlers for the contact form.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use haven_core::{contact::ContactMessage, repo::Contacts};

use crate::{Store, error::ApiError};

/// `GET /contacts`, newest first.
pub async fn list(State(store): State<Store>) -> Result<Json<Vec<ContactMessage>>, ApiError> {
  Ok(Json(Contacts::new(store.as_ref()).list().await?))
}

/// `POST /contacts`. Body: `{"name", "email", "message"}`; only the
/// message is required.
pub async fn submit(
  State(store): State<Store>,
  Json(body): Json<ContactMessage>,
) -> Result<impl IntoResponse, ApiError> {
  let stored = Contacts::new(store.as_ref()).submit(body).await?;
  Ok((StatusCode::CREATED, Json(stored)))
}
