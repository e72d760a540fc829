//! Health and maintenance endpoints.

use axum::{Json, extract::State};
use haven_router::{HealthReport, SchemaReport};

use crate::{Store, error::ApiError};

/// `GET /health`
pub async fn health(State(store): State<Store>) -> Json<HealthReport> {
  Json(store.health_report())
}

/// `POST /admin/schema`: run the schema pass on both stores.
pub async fn ensure_schema(State(store): State<Store>) -> Result<Json<SchemaReport>, ApiError> {
  Ok(Json(store.ensure_schema().await?))
}
