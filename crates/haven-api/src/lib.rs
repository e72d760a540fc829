//! JSON REST API for Haven.
//!
//! Exposes an axum [`Router`] over a shared [`haven_router::Router`], so
//! every handler reaches the remote store when it is healthy and the local
//! file otherwise. Auth, TLS and tracing layers are the caller's
//! responsibility.

pub mod books;
pub mod charities;
pub mod contacts;
pub mod counters;
pub mod error;
pub mod settings;
pub mod system;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};

pub use error::ApiError;

/// Shared state for every handler.
pub type Store = Arc<haven_router::Router>;

/// Build a fully-materialised API router over `store`.
pub fn api_router(store: Store) -> Router<()> {
  Router::new()
    // Charities
    .route("/charities", get(charities::list).post(charities::create))
    .route(
      "/charities/{id}",
      get(charities::get_one).put(charities::update).delete(charities::delete),
    )
    // Books
    .route("/books", get(books::list).post(books::create))
    .route("/books/{id}", get(books::get_one).put(books::update).delete(books::delete))
    .route("/books/{id}/view", post(books::view))
    .route("/books/{id}/scroll", post(books::scroll))
    // Settings
    .route("/settings", get(settings::list))
    .route(
      "/settings/{key}",
      get(settings::get_one).put(settings::put).delete(settings::delete),
    )
    // Counters
    .route("/counters", get(counters::list))
    .route("/counters/{slug}/{field}", post(counters::bump))
    // Contact form
    .route("/contacts", get(contacts::list).post(contacts::submit))
    // System
    .route("/health", get(system::health))
    .route("/admin/schema", post(system::ensure_schema))
    .with_state(store)
}
