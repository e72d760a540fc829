//! Core types for the Haven directory store.
//!
//! This crate knows nothing about HTTP or a particular database driver. It
//! defines the values that travel between callers and stores, the typed
//! entities decoded from rows, the declarative schema, and the
//! [`SqlExecutor`](store::SqlExecutor) seam every backend implements.

// Native `async fn` in traits; the `Send` bounds are spelled out on the
// trait declarations instead.
#![allow(async_fn_in_trait)]

pub mod book;
pub mod charity;
pub mod contact;
pub mod counter;
pub mod dedup;
pub mod encode;
pub mod error;
pub mod repo;
pub mod schema;
pub mod setting;
pub mod store;
pub mod url;
pub mod value;

pub use error::{Error, Result};
pub use store::SqlExecutor;
pub use value::{Row, Value};
