//! The dual-store query router.
//!
//! Every statement is offered to the remote D1 store first and falls back to
//! the local SQLite file on any remote failure. After the first failure the
//! remote is demoted and skipped, so a dead remote costs one timeout rather
//! than one per statement. Schema creation and migration always target both
//! stores.

mod health;
mod router;
mod schema;

pub mod error;

pub use error::{Error, Result};
pub use health::{MAX_REPROBE_DELAY, StoreHealth};
pub use router::{ActiveStore, HealthReport, Router};
pub use schema::SchemaReport;

#[cfg(test)]
mod tests;
