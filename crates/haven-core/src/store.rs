//! The `SqlExecutor` trait.
//!
//! Implemented by each store backend (`haven-store-sqlite`, `haven-store-d1`)
//! and by the dual-store router that sits in front of them. Repositories in
//! [`crate::repo`] are written against this trait only.

use std::future::Future;

use crate::{Row, Value};

/// Runs one parameterized SQL statement.
///
/// Placeholders are positional (`?` or `?N`); `params` are bound in order
/// and never interpolated into `sql`. Statements that produce no rows return
/// an empty vector.
///
/// The returned future is `Send` so executors can be shared across a
/// multi-threaded runtime.
pub trait SqlExecutor: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn execute<'a>(
    &'a self,
    sql: &'a str,
    params: &'a [Value],
  ) -> impl Future<Output = Result<Vec<Row>, Self::Error>> + Send + 'a;
}
