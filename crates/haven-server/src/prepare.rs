//! Startup maintenance: schema on both stores, dedup cleanup, seeding.

use anyhow::Context as _;
use haven_core::repo::{Books, Charities};
use haven_router::{Router, SchemaReport};
use serde::Serialize;

/// Rows left after the self-healing reads.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Healed {
  pub charities: usize,
  pub books:     usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Prepared {
  pub schema:     SchemaReport,
  /// Second schema pass, run after the cleanup so deferred indexes land.
  pub after_heal: SchemaReport,
  pub healed:     Healed,
  /// Default charities inserted by this run.
  pub seeded:     usize,
}

/// Load charities and books once so duplicates are merged and written back.
pub async fn heal(router: &Router) -> anyhow::Result<Healed> {
  let charities = Charities::new(router)
    .list()
    .await
    .context("failed to load charities")?
    .len();
  let books = Books::new(router).list().await.context("failed to load books")?.len();
  Ok(Healed { charities, books })
}

/// Bring both stores up to date and seed defaults.
pub async fn prepare(router: &Router) -> anyhow::Result<Prepared> {
  let schema = router.ensure_schema().await.context("schema pass failed")?;
  let healed = heal(router).await?;
  let after_heal = router.ensure_schema().await.context("second schema pass failed")?;
  let seeded = Charities::new(router)
    .seed_defaults()
    .await
    .context("failed to seed default charities")?;

  if !after_heal.is_settled() {
    tracing::warn!(report = ?after_heal, "schema work still outstanding after cleanup");
  }

  Ok(Prepared { schema, after_heal, healed, seeded })
}
