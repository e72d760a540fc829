mod fake_d1;

use std::{collections::BTreeSet, sync::Arc, time::Duration};

use haven_core::{
  SqlExecutor, Value,
  book::Book,
  charity::{Capabilities, Charity},
  params,
  repo::{Books, Charities, Counters},
  counter::CounterField,
  schema::DIRECTORY,
};
use haven_store_d1::{RemoteConfig, RemoteStore};
use haven_store_sqlite::LocalStore;

use self::fake_d1::FakeD1;
use crate::{ActiveStore, Router, StoreHealth};

fn router_for(config: &RemoteConfig) -> Router {
  Router::from_config(LocalStore::in_memory(), config).unwrap()
}

/// A port with nothing listening on it.
fn dead_remote() -> RemoteConfig {
  let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
  RemoteConfig {
    api_base: format!("http://{addr}"),
    timeout_secs: 2,
    schema_timeout_secs: 2,
    ..RemoteConfig::new("acct", "token", "db")
  }
}

async fn column_set(store: &LocalStore, table: &str) -> BTreeSet<String> {
  store.table_columns(table).await.unwrap().into_iter().collect()
}

// ─── Routing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unconfigured_router_runs_locally() {
  let router = router_for(&RemoteConfig::default());
  assert!(router.remote().is_none());
  assert_eq!(router.active_store(), ActiveStore::Local);

  router
    .execute(
      "INSERT INTO charities (name, site_url) VALUES (?1, ?2)",
      &params!["Samaritans", "https://www.samaritans.org"],
    )
    .await
    .unwrap();
  let rows = router
    .execute("SELECT id, name FROM charities WHERE name = ?1", &params!["Samaritans"])
    .await
    .unwrap();

  assert_eq!(rows.len(), 1);
  assert!(rows[0].id("id").unwrap() > 0);
}

#[tokio::test]
async fn book_insert_then_select_without_credentials() {
  let router = router_for(&RemoteConfig::default());
  router
    .execute(
      "INSERT INTO books (title, author, description, affiliate_url, cover_url) VALUES (?,?,?,?,?)",
      &params!["T", "A", "D", "http://x", "http://y"],
    )
    .await
    .unwrap();

  let rows = router.execute("SELECT * FROM books", &[]).await.unwrap();
  assert_eq!(rows.len(), 1);
  let row = &rows[0];
  assert!(row.id("id").unwrap() > 0);
  let expected = [
    ("title", "T"),
    ("author", "A"),
    ("description", "D"),
    ("affiliate_url", "http://x"),
    ("cover_url", "http://y"),
  ];
  for (column, expected) in expected {
    assert_eq!(row.get(column), Some(&Value::Text(expected.into())), "{column}");
  }
}

#[tokio::test]
async fn placeholder_credentials_mean_local_only() {
  let router = router_for(&RemoteConfig::new("your_account_id", "your_api_token", "db"));
  assert!(!router.health_report().remote_configured);
}

#[tokio::test]
async fn healthy_remote_serves_statements() {
  let fake = FakeD1::start().await;
  let router = router_for(&fake.config());
  router.ensure_schema().await.unwrap();

  router
    .execute("INSERT INTO settings (key, value) VALUES (?1, ?2)", &params!["k", "v"])
    .await
    .unwrap();

  assert_eq!(fake.count("settings").await, 1);
  let local = router.local().execute("SELECT * FROM settings", &[]).await.unwrap();
  assert!(local.is_empty());
  assert_eq!(router.active_store(), ActiveStore::Remote);
}

#[tokio::test]
async fn failing_remote_falls_back_without_retrying() {
  let fake = FakeD1::start().await;
  let router = router_for(&fake.config());
  fake.set_failing(true);

  for i in 0..5_i64 {
    router
      .execute("INSERT INTO counters (slug, views) VALUES (?1, ?2)", &params![format!("c{i}"), i])
      .await
      .unwrap();
  }

  // One failed attempt, then the remote is never contacted again.
  assert_eq!(fake.requests(), 1);
  assert_eq!(router.active_store(), ActiveStore::Local);
  let rows = router.local().execute("SELECT * FROM counters", &[]).await.unwrap();
  assert_eq!(rows.len(), 5);
}

#[tokio::test]
async fn unreachable_remote_falls_back() {
  let router = router_for(&dead_remote());
  assert_eq!(router.active_store(), ActiveStore::Remote);

  let rows = router.execute("SELECT 1 AS one", &[]).await.unwrap();
  assert_eq!(rows[0].count("one").unwrap(), 1);
  assert!(!router.health().is_available());
  assert!(router.local().is_open());
}

#[tokio::test]
async fn remote_sql_error_also_demotes() {
  let fake = FakeD1::start().await;
  let router = router_for(&fake.config());
  router.ensure_schema().await.unwrap();

  // The remote rejects the statement; the local store answers it.
  let rows = router.execute("SELECT COUNT(*) AS n FROM books", &[]).await;
  assert!(rows.is_ok());
  fake.exec("DROP TABLE books", &[]).await;
  let rows = router.execute("SELECT COUNT(*) AS n FROM books", &[]).await.unwrap();
  assert_eq!(rows[0].count("n").unwrap(), 0);
  assert_eq!(router.active_store(), ActiveStore::Local);
}

#[tokio::test]
async fn reprobe_restores_remote() {
  let fake = FakeD1::start().await;
  let config = fake.config();
  let router = Router::new(
    LocalStore::in_memory(),
    Some(RemoteStore::new(&config).unwrap()),
    Arc::new(StoreHealth::with_reprobe(Duration::from_millis(50))),
    config.schema_timeout(),
  );

  fake.set_failing(true);
  router.execute("SELECT 1", &[]).await.unwrap();
  router.execute("SELECT 1", &[]).await.unwrap();
  assert_eq!(fake.requests(), 1);

  fake.set_failing(false);
  tokio::time::sleep(Duration::from_millis(80)).await;
  router.execute("SELECT 1", &[]).await.unwrap();
  assert_eq!(fake.requests(), 2);
  assert_eq!(router.active_store(), ActiveStore::Remote);
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn schema_converges_on_both_stores() {
  let fake = FakeD1::start().await;
  let router = router_for(&fake.config());

  let report = router.ensure_schema().await.unwrap();
  let remote = report.remote.unwrap();
  assert!(remote.skipped_tables.is_empty());
  assert!(remote.deferred_indexes.is_empty());
  assert_eq!(report.local.created.len(), DIRECTORY.tables.len());

  for table in DIRECTORY.tables {
    let local = column_set(router.local(), table.name).await;
    let declared: BTreeSet<String> = table.column_names().map(str::to_owned).collect();
    assert_eq!(local, declared, "{}", table.name);
    assert_eq!(column_set(&fake.store, table.name).await, local, "{}", table.name);
  }
}

#[tokio::test]
async fn ensure_schema_is_idempotent() {
  let fake = FakeD1::start().await;
  let router = router_for(&fake.config());

  router.ensure_schema().await.unwrap();
  for _ in 0..3 {
    let report = router.ensure_schema().await.unwrap();
    assert!(report.is_settled(), "{report:?}");
  }
}

#[tokio::test]
async fn legacy_remote_table_is_upgraded() {
  let fake = FakeD1::start().await;
  fake
    .exec(
      "CREATE TABLE books (id INTEGER PRIMARY KEY AUTOINCREMENT, title TEXT, author TEXT, \
       description TEXT, affiliate_url TEXT)",
      &[],
    )
    .await;
  fake
    .exec(
      "INSERT INTO books (title, author, description, affiliate_url) VALUES (?1, ?2, ?3, ?4)",
      &params!["Reasons to Stay Alive", "Matt Haig", "", "https://amzn.to/rtsa"],
    )
    .await;

  let router = router_for(&fake.config());
  let report = router.ensure_schema().await.unwrap();
  let remote = report.remote.unwrap();
  assert!(remote.added_columns.contains(&"books.view_count".to_owned()));
  assert!(remote.added_columns.contains(&"books.dedup_key".to_owned()));
  assert_eq!(column_set(&fake.store, "books").await, column_set(router.local(), "books").await);

  // Existing rows survive and read with defaults.
  let books = Books::new(&router).list().await.unwrap();
  assert_eq!(books.len(), 1);
  assert_eq!(books[0].view_count, 0);
}

#[tokio::test]
async fn unreachable_remote_schema_is_skipped() {
  let router = router_for(&dead_remote());
  let report = router.ensure_schema().await.unwrap();

  assert_eq!(report.remote.unwrap().skipped_tables.len(), DIRECTORY.tables.len());
  assert_eq!(report.local.created.len(), DIRECTORY.tables.len());
  assert!(!router.health().is_available());
}

// ─── Repositories through the router ─────────────────────────────────────────

#[tokio::test]
async fn repositories_write_to_remote() {
  let fake = FakeD1::start().await;
  let router = router_for(&fake.config());
  router.ensure_schema().await.unwrap();

  let charities = Charities::new(&router);
  let mut first = Charity::new("Mind", "mind.org.uk");
  first.capabilities.helpline = true;
  let mut second = Charity::new(" MIND ", "https://MIND.org.uk");
  second.capabilities = Capabilities { live_chat: true, ..Capabilities::default() };
  charities.import(vec![first, second]).await.unwrap();

  let listed = charities.list().await.unwrap();
  assert_eq!(listed.len(), 1);
  assert!(listed[0].capabilities.helpline && listed[0].capabilities.live_chat);
  assert_eq!(fake.count("charities").await, 1);

  let books = Books::new(&router);
  let mut a = Book::new("Notes on a Nervous Planet", "Matt Haig", "https://amzn.to/nnp");
  a.view_count = 2;
  let mut b = a.clone();
  b.view_count = 3;
  b.scroll_count = 1;
  books.upsert(a).await.unwrap();
  let merged = books.upsert(b).await.unwrap();
  assert_eq!((merged.view_count, merged.scroll_count), (5, 1));

  let counters = Counters::new(&router);
  counters.bump("box-breathing", CounterField::Completions).await.unwrap();
  let c = counters.bump("box-breathing", CounterField::Completions).await.unwrap();
  assert_eq!(c.completions, 2);
  assert_eq!(fake.count("counters").await, 1);
}

#[tokio::test]
async fn colliding_edit_keeps_remote_active() {
  let fake = FakeD1::start().await;
  let router = router_for(&fake.config());
  router.ensure_schema().await.unwrap();

  let charities = Charities::new(&router);
  charities.upsert(Charity::new("Mind", "mind.org.uk")).await.unwrap();
  let nami = charities.upsert(Charity::new("NAMI", "nami.org")).await.unwrap();

  let err = charities
    .update(nami.id.unwrap(), Charity::new("Mind", "mind.org.uk"))
    .await
    .unwrap_err();
  assert!(matches!(err, haven_core::Error::Invalid { .. }));

  assert_eq!(router.active_store(), ActiveStore::Remote);
  assert_eq!(charities.list().await.unwrap().len(), 2);
  assert_eq!(fake.count("charities").await, 2);
}
