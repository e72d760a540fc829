//! An in-process stand-in for the D1 query API.
//!
//! Statements run against a private in-memory SQLite store with no declared
//! schema, so the remote starts empty like a fresh D1 database. Replies use
//! the real `{success, result, errors}` envelope.

use std::{
  net::SocketAddr,
  sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
  time::Duration,
};

use axum::{Json, extract::State, http::StatusCode, routing::post};
use haven_core::{SqlExecutor, Value, schema::Schema};
use haven_store_d1::RemoteConfig;
use haven_store_sqlite::{LocalStore, Location};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

#[derive(Clone)]
pub struct FakeD1 {
  pub addr:  SocketAddr,
  pub store: LocalStore,
  requests:  Arc<AtomicUsize>,
  failing:   Arc<AtomicBool>,
}

#[derive(Deserialize)]
struct QueryBody {
  sql:    String,
  #[serde(default)]
  params: Vec<JsonValue>,
}

impl FakeD1 {
  pub async fn start() -> Self {
    let fake = Self {
      addr:     "127.0.0.1:0".parse().unwrap(),
      store:    LocalStore::new(Location::Memory, Schema::empty(), Duration::from_secs(5)),
      requests: Arc::default(),
      failing:  Arc::default(),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let fake = Self { addr: listener.local_addr().unwrap(), ..fake };

    let app = axum::Router::new()
      .route("/accounts/{account}/d1/database/{database}/query", post(query))
      .with_state(fake.clone());
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    fake
  }

  pub fn config(&self) -> RemoteConfig {
    RemoteConfig {
      api_base: format!("http://{}", self.addr),
      ..RemoteConfig::new("acct", "token", "db")
    }
  }

  /// Every request received so far, including failed ones.
  pub fn requests(&self) -> usize { self.requests.load(Ordering::SeqCst) }

  /// While set, every request gets a 503.
  pub fn set_failing(&self, failing: bool) { self.failing.store(failing, Ordering::SeqCst); }

  /// Run a statement directly against the backing store.
  pub async fn exec(&self, sql: &str, params: &[Value]) -> Vec<haven_core::Row> {
    self.store.execute(sql, params).await.unwrap()
  }

  pub async fn count(&self, table: &str) -> i64 {
    let rows = self.exec(&format!("SELECT COUNT(*) AS n FROM {table}"), &[]).await;
    rows[0].count("n").unwrap()
  }
}

async fn query(
  State(fake): State<FakeD1>,
  Json(body): Json<QueryBody>,
) -> (StatusCode, Json<JsonValue>) {
  fake.requests.fetch_add(1, Ordering::SeqCst);

  if fake.failing.load(Ordering::SeqCst) {
    return (
      StatusCode::SERVICE_UNAVAILABLE,
      Json(json!({ "success": false, "result": null, "errors": [{ "code": 7500, "message": "unavailable" }] })),
    );
  }

  let params: Vec<Value> = body.params.into_iter().map(Value::from).collect();
  match fake.store.execute(&body.sql, &params).await {
    Ok(rows) => (
      StatusCode::OK,
      Json(json!({
        "success": true,
        "result": [{ "results": rows, "success": true, "meta": { "changes": 0 } }],
        "errors": [],
      })),
    ),
    Err(e) => (
      StatusCode::BAD_REQUEST,
      Json(json!({ "success": false, "result": null, "errors": [{ "code": 7500, "message": e.to_string() }] })),
    ),
  }
}
