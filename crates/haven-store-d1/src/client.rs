//! [`RemoteStore`]: async client for the D1 query endpoint.

use std::time::Duration;

use haven_core::{Row, SqlExecutor, Value};
use reqwest::Client;
use serde::Serialize;

use crate::{
  Error, RemoteConfig, Result,
  envelope::{Envelope, rows_from_result},
};

#[derive(Serialize)]
struct QueryBody<'a> {
  sql:    &'a str,
  params: &'a [Value],
}

/// Executes statements against a remote D1 database over HTTPS.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct RemoteStore {
  client:   Client,
  endpoint: String,
  token:    String,
  timeout:  Duration,
}

impl RemoteStore {
  pub fn new(config: &RemoteConfig) -> Result<Self> {
    // Per-request timeouts override this; it only bounds stray calls.
    let client = Client::builder().timeout(config.schema_timeout()).build()?;
    Ok(Self {
      client,
      endpoint: config.endpoint(),
      token: config.api_token.trim().to_owned(),
      timeout: config.timeout(),
    })
  }

  pub fn endpoint(&self) -> &str { &self.endpoint }

  /// Default timeout applied by [`SqlExecutor::execute`].
  pub fn timeout(&self) -> Duration { self.timeout }

  /// Run one statement with an explicit timeout.
  pub async fn query(&self, sql: &str, params: &[Value], timeout: Duration) -> Result<Vec<Row>> {
    let resp = self
      .client
      .post(&self.endpoint)
      .bearer_auth(&self.token)
      .timeout(timeout)
      .json(&QueryBody { sql, params })
      .send()
      .await?;

    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
      let message = match serde_json::from_str::<Envelope>(&body) {
        Ok(env) => env.error_summary(),
        Err(_) => truncate(&body, 200),
      };
      return Err(Error::Status { status: status.as_u16(), message });
    }

    let envelope: Envelope = serde_json::from_str(&body)?;
    if !envelope.success {
      return Err(Error::Declined(envelope.error_summary()));
    }

    let rows = rows_from_result(envelope.result)?;
    tracing::trace!(rows = rows.len(), "remote statement ok");
    Ok(rows)
  }
}

fn truncate(s: &str, max: usize) -> String {
  match s.char_indices().nth(max) {
    Some((idx, _)) => format!("{}…", &s[..idx]),
    None => s.to_owned(),
  }
}

impl SqlExecutor for RemoteStore {
  type Error = Error;

  async fn execute(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
    self.query(sql, params, self.timeout).await
  }
}

#[cfg(test)]
mod tests {
  use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
  };

  use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
  };
  use haven_core::params;
  use serde_json::{Value as JsonValue, json};

  use super::*;

  type Seen = Arc<Mutex<Vec<(Option<String>, JsonValue)>>>;

  /// Serve a single canned reply on an ephemeral port, recording requests.
  async fn canned(status: StatusCode, reply: JsonValue) -> (RemoteConfig, Seen) {
    let seen: Seen = Arc::default();
    let app = axum::Router::new()
      .route(
        "/accounts/{account}/d1/database/{db}/query",
        post(
          move |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<JsonValue>| {
            let reply = reply.clone();
            async move {
              let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
              seen.lock().unwrap().push((auth, body));
              (status, Json(reply))
            }
          },
        ),
      )
      .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    (config_for(addr), seen)
  }

  fn config_for(addr: SocketAddr) -> RemoteConfig {
    RemoteConfig {
      api_base: format!("http://{addr}"),
      ..RemoteConfig::new("acct", "tok", "db")
    }
  }

  #[tokio::test]
  async fn sends_bearer_and_params() {
    let (cfg, seen) = canned(
      StatusCode::OK,
      json!({ "success": true, "result": [{ "results": [{ "id": 1 }] }], "errors": [] }),
    )
    .await;
    let store = RemoteStore::new(&cfg).unwrap();

    let rows = store
      .execute("SELECT * FROM charities WHERE name = ?1", &params!["Mind"])
      .await
      .unwrap();
    assert_eq!(rows[0].get("id"), Some(&Value::Integer(1)));

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].0.as_deref(), Some("Bearer tok"));
    assert_eq!(
      seen[0].1,
      json!({ "sql": "SELECT * FROM charities WHERE name = ?1", "params": ["Mind"] })
    );
  }

  #[tokio::test]
  async fn unsuccessful_envelope_is_declined() {
    let (cfg, _) = canned(
      StatusCode::OK,
      json!({ "success": false, "result": null, "errors": [{ "message": "bad sql" }] }),
    )
    .await;
    let err = RemoteStore::new(&cfg).unwrap().execute("SELEC", &[]).await.unwrap_err();
    assert!(matches!(err, Error::Declined(ref m) if m == "bad sql"), "{err}");
  }

  #[tokio::test]
  async fn http_error_carries_status() {
    let (cfg, _) = canned(
      StatusCode::FORBIDDEN,
      json!({ "success": false, "errors": [{ "message": "Authentication error" }] }),
    )
    .await;
    let err = RemoteStore::new(&cfg).unwrap().execute("SELECT 1", &[]).await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 403, .. }), "{err}");
  }

  #[tokio::test]
  async fn refused_connection_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let store = RemoteStore::new(&config_for(addr)).unwrap();
    let err = store.execute("SELECT 1", &[]).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "{err}");
  }

  #[test]
  fn truncates_on_char_boundary() {
    assert_eq!(truncate("héllo", 2), "hé…");
    assert_eq!(truncate("hi", 5), "hi");
  }
}
