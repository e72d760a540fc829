//! haven server binary.
//!
//! Reads `haven.toml` (or the path given with `--config`), builds the
//! dual-store router and serves the JSON API over HTTP.
//!
//! ```text
//! haven [--config haven.toml] [serve|migrate|dedupe|status]
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use haven_router::Router;
use haven_server::{ServerConfig, heal, prepare};
use haven_store_sqlite::LocalStore;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Haven directory server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "haven.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
  /// Prepare the stores and serve the API (default).
  Serve,
  /// Create and migrate the schema on both stores, then exit.
  Migrate,
  /// Merge duplicate charities and books, then exit.
  Dedupe,
  /// Print which store is in use.
  Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ServerConfig::load(&cli.config)?;

  let store_path = cfg.store_path();
  let router = Router::from_config(LocalStore::file(&store_path), &cfg.remote)
    .context("failed to build store router")?;
  let router = Arc::new(router);

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => {
      prepare(&router).await?;
      serve(router, &cfg).await?;
    }
    Command::Migrate => {
      let prepared = prepare(&router).await?;
      println!("{}", serde_json::to_string_pretty(&prepared)?);
    }
    Command::Dedupe => {
      let healed = heal(&router).await?;
      println!("charities: {}\nbooks:     {}", healed.charities, healed.books);
    }
    Command::Status => {
      let status = json!({
        "store_path": store_path,
        "health": router.health_report(),
      });
      println!("{}", serde_json::to_string_pretty(&status)?);
    }
  }

  Ok(())
}

async fn serve(router: Arc<Router>, cfg: &ServerConfig) -> anyhow::Result<()> {
  let app = haven_api::api_router(router).layer(TraceLayer::new_for_http());
  let address = cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}
