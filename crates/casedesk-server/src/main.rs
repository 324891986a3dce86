//! casedesk server binary.
//!
//! Reads `casedesk.toml` (or the path given with `--config`), opens the
//! SQLite case store, and serves the JSON API under `/api`.
//!
//! Any setting can be overridden from the environment, e.g.
//! `CASEDESK_PORT=9000` or `CASEDESK_LLM__DEFAULT_TIER=smart`. The model key
//! falls back to `OPENROUTER_API_KEY` when the config leaves it empty.

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use casedesk_api::{AppState, api_router};
use casedesk_extract::{Extractor, OpenRouterClient};
use casedesk_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "casedesk support-case server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "casedesk.toml")]
  config: PathBuf,

  /// Insert the demo cases into an empty store, overriding the config.
  #[arg(long)]
  seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  // Open SQLite store.
  let store_path = &server_cfg.store_path;
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if cli.seed || server_cfg.seed_demo_data {
    store
      .seed_demo_data()
      .await
      .context("failed to seed demo data")?;
  }

  // Model client.
  if server_cfg.llm.is_unauthenticated() {
    tracing::warn!("no model API key configured; chat requests will fail");
  }
  let tier = server_cfg.llm.default_tier;
  let client = OpenRouterClient::new(server_cfg.llm.clone())
    .context("failed to build model client")?;
  let extractor = Extractor::new(client, tier);

  // Build application state.
  let state = AppState::new(Arc::new(store), extractor);
  let app = Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http());

  let address = server_cfg.address();
  tracing::info!(%tier, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
