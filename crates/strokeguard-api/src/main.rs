//! strokeguard server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store, loads the classifier artifact, and serves the JSON API.
//! A missing or invalid classifier artifact aborts startup: without it the
//! scoring capability does not exist.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use strokeguard_api::{AppState, ServerConfig, auth::AuthKeys};
use strokeguard_risk::RiskScorer;
use strokeguard_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "strokeguard clinical records server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
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

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("STROKEGUARD"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in file paths.
  let db_path = expand_tilde(&server_cfg.db_path);
  let model_path = expand_tilde(&server_cfg.model_path);

  // Open SQLite store.
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open store at {db_path:?}"))?;

  // Load the classifier once; it is read-only shared state from here on.
  let scorer = RiskScorer::load(&model_path).with_context(|| {
    format!("failed to load classifier artifact at {model_path:?}")
  })?;

  // Build application state.
  let state = AppState {
    store:  Arc::new(store),
    scorer: Arc::new(scorer),
    auth:   Arc::new(AuthKeys::new(&server_cfg.jwt_secret)),
  };

  let app = strokeguard_api::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
