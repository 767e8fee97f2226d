//! Dialectic server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, connects to an Ollama server, and serves the
//! tutor API over HTTP.
//!
//! # Proxy secret hash generation
//!
//! To generate the argon2 PHC string for `proxy_secret_hash` in config.toml:
//!
//! ```
//! cargo run -p dialectic-server --bin dialectic -- --hash-secret
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::http::HeaderName;
use clap::Parser;
use dialectic_core::stage::StageCatalog;
use dialectic_engine::{Engine, EngineSettings};
use dialectic_ollama::{OllamaConfig, OllamaGateway};
use dialectic_server::{AppState, ServerConfig, auth::IdentityConfig};
use dialectic_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Dialectic moral-reasoning tutor")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a proxy secret entered on stdin and exit.
  #[arg(long)]
  hash_secret: bool,
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

  if cli.hash_secret {
    let secret = read_secret()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(secret.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("DIALECTIC"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let gateway = OllamaGateway::new(OllamaConfig {
    base_url: server_cfg.ollama_url.clone(),
    model:    server_cfg.ollama_model.clone(),
    timeout:  Duration::from_secs(server_cfg.gateway_timeout_secs),
  })
  .context("failed to build ollama client")?;

  let user_header = HeaderName::from_bytes(server_cfg.user_header.as_bytes())
    .with_context(|| format!("invalid user header {:?}", server_cfg.user_header))?;

  let catalog = StageCatalog::kohlberg().context("invalid stage catalog")?;

  let engine = Engine::new(
    Arc::new(store),
    Arc::new(gateway),
    Arc::new(catalog),
    EngineSettings {
      answers_per_stage:  server_cfg.answers_per_stage,
      template_selection: server_cfg.template_selection,
    },
  );

  let state = AppState {
    engine,
    identity: Arc::new(IdentityConfig {
      user_header,
      proxy_secret_hash: server_cfg.proxy_secret_hash.clone(),
    }),
  };

  let app = dialectic_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!(
    model = %server_cfg.ollama_model,
    ollama = %server_cfg.ollama_url,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a secret from stdin.
fn read_secret() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Secret: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
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
