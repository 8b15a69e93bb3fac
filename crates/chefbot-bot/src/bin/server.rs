//! ChefBot server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `CHEFBOT__*` environment variables, opens the SQLite catalog, and serves
//! the Telegram webhook over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use chefbot_bot::{
  AppState, Bot, ServerConfig,
  gemini::{GeminiClient, PageFetcher},
  telegram::TelegramClient,
};
use chefbot_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "ChefBot Telegram recipe assistant")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
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

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CHEFBOT").separator("__"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let messenger = TelegramClient::new(&server_cfg.telegram)
    .context("failed to build Telegram client")?;
  let assistant = match &server_cfg.gemini {
    Some(gemini) => GeminiClient::from_config(gemini)
      .context("failed to build Gemini client")?,
    None => None,
  };
  if assistant.is_none() {
    tracing::warn!("no Gemini API key configured; AI features are disabled");
  }
  let pages = PageFetcher::new().context("failed to build page fetcher")?;

  let bot = Bot::new(
    Arc::new(store),
    messenger,
    assistant,
    pages,
    server_cfg.limits,
  );
  let state = AppState {
    bot:    Arc::new(bot),
    config: Arc::new(server_cfg.clone()),
  };

  let app = chefbot_bot::router(state);
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
