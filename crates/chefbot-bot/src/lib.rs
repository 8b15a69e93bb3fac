//! Telegram front end for ChefBot.
//!
//! Exposes an axum [`Router`] that receives Telegram webhook updates and
//! hands each one to a [`Bot`], which dispatches it against any
//! [`Store`] and answers through any [`Messenger`].

pub mod dispatch;
pub mod error;
pub mod gemini;
pub mod reply;
pub mod telegram;
pub mod update;

pub use dispatch::Bot;
pub use error::{Error, Result};

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  extract::{Path, State},
  routing::{get, post},
};
use bytes::Bytes;
use chefbot_core::{
  assistant::{Assistant, PageSource},
  channel::Messenger,
  store::Store,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::debug;

use update::Update;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CHEFBOT__*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub store_path:     PathBuf,
  /// Path segment of the webhook URL registered with Telegram.
  pub webhook_secret: String,
  pub telegram:       TelegramConfig,
  /// Absent, or present with a blank key, disables the AI features.
  #[serde(default)]
  pub gemini:         Option<GeminiConfig>,
  #[serde(default)]
  pub limits:         Limits,
}

#[derive(Deserialize, Clone)]
pub struct TelegramConfig {
  pub token:    String,
  #[serde(default = "default_api_base")]
  pub api_base: String,
}

#[derive(Deserialize, Clone)]
pub struct GeminiConfig {
  #[serde(default)]
  pub api_key:      String,
  #[serde(default = "default_model")]
  pub model:        String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

/// How many rows each listing shows.
#[derive(Deserialize, Clone, Copy, Debug)]
#[serde(default)]
pub struct Limits {
  pub matches:         usize,
  pub recommendations: usize,
  pub history:         usize,
  pub menu_list:       usize,
}

impl Default for Limits {
  fn default() -> Self {
    Self {
      matches:         chefbot_core::matcher::DEFAULT_LIMIT,
      recommendations: chefbot_core::recommend::DEFAULT_LIMIT,
      history:         5,
      menu_list:       50,
    }
  }
}

fn default_api_base() -> String { "https://api.telegram.org".to_owned() }

fn default_model() -> String { "gemini-1.5-flash".to_owned() }

fn default_timeout_secs() -> u64 { 30 }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, M, A, P> {
  pub bot:    Arc<Bot<S, M, A, P>>,
  pub config: Arc<ServerConfig>,
}

impl<S, M, A, P> Clone for AppState<S, M, A, P> {
  fn clone(&self) -> Self {
    Self {
      bot:    Arc::clone(&self.bot),
      config: Arc::clone(&self.config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`]: a status page and the webhook.
pub fn router<S, M, A, P>(state: AppState<S, M, A, P>) -> Router
where
  S: Store + 'static,
  M: Messenger + 'static,
  A: Assistant + 'static,
  P: PageSource + 'static,
{
  Router::new()
    .route("/",                 get(index::<S, M, A, P>))
    .route("/webhook/{secret}", post(webhook::<S, M, A, P>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn index<S, M, A, P>(
  State(state): State<AppState<S, M, A, P>>,
) -> Json<Value>
where
  S: Store + 'static,
  M: Messenger + 'static,
  A: Assistant + 'static,
  P: PageSource + 'static,
{
  Json(json!({
    "ok":      true,
    "message": "ChefBot server is running.",
    "webhook": format!("/webhook/{}", state.config.webhook_secret),
  }))
}

/// Accepts one Telegram update. The turn is handled before answering; its
/// failures are reported to the chat, never to Telegram, so a delivered
/// update is not retried.
async fn webhook<S, M, A, P>(
  State(state): State<AppState<S, M, A, P>>,
  Path(secret): Path<String>,
  body: Bytes,
) -> Result<Json<Value>>
where
  S: Store + 'static,
  M: Messenger + 'static,
  A: Assistant + 'static,
  P: PageSource + 'static,
{
  if secret != state.config.webhook_secret {
    return Err(Error::NotFound);
  }
  match Update::from_slice(&body).into_turn() {
    Some(turn) => state.bot.handle(turn).await,
    None => debug!("ignoring update without a message or callback"),
  }
  Ok(Json(json!({ "ok": true })))
}
