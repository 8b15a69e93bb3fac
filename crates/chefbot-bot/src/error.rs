//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("not found")]
  NotFound,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("telegram api error: {0}")]
  Telegram(String),

  #[error("assistant error: {0}")]
  Assistant(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("assistant returned an unusable reply: {0}")]
  AssistantReply(String),

  #[error("page fetch error: {0}")]
  Page(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("invalid recipe record: {0}")]
  Record(#[from] chefbot_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  pub(crate) fn assistant(
    e: impl std::error::Error + Send + Sync + 'static,
  ) -> Self {
    Self::Assistant(Box::new(e))
  }

  pub(crate) fn page(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Page(Box::new(e))
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::NotFound => StatusCode::NOT_FOUND,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "ok": false, "error": self.to_string() })))
      .into_response()
  }
}
