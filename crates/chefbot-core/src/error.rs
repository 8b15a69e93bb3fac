//! Error types for `chefbot-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("recipe record has no name")]
  MissingRecipeName,

  #[error("ingredient {ingredient:?} has an invalid quantity: {quantity}")]
  InvalidQuantity { ingredient: String, quantity: f64 },

  #[error("recipe record is not valid JSON: {0}")]
  Json(#[from] serde_json::Error),

  #[error("unknown difficulty: {0:?}")]
  UnknownDifficulty(String),

  #[error("unknown restriction kind: {0:?}")]
  UnknownRestrictionKind(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
