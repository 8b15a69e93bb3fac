//! The structured recipe record exchanged with the assistant.
//!
//! Replies are decoded into a strict wire shape and then validated into a
//! [`RecipeDraft`] before anything touches storage. Non-conforming replies
//! are rejected with an [`Error`].

use serde::Deserialize;

use crate::{
  Error, Result,
  recipe::{DEFAULT_UNIT, Difficulty},
};

/// The record shape the assistant is asked to produce.
pub const RECORD_SHAPE: &str = r#"{"name":"","difficulty":"easy|medium|hard","ingredients":[{"name":"","quantity":0,"unit":""}],"steps":["",""]}"#;

// ─── Wire shape ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordWire {
  #[serde(default)]
  name:        Option<String>,
  #[serde(default)]
  difficulty:  Option<String>,
  #[serde(default)]
  ingredients: Vec<IngredientWire>,
  #[serde(default)]
  steps:       Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IngredientWire {
  #[serde(default)]
  name:     Option<String>,
  #[serde(default)]
  quantity: Option<f64>,
  #[serde(default)]
  unit:     Option<String>,
}

// ─── Validated draft ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct DraftIngredient {
  pub name:     String,
  pub quantity: f64,
  pub unit:     String,
}

/// A validated recipe ready for ingestion.
///
/// - `name` is trimmed and non-empty.
/// - Ingredients have non-empty names, finite non-negative quantities and a
///   unit; entries naming the same ingredient (ignoring case) are merged by
///   summing their quantities.
/// - Steps are trimmed, blank entries are dropped, order is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDraft {
  pub name:        String,
  pub difficulty:  Difficulty,
  pub ingredients: Vec<DraftIngredient>,
  pub steps:       Vec<String>,
}

impl RecipeDraft {
  /// Parse an assistant reply, tolerating a fenced code block around it.
  pub fn from_reply(reply: &str) -> Result<Self> {
    let wire: RecordWire = serde_json::from_str(strip_code_fence(reply))?;
    Self::validate(wire)
  }

  fn validate(wire: RecordWire) -> Result<Self> {
    let name = wire.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
      return Err(Error::MissingRecipeName);
    }

    let mut ingredients: Vec<DraftIngredient> = Vec::new();
    for entry in wire.ingredients {
      let ing_name = entry.name.as_deref().map(str::trim).unwrap_or_default();
      if ing_name.is_empty() {
        continue;
      }
      let quantity = entry.quantity.unwrap_or(0.0);
      if !quantity.is_finite() || quantity < 0.0 {
        return Err(Error::InvalidQuantity {
          ingredient: ing_name.to_owned(),
          quantity,
        });
      }

      let key = ing_name.to_lowercase();
      if let Some(existing) =
        ingredients.iter_mut().find(|i| i.name.to_lowercase() == key)
      {
        existing.quantity += quantity;
        continue;
      }

      let unit = entry.unit.as_deref().map(str::trim).unwrap_or_default();
      ingredients.push(DraftIngredient {
        name: ing_name.to_owned(),
        quantity,
        unit: if unit.is_empty() { DEFAULT_UNIT } else { unit }.to_owned(),
      });
    }

    let steps = wire
      .steps
      .iter()
      .map(|s| s.trim())
      .filter(|s| !s.is_empty())
      .map(str::to_owned)
      .collect();

    Ok(Self {
      name: name.to_owned(),
      difficulty: Difficulty::parse_lenient(wire.difficulty.as_deref()),
      ingredients,
      steps,
    })
  }
}

/// Remove a surrounding Markdown code fence (with or without a `json` info
/// string) from a model reply.
pub fn strip_code_fence(reply: &str) -> &str {
  let trimmed = reply.trim();
  let Some(body) = trimmed.strip_prefix("```") else {
    return trimmed;
  };
  let body = body.strip_suffix("```").unwrap_or(body);
  let body = match body.get(..4) {
    Some(tag) if tag.eq_ignore_ascii_case("json") => &body[4..],
    _ => body,
  };
  body.trim()
}
