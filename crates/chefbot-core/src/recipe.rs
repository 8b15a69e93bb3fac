//! Catalog records: recipes, ingredients, and the links between them.
//!
//! Records are plain values. Relationships are resolved through
//! [`crate::store::Catalog`] lookups keyed by id; no record holds a reference
//! to another.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub type RecipeId = i64;
pub type IngredientId = i64;

/// Unit assigned to ingredients created without one.
pub const DEFAULT_UNIT: &str = "unit";

// ─── Difficulty ──────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  #[default]
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Easy => "easy",
      Self::Medium => "medium",
      Self::Hard => "hard",
    }
  }

  /// Strict decoding of a stored value.
  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "easy" => Ok(Self::Easy),
      "medium" => Ok(Self::Medium),
      "hard" => Ok(Self::Hard),
      other => Err(Error::UnknownDifficulty(other.to_owned())),
    }
  }

  /// Ingestion-time reading: anything unrecognised falls back to
  /// [`Difficulty::Easy`].
  pub fn parse_lenient(s: Option<&str>) -> Self {
    s.map(|s| s.trim().to_lowercase())
      .and_then(|s| Self::parse(&s).ok())
      .unwrap_or_default()
  }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
  pub id:         RecipeId,
  pub name:       String,
  pub difficulty: Difficulty,
  /// Where the recipe came from: a page URL or an `assistant:` marker.
  pub source_url: Option<String>,
}

/// Input to [`crate::store::Catalog::insert_recipe`].
#[derive(Debug, Clone)]
pub struct NewRecipe {
  pub name:       String,
  pub difficulty: Difficulty,
  pub source_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
  pub id:   IngredientId,
  pub name: String,
  pub unit: String,
}

/// "This much of this ingredient in this recipe", joined with the ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
  pub ingredient: Ingredient,
  pub quantity:   f64,
  pub note:       Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
  /// 1-based position within the recipe.
  pub step_no:     u32,
  pub description: String,
}

/// A recipe with its components loaded, in step order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDetail {
  pub recipe:      Recipe,
  pub ingredients: Vec<IngredientLine>,
  pub steps:       Vec<Step>,
}
