//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds,
//! `Z` suffix) so they sort lexically. Enums are stored as their lowercase
//! names.

use chefbot_core::{
  recipe::{Difficulty, Ingredient, Recipe},
  user::{RestrictionKind, Score},
};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn decode_score(raw: i64) -> Result<Score> {
  Score::new(raw).ok_or(Error::InvalidScore(raw))
}

pub fn decode_difficulty(s: &str) -> Result<Difficulty> {
  Ok(Difficulty::parse(s)?)
}

pub fn decode_kind(s: &str) -> Result<RestrictionKind> {
  Ok(RestrictionKind::parse(s)?)
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// Column order for every recipe query.
pub const RECIPE_COLUMNS: &str = "recipe_id, name, difficulty, source_url";

/// A `recipes` row before enum decoding.
pub struct RawRecipe {
  pub id:         i64,
  pub name:       String,
  pub difficulty: String,
  pub source_url: Option<String>,
}

impl RawRecipe {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      difficulty: row.get(2)?,
      source_url: row.get(3)?,
    })
  }

  pub fn into_recipe(self) -> Result<Recipe> {
    Ok(Recipe {
      id:         self.id,
      name:       self.name,
      difficulty: decode_difficulty(&self.difficulty)?,
      source_url: self.source_url,
    })
  }
}

/// Column order for every ingredient query.
pub const INGREDIENT_COLUMNS: &str = "ingredient_id, name, unit";

pub fn ingredient_from_row(
  row: &rusqlite::Row<'_>,
  offset: usize,
) -> rusqlite::Result<Ingredient> {
  Ok(Ingredient {
    id:   row.get(offset)?,
    name: row.get(offset + 1)?,
    unit: row.get(offset + 2)?,
  })
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
pub fn like_contains(fragment: &str) -> String {
  let mut pattern = String::with_capacity(fragment.len() + 2);
  pattern.push('%');
  for c in fragment.chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}
