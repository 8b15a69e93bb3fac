//! Per-user records: restrictions, ratings, and view history.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  recipe::{Ingredient, IngredientId, RecipeId},
};

/// The messaging platform's user identifier.
pub type UserId = i64;

/// Longest history note kept, in characters.
pub const HISTORY_NOTE_MAX_CHARS: usize = 180;

// ─── Restrictions ────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RestrictionKind {
  #[default]
  Avoid,
  Allergy,
}

impl RestrictionKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Avoid => "avoid",
      Self::Allergy => "allergy",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "avoid" => Ok(Self::Avoid),
      "allergy" => Ok(Self::Allergy),
      other => Err(Error::UnknownRestrictionKind(other.to_owned())),
    }
  }

  /// Recognise a user-typed kind word, in English or Indonesian.
  pub fn from_token(token: &str) -> Option<Self> {
    match token.to_lowercase().as_str() {
      "avoid" | "pantangan" => Some(Self::Avoid),
      "allergy" | "alergi" => Some(Self::Allergy),
      _ => None,
    }
  }
}

impl fmt::Display for RestrictionKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restriction {
  pub user_id:       UserId,
  pub ingredient_id: IngredientId,
  pub kind:          RestrictionKind,
  pub note:          Option<String>,
}

/// A restriction joined with its ingredient, as listed to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestrictionEntry {
  pub ingredient: Ingredient,
  pub kind:       RestrictionKind,
  pub note:       Option<String>,
}

// ─── Ratings ─────────────────────────────────────────────────────────────────

/// A rating score, always within `1..=5`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
  pub const MIN: i64 = 1;
  pub const MAX: i64 = 5;

  /// `None` when `value` is outside `1..=5`.
  pub fn new(value: i64) -> Option<Self> {
    (Self::MIN..=Self::MAX)
      .contains(&value)
      .then(|| Self(value as u8))
  }

  pub fn get(self) -> u8 { self.0 }
}

impl fmt::Display for Score {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
  pub user_id:   UserId,
  pub recipe_id: RecipeId,
  pub score:     Score,
  pub review:    Option<String>,
}

// ─── History ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::Catalog::append_history`]. The timestamp is set
/// by the store.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
  pub user_id:   UserId,
  pub recipe_id: RecipeId,
  pub note:      Option<String>,
}

impl NewHistoryEntry {
  /// Record a view, keeping at most [`HISTORY_NOTE_MAX_CHARS`] of the
  /// triggering text.
  pub fn new(user_id: UserId, recipe_id: RecipeId, text: &str) -> Self {
    let note: String = text.chars().take(HISTORY_NOTE_MAX_CHARS).collect();
    Self {
      user_id,
      recipe_id,
      note: (!note.is_empty()).then_some(note),
    }
  }
}

/// A history row joined with its recipe name and the user's current score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub recipe_id:   RecipeId,
  pub recipe_name: String,
  pub viewed_at:   DateTime<Utc>,
  pub score:       Option<Score>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn score_bounds() {
    assert!(Score::new(0).is_none());
    assert!(Score::new(6).is_none());
    assert!(Score::new(-3).is_none());
    assert_eq!(Score::new(1).map(Score::get), Some(1));
    assert_eq!(Score::new(5).map(Score::get), Some(5));
  }

  #[test]
  fn kind_tokens_in_both_languages() {
    assert_eq!(RestrictionKind::from_token("alergi"), Some(RestrictionKind::Allergy));
    assert_eq!(RestrictionKind::from_token("ALLERGY"), Some(RestrictionKind::Allergy));
    assert_eq!(RestrictionKind::from_token("pantangan"), Some(RestrictionKind::Avoid));
    assert_eq!(RestrictionKind::from_token("udang"), None);
  }

  #[test]
  fn history_note_is_truncated_by_chars() {
    let text = "é".repeat(200);
    let entry = NewHistoryEntry::new(1, 2, &text);
    assert_eq!(entry.note.unwrap().chars().count(), HISTORY_NOTE_MAX_CHARS);
  }
}
