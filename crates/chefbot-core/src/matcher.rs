//! Relevance scoring of free text against recipe names.

use std::collections::HashSet;

use crate::{normalize, recipe::Recipe};

/// Awarded when the normalized query equals the normalized name.
pub const EXACT_BONUS: u32 = 1000;
/// Awarded per distinct token shared by query and name.
pub const TOKEN_BONUS: u32 = 20;
/// Awarded when either normalized string contains the other.
pub const CONTAINMENT_BONUS: u32 = 50;

pub const DEFAULT_LIMIT: usize = 3;

/// A scored catalog entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'r> {
  pub recipe: &'r Recipe,
  pub score:  u32,
}

/// A query folded once and scored against many names.
#[derive(Debug, Clone)]
pub struct Query {
  text:   String,
  tokens: HashSet<String>,
}

impl Query {
  pub fn new(raw: &str) -> Self {
    let tokens = normalize::tokens(raw);
    Self {
      text:   tokens.join(" "),
      tokens: tokens.into_iter().collect(),
    }
  }

  pub fn is_empty(&self) -> bool { self.text.is_empty() }

  pub fn score(&self, name: &str) -> u32 {
    let name_tokens = normalize::tokens(name);
    if self.is_empty() || name_tokens.is_empty() {
      return 0;
    }
    let name_text = name_tokens.join(" ");
    let shared = name_tokens
      .iter()
      .collect::<HashSet<_>>()
      .into_iter()
      .filter(|t| self.tokens.contains(*t))
      .count() as u32;

    let mut score = TOKEN_BONUS * shared;
    if name_text == self.text {
      score += EXACT_BONUS;
    }
    if name_text.contains(&self.text) || self.text.contains(&name_text) {
      score += CONTAINMENT_BONUS;
    }
    score
  }
}

/// Ranks recipes for a query and keeps the best `limit`.
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
  limit: usize,
}

impl Default for Matcher {
  fn default() -> Self { Self { limit: DEFAULT_LIMIT } }
}

impl Matcher {
  pub fn new(limit: usize) -> Self { Self { limit } }

  pub fn limit(&self) -> usize { self.limit }

  /// Score every recipe, drop zero scores, and order by descending score
  /// then case-insensitive name.
  pub fn rank<'r>(&self, query: &str, recipes: &'r [Recipe]) -> Vec<Match<'r>> {
    let query = Query::new(query);
    if query.is_empty() {
      return Vec::new();
    }

    let mut matches: Vec<(Match<'r>, String)> = recipes
      .iter()
      .map(|recipe| Match { recipe, score: query.score(&recipe.name) })
      .filter(|m| m.score > 0)
      .map(|m| (m, m.recipe.name.to_lowercase()))
      .collect();

    matches.sort_by(|(a, a_key), (b, b_key)| {
      b.score
        .cmp(&a.score)
        .then_with(|| a_key.cmp(b_key))
        .then_with(|| a.recipe.id.cmp(&b.recipe.id))
    });

    matches.into_iter().take(self.limit).map(|(m, _)| m).collect()
  }
}
