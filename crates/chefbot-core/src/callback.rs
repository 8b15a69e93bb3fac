//! Inline-button payloads.

use crate::{
  recipe::RecipeId,
  user::Score,
};

pub const HISTORY: &str = "history";
pub const HELP_FROM_START: &str = "help_from_start";
pub const MANAGE_RESTRICTIONS: &str = "pantang_manage";
pub const VIEW_RESTRICTIONS: &str = "pantang_view";
pub const MENU_LIST: &str = "menu_list";
pub const MENU_ADD: &str = "menu_add";
pub const MENU_ADD_LINK: &str = "menu_add_link";
pub const RECOMMEND: &str = "rekomendasi";

const RATE_PREFIX: &str = "rate:";

/// What a button press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
  History,
  Help,
  ManageRestrictions,
  ViewRestrictions,
  MenuList,
  MenuAdd,
  MenuAddLink,
  Recommend,
  Rate { recipe_id: RecipeId, score: Score },
  /// A well-formed rating payload whose score is outside `1..=5`.
  ScoreOutOfRange,
  /// A `rate:` payload with the wrong field count or non-numeric fields.
  Malformed,
  Unknown,
}

impl CallbackAction {
  pub fn parse(payload: &str) -> Self {
    match payload {
      HISTORY => Self::History,
      HELP_FROM_START => Self::Help,
      MANAGE_RESTRICTIONS => Self::ManageRestrictions,
      VIEW_RESTRICTIONS => Self::ViewRestrictions,
      MENU_LIST => Self::MenuList,
      MENU_ADD => Self::MenuAdd,
      MENU_ADD_LINK => Self::MenuAddLink,
      RECOMMEND => Self::Recommend,
      _ if payload.starts_with(RATE_PREFIX) => Self::parse_rate(payload),
      _ => Self::Unknown,
    }
  }

  fn parse_rate(payload: &str) -> Self {
    let fields: Vec<&str> = payload.split(':').collect();
    let [_, recipe_id, score] = fields.as_slice() else {
      return Self::Malformed;
    };
    let (Ok(recipe_id), Ok(score)) =
      (recipe_id.parse::<RecipeId>(), score.parse::<i64>())
    else {
      return Self::Malformed;
    };
    match Score::new(score) {
      Some(score) => Self::Rate { recipe_id, score },
      None => Self::ScoreOutOfRange,
    }
  }
}

/// The payload of a rating button.
pub fn rate_payload(recipe_id: RecipeId, score: u8) -> String {
  format!("{RATE_PREFIX}{recipe_id}:{score}")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fixed_payloads() {
    assert_eq!(CallbackAction::parse("history"), CallbackAction::History);
    assert_eq!(CallbackAction::parse("rekomendasi"), CallbackAction::Recommend);
    assert_eq!(
      CallbackAction::parse("pantang_view"),
      CallbackAction::ViewRestrictions
    );
    assert_eq!(CallbackAction::parse("whatever"), CallbackAction::Unknown);
    assert_eq!(CallbackAction::parse(""), CallbackAction::Unknown);
  }

  #[test]
  fn rating_payloads() {
    assert_eq!(
      CallbackAction::parse(&rate_payload(12, 4)),
      CallbackAction::Rate {
        recipe_id: 12,
        score:     Score::new(4).unwrap(),
      }
    );
    assert_eq!(CallbackAction::parse("rate:3:6"), CallbackAction::ScoreOutOfRange);
    assert_eq!(CallbackAction::parse("rate:3:0"), CallbackAction::ScoreOutOfRange);
    assert_eq!(CallbackAction::parse("rate:3"), CallbackAction::Malformed);
    assert_eq!(CallbackAction::parse("rate:3:4:5"), CallbackAction::Malformed);
    assert_eq!(CallbackAction::parse("rate:x:4"), CallbackAction::Malformed);
    assert_eq!(CallbackAction::parse("rate:3:"), CallbackAction::Malformed);
  }
}
