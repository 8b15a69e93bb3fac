//! User-facing message texts and button grids.
//!
//! Every string the bot sends lives here, so the dispatchers only decide
//! *which* reply to send.

use std::fmt::Write as _;

use chefbot_core::{
  answer::Lookup,
  callback::{self, rate_payload},
  channel::{Button, Keyboard, Reply},
  command::{RatingRejection, RestrictionUsage},
  ingest::Ingested,
  intent::SmallTalk,
  ratings::RatingOutcome,
  recipe::Recipe,
  restrictions::{Added, Removed},
  user::{HistoryEntry, RestrictionEntry, Score, UserId},
};

pub const ACK_HISTORY_SHOWN: &str = "History shown.";
pub const ACK_THANKS_FOR_RATING: &str = "Thanks for rating!";
pub const ACK_SCORE_OUT_OF_RANGE: &str = "Rating must be 1–5.";

const RESTRICTION_HELP: &str = "- Add: `/pantang tambah <ingredient> \
                                [pantangan|alergi]`\n\
                                - Remove: `/pantang hapus <ingredient>`\n\
                                - List: `/pantang list`";

// ─── Buttons ─────────────────────────────────────────────────────────────────

fn recommend_button() -> Button {
  Button::new("🍲 Recommendations", callback::RECOMMEND)
}

fn history_button() -> Button {
  Button::new("📜 My history", callback::HISTORY)
}

fn menu_list_button() -> Button {
  Button::new("📋 Menu list", callback::MENU_LIST)
}

fn manage_restrictions_button() -> Button {
  Button::new("⚙️ Manage restrictions", callback::MANAGE_RESTRICTIONS)
}

/// Escape user-supplied text for Telegram's legacy Markdown. Only valid
/// outside entities, so escaped text is never wrapped in `*` or backticks.
fn escape(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for c in text.chars() {
    if matches!(c, '_' | '*' | '`' | '[') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped
}

fn column(buttons: impl IntoIterator<Item = Button>) -> Keyboard {
  buttons.into_iter().map(|b| vec![b]).collect()
}

// ─── Static texts ────────────────────────────────────────────────────────────

pub fn start() -> Reply {
  Reply::markdown(
    "Hello! 👋 I'm *ChefBot*.\n\
     Pick a button or send me a dish name or the ingredients you have.",
  )
  .with_keyboard(column([
    Button::new("📖 How to use", callback::HELP_FROM_START),
    recommend_button(),
    Button::new("📜 Recipe history", callback::HISTORY),
    Button::new("⚙️ Manage restrictions/allergies", callback::MANAGE_RESTRICTIONS),
    Button::new("👀 View restrictions/allergies", callback::VIEW_RESTRICTIONS),
    menu_list_button(),
  ]))
}

pub fn help() -> Reply {
  Reply::markdown(format!(
    "*How to use ChefBot* 👩‍🍳\n\n\
     1️⃣ Send a dish name (e.g. `sapi rica rica`, `nasi goreng sosis`).\n\
     2️⃣ Or send the ingredients you have (e.g. `I have eggs, rice, soy \
     sauce`).\n\
     3️⃣ ChefBot answers with a recipe idea and its steps.\n\n\
     Restrictions & allergies:\n{RESTRICTION_HELP}\n\n\
     Rating:\n\
     - `/rating <recipe_id> <1-5> [review]`\n\n\
     Menu:\n\
     - `/menu` for the recipe list\n\
     - `/history` for your history\n\n\
     New recipes:\n\
     - `/addmenu <description>` (via AI when available)\n\
     - `/addmenulink <URL>` (extract from a recipe page)"
  ))
}

pub fn identity(user: UserId) -> Reply {
  Reply::markdown(format!("Your Telegram user ID: `{user}`"))
}

pub fn unknown_command() -> Reply {
  Reply::markdown("Unknown command. Type /help for help.")
}

pub fn unidentified_user() -> Reply {
  Reply::markdown("Sorry, I can't identify your user ID.")
}

pub fn text_only() -> Reply {
  Reply::markdown("For now I can only process text messages.")
}

pub fn empty_text() -> Reply {
  Reply::markdown(
    "Send me a text message, for example a dish name or an ingredient 😊",
  )
}

/// The one reply a turn gets when something failed underneath.
pub fn apology() -> Reply {
  Reply::markdown("Sorry, something went wrong on the server. Please try again shortly.")
}

// ─── History ─────────────────────────────────────────────────────────────────

fn score_label(score: Option<Score>) -> String {
  score.map_or_else(|| "-".to_owned(), |s| format!("{s}/5"))
}

pub fn history(entries: &[HistoryEntry]) -> Reply {
  if entries.is_empty() {
    return Reply::markdown(
      "You haven't looked at any recipes yet.\n\
       Try sending a dish name or an ingredient first 😊",
    );
  }
  let mut text = String::from("*Your latest recipes:*\n");
  for entry in entries {
    let _ = writeln!(
      text,
      "- [{}] {} (⭐ {}, {})",
      entry.recipe_id,
      escape(&entry.recipe_name),
      score_label(entry.score),
      entry.viewed_at.format("%d-%m-%Y %H:%M"),
    );
  }
  text.push_str("\nTo rate manually:\n`/rating <recipe_id> <1-5> [review]`");
  Reply::markdown(text)
}

// ─── Restrictions ────────────────────────────────────────────────────────────

fn restriction_line(entry: &RestrictionEntry) -> String {
  match &entry.note {
    Some(note) => {
      format!("- {} ({}, note: {note})", entry.ingredient.name, entry.kind)
    }
    None => format!("- {} ({})", entry.ingredient.name, entry.kind),
  }
}

pub fn restriction_list(entries: &[RestrictionEntry]) -> Reply {
  if entries.is_empty() {
    return Reply::markdown(
      "You don't have any restrictions or allergies yet.\n\
       Use: `/pantang tambah <ingredient> [pantangan|alergi]`",
    );
  }
  let lines: Vec<String> = entries
    .iter()
    .map(|e| escape(&restriction_line(e)))
    .collect();
  Reply::markdown(format!(
    "*Your restrictions/allergies:*\n{}",
    lines.join("\n")
  ))
}

pub fn manage_restrictions() -> Reply {
  Reply::markdown(format!(
    "*Manage restrictions / allergies*\n\n{RESTRICTION_HELP}"
  ))
}

pub fn restriction_usage(usage: RestrictionUsage) -> Reply {
  Reply::markdown(match usage {
    RestrictionUsage::Add => "Format: `/pantang tambah <ingredient> \
                              [pantangan|alergi]`\n\
                              Example: `/pantang tambah udang alergi`"
      .to_owned(),
    RestrictionUsage::EmptyIngredient => {
      "The ingredient name can't be empty.".to_owned()
    }
    RestrictionUsage::Remove => "Format: `/pantang hapus <ingredient>`".to_owned(),
    RestrictionUsage::Unknown => "Unknown /pantang command.\nUse:\n\
                                  - `/pantang` or `/pantang list`\n\
                                  - `/pantang tambah <ingredient> \
                                  [pantangan|alergi]`\n\
                                  - `/pantang hapus <ingredient>`"
      .to_owned(),
  })
}

pub fn restrictions_added(added: &Added) -> Reply {
  if let (Some(created), [_]) = (&added.created, added.matched.as_slice()) {
    return Reply::markdown(format!(
      "Ingredient {} didn't exist yet, so it was created (unit: {}) and \
       marked as *{}*.",
      escape(&created.name),
      escape(&created.unit),
      added.kind
    ));
  }
  let names: Vec<String> = added.matched.iter().map(|i| escape(&i.name)).collect();
  Reply::markdown(format!(
    "Restriction *{}* applied to {} ingredient(s): {}.\n\
     (added: {}, updated: {})",
    added.kind,
    added.matched.len(),
    names.join(", "),
    added.added,
    added.updated
  ))
}

pub fn restrictions_removed(fragment: &str, removed: &Removed) -> Reply {
  if removed.matched.is_empty() {
    return Reply::markdown(format!(
      "No ingredient matches '{}'.",
      escape(fragment)
    ));
  }
  let names: Vec<String> =
    removed.matched.iter().map(|i| escape(&i.name)).collect();
  Reply::markdown(format!(
    "Restrictions for ({}) removed. (rows deleted: {})",
    names.join(", "),
    removed.removed
  ))
}

// ─── Ratings ─────────────────────────────────────────────────────────────────

pub fn rating_rejected(rejection: RatingRejection) -> Reply {
  Reply::markdown(match rejection {
    RatingRejection::Usage => {
      "Format: `/rating <recipe_id> <1-5> [review]`\n\
       Example: `/rating 3 5 Delicious and easy`"
    }
    RatingRejection::NotNumeric => "The recipe id and the score must be numbers.",
    RatingRejection::ScoreOutOfRange => "The score must be between 1 and 5.",
  })
}

/// Reply to `/rating`.
pub fn rating_saved(outcome: &RatingOutcome) -> Reply {
  Reply::markdown(match outcome {
    RatingOutcome::Saved { recipe, score } => format!(
      "Your rating for {} (ID {}) was saved with a score of *{score}*.",
      escape(&recipe.name),
      recipe.id
    ),
    RatingOutcome::Updated { recipe, score } => format!(
      "Your rating for {} (ID {}) was updated to *{score}*.",
      escape(&recipe.name),
      recipe.id
    ),
    RatingOutcome::UnknownRecipe(id) => format!("Recipe id={id} not found."),
  })
}

/// Reply to a rating button.
pub fn rating_button_saved(outcome: &RatingOutcome) -> Reply {
  Reply::markdown(match outcome {
    RatingOutcome::Saved { recipe, score } => {
      format!("Rating *{score}* for {} saved.", escape(&recipe.name))
    }
    RatingOutcome::Updated { recipe, score } => {
      format!(
        "Your rating for {} was updated to *{score}*.",
        escape(&recipe.name)
      )
    }
    RatingOutcome::UnknownRecipe(_) => "Recipe not found for rating.".to_owned(),
  })
}

/// The follow-up under a free-text answer: one button per score, then
/// history.
pub fn rating_prompt(recipe: &Recipe) -> Reply {
  let star = |score: u8| {
    Button::new(format!("⭐ {score}"), rate_payload(recipe.id, score))
  };
  Reply::markdown(format!(
    "If you try {} (ID {}), rate the dish:",
    escape(&recipe.name),
    recipe.id
  ))
  .with_keyboard(vec![
    vec![star(1), star(2), star(3)],
    vec![star(4), star(5)],
    vec![history_button()],
  ])
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// The catalog in id order, cut after `limit` entries.
pub fn menu_list(recipes: &[Recipe], limit: usize) -> Reply {
  if recipes.is_empty() {
    return Reply::markdown("There are no recipes stored in ChefBot yet.");
  }
  let mut text = String::from("*Recipes in the ChefBot database (by ID):*\n");
  for recipe in recipes.iter().take(limit) {
    let source = recipe
      .source_url
      .as_deref()
      .map(|url| format!(", source: {}", escape(url)))
      .unwrap_or_default();
    let _ = writeln!(
      text,
      "- ID {}: {} (difficulty: {}{source})",
      recipe.id,
      escape(&recipe.name),
      recipe.difficulty
    );
  }
  if recipes.len() > limit {
    let _ = writeln!(text, "... and {} more.", recipes.len() - limit);
  }
  Reply::markdown(text.trim_end())
}

/// The menu list as shown from its button, with the add-recipe actions.
pub fn menu_list_with_actions(recipes: &[Recipe], limit: usize) -> Reply {
  menu_list(recipes, limit).with_keyboard(column([
    Button::new("➕ Add recipe (AI)", callback::MENU_ADD),
    Button::new("➕ Add from link", callback::MENU_ADD_LINK),
  ]))
}

pub fn menu_add_hint() -> Reply {
  Reply::markdown("*Add a recipe with AI*\nSend: `/addmenu <description>`")
}

pub fn menu_add_link_hint() -> Reply {
  Reply::markdown("*Add a recipe from a link*\nSend: `/addmenulink <URL>`")
}

// ─── Recipe ingestion ────────────────────────────────────────────────────────

/// The AI features answer with this before anything else when no assistant
/// is configured.
pub fn ai_disabled(command: &str) -> Reply {
  Reply::markdown(format!(
    "The AI feature is not enabled. Set a Gemini API key to use {command}."
  ))
}

pub fn add_recipe_usage() -> Reply {
  Reply::markdown(
    "Send: `/addmenu <short description>`\n\
     Example: `/addmenu spicy sapi rica rica`",
  )
}

pub fn add_link_usage() -> Reply {
  Reply::markdown("Send: `/addmenulink <URL>`")
}

pub fn invalid_url() -> Reply {
  Reply::markdown("Invalid URL. It must start with http:// or https://")
}

fn ingest_headline(ingested: &Ingested) -> String {
  let what = if ingested.created {
    "New recipe added"
  } else {
    "Existing recipe updated"
  };
  format!("{what} (ID {})", ingested.recipe.id)
}

pub fn recipe_added(ingested: &Ingested) -> Reply {
  let recipe = &ingested.recipe;
  Reply::markdown(format!(
    "{}\n\n*Summary:*\n- Name: {}\n- Difficulty: {}\n\nAsk for it by sending \
     its name.",
    ingest_headline(ingested),
    escape(&recipe.name),
    recipe.difficulty
  ))
}

pub fn recipe_added_from_link(ingested: &Ingested) -> Reply {
  let recipe = &ingested.recipe;
  Reply::markdown(format!(
    "{}\n\n*Summary from link:*\n- Name: {}\n- Difficulty: {}\n- Source: {}",
    ingest_headline(ingested),
    escape(&recipe.name),
    recipe.difficulty,
    escape(recipe.source_url.as_deref().unwrap_or("-"))
  ))
}

pub fn add_recipe_failed() -> Reply {
  Reply::markdown("Sorry, something went wrong while creating or saving the recipe.")
}

pub fn add_link_failed() -> Reply {
  Reply::markdown("Sorry, I couldn't fetch or extract a recipe from that link.")
}

// ─── Conversation ────────────────────────────────────────────────────────────

pub fn recommendations(recipes: &[Recipe]) -> Reply {
  if recipes.is_empty() {
    return Reply::markdown("There are no recipes in the database to recommend yet.");
  }
  let mut text = String::from("Here are some *cooking ideas* for you:\n");
  for recipe in recipes {
    let _ = writeln!(
      text,
      "- [{}] {} (difficulty: {})",
      recipe.id,
      escape(&recipe.name),
      recipe.difficulty
    );
  }
  Reply::markdown(text.trim_end())
    .with_keyboard(column([history_button(), menu_list_button()]))
}

pub fn small_talk(kind: SmallTalk) -> Reply {
  match kind {
    SmallTalk::Greeting => Reply::markdown(
      "Hello! 👋 I'm *ChefBot*.\n\
       What would you like to cook today? Send a dish name or pick a button \
       below.",
    )
    .with_keyboard(column([
      recommend_button(),
      history_button(),
      menu_list_button(),
      manage_restrictions_button(),
    ])),
    SmallTalk::Farewell => Reply::markdown(
      "See you! 👋 Come back whenever you need a cooking idea.",
    )
    .with_keyboard(column([recommend_button(), menu_list_button()])),
    SmallTalk::Thanks => Reply::markdown(
      "You're welcome! 😊 Hope it helps.\n\
       For another idea, tap a button below.",
    )
    .with_keyboard(column([recommend_button(), history_button()])),
  }
}

// ─── Free-text answers ───────────────────────────────────────────────────────

/// The answer body when no assistant is configured.
pub fn database_answer(menu_context: &str) -> String {
  if menu_context.is_empty() {
    "Sorry, I couldn't find a specific recipe in the database for your \
     message."
      .to_owned()
  } else {
    format!("Here is a summary from the database:\n\n{menu_context}")
  }
}

pub fn source_note(url: &str) -> String {
  format!("(Original recipe source: {url})")
}

/// Restriction warnings for the matched recipes, or `None` if there are
/// none. Sent as plain text alongside the answer.
pub fn warnings(lookup: &Lookup) -> Option<String> {
  let warnings = lookup.warnings();
  if warnings.is_empty() {
    return None;
  }
  let blocks: Vec<String> = warnings
    .iter()
    .map(|w| {
      let mut block = format!(
        "⚠️ Restrictions/allergies for {} (ID {}):",
        w.recipe.name, w.recipe.id
      );
      for hit in &w.hits {
        block.push('\n');
        block.push_str(&restriction_line(hit));
      }
      block
    })
    .collect();
  Some(blocks.join("\n\n"))
}

pub fn no_match_hint() -> Reply {
  Reply::markdown(
    "I couldn't find a specific recipe in the database for that request.\n\n\
     Try being more specific, for example:\n\
     - `sapi rica rica`\n\
     - `nasi goreng sosis recipe`\n\
     - `I have eggs, rice and soy sauce`\n\n\
     Or ask for *Recommendations*:",
  )
  .with_keyboard(column([
    recommend_button(),
    history_button(),
    menu_list_button(),
  ]))
}

#[cfg(test)]
mod tests {
  use chefbot_core::{
    recipe::{Difficulty, Ingredient},
    user::RestrictionKind,
  };

  use super::*;

  fn recipe(id: i64, name: &str) -> Recipe {
    Recipe {
      id,
      name: name.into(),
      difficulty: Difficulty::Medium,
      source_url: None,
    }
  }

  fn ingredient(id: i64, name: &str) -> Ingredient {
    Ingredient {
      id,
      name: name.into(),
      unit: "unit".into(),
    }
  }

  #[test]
  fn menu_list_counts_the_remainder() {
    let recipes: Vec<Recipe> =
      (1..=4).map(|id| recipe(id, &format!("Dish {id}"))).collect();
    let reply = menu_list(&recipes, 3);
    assert!(reply.text.contains("- ID 3: Dish 3 (difficulty: medium)"));
    assert!(!reply.text.contains("Dish 4"));
    assert!(reply.text.ends_with("... and 1 more."));

    let all = menu_list(&recipes, 50);
    assert!(!all.text.contains("more."));
  }

  #[test]
  fn rating_prompt_buttons() {
    let reply = rating_prompt(&recipe(3, "Sapi Rica Rica"));
    let payloads: Vec<Vec<&str>> = reply
      .keyboard
      .iter()
      .map(|row| row.iter().map(|b| b.payload.as_str()).collect())
      .collect();
    assert_eq!(payloads, vec![
      vec!["rate:3:1", "rate:3:2", "rate:3:3"],
      vec!["rate:3:4", "rate:3:5"],
      vec!["history"],
    ]);
  }

  #[test]
  fn added_reports_creation_for_a_single_new_ingredient() {
    let udang = ingredient(1, "udang");
    let created = Added {
      kind:    RestrictionKind::Allergy,
      matched: vec![udang.clone()],
      created: Some(udang.clone()),
      added:   1,
      updated: 0,
    };
    assert!(restrictions_added(&created).text.contains("didn't exist yet"));

    let again = Added {
      created: None,
      added: 0,
      updated: 1,
      ..created
    };
    let text = restrictions_added(&again).text;
    assert!(text.contains("1 ingredient(s): udang"));
    assert!(text.contains("(added: 0, updated: 1)"));
  }

  #[test]
  fn user_supplied_names_are_escaped() {
    let kecap = ingredient(2, "kecap_manis");
    let added = Added {
      kind:    RestrictionKind::Avoid,
      matched: vec![kecap.clone(), ingredient(3, "gula *aren*")],
      created: None,
      added:   2,
      updated: 0,
    };
    let text = restrictions_added(&added).text;
    assert!(text.contains("kecap\\_manis, gula \\*aren\\*"));

    let listed = restriction_list(&[RestrictionEntry {
      ingredient: kecap,
      kind:       RestrictionKind::Allergy,
      note:       None,
    }]);
    assert!(listed.text.ends_with("- kecap\\_manis (allergy)"));

    let menu = menu_list(&[Recipe {
      source_url: Some("https://x.example/nasi_goreng".into()),
      ..recipe(1, "Nasi [Goreng]")
    }], 50);
    assert!(menu.text.contains(
      "- ID 1: Nasi \\[Goreng] (difficulty: medium, source: https://x.example/nasi\\_goreng)"
    ));
    assert_eq!(escape("sapi rica rica"), "sapi rica rica");
  }

  #[test]
  fn database_answer_without_context() {
    assert!(database_answer("").starts_with("Sorry"));
    assert!(database_answer("Recipe ID: 1").ends_with("Recipe ID: 1"));
  }
}
