//! Prompt construction for the assistant.

use std::fmt::Write as _;

use crate::{answer::Lookup, draft::RECORD_SHAPE};

/// How much of a fetched page is passed to the assistant.
pub const PAGE_HTML_MAX_CHARS: usize = 12_000;

/// The catalog context for a free-text answer: each matched recipe with its
/// ingredients (tagged with the user's restrictions) and numbered steps.
/// Empty when nothing matched.
pub fn menu_context(lookup: &Lookup) -> String {
  let mut out = String::new();
  for detail in &lookup.matches {
    let recipe = &detail.recipe;
    let _ = write!(
      out,
      "Recipe ID: {} | Name: {} | Difficulty: {}",
      recipe.id, recipe.name, recipe.difficulty
    );
    if let Some(url) = &recipe.source_url {
      let _ = write!(out, " | Source: {url}");
    }
    out.push_str("\nIngredients:\n");
    for line in &detail.ingredients {
      let _ = write!(
        out,
        "- {} {} {}",
        line.quantity, line.ingredient.unit, line.ingredient.name
      );
      if let Some(entry) = lookup.restriction_for(line.ingredient.id) {
        let _ = write!(out, " [USER_RESTRICTION:{}", entry.kind);
        if let Some(note) = &entry.note {
          let _ = write!(out, ", note: {note}");
        }
        out.push(']');
      }
      out.push('\n');
    }
    out.push_str("Steps:\n");
    for step in &detail.steps {
      let _ = writeln!(out, "{}. {}", step.step_no, step.description);
    }
    out.push('\n');
  }
  out.trim_end().to_owned()
}

/// The conversational answer prompt.
pub fn chef_answer(user_text: &str, menu_context: &str) -> String {
  format!(
    "You are ChefBot. Answer briefly, clearly and in a structured way, in \
     the user's language. Do not answer anything unrelated to cooking or \
     food. Respect any USER_RESTRICTION tags and suggest substitutes.\n\n\
     RECIPE DATABASE:\n{menu_context}\n\n\
     USER: {user_text}\n\
     If a recipe is requested, give the ingredients (with reasonable \
     amounts) and the steps in order."
  )
}

/// Ask for one recipe record built from a free-text description.
pub fn recipe_from_description(instruction: &str) -> String {
  format!(
    "Create one recipe and return it as JSON only, with exactly this \
     shape:\n{RECORD_SHAPE}\n\
     User instruction: {instruction}"
  )
}

/// Ask for the main recipe on a web page as one recipe record. The HTML is
/// cut to [`PAGE_HTML_MAX_CHARS`].
pub fn recipe_from_page(url: &str, html: &str) -> String {
  let html: String = html.chars().take(PAGE_HTML_MAX_CHARS).collect();
  format!(
    "Extract the ONE main recipe from the HTML below and return it as JSON \
     only, with exactly this shape:\n{RECORD_SHAPE}\n\
     URL: {url}\nHTML:\n\"\"\"{html}\"\"\""
  )
}
