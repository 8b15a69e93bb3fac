//! Resolving a free-text query against the catalog.

use std::collections::HashMap;

use crate::{
  matcher::Matcher,
  recipe::{IngredientId, Recipe, RecipeDetail},
  store::Catalog,
  user::{RestrictionEntry, UserId},
};

/// The user's restrictions keyed by ingredient.
pub type RestrictionMap = HashMap<IngredientId, RestrictionEntry>;

/// The best matches for a query, with their components loaded, and the
/// restrictions of the asking user.
#[derive(Debug, Clone)]
pub struct Lookup {
  pub matches:      Vec<RecipeDetail>,
  pub restrictions: RestrictionMap,
}

/// One matched recipe that uses ingredients the user restricts.
#[derive(Debug, Clone, PartialEq)]
pub struct RestrictionWarning<'a> {
  pub recipe: &'a Recipe,
  /// In the recipe's ingredient order, each ingredient once.
  pub hits:   Vec<&'a RestrictionEntry>,
}

impl Lookup {
  /// The highest-ranked match.
  pub fn primary(&self) -> Option<&Recipe> {
    self.matches.first().map(|d| &d.recipe)
  }

  pub fn restriction_for(&self, id: IngredientId) -> Option<&RestrictionEntry> {
    self.restrictions.get(&id)
  }

  /// Matched recipes containing restricted ingredients, in match order.
  pub fn warnings(&self) -> Vec<RestrictionWarning<'_>> {
    if self.restrictions.is_empty() {
      return Vec::new();
    }
    self
      .matches
      .iter()
      .filter_map(|detail| {
        let mut hits: Vec<&RestrictionEntry> = Vec::new();
        for line in &detail.ingredients {
          let Some(entry) = self.restrictions.get(&line.ingredient.id) else {
            continue;
          };
          if !hits.iter().any(|h| h.ingredient.id == entry.ingredient.id) {
            hits.push(entry);
          }
        }
        (!hits.is_empty()).then_some(RestrictionWarning {
          recipe: &detail.recipe,
          hits,
        })
      })
      .collect()
  }
}

/// Rank the catalog against `text` and load everything needed to answer.
pub fn lookup<C: Catalog + ?Sized>(
  catalog: &C,
  user: UserId,
  text: &str,
  matcher: &Matcher,
) -> Result<Lookup, C::Error> {
  let recipes = catalog.list_recipes()?;
  let ranked = matcher.rank(text, &recipes);

  let mut matches = Vec::with_capacity(ranked.len());
  for m in ranked {
    matches.push(RecipeDetail {
      recipe:      m.recipe.clone(),
      ingredients: catalog.recipe_ingredients(m.recipe.id)?,
      steps:       catalog.recipe_steps(m.recipe.id)?,
    });
  }

  let restrictions = catalog
    .list_restrictions(user)?
    .into_iter()
    .map(|entry| (entry.ingredient.id, entry))
    .collect();

  Ok(Lookup {
    matches,
    restrictions,
  })
}
