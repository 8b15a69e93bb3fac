//! Saving a validated [`RecipeDraft`] into the catalog.
//!
//! A draft whose name matches an existing recipe (ignoring case) replaces
//! that recipe's ingredients and steps wholesale; otherwise a new recipe is
//! inserted. Run inside one [`crate::store::Store::transact`] call so a
//! failure part-way leaves the catalog untouched.

use crate::{
  draft::RecipeDraft,
  recipe::{NewRecipe, Recipe},
  restrictions::find_or_create_ingredient_with_unit,
  store::{Catalog, StoreError},
};

/// Provenance recorded for recipes created from a description.
pub const ASSISTANT_SOURCE: &str = "assistant:/addmenu";

#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
  pub recipe:  Recipe,
  /// `true` for a new recipe, `false` when an existing one was replaced.
  pub created: bool,
}

/// Upsert `draft`. `source_url` overwrites the stored provenance only when
/// given.
pub fn ingest<C: Catalog + ?Sized>(
  catalog: &C,
  draft: &RecipeDraft,
  source_url: Option<&str>,
) -> Result<Ingested, C::Error> {
  let (recipe, created) = match catalog.find_recipe_by_name(&draft.name)? {
    Some(existing) => (replace(catalog, existing, draft, source_url)?, false),
    None => {
      let new = NewRecipe {
        name:       draft.name.clone(),
        difficulty: draft.difficulty,
        source_url: source_url.map(str::to_owned),
      };
      match catalog.insert_recipe(&new) {
        Ok(recipe) => (recipe, true),
        Err(e) if e.is_conflict() => {
          let Some(existing) = catalog.find_recipe_by_name(&draft.name)? else {
            return Err(e);
          };
          (replace(catalog, existing, draft, source_url)?, false)
        }
        Err(e) => return Err(e),
      }
    }
  };

  for line in &draft.ingredients {
    let ingredient =
      find_or_create_ingredient_with_unit(catalog, &line.name, &line.unit)?;
    catalog.add_recipe_ingredient(recipe.id, ingredient.id, line.quantity, None)?;
  }
  for (step_no, description) in (1..).zip(&draft.steps) {
    catalog.add_step(recipe.id, step_no, description)?;
  }

  Ok(Ingested { recipe, created })
}

fn replace<C: Catalog + ?Sized>(
  catalog: &C,
  existing: Recipe,
  draft: &RecipeDraft,
  source_url: Option<&str>,
) -> Result<Recipe, C::Error> {
  catalog.update_recipe(existing.id, draft.difficulty, source_url)?;
  catalog.clear_recipe_components(existing.id)?;
  Ok(Recipe {
    difficulty: draft.difficulty,
    source_url: source_url.map(str::to_owned).or(existing.source_url),
    ..existing
  })
}
