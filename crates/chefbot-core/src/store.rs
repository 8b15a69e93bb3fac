//! The `Catalog` and `Store` traits.
//!
//! [`Catalog`] is the repository view of one open transaction: synchronous,
//! id-keyed lookups and writes over the records in [`crate::recipe`] and
//! [`crate::user`]. [`Store`] opens such a transaction for one unit of work
//! and commits it only if the work succeeds.
//!
//! Storage backends (e.g. `chefbot-store-sqlite`) implement both. Everything
//! else depends on these abstractions, not on a concrete backend.

use std::future::Future;

use crate::{
  recipe::{
    Difficulty, Ingredient, IngredientId, IngredientLine, NewRecipe, Recipe,
    RecipeId, Step,
  },
  user::{
    HistoryEntry, NewHistoryEntry, Rating, Restriction, RestrictionEntry,
    RestrictionKind, UserId,
  },
};

/// Errors raised by a storage backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `true` if the failure is a uniqueness violation, i.e. the row being
  /// inserted already exists.
  fn is_conflict(&self) -> bool;
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// Repository access inside one transaction.
///
/// "Not found" is never an error: single lookups return `None` and searches
/// return an empty vector.
pub trait Catalog {
  type Error: StoreError;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create the user row if it does not exist. Returns `true` if created.
  fn ensure_user(&self, user: UserId) -> Result<bool, Self::Error>;

  // ── Recipes ───────────────────────────────────────────────────────────

  /// The whole catalog, ordered by id.
  fn list_recipes(&self) -> Result<Vec<Recipe>, Self::Error>;

  fn count_recipes(&self) -> Result<usize, Self::Error>;

  fn get_recipe(&self, id: RecipeId) -> Result<Option<Recipe>, Self::Error>;

  /// Case-insensitive exact name lookup.
  fn find_recipe_by_name(
    &self,
    name: &str,
  ) -> Result<Option<Recipe>, Self::Error>;

  fn insert_recipe(&self, recipe: &NewRecipe) -> Result<Recipe, Self::Error>;

  /// Update difficulty, and the provenance when one is given.
  fn update_recipe(
    &self,
    id: RecipeId,
    difficulty: Difficulty,
    source_url: Option<&str>,
  ) -> Result<(), Self::Error>;

  /// Delete every ingredient link and step of a recipe.
  fn clear_recipe_components(&self, id: RecipeId) -> Result<(), Self::Error>;

  /// Ingredient links joined with their ingredients, ordered by name.
  fn recipe_ingredients(
    &self,
    id: RecipeId,
  ) -> Result<Vec<IngredientLine>, Self::Error>;

  /// Steps ordered by `step_no`.
  fn recipe_steps(&self, id: RecipeId) -> Result<Vec<Step>, Self::Error>;

  fn add_recipe_ingredient(
    &self,
    recipe: RecipeId,
    ingredient: IngredientId,
    quantity: f64,
    note: Option<&str>,
  ) -> Result<(), Self::Error>;

  fn add_step(
    &self,
    recipe: RecipeId,
    step_no: u32,
    description: &str,
  ) -> Result<(), Self::Error>;

  // ── Ingredients ───────────────────────────────────────────────────────

  /// Case-insensitive exact name lookup.
  fn find_ingredient_by_name(
    &self,
    name: &str,
  ) -> Result<Option<Ingredient>, Self::Error>;

  /// Ingredients whose name contains `fragment`, case-insensitively,
  /// ordered by name.
  fn search_ingredients(
    &self,
    fragment: &str,
  ) -> Result<Vec<Ingredient>, Self::Error>;

  fn insert_ingredient(
    &self,
    name: &str,
    unit: &str,
  ) -> Result<Ingredient, Self::Error>;

  // ── Restrictions ──────────────────────────────────────────────────────

  /// All of a user's restrictions, ordered by ingredient name.
  fn list_restrictions(
    &self,
    user: UserId,
  ) -> Result<Vec<RestrictionEntry>, Self::Error>;

  fn get_restriction(
    &self,
    user: UserId,
    ingredient: IngredientId,
  ) -> Result<Option<Restriction>, Self::Error>;

  /// Fails with a conflict error if the pair already exists.
  fn insert_restriction(
    &self,
    restriction: &Restriction,
  ) -> Result<(), Self::Error>;

  fn set_restriction_kind(
    &self,
    user: UserId,
    ingredient: IngredientId,
    kind: RestrictionKind,
  ) -> Result<(), Self::Error>;

  /// Delete the user's restrictions on any of `ingredients`; returns the
  /// number of rows removed.
  fn delete_restrictions(
    &self,
    user: UserId,
    ingredients: &[IngredientId],
  ) -> Result<usize, Self::Error>;

  // ── Ratings ───────────────────────────────────────────────────────────

  fn get_rating(
    &self,
    user: UserId,
    recipe: RecipeId,
  ) -> Result<Option<Rating>, Self::Error>;

  /// Fails with a conflict error if the pair already exists.
  fn insert_rating(&self, rating: &Rating) -> Result<(), Self::Error>;

  fn update_rating(&self, rating: &Rating) -> Result<(), Self::Error>;

  // ── History ───────────────────────────────────────────────────────────

  /// Append a view record. History rows are never updated or deleted.
  fn append_history(&self, entry: &NewHistoryEntry) -> Result<(), Self::Error>;

  /// The user's most recent views, newest first.
  fn recent_history(
    &self,
    user: UserId,
    limit: usize,
  ) -> Result<Vec<HistoryEntry>, Self::Error>;
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A storage backend that runs units of work as transactions.
///
/// The work closure runs synchronously on the backend's own thread. Its
/// effects are committed if it returns `Ok` and rolled back if it returns
/// `Err`, so a failed unit of work leaves no partial state behind.
pub trait Store: Send + Sync {
  type Error: StoreError;

  fn transact<T, F>(
    &self,
    work: F,
  ) -> impl Future<Output = Result<T, Self::Error>> + Send + '_
  where
    T: Send + 'static,
    F: FnOnce(&dyn Catalog<Error = Self::Error>) -> Result<T, Self::Error>
      + Send
      + 'static;
}
