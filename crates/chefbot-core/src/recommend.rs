//! Recommendation sampling.

use rand::{Rng, seq::SliceRandom};

use crate::{recipe::Recipe, store::Catalog};

pub const DEFAULT_LIMIT: usize = 5;

/// Up to `limit` distinct recipes drawn uniformly at random from the
/// catalog. An empty catalog yields an empty list.
pub fn recommend<C, R>(
  catalog: &C,
  rng: &mut R,
  limit: usize,
) -> Result<Vec<Recipe>, C::Error>
where
  C: Catalog + ?Sized,
  R: Rng + ?Sized,
{
  let recipes = catalog.list_recipes()?;
  Ok(recipes.choose_multiple(rng, limit).cloned().collect())
}
