//! Rating upsert, shared by `/rating` and the rating buttons.
//!
//! `/rating` sets the score and the review together, so omitting the review
//! clears it. A button press carries only a score and leaves the stored
//! review alone.

use crate::{
  command::RatingRequest,
  recipe::{Recipe, RecipeId},
  store::{Catalog, StoreError},
  user::{Rating, Score, UserId},
};

#[derive(Debug, Clone, PartialEq)]
pub enum RatingOutcome {
  Saved { recipe: Recipe, score: Score },
  Updated { recipe: Recipe, score: Score },
  /// The recipe id does not resolve; nothing was written.
  UnknownRecipe(RecipeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Review<'a> {
  Replace(Option<&'a str>),
  Keep,
}

/// Insert or overwrite the user's rating and review for a recipe.
pub fn rate<C: Catalog + ?Sized>(
  catalog: &C,
  user: UserId,
  request: &RatingRequest,
) -> Result<RatingOutcome, C::Error> {
  upsert(
    catalog,
    user,
    request.recipe_id,
    request.score,
    Review::Replace(request.review.as_deref()),
  )
}

/// Insert or overwrite the user's score for a recipe, keeping any stored
/// review.
pub fn rate_score<C: Catalog + ?Sized>(
  catalog: &C,
  user: UserId,
  recipe_id: RecipeId,
  score: Score,
) -> Result<RatingOutcome, C::Error> {
  upsert(catalog, user, recipe_id, score, Review::Keep)
}

fn upsert<C: Catalog + ?Sized>(
  catalog: &C,
  user: UserId,
  recipe_id: RecipeId,
  score: Score,
  review: Review<'_>,
) -> Result<RatingOutcome, C::Error> {
  let Some(recipe) = catalog.get_recipe(recipe_id)? else {
    return Ok(RatingOutcome::UnknownRecipe(recipe_id));
  };
  catalog.ensure_user(user)?;

  let mut rating = Rating {
    user_id: user,
    recipe_id: recipe.id,
    score,
    review: match review {
      Review::Replace(text) => text.map(str::to_owned),
      Review::Keep => None,
    },
  };

  if let Some(existing) = catalog.get_rating(user, recipe.id)? {
    if review == Review::Keep {
      rating.review = existing.review;
    }
    catalog.update_rating(&rating)?;
    return Ok(RatingOutcome::Updated { recipe, score });
  }

  match catalog.insert_rating(&rating) {
    Ok(()) => Ok(RatingOutcome::Saved { recipe, score }),
    // Another turn inserted the row after our read.
    Err(e) if e.is_conflict() => {
      if review == Review::Keep {
        rating.review = catalog
          .get_rating(user, recipe.id)?
          .and_then(|r| r.review);
      }
      catalog.update_rating(&rating)?;
      Ok(RatingOutcome::Updated { recipe, score })
    }
    Err(e) => Err(e),
  }
}
