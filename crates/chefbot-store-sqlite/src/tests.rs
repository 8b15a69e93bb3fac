//! Integration tests for `SqliteStore` and the core managers against an
//! in-memory database.

use std::cell::Cell;

use chefbot_core::{
  answer,
  command::RatingRequest,
  draft::RecipeDraft,
  ingest::{self, Ingested},
  matcher::Matcher,
  ratings::{self, RatingOutcome},
  recipe::{
    Difficulty, Ingredient, IngredientId, IngredientLine, NewRecipe, Recipe,
    RecipeId, Step,
  },
  recommend,
  restrictions,
  store::{Catalog, Store, StoreError},
  user::{
    HistoryEntry, NewHistoryEntry, Rating, Restriction, RestrictionEntry,
    RestrictionKind, Score, UserId,
  },
};
use rand::{SeedableRng, rngs::StdRng};

use crate::{Error, SqliteStore};

const USER: i64 = 4242;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn score(n: i64) -> Score { Score::new(n).unwrap() }

async fn seed_recipe(s: &SqliteStore, name: &str) -> Recipe {
  let name = name.to_owned();
  s.transact(move |cat| {
    cat.insert_recipe(&NewRecipe {
      name,
      difficulty: Difficulty::Easy,
      source_url: None,
    })
  })
  .await
  .unwrap()
}

async fn seed_ingredients(s: &SqliteStore, names: &[&str]) {
  let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
  s.transact(move |cat| {
    for name in &names {
      cat.insert_ingredient(name, "butir")?;
    }
    Ok(())
  })
  .await
  .unwrap();
}

// ─── Transactions ────────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_work_is_rolled_back() {
  let s = store().await;

  let result: Result<(), Error> = s
    .transact(|cat| {
      cat.insert_ingredient("garam", "sdt")?;
      // Same name, different case: violates the unique index.
      cat.insert_ingredient("GARAM", "sdt")?;
      Ok(())
    })
    .await;
  let err = result.unwrap_err();
  assert!(err.is_conflict());

  let found = s
    .transact(|cat| cat.find_ingredient_by_name("garam"))
    .await
    .unwrap();
  assert!(found.is_none());
}

#[tokio::test]
async fn ensure_user_creates_once() {
  let s = store().await;
  let (first, second) = s
    .transact(|cat| Ok((cat.ensure_user(USER)?, cat.ensure_user(USER)?)))
    .await
    .unwrap();
  assert!(first);
  assert!(!second);
}

// ─── Restrictions ────────────────────────────────────────────────────────────

#[tokio::test]
async fn restriction_add_creates_ingredient_then_updates() {
  let s = store().await;

  let first = s
    .transact(|cat| {
      restrictions::add(cat, USER, "udang", RestrictionKind::Allergy)
    })
    .await
    .unwrap();
  assert_eq!(first.added, 1);
  assert_eq!(first.updated, 0);
  assert_eq!(first.created.as_ref().map(|i| i.name.as_str()), Some("udang"));
  assert_eq!(first.matched[0].unit, "unit");

  let second = s
    .transact(|cat| {
      restrictions::add(cat, USER, "udang", RestrictionKind::Allergy)
    })
    .await
    .unwrap();
  assert_eq!(second.added, 0);
  assert_eq!(second.updated, 1);
  assert!(second.created.is_none());

  let listed = s
    .transact(|cat| restrictions::list(cat, USER))
    .await
    .unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].ingredient.name, "udang");
  assert_eq!(listed[0].kind, RestrictionKind::Allergy);

  let ingredients = s
    .transact(|cat| cat.search_ingredients("udang"))
    .await
    .unwrap();
  assert_eq!(ingredients.len(), 1);
}

#[tokio::test]
async fn restriction_add_fans_out_over_partial_matches() {
  let s = store().await;
  seed_ingredients(&s, &["telur bebek", "Telur Ayam", "tepung"]).await;

  let added = s
    .transact(|cat| restrictions::add(cat, USER, "telur", RestrictionKind::Avoid))
    .await
    .unwrap();
  let names: Vec<_> = added.matched.iter().map(|i| i.name.as_str()).collect();
  assert_eq!(names, vec!["Telur Ayam", "telur bebek"]);
  assert_eq!(added.added, 2);
  assert!(added.created.is_none());

  // Changing the kind updates in place.
  let changed = s
    .transact(|cat| {
      restrictions::add(cat, USER, "bebek", RestrictionKind::Allergy)
    })
    .await
    .unwrap();
  assert_eq!((changed.added, changed.updated), (0, 1));

  let listed = s
    .transact(|cat| restrictions::list(cat, USER))
    .await
    .unwrap();
  let kinds: Vec<_> = listed.iter().map(|e| e.kind).collect();
  assert_eq!(kinds, vec![RestrictionKind::Avoid, RestrictionKind::Allergy]);
}

#[tokio::test]
async fn restriction_remove_and_no_match() {
  let s = store().await;
  seed_ingredients(&s, &["telur ayam", "telur bebek"]).await;
  s.transact(|cat| restrictions::add(cat, USER, "telur", RestrictionKind::Avoid))
    .await
    .unwrap();

  let removed = s
    .transact(|cat| restrictions::remove(cat, USER, "TELUR"))
    .await
    .unwrap();
  assert_eq!(removed.removed, 2);
  assert_eq!(removed.matched.len(), 2);

  let nothing = s
    .transact(|cat| restrictions::remove(cat, USER, "durian"))
    .await
    .unwrap();
  assert_eq!(nothing.removed, 0);
  assert!(nothing.matched.is_empty());

  assert!(
    s.transact(|cat| restrictions::list(cat, USER))
      .await
      .unwrap()
      .is_empty()
  );
}

#[tokio::test]
async fn like_wildcards_are_literal() {
  let s = store().await;
  seed_ingredients(&s, &["gula 100%", "gula aren"]).await;
  let found = s
    .transact(|cat| cat.search_ingredients("100%"))
    .await
    .unwrap();
  assert_eq!(found.len(), 1);
  let found = s.transact(|cat| cat.search_ingredients("_")).await.unwrap();
  assert!(found.is_empty());
}

#[tokio::test]
async fn duplicate_restriction_insert_is_a_conflict() {
  let s = store().await;
  seed_ingredients(&s, &["kacang"]).await;
  let err = s
    .transact(|cat| {
      cat.ensure_user(USER)?;
      let kacang = cat.find_ingredient_by_name("kacang")?.unwrap();
      let restriction = Restriction {
        user_id:       USER,
        ingredient_id: kacang.id,
        kind:          RestrictionKind::Avoid,
        note:          None,
      };
      cat.insert_restriction(&restriction)?;
      cat.insert_restriction(&restriction)
    })
    .await
    .unwrap_err();
  assert!(err.is_conflict());
}

// ─── Ratings ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn rating_upsert_saves_then_updates() {
  let s = store().await;
  let recipe = seed_recipe(&s, "Sapi Rica Rica").await;
  let id = recipe.id;

  let first = s
    .transact(move |cat| {
      ratings::rate(cat, USER, &RatingRequest {
        recipe_id: id,
        score:     score(4),
        review:    Some("Enak".into()),
      })
    })
    .await
    .unwrap();
  assert!(matches!(first, RatingOutcome::Saved { .. }));

  let second = s
    .transact(move |cat| {
      ratings::rate(cat, USER, &RatingRequest {
        recipe_id: id,
        score:     score(2),
        review:    None,
      })
    })
    .await
    .unwrap();
  assert_eq!(second, RatingOutcome::Updated {
    recipe,
    score: score(2),
  });

  let stored: Rating = s
    .transact(move |cat| cat.get_rating(USER, id))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored.score, score(2));
  assert_eq!(stored.review, None);
}

#[tokio::test]
async fn score_only_rating_keeps_the_review() {
  let s = store().await;
  let id = seed_recipe(&s, "Sapi Rica Rica").await.id;

  let first = s
    .transact(move |cat| ratings::rate_score(cat, USER, id, score(3)))
    .await
    .unwrap();
  assert!(matches!(first, RatingOutcome::Saved { .. }));

  s.transact(move |cat| {
    ratings::rate(cat, USER, &RatingRequest {
      recipe_id: id,
      score:     score(4),
      review:    Some("Pedas".into()),
    })
  })
  .await
  .unwrap();
  let again = s
    .transact(move |cat| ratings::rate_score(cat, USER, id, score(5)))
    .await
    .unwrap();
  assert!(matches!(again, RatingOutcome::Updated { .. }));

  let stored = s
    .transact(move |cat| cat.get_rating(USER, id))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored.score, score(5));
  assert_eq!(stored.review.as_deref(), Some("Pedas"));
}

#[tokio::test]
async fn rating_unknown_recipe_writes_nothing() {
  let s = store().await;
  let outcome = s
    .transact(|cat| {
      ratings::rate(cat, USER, &RatingRequest {
        recipe_id: 7,
        score:     score(5),
        review:    None,
      })
    })
    .await
    .unwrap();
  assert_eq!(outcome, RatingOutcome::UnknownRecipe(7));
  let created = s.transact(|cat| cat.ensure_user(USER)).await.unwrap();
  assert!(created, "rejected rating must not create the user");
}

// ─── Ingestion ───────────────────────────────────────────────────────────────

fn draft(json: &str) -> RecipeDraft { RecipeDraft::from_reply(json).unwrap() }

#[tokio::test]
async fn reingestion_replaces_components() {
  let s = store().await;

  let first = draft(
    r#"{"name":"Nasi Goreng","difficulty":"easy",
        "ingredients":[{"name":"nasi","quantity":2,"unit":"piring"},
                       {"name":"kecap","quantity":1,"unit":"sdm"}],
        "steps":["Panaskan minyak.","Masukkan nasi.","Tambahkan kecap."]}"#,
  );
  let Ingested { recipe, created } = s
    .transact(move |cat| ingest::ingest(cat, &first, Some("https://a.example")))
    .await
    .unwrap();
  assert!(created);

  let second = draft(
    r#"{"name":"nasi goreng","difficulty":"medium",
        "ingredients":[{"name":"Nasi","quantity":3,"unit":"piring"},
                       {"name":"sosis","quantity":2,"unit":""}],
        "steps":["Tumis sosis.","","Masukkan nasi."]}"#,
  );
  let again = s
    .transact(move |cat| ingest::ingest(cat, &second, None))
    .await
    .unwrap();
  assert!(!again.created);
  assert_eq!(again.recipe.id, recipe.id);
  assert_eq!(again.recipe.name, "Nasi Goreng");
  assert_eq!(again.recipe.difficulty, Difficulty::Medium);
  assert_eq!(again.recipe.source_url.as_deref(), Some("https://a.example"));

  let id = recipe.id;
  let (count, stored, lines, steps) = s
    .transact(move |cat| {
      Ok((
        cat.count_recipes()?,
        cat.get_recipe(id)?,
        cat.recipe_ingredients(id)?,
        cat.recipe_steps(id)?,
      ))
    })
    .await
    .unwrap();
  assert_eq!(count, 1);
  assert_eq!(stored, Some(again.recipe));
  let names: Vec<_> = lines.iter().map(|l| l.ingredient.name.as_str()).collect();
  assert_eq!(names, vec!["nasi", "sosis"]);
  assert_eq!(lines[0].quantity, 3.0);
  assert_eq!(lines[1].ingredient.unit, "unit");
  let steps: Vec<_> = steps.iter().map(|s| (s.step_no, s.description.as_str())).collect();
  assert_eq!(steps, vec![(1, "Tumis sosis."), (2, "Masukkan nasi.")]);
}

#[tokio::test]
async fn failed_ingestion_leaves_no_trace() {
  let s = store().await;
  let record = draft(
    r#"{"name":"Soto","ingredients":[{"name":"ayam","quantity":1,"unit":"ekor"}],
        "steps":["Rebus ayam."]}"#,
  );
  let result: Result<(), Error> = s
    .transact(move |cat| {
      ingest::ingest(cat, &record, None)?;
      // A later step of the same turn fails.
      cat.add_step(9999, 1, "orphan")
    })
    .await;
  assert!(result.is_err());

  let (count, ayam) = s
    .transact(|cat| Ok((cat.count_recipes()?, cat.find_ingredient_by_name("ayam")?)))
    .await
    .unwrap();
  assert_eq!(count, 0);
  assert!(ayam.is_none());
}

// ─── History, lookup, recommendations ────────────────────────────────────────

#[tokio::test]
async fn history_is_newest_first_with_scores() {
  let s = store().await;
  let soto = seed_recipe(&s, "Soto Betawi").await;
  let rendang = seed_recipe(&s, "Rendang").await;
  let (soto_id, rendang_id) = (soto.id, rendang.id);

  s.transact(move |cat| {
    cat.ensure_user(USER)?;
    cat.append_history(&NewHistoryEntry::new(USER, soto_id, "soto"))?;
    cat.append_history(&NewHistoryEntry::new(USER, rendang_id, "rendang"))?;
    cat.append_history(&NewHistoryEntry::new(USER, soto_id, "soto lagi"))?;
    ratings::rate(cat, USER, &RatingRequest {
      recipe_id: rendang_id,
      score:     score(5),
      review:    None,
    })?;
    Ok(())
  })
  .await
  .unwrap();

  let history = s
    .transact(|cat| cat.recent_history(USER, 2))
    .await
    .unwrap();
  assert_eq!(history.len(), 2);
  assert_eq!(history[0].recipe_name, "Soto Betawi");
  assert_eq!(history[0].score, None);
  assert_eq!(history[1].recipe_name, "Rendang");
  assert_eq!(history[1].score, Some(score(5)));
  assert!(history[0].viewed_at >= history[1].viewed_at);

  let other = s.transact(|cat| cat.recent_history(1, 5)).await.unwrap();
  assert!(other.is_empty());
}

#[tokio::test]
async fn lookup_loads_matches_and_restrictions() {
  let s = store().await;
  let record = draft(
    r#"{"name":"Udang Saus Padang","ingredients":[
          {"name":"udang","quantity":250,"unit":"gram"},
          {"name":"saus tomat","quantity":3,"unit":"sdm"}],
        "steps":["Kupas udang.","Masak saus."]}"#,
  );
  s.transact(move |cat| {
    ingest::ingest(cat, &record, None)?;
    restrictions::add(cat, USER, "udang", RestrictionKind::Allergy)?;
    Ok(())
  })
  .await
  .unwrap();
  seed_recipe(&s, "Sapi Semur").await;

  let lookup = s
    .transact(|cat| {
      answer::lookup(cat, USER, "resep udang saus padang", &Matcher::default())
    })
    .await
    .unwrap();
  assert_eq!(lookup.matches.len(), 1);
  assert_eq!(lookup.primary().map(|r| r.name.as_str()), Some("Udang Saus Padang"));
  assert_eq!(lookup.matches[0].steps.len(), 2);
  let warnings = lookup.warnings();
  assert_eq!(warnings.len(), 1);
  assert_eq!(warnings[0].hits[0].ingredient.name, "udang");
}

#[tokio::test]
async fn recommendations_are_distinct_and_bounded() {
  let s = store().await;
  for name in ["Soto", "Rendang", "Gado Gado", "Pecel", "Rawon", "Sop Buntut"] {
    seed_recipe(&s, name).await;
  }

  let picked = s
    .transact(|cat| recommend::recommend(cat, &mut StdRng::seed_from_u64(7), 5))
    .await
    .unwrap();
  assert_eq!(picked.len(), 5);
  let mut ids: Vec<_> = picked.iter().map(|r| r.id).collect();
  ids.sort();
  ids.dedup();
  assert_eq!(ids.len(), 5);

  let empty = store().await;
  let none = empty
    .transact(|cat| recommend::recommend(cat, &mut StdRng::seed_from_u64(7), 5))
    .await
    .unwrap();
  assert!(none.is_empty());
}

// ─── Write races ─────────────────────────────────────────────────────────────

/// A catalog whose single-row lookups miss until an insert conflicts, as if
/// another turn committed the row between our read and our write.
struct StaleReads<'a> {
  inner: &'a dyn Catalog<Error = Error>,
  stale: Cell<bool>,
}

impl<'a> StaleReads<'a> {
  fn new(inner: &'a dyn Catalog<Error = Error>) -> Self {
    Self {
      inner,
      stale: Cell::new(true),
    }
  }

  fn read<T>(&self, found: Result<Option<T>, Error>) -> Result<Option<T>, Error> {
    if self.stale.get() { Ok(None) } else { found }
  }

  fn write<T>(&self, result: Result<T, Error>) -> Result<T, Error> {
    if result.as_ref().is_err_and(|e| e.is_conflict()) {
      self.stale.set(false);
    }
    result
  }
}

impl Catalog for StaleReads<'_> {
  type Error = Error;

  fn ensure_user(&self, user: UserId) -> Result<bool, Error> {
    self.inner.ensure_user(user)
  }

  fn list_recipes(&self) -> Result<Vec<Recipe>, Error> { self.inner.list_recipes() }

  fn count_recipes(&self) -> Result<usize, Error> { self.inner.count_recipes() }

  fn get_recipe(&self, id: RecipeId) -> Result<Option<Recipe>, Error> {
    self.inner.get_recipe(id)
  }

  fn find_recipe_by_name(&self, name: &str) -> Result<Option<Recipe>, Error> {
    self.read(self.inner.find_recipe_by_name(name))
  }

  fn insert_recipe(&self, recipe: &NewRecipe) -> Result<Recipe, Error> {
    self.write(self.inner.insert_recipe(recipe))
  }

  fn update_recipe(
    &self,
    id: RecipeId,
    difficulty: Difficulty,
    source_url: Option<&str>,
  ) -> Result<(), Error> {
    self.inner.update_recipe(id, difficulty, source_url)
  }

  fn clear_recipe_components(&self, id: RecipeId) -> Result<(), Error> {
    self.inner.clear_recipe_components(id)
  }

  fn recipe_ingredients(&self, id: RecipeId) -> Result<Vec<IngredientLine>, Error> {
    self.inner.recipe_ingredients(id)
  }

  fn recipe_steps(&self, id: RecipeId) -> Result<Vec<Step>, Error> {
    self.inner.recipe_steps(id)
  }

  fn add_recipe_ingredient(
    &self,
    recipe: RecipeId,
    ingredient: IngredientId,
    quantity: f64,
    note: Option<&str>,
  ) -> Result<(), Error> {
    self.inner.add_recipe_ingredient(recipe, ingredient, quantity, note)
  }

  fn add_step(
    &self,
    recipe: RecipeId,
    step_no: u32,
    description: &str,
  ) -> Result<(), Error> {
    self.inner.add_step(recipe, step_no, description)
  }

  fn find_ingredient_by_name(&self, name: &str) -> Result<Option<Ingredient>, Error> {
    self.read(self.inner.find_ingredient_by_name(name))
  }

  fn search_ingredients(&self, fragment: &str) -> Result<Vec<Ingredient>, Error> {
    self.inner.search_ingredients(fragment)
  }

  fn insert_ingredient(&self, name: &str, unit: &str) -> Result<Ingredient, Error> {
    self.write(self.inner.insert_ingredient(name, unit))
  }

  fn list_restrictions(&self, user: UserId) -> Result<Vec<RestrictionEntry>, Error> {
    self.inner.list_restrictions(user)
  }

  fn get_restriction(
    &self,
    user: UserId,
    ingredient: IngredientId,
  ) -> Result<Option<Restriction>, Error> {
    self.read(self.inner.get_restriction(user, ingredient))
  }

  fn insert_restriction(&self, restriction: &Restriction) -> Result<(), Error> {
    self.write(self.inner.insert_restriction(restriction))
  }

  fn set_restriction_kind(
    &self,
    user: UserId,
    ingredient: IngredientId,
    kind: RestrictionKind,
  ) -> Result<(), Error> {
    self.inner.set_restriction_kind(user, ingredient, kind)
  }

  fn delete_restrictions(
    &self,
    user: UserId,
    ingredients: &[IngredientId],
  ) -> Result<usize, Error> {
    self.inner.delete_restrictions(user, ingredients)
  }

  fn get_rating(&self, user: UserId, recipe: RecipeId) -> Result<Option<Rating>, Error> {
    self.read(self.inner.get_rating(user, recipe))
  }

  fn insert_rating(&self, rating: &Rating) -> Result<(), Error> {
    self.write(self.inner.insert_rating(rating))
  }

  fn update_rating(&self, rating: &Rating) -> Result<(), Error> {
    self.inner.update_rating(rating)
  }

  fn append_history(&self, entry: &NewHistoryEntry) -> Result<(), Error> {
    self.inner.append_history(entry)
  }

  fn recent_history(&self, user: UserId, limit: usize) -> Result<Vec<HistoryEntry>, Error> {
    self.inner.recent_history(user, limit)
  }
}

#[tokio::test]
async fn restriction_insert_race_becomes_an_update() {
  let s = store().await;
  s.transact(|cat| restrictions::add(cat, USER, "kacang", RestrictionKind::Avoid))
    .await
    .unwrap();

  let raced = s
    .transact(|cat| {
      restrictions::add(&StaleReads::new(cat), USER, "kacang", RestrictionKind::Allergy)
    })
    .await
    .unwrap();
  assert_eq!((raced.added, raced.updated), (0, 1));

  let listed = s
    .transact(|cat| restrictions::list(cat, USER))
    .await
    .unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].kind, RestrictionKind::Allergy);
}

#[tokio::test]
async fn rating_insert_race_becomes_an_update() {
  let s = store().await;
  let id = seed_recipe(&s, "Sapi Rica Rica").await.id;
  s.transact(move |cat| {
    ratings::rate(cat, USER, &RatingRequest {
      recipe_id: id,
      score:     score(2),
      review:    Some("Asin".into()),
    })
  })
  .await
  .unwrap();

  let raced = s
    .transact(move |cat| ratings::rate_score(&StaleReads::new(cat), USER, id, score(5)))
    .await
    .unwrap();
  assert!(matches!(raced, RatingOutcome::Updated { .. }));

  let stored = s
    .transact(move |cat| cat.get_rating(USER, id))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored.score, score(5));
  assert_eq!(stored.review.as_deref(), Some("Asin"));
}

#[tokio::test]
async fn recipe_insert_race_replaces_the_existing_recipe() {
  let s = store().await;
  let existing = seed_recipe(&s, "Nasi Goreng").await;

  let record = draft(
    r#"{"name":"nasi goreng","difficulty":"hard",
        "ingredients":[{"name":"nasi","quantity":2,"unit":"piring"}],
        "steps":["Goreng nasi."]}"#,
  );
  let raced = s
    .transact(move |cat| ingest::ingest(&StaleReads::new(cat), &record, None))
    .await
    .unwrap();
  assert!(!raced.created);
  assert_eq!(raced.recipe.id, existing.id);
  assert_eq!(raced.recipe.difficulty, Difficulty::Hard);

  let (count, steps) = s
    .transact(move |cat| Ok((cat.count_recipes()?, cat.recipe_steps(existing.id)?)))
    .await
    .unwrap();
  assert_eq!(count, 1);
  assert_eq!(steps.len(), 1);
}

#[tokio::test]
async fn ingredient_insert_race_reuses_the_existing_row() {
  let s = store().await;
  seed_ingredients(&s, &["Kecap Manis"]).await;
  let kecap = s
    .transact(|cat| cat.find_ingredient_by_name("kecap manis"))
    .await
    .unwrap()
    .unwrap();

  let record = draft(
    r#"{"name":"Ayam Kecap",
        "ingredients":[{"name":"kecap manis","quantity":3,"unit":"sdm"}],
        "steps":["Masak ayam."]}"#,
  );
  let ingested = s
    .transact(move |cat| ingest::ingest(&StaleReads::new(cat), &record, None))
    .await
    .unwrap();
  assert!(ingested.created);

  let id = ingested.recipe.id;
  let (lines, found) = s
    .transact(move |cat| Ok((cat.recipe_ingredients(id)?, cat.search_ingredients("kecap")?)))
    .await
    .unwrap();
  assert_eq!(lines.len(), 1);
  assert_eq!(lines[0].ingredient.id, kecap.id);
  assert_eq!(found.len(), 1);
}
