//! [`SqliteStore`], the SQLite implementation of [`Store`] and [`Catalog`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, params, params_from_iter};

use chefbot_core::{
  recipe::{
    Difficulty, Ingredient, IngredientId, IngredientLine, NewRecipe, Recipe,
    RecipeId, Step,
  },
  store::{Catalog, Store},
  user::{
    HistoryEntry, NewHistoryEntry, Rating, Restriction, RestrictionEntry,
    RestrictionKind, UserId,
  },
};

use crate::{
  Error, Result,
  encode::{
    INGREDIENT_COLUMNS, RECIPE_COLUMNS, RawRecipe, decode_dt, decode_kind,
    decode_score, encode_dt, ingredient_from_row, like_contains,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A ChefBot catalog backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl Store for SqliteStore {
  type Error = Error;

  async fn transact<T, F>(&self, work: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&dyn Catalog<Error = Self::Error>) -> Result<T, Self::Error>
      + Send
      + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let outcome = work(&TxCatalog { conn: &tx });
        // Dropping an uncommitted transaction rolls it back.
        if outcome.is_ok() {
          tx.commit()?;
        }
        Ok(outcome)
      })
      .await?
  }
}

// ─── Catalog impl ────────────────────────────────────────────────────────────

/// The catalog view of one open transaction.
struct TxCatalog<'a> {
  conn: &'a rusqlite::Connection,
}

impl TxCatalog<'_> {
  fn query_recipes(
    &self,
    sql: &str,
    params: impl rusqlite::Params,
  ) -> Result<Vec<Recipe>> {
    let mut stmt = self.conn.prepare_cached(sql)?;
    let raws = stmt
      .query_map(params, RawRecipe::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawRecipe::into_recipe).collect()
  }

  fn query_recipe(
    &self,
    sql: &str,
    params: impl rusqlite::Params,
  ) -> Result<Option<Recipe>> {
    self
      .conn
      .query_row(sql, params, RawRecipe::from_row)
      .optional()?
      .map(RawRecipe::into_recipe)
      .transpose()
  }

  fn query_ingredient(
    &self,
    sql: &str,
    params: impl rusqlite::Params,
  ) -> Result<Option<Ingredient>> {
    Ok(
      self
        .conn
        .query_row(sql, params, |row| ingredient_from_row(row, 0))
        .optional()?,
    )
  }
}

impl Catalog for TxCatalog<'_> {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  fn ensure_user(&self, user: UserId) -> Result<bool> {
    let inserted = self.conn.execute(
      "INSERT OR IGNORE INTO users (user_id, created_at) VALUES (?1, ?2)",
      params![user, encode_dt(Utc::now())],
    )?;
    Ok(inserted == 1)
  }

  // ── Recipes ───────────────────────────────────────────────────────────────

  fn list_recipes(&self) -> Result<Vec<Recipe>> {
    self.query_recipes(
      &format!("SELECT {RECIPE_COLUMNS} FROM recipes ORDER BY recipe_id"),
      [],
    )
  }

  fn count_recipes(&self) -> Result<usize> {
    let count: i64 = self.conn.query_row(
      "SELECT COUNT(*) FROM recipes",
      [],
      |r| r.get(0),
    )?;
    Ok(count as usize)
  }

  fn get_recipe(&self, id: RecipeId) -> Result<Option<Recipe>> {
    self.query_recipe(
      &format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE recipe_id = ?1"),
      params![id],
    )
  }

  fn find_recipe_by_name(&self, name: &str) -> Result<Option<Recipe>> {
    self.query_recipe(
      &format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes WHERE name = ?1 COLLATE NOCASE"
      ),
      params![name],
    )
  }

  fn insert_recipe(&self, recipe: &NewRecipe) -> Result<Recipe> {
    self.conn.execute(
      "INSERT INTO recipes (name, difficulty, source_url) VALUES (?1, ?2, ?3)",
      params![recipe.name, recipe.difficulty.as_str(), recipe.source_url],
    )?;
    Ok(Recipe {
      id:         self.conn.last_insert_rowid(),
      name:       recipe.name.clone(),
      difficulty: recipe.difficulty,
      source_url: recipe.source_url.clone(),
    })
  }

  fn update_recipe(
    &self,
    id: RecipeId,
    difficulty: Difficulty,
    source_url: Option<&str>,
  ) -> Result<()> {
    self.conn.execute(
      "UPDATE recipes
          SET difficulty = ?2,
              source_url = COALESCE(?3, source_url)
        WHERE recipe_id = ?1",
      params![id, difficulty.as_str(), source_url],
    )?;
    Ok(())
  }

  fn clear_recipe_components(&self, id: RecipeId) -> Result<()> {
    self.conn.execute(
      "DELETE FROM recipe_ingredients WHERE recipe_id = ?1",
      params![id],
    )?;
    self.conn.execute(
      "DELETE FROM recipe_steps WHERE recipe_id = ?1",
      params![id],
    )?;
    Ok(())
  }

  fn recipe_ingredients(&self, id: RecipeId) -> Result<Vec<IngredientLine>> {
    let mut stmt = self.conn.prepare_cached(
      "SELECT i.ingredient_id, i.name, i.unit, ri.quantity, ri.note
         FROM recipe_ingredients ri
         JOIN ingredients i ON i.ingredient_id = ri.ingredient_id
        WHERE ri.recipe_id = ?1
        ORDER BY i.name COLLATE NOCASE, i.ingredient_id",
    )?;
    let lines = stmt
      .query_map(params![id], |row| {
        Ok(IngredientLine {
          ingredient: ingredient_from_row(row, 0)?,
          quantity:   row.get(3)?,
          note:       row.get(4)?,
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(lines)
  }

  fn recipe_steps(&self, id: RecipeId) -> Result<Vec<Step>> {
    let mut stmt = self.conn.prepare_cached(
      "SELECT step_no, description FROM recipe_steps
        WHERE recipe_id = ?1 ORDER BY step_no",
    )?;
    let steps = stmt
      .query_map(params![id], |row| {
        Ok(Step {
          step_no:     row.get(0)?,
          description: row.get(1)?,
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(steps)
  }

  fn add_recipe_ingredient(
    &self,
    recipe: RecipeId,
    ingredient: IngredientId,
    quantity: f64,
    note: Option<&str>,
  ) -> Result<()> {
    self.conn.execute(
      "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity, note)
       VALUES (?1, ?2, ?3, ?4)",
      params![recipe, ingredient, quantity, note],
    )?;
    Ok(())
  }

  fn add_step(
    &self,
    recipe: RecipeId,
    step_no: u32,
    description: &str,
  ) -> Result<()> {
    self.conn.execute(
      "INSERT INTO recipe_steps (recipe_id, step_no, description)
       VALUES (?1, ?2, ?3)",
      params![recipe, step_no, description],
    )?;
    Ok(())
  }

  // ── Ingredients ───────────────────────────────────────────────────────────

  fn find_ingredient_by_name(&self, name: &str) -> Result<Option<Ingredient>> {
    self.query_ingredient(
      &format!(
        "SELECT {INGREDIENT_COLUMNS} FROM ingredients
          WHERE name = ?1 COLLATE NOCASE"
      ),
      params![name],
    )
  }

  fn search_ingredients(&self, fragment: &str) -> Result<Vec<Ingredient>> {
    let mut stmt = self.conn.prepare_cached(&format!(
      "SELECT {INGREDIENT_COLUMNS} FROM ingredients
        WHERE name LIKE ?1 ESCAPE '\\'
        ORDER BY name COLLATE NOCASE, ingredient_id"
    ))?;
    let found = stmt
      .query_map(params![like_contains(fragment)], |row| {
        ingredient_from_row(row, 0)
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(found)
  }

  fn insert_ingredient(&self, name: &str, unit: &str) -> Result<Ingredient> {
    self.conn.execute(
      "INSERT INTO ingredients (name, unit) VALUES (?1, ?2)",
      params![name, unit],
    )?;
    Ok(Ingredient {
      id:   self.conn.last_insert_rowid(),
      name: name.to_owned(),
      unit: unit.to_owned(),
    })
  }

  // ── Restrictions ──────────────────────────────────────────────────────────

  fn list_restrictions(&self, user: UserId) -> Result<Vec<RestrictionEntry>> {
    let mut stmt = self.conn.prepare_cached(
      "SELECT i.ingredient_id, i.name, i.unit, r.kind, r.note
         FROM restrictions r
         JOIN ingredients i ON i.ingredient_id = r.ingredient_id
        WHERE r.user_id = ?1
        ORDER BY i.name COLLATE NOCASE, i.ingredient_id",
    )?;
    let raws = stmt
      .query_map(params![user], |row| {
        Ok((
          ingredient_from_row(row, 0)?,
          row.get::<_, String>(3)?,
          row.get::<_, Option<String>>(4)?,
        ))
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    raws
      .into_iter()
      .map(|(ingredient, kind, note)| {
        Ok(RestrictionEntry {
          ingredient,
          kind: decode_kind(&kind)?,
          note,
        })
      })
      .collect()
  }

  fn get_restriction(
    &self,
    user: UserId,
    ingredient: IngredientId,
  ) -> Result<Option<Restriction>> {
    let raw: Option<(String, Option<String>)> = self
      .conn
      .query_row(
        "SELECT kind, note FROM restrictions
          WHERE user_id = ?1 AND ingredient_id = ?2",
        params![user, ingredient],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()?;

    raw
      .map(|(kind, note)| {
        Ok(Restriction {
          user_id: user,
          ingredient_id: ingredient,
          kind: decode_kind(&kind)?,
          note,
        })
      })
      .transpose()
  }

  fn insert_restriction(&self, restriction: &Restriction) -> Result<()> {
    self.conn.execute(
      "INSERT INTO restrictions (user_id, ingredient_id, kind, note, created_at)
       VALUES (?1, ?2, ?3, ?4, ?5)",
      params![
        restriction.user_id,
        restriction.ingredient_id,
        restriction.kind.as_str(),
        restriction.note,
        encode_dt(Utc::now()),
      ],
    )?;
    Ok(())
  }

  fn set_restriction_kind(
    &self,
    user: UserId,
    ingredient: IngredientId,
    kind: RestrictionKind,
  ) -> Result<()> {
    self.conn.execute(
      "UPDATE restrictions SET kind = ?3
        WHERE user_id = ?1 AND ingredient_id = ?2",
      params![user, ingredient, kind.as_str()],
    )?;
    Ok(())
  }

  fn delete_restrictions(
    &self,
    user: UserId,
    ingredients: &[IngredientId],
  ) -> Result<usize> {
    if ingredients.is_empty() {
      return Ok(0);
    }
    let placeholders = vec!["?"; ingredients.len()].join(", ");
    let sql = format!(
      "DELETE FROM restrictions
        WHERE user_id = ? AND ingredient_id IN ({placeholders})"
    );
    let values = std::iter::once(user).chain(ingredients.iter().copied());
    Ok(self.conn.execute(&sql, params_from_iter(values))?)
  }

  // ── Ratings ───────────────────────────────────────────────────────────────

  fn get_rating(&self, user: UserId, recipe: RecipeId) -> Result<Option<Rating>> {
    let raw: Option<(i64, Option<String>)> = self
      .conn
      .query_row(
        "SELECT score, review FROM ratings
          WHERE user_id = ?1 AND recipe_id = ?2",
        params![user, recipe],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()?;

    raw
      .map(|(score, review)| {
        Ok(Rating {
          user_id: user,
          recipe_id: recipe,
          score: decode_score(score)?,
          review,
        })
      })
      .transpose()
  }

  fn insert_rating(&self, rating: &Rating) -> Result<()> {
    self.conn.execute(
      "INSERT INTO ratings (user_id, recipe_id, score, review, rated_at)
       VALUES (?1, ?2, ?3, ?4, ?5)",
      params![
        rating.user_id,
        rating.recipe_id,
        rating.score.get(),
        rating.review,
        encode_dt(Utc::now()),
      ],
    )?;
    Ok(())
  }

  fn update_rating(&self, rating: &Rating) -> Result<()> {
    self.conn.execute(
      "UPDATE ratings SET score = ?3, review = ?4, rated_at = ?5
        WHERE user_id = ?1 AND recipe_id = ?2",
      params![
        rating.user_id,
        rating.recipe_id,
        rating.score.get(),
        rating.review,
        encode_dt(Utc::now()),
      ],
    )?;
    Ok(())
  }

  // ── History ───────────────────────────────────────────────────────────────

  fn append_history(&self, entry: &NewHistoryEntry) -> Result<()> {
    self.conn.execute(
      "INSERT INTO view_history (user_id, recipe_id, viewed_at, note)
       VALUES (?1, ?2, ?3, ?4)",
      params![
        entry.user_id,
        entry.recipe_id,
        encode_dt(Utc::now()),
        entry.note,
      ],
    )?;
    Ok(())
  }

  fn recent_history(
    &self,
    user: UserId,
    limit: usize,
  ) -> Result<Vec<HistoryEntry>> {
    let mut stmt = self.conn.prepare_cached(
      "SELECT h.recipe_id, r.name, h.viewed_at, rt.score
         FROM view_history h
         JOIN recipes r ON r.recipe_id = h.recipe_id
         LEFT JOIN ratings rt
                ON rt.user_id = h.user_id AND rt.recipe_id = h.recipe_id
        WHERE h.user_id = ?1
        ORDER BY h.viewed_at DESC, h.history_id DESC
        LIMIT ?2",
    )?;
    let raws = stmt
      .query_map(params![user, limit as i64], |row| {
        Ok((
          row.get::<_, i64>(0)?,
          row.get::<_, String>(1)?,
          row.get::<_, String>(2)?,
          row.get::<_, Option<i64>>(3)?,
        ))
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    raws
      .into_iter()
      .map(|(recipe_id, recipe_name, viewed_at, score)| {
        Ok(HistoryEntry {
          recipe_id,
          recipe_name,
          viewed_at: decode_dt(&viewed_at)?,
          score: score.map(decode_score).transpose()?,
        })
      })
      .collect()
  }
}
