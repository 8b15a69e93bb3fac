//! Dietary-restriction management.
//!
//! Ingredient phrases match by case-insensitive substring, so one command
//! may apply to several ingredients ("telur" hits "telur ayam" and "telur
//! bebek"). Adding an unknown phrase creates the ingredient.

use crate::{
  recipe::{DEFAULT_UNIT, Ingredient},
  store::{Catalog, StoreError},
  user::{Restriction, RestrictionEntry, RestrictionKind, UserId},
};

/// Result of [`add`].
#[derive(Debug, Clone, PartialEq)]
pub struct Added {
  pub kind:    RestrictionKind,
  /// Every ingredient the restriction now applies to, ordered by name.
  pub matched: Vec<Ingredient>,
  /// Set when nothing matched and the phrase became a new ingredient.
  pub created: Option<Ingredient>,
  pub added:   usize,
  pub updated: usize,
}

/// Result of [`remove`].
#[derive(Debug, Clone, PartialEq)]
pub struct Removed {
  pub matched: Vec<Ingredient>,
  pub removed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Upsert {
  Inserted,
  Updated,
}

/// The user's restrictions, ordered by ingredient name.
pub fn list<C: Catalog + ?Sized>(
  catalog: &C,
  user: UserId,
) -> Result<Vec<RestrictionEntry>, C::Error> {
  catalog.list_restrictions(user)
}

/// Apply `kind` to every ingredient matching `phrase`.
///
/// Existing restrictions are updated in place and counted as updated even
/// when their kind is unchanged, so repeating a call never adds rows.
pub fn add<C: Catalog + ?Sized>(
  catalog: &C,
  user: UserId,
  phrase: &str,
  kind: RestrictionKind,
) -> Result<Added, C::Error> {
  catalog.ensure_user(user)?;

  let mut matched = catalog.search_ingredients(phrase)?;
  let mut created = None;
  if matched.is_empty() {
    let ingredient = find_or_create_ingredient(catalog, phrase)?;
    created = Some(ingredient.clone());
    matched.push(ingredient);
  }

  let (mut added, mut updated) = (0, 0);
  for ingredient in &matched {
    match upsert(catalog, user, ingredient, kind)? {
      Upsert::Inserted => added += 1,
      Upsert::Updated => updated += 1,
    }
  }

  Ok(Added {
    kind,
    matched,
    created,
    added,
    updated,
  })
}

/// Delete the user's restrictions on every ingredient matching `fragment`.
/// Nothing matching is a normal outcome with zero counts.
pub fn remove<C: Catalog + ?Sized>(
  catalog: &C,
  user: UserId,
  fragment: &str,
) -> Result<Removed, C::Error> {
  let matched = catalog.search_ingredients(fragment)?;
  if matched.is_empty() {
    return Ok(Removed {
      matched,
      removed: 0,
    });
  }
  let ids: Vec<_> = matched.iter().map(|i| i.id).collect();
  let removed = catalog.delete_restrictions(user, &ids)?;
  Ok(Removed { matched, removed })
}

fn upsert<C: Catalog + ?Sized>(
  catalog: &C,
  user: UserId,
  ingredient: &Ingredient,
  kind: RestrictionKind,
) -> Result<Upsert, C::Error> {
  if let Some(existing) = catalog.get_restriction(user, ingredient.id)? {
    if existing.kind != kind {
      catalog.set_restriction_kind(user, ingredient.id, kind)?;
    }
    return Ok(Upsert::Updated);
  }

  let restriction = Restriction {
    user_id: user,
    ingredient_id: ingredient.id,
    kind,
    note: None,
  };
  match catalog.insert_restriction(&restriction) {
    Ok(()) => Ok(Upsert::Inserted),
    // Another turn inserted the row after our read.
    Err(e) if e.is_conflict() => {
      catalog.set_restriction_kind(user, ingredient.id, kind)?;
      Ok(Upsert::Updated)
    }
    Err(e) => Err(e),
  }
}

/// Case-insensitive exact lookup, creating the ingredient if absent.
pub(crate) fn find_or_create_ingredient<C: Catalog + ?Sized>(
  catalog: &C,
  name: &str,
) -> Result<Ingredient, C::Error> {
  find_or_create_ingredient_with_unit(catalog, name, DEFAULT_UNIT)
}

pub(crate) fn find_or_create_ingredient_with_unit<C: Catalog + ?Sized>(
  catalog: &C,
  name: &str,
  unit: &str,
) -> Result<Ingredient, C::Error> {
  if let Some(found) = catalog.find_ingredient_by_name(name)? {
    return Ok(found);
  }
  match catalog.insert_ingredient(name, unit) {
    Ok(ingredient) => Ok(ingredient),
    Err(e) if e.is_conflict() => match catalog.find_ingredient_by_name(name)? {
      Some(found) => Ok(found),
      None => Err(e),
    },
    Err(e) => Err(e),
  }
}
