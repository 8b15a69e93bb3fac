//! SQL schema for the ChefBot SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id     INTEGER PRIMARY KEY,   -- messaging platform user id
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS ingredients (
    ingredient_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL UNIQUE COLLATE NOCASE,
    unit          TEXT NOT NULL DEFAULT 'unit'
);

CREATE TABLE IF NOT EXISTS recipes (
    recipe_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE COLLATE NOCASE,
    difficulty  TEXT NOT NULL DEFAULT 'easy'
                CHECK (difficulty IN ('easy', 'medium', 'hard')),
    source_url  TEXT
);

CREATE TABLE IF NOT EXISTS recipe_ingredients (
    recipe_id     INTEGER NOT NULL REFERENCES recipes(recipe_id),
    ingredient_id INTEGER NOT NULL REFERENCES ingredients(ingredient_id),
    quantity      REAL NOT NULL DEFAULT 0 CHECK (quantity >= 0),
    note          TEXT,
    PRIMARY KEY (recipe_id, ingredient_id)
);

CREATE TABLE IF NOT EXISTS recipe_steps (
    recipe_id   INTEGER NOT NULL REFERENCES recipes(recipe_id),
    step_no     INTEGER NOT NULL CHECK (step_no >= 1),
    description TEXT NOT NULL,
    PRIMARY KEY (recipe_id, step_no)
);

-- Append-only. No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS view_history (
    history_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(user_id),
    recipe_id   INTEGER NOT NULL REFERENCES recipes(recipe_id),
    viewed_at   TEXT NOT NULL,   -- RFC 3339 UTC, fixed width
    note        TEXT
);

CREATE TABLE IF NOT EXISTS ratings (
    user_id     INTEGER NOT NULL REFERENCES users(user_id),
    recipe_id   INTEGER NOT NULL REFERENCES recipes(recipe_id),
    score       INTEGER NOT NULL CHECK (score BETWEEN 1 AND 5),
    review      TEXT,
    rated_at    TEXT NOT NULL,
    PRIMARY KEY (user_id, recipe_id)
);

CREATE TABLE IF NOT EXISTS restrictions (
    user_id       INTEGER NOT NULL REFERENCES users(user_id),
    ingredient_id INTEGER NOT NULL REFERENCES ingredients(ingredient_id),
    kind          TEXT NOT NULL DEFAULT 'avoid'
                  CHECK (kind IN ('avoid', 'allergy')),
    note          TEXT,
    created_at    TEXT NOT NULL,
    PRIMARY KEY (user_id, ingredient_id)
);

CREATE INDEX IF NOT EXISTS view_history_user_idx
    ON view_history(user_id, viewed_at);

PRAGMA user_version = 1;
";
