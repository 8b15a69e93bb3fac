//! Error type for `chefbot-store-sqlite`.

use chefbot_core::store::StoreError;
use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] chefbot_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("stored score out of range: {0}")]
  InvalidScore(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl StoreError for Error {
  fn is_conflict(&self) -> bool {
    match self {
      Self::Sqlite(e) | Self::Database(tokio_rusqlite::Error::Rusqlite(e)) => {
        is_uniqueness_violation(e)
      }
      _ => false,
    }
  }
}

fn is_uniqueness_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(failure, _)
      if failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        || failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}
