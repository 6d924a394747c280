//! Error type for `campus-store-sqlite`.

use campus_core::store::StoreError;
use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored discriminant did not match any known variant.
  #[error("unknown {column} value: {value:?}")]
  UnknownValue { column: &'static str, value: String },

  /// An unsigned count does not fit SQLite's signed 64-bit integer.
  #[error("{column} value {value} is out of range")]
  OutOfRange { column: &'static str, value: u64 },

  #[error("document not found: {0}")]
  DocumentNotFound(uuid::Uuid),

  /// A uniqueness constraint or version check rejected the write.
  #[error("conflict: {0}")]
  Conflict(String),
}

impl Error {
  /// Translate a unique/primary-key violation into [`Error::Conflict`];
  /// anything else stays a database error.
  pub(crate) fn from_insert(err: tokio_rusqlite::Error, what: &str) -> Self {
    if is_unique_violation(&err) {
      Self::Conflict(format!("{what} already exists"))
    } else {
      Self::Database(err)
    }
  }
}

fn is_unique_violation(err: &tokio_rusqlite::Error) -> bool {
  match err {
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _)) => {
      e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
        || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    }
    _ => false,
  }
}

impl StoreError for Error {
  fn is_conflict(&self) -> bool {
    match self {
      Self::Conflict(_) => true,
      Self::Database(e) => is_unique_violation(e),
      _ => false,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
