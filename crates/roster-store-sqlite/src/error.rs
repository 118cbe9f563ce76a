//! Error type for `roster-store-sqlite`.

use roster_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// The `users.email` unique index refused the write.
  #[error("email already in use")]
  DuplicateEmail,

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown {column} value: {value:?}")]
  UnknownValue { column: &'static str, value: String },
}

impl StoreError for Error {
  fn is_duplicate_email(&self) -> bool { matches!(self, Error::DuplicateEmail) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
