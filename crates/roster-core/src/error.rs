//! Error types for `roster-core`.

use thiserror::Error;

use crate::validate::FieldError;

#[derive(Debug, Error)]
pub enum Error {
  /// One entry per offending field, in field order.
  #[error("validation failed for {} field(s)", .0.len())]
  Validation(Vec<FieldError>),

  #[error("email already in use: {0}")]
  DuplicateEmail(String),

  #[error("invalid query: {0}")]
  InvalidQuery(String),

  /// Raised for unknown ids and for ids that are not well-formed UUIDs.
  #[error("user not found: {0}")]
  UserNotFound(String),

  #[error("no users to export")]
  NothingToExport,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
