//! Startup errors for `roster-server`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid CORS origin: {0:?}")]
  InvalidOrigin(String),

  /// Credentialed CORS requires explicit origins.
  #[error("a wildcard CORS origin cannot be combined with credentials")]
  WildcardOrigin,
}
