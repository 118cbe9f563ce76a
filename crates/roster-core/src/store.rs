//! The `UserStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! [`crate::service::UserDirectory`] depends on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::user::{NewUser, UserChanges, UserRecord};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Which records a [`UserStore::find`] or [`UserStore::count`] considers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
  /// Case-insensitive substring matched against first name, last name and
  /// email; a record matching any one of them is included. The term is
  /// literal, no wildcard or pattern syntax is interpreted.
  pub search: Option<String>,
}

/// Parameters for [`UserStore::find`].
///
/// Results are always ordered newest first by `created_at`; records created
/// at the same instant come back in reverse insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
  pub filter: UserFilter,
  pub offset: u64,
  /// `None` returns every matching record.
  pub limit:  Option<u64>,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Implemented by backend error types so the directory can tell a uniqueness
/// violation apart from every other failure.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `true` when a write was refused because another record already holds
  /// the email.
  fn is_duplicate_email(&self) -> bool;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a user directory backend.
///
/// Backends must enforce email uniqueness themselves (a unique index or
/// equivalent) and report violations through
/// [`StoreError::is_duplicate_email`]; the directory's own pre-check is not
/// atomic with the write.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait UserStore: Send + Sync {
  type Error: StoreError;

  /// Persist a new user. The store assigns `id`, `created_at` and
  /// `updated_at`.
  fn insert(
    &self,
    user: NewUser,
  ) -> impl Future<Output = Result<UserRecord, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<UserRecord>, Self::Error>> + Send + '_;

  /// Exact match on an already-normalised email.
  fn find_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<UserRecord>, Self::Error>> + Send + 'a;

  /// Overwrite the fields set in `changes` and refresh `updated_at`.
  /// Returns `None` if the user does not exist.
  fn update(
    &self,
    id: Uuid,
    changes: UserChanges,
  ) -> impl Future<Output = Result<Option<UserRecord>, Self::Error>> + Send + '_;

  /// Permanently remove a user, returning its last state.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<UserRecord>, Self::Error>> + Send + '_;

  /// Filter, sort, skip and limit.
  fn find<'a>(
    &'a self,
    query: &'a UserQuery,
  ) -> impl Future<Output = Result<Vec<UserRecord>, Self::Error>> + Send + 'a;

  /// Number of records matching `filter`, ignoring pagination.
  fn count<'a>(
    &'a self,
    filter: &'a UserFilter,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;
}
