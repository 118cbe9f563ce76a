//! [`UserDirectory`]: validation, uniqueness and pagination on top of a
//! [`UserStore`].
//!
//! The directory holds no state of its own beyond a handle to the store, so
//! it is cheap to clone into every request handler.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  export,
  store::{StoreError, UserFilter, UserQuery, UserStore},
  user::{UserInput, UserRecord},
  validate,
};

// ─── Pagination ──────────────────────────────────────────────────────────────

/// Pagination summary returned alongside a page of users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
  pub current_page: u64,
  /// `ceil(total_users / limit)`; zero when nothing matches.
  pub total_pages:  u64,
  pub total_users:  u64,
  pub limit:        u64,
}

impl Pagination {
  /// `limit` must be non-zero.
  pub(crate) fn new(current_page: u64, limit: u64, total_users: u64) -> Self {
    Self {
      current_page,
      total_pages: total_users.div_ceil(limit),
      total_users,
      limit,
    }
  }
}

/// One page of [`UserDirectory::list_users`] results.
#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
  pub users:      Vec<UserRecord>,
  pub pagination: Pagination,
}

// ─── Directory ───────────────────────────────────────────────────────────────

pub struct UserDirectory<S> {
  store: Arc<S>,
}

impl<S> Clone for UserDirectory<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: UserStore> UserDirectory<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Validate `input` and persist it as a new user.
  ///
  /// Validation runs before the uniqueness check, so a payload with both a
  /// bad field and a taken email reports the field errors.
  pub async fn create_user(&self, input: UserInput) -> Result<UserRecord> {
    let new_user = validate::validate_new(&input).map_err(Error::Validation)?;

    if self
      .store
      .find_by_email(&new_user.email)
      .await
      .map_err(store_error)?
      .is_some()
    {
      return Err(Error::DuplicateEmail(new_user.email));
    }

    let email = new_user.email.clone();
    let user = self
      .store
      .insert(new_user)
      .await
      .map_err(|e| write_error(e, &email))?;

    tracing::info!(user_id = %user.id, "created user");
    Ok(user)
  }

  /// Return page `page` (1-based) of at most `limit` users, newest first,
  /// optionally narrowed by `search`.
  pub async fn list_users(
    &self,
    page: i64,
    limit: i64,
    search: Option<&str>,
  ) -> Result<UserPage> {
    let (page, limit) = match (u64::try_from(page), u64::try_from(limit)) {
      (Ok(page), Ok(limit)) if page >= 1 && limit >= 1 => (page, limit),
      _ => {
        return Err(Error::InvalidQuery(
          "page and limit must be positive integers".to_owned(),
        ));
      }
    };

    let filter = UserFilter {
      search: search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned),
    };
    let query = UserQuery {
      filter,
      offset: (page - 1).saturating_mul(limit),
      limit: Some(limit),
    };

    let users = self.store.find(&query).await.map_err(store_error)?;
    let total = self.store.count(&query.filter).await.map_err(store_error)?;

    Ok(UserPage { users, pagination: Pagination::new(page, limit, total) })
  }

  pub async fn get_user(&self, id: &str) -> Result<UserRecord> {
    let uuid = parse_id(id)?;
    self
      .store
      .get(uuid)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::UserNotFound(id.to_owned()))
  }

  /// Apply the non-blank fields of `input` to an existing user.
  pub async fn update_user(
    &self,
    id: &str,
    input: UserInput,
  ) -> Result<UserRecord> {
    let uuid = parse_id(id)?;
    let current = self
      .store
      .get(uuid)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::UserNotFound(id.to_owned()))?;

    let changes =
      validate::validate_changes(&input).map_err(Error::Validation)?;

    if let Some(email) = changes.email.as_deref()
      && email != current.email
      && let Some(holder) =
        self.store.find_by_email(email).await.map_err(store_error)?
      && holder.id != uuid
    {
      return Err(Error::DuplicateEmail(email.to_owned()));
    }

    let email = changes.email.clone().unwrap_or_default();
    let user = self
      .store
      .update(uuid, changes)
      .await
      .map_err(|e| write_error(e, &email))?
      .ok_or_else(|| Error::UserNotFound(id.to_owned()))?;

    tracing::info!(user_id = %user.id, "updated user");
    Ok(user)
  }

  pub async fn delete_user(&self, id: &str) -> Result<UserRecord> {
    let uuid = parse_id(id)?;
    let user = self
      .store
      .delete(uuid)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::UserNotFound(id.to_owned()))?;

    tracing::info!(user_id = %user.id, "deleted user");
    Ok(user)
  }

  /// Every user as CSV, newest first. An empty directory is
  /// [`Error::NothingToExport`] rather than a header-only file.
  pub async fn export_all_users(&self) -> Result<String> {
    let users = self
      .store
      .find(&UserQuery::default())
      .await
      .map_err(store_error)?;

    if users.is_empty() {
      return Err(Error::NothingToExport);
    }

    tracing::debug!(count = users.len(), "exporting users");
    Ok(export::to_csv(&users))
  }
}

/// Malformed ids are reported the same way as unknown ones.
fn parse_id(id: &str) -> Result<Uuid> {
  Uuid::parse_str(id).map_err(|_| Error::UserNotFound(id.to_owned()))
}

fn store_error<E: StoreError>(e: E) -> Error { Error::Store(Box::new(e)) }

fn write_error<E: StoreError>(e: E, email: &str) -> Error {
  if e.is_duplicate_email() {
    Error::DuplicateEmail(email.to_owned())
  } else {
    store_error(e)
  }
}
