//! JSON REST API for Roster.
//!
//! Exposes an axum [`Router`] backed by any [`roster_core::store::UserStore`].
//! CORS, tracing and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", roster_api::api_router(store.clone(), false))
//! ```

pub mod error;
pub mod users;

use std::sync::Arc;

use axum::{Router, routing::get};
use roster_core::{UserDirectory, store::UserStore};

pub use error::ApiError;
use error::Operation;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub directory:     UserDirectory<S>,
  /// Include underlying error messages in 500 responses.
  pub expose_errors: bool,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      directory:     self.directory.clone(),
      expose_errors: self.expose_errors,
    }
  }
}

impl<S> ApiState<S> {
  fn fail(&self, err: roster_core::Error, op: Operation) -> ApiError {
    ApiError::from_core(err, op, self.expose_errors)
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, expose_errors: bool) -> Router<()>
where
  S: UserStore + 'static,
{
  let state = ApiState { directory: UserDirectory::new(store), expose_errors };

  Router::new()
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    .route("/users/export/csv", get(users::export_csv::<S>))
    .route(
      "/users/{id}",
      get(users::get_one::<S>)
        .put(users::update::<S>)
        .delete(users::delete::<S>),
    )
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
