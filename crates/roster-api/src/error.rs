//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure is rendered in the same envelope as successful responses,
//! with `success: false`.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_core::{Error, validate::FieldError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// 400 with one entry per offending field.
  #[error("validation error")]
  Validation(Vec<FieldError>),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("not found: {0}")]
  NotFound(String),

  /// 500. `detail` is the underlying error message and is only filled in
  /// when the server is configured to expose internals.
  #[error("{message}")]
  Internal {
    message: &'static str,
    detail:  Option<String>,
  },
}

/// The operation a handler was performing; picks the wording of failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  Create,
  List,
  Get,
  Update,
  Delete,
  Export,
}

impl Operation {
  fn failure(self) -> &'static str {
    match self {
      Self::Create => "Error creating user",
      Self::List => "Error fetching users",
      Self::Get => "Error fetching user",
      Self::Update => "Error updating user",
      Self::Delete => "Error deleting user",
      Self::Export => "Error exporting users",
    }
  }

  fn duplicate_email(self) -> &'static str {
    match self {
      Self::Update => "Email already in use",
      _ => "User with this email already exists",
    }
  }
}

impl ApiError {
  /// Translate a directory error raised while performing `op`.
  pub fn from_core(err: Error, op: Operation, expose_errors: bool) -> Self {
    match err {
      Error::Validation(errors) => {
        tracing::warn!(fields = errors.len(), ?op, "rejected invalid user payload");
        Self::Validation(errors)
      }
      Error::DuplicateEmail(email) => {
        tracing::warn!(%email, ?op, "rejected duplicate email");
        Self::BadRequest(op.duplicate_email().to_owned())
      }
      Error::InvalidQuery(_) => Self::BadRequest(
        "Page and limit must be positive integers".to_owned(),
      ),
      Error::UserNotFound(_) => Self::NotFound("User not found".to_owned()),
      Error::NothingToExport => {
        Self::NotFound("No users found to export".to_owned())
      }
      Error::Store(e) => {
        tracing::error!(error = %e, "{}", op.failure());
        Self::Internal {
          message: op.failure(),
          detail:  expose_errors.then(|| e.to_string()),
        }
      }
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Validation(errors) => (
        StatusCode::BAD_REQUEST,
        Json(json!({
          "success": false,
          "message": "Validation error",
          "errors": errors,
        })),
      )
        .into_response(),
      ApiError::BadRequest(message) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "message": message })),
      )
        .into_response(),
      ApiError::NotFound(message) => (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": message })),
      )
        .into_response(),
      ApiError::Internal { message, detail } => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
          "success": false,
          "message": message,
          "error": detail.map_or_else(|| json!({}), |d| json!(d)),
        })),
      )
        .into_response(),
    }
  }
}
