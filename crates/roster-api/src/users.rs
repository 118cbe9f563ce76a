//! Handlers for `/users` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/users` | Body: [`UserInput`]; returns 201 + stored user |
//! | `GET`    | `/users` | Optional `page`, `limit` (default 1 / 10) and `search` |
//! | `GET`    | `/users/export/csv` | CSV attachment; 404 when there are no users |
//! | `GET`    | `/users/{id}` | 404 if not found |
//! | `PUT`    | `/users/{id}` | Body: any subset of [`UserInput`] |
//! | `DELETE` | `/users/{id}` | Returns the deleted user |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::{StatusCode, header},
  response::IntoResponse,
};
use chrono::Utc;
use roster_core::{
  service::Pagination,
  store::UserStore,
  user::{UserInput, UserRecord},
};
use serde::{Deserialize, Serialize};

use crate::{
  ApiState,
  error::{ApiError, Operation},
};

// ─── Envelope ────────────────────────────────────────────────────────────────

/// The success body shared by every JSON endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
  pub success:    bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message:    Option<&'static str>,
  pub data:       T,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pagination: Option<Pagination>,
}

impl<T> Envelope<T> {
  fn ok(data: T) -> Self {
    Self { success: true, message: None, data, pagination: None }
  }

  fn with_message(message: &'static str, data: T) -> Self {
    Self { message: Some(message), ..Self::ok(data) }
  }
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /users`: returns 201 + the stored [`UserRecord`].
pub async fn create<S: UserStore + 'static>(
  State(state): State<ApiState<S>>,
  body: Result<Json<UserInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(input) = body?;
  let user = state
    .directory
    .create_user(input)
    .await
    .map_err(|e| state.fail(e, Operation::Create))?;
  Ok((
    StatusCode::CREATED,
    Json(Envelope::with_message("User created successfully", user)),
  ))
}

// ─── List ────────────────────────────────────────────────────────────────────

/// Query string for `GET /users`. Numbers arrive as text so a malformed value
/// is reported with the usual envelope instead of a bare extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub page:   Option<String>,
  pub limit:  Option<String>,
  pub search: Option<String>,
}

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;

fn parse_number(raw: Option<&str>, default: i64) -> Result<i64, ApiError> {
  match raw.map(str::trim) {
    None | Some("") => Ok(default),
    Some(s) => s.parse().map_err(|_| {
      ApiError::BadRequest("Page and limit must be positive integers".to_owned())
    }),
  }
}

/// `GET /users[?page=..][&limit=..][&search=..]`
pub async fn list<S: UserStore + 'static>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Envelope<Vec<UserRecord>>>, ApiError> {
  let page = parse_number(params.page.as_deref(), DEFAULT_PAGE)?;
  let limit = parse_number(params.limit.as_deref(), DEFAULT_LIMIT)?;

  let result = state
    .directory
    .list_users(page, limit, params.search.as_deref())
    .await
    .map_err(|e| state.fail(e, Operation::List))?;

  Ok(Json(Envelope {
    pagination: Some(result.pagination),
    ..Envelope::ok(result.users)
  }))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /users/{id}`
pub async fn get_one<S: UserStore + 'static>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Envelope<UserRecord>>, ApiError> {
  let user = state
    .directory
    .get_user(&id)
    .await
    .map_err(|e| state.fail(e, Operation::Get))?;
  Ok(Json(Envelope::ok(user)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /users/{id}`. Only non-blank fields in the body are applied.
pub async fn update<S: UserStore + 'static>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  body: Result<Json<UserInput>, JsonRejection>,
) -> Result<Json<Envelope<UserRecord>>, ApiError> {
  let Json(input) = body?;
  let user = state
    .directory
    .update_user(&id, input)
    .await
    .map_err(|e| state.fail(e, Operation::Update))?;
  Ok(Json(Envelope::with_message("User updated successfully", user)))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /users/{id}`
pub async fn delete<S: UserStore + 'static>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Envelope<UserRecord>>, ApiError> {
  let user = state
    .directory
    .delete_user(&id)
    .await
    .map_err(|e| state.fail(e, Operation::Delete))?;
  Ok(Json(Envelope::with_message("User deleted successfully", user)))
}

// ─── Export ──────────────────────────────────────────────────────────────────

/// `GET /users/export/csv`: the whole directory as a CSV download.
pub async fn export_csv<S: UserStore + 'static>(
  State(state): State<ApiState<S>>,
) -> Result<impl IntoResponse, ApiError> {
  let csv = state
    .directory
    .export_all_users()
    .await
    .map_err(|e| state.fail(e, Operation::Export))?;

  let disposition = format!(
    "attachment; filename=users_{}.csv",
    Utc::now().timestamp_millis()
  );
  Ok((
    [
      (header::CONTENT_TYPE, "text/csv".to_owned()),
      (header::CONTENT_DISPOSITION, disposition),
    ],
    csv,
  ))
}
