//! [`SqliteStore`], the SQLite implementation of [`UserStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, functions::FunctionFlags};
use uuid::Uuid;

use roster_core::{
  store::{UserFilter, UserQuery, UserStore},
  user::{NewUser, UserChanges, UserRecord},
};

use crate::{
  Error, Result,
  encode::{
    USER_COLUMNS, RawUser, decode_dt, encode_dt, encode_uuid, fold_case,
    like_pattern, now, now_after,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Roster user directory backed by a single SQLite file.
///
/// Clones share the inner connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened user store");
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        register_functions(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a query that yields at most one `users` row.
  async fn query_one(
    &self,
    sql: String,
    params: Vec<Option<String>>,
  ) -> Result<Option<UserRecord>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &sql,
              rusqlite::params_from_iter(params.iter()),
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(classify)?;

    raw.map(RawUser::into_user).transpose()
  }
}

/// SQL functions the queries below rely on.
fn register_functions(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    "casefold",
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| {
      let text: Option<String> = ctx.get(0)?;
      Ok(text.as_deref().map(fold_case))
    },
  )
}

/// Separate unique-index violations (only `users.email` has one) from every
/// other database failure.
fn classify(err: tokio_rusqlite::Error) -> Error {
  let unique_violation = matches!(
    &err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _))
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  );
  if unique_violation {
    Error::DuplicateEmail
  } else {
    Error::Database(err)
  }
}

/// The `WHERE` clause shared by `find` and `count`. `?1` is the case-folded
/// LIKE pattern, or NULL for no filtering. SQLite's own LIKE folds ASCII only,
/// so columns go through `casefold` first.
const SEARCH_CLAUSE: &str = "WHERE ?1 IS NULL
     OR casefold(first_name) LIKE ?1 ESCAPE '!'
     OR casefold(last_name)  LIKE ?1 ESCAPE '!'
     OR casefold(email)      LIKE ?1 ESCAPE '!'";

fn search_pattern(filter: &UserFilter) -> Option<String> {
  filter.search.as_deref().map(like_pattern)
}

// ─── UserStore impl ──────────────────────────────────────────────────────────

impl UserStore for SqliteStore {
  type Error = Error;

  async fn insert(&self, user: NewUser) -> Result<UserRecord> {
    let at = now();
    let record = UserRecord {
      id:            Uuid::new_v4(),
      first_name:    user.first_name,
      last_name:     user.last_name,
      email:         user.email,
      mobile:        user.mobile,
      gender:        user.gender,
      status:        user.status,
      profile_image: user.profile_image,
      created_at:    at,
      updated_at:    at,
    };

    let id_str     = encode_uuid(record.id);
    let first_name = record.first_name.clone();
    let last_name  = record.last_name.clone();
    let email      = record.email.clone();
    let mobile     = record.mobile.clone();
    let gender     = record.gender.as_ref().to_owned();
    let status     = record.status.as_ref().to_owned();
    let image      = record.profile_image.clone();
    let at_str     = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (
             user_id, first_name, last_name, email, mobile,
             gender, status, profile_image, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
          rusqlite::params![
            id_str, first_name, last_name, email, mobile, gender, status,
            image, at_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(classify)?;

    Ok(record)
  }

  async fn get(&self, id: Uuid) -> Result<Option<UserRecord>> {
    self
      .query_one(
        format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
        vec![Some(encode_uuid(id))],
      )
      .await
  }

  async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
    self
      .query_one(
        format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
        vec![Some(email.to_owned())],
      )
      .await
  }

  async fn update(
    &self,
    id: Uuid,
    changes: UserChanges,
  ) -> Result<Option<UserRecord>> {
    // Nothing to apply: the stored record, `updated_at` included, stands.
    if changes.is_empty() {
      return self.get(id).await;
    }

    // Unset fields bind NULL and COALESCE keeps the stored value.
    let sql = format!(
      "UPDATE users SET
         first_name    = COALESCE(?2, first_name),
         last_name     = COALESCE(?3, last_name),
         email         = COALESCE(?4, email),
         mobile        = COALESCE(?5, mobile),
         gender        = COALESCE(?6, gender),
         status        = COALESCE(?7, status),
         profile_image = COALESCE(?8, profile_image),
         updated_at    = ?9
       WHERE user_id = ?1
       RETURNING {USER_COLUMNS}"
    );

    let mut params = vec![
      Some(encode_uuid(id)),
      changes.first_name,
      changes.last_name,
      changes.email,
      changes.mobile,
      changes.gender.map(|g| g.as_ref().to_owned()),
      changes.status.map(|s| s.as_ref().to_owned()),
      changes.profile_image,
    ];

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let previous: Option<String> = tx
          .query_row(
            "SELECT updated_at FROM users WHERE user_id = ?1",
            [&params[0]],
            |r| r.get(0),
          )
          .optional()?;
        let Some(previous) = previous else {
          return Ok(None);
        };

        // `updated_at` must move forward even within one clock tick.
        let previous = decode_dt(&previous).map_err(|e| {
          rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            e.to_string().into(),
          )
        })?;
        params.push(Some(encode_dt(now_after(previous))));

        let raw = tx
          .query_row(
            &sql,
            rusqlite::params_from_iter(params.iter()),
            RawUser::from_row,
          )
          .optional()?;
        tx.commit()?;
        Ok(raw)
      })
      .await
      .map_err(classify)?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn delete(&self, id: Uuid) -> Result<Option<UserRecord>> {
    self
      .query_one(
        format!("DELETE FROM users WHERE user_id = ?1 RETURNING {USER_COLUMNS}"),
        vec![Some(encode_uuid(id))],
      )
      .await
  }

  async fn find(&self, query: &UserQuery) -> Result<Vec<UserRecord>> {
    let pattern = search_pattern(&query.filter);
    // SQLite treats a negative LIMIT as "no limit".
    let limit = query
      .limit
      .map(|l| i64::try_from(l).unwrap_or(i64::MAX))
      .unwrap_or(-1);
    let offset = i64::try_from(query.offset).unwrap_or(i64::MAX);

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {USER_COLUMNS} FROM users
           {SEARCH_CLAUSE}
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?2 OFFSET ?3"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![pattern, limit, offset],
            RawUser::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn count(&self, filter: &UserFilter) -> Result<u64> {
    let pattern = search_pattern(filter);

    let count: i64 = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT COUNT(*) FROM users {SEARCH_CLAUSE}");
        Ok(conn.query_row(&sql, rusqlite::params![pattern], |r| r.get(0))?)
      })
      .await?;

    Ok(u64::try_from(count).unwrap_or_default())
  }
}
