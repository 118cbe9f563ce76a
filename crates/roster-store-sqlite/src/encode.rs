//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width so
//! that lexical order in SQL matches chronological order. UUIDs are stored as
//! hyphenated lowercase strings; enums by their variant names.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, TimeDelta, Utc};
use roster_core::user::{Gender, Status, UserRecord};
use uuid::Uuid;

use crate::{Error, Result};

/// Every column of `users`, in the order [`RawUser::from_row`] reads them.
pub const USER_COLUMNS: &str = "user_id, first_name, last_name, email, \
                                mobile, gender, status, profile_image, \
                                created_at, updated_at";

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Timestamp for a write following one stamped `previous`. Never equal to or
/// earlier than `previous`, even when the clock has not moved on.
pub fn now_after(previous: DateTime<Utc>) -> DateTime<Utc> {
  now().max(previous + TimeDelta::microseconds(1))
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Gender / Status ──────────────────────────────────────────────────────────

pub fn decode_gender(s: &str) -> Result<Gender> {
  Gender::from_str(s).map_err(|_| Error::UnknownValue {
    column: "gender",
    value:  s.to_owned(),
  })
}

pub fn decode_status(s: &str) -> Result<Status> {
  Status::from_str(s).map_err(|_| Error::UnknownValue {
    column: "status",
    value:  s.to_owned(),
  })
}

// ─── Search ──────────────────────────────────────────────────────────────────

/// Unicode lowercase, the folding applied to both sides of a search. Exposed
/// to SQL as `casefold(text)`.
pub fn fold_case(text: &str) -> String { text.to_lowercase() }

/// Turn a literal search term into a case-folded `LIKE ... ESCAPE '!'`
/// pattern that matches it anywhere in a folded column.
pub fn like_pattern(term: &str) -> String {
  let escaped = fold_case(term)
    .replace('!', "!!")
    .replace('%', "!%")
    .replace('_', "!_");
  format!("%{escaped}%")
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub first_name:    String,
  pub last_name:     String,
  pub email:         String,
  pub mobile:        String,
  pub gender:        String,
  pub status:        String,
  pub profile_image: Option<String>,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawUser {
  /// Row mapper for queries selecting [`USER_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      first_name:    row.get(1)?,
      last_name:     row.get(2)?,
      email:         row.get(3)?,
      mobile:        row.get(4)?,
      gender:        row.get(5)?,
      status:        row.get(6)?,
      profile_image: row.get(7)?,
      created_at:    row.get(8)?,
      updated_at:    row.get(9)?,
    })
  }

  pub fn into_user(self) -> Result<UserRecord> {
    Ok(UserRecord {
      id:            decode_uuid(&self.user_id)?,
      first_name:    self.first_name,
      last_name:     self.last_name,
      email:         self.email,
      mobile:        self.mobile,
      gender:        decode_gender(&self.gender)?,
      status:        decode_status(&self.status)?,
      profile_image: self.profile_image,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}
