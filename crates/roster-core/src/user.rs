//! User records and the payloads that create or change them.
//!
//! [`UserInput`] is the loose shape a client sends; nothing about it is
//! trusted. The validators in [`crate::validate`] turn it into a [`NewUser`]
//! (for creation) or a [`UserChanges`] (for partial updates). Only those
//! validated types ever reach a [`crate::store::UserStore`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

// ─── Enumerations ────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
pub enum Gender {
  Male,
  Female,
}

/// Whether the account is in use. New users are `Active` unless told
/// otherwise.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
pub enum Status {
  #[default]
  Active,
  Inactive,
}

// ─── UserRecord ──────────────────────────────────────────────────────────────

/// A persisted user.
///
/// Serialises with the wire names the web client expects (`_id`,
/// `firstName`, `createdAt`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
  /// Store-assigned; never changes.
  #[serde(rename = "_id")]
  pub id:            Uuid,
  pub first_name:    String,
  pub last_name:     String,
  /// Always trimmed and lowercased; unique across the directory.
  pub email:         String,
  pub mobile:        String,
  pub gender:        Gender,
  pub status:        Status,
  pub profile_image: Option<String>,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

// ─── UserInput ───────────────────────────────────────────────────────────────

/// An unvalidated create or update payload.
///
/// Every field is optional so that missing values can be reported as field
/// errors instead of failing deserialisation. Unknown fields (for instance an
/// `_id` echoed back by a client) are ignored.
///
/// Numbers and booleans are accepted in place of strings and kept as their
/// textual form, so `"mobile": 9876543210` validates like `"9876543210"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
  #[serde(default, deserialize_with = "scalar_text")]
  pub first_name:    Option<String>,
  #[serde(default, deserialize_with = "scalar_text")]
  pub last_name:     Option<String>,
  #[serde(default, deserialize_with = "scalar_text")]
  pub email:         Option<String>,
  #[serde(default, deserialize_with = "scalar_text")]
  pub mobile:        Option<String>,
  #[serde(default, deserialize_with = "scalar_text")]
  pub gender:        Option<String>,
  #[serde(default, deserialize_with = "scalar_text")]
  pub status:        Option<String>,
  #[serde(default, deserialize_with = "scalar_text")]
  pub profile_image: Option<String>,
}

/// Any JSON scalar a form field may arrive as.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
  Text(String),
  Unsigned(u64),
  Signed(i64),
  Float(f64),
  Bool(bool),
}

fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let scalar = Option::<Scalar>::deserialize(deserializer)?;
  Ok(scalar.map(|s| match s {
    Scalar::Text(text) => text,
    Scalar::Unsigned(n) => n.to_string(),
    Scalar::Signed(n) => n.to_string(),
    Scalar::Float(n) => n.to_string(),
    Scalar::Bool(b) => b.to_string(),
  }))
}

// ─── NewUser ─────────────────────────────────────────────────────────────────

/// Validated input to [`crate::store::UserStore::insert`].
/// `id`, `created_at` and `updated_at` are always set by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
  pub first_name:    String,
  pub last_name:     String,
  pub email:         String,
  pub mobile:        String,
  pub gender:        Gender,
  pub status:        Status,
  pub profile_image: Option<String>,
}

// ─── UserChanges ─────────────────────────────────────────────────────────────

/// Validated partial update. `None` leaves the stored value untouched; there
/// is no way to clear a field through an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
  pub first_name:    Option<String>,
  pub last_name:     Option<String>,
  pub email:         Option<String>,
  pub mobile:        Option<String>,
  pub gender:        Option<Gender>,
  pub status:        Option<Status>,
  pub profile_image: Option<String>,
}

impl UserChanges {
  pub fn is_empty(&self) -> bool { *self == Self::default() }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn input_accepts_numbers_for_text_fields() {
    let input: UserInput = serde_json::from_value(json!({
      "firstName": "Ada",
      "mobile": 9876543210_u64,
      "status": null,
    }))
    .unwrap();
    assert_eq!(input.first_name.as_deref(), Some("Ada"));
    assert_eq!(input.mobile.as_deref(), Some("9876543210"));
    assert_eq!(input.status, None);
    assert_eq!(input.email, None);
  }

  #[test]
  fn input_ignores_unknown_fields() {
    let input: UserInput = serde_json::from_value(json!({
      "_id": "abc",
      "createdAt": "2024-01-01T00:00:00Z",
      "lastName": "Lovelace",
    }))
    .unwrap();
    assert_eq!(input.last_name.as_deref(), Some("Lovelace"));
  }
}
