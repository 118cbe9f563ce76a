//! Field validation for user payloads.
//!
//! Each field has a small pure function that normalises a raw value or
//! returns the message for the first rule it breaks. [`validate_new`] and
//! [`validate_changes`] run every field and collect all failures, so a client
//! sees every problem with its form at once.

use std::{str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::user::{Gender, NewUser, Status, UserChanges, UserInput};

pub const MIN_NAME_LEN: usize = 2;
pub const MOBILE_LEN: usize = 10;

/// Word characters are ASCII only; `(?-u:\w)` is `[0-9A-Za-z_]`.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"^(?-u:\w)+([.-]?(?-u:\w)+)*@(?-u:\w)+([.-]?(?-u:\w)+)*(\.(?-u:\w){2,3})+$",
  )
  .expect("email pattern is a valid regex")
});

// ─── FieldError ──────────────────────────────────────────────────────────────

/// A single failed rule, keyed by the field's wire name (e.g. `firstName`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
  pub field:   String,
  pub message: String,
}

impl FieldError {
  pub fn new(field: &str, message: impl Into<String>) -> Self {
    Self { field: field.to_owned(), message: message.into() }
  }
}

// ─── Field rules ─────────────────────────────────────────────────────────────

fn required<'a>(label: &str, raw: Option<&'a str>) -> Result<&'a str, String> {
  match raw.map(str::trim) {
    Some(value) if !value.is_empty() => Ok(value),
    _ => Err(format!("{label} is required")),
  }
}

/// A first or last name: trimmed, at least [`MIN_NAME_LEN`] characters.
pub fn person_name(label: &str, raw: Option<&str>) -> Result<String, String> {
  let value = required(label, raw)?;
  if value.chars().count() < MIN_NAME_LEN {
    return Err(format!("{label} must be at least {MIN_NAME_LEN} characters"));
  }
  Ok(value.to_owned())
}

/// Trimmed, pattern-checked and lowercased.
pub fn email(raw: Option<&str>) -> Result<String, String> {
  let value = required("Email", raw)?;
  if !EMAIL_PATTERN.is_match(value) {
    return Err("Please provide a valid email address".to_owned());
  }
  Ok(value.to_lowercase())
}

/// Exactly [`MOBILE_LEN`] ASCII digits, nothing else.
pub fn mobile(raw: Option<&str>) -> Result<String, String> {
  let value = required("Mobile number", raw)?;
  if value.len() != MOBILE_LEN || !value.bytes().all(|b| b.is_ascii_digit()) {
    return Err(format!("Mobile number must be exactly {MOBILE_LEN} digits"));
  }
  Ok(value.to_owned())
}

pub fn gender(raw: Option<&str>) -> Result<Gender, String> {
  let value = required("Gender", raw)?;
  Gender::from_str(value)
    .map_err(|_| "Gender must be either Male or Female".to_owned())
}

/// Blank or missing means "not given"; the caller picks the default.
pub fn status(raw: Option<&str>) -> Result<Option<Status>, String> {
  match present(raw) {
    None => Ok(None),
    Some(value) => Status::from_str(value)
      .map(Some)
      .map_err(|_| "Status must be either Active or Inactive".to_owned()),
  }
}

/// Returns the trimmed value if it is non-blank.
fn present(raw: Option<&str>) -> Option<&str> {
  raw.map(str::trim).filter(|v| !v.is_empty())
}

// ─── Aggregate validators ────────────────────────────────────────────────────

/// Accumulates failures while each field is checked.
#[derive(Default)]
struct Collector {
  errors: Vec<FieldError>,
}

impl Collector {
  fn check<T>(&mut self, field: &str, outcome: Result<T, String>) -> Option<T> {
    match outcome {
      Ok(value) => Some(value),
      Err(message) => {
        self.errors.push(FieldError::new(field, message));
        None
      }
    }
  }

  /// Runs `rule` only when the field carries a non-blank value.
  fn check_present<T>(
    &mut self,
    field: &str,
    raw: Option<&str>,
    rule: impl FnOnce(Option<&str>) -> Result<T, String>,
  ) -> Option<T> {
    let value = present(raw)?;
    self.check(field, rule(Some(value)))
  }
}

/// Validate a full create payload. Every required field must be present.
pub fn validate_new(input: &UserInput) -> Result<NewUser, Vec<FieldError>> {
  let mut c = Collector::default();

  let first_name = c.check(
    "firstName",
    person_name("First name", input.first_name.as_deref()),
  );
  let last_name = c.check(
    "lastName",
    person_name("Last name", input.last_name.as_deref()),
  );
  let email = c.check("email", email(input.email.as_deref()));
  let mobile = c.check("mobile", mobile(input.mobile.as_deref()));
  let gender = c.check("gender", gender(input.gender.as_deref()));
  let status = c.check("status", status(input.status.as_deref()));
  let profile_image = present(input.profile_image.as_deref()).map(str::to_owned);

  match (first_name, last_name, email, mobile, gender, status) {
    (
      Some(first_name),
      Some(last_name),
      Some(email),
      Some(mobile),
      Some(gender),
      Some(status),
    ) => Ok(NewUser {
      first_name,
      last_name,
      email,
      mobile,
      gender,
      status: status.unwrap_or_default(),
      profile_image,
    }),
    _ => Err(c.errors),
  }
}

/// Validate a partial update payload.
///
/// Blank values are dropped before validation, so they can never clear a
/// stored field. Only the remaining fields are checked.
pub fn validate_changes(
  input: &UserInput,
) -> Result<UserChanges, Vec<FieldError>> {
  let mut c = Collector::default();

  let first_name =
    c.check_present("firstName", input.first_name.as_deref(), |raw| {
      person_name("First name", raw)
    });
  let last_name =
    c.check_present("lastName", input.last_name.as_deref(), |raw| {
      person_name("Last name", raw)
    });
  let email = c.check_present("email", input.email.as_deref(), email);
  let mobile = c.check_present("mobile", input.mobile.as_deref(), mobile);
  let gender = c.check_present("gender", input.gender.as_deref(), gender);
  let status = c
    .check_present("status", input.status.as_deref(), status)
    .flatten();
  let profile_image = present(input.profile_image.as_deref()).map(str::to_owned);

  if !c.errors.is_empty() {
    return Err(c.errors);
  }

  Ok(UserChanges {
    first_name,
    last_name,
    email,
    mobile,
    gender,
    status,
    profile_image,
  })
}
