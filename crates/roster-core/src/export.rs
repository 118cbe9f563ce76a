//! CSV rendering of the user directory.

use crate::user::UserRecord;

pub const CSV_HEADER: [&str; 6] =
  ["First Name", "Last Name", "Email", "Mobile", "Gender", "Status"];

/// Render `users` as CSV: an unquoted header row, then one row per user with
/// every cell double-quoted. Embedded quotes are doubled. Rows are separated
/// by `\n` with no trailing newline.
pub fn to_csv(users: &[UserRecord]) -> String {
  let mut lines = Vec::with_capacity(users.len() + 1);
  lines.push(CSV_HEADER.join(","));

  for user in users {
    let cells = [
      user.first_name.as_str(),
      user.last_name.as_str(),
      user.email.as_str(),
      user.mobile.as_str(),
      user.gender.as_ref(),
      user.status.as_ref(),
    ];
    let row: Vec<String> = cells.into_iter().map(quote).collect();
    lines.push(row.join(","));
  }

  lines.join("\n")
}

fn quote(cell: &str) -> String { format!("\"{}\"", cell.replace('"', "\"\"")) }

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::user::{Gender, Status};

  fn user(first: &str, last: &str) -> UserRecord {
    let now = Utc::now();
    UserRecord {
      id:            Uuid::new_v4(),
      first_name:    first.into(),
      last_name:     last.into(),
      email:         "someone@example.com".into(),
      mobile:        "0123456789".into(),
      gender:        Gender::Male,
      status:        Status::Inactive,
      profile_image: None,
      created_at:    now,
      updated_at:    now,
    }
  }

  #[test]
  fn header_then_quoted_rows() {
    let csv = to_csv(&[user("Alan", "Turing")]);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines, [
      "First Name,Last Name,Email,Mobile,Gender,Status",
      r#""Alan","Turing","someone@example.com","0123456789","Male","Inactive""#,
    ]);
  }

  #[test]
  fn embedded_quotes_and_commas_stay_in_one_cell() {
    let csv = to_csv(&[user("Jo \"JJ\"", "Smith, Jr")]);
    let row = csv.lines().nth(1).unwrap();
    assert!(row.starts_with(r#""Jo ""JJ""","Smith, Jr","#), "row: {row}");
  }

  #[test]
  fn no_users_yields_header_only() {
    assert_eq!(to_csv(&[]), "First Name,Last Name,Email,Mobile,Gender,Status");
  }
}
