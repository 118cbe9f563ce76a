//! Integration tests for `SqliteStore` and `UserDirectory` against an
//! in-memory database.

use std::{sync::Arc, time::Duration};

use roster_core::{
  Error as CoreError, UserDirectory,
  store::{StoreError, UserFilter, UserQuery, UserStore},
  user::{Gender, NewUser, Status, UserChanges, UserInput},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn directory() -> UserDirectory<SqliteStore> {
  UserDirectory::new(Arc::new(store().await))
}

fn new_user(first: &str, email: &str) -> NewUser {
  NewUser {
    first_name:    first.into(),
    last_name:     "Hopper".into(),
    email:         email.into(),
    mobile:        "5551234567".into(),
    gender:        Gender::Female,
    status:        Status::Active,
    profile_image: None,
  }
}

fn input(first: &str, last: &str, email: &str) -> UserInput {
  UserInput {
    first_name:    Some(first.into()),
    last_name:     Some(last.into()),
    email:         Some(email.into()),
    mobile:        Some("5551234567".into()),
    gender:        Some("Male".into()),
    status:        None,
    profile_image: None,
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get() {
  let s = store().await;

  let user = s.insert(new_user("Grace", "grace@navy.mil")).await.unwrap();
  assert_eq!(user.created_at, user.updated_at);

  let fetched = s.get(user.id).await.unwrap();
  assert_eq!(fetched, Some(user));
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn unique_index_rejects_duplicate_email() {
  let s = store().await;
  s.insert(new_user("Grace", "grace@navy.mil")).await.unwrap();

  let err = s.insert(new_user("Other", "grace@navy.mil")).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateEmail));
  assert!(err.is_duplicate_email());
}

#[tokio::test]
async fn update_to_taken_email_is_a_duplicate() {
  let s = store().await;
  s.insert(new_user("Grace", "grace@navy.mil")).await.unwrap();
  let other = s.insert(new_user("Ada", "ada@example.com")).await.unwrap();

  let changes = UserChanges {
    email: Some("grace@navy.mil".into()),
    ..UserChanges::default()
  };
  let err = s.update(other.id, changes).await.unwrap_err();
  assert!(err.is_duplicate_email());
}

#[tokio::test]
async fn update_only_touches_given_fields() {
  let s = store().await;
  let user = s.insert(new_user("Grace", "grace@navy.mil")).await.unwrap();

  let changes = UserChanges {
    status: Some(Status::Inactive),
    profile_image: Some("https://img.example.com/g.png".into()),
    ..UserChanges::default()
  };
  let updated = s.update(user.id, changes).await.unwrap().unwrap();

  assert_eq!(updated.status, Status::Inactive);
  assert_eq!(
    updated.profile_image.as_deref(),
    Some("https://img.example.com/g.png")
  );
  assert_eq!(updated.first_name, user.first_name);
  assert_eq!(updated.email, user.email);
  assert_eq!(updated.created_at, user.created_at);
}

#[tokio::test]
async fn update_missing_returns_none() {
  let s = store().await;
  let result = s.update(Uuid::new_v4(), UserChanges::default()).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn delete_returns_last_state() {
  let s = store().await;
  let user = s.insert(new_user("Grace", "grace@navy.mil")).await.unwrap();

  assert_eq!(s.delete(user.id).await.unwrap(), Some(user.clone()));
  assert!(s.get(user.id).await.unwrap().is_none());
  assert!(s.delete(user.id).await.unwrap().is_none());
}

#[tokio::test]
async fn find_orders_newest_first() {
  let s = store().await;
  let first = s.insert(new_user("First", "1@example.com")).await.unwrap();
  let second = s.insert(new_user("Second", "2@example.com")).await.unwrap();
  let third = s.insert(new_user("Third", "3@example.com")).await.unwrap();

  let all = s.find(&UserQuery::default()).await.unwrap();
  let ids: Vec<Uuid> = all.iter().map(|u| u.id).collect();
  assert_eq!(ids, [third.id, second.id, first.id]);
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
  let s = store().await;
  s.insert(new_user("Per_cent", "a@example.com")).await.unwrap();
  s.insert(new_user("Percent", "b@example.com")).await.unwrap();

  let filter = UserFilter { search: Some("r_c".into()) };
  assert_eq!(s.count(&filter).await.unwrap(), 1);

  let filter = UserFilter { search: Some("%".into()) };
  assert_eq!(s.count(&filter).await.unwrap(), 0);
}

#[tokio::test]
async fn reopened_file_keeps_users() {
  let path = std::env::temp_dir().join(format!("roster-{}.db", Uuid::new_v4()));

  let id = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.insert(new_user("Grace", "grace@navy.mil")).await.unwrap().id
  };

  let s = SqliteStore::open(&path).await.unwrap();
  let user = s.get(id).await.unwrap().unwrap();
  assert_eq!(user.email, "grace@navy.mil");

  drop(s);
  let _ = std::fs::remove_file(&path);
}

// ─── Directory: create / get ─────────────────────────────────────────────────

#[tokio::test]
async fn create_then_get_returns_same_record() {
  let d = directory().await;

  let created = d
    .create_user(input(" Linus ", "Torvalds", "Linus@Kernel.org"))
    .await
    .unwrap();
  assert_eq!(created.first_name, "Linus");
  assert_eq!(created.email, "linus@kernel.org");
  assert_eq!(created.gender, Gender::Male);
  assert_eq!(created.status, Status::Active);

  let fetched = d.get_user(&created.id.to_string()).await.unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn duplicate_email_differs_only_in_case() {
  let d = directory().await;
  d.create_user(input("Linus", "Torvalds", "linus@kernel.org"))
    .await
    .unwrap();

  let err = d
    .create_user(input("Other", "Person", "LINUS@kernel.org"))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::DuplicateEmail(e) if e == "linus@kernel.org"));
}

#[tokio::test]
async fn validation_runs_before_uniqueness() {
  let d = directory().await;
  d.create_user(input("Linus", "Torvalds", "linus@kernel.org"))
    .await
    .unwrap();

  let mut bad = input("L", "Torvalds", "linus@kernel.org");
  bad.mobile = Some("12345".into());
  match d.create_user(bad).await.unwrap_err() {
    CoreError::Validation(errors) => {
      let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
      assert_eq!(fields, ["firstName", "mobile"]);
    }
    other => panic!("expected validation error, got {other:?}"),
  }
}

#[tokio::test]
async fn invalid_mobiles_rejected_on_create_and_update() {
  let d = directory().await;
  let user = d
    .create_user(input("Linus", "Torvalds", "linus@kernel.org"))
    .await
    .unwrap();
  let id = user.id.to_string();

  for bad in ["12345", "12345678901", "12345abcde"] {
    let mut create = input("Ken", "Thompson", "ken@bell-labs.com");
    create.mobile = Some(bad.into());
    assert!(
      matches!(d.create_user(create).await, Err(CoreError::Validation(_))),
      "create accepted {bad}"
    );

    let update = UserInput { mobile: Some(bad.into()), ..UserInput::default() };
    assert!(
      matches!(d.update_user(&id, update).await, Err(CoreError::Validation(_))),
      "update accepted {bad}"
    );
  }
}

#[tokio::test]
async fn malformed_and_unknown_ids_are_not_found() {
  let d = directory().await;
  assert!(matches!(
    d.get_user("not-a-uuid").await,
    Err(CoreError::UserNotFound(_))
  ));
  assert!(matches!(
    d.get_user(&Uuid::new_v4().to_string()).await,
    Err(CoreError::UserNotFound(_))
  ));
}

// ─── Directory: list ─────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_directory_lists_nothing() {
  let d = directory().await;
  let page = d.list_users(1, 10, Some("")).await.unwrap();
  assert!(page.users.is_empty());
  assert_eq!(page.pagination.total_users, 0);
  assert_eq!(page.pagination.total_pages, 0);
  assert_eq!(page.pagination.current_page, 1);
  assert_eq!(page.pagination.limit, 10);
}

#[tokio::test]
async fn second_page_of_fifteen() {
  let d = directory().await;
  let mut created = Vec::new();
  for i in 0..15 {
    let user = d
      .create_user(input(
        &format!("User{i:02}"),
        "Paged",
        &format!("user{i}@example.com"),
      ))
      .await
      .unwrap();
    created.push(user.id);
  }

  let page = d.list_users(2, 10, None).await.unwrap();
  assert_eq!(page.pagination.total_users, 15);
  assert_eq!(page.pagination.total_pages, 2);

  // Newest first: page 2 holds the 11th..15th newest, i.e. the five oldest.
  let ids: Vec<Uuid> = page.users.iter().map(|u| u.id).collect();
  let expected: Vec<Uuid> = created[..5].iter().rev().copied().collect();
  assert_eq!(ids, expected);
}

#[tokio::test]
async fn page_past_the_end_is_empty() {
  let d = directory().await;
  d.create_user(input("Linus", "Torvalds", "linus@kernel.org"))
    .await
    .unwrap();

  let page = d.list_users(3, 10, None).await.unwrap();
  assert!(page.users.is_empty());
  assert_eq!(page.pagination.total_users, 1);
  assert_eq!(page.pagination.total_pages, 1);
}

#[tokio::test]
async fn non_positive_page_or_limit_is_invalid() {
  let d = directory().await;
  for (page, limit) in [(0, 10), (1, 0), (-1, 10), (1, -5)] {
    assert!(
      matches!(
        d.list_users(page, limit, None).await,
        Err(CoreError::InvalidQuery(_))
      ),
      "page={page} limit={limit}"
    );
  }
}

#[tokio::test]
async fn search_matches_any_field_case_insensitively() {
  let d = directory().await;
  let by_domain = d
    .create_user(input("Alice", "Smith", "alice@acme.io"))
    .await
    .unwrap();
  let by_last_name = d
    .create_user(input("Bob", "Acmeson", "bob@example.com"))
    .await
    .unwrap();
  d.create_user(input("Carol", "Jones", "carol@example.com"))
    .await
    .unwrap();

  let page = d.list_users(1, 10, Some("ACME")).await.unwrap();
  let mut ids: Vec<Uuid> = page.users.iter().map(|u| u.id).collect();
  ids.sort();
  let mut expected = vec![by_domain.id, by_last_name.id];
  expected.sort();
  assert_eq!(ids, expected);
  assert_eq!(page.pagination.total_users, 2);

  let page = d.list_users(1, 10, Some("acme.io")).await.unwrap();
  assert_eq!(page.users.len(), 1);
  assert_eq!(page.users[0].id, by_domain.id);
}

#[tokio::test]
async fn search_folds_non_ascii_case() {
  let d = directory().await;
  let user = d
    .create_user(input("Ōe", "Élodie", "oe@example.com"))
    .await
    .unwrap();

  for term in ["ÉLODIE", "élodie", "Élo", "ŌE", "ōe"] {
    let page = d.list_users(1, 10, Some(term)).await.unwrap();
    assert_eq!(page.pagination.total_users, 1, "{term}");
    assert_eq!(page.users[0].id, user.id, "{term}");
  }
}

#[tokio::test]
async fn blank_search_is_ignored() {
  let d = directory().await;
  d.create_user(input("Linus", "Torvalds", "linus@kernel.org"))
    .await
    .unwrap();
  d.create_user(input("Ken", "Thompson", "ken@bell-labs.com"))
    .await
    .unwrap();

  for term in ["", "   ", "\t"] {
    let page = d.list_users(1, 10, Some(term)).await.unwrap();
    assert_eq!(page.pagination.total_users, 2, "{term:?}");
  }

  let page = d.list_users(1, 10, Some("  ken  ")).await.unwrap();
  assert_eq!(page.pagination.total_users, 1);
  assert_eq!(page.users[0].first_name, "Ken");
}

// ─── Directory: update ───────────────────────────────────────────────────────

#[tokio::test]
async fn update_mobile_only() {
  let d = directory().await;
  let user = d
    .create_user(input("Linus", "Torvalds", "linus@kernel.org"))
    .await
    .unwrap();

  tokio::time::sleep(Duration::from_millis(5)).await;

  let patch = UserInput {
    mobile: Some("1234567890".into()),
    ..UserInput::default()
  };
  let updated = d.update_user(&user.id.to_string(), patch).await.unwrap();

  assert_eq!(updated.mobile, "1234567890");
  assert_eq!(updated.first_name, user.first_name);
  assert_eq!(updated.last_name, user.last_name);
  assert_eq!(updated.email, user.email);
  assert_eq!(updated.gender, user.gender);
  assert_eq!(updated.status, user.status);
  assert_eq!(updated.created_at, user.created_at);
  assert!(updated.updated_at > user.updated_at);
}

#[tokio::test]
async fn back_to_back_updates_advance_updated_at() {
  let s = store().await;
  let user = s.insert(new_user("Grace", "grace@navy.mil")).await.unwrap();

  let mut last = user.updated_at;
  for mobile in ["1111111111", "2222222222", "3333333333"] {
    let changes = UserChanges {
      mobile: Some(mobile.into()),
      ..UserChanges::default()
    };
    let updated = s.update(user.id, changes).await.unwrap().unwrap();
    assert!(updated.updated_at > last, "{mobile}");
    assert_eq!(updated.created_at, user.created_at);
    last = updated.updated_at;
  }
}

#[tokio::test]
async fn empty_update_leaves_updated_at() {
  let d = directory().await;
  let user = d
    .create_user(input("Linus", "Torvalds", "linus@kernel.org"))
    .await
    .unwrap();

  tokio::time::sleep(Duration::from_millis(5)).await;

  let patch = UserInput {
    first_name: Some("  ".into()),
    ..UserInput::default()
  };
  let unchanged = d.update_user(&user.id.to_string(), patch).await.unwrap();
  assert_eq!(unchanged, user);
}

#[tokio::test]
async fn blank_values_never_clear_fields() {
  let d = directory().await;
  let user = d
    .create_user(input("Linus", "Torvalds", "linus@kernel.org"))
    .await
    .unwrap();

  let patch = UserInput {
    first_name: Some("".into()),
    last_name: Some("   ".into()),
    status: Some("Inactive".into()),
    ..UserInput::default()
  };
  let updated = d.update_user(&user.id.to_string(), patch).await.unwrap();
  assert_eq!(updated.first_name, "Linus");
  assert_eq!(updated.last_name, "Torvalds");
  assert_eq!(updated.status, Status::Inactive);
}

#[tokio::test]
async fn update_to_another_users_email_conflicts() {
  let d = directory().await;
  d.create_user(input("Linus", "Torvalds", "linus@kernel.org"))
    .await
    .unwrap();
  let ken = d
    .create_user(input("Ken", "Thompson", "ken@bell-labs.com"))
    .await
    .unwrap();

  let patch = UserInput {
    email: Some("Linus@Kernel.org".into()),
    ..UserInput::default()
  };
  let err = d.update_user(&ken.id.to_string(), patch).await.unwrap_err();
  assert!(matches!(err, CoreError::DuplicateEmail(_)));
}

#[tokio::test]
async fn update_keeping_own_email_is_fine() {
  let d = directory().await;
  let user = d
    .create_user(input("Linus", "Torvalds", "linus@kernel.org"))
    .await
    .unwrap();

  let patch = UserInput {
    email: Some("LINUS@kernel.org".into()),
    first_name: Some("Linus B.".into()),
    ..UserInput::default()
  };
  let updated = d.update_user(&user.id.to_string(), patch).await.unwrap();
  assert_eq!(updated.email, "linus@kernel.org");
  assert_eq!(updated.first_name, "Linus B.");
}

#[tokio::test]
async fn update_unknown_user_is_not_found() {
  let d = directory().await;
  let err = d
    .update_user(&Uuid::new_v4().to_string(), UserInput::default())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::UserNotFound(_)));
}

// ─── Directory: delete ───────────────────────────────────────────────────────

#[tokio::test]
async fn delete_then_get_is_not_found() {
  let d = directory().await;
  let user = d
    .create_user(input("Linus", "Torvalds", "linus@kernel.org"))
    .await
    .unwrap();
  let id = user.id.to_string();

  let deleted = d.delete_user(&id).await.unwrap();
  assert_eq!(deleted, user);

  assert!(matches!(d.get_user(&id).await, Err(CoreError::UserNotFound(_))));
  assert!(matches!(d.delete_user(&id).await, Err(CoreError::UserNotFound(_))));
}

// ─── Directory: export ───────────────────────────────────────────────────────

#[tokio::test]
async fn export_empty_directory_fails() {
  let d = directory().await;
  assert!(matches!(
    d.export_all_users().await,
    Err(CoreError::NothingToExport)
  ));
}

#[tokio::test]
async fn export_lists_every_user_newest_first() {
  let d = directory().await;
  d.create_user(input("Linus", "Torvalds", "linus@kernel.org"))
    .await
    .unwrap();
  d.create_user(input("Ken", "Thompson", "ken@bell-labs.com"))
    .await
    .unwrap();

  let csv = d.export_all_users().await.unwrap();
  let lines: Vec<&str> = csv.lines().collect();
  assert_eq!(lines, [
    "First Name,Last Name,Email,Mobile,Gender,Status",
    r#""Ken","Thompson","ken@bell-labs.com","5551234567","Male","Active""#,
    r#""Linus","Torvalds","linus@kernel.org","5551234567","Male","Active""#,
  ]);
}
