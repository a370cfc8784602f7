#![cfg(not(target_arch = "wasm32"))]

mod common;

use chrono::{TimeZone, Utc};

use todo_universe::account::{AccountStore, Login, TodoId};
use todo_universe::storage::{MemoryStorage, Storage};
use todo_universe::clock::ManualClock;
use todo_universe::notify::Severity;
use todo_universe::UniverseError;

use common::{harness, START_MS};

const KEY: &str = "3d-todo-universe-data";

fn now() -> chrono::DateTime<Utc> {
    Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
}

#[test]
fn empty_storage_is_seeded_and_written_back() {
    let store = AccountStore::load(MemoryStorage::new(), KEY, now());

    let demo = store.account("demo").expect("demo seeded");
    assert_eq!(demo.password, "demo");
    assert_eq!(demo.todos.len(), 5);
    let ids: Vec<_> = demo.todos.iter().map(|t| t.id).collect();
    assert_eq!(ids, (1..=5).map(TodoId).collect::<Vec<_>>());
    assert!(store.account("tuba").is_some());

    let raw = store.storage().get(KEY).unwrap().expect("seed persisted");
    assert!(raw.contains("\"demo\""));
}

#[test]
fn registered_accounts_survive_a_reload() {
    let mut store = AccountStore::load(MemoryStorage::new(), KEY, now());
    store.register("ada", "secret", "ada@example.com", now()).unwrap();
    store.account_mut("ada").unwrap().todos.push(todo_universe::account::Todo::new(
        TodoId(42),
        "Map the nebula",
        now(),
    ));
    store.save().unwrap();
    let snapshot = store.accounts().clone();

    let reloaded = AccountStore::load(store.into_storage(), KEY, now());
    assert_eq!(reloaded.accounts(), &snapshot);
    let ada = reloaded.account("ada").expect("persisted");
    assert_eq!(ada.email, "ada@example.com");
    assert_eq!(ada.todos.len(), 1);
    assert_eq!(ada.todos[0].text, "Map the nebula");
    assert!(!ada.todos[0].completed);
}

#[test]
fn persisted_blob_uses_camel_case_fields() {
    let store = AccountStore::load(MemoryStorage::new(), KEY, now());
    let raw = store.storage().get(KEY).unwrap().unwrap();
    assert!(raw.contains("\"createdAt\""));
    assert!(!raw.contains("created_at"));
}

#[test]
fn malformed_blob_is_replaced_by_the_seed() {
    let storage = MemoryStorage::with_entry(KEY, "{not json");
    let store = AccountStore::load(storage, KEY, now());
    assert!(store.account("demo").is_some());
    let raw = store.storage().get(KEY).unwrap().unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&raw).is_ok());
}

#[test]
fn existing_blob_is_not_reseeded() {
    let storage = MemoryStorage::with_entry(
        KEY,
        r#"{"solo":{"password":"pw","email":"solo@x.io","todos":[],"createdAt":"2024-01-01T00:00:00Z"}}"#,
    );
    let store = AccountStore::load(storage, KEY, now());
    assert_eq!(store.accounts().len(), 1);
    assert!(store.account("demo").is_none());
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut store = AccountStore::load(MemoryStorage::new(), KEY, now());
    let err = store.register("demo", "x", "x@x", now()).unwrap_err();
    assert!(matches!(err, UniverseError::DuplicateUser(name) if name == "demo"));
    assert_eq!(store.account("demo").unwrap().password, "demo");
}

#[test]
fn authenticate_checks_password_and_auto_creates() {
    let mut store = AccountStore::load(MemoryStorage::new(), KEY, now());

    assert_eq!(store.authenticate("demo", "demo", now()).unwrap(), Login::Existing);
    assert!(matches!(
        store.authenticate("demo", "wrong", now()),
        Err(UniverseError::BadCredentials)
    ));

    assert_eq!(store.authenticate("nova", "pw", now()).unwrap(), Login::Created);
    let nova = store.account("nova").unwrap();
    assert_eq!(nova.email, "nova@demo.com");
    assert!(nova.todos.is_empty());
    assert_eq!(store.authenticate("nova", "pw", now()).unwrap(), Login::Existing);

    let raw = store.storage().get(KEY).unwrap().unwrap();
    assert!(raw.contains("\"nova\""));
}

#[test]
fn mismatched_confirmation_is_rejected_before_anything_else() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    let before = h.universe.store().storage().get(KEY).unwrap();
    h.universe.notifier_mut().drain_pending();

    // "demo" exists, but the mismatch is what gets reported.
    let err = h.universe.register("demo", "demo@x.io", "one", "two").unwrap_err();
    assert!(matches!(err, UniverseError::PasswordMismatch));
    let err = h.universe.register("ada", "ada@x.io", "one", "two").unwrap_err();
    assert!(matches!(err, UniverseError::PasswordMismatch));

    assert!(h.universe.store().account("ada").is_none());
    assert_eq!(h.universe.store().storage().get(KEY).unwrap(), before);
    let popups = h.universe.notifier_mut().drain_pending();
    assert_eq!(popups.len(), 2);
    assert!(popups
        .iter()
        .all(|n| n.severity == Severity::Error && n.message == "Passwords do not match."));
}

#[test]
fn registration_persists_and_announces_success() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    h.universe.notifier_mut().drain_pending();

    h.universe.register("ada", "ada@x.io", "pw", "pw").unwrap();
    let ada = h.universe.store().account("ada").expect("registered");
    assert_eq!(ada.email, "ada@x.io");
    assert!(ada.todos.is_empty());
    let raw = h.universe.store().storage().get(KEY).unwrap().unwrap();
    assert!(raw.contains("\"ada\""));

    let popups = h.universe.notifier_mut().drain_pending();
    assert_eq!(popups.len(), 1);
    assert_eq!(popups[0].severity, Severity::Success);
    assert_eq!(popups[0].message, "Registration successful!");

    // Registering does not log in.
    assert!(h.universe.session().current_user.is_none());
}

#[test]
fn duplicate_registration_is_reported() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    h.universe.notifier_mut().drain_pending();

    let err = h.universe.register("demo", "d@x.io", "pw", "pw").unwrap_err();
    assert!(matches!(err, UniverseError::DuplicateUser(_)));
    let popups = h.universe.notifier_mut().drain_pending();
    assert_eq!(popups[0].message, "Username already exists.");
    assert_eq!(h.universe.store().account("demo").unwrap().password, "demo");
}
