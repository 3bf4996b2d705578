//! Integration tests for [`support_bot::Registrar`] with a static phone
//! directory.

use std::sync::Arc;

use storage::SupportStore;
use support_bot::{ObjectCache, Registrar, Registration};
use support_core::{StaticLookup, User};
use tempfile::TempDir;

async fn new_registrar(lookup: StaticLookup) -> (TempDir, SupportStore, Registrar) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("support.db");
    let store = SupportStore::new(path.to_str().expect("utf-8 path"))
        .await
        .expect("Failed to create store");
    let registrar = Registrar::new(store.clone(), Arc::new(lookup), ObjectCache::new());
    (dir, store, registrar)
}

fn user(tg_id: i64) -> User {
    User {
        id: tg_id,
        username: Some(format!("user{tg_id}")),
        first_name: Some("Ada".to_string()),
        last_name: None,
    }
}

/// **Test: Known phone registers the customer and backfills the name.**
///
/// **Setup:** Directory maps `+100` to `Grace`.
/// **Action:** `register(&user, "+100")`.
/// **Expected:** `Registered { name: Some("Grace") }`; customer row exists
/// with first name `Grace`; tg_user row exists.
#[tokio::test]
async fn test_register_known_phone() {
    let lookup = StaticLookup::new().with_entry("+100", "Grace");
    let (_dir, store, registrar) = new_registrar(lookup).await;

    let outcome = registrar
        .register(&user(10), "+100")
        .await
        .expect("Registration should succeed");
    assert_eq!(
        outcome,
        Registration::Registered {
            name: Some("Grace".to_string())
        }
    );

    let customer = store
        .get_customer_by_tg_id(10)
        .await
        .expect("Failed to query")
        .expect("Customer should exist");
    assert_eq!(customer.phone, "+100");
    assert_eq!(customer.first_name.as_deref(), Some("Grace"));

    let tg_user = store
        .get_tg_user(10)
        .await
        .expect("Failed to query")
        .expect("User row should exist");
    assert_eq!(tg_user.tg_username.as_deref(), Some("user10"));
}

/// **Test: A directory hit with an empty name still registers.**
///
/// **Setup:** Directory maps `+100` to an empty string.
/// **Action:** `register(&user, "+100")`.
/// **Expected:** `Registered { name: None }`; no name backfill.
#[tokio::test]
async fn test_register_known_phone_without_name() {
    let lookup = StaticLookup::new().with_entry("+100", "");
    let (_dir, store, registrar) = new_registrar(lookup).await;

    let outcome = registrar
        .register(&user(10), "+100")
        .await
        .expect("Registration should succeed");
    assert_eq!(outcome, Registration::Registered { name: None });

    let customer = store
        .get_customer_by_tg_id(10)
        .await
        .expect("Failed to query")
        .expect("Customer should exist");
    assert!(customer.first_name.is_none());
}

/// **Test: Unknown phone is rejected before any row is written.**
///
/// **Setup:** Empty directory.
/// **Action:** `register(&user, "+100")`.
/// **Expected:** `PhoneUnknown`; no customer row.
#[tokio::test]
async fn test_register_unknown_phone() {
    let (_dir, store, registrar) = new_registrar(StaticLookup::new()).await;

    let outcome = registrar
        .register(&user(10), "+100")
        .await
        .expect("Lookup should succeed");
    assert_eq!(outcome, Registration::PhoneUnknown);

    assert!(store
        .get_customer_by_tg_id(10)
        .await
        .expect("Failed to query")
        .is_none());
}

/// **Test: A phone already owned by another customer is reported taken.**
///
/// **Setup:** User 10 registered under `+100`.
/// **Action:** User 20 registers with `+100`.
/// **Expected:** `PhoneTaken`; user 20 has no customer row; user 10 keeps the
/// phone.
#[tokio::test]
async fn test_register_phone_taken() {
    let lookup = StaticLookup::new().with_entry("+100", "Grace");
    let (_dir, store, registrar) = new_registrar(lookup).await;

    registrar
        .register(&user(10), "+100")
        .await
        .expect("First registration should succeed");

    let outcome = registrar
        .register(&user(20), "+100")
        .await
        .expect("Second attempt should resolve, not error");
    assert_eq!(outcome, Registration::PhoneTaken);

    assert!(store
        .get_customer_by_tg_id(20)
        .await
        .expect("Failed to query")
        .is_none());
    let owner = store
        .get_customer_by_phone("+100")
        .await
        .expect("Failed to query")
        .expect("Owner should exist");
    assert_eq!(owner.tg_id, 10);
}

/// **Test: Operator grant needs only the database path.**
///
/// **Setup:** A temp DB path and nothing else configured.
/// **Action:** `add_operator(path, 7)` twice.
/// **Expected:** The grant is recorded, visible through the store, and the
/// repeat succeeds.
#[tokio::test]
async fn test_add_operator_needs_only_database_path() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("support.db");
    let path = path.to_str().expect("utf-8 path");

    support_bot::add_operator(path, 7)
        .await
        .expect("Grant should succeed");
    support_bot::add_operator(path, 7)
        .await
        .expect("Repeat grant should succeed");

    let store = SupportStore::new(path).await.expect("Failed to open store");
    assert!(store.is_operator(7).await.expect("Failed to check"));
}

/// **Test: `start` creates the user row and is idempotent.**
///
/// **Setup:** Empty store.
/// **Action:** `start(&user)` twice.
/// **Expected:** One tg_user row with the username; no customer row.
#[tokio::test]
async fn test_start_is_idempotent() {
    let (_dir, store, registrar) = new_registrar(StaticLookup::new()).await;

    registrar.start(&user(10)).await.expect("Start should succeed");
    registrar.start(&user(10)).await.expect("Repeat start should succeed");

    let tg_user = store
        .get_tg_user(10)
        .await
        .expect("Failed to query")
        .expect("User row should exist");
    assert_eq!(tg_user.tg_username.as_deref(), Some("user10"));
    assert!(store
        .get_customer_by_tg_id(10)
        .await
        .expect("Failed to query")
        .is_none());
}
