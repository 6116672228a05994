use std::collections::HashSet;
use unfollower_core::db::open_db_in_memory;
use unfollower_core::{
    RepoError, SettingsRepository, SqliteSettingsRepository, UnfollowerStore, UserSettings,
};

fn memory_store() -> UnfollowerStore {
    UnfollowerStore::open(":memory:").unwrap()
}

#[test]
fn unknown_user_reads_are_empty_and_create_nothing() {
    let store = memory_store();

    assert_eq!(store.linked_account_id(42).unwrap(), None);
    assert_eq!(store.language(42).unwrap(), None);
    assert_eq!(store.user_settings(42).unwrap(), None);
    assert!(store.notification_enabled_user_ids().unwrap().is_empty());
    assert_eq!(store.user_settings(42).unwrap(), None);
}

#[test]
fn set_language_creates_row_with_defaults() {
    let store = memory_store();

    store.set_language(42, Some("en")).unwrap();

    assert_eq!(store.language(42).unwrap().as_deref(), Some("en"));
    assert_eq!(store.linked_account_id(42).unwrap(), None);
    assert_eq!(
        store.user_settings(42).unwrap(),
        Some(UserSettings {
            requesting_user_id: 42,
            linked_account_id: None,
            notifications_enabled: false,
            language: Some("en".to_string()),
        })
    );
}

#[test]
fn set_language_none_clears_it_and_keeps_other_fields() {
    let store = memory_store();

    store.set_linked_account_id(42, 555).unwrap();
    store.set_language(42, Some("ru")).unwrap();
    store.set_language(42, None).unwrap();

    assert_eq!(store.language(42).unwrap(), None);
    assert_eq!(store.linked_account_id(42).unwrap(), Some(555));
}

#[test]
fn set_language_none_on_fresh_user_still_creates_row() {
    let store = memory_store();

    store.set_language(7, None).unwrap();

    assert_eq!(store.user_settings(7).unwrap(), Some(UserSettings::new(7)));
    assert!(store.enable_notifications(7).unwrap());
}

#[test]
fn set_linked_account_creates_then_updates_in_place() {
    let store = memory_store();

    store.set_linked_account_id(99, 555).unwrap();
    store.set_language(99, Some("en")).unwrap();
    store.set_linked_account_id(99, 777).unwrap();

    let settings = store.user_settings(99).unwrap().unwrap();
    assert_eq!(settings.linked_account_id, Some(777));
    assert_eq!(settings.language.as_deref(), Some("en"));
    assert!(!settings.notifications_enabled);
}

#[test]
fn notification_toggle_requires_existing_row() {
    let store = memory_store();

    assert!(!store.enable_notifications(99).unwrap());
    assert!(!store.disable_notifications(99).unwrap());
    assert_eq!(store.user_settings(99).unwrap(), None);

    store.set_linked_account_id(99, 555).unwrap();
    assert!(store.enable_notifications(99).unwrap());
    assert!(store.notification_enabled_user_ids().unwrap().contains(&99));
}

#[test]
fn notification_toggles_are_idempotent() {
    let store = memory_store();
    store.set_linked_account_id(5, 50).unwrap();

    assert!(store.enable_notifications(5).unwrap());
    assert!(store.enable_notifications(5).unwrap());
    assert!(store.user_settings(5).unwrap().unwrap().notifications_enabled);

    assert!(store.disable_notifications(5).unwrap());
    assert!(store.disable_notifications(5).unwrap());
    assert!(!store.user_settings(5).unwrap().unwrap().notifications_enabled);
}

#[test]
fn notification_enabled_ids_track_toggles() {
    let store = memory_store();
    for user_id in [1, 2, 3] {
        store.set_linked_account_id(user_id, user_id * 100).unwrap();
    }

    store.enable_notifications(1).unwrap();
    store.enable_notifications(3).unwrap();
    assert_eq!(
        store.notification_enabled_user_ids().unwrap(),
        HashSet::from([1, 3])
    );

    store.disable_notifications(1).unwrap();
    assert_eq!(
        store.notification_enabled_user_ids().unwrap(),
        HashSet::from([3])
    );
}

#[test]
fn repository_keeps_one_row_per_user() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSettingsRepository::new(&conn);

    repo.upsert_language(8, Some("de")).unwrap();
    repo.upsert_linked_account(8, 800).unwrap();
    repo.upsert_language(8, Some("fr")).unwrap();

    let rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM telegram_users WHERE telegram_id = 8;",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(
        repo.get_settings(8).unwrap(),
        Some(UserSettings {
            requesting_user_id: 8,
            linked_account_id: Some(800),
            notifications_enabled: false,
            language: Some("fr".to_string()),
        })
    );
}

#[test]
fn repository_rejects_corrupt_notification_flag() {
    let conn = open_db_in_memory().unwrap();
    // Legacy databases were created without the CHECK constraint.
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO telegram_users (telegram_id, is_notified) VALUES (3, 2);",
    )
    .unwrap();
    let repo = SqliteSettingsRepository::new(&conn);

    let err = repo.get_settings(3).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("is_notified")));
}

#[test]
fn user_settings_serialize_with_field_names() {
    let mut settings = UserSettings::new(1);
    settings.language = Some("en".to_string());

    let json = serde_json::to_value(&settings).unwrap();
    assert_eq!(json["requesting_user_id"], 1);
    assert_eq!(json["linked_account_id"], serde_json::Value::Null);
    assert_eq!(json["notifications_enabled"], false);
    assert_eq!(json["language"], "en");
}
