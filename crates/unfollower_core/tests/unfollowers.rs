use std::collections::HashSet;
use unfollower_core::db::open_db_in_memory;
use unfollower_core::{
    AccountId, ReplaceOutcome, SqliteUnfollowerRepository, UnfollowerRecord,
    UnfollowerRepository, UnfollowerStore,
};

fn ids(values: &[AccountId]) -> HashSet<AccountId> {
    values.iter().copied().collect()
}

fn memory_store() -> UnfollowerStore {
    UnfollowerStore::open("sqlite://").unwrap()
}

#[test]
fn unknown_user_has_no_unfollowers() {
    let store = memory_store();
    assert!(store.known_unfollowers(12345).unwrap().is_empty());
}

#[test]
fn replace_then_read_returns_the_snapshot() {
    let store = memory_store();

    store
        .replace_known_unfollowers(1, 10, &ids(&[100, 101]))
        .unwrap();

    assert_eq!(store.known_unfollowers(1).unwrap(), ids(&[100, 101]));
}

#[test]
fn replace_overwrites_instead_of_merging() {
    let store = memory_store();

    store
        .replace_known_unfollowers(1, 10, &ids(&[100, 101]))
        .unwrap();
    store
        .replace_known_unfollowers(1, 10, &ids(&[102]))
        .unwrap();

    assert_eq!(store.known_unfollowers(1).unwrap(), ids(&[102]));
}

#[test]
fn repeating_the_same_replace_does_not_duplicate_rows() {
    let store = memory_store();
    let snapshot = ids(&[100, 101]);

    store.replace_known_unfollowers(1, 10, &snapshot).unwrap();
    store.replace_known_unfollowers(1, 10, &snapshot).unwrap();

    assert_eq!(store.known_unfollowers(1).unwrap(), snapshot);

    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUnfollowerRepository::new(&conn);
    repo.replace_unfollowers(1, 10, &snapshot).unwrap();
    let outcome = repo.replace_unfollowers(1, 10, &snapshot).unwrap();
    assert_eq!(
        outcome,
        ReplaceOutcome {
            removed: 2,
            inserted: 2
        }
    );
    assert_eq!(repo.list_records(1, 10).unwrap().len(), 2);
}

#[test]
fn empty_replace_clears_only_that_pair() {
    let store = memory_store();

    store
        .replace_known_unfollowers(1, 10, &ids(&[100, 101]))
        .unwrap();
    store
        .replace_known_unfollowers(1, 20, &ids(&[200]))
        .unwrap();
    assert_eq!(
        store.known_unfollowers(1).unwrap(),
        ids(&[100, 101, 200])
    );

    store.replace_known_unfollowers(1, 10, &ids(&[])).unwrap();

    assert_eq!(store.known_unfollowers(1).unwrap(), ids(&[200]));
}

#[test]
fn users_do_not_see_each_others_unfollowers() {
    let store = memory_store();

    store
        .replace_known_unfollowers(1, 10, &ids(&[100]))
        .unwrap();
    store
        .replace_known_unfollowers(2, 10, &ids(&[900]))
        .unwrap();

    assert_eq!(store.known_unfollowers(1).unwrap(), ids(&[100]));
    assert_eq!(store.known_unfollowers(2).unwrap(), ids(&[900]));

    store.replace_known_unfollowers(2, 10, &ids(&[])).unwrap();
    assert_eq!(store.known_unfollowers(1).unwrap(), ids(&[100]));
}

#[test]
fn same_unfollower_under_two_accounts_is_reported_once() {
    let store = memory_store();

    store
        .replace_known_unfollowers(1, 10, &ids(&[100, 300]))
        .unwrap();
    store
        .replace_known_unfollowers(1, 20, &ids(&[300]))
        .unwrap();

    assert_eq!(store.known_unfollowers(1).unwrap(), ids(&[100, 300]));
}

#[test]
fn repository_lists_records_of_one_pair_in_id_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUnfollowerRepository::new(&conn);

    repo.replace_unfollowers(1, 10, &ids(&[102, 100, 101]))
        .unwrap();
    repo.replace_unfollowers(1, 20, &ids(&[200])).unwrap();

    let records = repo.list_records(1, 10).unwrap();
    let expected = [100, 101, 102]
        .into_iter()
        .map(|unfollower_account_id| UnfollowerRecord {
            requesting_user_id: 1,
            monitored_account_id: 10,
            unfollower_account_id,
        })
        .collect::<Vec<_>>();
    assert_eq!(records, expected);
    assert!(repo.list_records(2, 10).unwrap().is_empty());
}

#[test]
fn negative_and_extreme_ids_are_stored_verbatim() {
    let store = memory_store();
    let snapshot = ids(&[-1, 0, i64::MAX, i64::MIN]);

    store
        .replace_known_unfollowers(i64::MIN, -5, &snapshot)
        .unwrap();

    assert_eq!(store.known_unfollowers(i64::MIN).unwrap(), snapshot);
}

#[test]
fn store_lists_records_of_one_pair() {
    let store = memory_store();

    store
        .replace_known_unfollowers(3, 30, &ids(&[301, 300]))
        .unwrap();
    store
        .replace_known_unfollowers(3, 40, &ids(&[400]))
        .unwrap();

    let records = store.unfollower_records(3, 30).unwrap();
    assert_eq!(
        records
            .iter()
            .map(|record| record.unfollower_account_id)
            .collect::<Vec<_>>(),
        vec![300, 301]
    );
    assert!(records
        .iter()
        .all(|record| record.requesting_user_id == 3 && record.monitored_account_id == 30));
    assert!(store.unfollower_records(3, 50).unwrap().is_empty());
}
