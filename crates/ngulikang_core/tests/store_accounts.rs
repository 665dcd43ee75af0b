use ngulikang_core::db::DbError;
use ngulikang_core::model::tradesperson::ProfileDetails;
use ngulikang_core::seed::{ensure_account, should_seed, Ensured};
use ngulikang_core::{
    Account, EntityKind, Role, SeedStore, SqliteStore, StoreError, ValidationError,
};
use rust_decimal::Decimal;

fn customer(email: &str) -> Account {
    Account::new("User", email, "digest", Role::Customer)
}

fn details() -> ProfileDetails {
    ProfileDetails {
        skills: vec!["Plumbing".to_string()],
        experience: "4 tahun".to_string(),
        rating: 4.2,
        verified: true,
        balance: Decimal::from(750_000),
    }
}

#[test]
fn ensure_account_returns_same_id_for_same_email() {
    let store = SqliteStore::open_in_memory().unwrap();

    let first = ensure_account(&store, &customer("user1@example.com")).unwrap();
    assert!(first.is_created());

    let mut renamed = customer("user1@example.com");
    renamed.name = "Someone Else".to_string();
    let second = ensure_account(&store, &renamed).unwrap();
    assert!(matches!(second, Ensured::Existing(_)));

    let first = first.into_inner();
    let second = second.into_inner();
    assert_eq!(first.id, second.id);
    assert_eq!(second.name, "User");
    assert_eq!(store.count(EntityKind::Account).unwrap(), 1);
}

#[test]
fn duplicate_email_outside_lookup_path_is_a_constraint_violation() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.create_account(&customer("dup@example.com")).unwrap();

    let err = store
        .create_account(&customer("dup@example.com"))
        .unwrap_err();
    assert!(matches!(err, StoreError::ConstraintViolation(_)));
}

#[test]
fn invalid_account_is_rejected_before_write() {
    let store = SqliteStore::open_in_memory().unwrap();

    let err = store.create_account(&customer("no-at-sign")).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::InvalidEmail(_))
    ));
    assert_eq!(store.count(EntityKind::Account).unwrap(), 0);
}

#[test]
fn should_seed_flips_once_rows_exist() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert!(should_seed(&store, EntityKind::Account).unwrap());

    store.create_account(&customer("user1@example.com")).unwrap();
    assert!(!should_seed(&store, EntityKind::Account).unwrap());
    assert!(should_seed(&store, EntityKind::Order).unwrap());
}

#[test]
fn tradesperson_is_created_with_profile_and_read_back() {
    let store = SqliteStore::open_in_memory().unwrap();
    let account = Account::new("Tukang 1", "tukang1@ngulikang.com", "digest", Role::Tradesperson);

    let (created_account, profile) = store.create_tradesperson(&account, &details()).unwrap();
    assert_eq!(profile.account_id, created_account.id);

    let listed = store.list_tradespeople().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, profile.id);
    assert_eq!(listed[0].details, details());
    assert_eq!(
        store.list_accounts(Role::Tradesperson).unwrap()[0].id,
        created_account.id
    );
}

#[test]
fn failed_profile_insert_leaves_no_orphan_account() {
    let store = SqliteStore::open_in_memory().unwrap();
    let account = Account::new("Tukang 1", "tukang1@ngulikang.com", "digest", Role::Tradesperson);
    store.create_tradesperson(&account, &details()).unwrap();

    let mut other = account.clone();
    other.email = "tukang2@ngulikang.com".to_string();
    store
        .connection()
        .execute_batch("DROP TABLE tradesperson_profiles;")
        .unwrap();

    let err = store.create_tradesperson(&other, &details()).unwrap_err();
    assert!(matches!(err, StoreError::Db(_)), "unexpected error: {err}");
    assert!(store
        .find_account_by_email("tukang2@ngulikang.com")
        .unwrap()
        .is_none());
}

#[test]
fn profile_for_non_tradesperson_is_rejected() {
    let store = SqliteStore::open_in_memory().unwrap();

    let err = store
        .create_tradesperson(&customer("user1@example.com"), &details())
        .unwrap_err();
    assert!(matches!(err, StoreError::ConstraintViolation(_)));
    assert_eq!(store.count(EntityKind::Account).unwrap(), 0);
}

#[test]
fn corrupted_role_is_reported_as_invalid_data() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.create_account(&customer("user1@example.com")).unwrap();
    store
        .connection()
        .execute_batch(
            "PRAGMA ignore_check_constraints = ON;
             UPDATE accounts SET role = 'tukang';",
        )
        .unwrap();

    let err = store
        .find_account_by_email("user1@example.com")
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn close_releases_the_connection() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("seed.db")).unwrap();
    store.create_account(&customer("user1@example.com")).unwrap();
    store.close().unwrap();

    let reopened = SqliteStore::open(dir.path().join("seed.db")).unwrap();
    assert_eq!(reopened.count(EntityKind::Account).unwrap(), 1);
}

#[test]
fn unreachable_store_is_a_connectivity_error() {
    let dir = tempfile::tempdir().unwrap();

    let err = SqliteStore::open(dir.path().join("missing").join("seed.db")).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Connectivity(DbError::Open { .. })
    ));
    assert!(err.to_string().starts_with("store unavailable"));
}
