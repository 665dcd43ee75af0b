use ngulikang_core::db::DbError;
use ngulikang_core::model::order::{OrderStatus, PayrollStatus};
use ngulikang_core::model::tradesperson::ApplicationStatus;
use ngulikang_core::seed::{HashError, SeedStep, StepId, SEED_PLAN};
use ngulikang_core::{
    seed_database, CredentialHasher, EntityKind, OrderListQuery, Role, SeedConfig, SeedError,
    SeedStore, Seeder, SqliteStore, StepOutcome, StoreError,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

/// Records every plaintext it is asked to hash.
#[derive(Default)]
struct RecordingHasher {
    calls: RefCell<Vec<String>>,
}

impl CredentialHasher for RecordingHasher {
    fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        self.calls.borrow_mut().push(plaintext.to_string());
        Ok(format!("hashed:{plaintext}"))
    }
}

fn counts(store: &SqliteStore) -> BTreeMap<&'static str, u64> {
    EntityKind::ALL
        .iter()
        .map(|kind| (kind.table_name(), store.count(*kind).unwrap()))
        .collect()
}

fn seed(store: &SqliteStore, config: SeedConfig) -> Result<ngulikang_core::SeedReport, SeedError> {
    let hasher = RecordingHasher::default();
    Seeder::new(store, &hasher, StdRng::seed_from_u64(1), config).run()
}

#[test]
fn full_run_populates_every_entity_type() {
    let store = SqliteStore::open_in_memory().unwrap();
    let report = seed(&store, SeedConfig::default()).unwrap();

    let counts = counts(&store);
    assert_eq!(counts["accounts"], 3 + 10 + 20);
    assert_eq!(counts["tradesperson_profiles"], 10);
    assert_eq!(counts["applications"], 5);
    assert_eq!(counts["products"], 15);
    assert_eq!(counts["orders"], 10);
    assert_eq!(counts["order_progress"], 3);
    assert_eq!(counts["payroll_entries"], 8);
    assert_eq!(counts["chat_threads"], 3);
    assert_eq!(counts["messages"], 9);
    assert_eq!(counts["notifications"], 10);
    assert_eq!(counts["cart_items"], 5);

    assert_eq!(report.customers.len(), 20);
    assert_eq!(report.tradespeople.len(), 10);
    assert_eq!(report.steps.len(), SEED_PLAN.len());
    assert_eq!(
        report.outcome(StepId::Orders),
        Some(StepOutcome::Seeded { records: 10 })
    );
}

#[test]
fn second_run_is_a_no_op() {
    let store = SqliteStore::open_in_memory().unwrap();
    seed(&store, SeedConfig::default()).unwrap();
    let after_first = counts(&store);

    let report = seed(&store, SeedConfig::default()).unwrap();
    assert_eq!(counts(&store), after_first);

    for step in &report.steps {
        match step.step {
            StepId::Accounts | StepId::Tradespeople => {
                assert_eq!(step.outcome, StepOutcome::Seeded { records: 0 })
            }
            _ => assert_eq!(step.outcome, StepOutcome::Skipped, "step {}", step.step),
        }
    }
}

#[test]
fn rerun_against_file_store_keeps_counts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ngulikang.db");
    let hasher = RecordingHasher::default();

    let first = seed_database(&path, SeedConfig::default(), &hasher, StdRng::seed_from_u64(3), |_| {})
        .unwrap();
    let mut progress = Vec::new();
    let second = seed_database(
        &path,
        SeedConfig::default(),
        &hasher,
        StdRng::seed_from_u64(4),
        |step| progress.push(step.step),
    )
    .unwrap();

    let ids = |report: &ngulikang_core::SeedReport| {
        report
            .customers
            .iter()
            .map(|customer| customer.id)
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(progress.len(), SEED_PLAN.len());

    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.count(EntityKind::Order).unwrap(), 10);
    assert_eq!(store.count(EntityKind::Account).unwrap(), 33);
}

#[test]
fn each_password_tier_is_hashed_once_per_run() {
    let store = SqliteStore::open_in_memory().unwrap();
    let hasher = RecordingHasher::default();

    Seeder::new(&store, &hasher, StdRng::seed_from_u64(1), SeedConfig::default())
        .run()
        .unwrap();

    let calls = hasher.calls.borrow();
    assert_eq!(calls.len(), 3);
    let tiers: HashSet<_> = calls.iter().map(String::as_str).collect();
    assert_eq!(tiers, HashSet::from(["admin123", "user123", "tukang123"]));

    let admin = store
        .find_account_by_email("admin@ngulikang.com")
        .unwrap()
        .unwrap();
    assert_eq!(admin.password_hash, "hashed:admin123");
    assert_eq!(admin.role, Role::Admin);
}

#[test]
fn account_emails_are_unique() {
    let store = SqliteStore::open_in_memory().unwrap();
    seed(&store, SeedConfig::default()).unwrap();
    seed(&store, SeedConfig::default()).unwrap();

    let mut emails = HashSet::new();
    for role in [Role::Admin, Role::Tradesperson, Role::Customer] {
        for account in store.list_accounts(role).unwrap() {
            assert!(emails.insert(account.email.clone()), "{}", account.email);
        }
    }
    assert_eq!(emails.len(), 33);
}

#[test]
fn orders_reference_existing_accounts_and_profiles() {
    let store = SqliteStore::open_in_memory().unwrap();
    seed(&store, SeedConfig::default()).unwrap();

    let customers: HashSet<_> = store
        .list_accounts(Role::Customer)
        .unwrap()
        .into_iter()
        .map(|account| account.id)
        .collect();
    let profiles: HashSet<_> = store
        .list_tradespeople()
        .unwrap()
        .into_iter()
        .map(|profile| profile.id)
        .collect();

    let orders = store.list_orders(&OrderListQuery::default()).unwrap();
    assert_eq!(orders.len(), 10);
    for order in &orders {
        assert!(customers.contains(&order.customer_id));
        match order.tradesperson_id {
            Some(id) => {
                assert_ne!(order.status, OrderStatus::Pending);
                assert!(profiles.contains(&id));
            }
            None => assert_eq!(order.status, OrderStatus::Pending),
        }
    }
}

#[test]
fn progress_and_payroll_are_conditionally_consistent() {
    let store = SqliteStore::open_in_memory().unwrap();
    seed(&store, SeedConfig::default()).unwrap();

    let in_progress = store
        .list_orders(&OrderListQuery {
            status: Some(OrderStatus::InProgress),
            limit: None,
        })
        .unwrap();
    let progress = store.list_order_progress().unwrap();
    assert_eq!(progress.len(), in_progress.len());
    for report in &progress {
        let order = in_progress
            .iter()
            .find(|order| order.id == report.order_id)
            .expect("progress must reference an in-progress order");
        assert_eq!(Some(report.updated_by), order.tradesperson_id);
    }

    let payroll = store.list_payroll_entries().unwrap();
    assert_eq!(payroll.len(), 8);
    for entry in &payroll {
        match entry.status {
            PayrollStatus::Paid => assert!(entry.paid_at.is_some()),
            PayrollStatus::Pending => assert!(entry.paid_at.is_none()),
        }
    }
}

#[test]
fn no_in_progress_orders_means_no_progress_writes() {
    let store = SqliteStore::open_in_memory().unwrap();
    // A single order lands on the first status of the cycle: pending.
    let config = SeedConfig {
        orders: 1,
        ..SeedConfig::default()
    };

    let report = seed(&store, config).unwrap();
    assert_eq!(
        report.outcome(StepId::OrderProgress),
        Some(StepOutcome::Seeded { records: 0 })
    );
    assert_eq!(store.count(EntityKind::OrderProgress).unwrap(), 0);
    assert_eq!(store.count(EntityKind::PayrollEntry).unwrap(), 8);
}

#[test]
fn missing_customers_abort_the_run_at_orders() {
    let store = SqliteStore::open_in_memory().unwrap();
    let config = SeedConfig {
        customers: 0,
        ..SeedConfig::default()
    };

    let err = seed(&store, config).unwrap_err();
    assert!(matches!(
        err,
        SeedError::MissingDependency {
            step: "orders",
            dependency: "customer accounts"
        }
    ));
    assert_eq!(store.count(EntityKind::Order).unwrap(), 0);
    assert_eq!(store.count(EntityKind::PayrollEntry).unwrap(), 0);
    assert_eq!(store.count(EntityKind::Product).unwrap(), 15);
}

#[test]
fn skipped_orders_are_refetched_for_downstream_steps() {
    let store = SqliteStore::open_in_memory().unwrap();
    let upstream: Vec<SeedStep> = SEED_PLAN
        .iter()
        .copied()
        .filter(|step| step.id != StepId::Payroll)
        .collect();
    let hasher = RecordingHasher::default();
    Seeder::new(&store, &hasher, StdRng::seed_from_u64(1), SeedConfig::default())
        .with_plan(&upstream)
        .run()
        .unwrap();
    assert_eq!(store.count(EntityKind::PayrollEntry).unwrap(), 0);

    let report = seed(&store, SeedConfig::default()).unwrap();
    assert_eq!(report.outcome(StepId::Orders), Some(StepOutcome::Skipped));
    assert_eq!(
        report.outcome(StepId::Payroll),
        Some(StepOutcome::Seeded { records: 8 })
    );

    let order_ids: HashSet<_> = store
        .list_orders(&OrderListQuery::default())
        .unwrap()
        .into_iter()
        .map(|order| order.id)
        .collect();
    for entry in store.list_payroll_entries().unwrap() {
        assert!(order_ids.contains(&entry.order_id.unwrap()));
    }
}

#[test]
fn chat_messages_keep_conversation_order() {
    let store = SqliteStore::open_in_memory().unwrap();
    seed(&store, SeedConfig::default()).unwrap();

    let threads = store.list_chat_threads().unwrap();
    assert_eq!(threads.len(), 3);
    for thread in &threads {
        let messages = store.list_messages(thread.id).unwrap();
        let senders: Vec<_> = messages.iter().map(|message| message.sender_id).collect();
        assert_eq!(
            senders,
            [
                thread.customer_id,
                thread.tradesperson_account_id,
                thread.customer_id
            ]
        );
        assert!(!messages[2].read);
    }
}

#[test]
fn ratings_and_balances_stay_in_range_after_storage() {
    let store = SqliteStore::open_in_memory().unwrap();
    let report = seed(&store, SeedConfig::default()).unwrap();

    for profile in &report.tradespeople {
        assert!((3.0..=5.0).contains(&profile.details.rating));
        assert!(!profile.details.balance.is_sign_negative());
        assert!(!profile.details.skills.is_empty());
    }
}

#[test]
fn invalid_custom_plan_is_rejected_before_any_write() {
    let store = SqliteStore::open_in_memory().unwrap();
    let plan: Vec<SeedStep> = SEED_PLAN.iter().rev().copied().collect();
    let hasher = RecordingHasher::default();

    let err = Seeder::new(&store, &hasher, StdRng::seed_from_u64(1), SeedConfig::default())
        .with_plan(&plan)
        .run()
        .unwrap_err();
    assert!(matches!(err, SeedError::InvalidPlan(_)));
    assert_eq!(store.count(EntityKind::Account).unwrap(), 0);
}

#[test]
fn cart_goes_to_first_customer() {
    let store = SqliteStore::open_in_memory().unwrap();
    let report = seed(&store, SeedConfig::default()).unwrap();

    let items = store.list_cart_items().unwrap();
    assert_eq!(items.len(), 5);
    assert!(items
        .iter()
        .all(|item| item.account_id == report.customers[0].id));
}

#[test]
fn failed_file_run_releases_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ngulikang.db");
    let hasher = RecordingHasher::default();
    let config = SeedConfig {
        customers: 0,
        ..SeedConfig::default()
    };

    let err = seed_database(&path, config, &hasher, StdRng::seed_from_u64(5), |_| {}).unwrap_err();
    assert!(matches!(
        err,
        SeedError::MissingDependency { step: "orders", .. }
    ));

    let store = SqliteStore::open(&path).unwrap();
    store
        .connection()
        .execute_batch("BEGIN EXCLUSIVE; COMMIT;")
        .unwrap();
    assert_eq!(store.count(EntityKind::Product).unwrap(), 15);
    store.close().unwrap();

    let report = seed_database(&path, SeedConfig::default(), &hasher, StdRng::seed_from_u64(6), |_| {})
        .unwrap();
    assert_eq!(report.outcome(StepId::Products), Some(StepOutcome::Skipped));
    assert_eq!(
        report.outcome(StepId::Orders),
        Some(StepOutcome::Seeded { records: 10 })
    );
}

#[test]
fn unreachable_database_fails_before_any_step() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("ngulikang.db");
    let mut steps = 0;

    let err = seed_database(
        &path,
        SeedConfig::default(),
        &RecordingHasher::default(),
        StdRng::seed_from_u64(1),
        |_| steps += 1,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        SeedError::Store(StoreError::Connectivity(DbError::Open { .. }))
    ));
    assert_eq!(steps, 0);
}

#[test]
fn applications_link_back_to_customers_when_available() {
    let store = SqliteStore::open_in_memory().unwrap();
    let report = seed(&store, SeedConfig::default()).unwrap();

    let applications = store.list_applications().unwrap();
    assert_eq!(applications.len(), 5);
    assert_eq!(
        applications
            .iter()
            .map(|application| application.status)
            .collect::<Vec<_>>(),
        [
            ApplicationStatus::Pending,
            ApplicationStatus::Pending,
            ApplicationStatus::Pending,
            ApplicationStatus::Approved,
            ApplicationStatus::Rejected,
        ]
    );
    for (application, customer) in applications.iter().zip(&report.customers) {
        assert_eq!(application.account_id, Some(customer.id));
        assert_eq!(application.email, customer.email);
    }
}
