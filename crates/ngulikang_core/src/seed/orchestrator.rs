//! Runs the seed plan step by step against a store.

use super::config::SeedConfig;
use super::generators::{
    admin_fixtures, application_fixtures, cart_fixtures, chat_fixtures, customer_fixtures,
    notification_fixtures, order_fixtures, payroll_fixtures, product_fixtures, progress_fixtures,
    tradesperson_fixtures,
};
use super::guard::{ensure_account, should_seed};
use super::hasher::CredentialHasher;
use super::plan::{validate_plan, GuardPolicy, SeedStep, StepId, SEED_PLAN};
use super::SeedResult;
use crate::model::account::{Account, Role};
use crate::model::order::Order;
use crate::model::tradesperson::TradespersonProfile;
use crate::model::Stored;
use crate::store::{OrderListQuery, SeedStore, StoreResult};
use chrono::Utc;
use log::{error, info};
use rand::Rng;
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The step ran and wrote `records` rows of its primary kind.
    Seeded { records: usize },
    /// The guarded entity type was already populated.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: StepId,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub steps: Vec<StepReport>,
    /// Every customer account in the store after the run.
    pub customers: Vec<Stored<Account>>,
    /// Every tradesperson profile in the store after the run.
    pub tradespeople: Vec<Stored<TradespersonProfile>>,
}

impl SeedReport {
    pub fn outcome(&self, step: StepId) -> Option<StepOutcome> {
        self.steps
            .iter()
            .find(|report| report.step == step)
            .map(|report| report.outcome)
    }
}

/// Upstream records handed to downstream steps.
///
/// Pools load lazily from the store, so a skipped step never leaves later
/// steps without data.
#[derive(Default)]
struct SeedContext {
    customers: Option<Vec<Stored<Account>>>,
    tradespeople: Option<Vec<Stored<TradespersonProfile>>>,
    orders: Option<Vec<Stored<Order>>>,
}

impl SeedContext {
    fn load_people<S: SeedStore>(&mut self, store: &S) -> StoreResult<()> {
        if self.customers.is_none() {
            self.customers = Some(store.list_accounts(Role::Customer)?);
        }
        if self.tradespeople.is_none() {
            self.tradespeople = Some(store.list_tradespeople()?);
        }
        Ok(())
    }

    fn load_orders<S: SeedStore>(&mut self, store: &S, limit: usize) -> StoreResult<()> {
        if self.orders.is_none() {
            let query = OrderListQuery {
                status: None,
                limit: Some(u32::try_from(limit).unwrap_or(u32::MAX)),
            };
            self.orders = Some(store.list_orders(&query)?);
        }
        Ok(())
    }

    fn customers(&self) -> &[Stored<Account>] {
        self.customers.as_deref().unwrap_or_default()
    }

    fn tradespeople(&self) -> &[Stored<TradespersonProfile>] {
        self.tradespeople.as_deref().unwrap_or_default()
    }

    fn orders(&self) -> &[Stored<Order>] {
        self.orders.as_deref().unwrap_or_default()
    }
}

/// Seeds a store along a validated plan.
///
/// The store, hasher and randomness source are injected so tests can run
/// against an isolated in-memory store with a seeded RNG.
pub struct Seeder<'a, S, H, R> {
    store: &'a S,
    hasher: &'a H,
    rng: R,
    config: SeedConfig,
    plan: &'a [SeedStep],
    context: SeedContext,
}

impl<'a, S, H, R> Seeder<'a, S, H, R>
where
    S: SeedStore,
    H: CredentialHasher,
    R: Rng,
{
    pub fn new(store: &'a S, hasher: &'a H, rng: R, config: SeedConfig) -> Self {
        Self {
            store,
            hasher,
            rng,
            config,
            plan: SEED_PLAN,
            context: SeedContext::default(),
        }
    }

    /// Replaces the default plan; it is validated when the run starts.
    pub fn with_plan(mut self, plan: &'a [SeedStep]) -> Self {
        self.plan = plan;
        self
    }

    pub fn run(&mut self) -> SeedResult<SeedReport> {
        self.run_with_progress(|_| {})
    }

    /// Runs every step in plan order, reporting each finished step to `on_step`.
    pub fn run_with_progress(
        &mut self,
        mut on_step: impl FnMut(&StepReport),
    ) -> SeedResult<SeedReport> {
        validate_plan(self.plan)?;
        self.context = SeedContext::default();

        let started_at = Instant::now();
        info!(
            "event=seed_run module=seed status=start steps={}",
            self.plan.len()
        );

        let mut steps = Vec::with_capacity(self.plan.len());
        for step in self.plan {
            let report = match self.run_guarded(step) {
                Ok(report) => report,
                Err(err) => {
                    error!(
                        "event=seed_step module=seed status=error step={} error={}",
                        step.id, err
                    );
                    return Err(err);
                }
            };
            match report.outcome {
                StepOutcome::Seeded { records } => info!(
                    "event=seed_step module=seed status=ok step={} outcome=seeded records={}",
                    step.id, records
                ),
                StepOutcome::Skipped => info!(
                    "event=seed_step module=seed status=ok step={} outcome=skipped",
                    step.id
                ),
            }
            on_step(&report);
            steps.push(report);
        }

        self.context.customers = None;
        self.context.tradespeople = None;
        self.context.load_people(self.store)?;

        info!(
            "event=seed_run module=seed status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );

        let context = std::mem::take(&mut self.context);
        Ok(SeedReport {
            steps,
            customers: context.customers.unwrap_or_default(),
            tradespeople: context.tradespeople.unwrap_or_default(),
        })
    }

    fn run_guarded(&mut self, step: &SeedStep) -> SeedResult<StepReport> {
        if step.guard == GuardPolicy::PerEntityType {
            if let Some(kind) = step.guarded_kind() {
                if !should_seed(self.store, kind)? {
                    return Ok(StepReport {
                        step: step.id,
                        outcome: StepOutcome::Skipped,
                    });
                }
            }
        }

        let records = self.run_step(step.id)?;
        Ok(StepReport {
            step: step.id,
            outcome: StepOutcome::Seeded { records },
        })
    }

    fn run_step(&mut self, step: StepId) -> SeedResult<usize> {
        match step {
            StepId::Accounts => self.seed_accounts(),
            StepId::Tradespeople => self.seed_tradespeople(),
            StepId::Applications => self.seed_applications(),
            StepId::Products => self.seed_products(),
            StepId::Orders => self.seed_orders(),
            StepId::OrderProgress => self.seed_order_progress(),
            StepId::Payroll => self.seed_payroll(),
            StepId::Chat => self.seed_chat(),
            StepId::Notifications => self.seed_notifications(),
            StepId::Cart => self.seed_cart(),
        }
    }

    fn seed_accounts(&mut self) -> SeedResult<usize> {
        let passwords = &self.config.passwords;
        let admin_hash = self.hasher.hash(&passwords.admin)?;
        let customer_hash = self.hasher.hash(&passwords.customer)?;

        let candidates = admin_fixtures(self.config.admins, &admin_hash)
            .into_iter()
            .chain(customer_fixtures(self.config.customers, &customer_hash));

        let mut created = 0;
        for candidate in candidates {
            if ensure_account(self.store, &candidate)?.is_created() {
                created += 1;
            }
        }

        self.context.customers = None;
        Ok(created)
    }

    fn seed_tradespeople(&mut self) -> SeedResult<usize> {
        let hash = self.hasher.hash(&self.config.passwords.tradesperson)?;
        let fixtures = tradesperson_fixtures(self.config.tradespeople, &hash, &mut self.rng);

        let mut created = 0;
        for (account, details) in &fixtures {
            if self.store.find_account_by_email(&account.email)?.is_some() {
                continue;
            }
            self.store.create_tradesperson(account, details)?;
            created += 1;
        }

        self.context.tradespeople = None;
        Ok(created)
    }

    fn seed_applications(&mut self) -> SeedResult<usize> {
        self.context.load_people(self.store)?;
        let applications = application_fixtures(self.config.applications, self.context.customers());
        self.store.insert_applications(&applications)?;
        Ok(applications.len())
    }

    fn seed_products(&mut self) -> SeedResult<usize> {
        let products = product_fixtures(self.config.products);
        self.store.insert_products(&products)?;
        Ok(products.len())
    }

    fn seed_orders(&mut self) -> SeedResult<usize> {
        self.context.load_people(self.store)?;
        let candidates = order_fixtures(
            self.config.orders,
            self.context.customers(),
            self.context.tradespeople(),
        )?;

        let orders = candidates
            .iter()
            .map(|order| self.store.create_order(order))
            .collect::<StoreResult<Vec<_>>>()?;
        let created = orders.len();
        self.context.orders = Some(orders);
        Ok(created)
    }

    fn seed_order_progress(&mut self) -> SeedResult<usize> {
        self.context.load_people(self.store)?;
        self.context.load_orders(self.store, self.config.orders)?;
        let reports = progress_fixtures(self.context.orders(), self.context.tradespeople())?;

        for report in &reports {
            self.store.create_order_progress(report)?;
        }
        Ok(reports.len())
    }

    fn seed_payroll(&mut self) -> SeedResult<usize> {
        self.context.load_people(self.store)?;
        self.context.load_orders(self.store, self.config.orders)?;
        let entries = payroll_fixtures(
            self.config.payroll_entries,
            self.config.pending_payroll_entries,
            self.context.tradespeople(),
            self.context.orders(),
            Utc::now().timestamp_millis(),
        )?;
        self.store.insert_payroll_entries(&entries)?;
        Ok(entries.len())
    }

    fn seed_chat(&mut self) -> SeedResult<usize> {
        self.context.load_people(self.store)?;
        let threads = chat_fixtures(
            self.config.chat_threads,
            self.context.customers(),
            self.context.tradespeople(),
        )?;

        for (thread, messages) in &threads {
            self.store.create_chat_thread(thread, messages)?;
        }
        Ok(threads.len())
    }

    fn seed_notifications(&mut self) -> SeedResult<usize> {
        self.context.load_people(self.store)?;
        let notifications =
            notification_fixtures(self.config.notifications, self.context.customers())?;
        self.store.insert_notifications(&notifications)?;
        Ok(notifications.len())
    }

    fn seed_cart(&mut self) -> SeedResult<usize> {
        self.context.load_people(self.store)?;
        let limit = u32::try_from(self.config.cart_items).unwrap_or(u32::MAX);
        let products = self.store.list_products(Some(limit))?;
        let items = cart_fixtures(self.context.customers(), &products)?;
        if items.is_empty() {
            return Ok(0);
        }
        self.store.insert_cart_items(&items)?;
        Ok(items.len())
    }
}
