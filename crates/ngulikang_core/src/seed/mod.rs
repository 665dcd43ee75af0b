//! Dependency-ordered, idempotent fixture seeding.
//!
//! # Responsibility
//! - Sequence entity generators along `plan::SEED_PLAN`.
//! - Skip populated entity types and reuse existing accounts so runs can be
//!   repeated against the same store.
//!
//! # Invariants
//! - Steps run sequentially; a step only reads identifiers committed by
//!   earlier steps or re-fetched from the store.
//! - The first error aborts the run. There is no rollback across steps;
//!   re-running relies on the idempotency guards.

use crate::store::{SqliteStore, StoreError};
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub mod config;
pub mod generators;
pub mod guard;
pub mod hasher;
mod orchestrator;
pub mod plan;

pub use config::{ConfigError, PasswordTiers, SeedConfig};
pub use guard::{ensure_account, should_seed, Ensured};
pub use hasher::{Argon2Hasher, CredentialHasher, HashError};
pub use orchestrator::{SeedReport, Seeder, StepOutcome, StepReport};
pub use plan::{validate_plan, GuardPolicy, PlanError, SeedStep, StepId, SEED_PLAN};

pub type SeedResult<T> = Result<T, SeedError>;

#[derive(Debug)]
pub enum SeedError {
    Store(StoreError),
    /// An upstream collection the step needs is empty.
    MissingDependency {
        step: &'static str,
        dependency: &'static str,
    },
    Hash(HashError),
    InvalidPlan(PlanError),
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::MissingDependency { step, dependency } => {
                write!(f, "step `{step}` requires {dependency}, but none exist")
            }
            Self::Hash(err) => write!(f, "{err}"),
            Self::InvalidPlan(err) => write!(f, "invalid seed plan: {err}"),
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Hash(err) => Some(err),
            Self::InvalidPlan(err) => Some(err),
            Self::MissingDependency { .. } => None,
        }
    }
}

impl From<StoreError> for SeedError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<HashError> for SeedError {
    fn from(value: HashError) -> Self {
        Self::Hash(value)
    }
}

impl From<PlanError> for SeedError {
    fn from(value: PlanError) -> Self {
        Self::InvalidPlan(value)
    }
}

/// Opens the database at `path`, runs the full plan, and closes the store.
///
/// The connection is released on both success and failure; a close error is
/// only reported when the run itself succeeded.
pub fn seed_database<H, R>(
    path: impl AsRef<Path>,
    config: SeedConfig,
    hasher: &H,
    rng: R,
    on_step: impl FnMut(&StepReport),
) -> SeedResult<SeedReport>
where
    H: CredentialHasher,
    R: Rng,
{
    let store = SqliteStore::open(path)?;
    let outcome = Seeder::new(&store, hasher, rng, config).run_with_progress(on_step);
    let closed = store.close();

    let report = outcome?;
    closed?;
    Ok(report)
}
