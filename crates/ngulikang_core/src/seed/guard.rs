//! Idempotency checks that make the seeder safe to re-run.
//!
//! Two granularities exist: a coarse per-entity-type check (`should_seed`)
//! and record-level lookup-or-create for accounts (`ensure_account`), which
//! are shared by independent steps and keyed by email.

use crate::model::account::Account;
use crate::model::{EntityKind, Stored};
use crate::store::{SeedStore, StoreResult};
use log::debug;

/// Returns `false` once any record of `kind` exists. Read-only.
pub fn should_seed<S: SeedStore + ?Sized>(store: &S, kind: EntityKind) -> StoreResult<bool> {
    let existing = store.count(kind)?;
    debug!("event=seed_guard module=seed kind={kind} existing={existing}");
    Ok(existing == 0)
}

/// Outcome of a lookup-or-create.
#[derive(Debug, Clone, PartialEq)]
pub enum Ensured<T> {
    Existing(T),
    Created(T),
}

impl<T> Ensured<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Existing(value) | Self::Created(value) => value,
        }
    }
}

/// Returns the account with `candidate.email`, creating it when absent.
///
/// An existing account is returned unchanged even when the candidate's other
/// fields differ.
pub fn ensure_account<S: SeedStore + ?Sized>(
    store: &S,
    candidate: &Account,
) -> StoreResult<Ensured<Stored<Account>>> {
    if let Some(existing) = store.find_account_by_email(&candidate.email)? {
        return Ok(Ensured::Existing(existing));
    }
    store.create_account(candidate).map(Ensured::Created)
}
