//! Seed plan: population steps and the entity kinds they depend on.
//!
//! # Invariants
//! - `SEED_PLAN` is a valid linearization of the foreign-key graph: every
//!   kind a step depends on is written by some earlier step.
//! - Step names are unique.

use crate::model::EntityKind;
use serde::Serialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identity of one population step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Accounts,
    Tradespeople,
    Applications,
    Products,
    Orders,
    OrderProgress,
    Payroll,
    Chat,
    Notifications,
    Cart,
}

impl StepId {
    pub fn name(self) -> &'static str {
        match self {
            Self::Accounts => "accounts",
            Self::Tradespeople => "tradespeople",
            Self::Applications => "applications",
            Self::Products => "products",
            Self::Orders => "orders",
            Self::OrderProgress => "order_progress",
            Self::Payroll => "payroll",
            Self::Chat => "chat",
            Self::Notifications => "notifications",
            Self::Cart => "cart",
        }
    }
}

impl Display for StepId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a step decides whether it has work to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPolicy {
    /// Lookup-or-create per record (unique email); the step always runs.
    PerRecord,
    /// Skip the whole step once any row of the first written kind exists.
    PerEntityType,
}

#[derive(Debug, Clone, Copy)]
pub struct SeedStep {
    pub id: StepId,
    /// Kinds created by this step; the first one is the guarded kind.
    pub writes: &'static [EntityKind],
    /// Kinds that must be written by earlier steps.
    pub depends_on: &'static [EntityKind],
    pub guard: GuardPolicy,
}

impl SeedStep {
    pub fn guarded_kind(&self) -> Option<EntityKind> {
        self.writes.first().copied()
    }
}

use EntityKind as K;

pub const SEED_PLAN: &[SeedStep] = &[
    SeedStep {
        id: StepId::Accounts,
        writes: &[K::Account],
        depends_on: &[],
        guard: GuardPolicy::PerRecord,
    },
    SeedStep {
        id: StepId::Tradespeople,
        writes: &[K::TradespersonProfile, K::Account],
        depends_on: &[K::Account],
        guard: GuardPolicy::PerRecord,
    },
    SeedStep {
        id: StepId::Applications,
        writes: &[K::Application],
        depends_on: &[K::Account],
        guard: GuardPolicy::PerEntityType,
    },
    SeedStep {
        id: StepId::Products,
        writes: &[K::Product],
        depends_on: &[],
        guard: GuardPolicy::PerEntityType,
    },
    SeedStep {
        id: StepId::Orders,
        writes: &[K::Order],
        depends_on: &[K::Account, K::TradespersonProfile],
        guard: GuardPolicy::PerEntityType,
    },
    SeedStep {
        id: StepId::OrderProgress,
        writes: &[K::OrderProgress],
        depends_on: &[K::Order, K::TradespersonProfile],
        guard: GuardPolicy::PerEntityType,
    },
    SeedStep {
        id: StepId::Payroll,
        writes: &[K::PayrollEntry],
        depends_on: &[K::TradespersonProfile, K::Order],
        guard: GuardPolicy::PerEntityType,
    },
    SeedStep {
        id: StepId::Chat,
        writes: &[K::ChatThread, K::Message],
        depends_on: &[K::Account, K::TradespersonProfile],
        guard: GuardPolicy::PerEntityType,
    },
    SeedStep {
        id: StepId::Notifications,
        writes: &[K::Notification],
        depends_on: &[K::Account],
        guard: GuardPolicy::PerEntityType,
    },
    SeedStep {
        id: StepId::Cart,
        writes: &[K::CartItem],
        depends_on: &[K::Account, K::Product],
        guard: GuardPolicy::PerEntityType,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    DuplicateStep(StepId),
    EmptyStep(StepId),
    UnresolvedDependency { step: StepId, dependency: EntityKind },
}

impl Display for PlanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateStep(step) => write!(f, "step `{step}` appears more than once"),
            Self::EmptyStep(step) => write!(f, "step `{step}` writes no entity kind"),
            Self::UnresolvedDependency { step, dependency } => write!(
                f,
                "step `{step}` depends on `{dependency}`, which no earlier step writes"
            ),
        }
    }
}

impl Error for PlanError {}

/// Checks that `plan` is a valid topological order of its declared dependencies.
pub fn validate_plan(plan: &[SeedStep]) -> Result<(), PlanError> {
    let mut seen_steps = HashSet::new();
    let mut written = HashSet::new();

    for step in plan {
        if !seen_steps.insert(step.id) {
            return Err(PlanError::DuplicateStep(step.id));
        }
        if step.writes.is_empty() {
            return Err(PlanError::EmptyStep(step.id));
        }
        if let Some(dependency) = step
            .depends_on
            .iter()
            .find(|dependency| !written.contains(*dependency))
        {
            return Err(PlanError::UnresolvedDependency {
                step: step.id,
                dependency: *dependency,
            });
        }
        written.extend(step.writes.iter().copied());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_plan, GuardPolicy, PlanError, SeedStep, StepId, SEED_PLAN};
    use crate::model::EntityKind;
    use std::collections::HashSet;

    #[test]
    fn default_plan_is_a_valid_linearization() {
        validate_plan(SEED_PLAN).expect("default plan should validate");
    }

    #[test]
    fn default_plan_writes_every_entity_kind() {
        let written: HashSet<_> = SEED_PLAN
            .iter()
            .flat_map(|step| step.writes.iter().copied())
            .collect();
        for kind in EntityKind::ALL {
            assert!(written.contains(&kind), "{kind} is never written");
        }
    }

    #[test]
    fn orders_come_before_progress_and_payroll() {
        let position = |id: StepId| SEED_PLAN.iter().position(|step| step.id == id).unwrap();
        assert!(position(StepId::Accounts) < position(StepId::Tradespeople));
        assert!(position(StepId::Orders) < position(StepId::OrderProgress));
        assert!(position(StepId::Orders) < position(StepId::Payroll));
        assert!(position(StepId::Products) < position(StepId::Cart));
    }

    #[test]
    fn reordered_plan_is_rejected() {
        let mut plan = SEED_PLAN.to_vec();
        let orders = plan.iter().position(|step| step.id == StepId::Orders).unwrap();
        let order_step = plan.remove(orders);
        plan.push(order_step);

        let err = validate_plan(&plan).unwrap_err();
        assert_eq!(
            err,
            PlanError::UnresolvedDependency {
                step: StepId::OrderProgress,
                dependency: EntityKind::Order,
            }
        );
    }

    #[test]
    fn duplicate_steps_are_rejected() {
        let step = SeedStep {
            id: StepId::Products,
            writes: &[EntityKind::Product],
            depends_on: &[],
            guard: GuardPolicy::PerEntityType,
        };
        assert_eq!(
            validate_plan(&[step, step]),
            Err(PlanError::DuplicateStep(StepId::Products))
        );
    }
}
