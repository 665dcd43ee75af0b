//! Fixture seeding for the Ngulikang services marketplace.
//!
//! Populates a relational store with accounts, tradesperson profiles,
//! orders, payroll, chat and cart data in dependency order, and can be
//! re-run safely against an already populated store.

pub mod db;
pub mod logging;
pub mod model;
pub mod seed;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LogError};
pub use model::account::{Account, Role};
pub use model::order::{Order, OrderStatus, PayrollStatus};
pub use model::{EntityKind, RecordId, Stored, Validate, ValidationError};
pub use seed::{
    seed_database, Argon2Hasher, ConfigError, CredentialHasher, SeedConfig, SeedError,
    SeedReport, SeedResult, Seeder, StepId, StepOutcome, StepReport,
};
pub use store::{OrderListQuery, SeedStore, SqliteStore, StoreError, StoreResult};
