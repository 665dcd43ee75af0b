//! Marketplace fixture domain model.
//!
//! # Responsibility
//! - Define candidate records produced by generators and the persisted
//!   `Stored<T>` envelope returned by the store.
//! - Validate records before they reach persistence.
//!
//! # Invariants
//! - Identifiers are assigned by the store, never by generators.
//! - Every store write runs `Validate::validate()` first.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use uuid::Uuid;

pub mod account;
pub mod catalog;
pub mod messaging;
pub mod order;
pub mod tradesperson;

/// Store-assigned identifier shared by every entity.
pub type RecordId = Uuid;

/// Entity type tags, one per table the seeder populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Account,
    TradespersonProfile,
    Application,
    Product,
    Order,
    OrderProgress,
    PayrollEntry,
    ChatThread,
    Message,
    Notification,
    CartItem,
}

impl EntityKind {
    pub const ALL: [EntityKind; 11] = [
        EntityKind::Account,
        EntityKind::TradespersonProfile,
        EntityKind::Application,
        EntityKind::Product,
        EntityKind::Order,
        EntityKind::OrderProgress,
        EntityKind::PayrollEntry,
        EntityKind::ChatThread,
        EntityKind::Message,
        EntityKind::Notification,
        EntityKind::CartItem,
    ];

    /// Backing table name.
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Account => "accounts",
            Self::TradespersonProfile => "tradesperson_profiles",
            Self::Application => "applications",
            Self::Product => "products",
            Self::Order => "orders",
            Self::OrderProgress => "order_progress",
            Self::PayrollEntry => "payroll_entries",
            Self::ChatThread => "chat_threads",
            Self::Message => "messages",
            Self::Notification => "notifications",
            Self::CartItem => "cart_items",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

/// A record after persistence: the store-assigned id plus the record fields.
///
/// Derefs to the inner record so callers read `order.status` directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<T> {
    pub id: RecordId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    #[serde(flatten)]
    pub record: T,
}

impl<T> Deref for Stored<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.record
    }
}

/// Record-level checks run before every store write.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    InvalidEmail(String),
    EmptyField {
        entity: EntityKind,
        field: &'static str,
    },
    OutOfRange {
        entity: EntityKind,
        field: &'static str,
        value: String,
    },
    Inconsistent {
        entity: EntityKind,
        details: &'static str,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail(email) => write!(f, "invalid email `{email}`"),
            Self::EmptyField { entity, field } => {
                write!(f, "{entity}.{field} must not be empty")
            }
            Self::OutOfRange {
                entity,
                field,
                value,
            } => write!(f, "{entity}.{field} out of range: {value}"),
            Self::Inconsistent { entity, details } => {
                write!(f, "inconsistent {entity} record: {details}")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_non_empty(
    entity: EntityKind,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { entity, field });
    }
    Ok(())
}
