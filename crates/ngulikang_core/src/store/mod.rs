//! Store adapter contract and SQLite implementation.
//!
//! # Responsibility
//! - Define the query/command surface the seeder needs from a relational store.
//! - Keep SQL details behind that surface.
//!
//! # Invariants
//! - The store assigns every identifier; callers never supply one.
//! - Write paths call `Validate::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::account::{Account, Role};
use crate::model::catalog::{CartItem, Product};
use crate::model::messaging::{ChatThread, Message, Notification};
use crate::model::order::{Order, OrderProgress, OrderStatus, PayrollEntry};
use crate::model::tradesperson::{Application, ProfileDetails, TradespersonProfile};
use crate::model::{EntityKind, Stored, ValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod rows;
mod sqlite;

pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a store adapter.
#[derive(Debug)]
pub enum StoreError {
    /// The persistence layer could not be reached, prepared or released.
    Connectivity(DbError),
    /// A statement failed on a usable connection.
    Db(rusqlite::Error),
    /// A uniqueness, foreign-key or check constraint rejected the write.
    ConstraintViolation(String),
    /// The record failed model validation before reaching storage.
    Validation(ValidationError),
    /// A persisted row could not be decoded into the model.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connectivity(err) => write!(f, "store unavailable: {err}"),
            Self::Db(err) => write!(f, "statement failed: {err}"),
            Self::ConstraintViolation(details) => write!(f, "constraint violation: {details}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connectivity(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::ConstraintViolation(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Connectivity(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        if value.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) {
            return Self::ConstraintViolation(value.to_string());
        }
        Self::Db(value)
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Filter and pagination for order listing.
#[derive(Debug, Clone, Default)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub limit: Option<u32>,
}

/// Relational store operations consumed by the seeder.
///
/// Listing methods return rows in insertion order so cyclic assignment over a
/// re-fetched pool is stable between runs.
pub trait SeedStore {
    /// Number of persisted records of `kind`.
    fn count(&self, kind: EntityKind) -> StoreResult<u64>;

    fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Stored<Account>>>;
    fn create_account(&self, account: &Account) -> StoreResult<Stored<Account>>;
    fn list_accounts(&self, role: Role) -> StoreResult<Vec<Stored<Account>>>;

    /// Creates a tradesperson account and its profile as one unit.
    fn create_tradesperson(
        &self,
        account: &Account,
        details: &ProfileDetails,
    ) -> StoreResult<(Stored<Account>, Stored<TradespersonProfile>)>;
    fn list_tradespeople(&self) -> StoreResult<Vec<Stored<TradespersonProfile>>>;

    fn insert_applications(&self, applications: &[Application]) -> StoreResult<()>;

    fn insert_products(&self, products: &[Product]) -> StoreResult<()>;
    fn list_products(&self, limit: Option<u32>) -> StoreResult<Vec<Stored<Product>>>;

    fn create_order(&self, order: &Order) -> StoreResult<Stored<Order>>;
    fn list_orders(&self, query: &OrderListQuery) -> StoreResult<Vec<Stored<Order>>>;

    fn create_order_progress(&self, progress: &OrderProgress)
        -> StoreResult<Stored<OrderProgress>>;

    fn insert_payroll_entries(&self, entries: &[PayrollEntry]) -> StoreResult<()>;

    /// Creates a thread together with its opening messages, kept in slice order.
    fn create_chat_thread(
        &self,
        thread: &ChatThread,
        messages: &[Message],
    ) -> StoreResult<Stored<ChatThread>>;

    fn insert_notifications(&self, notifications: &[Notification]) -> StoreResult<()>;

    fn insert_cart_items(&self, items: &[CartItem]) -> StoreResult<()>;
}
