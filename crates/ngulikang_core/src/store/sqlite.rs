//! SQLite-backed `SeedStore`.
//!
//! # Invariants
//! - Nested creates (tradesperson + profile, thread + messages) and bulk
//!   inserts run inside one transaction each.
//! - Listing order is insertion order (`rowid`).

use super::rows::{
    bool_to_int, decimal_to_db, list_to_db, parse_account, parse_application, parse_cart_item,
    parse_message, parse_order, parse_payroll, parse_product, parse_profile, parse_progress,
    parse_thread, ACCOUNT_COLUMNS, APPLICATION_COLUMNS, CART_COLUMNS, MESSAGE_COLUMNS,
    ORDER_COLUMNS, PAYROLL_COLUMNS, PRODUCT_COLUMNS, PROFILE_COLUMNS, PROGRESS_COLUMNS,
    THREAD_COLUMNS,
};
use super::{OrderListQuery, SeedStore, StoreError, StoreResult};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::account::{Account, Role};
use crate::model::catalog::{CartItem, Product};
use crate::model::messaging::{ChatThread, Message, Notification};
use crate::model::order::{Order, OrderProgress, PayrollEntry};
use crate::model::tradesperson::{Application, ProfileDetails, TradespersonProfile};
use crate::model::{EntityKind, RecordId, Stored, Validate};
use chrono::Utc;
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction};
use std::path::Path;
use uuid::Uuid;

/// Owned SQLite connection acting as the fixture store.
///
/// Acquire with `open`/`open_in_memory`, release with `close`. Dropping the
/// store also closes the connection but discards any close error.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a private in-memory database, mostly for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps a connection returned by `db::open_db*`.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Releases the underlying connection.
    pub fn close(self) -> StoreResult<()> {
        match self.conn.close() {
            Ok(()) => {
                info!("event=store_close module=store status=ok");
                Ok(())
            }
            Err((_conn, err)) => {
                warn!("event=store_close module=store status=error error={err}");
                Err(StoreError::Connectivity(DbError::Close(err)))
            }
        }
    }

    pub fn list_applications(&self) -> StoreResult<Vec<Stored<Application>>> {
        self.query_rows(
            &format!("SELECT {APPLICATION_COLUMNS} FROM applications ORDER BY rowid"),
            Vec::new(),
            parse_application,
        )
    }

    pub fn list_order_progress(&self) -> StoreResult<Vec<Stored<OrderProgress>>> {
        self.query_rows(
            &format!("SELECT {PROGRESS_COLUMNS} FROM order_progress ORDER BY rowid"),
            Vec::new(),
            parse_progress,
        )
    }

    pub fn list_payroll_entries(&self) -> StoreResult<Vec<Stored<PayrollEntry>>> {
        self.query_rows(
            &format!("SELECT {PAYROLL_COLUMNS} FROM payroll_entries ORDER BY rowid"),
            Vec::new(),
            parse_payroll,
        )
    }

    pub fn list_chat_threads(&self) -> StoreResult<Vec<Stored<ChatThread>>> {
        self.query_rows(
            &format!("SELECT {THREAD_COLUMNS} FROM chat_threads ORDER BY rowid"),
            Vec::new(),
            parse_thread,
        )
    }

    /// Messages of one thread in conversation order.
    pub fn list_messages(&self, thread_id: RecordId) -> StoreResult<Vec<Stored<Message>>> {
        self.query_rows(
            &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE thread_id = ? ORDER BY position"),
            vec![Value::Text(thread_id.to_string())],
            parse_message,
        )
    }

    pub fn list_cart_items(&self) -> StoreResult<Vec<Stored<CartItem>>> {
        self.query_rows(
            &format!("SELECT {CART_COLUMNS} FROM cart_items ORDER BY rowid"),
            Vec::new(),
            parse_cart_item,
        )
    }

    fn query_rows<T>(
        &self,
        sql: &str,
        bind_values: Vec<Value>,
        parse: fn(&Row<'_>) -> StoreResult<T>,
    ) -> StoreResult<Vec<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse(row)?);
        }
        Ok(records)
    }

    /// Runs `write` inside a transaction; nothing is committed on error.
    fn in_transaction<T>(
        &self,
        write: impl FnOnce(&Transaction<'_>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = write(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

impl SeedStore for SqliteStore {
    fn count(&self, kind: EntityKind) -> StoreResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", kind.table_name()),
            [],
            |row| row.get(0),
        )?;
        u64::try_from(count).map_err(|_| {
            StoreError::InvalidData(format!("negative row count {count} for {kind}"))
        })
    }

    fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Stored<Account>>> {
        let mut records = self.query_rows(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?"),
            vec![Value::Text(email.to_string())],
            parse_account,
        )?;
        Ok(records.pop())
    }

    fn create_account(&self, account: &Account) -> StoreResult<Stored<Account>> {
        self.in_transaction(|tx| insert_account(tx, account))
    }

    fn list_accounts(&self, role: Role) -> StoreResult<Vec<Stored<Account>>> {
        self.query_rows(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE role = ? ORDER BY rowid"),
            vec![Value::Text(role.as_str().to_string())],
            parse_account,
        )
    }

    fn create_tradesperson(
        &self,
        account: &Account,
        details: &ProfileDetails,
    ) -> StoreResult<(Stored<Account>, Stored<TradespersonProfile>)> {
        if account.role != Role::Tradesperson {
            return Err(StoreError::ConstraintViolation(format!(
                "profile owner `{}` has role {}",
                account.email,
                account.role.as_str()
            )));
        }
        details.validate()?;

        self.in_transaction(|tx| {
            let account = insert_account(tx, account)?;
            let profile = TradespersonProfile {
                account_id: account.id,
                details: details.clone(),
            };
            let (id, created_at) = new_identity();
            tx.execute(
                "INSERT INTO tradesperson_profiles (
                    id, account_id, skills, experience, rating, verified, balance, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                params![
                    id.to_string(),
                    account.id.to_string(),
                    list_to_db(&details.skills)?,
                    details.experience.as_str(),
                    details.rating,
                    bool_to_int(details.verified),
                    decimal_to_db(&details.balance),
                    created_at,
                ],
            )?;
            Ok((
                account,
                Stored {
                    id,
                    created_at,
                    record: profile,
                },
            ))
        })
    }

    fn list_tradespeople(&self) -> StoreResult<Vec<Stored<TradespersonProfile>>> {
        self.query_rows(
            &format!("SELECT {PROFILE_COLUMNS} FROM tradesperson_profiles ORDER BY rowid"),
            Vec::new(),
            parse_profile,
        )
    }

    fn insert_applications(&self, applications: &[Application]) -> StoreResult<()> {
        validate_all(applications)?;
        self.in_transaction(|tx| {
            let mut stmt = tx.prepare(
                "INSERT INTO applications (id, email, phone, skills, status, account_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            )?;
            for application in applications {
                let (id, created_at) = new_identity();
                stmt.execute(params![
                    id.to_string(),
                    application.email.as_str(),
                    application.phone.as_str(),
                    list_to_db(&application.skills)?,
                    application.status.as_str(),
                    application.account_id.map(|id| id.to_string()),
                    created_at,
                ])?;
            }
            Ok(())
        })
    }

    fn insert_products(&self, products: &[Product]) -> StoreResult<()> {
        validate_all(products)?;
        self.in_transaction(|tx| {
            let mut stmt = tx.prepare(
                "INSERT INTO products (
                    id, name, description, price, category, image_url, stock, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            )?;
            for product in products {
                let (id, created_at) = new_identity();
                stmt.execute(params![
                    id.to_string(),
                    product.name.as_str(),
                    product.description.as_str(),
                    decimal_to_db(&product.price),
                    product.category.as_str(),
                    product.image_url.as_str(),
                    product.stock,
                    created_at,
                ])?;
            }
            Ok(())
        })
    }

    fn list_products(&self, limit: Option<u32>) -> StoreResult<Vec<Stored<Product>>> {
        let mut sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY rowid");
        let mut bind_values = Vec::new();
        push_limit(&mut sql, &mut bind_values, limit);
        self.query_rows(&sql, bind_values, parse_product)
    }

    fn create_order(&self, order: &Order) -> StoreResult<Stored<Order>> {
        order.validate()?;
        let (id, created_at) = new_identity();
        self.conn.execute(
            "INSERT INTO orders (
                id, customer_id, tradesperson_id, service_type, status,
                total_price, location, notes, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                id.to_string(),
                order.customer_id.to_string(),
                order.tradesperson_id.map(|id| id.to_string()),
                order.service_type.as_str(),
                order.status.as_str(),
                decimal_to_db(&order.total_price),
                order.location.as_str(),
                order.notes.as_str(),
                created_at,
            ],
        )?;
        Ok(Stored {
            id,
            created_at,
            record: order.clone(),
        })
    }

    fn list_orders(&self, query: &OrderListQuery) -> StoreResult<Vec<Stored<Order>>> {
        let mut sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE 1 = 1");
        let mut bind_values = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        sql.push_str(" ORDER BY rowid");
        push_limit(&mut sql, &mut bind_values, query.limit);

        self.query_rows(&sql, bind_values, parse_order)
    }

    fn create_order_progress(
        &self,
        progress: &OrderProgress,
    ) -> StoreResult<Stored<OrderProgress>> {
        progress.validate()?;
        let (id, created_at) = new_identity();
        self.conn.execute(
            "INSERT INTO order_progress (
                id, order_id, percentage, notes, images, updated_by, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                id.to_string(),
                progress.order_id.to_string(),
                progress.percentage,
                progress.notes.as_str(),
                list_to_db(&progress.images)?,
                progress.updated_by.to_string(),
                created_at,
            ],
        )?;
        Ok(Stored {
            id,
            created_at,
            record: progress.clone(),
        })
    }

    fn insert_payroll_entries(&self, entries: &[PayrollEntry]) -> StoreResult<()> {
        validate_all(entries)?;
        self.in_transaction(|tx| {
            let mut stmt = tx.prepare(
                "INSERT INTO payroll_entries (
                    id, tradesperson_id, order_id, amount, status, paid_at, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            )?;
            for entry in entries {
                let (id, created_at) = new_identity();
                stmt.execute(params![
                    id.to_string(),
                    entry.tradesperson_id.to_string(),
                    entry.order_id.map(|id| id.to_string()),
                    decimal_to_db(&entry.amount),
                    entry.status.as_str(),
                    entry.paid_at,
                    created_at,
                ])?;
            }
            Ok(())
        })
    }

    fn create_chat_thread(
        &self,
        thread: &ChatThread,
        messages: &[Message],
    ) -> StoreResult<Stored<ChatThread>> {
        thread.validate()?;
        validate_all(messages)?;

        self.in_transaction(|tx| {
            let (thread_id, created_at) = new_identity();
            tx.execute(
                "INSERT INTO chat_threads (id, customer_id, tradesperson_account_id, created_at)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    thread_id.to_string(),
                    thread.customer_id.to_string(),
                    thread.tradesperson_account_id.to_string(),
                    created_at,
                ],
            )?;

            let mut stmt = tx.prepare(
                "INSERT INTO messages (id, thread_id, position, sender_id, content, is_read, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            )?;
            for (position, message) in messages.iter().enumerate() {
                let (id, created_at) = new_identity();
                stmt.execute(params![
                    id.to_string(),
                    thread_id.to_string(),
                    position as i64,
                    message.sender_id.to_string(),
                    message.content.as_str(),
                    bool_to_int(message.read),
                    created_at,
                ])?;
            }

            Ok(Stored {
                id: thread_id,
                created_at,
                record: thread.clone(),
            })
        })
    }

    fn insert_notifications(&self, notifications: &[Notification]) -> StoreResult<()> {
        validate_all(notifications)?;
        self.in_transaction(|tx| {
            let mut stmt = tx.prepare(
                "INSERT INTO notifications (id, account_id, type, title, message, is_read, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            )?;
            for notification in notifications {
                let (id, created_at) = new_identity();
                stmt.execute(params![
                    id.to_string(),
                    notification.account_id.to_string(),
                    notification.kind.as_str(),
                    notification.title.as_str(),
                    notification.message.as_str(),
                    bool_to_int(notification.read),
                    created_at,
                ])?;
            }
            Ok(())
        })
    }

    fn insert_cart_items(&self, items: &[CartItem]) -> StoreResult<()> {
        validate_all(items)?;
        self.in_transaction(|tx| {
            let mut stmt = tx.prepare(
                "INSERT INTO cart_items (id, account_id, product_id, quantity, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
            )?;
            for item in items {
                let (id, created_at) = new_identity();
                stmt.execute(params![
                    id.to_string(),
                    item.account_id.to_string(),
                    item.product_id.to_string(),
                    item.quantity,
                    created_at,
                ])?;
            }
            Ok(())
        })
    }
}

fn insert_account(tx: &Transaction<'_>, account: &Account) -> StoreResult<Stored<Account>> {
    account.validate()?;
    let (id, created_at) = new_identity();
    tx.execute(
        "INSERT INTO accounts (id, email, name, password_hash, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            id.to_string(),
            account.email.as_str(),
            account.name.as_str(),
            account.password_hash.as_str(),
            account.role.as_str(),
            created_at,
        ],
    )?;
    Ok(Stored {
        id,
        created_at,
        record: account.clone(),
    })
}

fn new_identity() -> (RecordId, i64) {
    (Uuid::new_v4(), Utc::now().timestamp_millis())
}

fn validate_all<T: Validate>(records: &[T]) -> StoreResult<()> {
    for record in records {
        record.validate()?;
    }
    Ok(())
}

fn push_limit(sql: &mut String, bind_values: &mut Vec<Value>, limit: Option<u32>) {
    if let Some(limit) = limit {
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));
    }
}
