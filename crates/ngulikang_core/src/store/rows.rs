//! Row decoding for the SQLite store.
//!
//! Every column is decoded strictly: an unknown enum value, a malformed
//! decimal or a broken JSON list is reported as `StoreError::InvalidData`
//! naming the offending `table.column`.

use super::{StoreError, StoreResult};
use crate::model::account::{Account, Role};
use crate::model::catalog::{CartItem, Product};
use crate::model::messaging::{ChatThread, Message};
use crate::model::order::{Order, OrderProgress, OrderStatus, PayrollEntry, PayrollStatus};
use crate::model::tradesperson::{
    Application, ApplicationStatus, ProfileDetails, TradespersonProfile,
};
use crate::model::{RecordId, Stored, Validate};
use rust_decimal::Decimal;
use rusqlite::Row;
use uuid::Uuid;

pub(super) const ACCOUNT_COLUMNS: &str = "id, email, name, password_hash, role, created_at";
pub(super) const PROFILE_COLUMNS: &str =
    "id, account_id, skills, experience, rating, verified, balance, created_at";
pub(super) const APPLICATION_COLUMNS: &str =
    "id, email, phone, skills, status, account_id, created_at";
pub(super) const PRODUCT_COLUMNS: &str =
    "id, name, description, price, category, image_url, stock, created_at";
pub(super) const ORDER_COLUMNS: &str = "id, customer_id, tradesperson_id, service_type, status, \
     total_price, location, notes, created_at";
pub(super) const PROGRESS_COLUMNS: &str =
    "id, order_id, percentage, notes, images, updated_by, created_at";
pub(super) const PAYROLL_COLUMNS: &str =
    "id, tradesperson_id, order_id, amount, status, paid_at, created_at";
pub(super) const THREAD_COLUMNS: &str = "id, customer_id, tradesperson_account_id, created_at";
pub(super) const MESSAGE_COLUMNS: &str = "id, sender_id, content, is_read, created_at";
pub(super) const CART_COLUMNS: &str = "id, account_id, product_id, quantity, created_at";

pub(super) fn parse_account(row: &Row<'_>) -> StoreResult<Stored<Account>> {
    let role_text: String = row.get("role")?;
    let role = Role::parse(&role_text).ok_or_else(|| invalid("accounts.role", &role_text))?;
    stored(
        row,
        "accounts",
        Account {
            email: row.get("email")?,
            name: row.get("name")?,
            password_hash: row.get("password_hash")?,
            role,
        },
    )
}

pub(super) fn parse_profile(row: &Row<'_>) -> StoreResult<Stored<TradespersonProfile>> {
    stored(
        row,
        "tradesperson_profiles",
        TradespersonProfile {
            account_id: id_column(row, "tradesperson_profiles", "account_id")?,
            details: ProfileDetails {
                skills: list_column(row, "tradesperson_profiles", "skills")?,
                experience: row.get("experience")?,
                rating: row.get("rating")?,
                verified: bool_column(row, "tradesperson_profiles", "verified")?,
                balance: decimal_column(row, "tradesperson_profiles", "balance")?,
            },
        },
    )
}

pub(super) fn parse_application(row: &Row<'_>) -> StoreResult<Stored<Application>> {
    let status_text: String = row.get("status")?;
    let status = ApplicationStatus::parse(&status_text)
        .ok_or_else(|| invalid("applications.status", &status_text))?;
    stored(
        row,
        "applications",
        Application {
            email: row.get("email")?,
            phone: row.get("phone")?,
            skills: list_column(row, "applications", "skills")?,
            status,
            account_id: optional_id_column(row, "applications", "account_id")?,
        },
    )
}

pub(super) fn parse_product(row: &Row<'_>) -> StoreResult<Stored<Product>> {
    stored(
        row,
        "products",
        Product {
            name: row.get("name")?,
            description: row.get("description")?,
            price: decimal_column(row, "products", "price")?,
            category: row.get("category")?,
            image_url: row.get("image_url")?,
            stock: row.get("stock")?,
        },
    )
}

pub(super) fn parse_order(row: &Row<'_>) -> StoreResult<Stored<Order>> {
    let status_text: String = row.get("status")?;
    let status =
        OrderStatus::parse(&status_text).ok_or_else(|| invalid("orders.status", &status_text))?;
    stored(
        row,
        "orders",
        Order {
            customer_id: id_column(row, "orders", "customer_id")?,
            tradesperson_id: optional_id_column(row, "orders", "tradesperson_id")?,
            service_type: row.get("service_type")?,
            status,
            total_price: decimal_column(row, "orders", "total_price")?,
            location: row.get("location")?,
            notes: row.get("notes")?,
        },
    )
}

pub(super) fn parse_progress(row: &Row<'_>) -> StoreResult<Stored<OrderProgress>> {
    stored(
        row,
        "order_progress",
        OrderProgress {
            order_id: id_column(row, "order_progress", "order_id")?,
            percentage: row.get("percentage")?,
            notes: row.get("notes")?,
            images: list_column(row, "order_progress", "images")?,
            updated_by: id_column(row, "order_progress", "updated_by")?,
        },
    )
}

pub(super) fn parse_payroll(row: &Row<'_>) -> StoreResult<Stored<PayrollEntry>> {
    let status_text: String = row.get("status")?;
    let status = PayrollStatus::parse(&status_text)
        .ok_or_else(|| invalid("payroll_entries.status", &status_text))?;
    stored(
        row,
        "payroll_entries",
        PayrollEntry {
            tradesperson_id: id_column(row, "payroll_entries", "tradesperson_id")?,
            order_id: optional_id_column(row, "payroll_entries", "order_id")?,
            amount: decimal_column(row, "payroll_entries", "amount")?,
            status,
            paid_at: row.get("paid_at")?,
        },
    )
}

pub(super) fn parse_thread(row: &Row<'_>) -> StoreResult<Stored<ChatThread>> {
    stored(
        row,
        "chat_threads",
        ChatThread {
            customer_id: id_column(row, "chat_threads", "customer_id")?,
            tradesperson_account_id: id_column(row, "chat_threads", "tradesperson_account_id")?,
        },
    )
}

pub(super) fn parse_message(row: &Row<'_>) -> StoreResult<Stored<Message>> {
    stored(
        row,
        "messages",
        Message {
            sender_id: id_column(row, "messages", "sender_id")?,
            content: row.get("content")?,
            read: bool_column(row, "messages", "is_read")?,
        },
    )
}

pub(super) fn parse_cart_item(row: &Row<'_>) -> StoreResult<Stored<CartItem>> {
    stored(
        row,
        "cart_items",
        CartItem {
            account_id: id_column(row, "cart_items", "account_id")?,
            product_id: id_column(row, "cart_items", "product_id")?,
            quantity: row.get("quantity")?,
        },
    )
}

pub(super) fn decimal_to_db(value: &Decimal) -> String {
    value.normalize().to_string()
}

pub(super) fn list_to_db(values: &[String]) -> StoreResult<String> {
    serde_json::to_string(values)
        .map_err(|err| StoreError::InvalidData(format!("unencodable list: {err}")))
}

pub(super) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

fn stored<T: Validate>(row: &Row<'_>, table: &str, record: T) -> StoreResult<Stored<T>> {
    record.validate()?;
    Ok(Stored {
        id: id_column(row, table, "id")?,
        created_at: row.get("created_at")?,
        record,
    })
}

fn id_column(row: &Row<'_>, table: &str, column: &str) -> StoreResult<RecordId> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text).map_err(|_| invalid(&format!("{table}.{column}"), &text))
}

fn optional_id_column(row: &Row<'_>, table: &str, column: &str) -> StoreResult<Option<RecordId>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => Uuid::parse_str(&text)
            .map(Some)
            .map_err(|_| invalid(&format!("{table}.{column}"), &text)),
        None => Ok(None),
    }
}

fn decimal_column(row: &Row<'_>, table: &str, column: &str) -> StoreResult<Decimal> {
    let text: String = row.get(column)?;
    text.parse::<Decimal>()
        .map_err(|_| invalid(&format!("{table}.{column}"), &text))
}

fn list_column(row: &Row<'_>, table: &str, column: &str) -> StoreResult<Vec<String>> {
    let text: String = row.get(column)?;
    serde_json::from_str(&text).map_err(|_| invalid(&format!("{table}.{column}"), &text))
}

fn bool_column(row: &Row<'_>, table: &str, column: &str) -> StoreResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(invalid(&format!("{table}.{column}"), &other.to_string())),
    }
}

fn invalid(column: &str, value: &str) -> StoreError {
    StoreError::InvalidData(format!("invalid value `{value}` in {column}"))
}
