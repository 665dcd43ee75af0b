//! Entity generators: pure functions from upstream records, sizes and a
//! randomness source to candidate records.
//!
//! # Invariants
//! - Generators never touch the store; identifiers come from their inputs.
//! - Assignment over a referenced pool wraps around (`index % pool.len()`).
//! - A required pool that is empty yields `SeedError::MissingDependency`;
//!   an empty filtered subset yields an empty result.

use super::plan::StepId;
use super::{SeedError, SeedResult};
use crate::model::account::{Account, Role};
use crate::model::catalog::{CartItem, Product};
use crate::model::messaging::{ChatThread, Message, Notification};
use crate::model::order::{Order, OrderProgress, OrderStatus, PayrollEntry, PayrollStatus};
use crate::model::tradesperson::{
    Application, ApplicationStatus, ProfileDetails, TradespersonProfile, MAX_RATING, MIN_RATING,
};
use crate::model::Stored;
use rand::Rng;
use rust_decimal::Decimal;

pub const SKILL_POOL: [&str; 6] = [
    "Renovasi",
    "Bangun Baru",
    "Plumbing",
    "Elektrikal",
    "Interior",
    "Cat",
];
pub const SERVICE_TYPES: [&str; 6] = [
    "harian",
    "borongan",
    "renovasi",
    "premium",
    "korporate",
    "bangun",
];
pub const ORDER_STATUS_CYCLE: [OrderStatus; 4] = [
    OrderStatus::Pending,
    OrderStatus::InProgress,
    OrderStatus::Completed,
    OrderStatus::Cancelled,
];
const APPLICATION_STATUS_CYCLE: [ApplicationStatus; 5] = [
    ApplicationStatus::Pending,
    ApplicationStatus::Pending,
    ApplicationStatus::Pending,
    ApplicationStatus::Approved,
    ApplicationStatus::Rejected,
];
const NAMED_ADMINS: [&str; 3] = ["Admin Utama", "Admin Dua", "Admin Tiga"];
const SKILLS_PER_PROFILE: usize = 2;
const INITIAL_PROGRESS_PERCENT: u8 = 30;

/// Returns `pool[index % pool.len()]`, or `None` for an empty pool.
pub fn cyclic<T>(pool: &[T], index: usize) -> Option<&T> {
    if pool.is_empty() {
        return None;
    }
    pool.get(index % pool.len())
}

fn required<'a, T>(
    pool: &'a [T],
    index: usize,
    step: StepId,
    dependency: &'static str,
) -> SeedResult<&'a T> {
    cyclic(pool, index).ok_or(SeedError::MissingDependency {
        step: step.name(),
        dependency,
    })
}

pub fn admin_fixtures(count: usize, password_hash: &str) -> Vec<Account> {
    (0..count)
        .map(|index| {
            let name = NAMED_ADMINS
                .get(index)
                .map_or_else(|| format!("Admin {}", index + 1), |name| (*name).to_string());
            let email = if index == 0 {
                "admin@ngulikang.com".to_string()
            } else {
                format!("admin{}@ngulikang.com", index + 1)
            };
            Account::new(name, email, password_hash, Role::Admin)
        })
        .collect()
}

pub fn customer_fixtures(count: usize, password_hash: &str) -> Vec<Account> {
    (1..=count)
        .map(|n| {
            Account::new(
                format!("User {n}"),
                format!("user{n}@example.com"),
                password_hash,
                Role::Customer,
            )
        })
        .collect()
}

/// Tradesperson accounts, each paired with freshly drawn profile details.
pub fn tradesperson_fixtures<R: Rng>(
    count: usize,
    password_hash: &str,
    rng: &mut R,
) -> Vec<(Account, ProfileDetails)> {
    (1..=count)
        .map(|n| {
            let account = Account::new(
                format!("Tukang {n}"),
                format!("tukang{n}@ngulikang.com"),
                password_hash,
                Role::Tradesperson,
            );
            (account, profile_details(rng))
        })
        .collect()
}

/// Draws skills, experience, rating and balance uniformly from fixed ranges.
pub fn profile_details<R: Rng>(rng: &mut R) -> ProfileDetails {
    let mut skills: Vec<String> = Vec::with_capacity(SKILLS_PER_PROFILE);
    for _ in 0..SKILLS_PER_PROFILE {
        let skill = SKILL_POOL[rng.gen_range(0..SKILL_POOL.len())];
        if !skills.iter().any(|known| known == skill) {
            skills.push(skill.to_string());
        }
    }

    let rating = MIN_RATING + rng.gen::<f64>() * (MAX_RATING - MIN_RATING);

    ProfileDetails {
        skills,
        experience: format!("{} tahun", rng.gen_range(2..=9)),
        rating: ((rating * 10.0).round() / 10.0).clamp(MIN_RATING, MAX_RATING),
        verified: true,
        balance: Decimal::from(500_000 + rng.gen_range(0..1_500_000_i64)),
    }
}

/// Applications from the first customers, falling back to placeholder
/// emails when there are fewer customers than applications.
pub fn application_fixtures(count: usize, customers: &[Stored<Account>]) -> Vec<Application> {
    (0..count)
        .map(|index| {
            let customer = customers.get(index);
            Application {
                email: customer.map_or_else(
                    || format!("lamaran{}@example.com", index + 1),
                    |customer| customer.email.clone(),
                ),
                phone: format!("08123{index}456789"),
                skills: vec!["Renovasi".to_string(), "Bangun Baru".to_string()],
                status: APPLICATION_STATUS_CYCLE[index % APPLICATION_STATUS_CYCLE.len()],
                account_id: customer.map(|customer| customer.id),
            }
        })
        .collect()
}

pub fn product_fixtures(count: usize) -> Vec<Product> {
    (0..count)
        .map(|index| Product {
            name: format!("Produk {}", index + 1),
            description: "Produk berkualitas untuk kebutuhan proyek.".to_string(),
            price: Decimal::from(50_000 + index as i64 * 25_000),
            category: if index % 2 == 0 {
                "Bahan Bangunan".to_string()
            } else {
                "Peralatan".to_string()
            },
            image_url: String::new(),
            stock: 10 + index as u32,
        })
        .collect()
}

/// Orders cycling through customers, tradespeople, statuses and service types.
///
/// Pending orders carry no tradesperson; every other status is assigned
/// `tradespeople[index % len]`.
pub fn order_fixtures(
    count: usize,
    customers: &[Stored<Account>],
    tradespeople: &[Stored<TradespersonProfile>],
) -> SeedResult<Vec<Order>> {
    (0..count)
        .map(|index| {
            let customer = required(customers, index, StepId::Orders, "customer accounts")?;
            let tradesperson =
                required(tradespeople, index, StepId::Orders, "tradesperson profiles")?;
            let status = ORDER_STATUS_CYCLE[index % ORDER_STATUS_CYCLE.len()];

            Ok(Order {
                customer_id: customer.id,
                tradesperson_id: (status != OrderStatus::Pending).then_some(tradesperson.id),
                service_type: SERVICE_TYPES[index % SERVICE_TYPES.len()].to_string(),
                status,
                total_price: Decimal::from(1_500_000 + index as i64 * 250_000),
                location: format!("Lokasi proyek {}", index + 1),
                notes: "Catatan order contoh.".to_string(),
            })
        })
        .collect()
}

/// One initial progress report per in-progress order; other orders are ignored.
pub fn progress_fixtures(
    orders: &[Stored<Order>],
    tradespeople: &[Stored<TradespersonProfile>],
) -> SeedResult<Vec<OrderProgress>> {
    orders
        .iter()
        .filter(|order| order.status == OrderStatus::InProgress)
        .map(|order| {
            let updated_by = match order.tradesperson_id {
                Some(id) => id,
                None => {
                    required(tradespeople, 0, StepId::OrderProgress, "tradesperson profiles")?.id
                }
            };
            Ok(OrderProgress {
                order_id: order.id,
                percentage: INITIAL_PROGRESS_PERCENT,
                notes: "Pengerjaan awal dimulai.".to_string(),
                images: Vec::new(),
                updated_by,
            })
        })
        .collect()
}

/// Payroll entries; the first `pending` entries are unpaid, the rest paid at `now_ms`.
pub fn payroll_fixtures(
    count: usize,
    pending: usize,
    tradespeople: &[Stored<TradespersonProfile>],
    orders: &[Stored<Order>],
    now_ms: i64,
) -> SeedResult<Vec<PayrollEntry>> {
    (0..count)
        .map(|index| {
            let tradesperson =
                required(tradespeople, index, StepId::Payroll, "tradesperson profiles")?;
            let paid = index >= pending;
            Ok(PayrollEntry {
                tradesperson_id: tradesperson.id,
                order_id: cyclic(orders, index).map(|order| order.id),
                amount: Decimal::from(300_000 + index as i64 * 50_000),
                status: if paid {
                    PayrollStatus::Paid
                } else {
                    PayrollStatus::Pending
                },
                paid_at: paid.then_some(now_ms),
            })
        })
        .collect()
}

/// Threads between customers and tradesperson accounts, each with an
/// opening three-message exchange.
pub fn chat_fixtures(
    count: usize,
    customers: &[Stored<Account>],
    tradespeople: &[Stored<TradespersonProfile>],
) -> SeedResult<Vec<(ChatThread, Vec<Message>)>> {
    (0..count)
        .map(|index| {
            let customer = required(customers, index, StepId::Chat, "customer accounts")?;
            let tradesperson =
                required(tradespeople, index, StepId::Chat, "tradesperson profiles")?;
            let thread = ChatThread {
                customer_id: customer.id,
                tradesperson_account_id: tradesperson.account_id,
            };
            let line = |sender_id, content: &str, read| Message {
                sender_id,
                content: content.to_string(),
                read,
            };
            let messages = vec![
                line(customer.id, "Halo, saya butuh bantuan proyek.", true),
                line(tradesperson.account_id, "Siap, kapan mau mulai?", true),
                line(customer.id, "Minggu depan bisa?", false),
            ];
            Ok((thread, messages))
        })
        .collect()
}

pub fn notification_fixtures(
    count: usize,
    customers: &[Stored<Account>],
) -> SeedResult<Vec<Notification>> {
    (0..count)
        .map(|index| {
            let customer = required(customers, index, StepId::Notifications, "customer accounts")?;
            Ok(Notification {
                account_id: customer.id,
                kind: "order".to_string(),
                title: "Update Order".to_string(),
                message: format!("Order Anda mendapatkan update ke-{}.", index + 1),
                read: index % 2 == 0,
            })
        })
        .collect()
}

/// Puts every given product in the first customer's cart with quantity
/// `position + 1`. No products means no cart lines.
pub fn cart_fixtures(
    customers: &[Stored<Account>],
    products: &[Stored<Product>],
) -> SeedResult<Vec<CartItem>> {
    if products.is_empty() {
        return Ok(Vec::new());
    }
    let customer = required(customers, 0, StepId::Cart, "customer accounts")?;
    Ok(products
        .iter()
        .zip(1..)
        .map(|(product, quantity)| CartItem {
            account_id: customer.id,
            product_id: product.id,
            quantity,
        })
        .collect())
}
