//! Orders and the records that hang off them: progress reports and payroll.
//!
//! # Invariants
//! - A paid payroll entry carries `paid_at`; a pending one never does.
//! - Progress percentage stays within `0..=100`.
//!
//! The "no tradesperson while pending" rule is a fixture-generation policy
//! (see `seed::generators::order_fixtures`), not a model invariant: a real
//! order may be cancelled before anyone is assigned.

use super::{require_non_empty, EntityKind, RecordId, Validate, ValidationError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Customer account.
    pub customer_id: RecordId,
    /// Assigned tradesperson profile.
    pub tradesperson_id: Option<RecordId>,
    pub service_type: String,
    pub status: OrderStatus,
    pub total_price: Decimal,
    pub location: String,
    pub notes: String,
}

impl Validate for Order {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(EntityKind::Order, "service_type", &self.service_type)?;
        require_non_empty(EntityKind::Order, "location", &self.location)?;
        if self.total_price.is_sign_negative() && !self.total_price.is_zero() {
            return Err(ValidationError::OutOfRange {
                entity: EntityKind::Order,
                field: "total_price",
                value: self.total_price.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderProgress {
    pub order_id: RecordId,
    pub percentage: u8,
    pub notes: String,
    pub images: Vec<String>,
    /// Tradesperson profile that reported the progress.
    pub updated_by: RecordId,
}

impl Validate for OrderProgress {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.percentage > 100 {
            return Err(ValidationError::OutOfRange {
                entity: EntityKind::OrderProgress,
                field: "percentage",
                value: self.percentage.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    Pending,
    Paid,
}

impl PayrollStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }
}

/// Wage entry ("gaji") owed to a tradesperson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollEntry {
    pub tradesperson_id: RecordId,
    pub order_id: Option<RecordId>,
    pub amount: Decimal,
    pub status: PayrollStatus,
    /// Unix epoch milliseconds; set iff `status == Paid`.
    pub paid_at: Option<i64>,
}

impl Validate for PayrollEntry {
    fn validate(&self) -> Result<(), ValidationError> {
        let paid = self.status == PayrollStatus::Paid;
        if paid != self.paid_at.is_some() {
            return Err(ValidationError::Inconsistent {
                entity: EntityKind::PayrollEntry,
                details: "paid_at must be set exactly when status is paid",
            });
        }
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(ValidationError::OutOfRange {
                entity: EntityKind::PayrollEntry,
                field: "amount",
                value: self.amount.to_string(),
            });
        }
        Ok(())
    }
}
