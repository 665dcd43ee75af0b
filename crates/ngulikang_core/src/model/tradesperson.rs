//! Tradesperson ("tukang") profiles and the applications that precede them.

use super::{require_non_empty, EntityKind, RecordId, Validate, ValidationError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const MIN_RATING: f64 = 3.0;
pub const MAX_RATING: f64 = 5.0;

/// Profile owned 1:1 by an account with `Role::Tradesperson`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradespersonProfile {
    pub account_id: RecordId,
    #[serde(flatten)]
    pub details: ProfileDetails,
}

/// Profile attributes generated before the owning account exists.
///
/// The account and its profile are created together, so the generator cannot
/// know `account_id` yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDetails {
    /// Non-empty, drawn from `seed::generators::SKILL_POOL`.
    pub skills: Vec<String>,
    /// Human readable, e.g. `4 tahun`.
    pub experience: String,
    pub rating: f64,
    pub verified: bool,
    /// Whole rupiah, never negative.
    pub balance: Decimal,
}

impl Validate for TradespersonProfile {
    fn validate(&self) -> Result<(), ValidationError> {
        self.details.validate()
    }
}

impl Validate for ProfileDetails {
    fn validate(&self) -> Result<(), ValidationError> {
        const KIND: EntityKind = EntityKind::TradespersonProfile;

        if self.skills.is_empty() {
            return Err(ValidationError::EmptyField {
                entity: KIND,
                field: "skills",
            });
        }
        require_non_empty(KIND, "experience", &self.experience)?;
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ValidationError::OutOfRange {
                entity: KIND,
                field: "rating",
                value: self.rating.to_string(),
            });
        }
        if self.balance.is_sign_negative() && !self.balance.is_zero() {
            return Err(ValidationError::OutOfRange {
                entity: KIND,
                field: "balance",
                value: self.balance.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Candidate submission to join as a tradesperson ("lamaran").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub email: String,
    pub phone: String,
    pub skills: Vec<String>,
    pub status: ApplicationStatus,
    pub account_id: Option<RecordId>,
}

impl Validate for Application {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(EntityKind::Application, "email", &self.email)?;
        require_non_empty(EntityKind::Application, "phone", &self.phone)
    }
}
