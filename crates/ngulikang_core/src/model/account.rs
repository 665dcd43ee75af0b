//! Account model: the identity every other fixture hangs off.
//!
//! # Invariants
//! - `email` is unique across all accounts (lookup-or-create at seed time,
//!   UNIQUE constraint in storage).

use super::{require_non_empty, EntityKind, Validate, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Tradesperson,
    Customer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Tradesperson => "tradesperson",
            Self::Customer => "customer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "tradesperson" => Some(Self::Tradesperson),
            "customer" => Some(Self::Customer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    pub name: String,
    /// Opaque digest produced by a `CredentialHasher`.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}

impl Account {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            password_hash: password_hash.into(),
            role,
        }
    }
}

impl Validate for Account {
    fn validate(&self) -> Result<(), ValidationError> {
        if !EMAIL_RE.is_match(&self.email) {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }
        require_non_empty(EntityKind::Account, "name", &self.name)?;
        require_non_empty(EntityKind::Account, "password_hash", &self.password_hash)
    }
}
