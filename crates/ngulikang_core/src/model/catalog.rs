//! Product catalog and per-account cart lines.

use super::{require_non_empty, EntityKind, RecordId, Validate, ValidationError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub image_url: String,
    pub stock: u32,
}

impl Validate for Product {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(EntityKind::Product, "name", &self.name)?;
        require_non_empty(EntityKind::Product, "category", &self.category)?;
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(ValidationError::OutOfRange {
                entity: EntityKind::Product,
                field: "price",
                value: self.price.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub account_id: RecordId,
    pub product_id: RecordId,
    pub quantity: u32,
}

impl Validate for CartItem {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.quantity == 0 {
            return Err(ValidationError::OutOfRange {
                entity: EntityKind::CartItem,
                field: "quantity",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}
