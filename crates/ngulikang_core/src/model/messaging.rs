//! Chat threads, their messages, and account notifications.

use super::{require_non_empty, EntityKind, RecordId, Validate, ValidationError};
use serde::{Deserialize, Serialize};

/// Conversation between one customer and one tradesperson account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatThread {
    pub customer_id: RecordId,
    pub tradesperson_account_id: RecordId,
}

impl Validate for ChatThread {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.customer_id == self.tradesperson_account_id {
            return Err(ValidationError::Inconsistent {
                entity: EntityKind::ChatThread,
                details: "customer and tradesperson must be different accounts",
            });
        }
        Ok(())
    }
}

/// One line of a thread; storage keeps insertion order as `position`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender_id: RecordId,
    pub content: String,
    pub read: bool,
}

impl Validate for Message {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(EntityKind::Message, "content", &self.content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub account_id: RecordId,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub read: bool,
}

impl Validate for Notification {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(EntityKind::Notification, "type", &self.kind)?;
        require_non_empty(EntityKind::Notification, "title", &self.title)
    }
}
