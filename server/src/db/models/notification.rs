//! Notification Model
//!
//! Fire-and-forget side records; creation failures never fail the
//! operation that triggered them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub notification_id: String,
    /// uid of the recipient
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    /// "purchase" | "payment_received" | "deal_completed" | ...
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        notification_id: impl Into<String>,
        user_id: impl Into<String>,
        kind: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            notification_id: notification_id.into(),
            user_id: user_id.into(),
            title: title.into(),
            message: message.into(),
            is_read: false,
            kind: kind.into(),
            purchase_id: None,
            transaction_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_purchase(mut self, purchase_id: impl Into<String>) -> Self {
        self.purchase_id = Some(purchase_id.into());
        self
    }

    pub fn with_transaction(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }
}
