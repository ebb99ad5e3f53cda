//! Pending Transaction Model
//!
//! Middle state between checkout and seller confirmation. One row per
//! seller per checkout, aggregating that seller's physical items.
//!
//! Lifecycle: `pending → completed` (seller credited once, deal written,
//! row deleted) or `pending → rejected` (confirmation attempted after the
//! 96 hour window). Both transitions are terminal.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Hours a pending transaction stays confirmable
pub const CONFIRMATION_WINDOW_HOURS: i64 = 96;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTransaction {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub transaction_id: String,
    pub seller_id: String,
    pub buyer_id: String,
    /// Aggregate price of all products in this transaction
    pub price_in_points: i64,
    pub product_ids: Vec<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl PendingTransaction {
    pub fn new(
        transaction_id: impl Into<String>,
        seller_id: impl Into<String>,
        buyer_id: impl Into<String>,
        price_in_points: i64,
        product_ids: Vec<String>,
    ) -> Self {
        Self {
            id: None,
            transaction_id: transaction_id.into(),
            seller_id: seller_id.into(),
            buyer_id: buyer_id.into(),
            price_in_points,
            product_ids,
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Expiry is evaluated lazily at confirmation time, never by a sweep
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > Duration::hours(CONFIRMATION_WINDOW_HOURS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Rejected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_window() {
        let tx = PendingTransaction::new("t1", "seller", "buyer", 100, vec!["p1".into()]);

        let now = tx.created_at + Duration::hours(95);
        assert!(!tx.is_expired(now));

        let now = tx.created_at + Duration::hours(96);
        assert!(!tx.is_expired(now)); // boundary is inclusive

        let now = tx.created_at + Duration::hours(96) + Duration::seconds(1);
        assert!(tx.is_expired(now));
    }
}
