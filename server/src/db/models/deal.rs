//! Deal Model
//!
//! Durable record of a completed transaction, referenced from both the
//! buyer's and the seller's `deals` list. Append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub deal_id: String,
    pub seller_id: String,
    pub buyer_id: String,
    pub total_price_in_points: i64,
    pub items: Vec<DealItem>,
    pub deal_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealItem {
    pub product_id: String,
    pub product_title: String,
    pub price_in_points: i64,
}
