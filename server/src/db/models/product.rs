//! Product Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Marketplace product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub product_id: String,
    /// uid of the selling user
    pub seller_id: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
    pub price_in_points: i64,
    /// Remaining stock, floored at 0 on sale
    #[serde(default)]
    pub quantity: i64,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub fav_count: i64,
    /// Sales / download counter (bumped on every checkout)
    #[serde(default)]
    pub download_count: i64,
    /// Digital goods carry a file and settle synchronously
    #[serde(default)]
    pub is_file: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl Product {
    pub fn new(
        product_id: impl Into<String>,
        seller_id: impl Into<String>,
        title: impl Into<String>,
        price_in_points: i64,
    ) -> Self {
        Self {
            id: None,
            product_id: product_id.into(),
            seller_id: seller_id.into(),
            title: title.into(),
            category: String::new(),
            price_in_points,
            quantity: 1,
            is_available: true,
            fav_count: 0,
            download_count: 0,
            is_file: false,
            file_url: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_stock(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn as_digital(mut self, file_url: impl Into<String>) -> Self {
        self.is_file = true;
        self.file_url = Some(file_url.into());
        self
    }

    /// Digital items are credited to the seller at checkout time
    pub fn is_digital(&self) -> bool {
        self.is_file && self.file_url.is_some()
    }
}
