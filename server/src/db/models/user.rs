//! User Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// User model (marketplace + feed relevant subset)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub uid: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub profile_pic: Vec<String>,
    /// Subscribers get a flat ranking bonus on their posts
    #[serde(default)]
    pub is_subscriber: bool,
    /// Points balance, never negative
    #[serde(default)]
    pub points_balance: i64,
    /// Product ids; duplicates encode quantity
    #[serde(default)]
    pub cart: Vec<String>,
    #[serde(default)]
    pub favorites: Vec<String>,
    /// Post ids this user liked (mirror of post.likes)
    #[serde(default)]
    pub likes: Vec<String>,
    /// Post ids this user bookmarked (mirror of post.bookmarks)
    #[serde(default)]
    pub bookmarks: Vec<String>,
    /// Deal ids, append-only
    #[serde(default)]
    pub deals: Vec<String>,
    /// Append-only purchase records
    #[serde(default)]
    pub purchase_history: Vec<PurchaseRecord>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(uid: impl Into<String>, firstname: impl Into<String>, lastname: impl Into<String>) -> Self {
        Self {
            id: None,
            uid: uid.into(),
            firstname: firstname.into(),
            lastname: lastname.into(),
            username: String::new(),
            profile_pic: Vec::new(),
            is_subscriber: false,
            points_balance: 0,
            cart: Vec::new(),
            favorites: Vec::new(),
            likes: Vec::new(),
            bookmarks: Vec::new(),
            deals: Vec::new(),
            purchase_history: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_balance(mut self, points: i64) -> Self {
        self.points_balance = points;
        self
    }

    pub fn with_subscription(mut self, is_subscriber: bool) -> Self {
        self.is_subscriber = is_subscriber;
        self
    }
}

/// Public author subset, safe to embed in feed responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPublic {
    pub uid: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub profile_pic: Vec<String>,
    #[serde(default)]
    pub is_subscriber: bool,
}

/// One checkout, as recorded on the buyer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub id: String,
    pub date: DateTime<Utc>,
    pub total_products_purchased: i64,
    pub total_points_spent: i64,
    pub items: Vec<PurchaseItem>,
    pub status: PurchaseStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseItem {
    pub product_id: String,
    pub title: String,
    pub quantity: i64,
    pub price_in_points: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Pending,
    Approved,
    Rejected,
}
