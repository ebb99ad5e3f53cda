//! Data models for the campus platform
//!
//! One canonical model per table. Record links use [`surrealdb::RecordId`];
//! cross-table references that travel to clients use the domain string ids
//! (`uid`, `post_id`, `product_id`, ...) instead of raw record ids.

pub mod serde_helpers;

pub mod deal;
pub mod notification;
pub mod post;
pub mod product;
pub mod transaction;
pub mod user;
pub mod verification;

pub use deal::{Deal, DealItem};
pub use notification::Notification;
pub use post::{Comment, Post, PostWithAuthor};
pub use product::Product;
pub use transaction::{CONFIRMATION_WINDOW_HOURS, PendingTransaction, TransactionStatus};
pub use user::{PurchaseItem, PurchaseRecord, PurchaseStatus, User, UserPublic};
pub use verification::VerificationCode;
