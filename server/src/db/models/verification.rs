//! Verification Code Model
//!
//! Durable, expiry-carrying replacement for the process-local reset-code
//! map: survives restarts and works across multiple server instances.
//! Rows are queried and deleted explicitly; an expired row is treated as
//! absent by readers.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationCode {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Lookup key (e.g. the user's email address)
    pub key: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl VerificationCode {
    pub fn new(key: impl Into<String>, code: impl Into<String>, ttl_minutes: i64) -> Self {
        Self {
            id: None,
            key: key.into(),
            code: code.into(),
            expires_at: Utc::now() + Duration::minutes(ttl_minutes),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
