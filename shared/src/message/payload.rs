//! Typed payloads for bus events

use serde::{Deserialize, Serialize};

/// Counter delta for a single post
///
/// Only the counters that actually changed are present, so listeners can
/// patch their local copy without refetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostStatsPayload {
    pub post_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impressions: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reposts_count: Option<i64>,
}

impl PostStatsPayload {
    pub fn impressions(post_id: impl Into<String>, impressions: i64) -> Self {
        Self {
            post_id: post_id.into(),
            impressions: Some(impressions),
            comments_count: None,
            reposts_count: None,
        }
    }

    pub fn comments(post_id: impl Into<String>, comments_count: i64) -> Self {
        Self {
            post_id: post_id.into(),
            impressions: None,
            comments_count: Some(comments_count),
            reposts_count: None,
        }
    }

    pub fn reposts(post_id: impl Into<String>, reposts_count: i64) -> Self {
        Self {
            post_id: post_id.into(),
            impressions: None,
            comments_count: None,
            reposts_count: Some(reposts_count),
        }
    }
}

/// A freshly inserted comment, already enriched with author display fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCommentPayload {
    pub post_id: String,
    pub comment: serde_json::Value,
}

/// Notification announcement (id only; receivers fetch on demand)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub notification_id: String,
    pub user_id: String,
    pub kind: String,
}
