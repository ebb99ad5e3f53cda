//! Post Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;
use super::user::UserPublic;

/// Post model
///
/// Counters and the `likes`/`bookmarks` sets must stay consistent with the
/// engagement events applied to the post; all counter updates go through
/// single atomic statements in the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub post_id: String,
    /// Record link to the author's user row
    pub author: RecordId,
    pub content: String,
    #[serde(default)]
    pub impressions: i64,
    #[serde(default)]
    pub comments_count: i64,
    #[serde(default)]
    pub reposts_count: i64,
    /// uids of users who liked this post
    #[serde(default)]
    pub likes: Vec<String>,
    /// uids of users who bookmarked this post
    #[serde(default)]
    pub bookmarks: Vec<String>,
    /// Flat comment storage; readers rebuild the thread via parent_id
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_post_id: Option<String>,
    #[serde(default)]
    pub is_repost: bool,
}

impl Post {
    pub fn new(post_id: impl Into<String>, author: RecordId, content: impl Into<String>) -> Self {
        Self {
            id: None,
            post_id: post_id.into(),
            author,
            content: content.into(),
            impressions: 0,
            comments_count: 0,
            reposts_count: 0,
            likes: Vec::new(),
            bookmarks: Vec::new(),
            comments: Vec::new(),
            created_at: Utc::now(),
            original_post_id: None,
            is_repost: false,
        }
    }

    pub fn as_repost(mut self, original_post_id: impl Into<String>) -> Self {
        self.original_post_id = Some(original_post_id.into());
        self.is_repost = true;
        self
    }
}

/// Embedded comment; `comment_id` is unique within the post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: String,
    pub user_id: String,
    pub comment: String,
    /// Empty string = top-level; no depth limit is enforced here
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub likes: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Read model for feed queries (`SELECT * FROM post FETCH author`)
///
/// The author link comes back expanded; only the public subset is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWithAuthor {
    pub post_id: String,
    pub author: UserPublic,
    pub content: String,
    #[serde(default)]
    pub impressions: i64,
    #[serde(default)]
    pub comments_count: i64,
    #[serde(default)]
    pub reposts_count: i64,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub bookmarks: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_post_id: Option<String>,
    #[serde(default)]
    pub is_repost: bool,
}
