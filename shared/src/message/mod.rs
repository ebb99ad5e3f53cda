//! Broadcast bus message types
//!
//! These types are shared between the server and connected listeners.
//! Every mutation that changes observable post state is announced on the
//! bus after the storage write commits; publishing is fire-and-forget.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use uuid::Uuid;

pub mod payload;
pub use payload::*;

/// Bus event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// A post document changed (likes, bookmarks, ...)
    PostUpdated,
    /// Only the counters of a post changed
    PostStatsUpdated,
    /// A comment was appended to a post
    NewComment,
    /// A new post (or repost) entered the feed
    NewPost,
    /// A user-facing notification was created
    Notification,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::PostUpdated => write!(f, "post_updated"),
            EventType::PostStatsUpdated => write!(f, "post_stats_updated"),
            EventType::NewComment => write!(f, "new_comment"),
            EventType::NewPost => write!(f, "new_post"),
            EventType::Notification => write!(f, "notification"),
        }
    }
}

/// Message envelope carried on the broadcast channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusMessage {
    pub event_type: EventType,
    /// JSON-encoded event payload
    pub payload: serde_json::Value,
    /// Unique id for message tracing
    pub message_id: Uuid,
}

impl BusMessage {
    /// Create a new message from any serializable payload
    ///
    /// Serialization failure degrades to a null payload rather than
    /// failing the caller; the bus is best-effort by contract.
    pub fn new<T: Serialize>(event_type: EventType, payload: &T) -> Self {
        Self {
            event_type,
            payload: serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
            message_id: Uuid::new_v4(),
        }
    }

    pub fn post_updated<T: Serialize>(post: &T) -> Self {
        Self::new(EventType::PostUpdated, post)
    }

    pub fn post_stats_updated(stats: &PostStatsPayload) -> Self {
        Self::new(EventType::PostStatsUpdated, stats)
    }

    pub fn new_comment(payload: &NewCommentPayload) -> Self {
        Self::new(EventType::NewComment, payload)
    }

    pub fn new_post<T: Serialize>(post: &T) -> Self {
        Self::new(EventType::NewPost, post)
    }

    /// Decode the payload into a concrete type
    pub fn decode_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}
