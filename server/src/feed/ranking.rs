//! Ranking score and pagination cursor
//!
//! `score = subscriber_bonus + impressions * 0.1 + created_at_ms / 1e9`
//!
//! Subscriber content dominates (the bonus towers over the other terms),
//! impressions give fine-grained ordering inside each band, and the
//! recency term makes newer posts win ties and lets old subscriber posts
//! eventually decay below fresh regular ones.
//!
//! The score is recomputed from current field values on every read and is
//! never stored, so a post can occupy different ranks across reads
//! separated by impression updates.

use chrono::{DateTime, Utc};

/// Flat bonus for subscriber authors
pub const SUBSCRIBER_BONUS: f64 = 1000.0;
/// Weight per impression
pub const IMPRESSION_WEIGHT: f64 = 0.1;
/// Divisor applied to the creation timestamp in milliseconds
pub const RECENCY_DIVISOR: f64 = 1e9;

/// Scores are compared in buckets of this size so that a score that went
/// through cursor encoding still compares equal to itself.
const SCORE_BUCKET: f64 = 1e9;

pub fn ranking_score(is_subscriber: bool, impressions: i64, created_at: DateTime<Utc>) -> f64 {
    let bonus = if is_subscriber { SUBSCRIBER_BONUS } else { 0.0 };
    bonus
        + impressions as f64 * IMPRESSION_WEIGHT
        + created_at.timestamp_millis() as f64 / RECENCY_DIVISOR
}

/// Round a score to the comparison bucket
pub fn bucket(score: f64) -> f64 {
    (score * SCORE_BUCKET).round() / SCORE_BUCKET
}

/// Pagination cursor: the `(score, post_id)` of the last returned post
///
/// Ordering is `(bucketed score desc, post_id desc)`. The immutable post
/// id breaks ties, which makes pagination exactly-once over a fixed
/// snapshot even when two posts share a score. A score alone could not
/// guarantee that.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedCursor {
    pub score: f64,
    pub post_id: String,
}

impl FeedCursor {
    /// Serialize to the opaque wire form `"<score>_<post_id>"`
    ///
    /// Post ids are base36 and never contain `_`.
    pub fn encode(&self) -> String {
        format!("{:.9}_{}", self.score, self.post_id)
    }

    /// Parse the wire form back; `None` on malformed input
    pub fn decode(raw: &str) -> Option<Self> {
        let (score_part, post_id) = raw.split_once('_')?;
        let score: f64 = score_part.parse().ok()?;
        if post_id.is_empty() || !score.is_finite() {
            return None;
        }
        Some(Self {
            score,
            post_id: post_id.to_string(),
        })
    }

    /// Whether a post with `(score, post_id)` comes strictly after this
    /// cursor in feed order
    pub fn is_after(&self, score: f64, post_id: &str) -> bool {
        let own = bucket(self.score);
        let other = bucket(score);
        if other < own {
            return true;
        }
        other == own && post_id < self.post_id.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_subscriber_bonus_dominates() {
        let t = at(1_700_000_000);
        let subscriber = ranking_score(true, 0, t);
        let popular = ranking_score(false, 5000, t);
        assert!(subscriber > popular);
    }

    #[test]
    fn test_newer_post_ranks_higher() {
        let older = ranking_score(false, 10, at(1_700_000_000));
        let newer = ranking_score(false, 10, at(1_700_100_000));
        assert!(newer > older);
    }

    #[test]
    fn test_impressions_raise_score() {
        let t = at(1_700_000_000);
        assert!(ranking_score(false, 100, t) > ranking_score(false, 0, t));
    }

    #[test]
    fn test_cursor_round_trip() {
        let cursor = FeedCursor {
            score: 1001.7341,
            post_id: "abc123xyz".to_string(),
        };
        let decoded = FeedCursor::decode(&cursor.encode()).unwrap();
        assert_eq!(decoded.post_id, "abc123xyz");
        assert_eq!(bucket(decoded.score), bucket(cursor.score));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(FeedCursor::decode("").is_none());
        assert!(FeedCursor::decode("no-separator").is_none());
        assert!(FeedCursor::decode("abc_p1").is_none());
        assert!(FeedCursor::decode("12.5_").is_none());
    }

    #[test]
    fn test_is_after_strict_ordering() {
        let cursor = FeedCursor {
            score: 100.0,
            post_id: "mmmmmmmmm".to_string(),
        };
        // Lower score: after
        assert!(cursor.is_after(99.9, "zzzzzzzzz"));
        // Same score, smaller id: after
        assert!(cursor.is_after(100.0, "aaaaaaaaa"));
        // Same score, same id (the cursor post itself): not after
        assert!(!cursor.is_after(100.0, "mmmmmmmmm"));
        // Same score, larger id: not after
        assert!(!cursor.is_after(100.0, "zzzzzzzzz"));
        // Higher score: not after
        assert!(!cursor.is_after(100.1, "aaaaaaaaa"));
    }

    #[test]
    fn test_cursor_survives_encoding_at_boundary() {
        // A post whose score equals the cursor's must still tie after the
        // cursor went through a string round trip
        let score = ranking_score(true, 37, at(1_712_345_678));
        let cursor = FeedCursor {
            score,
            post_id: "p00000005".to_string(),
        };
        let decoded = FeedCursor::decode(&cursor.encode()).unwrap();
        assert!(decoded.is_after(score, "p00000004"));
        assert!(!decoded.is_after(score, "p00000006"));
    }
}
