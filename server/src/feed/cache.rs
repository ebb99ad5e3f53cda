//! 首页 TTL 缓存
//!
//! 只缓存无游标的首页请求（按页大小分键）。互动写入不会主动失效缓存，
//! TTL 窗口内的陈旧计数是可接受的；游标页永远直读数据库。

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Default time-to-live for cached pages (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CacheEntry<T> {
    stored_at: Instant,
    value: T,
}

/// TTL cache for fully assembled first pages
///
/// Entries expire passively: an expired entry is evicted when the next
/// lookup touches it. Cloneable handle, shared across request handlers.
#[derive(Clone)]
pub struct FeedCache<T> {
    entries: Arc<DashMap<String, CacheEntry<T>>>,
    ttl: Duration,
}

impl<T: Clone> FeedCache<T> {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Cache key for a cursorless first page of the given size
    pub fn first_page_key(limit: usize) -> String {
        format!("feed:first:{limit}")
    }

    /// Fetch a live entry; expired entries are evicted on the way out
    pub fn get(&self, key: &str) -> Option<T> {
        let hit = {
            let entry = self.entries.get(key)?;
            if entry.stored_at.elapsed() < self.ttl {
                Some(entry.value.clone())
            } else {
                None
            }
        };
        if hit.is_none() {
            self.entries.remove(key);
        }
        hit
    }

    pub fn put(&self, key: impl Into<String>, value: T) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                stored_at: Instant::now(),
                value,
            },
        );
    }

    /// Drop everything (tests, manual invalidation)
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone> Default for FeedCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_ttl() {
        let cache: FeedCache<Vec<i32>> = FeedCache::with_ttl(Duration::from_secs(60));
        cache.put("feed:first:15", vec![1, 2, 3]);
        assert_eq!(cache.get("feed:first:15"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_miss_after_expiry() {
        let cache: FeedCache<i32> = FeedCache::with_ttl(Duration::from_millis(0));
        cache.put("k", 7);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("k"), None);
        // The expired entry was evicted, not just skipped
        assert!(cache.is_empty());
    }

    #[test]
    fn test_keys_are_independent() {
        let cache: FeedCache<i32> = FeedCache::new();
        cache.put(FeedCache::<i32>::first_page_key(15), 1);
        cache.put(FeedCache::<i32>::first_page_key(30), 2);
        assert_eq!(cache.get("feed:first:15"), Some(1));
        assert_eq!(cache.get("feed:first:30"), Some(2));
        assert_eq!(cache.get("feed:first:10"), None);
    }

    #[test]
    fn test_clear() {
        let cache: FeedCache<i32> = FeedCache::new();
        cache.put("a", 1);
        cache.put("b", 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
