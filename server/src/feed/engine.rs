//! Feed 引擎 - 排序与分页
//!
//! # 流程
//!
//! ```text
//! list(cursor, limit)
//!   ├─ 无游标: 查缓存 ──命中──▶ 直接返回
//!   │            └──未命中──▶ 读库 + 排序 + 截页 + 写缓存
//!   └─ 有游标: 读库 + 排序 + 过滤(严格在游标之后) + 截页
//! ```
//!
//! 排序分数在读取时派生；数据库里从不存在 score 字段。

use serde::{Deserialize, Serialize};

use crate::db::models::PostWithAuthor;
use crate::db::repository::PostRepository;
use crate::utils::{AppError, AppResult};

use super::cache::FeedCache;
use super::ranking::{FeedCursor, bucket, ranking_score};

/// Posts per page when the client does not ask for a size
pub const DEFAULT_PAGE_SIZE: usize = 15;
/// Upper bound on requested page size
pub const MAX_PAGE_SIZE: usize = 50;

/// A post with its derived ranking score attached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedPost {
    #[serde(flatten)]
    pub post: PostWithAuthor,
    pub ranking_score: f64,
}

impl RankedPost {
    fn from_post(post: PostWithAuthor) -> Self {
        let score = ranking_score(post.author.is_subscriber, post.impressions, post.created_at);
        Self {
            post,
            ranking_score: score,
        }
    }

    fn cursor(&self) -> FeedCursor {
        FeedCursor {
            score: self.ranking_score,
            post_id: self.post.post_id.clone(),
        }
    }
}

/// One page of the feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage {
    pub posts: Vec<RankedPost>,
    /// Opaque cursor for the next page; absent on the last page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[derive(Clone)]
pub struct FeedEngine {
    posts: PostRepository,
    cache: FeedCache<FeedPage>,
    default_page_size: usize,
}

impl FeedEngine {
    pub fn new(posts: PostRepository, cache: FeedCache<FeedPage>) -> Self {
        Self {
            posts,
            cache,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, default_page_size: usize) -> Self {
        self.default_page_size = default_page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// List one page of the ranked feed
    ///
    /// `cursor` is the opaque string from a previous page's `next_cursor`.
    /// A malformed cursor is a validation error, not an empty page.
    pub async fn list(&self, cursor: Option<&str>, limit: Option<usize>) -> AppResult<FeedPage> {
        let limit = limit.unwrap_or(self.default_page_size).clamp(1, MAX_PAGE_SIZE);

        let cursor = match cursor {
            Some(raw) => Some(
                FeedCursor::decode(raw)
                    .ok_or_else(|| AppError::validation(format!("Invalid cursor: {raw}")))?,
            ),
            None => None,
        };

        // Only the cursorless first page goes through the cache
        let cache_key = match cursor {
            None => {
                let key = FeedCache::<FeedPage>::first_page_key(limit);
                if let Some(page) = self.cache.get(&key) {
                    return Ok(page);
                }
                Some(key)
            }
            Some(_) => None,
        };

        let mut ranked: Vec<RankedPost> = self
            .posts
            .list_with_authors()
            .await?
            .into_iter()
            .map(RankedPost::from_post)
            .collect();

        // (score desc, post_id desc); the id tie-break keeps the order
        // total so pagination never skips or repeats a post
        ranked.sort_by(|a, b| {
            bucket(b.ranking_score)
                .partial_cmp(&bucket(a.ranking_score))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.post.post_id.cmp(&a.post.post_id))
        });

        if let Some(ref c) = cursor {
            ranked.retain(|p| c.is_after(p.ranking_score, &p.post.post_id));
        }

        let has_more = ranked.len() > limit;
        ranked.truncate(limit);
        let next_cursor = if has_more {
            ranked.last().map(|p| p.cursor().encode())
        } else {
            None
        };

        let page = FeedPage {
            posts: ranked,
            next_cursor,
        };

        if let Some(key) = cache_key {
            self.cache.put(key, page.clone());
        }
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::{Post, User};
    use crate::db::repository::UserRepository;
    use std::time::Duration;

    async fn setup() -> (DbService, FeedEngine, UserRepository) {
        let db = DbService::open_in_memory().await.unwrap();
        let posts = PostRepository::new(db.db.clone());
        let users = UserRepository::new(db.db.clone());
        let engine = FeedEngine::new(posts, FeedCache::with_ttl(Duration::from_secs(300)));
        (db, engine, users)
    }

    async fn seed_author(users: &UserRepository, uid: &str, subscriber: bool) -> User {
        users
            .create(User::new(uid, "Test", "Author").with_subscription(subscriber))
            .await
            .unwrap()
    }

    async fn seed_post(db: &DbService, author: &User, post_id: &str, impressions: i64) {
        let mut post = Post::new(
            post_id,
            author.id.clone().unwrap(),
            format!("content of {post_id}"),
        );
        post.impressions = impressions;
        PostRepository::new(db.db.clone())
            .create(post)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_subscriber_posts_rank_first() {
        let (db, engine, users) = setup().await;
        let regular = seed_author(&users, "u-regular", false).await;
        let vip = seed_author(&users, "u-vip", true).await;
        seed_post(&db, &regular, "p-hot", 5000).await;
        seed_post(&db, &vip, "p-vip", 0).await;

        let page = engine.list(None, None).await.unwrap();
        assert_eq!(page.posts[0].post.post_id, "p-vip");
        assert_eq!(page.posts[1].post.post_id, "p-hot");
    }

    #[tokio::test]
    async fn test_pagination_covers_every_post_exactly_once() {
        let (db, engine, users) = setup().await;
        let author = seed_author(&users, "u-author", false).await;
        for i in 0..7 {
            // Identical impressions and near-identical timestamps force
            // the id tie-break to do the work
            seed_post(&db, &author, &format!("p{i}"), 10).await;
        }

        let mut seen = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = engine
                .list(cursor.as_deref(), Some(3))
                .await
                .unwrap();
            assert!(page.posts.len() <= 3);
            for p in &page.posts {
                seen.push(p.post.post_id.clone());
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 7);
    }

    #[tokio::test]
    async fn test_last_page_has_no_cursor() {
        let (db, engine, users) = setup().await;
        let author = seed_author(&users, "u-author", false).await;
        seed_post(&db, &author, "p-only", 0).await;

        let page = engine.list(None, Some(15)).await.unwrap();
        assert_eq!(page.posts.len(), 1);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_first_page_is_cached() {
        let (db, engine, users) = setup().await;
        let author = seed_author(&users, "u-author", false).await;
        seed_post(&db, &author, "p1", 0).await;

        let first = engine.list(None, Some(15)).await.unwrap();
        assert_eq!(first.posts.len(), 1);

        // New post lands after the page was cached
        seed_post(&db, &author, "p2", 0).await;
        let cached = engine.list(None, Some(15)).await.unwrap();
        assert_eq!(cached.posts.len(), 1, "within TTL the stale page is served");

        // A different page size is a different cache key
        let fresh = engine.list(None, Some(30)).await.unwrap();
        assert_eq!(fresh.posts.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_cursor_is_rejected() {
        let (_db, engine, _users) = setup().await;
        let err = engine.list(Some("not a cursor"), None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_feed() {
        let (_db, engine, _users) = setup().await;
        let page = engine.list(None, None).await.unwrap();
        assert!(page.posts.is_empty());
        assert!(page.next_cursor.is_none());
    }
}
