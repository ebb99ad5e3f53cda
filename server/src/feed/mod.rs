//! Feed 模块 - 排序、分页、缓存与互动
//!
//! # 结构
//!
//! - [`ranking`] - 排序分数与分页游标
//! - [`cache`] - 首页 TTL 缓存
//! - [`engine`] - 排序分页引擎 ([`FeedEngine`])
//! - [`engagement`] - 互动操作与广播 ([`EngagementEngine`])
//!
//! 排序分数是读取时派生的，从不落库；缓存只覆盖无游标的首页，
//! 互动写入不主动失效缓存（TTL 内的陈旧性是接受的折衷）。

pub mod cache;
pub mod engagement;
pub mod engine;
pub mod ranking;

pub use cache::FeedCache;
pub use engagement::{BookmarkState, CommentView, EngagementEngine};
pub use engine::{FeedEngine, FeedPage, RankedPost};
pub use ranking::{FeedCursor, ranking_score};
