//! Feed 与互动 API 模块
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/posts | GET | 排序分页的 Feed |
//! | /api/posts | POST | 发帖 |
//! | /api/posts/{post_id}/like | POST | 点赞/取消点赞 |
//! | /api/posts/{post_id}/bookmark | PATCH | 收藏/取消收藏 |
//! | /api/posts/{post_id}/impression | PATCH | 记录一次曝光 |
//! | /api/posts/{post_id}/comment | POST | 发表评论 |
//! | /api/posts/{post_id}/comments/{comment_id}/like | PATCH | 评论点赞 |
//! | /api/posts/repost | POST | 转发 |

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/posts", post_routes())
}

fn post_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::feed).post(handler::create))
        .route("/{post_id}/like", post(handler::toggle_like))
        .route("/{post_id}/bookmark", patch(handler::toggle_bookmark))
        .route("/{post_id}/impression", patch(handler::record_impression))
        .route("/repost", post(handler::repost))
        .route("/{post_id}/comment", post(handler::add_comment))
        .route(
            "/{post_id}/comments/{comment_id}/like",
            patch(handler::toggle_comment_like),
        )
}
