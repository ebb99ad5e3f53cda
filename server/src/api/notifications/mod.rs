//! 通知 API 模块
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/notifications/{uid} | GET | 用户通知列表 |
//! | /api/notifications/{notification_id}/read | PATCH | 标记已读 |

mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/notifications", notification_routes())
}

fn notification_routes() -> Router<ServerState> {
    Router::new()
        .route("/{uid}", get(handler::list_for_user))
        .route("/{notification_id}/read", patch(handler::mark_read))
}
