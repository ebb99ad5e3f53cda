//! 成交记录 API 模块
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/deals/{uid} | GET | 用户成交记录（买卖双方） |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/deals", deal_routes())
}

fn deal_routes() -> Router<ServerState> {
    Router::new().route("/{uid}", get(handler::list_for_user))
}
