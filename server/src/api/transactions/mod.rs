//! 待确认交易 API 模块
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/transactions/pending/{uid} | GET | 卖家待确认交易列表 |
//! | /api/transactions/complete/{transaction_id} | POST | 卖家确认交易 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/transactions", transaction_routes())
}

fn transaction_routes() -> Router<ServerState> {
    Router::new()
        .route("/pending/{uid}", get(handler::list_pending))
        .route("/complete/{transaction_id}", post(handler::complete))
}
