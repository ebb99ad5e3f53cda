//! 商店 API 模块
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/store/products | GET | 在售商品列表 |
//! | /api/store/products/{product_id}/favorite | POST | 收藏/取消收藏商品 |
//! | /api/store/checkout | POST | 结账 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/store", store_routes())
}

fn store_routes() -> Router<ServerState> {
    Router::new()
        .route("/products", get(handler::list_products))
        .route(
            "/products/{product_id}/favorite",
            post(handler::toggle_favorite),
        )
        .route("/checkout", post(handler::checkout))
}
