//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`posts`] - Feed 与互动接口
//! - [`store`] - 商店与结账接口
//! - [`transactions`] - 待确认交易接口
//! - [`deals`] - 成交记录接口
//! - [`notifications`] - 通知接口
//!
//! 所有业务响应统一使用 [`shared::ApiResponse`] 信封。

pub mod deals;
pub mod health;
pub mod notifications;
pub mod posts;
pub mod store;
pub mod transactions;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// 汇总所有子路由并挂载中间件
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(posts::router())
        .merge(store::router())
        .merge(transactions::router())
        .merge(deals::router())
        .merge(notifications::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
