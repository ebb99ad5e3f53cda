//! Store API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shared::ApiResponse;
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::Product;
use crate::settlement::{CheckoutItem, CheckoutReceipt};
use crate::utils::{AppResult, ok, ok_with_message};

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, message = "uid is required"))]
    pub uid: String,
    #[validate(length(min = 1, message = "at least one item is required"))]
    pub items: Vec<CheckoutItem>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FavoriteRequest {
    #[validate(length(min = 1, message = "uid is required"))]
    pub uid: String,
}

#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub product_id: String,
    pub is_favorited: bool,
    pub fav_count: i64,
}

/// GET /api/store/products - 在售商品列表
pub async fn list_products(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let products = state.products.find_all().await?;
    Ok(ok(products))
}

/// POST /api/store/products/:product_id/favorite - 收藏/取消收藏商品
pub async fn toggle_favorite(
    State(state): State<ServerState>,
    Path(product_id): Path<String>,
    Json(payload): Json<FavoriteRequest>,
) -> AppResult<Json<ApiResponse<FavoriteResponse>>> {
    payload.validate()?;
    let (is_favorited, fav_count) = state.users.toggle_favorite(&payload.uid, &product_id).await?;
    Ok(ok(FavoriteResponse {
        product_id,
        is_favorited,
        fav_count,
    }))
}

/// POST /api/store/checkout - 结账
pub async fn checkout(
    State(state): State<ServerState>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<CheckoutReceipt>>> {
    payload.validate()?;
    let receipt = state
        .settlement
        .checkout(&payload.uid, &payload.items)
        .await?;
    Ok(ok_with_message(receipt, "Checkout settled"))
}
