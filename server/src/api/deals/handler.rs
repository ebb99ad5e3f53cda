//! Deal API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::ApiResponse;

use crate::core::ServerState;
use crate::db::models::Deal;
use crate::utils::{AppResult, ok};

/// GET /api/deals/:uid - 用户成交记录，买卖双方视角一致
pub async fn list_for_user(
    State(state): State<ServerState>,
    Path(uid): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<Deal>>>> {
    let deals = state.settlement.list_deals(&uid).await?;
    Ok(ok(deals))
}
