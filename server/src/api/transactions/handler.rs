//! Transaction API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::ApiResponse;
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::PendingTransaction;
use crate::settlement::ConfirmationOutcome;
use crate::utils::{AppResult, ok, ok_with_message};

#[derive(Debug, Deserialize, Validate)]
pub struct CompleteRequest {
    /// Seller uid; confirmation authorizes by ownership
    #[validate(length(min = 1, message = "uid is required"))]
    pub uid: String,
}

/// GET /api/transactions/pending/:uid - 卖家待确认交易列表
pub async fn list_pending(
    State(state): State<ServerState>,
    Path(uid): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<PendingTransaction>>>> {
    let pending = state.settlement.list_pending(&uid).await?;
    Ok(ok(pending))
}

/// POST /api/transactions/complete/:transaction_id - 卖家确认交易
pub async fn complete(
    State(state): State<ServerState>,
    Path(transaction_id): Path<String>,
    Json(payload): Json<CompleteRequest>,
) -> AppResult<Json<ApiResponse<ConfirmationOutcome>>> {
    payload.validate()?;
    let outcome = state
        .settlement
        .confirm(&transaction_id, &payload.uid)
        .await?;
    Ok(ok_with_message(outcome, "Transaction completed"))
}
