//! Notification API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::ApiResponse;

use crate::core::ServerState;
use crate::db::models::Notification;
use crate::utils::{AppResult, ok, ok_with_message};

/// GET /api/notifications/:uid - 用户通知列表
pub async fn list_for_user(
    State(state): State<ServerState>,
    Path(uid): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<Notification>>>> {
    let notifications = state.notifier.list_for_user(&uid).await?;
    Ok(ok(notifications))
}

/// PATCH /api/notifications/:notification_id/read - 标记已读
pub async fn mark_read(
    State(state): State<ServerState>,
    Path(notification_id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.notifier.mark_read(&notification_id).await?;
    Ok(ok_with_message((), "Notification marked read"))
}
