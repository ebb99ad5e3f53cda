//! Feed API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::ApiResponse;
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{Comment, Post};
use crate::feed::{BookmarkState, CommentView, FeedPage};
use crate::utils::{AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub cursor: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, message = "uid is required"))]
    pub uid: String,
    #[validate(length(min = 1, max = 5000, message = "content must be 1-5000 characters"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EngagementRequest {
    #[validate(length(min = 1, message = "uid is required"))]
    pub uid: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, message = "uid is required"))]
    pub uid: String,
    #[validate(length(min = 1, max = 2000, message = "comment must be 1-2000 characters"))]
    pub comment: String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RepostRequest {
    #[validate(length(min = 1, message = "uid is required"))]
    pub uid: String,
    #[validate(length(min = 1, message = "original_post_id is required"))]
    pub original_post_id: String,
    /// Optional quote text shown above the original
    #[serde(default)]
    #[validate(length(max = 5000, message = "content must be at most 5000 characters"))]
    pub content: String,
}

/// GET /api/posts - 排序分页的 Feed
pub async fn feed(
    State(state): State<ServerState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<ApiResponse<FeedPage>>> {
    let page = state
        .feed
        .list(query.cursor.as_deref(), query.limit)
        .await?;
    Ok(ok(page))
}

/// POST /api/posts - 发帖
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Post>>)> {
    payload.validate()?;
    let post = state
        .engagement
        .create_post(&payload.uid, &payload.content)
        .await?;
    Ok((StatusCode::CREATED, ok(post)))
}

/// POST /api/posts/:post_id/like - 点赞/取消点赞
pub async fn toggle_like(
    State(state): State<ServerState>,
    Path(post_id): Path<String>,
    Json(payload): Json<EngagementRequest>,
) -> AppResult<Json<ApiResponse<Post>>> {
    payload.validate()?;
    let post = state.engagement.toggle_like(&post_id, &payload.uid).await?;
    Ok(ok(post))
}

/// PATCH /api/posts/:post_id/bookmark - 收藏/取消收藏
pub async fn toggle_bookmark(
    State(state): State<ServerState>,
    Path(post_id): Path<String>,
    Json(payload): Json<EngagementRequest>,
) -> AppResult<Json<ApiResponse<BookmarkState>>> {
    payload.validate()?;
    let bookmark_state = state
        .engagement
        .toggle_bookmark(&post_id, &payload.uid)
        .await?;
    Ok(ok(bookmark_state))
}

#[derive(Debug, serde::Serialize)]
pub struct ImpressionResponse {
    pub post_id: String,
    pub impressions: i64,
}

/// PATCH /api/posts/:post_id/impression - 记录一次曝光
pub async fn record_impression(
    State(state): State<ServerState>,
    Path(post_id): Path<String>,
) -> AppResult<Json<ApiResponse<ImpressionResponse>>> {
    let impressions = state.engagement.record_impression(&post_id).await?;
    Ok(ok(ImpressionResponse {
        post_id,
        impressions,
    }))
}

/// POST /api/posts/:post_id/comment - 发表评论
pub async fn add_comment(
    State(state): State<ServerState>,
    Path(post_id): Path<String>,
    Json(payload): Json<CommentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CommentView>>)> {
    payload.validate()?;
    let view = state
        .engagement
        .add_comment(
            &post_id,
            &payload.uid,
            &payload.comment,
            payload.parent_id.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, ok(view)))
}

/// PATCH /api/posts/:post_id/comments/:comment_id/like - 评论点赞
pub async fn toggle_comment_like(
    State(state): State<ServerState>,
    Path((post_id, comment_id)): Path<(String, String)>,
    Json(payload): Json<EngagementRequest>,
) -> AppResult<Json<ApiResponse<Comment>>> {
    payload.validate()?;
    let comment = state
        .engagement
        .toggle_comment_like(&post_id, &comment_id, &payload.uid)
        .await?;
    Ok(ok(comment))
}

/// POST /api/posts/repost - 转发
pub async fn repost(
    State(state): State<ServerState>,
    Json(payload): Json<RepostRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Post>>)> {
    payload.validate()?;
    let post = state
        .engagement
        .repost(&payload.original_post_id, &payload.uid, &payload.content)
        .await?;
    Ok((StatusCode::CREATED, ok(post)))
}
