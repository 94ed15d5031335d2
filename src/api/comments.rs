use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath};
use crate::error::Result;
use crate::models::{CommentDto, CommentRequest};
use crate::state::AppState;

/// GET /api/posts/:id/comments - 评论列表
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    ApiPath(post_id): ApiPath<i64>,
) -> Result<Json<Vec<CommentDto>>> {
    Ok(Json(state.comments.get_comments_by_post_id(post_id).await?))
}

/// GET /api/posts/:id/comments/:comment_id - 获取评论
pub async fn get_comment(
    State(state): State<Arc<AppState>>,
    ApiPath((post_id, comment_id)): ApiPath<(i64, i64)>,
) -> Result<Json<CommentDto>> {
    Ok(Json(state.comments.get_comment_by_id(post_id, comment_id).await?))
}

/// POST /api/posts/:id/comments - 添加评论
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    ApiPath(post_id): ApiPath<i64>,
    ApiJson(req): ApiJson<CommentRequest>,
) -> Result<(StatusCode, Json<CommentDto>)> {
    let comment = state.comments.add_comment_to_post(post_id, req).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PUT /api/posts/:id/comments/:comment_id - 更新评论
pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    ApiPath((post_id, comment_id)): ApiPath<(i64, i64)>,
    ApiJson(req): ApiJson<CommentRequest>,
) -> Result<Json<CommentDto>> {
    Ok(Json(state.comments.update_comment(post_id, comment_id, req).await?))
}

/// DELETE /api/posts/:id/comments/:comment_id - 删除评论
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    ApiPath((post_id, comment_id)): ApiPath<(i64, i64)>,
) -> Result<StatusCode> {
    state.comments.delete_comment(post_id, comment_id).await?;
    Ok(StatusCode::OK)
}
