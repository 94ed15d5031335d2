use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath};
use crate::error::{BlogError, Result};
use crate::models::{CreatePostRequest, PostDto, PostsResponse, UpdatePostRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub page_number: Option<String>,
    #[serde(default)]
    pub page_size: Option<String>,
}

/// Parse a page parameter; values below 1 are raised to 1 / 解析分页参数
fn parse_page_param(name: &str, value: Option<&str>) -> Result<Option<usize>> {
    let value = match value.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(v) => v,
    };
    let n: i64 = value
        .parse()
        .map_err(|_| BlogError::invalid(format!("{} must be an integer", name)))?;
    Ok(Some(usize::try_from(n.max(1)).unwrap_or(usize::MAX)))
}

/// GET /api/posts - 搜索文章列表
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PostsQuery>,
) -> Result<Json<PostsResponse>> {
    let page_number = parse_page_param("pageNumber", params.page_number.as_deref())?.unwrap_or(1);
    let page_size = parse_page_param("pageSize", params.page_size.as_deref())?;

    let page = state
        .posts
        .get_all_posts(&params.search, page_number, page_size)
        .await?;
    Ok(Json(page))
}

/// GET /api/posts/:id - 获取文章
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<PostDto>> {
    Ok(Json(state.posts.get_post_by_id(id).await?))
}

/// POST /api/posts - 创建文章
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostDto>)> {
    let post = state.posts.create_post(req).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/posts/:id - 更新文章
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdatePostRequest>,
) -> Result<Json<PostDto>> {
    Ok(Json(state.posts.update_post(id, req).await?))
}

/// DELETE /api/posts/:id - 删除文章
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode> {
    state.posts.delete_post(id).await?;
    Ok(StatusCode::OK)
}

/// POST /api/posts/:id/likes - 点赞，返回新的点赞数
pub async fn like_post(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<i64>> {
    Ok(Json(state.posts.increment_likes(id).await?))
}
