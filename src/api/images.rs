use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::extract::ApiPath;
use crate::error::{BlogError, Result};
use crate::state::AppState;

/// Multipart field carrying the image / 图片字段名
const IMAGE_FIELD: &str = "image";

/// PUT /api/posts/:id/image - 上传文章图片
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| BlogError::invalid(format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let extension = field
            .file_name()
            .and_then(|name| std::path::Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .unwrap_or("bin")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| BlogError::invalid(format!("failed to read image: {}", e)))?;

        let reference = state.posts.upload_image(id, data, &extension).await?;
        return Ok(Json(json!({ "imagePath": reference })));
    }

    Err(BlogError::invalid("image is required"))
}

/// GET /api/posts/:id/image - 获取文章图片
pub async fn get_image(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Response> {
    let (data, reference) = state.posts.get_image(id).await?;
    let mime = mime_guess::from_path(&reference).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, mime.as_ref().to_string())], data).into_response())
}
