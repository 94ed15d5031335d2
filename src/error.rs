//! Service error kinds / 服务错误类型
//!
//! Stores report failures through `anyhow`; the service layer narrows them
//! into the three kinds the HTTP boundary understands.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, BlogError>;

#[derive(Debug, thiserror::Error)]
pub enum BlogError {
    /// Missing post/comment, or a comment addressed through the wrong post / 资源不存在
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Bad request data (empty upload, malformed page parameters) / 请求参数错误
    #[error("{0}")]
    InvalidInput(String),

    /// Persistence failure, never retried / 存储失败
    #[error("store failure: {0}")]
    Store(#[from] anyhow::Error),
}

impl BlogError {
    pub fn invalid(message: impl Into<String>) -> Self {
        BlogError::InvalidInput(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            BlogError::NotFound(_) => StatusCode::NOT_FOUND,
            BlogError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            BlogError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BlogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            BlogError::Store(e) => {
                tracing::error!("Store failure: {:#}", e);
                "服务器错误".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
