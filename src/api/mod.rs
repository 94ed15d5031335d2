pub mod comments;
pub mod extract;
pub mod images;
pub mod posts;
pub mod server;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Upload limit for post images / 图片上传大小限制
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Build the HTTP router / 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(server::health_check))
        .route("/api/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/api/posts/:id",
            get(posts::get_post).put(posts::update_post).delete(posts::delete_post),
        )
        .route("/api/posts/:id/likes", post(posts::like_post))
        .route("/api/posts/:id/image", get(images::get_image).put(images::upload_image))
        .route(
            "/api/posts/:id/comments",
            get(comments::list_comments).post(comments::add_comment),
        )
        .route(
            "/api/posts/:id/comments/:comment_id",
            get(comments::get_comment)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
