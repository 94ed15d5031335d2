use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::service::{CommentService, ListingSettings, PostService};
use crate::storage::{ImageStore, LocalImageStore, SqliteCommentStore, SqlitePostStore};

pub struct AppState {
    pub db: SqlitePool,
    pub posts: PostService,
    pub comments: CommentService,
}

impl AppState {
    /// Wire the SQLite stores and services from configuration / 根据配置组装服务
    pub fn from_config(db: SqlitePool, config: &AppConfig) -> Self {
        let images: Arc<dyn ImageStore> = Arc::new(LocalImageStore::new(config.get_images_dir()));
        let settings = ListingSettings {
            preview_length: config.blog.preview_length,
            default_page_size: config.blog.default_page_size.max(1),
        };
        Self::with_images(db, config.blog.search_strategy, images, settings)
    }

    pub fn with_images(
        db: SqlitePool,
        strategy: crate::storage::SearchStrategy,
        images: Arc<dyn ImageStore>,
        settings: ListingSettings,
    ) -> Self {
        let post_store = Arc::new(SqlitePostStore::new(db.clone(), strategy));
        let comment_store = Arc::new(SqliteCommentStore::new(db.clone()));

        Self {
            posts: PostService::new(post_store.clone(), comment_store.clone(), images, settings),
            comments: CommentService::new(comment_store, post_store),
            db,
        }
    }
}
