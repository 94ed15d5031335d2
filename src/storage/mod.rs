//! Store contracts for posts, comments and images / 存储接口
//!
//! Stores expose primitive operations only; paging and validation live in the
//! services. Counter operations must be a single atomic read-modify-write in
//! the store.

use async_trait::async_trait;
use anyhow::Result;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::models::{Comment, Post};
use crate::search::{PostFilter, PostPage};

/// Where post filtering and paging are executed / 过滤与分页的执行位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    /// The database evaluates the filter and returns only the page / 数据库执行过滤
    #[default]
    Pushdown,
    /// Load every post and filter in memory / 全量加载后在内存中过滤
    Scan,
}

/// Post store interface / 文章存储接口
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Strategy used by `find_filtered` / `count_filtered` / 当前过滤策略
    fn strategy(&self) -> SearchStrategy;

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Insert when `post.id` is `None`, otherwise update title, text and tags.
    /// Counters and image path are never written by an update. / 保存文章（更新时不写计数与图片）
    async fn save(&self, post: Post) -> Result<Post>;

    async fn exists_by_id(&self, id: i64) -> Result<bool>;

    /// Returns whether a row was removed / 返回是否删除了记录
    async fn delete_by_id(&self, id: i64) -> Result<bool>;

    /// Matching posts, newest first, `offset..offset+limit` / 分页查询匹配文章
    async fn find_filtered(&self, filter: &PostFilter, offset: usize, limit: usize) -> Result<Vec<Post>>;

    async fn count_filtered(&self, filter: &PostFilter) -> Result<usize>;

    /// Total matches and the clamped page, read once / 一次读取得到总数与当前页
    async fn find_page(&self, filter: &PostFilter, page_number: usize, page_size: usize) -> Result<PostPage>;

    /// Atomic +1, `None` if the post does not exist / 原子自增点赞数
    async fn increment_likes_and_get(&self, id: i64) -> Result<Option<i64>>;

    async fn increment_comments_count(&self, id: i64) -> Result<()>;

    /// Floors at zero / 不会小于0
    async fn decrement_comments_count(&self, id: i64) -> Result<()>;

    async fn update_image_path(&self, id: i64, image_path: &str) -> Result<bool>;
}

/// Comment store interface / 评论存储接口
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Oldest first / 按创建时间正序
    async fn find_by_post_id(&self, post_id: i64) -> Result<Vec<Comment>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Insert when `comment.id` is `None`, otherwise update the text / 保存评论
    async fn save(&self, comment: Comment) -> Result<Comment>;

    async fn delete_by_id(&self, id: i64) -> Result<bool>;

    /// Remove every comment of a post, returns the count / 删除文章下所有评论
    async fn delete_by_post_id(&self, post_id: i64) -> Result<u64>;
}

/// Image blob store interface / 图片存储接口
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store image bytes and return an opaque reference / 写入图片并返回引用
    async fn write(&self, post_id: i64, data: Bytes, extension: &str) -> Result<String>;

    /// `None` when the reference is unknown / 引用不存在时返回None
    async fn read(&self, reference: &str) -> Result<Option<Bytes>>;
}

pub mod images;
pub mod memory;
pub mod sqlite;

pub use images::LocalImageStore;
pub use memory::{MemoryCommentStore, MemoryPostStore};
pub use sqlite::{SqliteCommentStore, SqlitePostStore};
