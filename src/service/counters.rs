use std::sync::Arc;

use crate::error::{BlogError, Result};
use crate::storage::PostStore;

/// Keeps like and comment counters of posts in step with events / 计数维护
///
/// Every change is one atomic store call; nothing is read and written back here.
#[derive(Clone)]
pub struct CounterMaintainer {
    posts: Arc<dyn PostStore>,
}

impl CounterMaintainer {
    pub fn new(posts: Arc<dyn PostStore>) -> Self {
        Self { posts }
    }

    /// +1 like, returns the new count / 点赞并返回新值
    pub async fn increment_likes(&self, post_id: i64) -> Result<i64> {
        self.posts
            .increment_likes_and_get(post_id)
            .await?
            .ok_or(BlogError::NotFound("post"))
    }

    pub async fn increment_comments_count(&self, post_id: i64) -> Result<()> {
        self.posts.increment_comments_count(post_id).await?;
        Ok(())
    }

    /// Never drops below zero / 不会小于0
    pub async fn decrement_comments_count(&self, post_id: i64) -> Result<()> {
        self.posts.decrement_comments_count(post_id).await?;
        Ok(())
    }
}
