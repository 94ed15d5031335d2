use std::sync::Arc;

use super::CounterMaintainer;
use crate::error::{BlogError, Result};
use crate::models::{now, Comment, CommentDto, CommentRequest};
use crate::storage::{CommentStore, PostStore};

/// Comment operations / 评论服务
///
/// A comment is only reachable through its own post; a mismatched post id
/// reports "not found" like a missing comment.
#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentStore>,
    posts: Arc<dyn PostStore>,
    counters: CounterMaintainer,
}

fn require_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(BlogError::invalid("text must not be empty"));
    }
    Ok(())
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentStore>, posts: Arc<dyn PostStore>) -> Self {
        Self {
            counters: CounterMaintainer::new(posts.clone()),
            comments,
            posts,
        }
    }

    /// Load a comment owned by `post_id` / 按所属文章加载评论
    async fn find_owned(&self, post_id: i64, comment_id: i64) -> Result<Comment> {
        self.comments
            .find_by_id(comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or(BlogError::NotFound("comment"))
    }

    pub async fn get_comments_by_post_id(&self, post_id: i64) -> Result<Vec<CommentDto>> {
        if !self.posts.exists_by_id(post_id).await? {
            return Err(BlogError::NotFound("post"));
        }
        let comments = self.comments.find_by_post_id(post_id).await?;
        Ok(comments.into_iter().map(CommentDto::from).collect())
    }

    pub async fn get_comment_by_id(&self, post_id: i64, comment_id: i64) -> Result<CommentDto> {
        self.find_owned(post_id, comment_id).await.map(CommentDto::from)
    }

    pub async fn add_comment_to_post(&self, post_id: i64, req: CommentRequest) -> Result<CommentDto> {
        require_text(&req.text)?;
        if !self.posts.exists_by_id(post_id).await? {
            return Err(BlogError::NotFound("post"));
        }

        let saved = self.comments.save(Comment::new(&req.text, post_id)).await?;
        self.counters.increment_comments_count(post_id).await?;

        tracing::info!("Comment added: id={:?} post={}", saved.id, post_id);
        Ok(saved.into())
    }

    pub async fn update_comment(&self, post_id: i64, comment_id: i64, req: CommentRequest) -> Result<CommentDto> {
        require_text(&req.text)?;
        let mut comment = self.find_owned(post_id, comment_id).await?;
        comment.text = req.text;
        comment.updated_at = now();

        let saved = self.comments.save(comment).await?;
        tracing::info!("Comment updated: id={} post={}", comment_id, post_id);
        Ok(saved.into())
    }

    pub async fn delete_comment(&self, post_id: i64, comment_id: i64) -> Result<()> {
        self.find_owned(post_id, comment_id).await?;

        // Only the request that actually removed the row decrements
        if self.comments.delete_by_id(comment_id).await? {
            self.counters.decrement_comments_count(post_id).await?;
            tracing::info!("Comment deleted: id={} post={}", comment_id, post_id);
            Ok(())
        } else {
            Err(BlogError::NotFound("comment"))
        }
    }
}
