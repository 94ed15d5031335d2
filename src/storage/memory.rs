//! In-memory stores / 内存存储
//!
//! Always use the scan strategy: every query copies the whole collection and
//! filters it with `search::scan`. Counter updates happen under one write lock.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::{CommentStore, PostStore, SearchStrategy};
use crate::models::{normalize_tags, now, Comment, Post};
use crate::search::{scan, PostFilter, PostPage};

struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { rows: BTreeMap::new(), next_id: 1 }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// In-memory post store / 内存文章存储
#[derive(Default)]
pub struct MemoryPostStore {
    table: RwLock<Table<Post>>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot in insertion (id) order / 按id顺序的快照
    fn snapshot(&self) -> Vec<Post> {
        self.table.read().rows.values().cloned().collect()
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    fn strategy(&self) -> SearchStrategy {
        SearchStrategy::Scan
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>> {
        Ok(self.table.read().rows.get(&id).cloned())
    }

    async fn save(&self, mut post: Post) -> Result<Post> {
        post.tags = normalize_tags(&post.tags);
        let mut table = self.table.write();
        match post.id {
            None => {
                let id = table.allocate_id();
                post.id = Some(id);
                post.likes_count = post.likes_count.max(0);
                post.comments_count = post.comments_count.max(0);
                table.rows.insert(id, post.clone());
                Ok(post)
            }
            Some(id) => {
                let stored = table
                    .rows
                    .get_mut(&id)
                    .ok_or_else(|| anyhow!("post {} does not exist", id))?;
                stored.title = post.title;
                stored.text = post.text;
                stored.updated_at = post.updated_at;
                stored.tags = post.tags;
                Ok(stored.clone())
            }
        }
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool> {
        Ok(self.table.read().rows.contains_key(&id))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        Ok(self.table.write().rows.remove(&id).is_some())
    }

    async fn find_filtered(&self, filter: &PostFilter, offset: usize, limit: usize) -> Result<Vec<Post>> {
        Ok(scan::scan_page(self.snapshot(), filter, offset, limit))
    }

    async fn count_filtered(&self, filter: &PostFilter) -> Result<usize> {
        Ok(scan::scan_count(&self.snapshot(), filter))
    }

    async fn find_page(&self, filter: &PostFilter, page_number: usize, page_size: usize) -> Result<PostPage> {
        Ok(scan::scan_window(self.snapshot(), filter, page_number, page_size))
    }

    async fn increment_likes_and_get(&self, id: i64) -> Result<Option<i64>> {
        let mut table = self.table.write();
        Ok(table.rows.get_mut(&id).map(|post| {
            post.likes_count += 1;
            post.updated_at = now();
            post.likes_count
        }))
    }

    async fn increment_comments_count(&self, id: i64) -> Result<()> {
        if let Some(post) = self.table.write().rows.get_mut(&id) {
            post.comments_count += 1;
        }
        Ok(())
    }

    async fn decrement_comments_count(&self, id: i64) -> Result<()> {
        if let Some(post) = self.table.write().rows.get_mut(&id) {
            post.comments_count = (post.comments_count - 1).max(0);
        }
        Ok(())
    }

    async fn update_image_path(&self, id: i64, image_path: &str) -> Result<bool> {
        let mut table = self.table.write();
        match table.rows.get_mut(&id) {
            Some(post) => {
                post.image_path = Some(image_path.to_string());
                post.updated_at = now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory comment store / 内存评论存储
#[derive(Default)]
pub struct MemoryCommentStore {
    table: RwLock<Table<Comment>>,
}

impl MemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn find_by_post_id(&self, post_id: i64) -> Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .table
            .read()
            .rows
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>> {
        Ok(self.table.read().rows.get(&id).cloned())
    }

    async fn save(&self, mut comment: Comment) -> Result<Comment> {
        let mut table = self.table.write();
        match comment.id {
            None => {
                let id = table.allocate_id();
                comment.id = Some(id);
                table.rows.insert(id, comment.clone());
                Ok(comment)
            }
            Some(id) => {
                let stored = table
                    .rows
                    .get_mut(&id)
                    .ok_or_else(|| anyhow!("comment {} does not exist", id))?;
                stored.text = comment.text;
                stored.updated_at = comment.updated_at;
                Ok(stored.clone())
            }
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        Ok(self.table.write().rows.remove(&id).is_some())
    }

    async fn delete_by_post_id(&self, post_id: i64) -> Result<u64> {
        let mut table = self.table.write();
        let before = table.rows.len();
        table.rows.retain(|_, c| c.post_id != post_id);
        Ok((before - table.rows.len()) as u64)
    }
}
