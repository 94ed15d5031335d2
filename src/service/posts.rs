use bytes::Bytes;
use std::sync::Arc;

use super::CounterMaintainer;
use crate::error::{BlogError, Result};
use crate::models::{normalize_tags, now, CreatePostRequest, Post, PostDto, PostsResponse, UpdatePostRequest};
use crate::search::{parse_query, truncate_preview, PostPage};
use crate::storage::{CommentStore, ImageStore, PostStore};

/// Listing settings passed in at construction / 列表配置
#[derive(Debug, Clone, Copy)]
pub struct ListingSettings {
    pub preview_length: usize,
    pub default_page_size: usize,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            preview_length: 128,
            default_page_size: 10,
        }
    }
}

/// Post operations / 文章服务
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostStore>,
    comments: Arc<dyn CommentStore>,
    images: Arc<dyn ImageStore>,
    counters: CounterMaintainer,
    settings: ListingSettings,
}

fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(BlogError::invalid("title must not be empty"));
    }
    Ok(())
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostStore>,
        comments: Arc<dyn CommentStore>,
        images: Arc<dyn ImageStore>,
        settings: ListingSettings,
    ) -> Self {
        Self {
            counters: CounterMaintainer::new(posts.clone()),
            posts,
            comments,
            images,
            settings,
        }
    }

    /// Full post, body not truncated / 获取完整文章
    pub async fn get_post_by_id(&self, id: i64) -> Result<PostDto> {
        self.posts
            .find_by_id(id)
            .await?
            .map(PostDto::from)
            .ok_or(BlogError::NotFound("post"))
    }

    pub async fn create_post(&self, req: CreatePostRequest) -> Result<PostDto> {
        require_title(&req.title)?;
        let saved = self.posts.save(Post::new(&req.title, &req.text, &req.tags)).await?;
        tracing::info!("Post created: id={:?}", saved.id);
        Ok(saved.into())
    }

    pub async fn update_post(&self, id: i64, req: UpdatePostRequest) -> Result<PostDto> {
        require_title(&req.title)?;
        let mut post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or(BlogError::NotFound("post"))?;

        post.title = req.title;
        post.text = req.text;
        if let Some(tags) = req.tags {
            post.tags = normalize_tags(&tags);
        }
        post.updated_at = now();

        let saved = self.posts.save(post).await?;
        tracing::info!("Post updated: id={}", id);
        Ok(saved.into())
    }

    /// Deletes the post together with its comments / 删除文章及其评论
    ///
    /// The post goes first, so a comment that slipped in before the post row
    /// disappeared is still caught by the comment sweep.
    pub async fn delete_post(&self, id: i64) -> Result<()> {
        if !self.posts.delete_by_id(id).await? {
            return Err(BlogError::NotFound("post"));
        }
        let removed = self.comments.delete_by_post_id(id).await?;
        tracing::info!("Post deleted: id={} (comments removed: {})", id, removed);
        Ok(())
    }

    pub async fn increment_likes(&self, id: i64) -> Result<i64> {
        self.counters.increment_likes(id).await
    }

    /// Search and page posts / 搜索并分页
    ///
    /// `page_size` of `None` uses the configured default; both values are
    /// raised to at least 1, and pages past the end serve the last page.
    pub async fn get_all_posts(&self, search: &str, page_number: usize, page_size: Option<usize>) -> Result<PostsResponse> {
        let filter = parse_query(search);
        let page_size = page_size.unwrap_or(self.settings.default_page_size);

        let PostPage { total, window, posts } = self
            .posts
            .find_page(&filter, page_number, page_size)
            .await?;

        tracing::debug!(
            "Post search: filter={:?} total={} page={}/{} strategy={:?}",
            filter, total, window.page_number, window.last_page, self.posts.strategy()
        );

        let posts = posts
            .into_iter()
            .map(|post| {
                let mut dto = PostDto::from(post);
                dto.text = truncate_preview(&dto.text, self.settings.preview_length);
                dto
            })
            .collect();

        Ok(PostsResponse {
            posts,
            has_prev: window.has_prev,
            has_next: window.has_next,
            last_page: window.last_page,
        })
    }

    /// Store an uploaded image and attach it to the post / 上传文章图片
    pub async fn upload_image(&self, id: i64, data: Bytes, extension: &str) -> Result<String> {
        if data.is_empty() {
            return Err(BlogError::invalid("image is empty"));
        }
        if !self.posts.exists_by_id(id).await? {
            return Err(BlogError::NotFound("post"));
        }

        let reference = self.images.write(id, data, extension).await?;
        if !self.posts.update_image_path(id, &reference).await? {
            return Err(BlogError::NotFound("post"));
        }
        tracing::info!("Image attached to post {}: {}", id, reference);
        Ok(reference)
    }

    /// Image bytes and their reference / 获取文章图片
    pub async fn get_image(&self, id: i64) -> Result<(Bytes, String)> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or(BlogError::NotFound("post"))?;
        let reference = post.image_path.ok_or(BlogError::NotFound("image"))?;
        let data = self
            .images
            .read(&reference)
            .await?
            .ok_or(BlogError::NotFound("image"))?;
        Ok((data, reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Comment;
    use crate::search::PostFilter;
    use crate::storage::{LocalImageStore, MemoryCommentStore, MemoryPostStore, SearchStrategy};

    fn service(dir: &std::path::Path) -> (PostService, Arc<MemoryCommentStore>) {
        let comments = Arc::new(MemoryCommentStore::new());
        let service = PostService::new(
            Arc::new(MemoryPostStore::new()),
            comments.clone(),
            Arc::new(LocalImageStore::new(dir)),
            ListingSettings::default(),
        );
        (service, comments)
    }

    fn create(title: &str, text: &str, tags: &[&str]) -> CreatePostRequest {
        CreatePostRequest {
            title: title.to_string(),
            text: text.to_string(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_list_truncates_but_single_get_does_not() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = service(dir.path());
        let body = "b".repeat(150);
        let created = service.create_post(create("Long", &body, &[])).await.unwrap();

        let page = service.get_all_posts("", 1, None).await.unwrap();
        assert_eq!(page.posts[0].text.chars().count(), 129);
        assert!(page.posts[0].text.ends_with('…'));

        let full = service.get_post_by_id(created.id).await.unwrap();
        assert_eq!(full.text, body);
    }

    #[tokio::test]
    async fn test_empty_title_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = service(dir.path());
        let err = service.create_post(create("  ", "x", &[])).await.unwrap_err();
        assert!(matches!(err, BlogError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_update_keeps_tags_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = service(dir.path());
        let created = service.create_post(create("T", "x", &["Rust"])).await.unwrap();

        let updated = service
            .update_post(created.id, UpdatePostRequest { title: "T2".into(), text: "y".into(), tags: None })
            .await
            .unwrap();
        assert_eq!(updated.title, "T2");
        assert_eq!(updated.tags, vec!["rust".to_string()]);

        let missing = service
            .update_post(99, UpdatePostRequest { title: "T".into(), text: "".into(), tags: None })
            .await;
        assert!(matches!(missing, Err(BlogError::NotFound("post"))));
    }

    #[tokio::test]
    async fn test_delete_cascades_comments() {
        let dir = tempfile::tempdir().unwrap();
        let (service, comments) = service(dir.path());
        let created = service.create_post(create("T", "x", &[])).await.unwrap();
        comments.save(Comment::new("c", created.id)).await.unwrap();

        service.delete_post(created.id).await.unwrap();
        assert!(comments.find_by_post_id(created.id).await.unwrap().is_empty());
        assert!(matches!(service.delete_post(created.id).await, Err(BlogError::NotFound(_))));
    }

    /// Adds a comment to the post right before removing it, like a request racing the delete
    struct RacingDelete {
        inner: MemoryPostStore,
        comments: Arc<MemoryCommentStore>,
    }

    #[async_trait::async_trait]
    impl PostStore for RacingDelete {
        fn strategy(&self) -> SearchStrategy {
            self.inner.strategy()
        }
        async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Post>> {
            self.inner.find_by_id(id).await
        }
        async fn save(&self, post: Post) -> anyhow::Result<Post> {
            self.inner.save(post).await
        }
        async fn exists_by_id(&self, id: i64) -> anyhow::Result<bool> {
            self.inner.exists_by_id(id).await
        }
        async fn delete_by_id(&self, id: i64) -> anyhow::Result<bool> {
            self.comments.save(Comment::new("late", id)).await?;
            self.inner.delete_by_id(id).await
        }
        async fn find_filtered(&self, filter: &PostFilter, offset: usize, limit: usize) -> anyhow::Result<Vec<Post>> {
            self.inner.find_filtered(filter, offset, limit).await
        }
        async fn count_filtered(&self, filter: &PostFilter) -> anyhow::Result<usize> {
            self.inner.count_filtered(filter).await
        }
        async fn find_page(&self, filter: &PostFilter, page_number: usize, page_size: usize) -> anyhow::Result<PostPage> {
            self.inner.find_page(filter, page_number, page_size).await
        }
        async fn increment_likes_and_get(&self, id: i64) -> anyhow::Result<Option<i64>> {
            self.inner.increment_likes_and_get(id).await
        }
        async fn increment_comments_count(&self, id: i64) -> anyhow::Result<()> {
            self.inner.increment_comments_count(id).await
        }
        async fn decrement_comments_count(&self, id: i64) -> anyhow::Result<()> {
            self.inner.decrement_comments_count(id).await
        }
        async fn update_image_path(&self, id: i64, image_path: &str) -> anyhow::Result<bool> {
            self.inner.update_image_path(id, image_path).await
        }
    }

    #[tokio::test]
    async fn test_delete_leaves_no_comment_added_during_delete() {
        let dir = tempfile::tempdir().unwrap();
        let comments = Arc::new(MemoryCommentStore::new());
        let service = PostService::new(
            Arc::new(RacingDelete { inner: MemoryPostStore::new(), comments: comments.clone() }),
            comments.clone(),
            Arc::new(LocalImageStore::new(dir.path())),
            ListingSettings::default(),
        );
        let created = service.create_post(create("T", "x", &[])).await.unwrap();

        service.delete_post(created.id).await.unwrap();
        assert!(comments.find_by_post_id(created.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_image_upload_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _) = service(dir.path());
        let created = service.create_post(create("T", "x", &[])).await.unwrap();

        let empty = service.upload_image(created.id, Bytes::new(), "png").await;
        assert!(matches!(empty, Err(BlogError::InvalidInput(_))));
        assert!(matches!(service.get_image(created.id).await, Err(BlogError::NotFound("image"))));

        let reference = service
            .upload_image(created.id, Bytes::from_static(b"\x89PNG"), "png")
            .await
            .unwrap();
        let (data, stored) = service.get_image(created.id).await.unwrap();
        assert_eq!(&data[..], b"\x89PNG");
        assert_eq!(stored, reference);
        assert_eq!(service.get_post_by_id(created.id).await.unwrap().image_path, Some(reference));
    }
}
