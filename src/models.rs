use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Blog post entity / 文章实体
///
/// `id` is `None` until the store saves the post for the first time.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: Option<i64>,
    pub title: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub image_path: Option<String>,
    /// Lower-cased, de-duplicated, sorted / 小写、去重、排序
    pub tags: Vec<String>,
}

impl Post {
    pub fn new(title: &str, text: &str, tags: &[String]) -> Self {
        let now = now();
        Self {
            id: None,
            title: title.to_string(),
            text: text.to_string(),
            created_at: now,
            updated_at: now,
            likes_count: 0,
            comments_count: 0,
            image_path: None,
            tags: normalize_tags(tags),
        }
    }
}

/// Comment entity / 评论实体
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: Option<i64>,
    pub text: String,
    pub post_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(text: &str, post_id: i64) -> Self {
        let now = now();
        Self {
            id: None,
            text: text.to_string(),
            post_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Current time at the precision the database keeps (microseconds) / 当前时间（微秒精度）
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Trim, lower-case and de-duplicate tags, dropping empty ones / 规范化标签
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_path: Option<String>,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.unwrap_or_default(),
            title: post.title,
            text: post.text,
            tags: post.tags,
            likes_count: post.likes_count,
            comments_count: post.comments_count,
            image_path: post.image_path,
        }
    }
}

/// One page of post previews / 文章分页结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostsResponse {
    pub posts: Vec<PostDto>,
    pub has_prev: bool,
    pub has_next: bool,
    pub last_page: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: i64,
    pub text: String,
    pub post_id: i64,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.unwrap_or_default(),
            text: comment.text,
            post_id: comment.post_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: String,
    #[serde(default)]
    pub text: String,
    /// `None` keeps the current tags / 为空时保留原标签
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}
