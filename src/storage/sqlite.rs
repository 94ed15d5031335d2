//! SQLite stores / SQLite 存储
//!
//! Tables (see `db::run_migrations`):
//! - posts: one row per post, `title_lower` kept for substring search
//! - post_tags: (post_id, tag), tags already lower-cased
//! - comments: one row per comment
//!
//! Timestamps are fixed-width RFC 3339 text, so `ORDER BY created_at` is time order.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool, Transaction};

use super::{CommentStore, PostStore, SearchStrategy};
use crate::models::{normalize_tags, now, Comment, Post};
use crate::search::{scan, PageWindow, PostFilter, PostPage};

const POST_COLUMNS: &str = "p.id, p.title, p.text, p.created_at, p.updated_at, \
    p.likes_count, p.comments_count, p.image_path, \
    (SELECT json_group_array(t.tag) FROM post_tags t WHERE t.post_id = p.id) AS tags";

pub(crate) fn encode_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_time(text: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(text)?.with_timezone(&Utc))
}

fn post_from_row(row: &SqliteRow) -> Result<Post> {
    let tags_json: Option<String> = row.try_get("tags")?;
    let tags: Vec<String> = match tags_json {
        Some(json) => serde_json::from_str(&json)?,
        None => Vec::new(),
    };
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Post {
        id: Some(row.try_get("id")?),
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        created_at: decode_time(&created_at)?,
        updated_at: decode_time(&updated_at)?,
        likes_count: row.try_get("likes_count")?,
        comments_count: row.try_get("comments_count")?,
        image_path: row.try_get("image_path")?,
        tags: normalize_tags(&tags),
    })
}

fn comment_from_row(row: &SqliteRow) -> Result<Comment> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    Ok(Comment {
        id: Some(row.try_get("id")?),
        text: row.try_get("text")?,
        post_id: row.try_get("post_id")?,
        created_at: decode_time(&created_at)?,
        updated_at: decode_time(&updated_at)?,
    })
}

/// Append the WHERE conditions of a filter / 追加过滤条件
fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &PostFilter) {
    qb.push(" WHERE 1=1");
    if let Some(ref title) = filter.title {
        // instr: plain substring, no LIKE wildcards
        qb.push(" AND instr(p.title_lower, ");
        qb.push_bind(title.clone());
        qb.push(") > 0");
    }
    for tag in &filter.tags {
        qb.push(" AND EXISTS (SELECT 1 FROM post_tags t WHERE t.post_id = p.id AND t.tag = ");
        qb.push_bind(tag.clone());
        qb.push(")");
    }
}

fn to_sql_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// SQLite post store / SQLite 文章存储
#[derive(Clone)]
pub struct SqlitePostStore {
    db: SqlitePool,
    strategy: SearchStrategy,
}

impl SqlitePostStore {
    pub fn new(db: SqlitePool, strategy: SearchStrategy) -> Self {
        Self { db, strategy }
    }

    /// Every post in insertion order / 按插入顺序加载全部文章
    async fn load_all(&self) -> Result<Vec<Post>> {
        let sql = format!("SELECT {} FROM posts p ORDER BY p.id ASC", POST_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.db).await?;
        rows.iter().map(post_from_row).collect()
    }

    async fn replace_tags(tx: &mut Transaction<'_, Sqlite>, post_id: i64, tags: &[String]) -> Result<()> {
        sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut **tx)
            .await?;

        for tag in tags {
            sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag) VALUES (?, ?)")
                .bind(post_id)
                .bind(tag)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    async fn insert(&self, post: Post) -> Result<Post> {
        let tags = normalize_tags(&post.tags);
        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            "INSERT INTO posts (title, title_lower, text, created_at, updated_at, likes_count, comments_count, image_path) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&post.title)
        .bind(post.title.to_lowercase())
        .bind(&post.text)
        .bind(encode_time(&post.created_at))
        .bind(encode_time(&post.updated_at))
        .bind(post.likes_count.max(0))
        .bind(post.comments_count.max(0))
        .bind(&post.image_path)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
        Self::replace_tags(&mut tx, id, &tags).await?;
        tx.commit().await?;

        tracing::debug!("Post inserted: id={}", id);
        Ok(Post {
            id: Some(id),
            likes_count: post.likes_count.max(0),
            comments_count: post.comments_count.max(0),
            tags,
            ..post
        })
    }

    async fn update(&self, id: i64, post: Post) -> Result<Post> {
        let tags = normalize_tags(&post.tags);
        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            "UPDATE posts SET title = ?, title_lower = ?, text = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&post.title)
        .bind(post.title.to_lowercase())
        .bind(&post.text)
        .bind(encode_time(&post.updated_at))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("post {} does not exist", id));
        }

        Self::replace_tags(&mut tx, id, &tags).await?;
        tx.commit().await?;

        // Re-read so counters and image reflect concurrent writes / 重新读取最新计数与图片
        self.find_by_id(id)
            .await?
            .ok_or_else(|| anyhow!("post {} vanished during update", id))
    }
}

#[async_trait]
impl PostStore for SqlitePostStore {
    fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>> {
        let sql = format!("SELECT {} FROM posts p WHERE p.id = ?", POST_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        row.as_ref().map(post_from_row).transpose()
    }

    async fn save(&self, post: Post) -> Result<Post> {
        match post.id {
            None => self.insert(post).await,
            Some(id) => self.update(id, post).await,
        }
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(found.is_some())
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_filtered(&self, filter: &PostFilter, offset: usize, limit: usize) -> Result<Vec<Post>> {
        match self.strategy {
            SearchStrategy::Scan => {
                let posts = self.load_all().await?;
                Ok(scan::scan_page(posts, filter, offset, limit))
            }
            SearchStrategy::Pushdown => {
                let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM posts p", POST_COLUMNS));
                push_filter(&mut qb, filter);
                qb.push(" ORDER BY p.created_at DESC, p.id ASC LIMIT ");
                qb.push_bind(to_sql_int(limit));
                qb.push(" OFFSET ");
                qb.push_bind(to_sql_int(offset));

                let rows = qb.build().fetch_all(&self.db).await?;
                rows.iter().map(post_from_row).collect()
            }
        }
    }

    async fn count_filtered(&self, filter: &PostFilter) -> Result<usize> {
        match self.strategy {
            SearchStrategy::Scan => {
                let posts = self.load_all().await?;
                Ok(scan::scan_count(&posts, filter))
            }
            SearchStrategy::Pushdown => {
                let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM posts p");
                push_filter(&mut qb, filter);
                let count: i64 = qb.build_query_scalar().fetch_one(&self.db).await?;
                Ok(count.max(0) as usize)
            }
        }
    }

    async fn find_page(&self, filter: &PostFilter, page_number: usize, page_size: usize) -> Result<PostPage> {
        match self.strategy {
            SearchStrategy::Scan => {
                let posts = self.load_all().await?;
                Ok(scan::scan_window(posts, filter, page_number, page_size))
            }
            SearchStrategy::Pushdown => {
                let total = self.count_filtered(filter).await?;
                let window = PageWindow::compute(total, page_number, page_size);
                let posts = if window.is_empty(total) {
                    Vec::new()
                } else {
                    self.find_filtered(filter, window.offset, window.len(total)).await?
                };
                Ok(PostPage { total, window, posts })
            }
        }
    }

    async fn increment_likes_and_get(&self, id: i64) -> Result<Option<i64>> {
        let likes: Option<i64> = sqlx::query_scalar(
            "UPDATE posts SET likes_count = likes_count + 1, updated_at = ? WHERE id = ? RETURNING likes_count"
        )
        .bind(encode_time(&now()))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(likes)
    }

    async fn increment_comments_count(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE posts SET comments_count = comments_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn decrement_comments_count(&self, id: i64) -> Result<()> {
        sqlx::query(
            "UPDATE posts SET comments_count = CASE WHEN comments_count > 0 THEN comments_count - 1 ELSE 0 END WHERE id = ?"
        )
        .bind(id)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn update_image_path(&self, id: i64, image_path: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE posts SET image_path = ?, updated_at = ? WHERE id = ?")
            .bind(image_path)
            .bind(encode_time(&now()))
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// SQLite comment store / SQLite 评论存储
#[derive(Clone)]
pub struct SqliteCommentStore {
    db: SqlitePool,
}

impl SqliteCommentStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentStore for SqliteCommentStore {
    async fn find_by_post_id(&self, post_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT id, text, post_id, created_at, updated_at FROM comments WHERE post_id = ? ORDER BY created_at ASC, id ASC"
        )
        .bind(post_id)
        .fetch_all(&self.db)
        .await?;
        rows.iter().map(comment_from_row).collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query("SELECT id, text, post_id, created_at, updated_at FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        row.as_ref().map(comment_from_row).transpose()
    }

    async fn save(&self, comment: Comment) -> Result<Comment> {
        match comment.id {
            None => {
                let result = sqlx::query(
                    "INSERT INTO comments (text, post_id, created_at, updated_at) VALUES (?, ?, ?, ?)"
                )
                .bind(&comment.text)
                .bind(comment.post_id)
                .bind(encode_time(&comment.created_at))
                .bind(encode_time(&comment.updated_at))
                .execute(&self.db)
                .await?;
                Ok(Comment { id: Some(result.last_insert_rowid()), ..comment })
            }
            Some(id) => {
                let result = sqlx::query("UPDATE comments SET text = ?, updated_at = ? WHERE id = ?")
                    .bind(&comment.text)
                    .bind(encode_time(&comment.updated_at))
                    .bind(id)
                    .execute(&self.db)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err(anyhow!("comment {} does not exist", id));
                }
                Ok(comment)
            }
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_post_id(&self, post_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE post_id = ?")
            .bind(post_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}
