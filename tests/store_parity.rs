//! Both search strategies and the in-memory store must page identically.
//! 两种搜索策略与内存存储的结果必须一致

use chrono::{Duration, TimeZone, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

use blog_backend::db::run_migrations;
use blog_backend::models::Post;
use blog_backend::search::{parse_query, PageWindow};
use blog_backend::storage::{MemoryPostStore, PostStore, SearchStrategy, SqlitePostStore};

async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect sqlite");
    run_migrations(&pool).await.expect("migrations");
    pool
}

/// (title, tags, minutes after base)
const FIXTURE: &[(&str, &[&str], i64)] = &[
    ("Rust ownership", &["rust", "lang"], 1),
    ("Async Rust in practice", &["Rust", "async"], 2),
    ("Cooking pasta", &["food"], 3),
    ("rusty bikes", &["bikes"], 3),
    ("ÄRGER with Unicode", &["Unicode"], 5),
    ("50% off: 100_percent_rust", &["sale"], 6),
    ("Weekly notes", &[], 7),
];

async fn seed(store: &dyn PostStore) {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    for (title, tags, minutes) in FIXTURE {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        let mut post = Post::new(title, "body", &tags);
        post.created_at = base + Duration::minutes(*minutes);
        post.updated_at = post.created_at;
        store.save(post).await.expect("save");
    }
}

async fn stores() -> Vec<(&'static str, Arc<dyn PostStore>)> {
    let pushdown: Arc<dyn PostStore> =
        Arc::new(SqlitePostStore::new(memory_pool().await, SearchStrategy::Pushdown));
    let scan: Arc<dyn PostStore> =
        Arc::new(SqlitePostStore::new(memory_pool().await, SearchStrategy::Scan));
    let memory: Arc<dyn PostStore> = Arc::new(MemoryPostStore::new());

    let all = vec![("pushdown", pushdown), ("scan", scan), ("memory", memory)];
    for (_, store) in &all {
        seed(store.as_ref()).await;
    }
    all
}

async fn page_ids(store: &dyn PostStore, query: &str, page: usize, size: usize) -> (usize, Vec<i64>) {
    let filter = parse_query(query);
    let total = store.count_filtered(&filter).await.unwrap();
    let window = PageWindow::compute(total, page, size);
    let posts = if window.is_empty(total) {
        Vec::new()
    } else {
        store.find_filtered(&filter, window.offset, window.page_size).await.unwrap()
    };
    (total, posts.into_iter().filter_map(|p| p.id).collect())
}

async fn window_ids(store: &dyn PostStore, query: &str, page: usize, size: usize) -> (usize, Vec<i64>) {
    let page = store.find_page(&parse_query(query), page, size).await.unwrap();
    (page.total, page.posts.into_iter().filter_map(|p| p.id).collect())
}

#[tokio::test]
async fn test_strategies_agree_on_every_query() {
    let stores = stores().await;
    let queries = [
        "",
        "rust",
        "RUST",
        "#rust",
        "#RUST #async",
        "rust #lang",
        "#missing",
        "är",
        "%",
        "_percent_",
        "#",
        "in practice",
    ];

    for query in queries {
        for (page, size) in [(1, 2), (2, 2), (3, 2), (9, 2), (1, 10)] {
            let expected = page_ids(stores[0].1.as_ref(), query, page, size).await;
            for (name, store) in &stores {
                let actual = page_ids(store.as_ref(), query, page, size).await;
                assert_eq!(actual, expected, "{} differs for query {:?} page {} size {}", name, query, page, size);
                let window = window_ids(store.as_ref(), query, page, size).await;
                assert_eq!(window, expected, "{} find_page differs for query {:?} page {} size {}", name, query, page, size);
            }
        }
    }
}

#[tokio::test]
async fn test_newest_first_with_id_tiebreak() {
    for (name, store) in stores().await {
        let (total, ids) = page_ids(store.as_ref(), "", 1, 10).await;
        assert_eq!(total, 7, "{}", name);
        // ids 3 and 4 share a timestamp
        assert_eq!(ids, vec![7, 6, 5, 3, 4, 2, 1], "{}", name);
    }
}

#[tokio::test]
async fn test_filters_select_expected_posts() {
    for (name, store) in stores().await {
        assert_eq!(page_ids(store.as_ref(), "rust", 1, 10).await.1, vec![6, 4, 2, 1], "{}", name);
        assert_eq!(page_ids(store.as_ref(), "#rust", 1, 10).await.1, vec![2, 1], "{}", name);
        assert_eq!(page_ids(store.as_ref(), "#rust #async", 1, 10).await.1, vec![2], "{}", name);
        assert_eq!(page_ids(store.as_ref(), "är", 1, 10).await.1, vec![5], "{}", name);
        assert_eq!(page_ids(store.as_ref(), "%", 1, 10).await.1, vec![6], "{}", name);
        assert_eq!(page_ids(store.as_ref(), "#missing", 1, 10).await, (0, vec![]), "{}", name);
    }
}

#[tokio::test]
async fn test_page_past_end_serves_last_page() {
    for (name, store) in stores().await {
        let last = page_ids(store.as_ref(), "", 4, 2).await;
        let beyond = page_ids(store.as_ref(), "", 40, 2).await;
        assert_eq!(last.1, vec![1], "{}", name);
        assert_eq!(beyond, last, "{}", name);
    }
}

#[tokio::test]
async fn test_update_and_likes_keep_tags_and_counters() {
    for (name, store) in stores().await {
        assert_eq!(store.increment_likes_and_get(1).await.unwrap(), Some(1), "{}", name);
        store.increment_comments_count(1).await.unwrap();

        let mut post = store.find_by_id(1).await.unwrap().unwrap();
        post.title = "Borrowing".to_string();
        post.likes_count = 0;
        post.comments_count = 0;
        let saved = store.save(post).await.unwrap();

        assert_eq!(saved.likes_count, 1, "{}", name);
        assert_eq!(saved.comments_count, 1, "{}", name);
        assert_eq!(saved.tags, vec!["lang".to_string(), "rust".to_string()], "{}", name);
        assert_eq!(page_ids(store.as_ref(), "borrow", 1, 10).await.1, vec![1], "{}", name);

        assert_eq!(store.increment_likes_and_get(999).await.unwrap(), None, "{}", name);
        assert!(store.delete_by_id(1).await.unwrap(), "{}", name);
        assert!(!store.exists_by_id(1).await.unwrap(), "{}", name);
        assert_eq!(page_ids(store.as_ref(), "#lang", 1, 10).await.0, 0, "{}", name);
    }
}

#[tokio::test]
async fn test_update_from_stale_copy_keeps_uploaded_image() {
    for (name, store) in stores().await {
        let stale = store.find_by_id(1).await.unwrap().unwrap();
        assert!(store.update_image_path(1, "1_abc.png").await.unwrap(), "{}", name);

        let mut edited = stale;
        edited.title = "Ownership, revisited".to_string();
        let saved = store.save(edited).await.unwrap();

        assert_eq!(saved.image_path.as_deref(), Some("1_abc.png"), "{}", name);
        let reloaded = store.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(reloaded.image_path.as_deref(), Some("1_abc.png"), "{}", name);
        assert_eq!(reloaded.title, "Ownership, revisited", "{}", name);
    }
}
