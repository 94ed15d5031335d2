//! In-memory filtering and paging for stores that hand over the whole collection
//! 全量扫描：在内存中过滤与分页

use std::cmp::Ordering;

use super::filter::PostFilter;
use super::pagination::{PageWindow, PostPage};
use crate::models::Post;

/// Newest first; equal timestamps keep insertion (id) order / 按创建时间倒序
pub fn newest_first(a: &Post, b: &Post) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort, filter and return the `offset..offset+limit` slice / 排序、过滤并截取分页
pub fn scan_page(mut posts: Vec<Post>, filter: &PostFilter, offset: usize, limit: usize) -> Vec<Post> {
    posts.sort_by(newest_first);
    posts
        .into_iter()
        .filter(|p| filter.matches(p))
        .skip(offset)
        .take(limit)
        .collect()
}

/// Count posts matching the filter / 统计匹配数量
pub fn scan_count(posts: &[Post], filter: &PostFilter) -> usize {
    if filter.is_empty() {
        return posts.len();
    }
    posts.iter().filter(|p| filter.matches(p)).count()
}

/// Filter once, then compute the window and slice it / 一次扫描得到总数与分页
pub fn scan_window(mut posts: Vec<Post>, filter: &PostFilter, page_number: usize, page_size: usize) -> PostPage {
    posts.retain(|p| filter.matches(p));
    posts.sort_by(newest_first);

    let total = posts.len();
    let window = PageWindow::compute(total, page_number, page_size);
    let posts = posts
        .into_iter()
        .skip(window.offset)
        .take(window.len(total))
        .collect();

    PostPage { total, window, posts }
}
