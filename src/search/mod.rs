//! Post search module - query parsing, filtering, paging and previews / 文章搜索模块
//!
//! Flow / 流程：
//! raw query → tokenizer → `PostFilter` → store (pushdown or scan) → `PageWindow` → preview
//!
//! This module holds only pure logic; stores decide whether filtering runs in
//! SQL or in memory (see `storage::SearchStrategy`).

pub mod filter;
pub mod pagination;
pub mod preview;
pub mod scan;
pub mod tokenizer;

pub use filter::PostFilter;
pub use pagination::{PageWindow, PostPage};
pub use preview::truncate_preview;
pub use tokenizer::parse_query;
