//! Blog services - validation, ownership checks and paging on top of the stores
//! 博客服务层

pub mod comments;
pub mod counters;
pub mod posts;

pub use comments::CommentService;
pub use counters::CounterMaintainer;
pub use posts::{ListingSettings, PostService};
