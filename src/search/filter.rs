use std::collections::BTreeSet;

use crate::models::Post;

/// Structured post filter derived from a search query / 文章过滤条件
///
/// Both parts combine with AND. An empty filter matches every post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Lower-cased title substring / 小写标题子串
    pub title: Option<String>,
    /// Tags a post must all carry, lower-cased / 必须全部包含的标签
    pub tags: BTreeSet<String>,
}

impl PostFilter {
    pub fn new(title: Option<&str>, tags: &[&str]) -> Self {
        Self {
            title: title
                .map(|t| t.to_lowercase())
                .filter(|t| !t.trim().is_empty()),
            tags: tags.iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.tags.is_empty()
    }

    /// Evaluate the filter against one post / 判断文章是否匹配
    pub fn matches(&self, post: &Post) -> bool {
        let tags_ok = self.tags.iter().all(|required| {
            post.tags.iter().any(|t| t.to_lowercase() == *required)
        });
        if !tags_ok {
            return false;
        }

        match &self.title {
            Some(needle) => post.title.to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }
}
