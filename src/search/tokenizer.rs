//! Search query tokenizer / 搜索查询分词器
//!
//! Query syntax / 查询语法：
//! - Tokens are separated by whitespace / 以空白分隔
//! - `#tag` (longer than one char) requires that tag / `#标签` 表示必须包含该标签
//! - Every other token is part of the title substring / 其余词拼接为标题子串

use std::collections::BTreeSet;

use super::filter::PostFilter;

/// Query token / 查询词
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Tag without the leading `#`, lower-cased / 标签（已去掉#并转小写）
    Tag(String),
    /// Title word in its original case / 标题词（保留原大小写）
    Title(&'a str),
}

/// Split a raw query into tokens / 对查询进行分词
pub fn tokenize(query: &str) -> Vec<Token<'_>> {
    query
        .split_whitespace()
        .map(|word| match word.strip_prefix('#') {
            Some(tag) if !tag.is_empty() => Token::Tag(tag.to_lowercase()),
            _ => Token::Title(word),
        })
        .collect()
}

/// Build the post filter for a raw query / 根据查询构造过滤条件
pub fn parse_query(query: &str) -> PostFilter {
    let mut tags = BTreeSet::new();
    let mut words: Vec<&str> = Vec::new();

    for token in tokenize(query) {
        match token {
            Token::Tag(tag) => {
                tags.insert(tag);
            }
            Token::Title(word) => words.push(word),
        }
    }

    let title = if words.is_empty() {
        None
    } else {
        Some(words.join(" ").to_lowercase())
    };

    PostFilter { title, tags }
}
