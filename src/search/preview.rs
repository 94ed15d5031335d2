/// Marker appended to truncated previews / 截断标记
pub const ELLIPSIS: char = '…';

/// Cut text longer than `max_chars` characters and append `…` / 截断预览文本
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + ELLIPSIS.len_utf8());
            out.push_str(&text[..cut]);
            out.push(ELLIPSIS);
            out
        }
        None => text.to_string(),
    }
}
