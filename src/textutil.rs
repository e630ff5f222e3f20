//! UTF-8-safe truncation helpers for tool output and previews.

/// Cut `text` to at most `max_bytes` on a char boundary, appending `suffix`
/// when anything was dropped.
pub fn truncate_bytes(text: &str, max_bytes: usize, suffix: &str) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{suffix}", &text[..end])
}

/// First `max_chars` characters followed by `...`, always.
///
/// Used for history listings where every row is marked as a preview.
pub fn preview(text: &str, max_chars: usize) -> String {
    let prefix: String = text.chars().take(max_chars).collect();
    format!("{prefix}...")
}

/// Collapse newlines and runs of whitespace into single spaces.
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
