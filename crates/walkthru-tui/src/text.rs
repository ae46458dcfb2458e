//! Text helpers for layout that has to be known before rendering.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Greedy word wrap by display width. Explicit newlines start a new line.
///
/// Words wider than `width` are split at the column limit.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if line.is_empty() {
                word.width()
            } else {
                line.width() + 1 + word.width()
            };
            if needed > width && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            for ch in word.chars() {
                if line.width() + ch.width().unwrap_or(0) > width {
                    lines.push(std::mem::take(&mut line));
                }
                line.push(ch);
            }
        }
        lines.push(line);
    }
    lines
}

/// Truncates to `max_width` columns, ending with `…` when cut.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= 1 {
        return "\u{2026}".to_string();
    }
    let mut truncated = String::new();
    for ch in text.chars() {
        if truncated.width() + ch.width().unwrap_or(0) + 1 > max_width {
            break;
        }
        truncated.push(ch);
    }
    truncated.push('\u{2026}');
    truncated
}
