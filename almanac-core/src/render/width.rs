//! Visible-width measurement for text carrying ANSI escape sequences.
//!
//! Raw string length overcounts colorized text. Every padding decision in
//! the renderer goes through [`visible_width`] instead.

use unicode_width::UnicodeWidthChar;

/// Number of terminal cells `text` occupies.
///
/// CSI sequences (`ESC [ ... final`) count as zero width; every other char
/// counts by its Unicode display width.
pub fn visible_width(text: &str) -> usize {
    visible_chars(text).map(|ch| ch.width().unwrap_or(0)).sum()
}

/// `text` with every CSI sequence removed.
pub fn strip_ansi(text: &str) -> String {
    visible_chars(text).collect()
}

/// Chars of `text` outside CSI sequences.
fn visible_chars(text: &str) -> impl Iterator<Item = char> + '_ {
    let mut chars = text.chars().peekable();
    std::iter::from_fn(move || loop {
        let ch = chars.next()?;
        if ch != '\x1b' {
            return Some(ch);
        }
        if chars.peek() == Some(&'[') {
            chars.next();
            // Parameter and intermediate bytes run until the final byte
            for next in chars.by_ref() {
                if ('\x40'..='\x7e').contains(&next) {
                    break;
                }
            }
        }
    })
}

/// Right-pad `text` with spaces until it is `width` cells wide.
///
/// Text already at or beyond `width` is returned unchanged.
pub fn pad_right(text: &str, width: usize) -> String {
    let current = visible_width(text);
    if current >= width {
        return text.to_string();
    }
    let mut padded = String::with_capacity(text.len() + width - current);
    padded.push_str(text);
    padded.push_str(&" ".repeat(width - current));
    padded
}

/// Center `text` in `width` cells: left pad is `(width - len) / 2`, the
/// remainder goes to the right.
pub fn center(text: &str, width: usize) -> String {
    let current = visible_width(text);
    if current >= width {
        return text.to_string();
    }
    let left = (width - current) / 2;
    let right = width - current - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}
