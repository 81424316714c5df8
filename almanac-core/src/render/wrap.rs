//! Greedy word wrapping with an optional hard cap.

use super::width::visible_width;

/// Marker appended when the hard cap cuts the text short.
pub const ELLIPSIS: &str = "...";

/// Greedily pack whitespace-delimited words into lines of at most `width`
/// cells, joining words with single spaces.
///
/// A word that exactly fills the remaining budget stays on the current line.
/// Words are never split, so a single word longer than `width` gets a line of
/// its own. When `hard_cap` is set, the total emitted length (words plus the
/// spaces between them) never exceeds it: the first word that would cross
/// the cap ends wrapping and [`ELLIPSIS`] is appended to the last line.
pub fn wrap_words(text: &str, width: usize, hard_cap: Option<usize>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut line_width = 0;
    let mut total = 0;
    let mut truncated = false;

    for word in text.split_whitespace() {
        let len = visible_width(word);
        let fits = current.is_empty() || line_width + 1 + len <= width;
        let added = if current.is_empty() || !fits { len } else { len + 1 };

        if let Some(cap) = hard_cap {
            if total + added > cap {
                truncated = true;
                break;
            }
        }

        if fits {
            if !current.is_empty() {
                current.push(' ');
                line_width += 1;
            }
            current.push_str(word);
            line_width += len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            line_width = len;
        }
        total += added;
    }

    if truncated {
        current.push_str(ELLIPSIS);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}
