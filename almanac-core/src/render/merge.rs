//! Side-by-side merging of two text blocks.

use super::width::{pad_right, visible_width};

/// Place `right` beside `left`, separated by `gap` spaces.
///
/// The left column is padded to its widest visible line so the right block
/// starts at the same column on every row. Missing rows on either side are
/// blank. An empty `right` block returns `left` untouched.
pub fn merge_blocks(left: &[String], right: &[String], gap: usize) -> Vec<String> {
    if right.is_empty() {
        return left.to_vec();
    }

    let width = left.iter().map(|l| visible_width(l)).max().unwrap_or(0);
    let spacer = " ".repeat(gap);
    let rows = left.len().max(right.len());

    (0..rows)
        .map(|i| {
            let l = left.get(i).map(String::as_str).unwrap_or("");
            let r = right.get(i).map(String::as_str).unwrap_or("");
            format!("{}{}{}", pad_right(l, width), spacer, r)
        })
        .collect()
}
