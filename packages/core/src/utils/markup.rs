//! Marked-up text utilities
//!
//! Block text is stored as marked-up content: raw input is escaped on the
//! way in, and inline tags (`<b>`, `<br>`, ...) may appear between text runs.
//! This module provides escaping, tag stripping, caret-safe slicing by
//! character offset, and the legacy line-prefix body importer.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::{Block, BlockType};

/// Matches any inline tag
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Matches any tag or entity reference
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>]*>|&[#A-Za-z0-9]+;").unwrap());

/// Matches a tag or entity reference ending exactly at the end of the input
static TRAILING_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:<[^<>]*>|&[#A-Za-z0-9]+;)$").unwrap());

/// Legacy body line prefixes, longest first
const LINE_PREFIXES: &[(&str, BlockType, u32)] = &[
    ("### ", BlockType::Heading, 3),
    ("## ", BlockType::Heading, 2),
    ("# ", BlockType::Heading, 1),
    ("- ", BlockType::Bulleted, 1),
    ("1. ", BlockType::Numbered, 1),
];

/// Escape `&`, `<` and `>` so raw input cannot be read as markup
///
/// # Examples
///
/// ```
/// use workbench_core::utils::escape_text;
///
/// assert_eq!(escape_text("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
/// ```
pub fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// Escape a value placed inside a double-quoted attribute
pub fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Plain text of marked-up content: tags removed, basic entities decoded
///
/// # Examples
///
/// ```
/// use workbench_core::utils::plain_text;
///
/// assert_eq!(plain_text("<b>Hi</b> &amp; bye"), "Hi & bye");
/// ```
pub fn plain_text(marked: &str) -> String {
    TAG_RE
        .replace_all(marked, "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Whether marked-up content is blank once tags and whitespace are ignored
pub fn is_blank(marked: &str) -> bool {
    plain_text(marked).trim().is_empty()
}

/// Number of characters in `text`
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of the character offset `offset`, clamped to the end
pub fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Clamp a caret offset and move it past any tag or entity it falls inside
///
/// # Examples
///
/// ```
/// use workbench_core::utils::snap_to_boundary;
///
/// assert_eq!(snap_to_boundary("a&amp;b", 3), 6);
/// assert_eq!(snap_to_boundary("a&amp;b", 1), 1);
/// ```
pub fn snap_to_boundary(text: &str, offset: usize) -> usize {
    let offset = offset.min(char_len(text));
    let index = byte_index(text, offset);
    TOKEN_RE
        .find_iter(text)
        .take_while(|m| m.start() < index)
        .find(|m| index < m.end())
        .map(|m| char_len(&text[..m.end()]))
        .unwrap_or(offset)
}

/// Split at a character offset, returning `(before, after)`
pub fn split_at_char(text: &str, offset: usize) -> (&str, &str) {
    text.split_at(byte_index(text, offset))
}

/// Insert `fragment` at a character offset, returning the caret after it
pub fn insert_at_char(text: &mut String, offset: usize, fragment: &str) -> usize {
    let index = byte_index(text, offset);
    text.insert_str(index, fragment);
    offset.min(char_len(text)) + char_len(fragment)
}

/// Delete the unit before a character offset, returning the new caret
///
/// A whole tag or entity reference is removed when the caret sits right
/// after one; otherwise a single character is removed.
pub fn delete_before_char(text: &mut String, offset: usize) -> usize {
    let offset = snap_to_boundary(text, offset);
    if offset == 0 {
        return 0;
    }
    let end = byte_index(text, offset);
    let start = TRAILING_TOKEN_RE
        .find(&text[..end])
        .map(|m| m.start())
        .unwrap_or_else(|| {
            text[..end]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0)
        });
    let removed = char_len(&text[start..end]);
    text.replace_range(start..end, "");
    offset - removed
}

/// Import a legacy plain-text body, one block per line
///
/// Lines starting with `# `, `## `, `### `, `- ` or `1. ` become headings,
/// bulleted or numbered blocks; every other line (including blank ones)
/// becomes a paragraph. Line text is escaped.
pub fn blocks_from_lines(body: &str) -> Vec<Block> {
    body.replace("\r\n", "\n")
        .split('\n')
        .map(|line| {
            LINE_PREFIXES
                .iter()
                .find_map(|(prefix, block_type, level)| {
                    line.strip_prefix(prefix)
                        .map(|rest| Block::new(*block_type, *level, escape_text(rest), false))
                })
                .unwrap_or_else(|| Block::paragraph(escape_text(line)))
        })
        .collect()
}
