//! Block Data Structures
//!
//! A `Block` is the unit of editable content inside a [`Document`](super::Document).
//! Every block carries a closed [`BlockType`] tag, a nesting `level` (minimum 1),
//! its marked-up `text`, and a `checked` flag that only checklist blocks honour.
//!
//! # Examples
//!
//! ```rust
//! use workbench_core::models::{Block, BlockType};
//!
//! let todo = Block::new(BlockType::Checklist, 1, "Ship it", true);
//! assert!(todo.checked);
//!
//! // Dividers never carry text or a checked state
//! let rule = Block::new(BlockType::Divider, 2, "ignored", true);
//! assert_eq!(rule.text, "");
//! assert!(!rule.checked);
//! ```

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Prefix applied to generated block identifiers
pub const BLOCK_ID_PREFIX: &str = "b-";

/// Closed set of block variants
///
/// Serialized as the lowercase names used by the persisted form
/// (`"paragraph"`, `"heading"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Paragraph,
    Heading,
    Bulleted,
    Numbered,
    Checklist,
    Code,
    Quote,
    Divider,
    Image,
    Embed,
}

impl BlockType {
    /// Every variant, in slash-palette order
    pub const ALL: [BlockType; 10] = [
        BlockType::Paragraph,
        BlockType::Heading,
        BlockType::Bulleted,
        BlockType::Numbered,
        BlockType::Checklist,
        BlockType::Code,
        BlockType::Quote,
        BlockType::Divider,
        BlockType::Image,
        BlockType::Embed,
    ];

    /// Persisted name of this variant
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Heading => "heading",
            Self::Bulleted => "bulleted",
            Self::Numbered => "numbered",
            Self::Checklist => "checklist",
            Self::Code => "code",
            Self::Quote => "quote",
            Self::Divider => "divider",
            Self::Image => "image",
            Self::Embed => "embed",
        }
    }

    /// Bulleted, numbered and checklist blocks behave as list items
    pub fn is_list_like(&self) -> bool {
        matches!(self, Self::Bulleted | Self::Numbered | Self::Checklist)
    }

    /// Resolve a persisted type name, including legacy spellings
    ///
    /// Legacy `heading1`..`heading3` names resolve to [`BlockType::Heading`]
    /// together with the level they encode. Unknown names yield `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use workbench_core::models::BlockType;
    ///
    /// assert_eq!(BlockType::parse_legacy("quote"), Some((BlockType::Quote, None)));
    /// assert_eq!(BlockType::parse_legacy("heading2"), Some((BlockType::Heading, Some(2))));
    /// assert_eq!(BlockType::parse_legacy("toggle"), None);
    /// ```
    pub fn parse_legacy(name: &str) -> Option<(BlockType, Option<u32>)> {
        match name {
            "heading1" => Some((Self::Heading, Some(1))),
            "heading2" => Some((Self::Heading, Some(2))),
            "heading3" => Some((Self::Heading, Some(3))),
            other => other.parse().ok().map(|t| (t, None)),
        }
    }
}

impl FromStr for BlockType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Invalid block type: {}", s))
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single typed unit of editable content
///
/// `text` holds marked-up content: raw user input is escaped before it lands
/// here (see [`crate::utils::escape_text`]), so the field may contain entity
/// references and inline tags such as `<b>` or `<br>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Opaque identifier, generated at creation and never changed
    pub id: String,

    /// Variant tag
    #[serde(rename = "type")]
    pub block_type: BlockType,

    /// Nesting depth, never below 1
    pub level: u32,

    /// Marked-up content (always empty for dividers)
    pub text: String,

    /// Completion flag (only meaningful for checklist blocks)
    pub checked: bool,
}

impl Block {
    /// Create a block with a freshly generated id
    ///
    /// Content is normalised per type: the level is floored at 1, dividers
    /// drop their text, and `checked` is kept only for checklist blocks.
    pub fn new(block_type: BlockType, level: u32, text: impl Into<String>, checked: bool) -> Self {
        Self::with_id(generate_block_id(), block_type, level, text, checked)
    }

    /// Create a block with an explicit id (used when decoding persisted content)
    pub fn with_id(
        id: impl Into<String>,
        block_type: BlockType,
        level: u32,
        text: impl Into<String>,
        checked: bool,
    ) -> Self {
        let text = if block_type == BlockType::Divider {
            String::new()
        } else {
            text.into()
        };

        Self {
            id: id.into(),
            block_type,
            level: level.max(1),
            text,
            checked: block_type == BlockType::Checklist && checked,
        }
    }

    /// Empty paragraph at level 1
    pub fn empty_paragraph() -> Self {
        Self::new(BlockType::Paragraph, 1, "", false)
    }

    /// Paragraph at level 1 with the given marked-up text
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockType::Paragraph, 1, text, false)
    }

    /// Whether the block holds editable text
    pub fn has_text(&self) -> bool {
        self.block_type != BlockType::Divider
    }

    /// Indent by one level
    pub fn indent(&mut self) {
        self.level += 1;
    }

    /// Outdent by one level, never below 1
    pub fn outdent(&mut self) {
        self.level = self.level.saturating_sub(1).max(1);
    }

    /// Change the variant in place, re-applying per-type normalisation
    pub fn set_type(&mut self, block_type: BlockType) {
        self.block_type = block_type;
        if block_type == BlockType::Divider {
            self.text.clear();
        }
        if block_type != BlockType::Checklist {
            self.checked = false;
        }
    }
}

/// Generate a fresh, prefixed block id
pub fn generate_block_id() -> String {
    format!("{}{}", BLOCK_ID_PREFIX, Uuid::new_v4())
}
