//! Slash-command palette
//!
//! Typing `/` at the start of a block, or right after a space, opens the
//! palette under the focused block. While it is open, typed characters
//! narrow the listed commands instead of reaching the document. Choosing a
//! command replaces the anchored block with a new block of that type.

use crate::models::BlockType;

/// One palette entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlashCommand {
    pub block_type: BlockType,
    pub title: &'static str,
    pub description: &'static str,
}

/// Every command, in display order
pub const SLASH_COMMANDS: [SlashCommand; 10] = [
    SlashCommand {
        block_type: BlockType::Paragraph,
        title: "Text",
        description: "Just start typing with plain text",
    },
    SlashCommand {
        block_type: BlockType::Heading,
        title: "Heading 1",
        description: "Big section heading",
    },
    SlashCommand {
        block_type: BlockType::Bulleted,
        title: "Bulleted list",
        description: "Create a simple bulleted list",
    },
    SlashCommand {
        block_type: BlockType::Numbered,
        title: "Numbered list",
        description: "Create a list with numbering",
    },
    SlashCommand {
        block_type: BlockType::Checklist,
        title: "To-do list",
        description: "Track tasks with a to-do list",
    },
    SlashCommand {
        block_type: BlockType::Code,
        title: "Code",
        description: "Capture a code snippet",
    },
    SlashCommand {
        block_type: BlockType::Quote,
        title: "Quote",
        description: "Capture a quote",
    },
    SlashCommand {
        block_type: BlockType::Divider,
        title: "Divider",
        description: "Visually divide blocks",
    },
    SlashCommand {
        block_type: BlockType::Image,
        title: "Image",
        description: "Upload or embed an image",
    },
    SlashCommand {
        block_type: BlockType::Embed,
        title: "Embed",
        description: "Embed a website or content",
    },
];

/// Commands whose title contains `query`, case-insensitively
///
/// Prefix matches are listed before other matches; an empty query lists
/// every command.
pub fn matching(query: &str) -> Vec<&'static SlashCommand> {
    let query = query.trim().to_lowercase();
    let (mut prefix, rest): (Vec<_>, Vec<_>) = SLASH_COMMANDS
        .iter()
        .filter(|command| command.title.to_lowercase().contains(&query))
        .partition(|command| command.title.to_lowercase().starts_with(&query));
    prefix.extend(rest);
    prefix
}

/// Transient palette state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlashPalette {
    anchor: Option<String>,
    query: String,
}

impl SlashPalette {
    pub fn is_open(&self) -> bool {
        self.anchor.is_some()
    }

    /// Block the palette is anchored below
    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn open(&mut self, block_id: impl Into<String>) {
        self.anchor = Some(block_id.into());
        self.query.clear();
    }

    pub fn close(&mut self) {
        self.anchor = None;
        self.query.clear();
    }

    pub fn push(&mut self, c: char) {
        self.query.push(c);
    }

    /// Remove the last query character; false when the query was already empty
    pub fn pop(&mut self) -> bool {
        self.query.pop().is_some()
    }

    /// Commands matching the current query
    pub fn entries(&self) -> Vec<&'static SlashCommand> {
        matching(&self.query)
    }
}
