//! Input events, cursor protocol and outcomes

use crate::models::BlockType;

/// Caret position: a block id plus a character offset into its marked-up text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub block_id: String,
    pub offset: usize,
}

impl Cursor {
    pub fn new(block_id: impl Into<String>, offset: usize) -> Self {
        Self {
            block_id: block_id.into(),
            offset,
        }
    }

    pub fn start_of(block_id: impl Into<String>) -> Self {
        Self::new(block_id, 0)
    }
}

/// Keys the engine interprets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Tab,
    Escape,
    Char(char),
}

/// Modifier state of a key press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        meta: false,
        alt: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        meta: false,
        alt: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        meta: false,
        alt: false,
    };

    /// Ctrl on most platforms, Cmd on macOS
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Inline formatting applied by shortcut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineFormat {
    Bold,
    Italic,
    Underline,
}

impl InlineFormat {
    pub fn from_shortcut(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'b' => Some(Self::Bold),
            'i' => Some(Self::Italic),
            'u' => Some(Self::Underline),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Bold => "b",
            Self::Italic => "i",
            Self::Underline => "u",
        }
    }
}

/// Input delivered to an editing surface
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    KeyDown { key: Key, modifiers: Modifiers },

    /// Raw text typed at the caret
    Input { text: String },

    /// Raw clipboard text pasted at the caret
    Paste { text: String },

    /// Move the caret
    Focus { block_id: String, offset: usize },

    /// Select a character range within one block
    Select { block_id: String, start: usize, end: usize },

    SelectSlashCommand(BlockType),

    DismissSlashMenu,

    ToggleChecked { block_id: String },

    /// The add affordance next to a block was clicked
    AddAfter { block_id: String },

    DragStart { block_id: String },

    DragOver {
        target_id: String,
        pointer_y: f64,
        target_top: f64,
        target_height: f64,
    },

    Drop { target_id: String },

    DragEnd,
}

impl EditorEvent {
    pub fn key(key: Key) -> Self {
        Self::KeyDown {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key_with(key: Key, modifiers: Modifiers) -> Self {
        Self::KeyDown { key, modifiers }
    }

    pub fn input(text: impl Into<String>) -> Self {
        Self::Input { text: text.into() }
    }

    pub fn paste(text: impl Into<String>) -> Self {
        Self::Paste { text: text.into() }
    }

    pub fn focus(block_id: impl Into<String>, offset: usize) -> Self {
        Self::Focus {
            block_id: block_id.into(),
            offset,
        }
    }
}

/// What handling an event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Not interpreted; the host may apply its default behavior
    Ignored,

    /// Consumed without changing the document
    Handled,

    /// The document changed and a save was scheduled
    Mutated,
}

impl EditOutcome {
    pub fn is_mutated(&self) -> bool {
        matches!(self, Self::Mutated)
    }
}
