//! Block Editor
//!
//! Surface-independent editing for block documents:
//!
//! - [`EditorSession`] - the state machine applying [`EditorEvent`]s
//! - [`Cursor`] - caret protocol (block id + character offset)
//! - [`SlashPalette`] - slash-command palette and its catalogue
//! - [`DragState`] - drag-to-reorder tracking
//! - [`SaveQueue`] - where scheduled saves are delivered

mod drag;
mod engine;
mod events;
mod slash;

pub use drag::{drop_position, DragState, DropIndicator};
pub use engine::{EditorSession, SaveQueue};
pub use events::{Cursor, EditOutcome, EditorEvent, InlineFormat, Key, Modifiers};
pub use slash::{matching, SlashCommand, SlashPalette, SLASH_COMMANDS};
