//! Editing engine
//!
//! `EditorSession` owns one [`Document`] together with the transient state of
//! the surface editing it: the caret, an optional selection, the slash
//! palette and any drag in progress. Every input is delivered through
//! [`EditorSession::handle`], which applies it synchronously and, when the
//! document changed, hands the full serialized document to the attached
//! [`SaveQueue`] under a new revision number.
//!
//! # Architecture
//!
//! - One session per editing surface. The page editor and the item modal
//!   each own an independent session, so neither sees the other's caret,
//!   palette or drag state.
//! - Type-specific rules (continuation type, list-likeness, editability)
//!   come from the behavior registry.
//! - No operation can fail. Input that arrives with no resolvable focused
//!   block first appends and focuses an empty paragraph.
//!
//! # Examples
//!
//! ```rust
//! use workbench_core::editor::{EditorEvent, EditorSession, Key};
//! use workbench_core::models::{Block, Document};
//!
//! let block = Block::paragraph("Hello World");
//! let id = block.id.clone();
//! let mut session = EditorSession::new(Document::from_blocks(vec![block]));
//!
//! session.handle(EditorEvent::focus(id, 5));
//! session.handle(EditorEvent::key(Key::Enter));
//!
//! let texts: Vec<&str> = session.document().blocks().iter().map(|b| b.text.as_str()).collect();
//! assert_eq!(texts, vec!["Hello", " World"]);
//! ```

use std::sync::Arc;

use crate::behaviors::behavior;
use crate::editor::drag::{drop_position, DragState};
use crate::editor::events::{Cursor, EditOutcome, EditorEvent, InlineFormat, Key, Modifiers};
use crate::editor::slash::SlashPalette;
use crate::models::{Block, BlockType, Document, DropPosition};
use crate::serializer::{serialize, PersistedDocument};
use crate::utils::{
    char_len, delete_before_char, escape_text, insert_at_char, is_blank, plain_text, snap_to_boundary,
    split_at_char,
};

/// Receiver of scheduled saves
///
/// Each call carries the complete serialized document and a revision number
/// that increases with every mutation of the session.
pub trait SaveQueue: Send + Sync {
    fn enqueue(&self, revision: u64, document: PersistedDocument);
}

/// Editing state machine bound to one document
pub struct EditorSession {
    document: Document,
    cursor: Option<Cursor>,
    selection: Option<(usize, usize)>,
    slash: SlashPalette,
    drag: DragState,
    save_queue: Option<Arc<dyn SaveQueue>>,
    revision: u64,
    created_focus_block: bool,
}

impl EditorSession {
    /// Session without a save queue; focus starts unset
    pub fn new(document: Document) -> Self {
        Self {
            document,
            cursor: None,
            selection: None,
            slash: SlashPalette::default(),
            drag: DragState::default(),
            save_queue: None,
            revision: 0,
            created_focus_block: false,
        }
    }

    /// Session whose mutations are handed to `queue`
    pub fn with_save_queue(document: Document, queue: Arc<dyn SaveQueue>) -> Self {
        let mut session = Self::new(document);
        session.save_queue = Some(queue);
        session
    }

    /// Continue numbering saves after `revision`
    pub fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    pub fn slash_palette(&self) -> &SlashPalette {
        &self.slash
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    /// Revision of the most recently scheduled save
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Current document in its persisted form
    pub fn serialize(&self) -> PersistedDocument {
        serialize(&self.document)
    }

    /// Apply one input event
    pub fn handle(&mut self, event: EditorEvent) -> EditOutcome {
        let outcome = match event {
            EditorEvent::KeyDown { key, modifiers } => self.on_key_down(key, modifiers),
            EditorEvent::Input { text } => self.insert_raw(&text),
            EditorEvent::Paste { text } => self.paste(&text),
            EditorEvent::Focus { block_id, offset } => self.focus(&block_id, offset),
            EditorEvent::Select { block_id, start, end } => self.select(&block_id, start, end),
            EditorEvent::SelectSlashCommand(block_type) => self.apply_slash_command(block_type),
            EditorEvent::DismissSlashMenu => self.dismiss_slash_menu(),
            EditorEvent::ToggleChecked { block_id } => self.toggle_checked(&block_id),
            EditorEvent::AddAfter { block_id } => self.add_after(&block_id),
            EditorEvent::DragStart { block_id } => self.drag_start(&block_id),
            EditorEvent::DragOver {
                target_id,
                pointer_y,
                target_top,
                target_height,
            } => self.drag_over(&target_id, pointer_y, target_top, target_height),
            EditorEvent::Drop { target_id } => self.drop_on(&target_id),
            EditorEvent::DragEnd => {
                self.drag.clear();
                EditOutcome::Handled
            }
        };

        let outcome = if std::mem::take(&mut self.created_focus_block) {
            EditOutcome::Mutated
        } else {
            outcome
        };

        if outcome.is_mutated() {
            self.forget_removed_blocks();
            self.schedule_save();
        }
        outcome
    }

    // ========================================================================
    // Focus
    // ========================================================================

    /// Index and caret offset of the focused block, clamped to a markup
    /// boundary, creating and
    /// focusing an empty paragraph when nothing resolvable is focused
    fn ensure_focus(&mut self) -> (usize, usize) {
        if let Some(cursor) = &self.cursor {
            if let Some(index) = self.document.index_of(&cursor.block_id) {
                let text = &self.document.blocks()[index].text;
                return (index, snap_to_boundary(text, cursor.offset));
            }
        }

        let block = Block::empty_paragraph();
        tracing::debug!("No focused block, appending paragraph {}", block.id);
        self.cursor = Some(Cursor::start_of(block.id.clone()));
        self.selection = None;
        self.document.push(block);
        self.created_focus_block = true;
        (self.document.len() - 1, 0)
    }

    fn place_cursor(&mut self, block_id: impl Into<String>, offset: usize) {
        self.cursor = Some(Cursor::new(block_id, offset));
        self.selection = None;
    }

    fn focus(&mut self, block_id: &str, offset: usize) -> EditOutcome {
        let Some(block) = self.document.get(block_id) else {
            return EditOutcome::Ignored;
        };
        let offset = snap_to_boundary(&block.text, offset);
        if self.slash.anchor().is_some_and(|anchor| anchor != block_id) {
            self.slash.close();
        }
        self.place_cursor(block_id, offset);
        EditOutcome::Handled
    }

    fn select(&mut self, block_id: &str, start: usize, end: usize) -> EditOutcome {
        let Some(block) = self.document.get(block_id) else {
            return EditOutcome::Ignored;
        };
        let (start, end) = (
            snap_to_boundary(&block.text, start.min(end)),
            snap_to_boundary(&block.text, start.max(end)),
        );
        self.place_cursor(block_id, end);
        self.selection = Some((start, end));
        EditOutcome::Handled
    }

    // ========================================================================
    // Keyboard
    // ========================================================================

    fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> EditOutcome {
        if self.slash.is_open() {
            if let Some(outcome) = self.on_palette_key(key, modifiers) {
                return outcome;
            }
        }

        match key {
            Key::Enter if modifiers.shift => self.soft_break(),
            Key::Enter => self.enter(),
            Key::Backspace => self.backspace(),
            Key::Tab => self.change_level(!modifiers.shift),
            Key::Escape => EditOutcome::Ignored,
            Key::Char(c) if modifiers.command() => match InlineFormat::from_shortcut(c) {
                Some(format) => self.apply_format(format),
                None => EditOutcome::Ignored,
            },
            Key::Char('/') if self.slash_trigger_allowed() => {
                let (index, _) = self.ensure_focus();
                let anchor = self.document.blocks()[index].id.clone();
                tracing::debug!("Opening slash palette below {}", anchor);
                self.slash.open(anchor);
                EditOutcome::Handled
            }
            Key::Char(c) => self.insert_raw(c.encode_utf8(&mut [0; 4])),
        }
    }

    /// Keys consumed by an open palette; `None` lets the key through
    fn on_palette_key(&mut self, key: Key, modifiers: Modifiers) -> Option<EditOutcome> {
        match key {
            Key::Escape => {
                self.slash.close();
                Some(EditOutcome::Handled)
            }
            Key::Char(c) if !modifiers.command() => {
                self.slash.push(c);
                Some(EditOutcome::Handled)
            }
            Key::Backspace => {
                if !self.slash.pop() {
                    self.slash.close();
                }
                Some(EditOutcome::Handled)
            }
            Key::Enter if !modifiers.shift => match self.slash.entries().first() {
                Some(command) => Some(self.apply_slash_command(command.block_type)),
                None => {
                    self.slash.close();
                    Some(EditOutcome::Handled)
                }
            },
            _ => None,
        }
    }

    /// `/` opens the palette at the start of a block or right after a space
    fn slash_trigger_allowed(&mut self) -> bool {
        let (index, offset) = self.ensure_focus();
        let block = &self.document.blocks()[index];
        if !behavior(block.block_type).is_editable() {
            return false;
        }
        let (before, _) = split_at_char(&block.text, offset);
        let before = plain_text(before);
        before.trim().is_empty() || before.ends_with(' ')
    }

    fn enter(&mut self) -> EditOutcome {
        let (index, offset) = self.ensure_focus();
        let Some(block) = self.document.block_at_mut(index) else {
            return EditOutcome::Ignored;
        };
        let rules = behavior(block.block_type);

        if rules.is_list_like() && is_blank(&block.text) {
            if block.level > 1 {
                block.outdent();
                tracing::debug!("Empty list block {} outdented to {}", block.id, block.level);
            } else {
                block.set_type(BlockType::Paragraph);
                block.text.clear();
                tracing::debug!("Empty list block {} converted to paragraph", block.id);
            }
            let id = block.id.clone();
            self.place_cursor(id, 0);
            return EditOutcome::Mutated;
        }

        let (before, after) = split_at_char(&block.text, offset);
        let (before, after) = (before.to_string(), after.to_string());
        block.text = before;
        let current_id = block.id.clone();
        let next = Block::new(rules.continuation_type(), block.level, after, false);
        let next_id = next.id.clone();

        self.document.insert_after(&current_id, next);
        tracing::debug!("Split {} at {}, new block {}", current_id, offset, next_id);
        self.place_cursor(next_id, 0);
        EditOutcome::Mutated
    }

    fn soft_break(&mut self) -> EditOutcome {
        self.insert_markup("<br>")
    }

    fn backspace(&mut self) -> EditOutcome {
        let (index, offset) = self.ensure_focus();

        if offset > 0 {
            let Some(block) = self.document.block_at_mut(index) else {
                return EditOutcome::Ignored;
            };
            let caret = delete_before_char(&mut block.text, offset);
            let id = block.id.clone();
            self.place_cursor(id, caret);
            return EditOutcome::Mutated;
        }

        if index == 0 {
            return EditOutcome::Handled;
        }

        let current = self.document.blocks()[index].clone();
        let previous = &self.document.blocks()[index - 1];

        if previous.block_type == BlockType::Divider {
            let divider_id = previous.id.clone();
            self.document.remove(&divider_id);
            self.place_cursor(current.id, 0);
            return EditOutcome::Mutated;
        }

        let Some(previous) = self.document.block_at_mut(index - 1) else {
            return EditOutcome::Ignored;
        };
        let join_at = char_len(&previous.text);
        previous.text.push_str(&current.text);
        let previous_id = previous.id.clone();

        self.document.remove(&current.id);
        tracing::debug!("Merged {} into {}", current.id, previous_id);
        self.place_cursor(previous_id, join_at);
        EditOutcome::Mutated
    }

    fn change_level(&mut self, indent: bool) -> EditOutcome {
        let (index, offset) = self.ensure_focus();
        let Some(block) = self.document.block_at_mut(index) else {
            return EditOutcome::Ignored;
        };
        if indent {
            block.indent();
        } else {
            block.outdent();
        }
        let id = block.id.clone();
        self.place_cursor(id, offset);
        EditOutcome::Mutated
    }

    // ========================================================================
    // Text input
    // ========================================================================

    /// Insert raw text at the caret after escaping it
    fn insert_raw(&mut self, raw: &str) -> EditOutcome {
        if raw.is_empty() {
            return EditOutcome::Handled;
        }
        self.insert_markup(&escape_text(raw))
    }

    fn insert_markup(&mut self, fragment: &str) -> EditOutcome {
        let (index, offset) = self.ensure_focus();
        let Some(block) = self.document.block_at_mut(index) else {
            return EditOutcome::Ignored;
        };
        if !behavior(block.block_type).is_editable() {
            return EditOutcome::Ignored;
        }
        let caret = insert_at_char(&mut block.text, offset, fragment);
        let id = block.id.clone();
        self.place_cursor(id, caret);
        EditOutcome::Mutated
    }

    fn paste(&mut self, text: &str) -> EditOutcome {
        if text.is_empty() {
            return EditOutcome::Handled;
        }
        let (index, offset) = self.ensure_focus();
        let Some(block) = self.document.block_at_mut(index) else {
            return EditOutcome::Ignored;
        };
        let rules = behavior(block.block_type);
        if !rules.is_editable() {
            return EditOutcome::Ignored;
        }

        let normalized = text.replace("\r\n", "\n");
        let mut lines = normalized.split('\n');
        let first = lines.next().unwrap_or_default();
        let caret = insert_at_char(&mut block.text, offset, &escape_text(first));
        let level = block.level;
        let mut anchor = block.id.clone();
        let mut caret_at = caret;

        for line in lines {
            let next = Block::new(rules.continuation_type(), level, escape_text(line), false);
            caret_at = char_len(&next.text);
            let next_id = next.id.clone();
            self.document.insert_after(&anchor, next);
            anchor = next_id;
        }

        self.place_cursor(anchor, caret_at);
        EditOutcome::Mutated
    }

    fn apply_format(&mut self, format: InlineFormat) -> EditOutcome {
        let (index, _) = self.ensure_focus();
        let Some((start, end)) = self.selection.take().filter(|(start, end)| start < end) else {
            return EditOutcome::Handled;
        };
        let Some(block) = self.document.block_at_mut(index) else {
            return EditOutcome::Ignored;
        };
        if !behavior(block.block_type).is_editable() {
            return EditOutcome::Handled;
        }

        let open = format!("<{}>", format.tag());
        let close = format!("</{}>", format.tag());
        let after_close = insert_at_char(&mut block.text, end, &close);
        insert_at_char(&mut block.text, start, &open);
        let id = block.id.clone();
        self.place_cursor(id, after_close + char_len(&open));
        EditOutcome::Mutated
    }

    // ========================================================================
    // Slash palette
    // ========================================================================

    /// Replace the anchored (or focused) block with a block of `block_type`
    ///
    /// The new block gets a fresh id, keeps the level, and carries the old
    /// text minus one trailing `/`.
    fn apply_slash_command(&mut self, block_type: BlockType) -> EditOutcome {
        let (focused, _) = self.ensure_focus();
        let index = self
            .slash
            .anchor()
            .and_then(|anchor| self.document.index_of(anchor))
            .unwrap_or(focused);
        self.slash.close();

        let old = &self.document.blocks()[index];
        let mut text = old.text.clone();
        if text.ends_with('/') {
            text.pop();
        }
        let old_id = old.id.clone();
        let replacement = Block::new(block_type, old.level, text, false);
        let new_id = replacement.id.clone();
        let caret = char_len(&replacement.text);

        self.document.replace(&old_id, replacement);
        tracing::debug!("Slash command replaced {} with {} {}", old_id, block_type, new_id);
        self.place_cursor(new_id, caret);
        EditOutcome::Mutated
    }

    fn dismiss_slash_menu(&mut self) -> EditOutcome {
        if self.slash.is_open() {
            self.slash.close();
            EditOutcome::Handled
        } else {
            EditOutcome::Ignored
        }
    }

    // ========================================================================
    // Block affordances
    // ========================================================================

    fn toggle_checked(&mut self, block_id: &str) -> EditOutcome {
        match self.document.get_mut(block_id) {
            Some(block) if block.block_type == BlockType::Checklist => {
                block.checked = !block.checked;
                EditOutcome::Mutated
            }
            _ => EditOutcome::Ignored,
        }
    }

    fn add_after(&mut self, block_id: &str) -> EditOutcome {
        let block = Block::empty_paragraph();
        let id = block.id.clone();
        self.document.insert_after(block_id, block);
        self.place_cursor(id, 0);
        EditOutcome::Mutated
    }

    // ========================================================================
    // Drag and drop
    // ========================================================================

    fn drag_start(&mut self, block_id: &str) -> EditOutcome {
        if self.document.get(block_id).is_none() {
            return EditOutcome::Ignored;
        }
        self.drag.start(block_id);
        EditOutcome::Handled
    }

    fn drag_over(&mut self, target_id: &str, pointer_y: f64, target_top: f64, target_height: f64) -> EditOutcome {
        if self.drag.dragged().is_none() || self.document.get(target_id).is_none() {
            return EditOutcome::Ignored;
        }
        self.drag
            .hover(target_id, drop_position(pointer_y, target_top, target_height));
        EditOutcome::Handled
    }

    fn drop_on(&mut self, target_id: &str) -> EditOutcome {
        let Some(dragged) = self.drag.dragged().map(str::to_string) else {
            return EditOutcome::Ignored;
        };
        let position = self.drag.position_for(target_id).unwrap_or(DropPosition::Below);
        self.drag.clear();

        if self.document.move_block(&dragged, target_id, position) {
            tracing::debug!("Moved {} {:?} {}", dragged, position, target_id);
            EditOutcome::Mutated
        } else {
            EditOutcome::Handled
        }
    }

    // ========================================================================
    // Saving
    // ========================================================================

    /// Drop transient references to blocks that no longer exist
    fn forget_removed_blocks(&mut self) {
        if let Some(anchor) = self.slash.anchor() {
            if self.document.get(anchor).is_none() {
                self.slash.close();
            }
        }
        if let Some(dragged) = self.drag.dragged() {
            if self.document.get(dragged).is_none() {
                self.drag.clear();
            }
        }
    }

    fn schedule_save(&mut self) {
        self.revision += 1;
        tracing::debug!(
            "Scheduling save revision {} ({} blocks)",
            self.revision,
            self.document.len()
        );
        if let Some(queue) = &self.save_queue {
            queue.enqueue(self.revision, serialize(&self.document));
        }
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;
