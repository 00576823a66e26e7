//! Tests for the editing engine

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::editor::{EditOutcome, EditorEvent, EditorSession, Key, Modifiers, SaveQueue};
    use crate::models::{Block, BlockType, Document};
    use crate::serializer::PersistedDocument;

    #[derive(Default)]
    struct RecordingQueue {
        saves: Mutex<Vec<(u64, PersistedDocument)>>,
    }

    impl SaveQueue for RecordingQueue {
        fn enqueue(&self, revision: u64, document: PersistedDocument) {
            self.saves.lock().unwrap().push((revision, document));
        }
    }

    fn session_with(blocks: Vec<Block>) -> (EditorSession, Vec<String>) {
        let ids = blocks.iter().map(|b| b.id.clone()).collect();
        (EditorSession::new(Document::from_blocks(blocks)), ids)
    }

    fn texts(session: &EditorSession) -> Vec<&str> {
        session.document().blocks().iter().map(|b| b.text.as_str()).collect()
    }

    fn types(session: &EditorSession) -> Vec<BlockType> {
        session.document().blocks().iter().map(|b| b.block_type).collect()
    }

    fn cursor(session: &EditorSession) -> (String, usize) {
        let cursor = session.cursor().expect("cursor");
        (cursor.block_id.clone(), cursor.offset)
    }

    // ========================================================================
    // Enter
    // ========================================================================

    #[test]
    fn test_enter_splits_paragraph_at_caret() {
        let (mut session, ids) = session_with(vec![Block::paragraph("Hello World")]);
        session.handle(EditorEvent::focus(&ids[0], 5));

        assert_eq!(session.handle(EditorEvent::key(Key::Enter)), EditOutcome::Mutated);

        assert_eq!(texts(&session), vec!["Hello", " World"]);
        assert_eq!(types(&session), vec![BlockType::Paragraph, BlockType::Paragraph]);
        let blocks = session.document().blocks();
        assert_eq!(blocks[0].id, ids[0]);
        assert_eq!(blocks[0].level, blocks[1].level);
        assert_eq!(cursor(&session), (blocks[1].id.clone(), 0));
    }

    #[test]
    fn test_enter_continuation_types() {
        let (mut session, ids) = session_with(vec![
            Block::new(BlockType::Heading, 2, "Title", false),
            Block::new(BlockType::Checklist, 3, "Task", true),
            Block::new(BlockType::Quote, 1, "Said", false),
        ]);

        session.handle(EditorEvent::focus(&ids[0], 5));
        session.handle(EditorEvent::key(Key::Enter));
        let new_heading_follow = &session.document().blocks()[1];
        assert_eq!(new_heading_follow.block_type, BlockType::Paragraph);
        assert_eq!(new_heading_follow.level, 2);

        session.handle(EditorEvent::focus(&ids[1], 2));
        session.handle(EditorEvent::key(Key::Enter));
        let blocks = session.document().blocks();
        assert_eq!(blocks[2].text, "Ta");
        assert!(blocks[2].checked);
        assert_eq!(blocks[3].block_type, BlockType::Checklist);
        assert_eq!(blocks[3].text, "sk");
        assert_eq!(blocks[3].level, 3);
        assert!(!blocks[3].checked);

        session.handle(EditorEvent::focus(&ids[2], 4));
        session.handle(EditorEvent::key(Key::Enter));
        assert_eq!(session.document().last().block_type, BlockType::Paragraph);
        assert_eq!(session.document().last().text, "");
    }

    #[test]
    fn test_enter_on_empty_list_outdents_then_converts() {
        let (mut session, ids) = session_with(vec![Block::new(BlockType::Bulleted, 2, "", false)]);
        session.handle(EditorEvent::focus(&ids[0], 0));

        session.handle(EditorEvent::key(Key::Enter));
        let block = session.document().first();
        assert_eq!((block.block_type, block.level), (BlockType::Bulleted, 1));
        assert_eq!(session.document().len(), 1);

        session.handle(EditorEvent::key(Key::Enter));
        let block = session.document().first();
        assert_eq!((block.block_type, block.level), (BlockType::Paragraph, 1));
        assert_eq!(block.id, ids[0]);
        assert_eq!(session.document().len(), 1);
        assert_eq!(cursor(&session), (ids[0].clone(), 0));
    }

    #[test]
    fn test_enter_on_whitespace_only_list_counts_as_empty() {
        let (mut session, ids) = session_with(vec![Block::new(BlockType::Numbered, 1, " <br>", false)]);
        session.handle(EditorEvent::focus(&ids[0], 0));
        session.handle(EditorEvent::key(Key::Enter));
        assert_eq!(types(&session), vec![BlockType::Paragraph]);
        assert_eq!(texts(&session), vec![""]);
    }

    #[test]
    fn test_shift_enter_inserts_soft_break() {
        let (mut session, ids) = session_with(vec![Block::paragraph("ab")]);
        session.handle(EditorEvent::focus(&ids[0], 1));
        session.handle(EditorEvent::key_with(Key::Enter, Modifiers::SHIFT));

        assert_eq!(texts(&session), vec!["a<br>b"]);
        assert_eq!(cursor(&session).1, 5);
    }

    // ========================================================================
    // Backspace
    // ========================================================================

    #[test]
    fn test_backspace_at_start_merges_into_previous() {
        let (mut session, ids) = session_with(vec![Block::paragraph("Hello"), Block::paragraph("World")]);
        session.handle(EditorEvent::focus(&ids[1], 0));

        assert_eq!(session.handle(EditorEvent::key(Key::Backspace)), EditOutcome::Mutated);

        assert_eq!(texts(&session), vec!["HelloWorld"]);
        assert_eq!(cursor(&session), (ids[0].clone(), 5));
    }

    #[test]
    fn test_backspace_on_first_block_is_noop() {
        let (mut session, ids) = session_with(vec![Block::paragraph("Only")]);
        session.handle(EditorEvent::focus(&ids[0], 0));

        assert_eq!(session.handle(EditorEvent::key(Key::Backspace)), EditOutcome::Handled);
        assert_eq!(texts(&session), vec!["Only"]);
        assert_eq!(session.revision(), 0);
    }

    #[test]
    fn test_backspace_after_divider_removes_divider() {
        let (mut session, ids) = session_with(vec![
            Block::paragraph("above"),
            Block::new(BlockType::Divider, 1, "", false),
            Block::paragraph("below"),
        ]);
        session.handle(EditorEvent::focus(&ids[2], 0));
        session.handle(EditorEvent::key(Key::Backspace));

        assert_eq!(types(&session), vec![BlockType::Paragraph, BlockType::Paragraph]);
        assert_eq!(texts(&session), vec!["above", "below"]);
        assert_eq!(cursor(&session), (ids[2].clone(), 0));
    }

    #[test]
    fn test_backspace_inside_text_removes_one_unit() {
        let (mut session, ids) = session_with(vec![Block::paragraph("a&amp;b")]);
        session.handle(EditorEvent::focus(&ids[0], 6));
        session.handle(EditorEvent::key(Key::Backspace));

        assert_eq!(texts(&session), vec!["ab"]);
        assert_eq!(cursor(&session).1, 1);
    }

    // ========================================================================
    // Carets inside markup
    // ========================================================================

    #[test]
    fn test_enter_with_caret_inside_entity_keeps_entity_whole() {
        let (mut session, ids) = session_with(vec![Block::paragraph("a&amp;b")]);
        session.handle(EditorEvent::focus(&ids[0], 3));
        assert_eq!(cursor(&session).1, 6);

        session.handle(EditorEvent::key(Key::Enter));

        assert_eq!(texts(&session), vec!["a&amp;", "b"]);
    }

    #[test]
    fn test_backspace_with_caret_inside_entity_removes_entity() {
        let (mut session, ids) = session_with(vec![Block::paragraph("a&amp;b")]);
        session.handle(EditorEvent::focus(&ids[0], 3));
        session.handle(EditorEvent::key(Key::Backspace));

        assert_eq!(texts(&session), vec!["ab"]);
        assert_eq!(cursor(&session).1, 1);
    }

    #[test]
    fn test_format_with_selection_ending_inside_entity() {
        let (mut session, ids) = session_with(vec![Block::paragraph("a&amp;b")]);
        session.handle(EditorEvent::Select {
            block_id: ids[0].clone(),
            start: 0,
            end: 3,
        });
        assert_eq!(session.selection(), Some((0, 6)));

        session.handle(EditorEvent::key_with(Key::Char('b'), Modifiers::CTRL));

        assert_eq!(texts(&session), vec!["<b>a&amp;</b>b"]);
    }

    #[test]
    fn test_typing_with_caret_inside_tag_lands_after_tag() {
        let (mut session, ids) = session_with(vec![Block::paragraph("<b>x</b>")]);
        session.handle(EditorEvent::focus(&ids[0], 1));
        session.handle(EditorEvent::input("y"));

        assert_eq!(texts(&session), vec!["<b>yx</b>"]);
    }

    // ========================================================================
    // Levels
    // ========================================================================

    #[test]
    fn test_tab_and_shift_tab_change_level_with_floor() {
        let (mut session, ids) = session_with(vec![Block::new(BlockType::Bulleted, 1, "x", false)]);
        session.handle(EditorEvent::focus(&ids[0], 0));

        session.handle(EditorEvent::key(Key::Tab));
        session.handle(EditorEvent::key(Key::Tab));
        assert_eq!(session.document().first().level, 3);

        for _ in 0..4 {
            session.handle(EditorEvent::key_with(Key::Tab, Modifiers::SHIFT));
        }
        assert_eq!(session.document().first().level, 1);
        assert_eq!(session.document().len(), 1);
    }

    // ========================================================================
    // Typing and paste
    // ========================================================================

    #[test]
    fn test_typed_text_is_escaped() {
        let (mut session, ids) = session_with(vec![Block::paragraph("")]);
        session.handle(EditorEvent::focus(&ids[0], 0));
        session.handle(EditorEvent::input("<b>"));
        session.handle(EditorEvent::key(Key::Char('&')));

        assert_eq!(texts(&session), vec!["&lt;b&gt;&amp;"]);
        assert_eq!(cursor(&session).1, 14);
    }

    #[test]
    fn test_paste_three_lines_creates_siblings() {
        let (mut session, ids) = session_with(vec![Block::new(BlockType::Paragraph, 2, "", false)]);
        session.handle(EditorEvent::focus(&ids[0], 0));
        session.handle(EditorEvent::paste("one\r\ntwo\nthree"));

        assert_eq!(texts(&session), vec!["one", "two", "three"]);
        assert!(session.document().blocks().iter().all(|b| b.level == 2));
        assert_eq!(session.document().first().id, ids[0]);
        let last = session.document().last();
        assert_eq!(cursor(&session), (last.id.clone(), 5));
    }

    #[test]
    fn test_paste_keeps_post_caret_text_in_first_block() {
        let (mut session, ids) = session_with(vec![
            Block::new(BlockType::Bulleted, 1, "ab", false),
            Block::paragraph("tail"),
        ]);
        session.handle(EditorEvent::focus(&ids[0], 1));
        session.handle(EditorEvent::paste("X\nY<"));

        assert_eq!(texts(&session), vec!["aXb", "Y&lt;", "tail"]);
        assert_eq!(
            types(&session),
            vec![BlockType::Bulleted, BlockType::Bulleted, BlockType::Paragraph]
        );
    }

    #[test]
    fn test_single_line_paste_stays_in_block() {
        let (mut session, ids) = session_with(vec![Block::paragraph("ac")]);
        session.handle(EditorEvent::focus(&ids[0], 1));
        session.handle(EditorEvent::paste("b"));
        assert_eq!(texts(&session), vec!["abc"]);
        assert_eq!(cursor(&session), (ids[0].clone(), 2));
    }

    #[test]
    fn test_empty_paste_does_not_schedule_save() {
        let queue = Arc::new(RecordingQueue::default());
        let block = Block::paragraph("ab");
        let id = block.id.clone();
        let mut session = EditorSession::with_save_queue(Document::from_blocks(vec![block]), queue.clone());
        session.handle(EditorEvent::focus(&id, 1));

        assert_eq!(session.handle(EditorEvent::paste("")), EditOutcome::Handled);

        assert_eq!(texts(&session), vec!["ab"]);
        assert_eq!(session.revision(), 0);
        assert!(queue.saves.lock().unwrap().is_empty());
    }

    #[test]
    fn test_input_without_focus_creates_paragraph() {
        let (mut session, _) = session_with(vec![Block::new(BlockType::Code, 1, "x", false)]);

        assert_eq!(session.handle(EditorEvent::input("hi")), EditOutcome::Mutated);

        assert_eq!(session.document().len(), 2);
        assert_eq!(session.document().last().block_type, BlockType::Paragraph);
        assert_eq!(session.document().last().text, "hi");
    }

    #[test]
    fn test_focus_on_unknown_block_is_ignored() {
        let (mut session, _) = session_with(vec![Block::paragraph("x")]);
        assert_eq!(session.handle(EditorEvent::focus("missing", 0)), EditOutcome::Ignored);
        assert!(session.cursor().is_none());
    }

    // ========================================================================
    // Slash palette
    // ========================================================================

    #[test]
    fn test_slash_opens_palette_only_at_start_or_after_space() {
        let (mut session, ids) = session_with(vec![Block::paragraph("word")]);

        session.handle(EditorEvent::focus(&ids[0], 2));
        session.handle(EditorEvent::key(Key::Char('/')));
        assert!(!session.slash_palette().is_open());
        assert_eq!(texts(&session), vec!["wo/rd"]);

        session.handle(EditorEvent::focus(&ids[0], 0));
        assert_eq!(session.handle(EditorEvent::key(Key::Char('/'))), EditOutcome::Handled);
        assert!(session.slash_palette().is_open());
        assert_eq!(texts(&session), vec!["wo/rd"]);
    }

    #[test]
    fn test_slash_command_replaces_block() {
        let (mut session, ids) = session_with(vec![Block::new(BlockType::Paragraph, 2, "Groceries ", false)]);
        session.handle(EditorEvent::focus(&ids[0], 10));
        session.handle(EditorEvent::key(Key::Char('/')));
        assert!(session.slash_palette().is_open());

        session.handle(EditorEvent::SelectSlashCommand(BlockType::Checklist));

        let block = session.document().first();
        assert_ne!(block.id, ids[0]);
        assert_eq!(block.block_type, BlockType::Checklist);
        assert_eq!(block.text, "Groceries ");
        assert_eq!(block.level, 2);
        assert!(!session.slash_palette().is_open());
        assert_eq!(cursor(&session), (block.id.clone(), 10));
    }

    #[test]
    fn test_slash_command_strips_trailing_slash() {
        let (mut session, ids) = session_with(vec![Block::paragraph("Notes/")]);
        session.handle(EditorEvent::focus(&ids[0], 6));
        session.handle(EditorEvent::SelectSlashCommand(BlockType::Heading));

        assert_eq!(types(&session), vec![BlockType::Heading]);
        assert_eq!(texts(&session), vec!["Notes"]);
    }

    #[test]
    fn test_palette_filters_typed_query_and_enter_selects() {
        let (mut session, ids) = session_with(vec![Block::paragraph("")]);
        session.handle(EditorEvent::focus(&ids[0], 0));
        session.handle(EditorEvent::key(Key::Char('/')));
        for c in "quo".chars() {
            session.handle(EditorEvent::key(Key::Char(c)));
        }

        assert_eq!(session.slash_palette().query(), "quo");
        assert_eq!(texts(&session), vec![""]);

        session.handle(EditorEvent::key(Key::Enter));
        assert_eq!(types(&session), vec![BlockType::Quote]);
        assert_eq!(session.document().len(), 1);
    }

    #[test]
    fn test_escape_dismisses_palette_without_mutation() {
        let (mut session, ids) = session_with(vec![Block::paragraph("")]);
        session.handle(EditorEvent::focus(&ids[0], 0));
        session.handle(EditorEvent::key(Key::Char('/')));

        assert_eq!(session.handle(EditorEvent::key(Key::Escape)), EditOutcome::Handled);
        assert!(!session.slash_palette().is_open());
        assert_eq!(session.revision(), 0);
        assert_eq!(session.handle(EditorEvent::DismissSlashMenu), EditOutcome::Ignored);
    }

    // ========================================================================
    // Affordances
    // ========================================================================

    #[test]
    fn test_add_after_inserts_and_focuses_paragraph() {
        let (mut session, ids) = session_with(vec![Block::paragraph("a"), Block::paragraph("b")]);
        session.handle(EditorEvent::AddAfter {
            block_id: ids[0].clone(),
        });

        assert_eq!(texts(&session), vec!["a", "", "b"]);
        let inserted = session.document().blocks()[1].id.clone();
        assert_eq!(cursor(&session), (inserted, 0));
    }

    #[test]
    fn test_toggle_checked_only_for_checklists() {
        let (mut session, ids) = session_with(vec![
            Block::new(BlockType::Checklist, 1, "t", false),
            Block::paragraph("p"),
        ]);

        let toggle = |id: &str| EditorEvent::ToggleChecked { block_id: id.to_string() };
        assert_eq!(session.handle(toggle(ids[0].as_str())), EditOutcome::Mutated);
        assert!(session.document().first().checked);
        assert_eq!(session.handle(toggle(ids[1].as_str())), EditOutcome::Ignored);
    }

    #[test]
    fn test_ctrl_b_wraps_selection() {
        let (mut session, ids) = session_with(vec![Block::paragraph("make bold here")]);
        session.handle(EditorEvent::Select {
            block_id: ids[0].clone(),
            start: 5,
            end: 9,
        });
        session.handle(EditorEvent::key_with(Key::Char('b'), Modifiers::CTRL));

        assert_eq!(texts(&session), vec!["make <b>bold</b> here"]);
        assert_eq!(cursor(&session).1, 16);
        assert!(session.selection().is_none());

        // Without a selection the shortcut does nothing
        assert_eq!(
            session.handle(EditorEvent::key_with(Key::Char('i'), Modifiers::CTRL)),
            EditOutcome::Handled
        );
    }

    // ========================================================================
    // Drag and drop
    // ========================================================================

    #[test]
    fn test_drag_reorders_by_pointer_half() {
        let (mut session, ids) = session_with(vec![
            Block::paragraph("a"),
            Block::paragraph("b"),
            Block::new(BlockType::Bulleted, 3, "c", false),
        ]);

        session.handle(EditorEvent::DragStart {
            block_id: ids[2].clone(),
        });
        session.handle(EditorEvent::DragOver {
            target_id: ids[0].clone(),
            pointer_y: 5.0,
            target_top: 0.0,
            target_height: 20.0,
        });
        assert!(session.drag_state().indicator().is_some());
        assert_eq!(
            session.handle(EditorEvent::Drop {
                target_id: ids[0].clone()
            }),
            EditOutcome::Mutated
        );
        assert_eq!(texts(&session), vec!["c", "a", "b"]);
        assert_eq!(session.document().first().level, 3);
        assert!(session.drag_state().dragged().is_none());

        session.handle(EditorEvent::DragStart {
            block_id: ids[0].clone(),
        });
        session.handle(EditorEvent::DragOver {
            target_id: ids[1].clone(),
            pointer_y: 35.0,
            target_top: 20.0,
            target_height: 20.0,
        });
        session.handle(EditorEvent::Drop {
            target_id: ids[1].clone(),
        });
        assert_eq!(texts(&session), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_drop_without_drag_is_ignored() {
        let (mut session, ids) = session_with(vec![Block::paragraph("a"), Block::paragraph("b")]);
        assert_eq!(
            session.handle(EditorEvent::Drop {
                target_id: ids[1].clone()
            }),
            EditOutcome::Ignored
        );
        assert_eq!(session.handle(EditorEvent::DragEnd), EditOutcome::Handled);
    }

    // ========================================================================
    // Save scheduling
    // ========================================================================

    #[test]
    fn test_mutations_enqueue_full_document_with_increasing_revisions() {
        let queue = Arc::new(RecordingQueue::default());
        let block = Block::paragraph("x");
        let id = block.id.clone();
        let mut session = EditorSession::with_save_queue(Document::from_blocks(vec![block]), queue.clone());
        session.set_revision(10);

        session.handle(EditorEvent::focus(&id, 1));
        session.handle(EditorEvent::input("y"));
        session.handle(EditorEvent::key(Key::Enter));

        let saves = queue.saves.lock().unwrap();
        assert_eq!(saves.iter().map(|(r, _)| *r).collect::<Vec<_>>(), vec![11, 12]);
        assert_eq!(saves[0].1.blocks.len(), 1);
        assert_eq!(saves[0].1.blocks[0].text, "xy");
        assert_eq!(saves[1].1.blocks.len(), 2);
    }

    #[test]
    fn test_independent_sessions_do_not_share_state() {
        let (mut page, page_ids) = session_with(vec![Block::paragraph("page")]);
        let (mut modal, modal_ids) = session_with(vec![Block::paragraph("item")]);

        page.handle(EditorEvent::focus(&page_ids[0], 0));
        page.handle(EditorEvent::key(Key::Char('/')));
        modal.handle(EditorEvent::focus(&modal_ids[0], 4));
        modal.handle(EditorEvent::input("!"));

        assert!(page.slash_palette().is_open());
        assert!(!modal.slash_palette().is_open());
        assert_eq!(texts(&page), vec!["page"]);
        assert_eq!(texts(&modal), vec!["item!"]);
    }
}
