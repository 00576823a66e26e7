//! Tests for the collection service

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use mockall::predicate::eq;
    use serde_json::json;

    use crate::config::WorkbenchConfig;
    use crate::editor::{EditorEvent, Key};
    use crate::models::{
        Collection, Item, PropertyDefinition, PropertyType, Schema, TypedValue, ViewConfig, ViewType,
    };
    use crate::serializer;
    use crate::services::backend::{CollectionRecord, MockPersistenceBackend};
    use crate::services::collection_config::{default_config, default_schema};
    use crate::services::collection_service::{CollectionSession, ItemEditor, DELETE_ITEM_PROMPT};
    use crate::services::ServiceError;
    use crate::views::ViewProjection;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    fn item(id: &str, title: &str) -> Item {
        let mut item = Item::with_defaults(&default_schema(ViewType::Table), today(), 0);
        item.id = id.to_string();
        item.props.insert("Title".to_string(), title.into());
        item
    }

    fn session(mock: MockPersistenceBackend, view: ViewType, items: Vec<Item>) -> CollectionSession {
        let mut collection = Collection::new("collection-1", view, default_schema(view), default_config(view));
        collection.items = items;
        CollectionSession::new(Arc::new(mock), WorkbenchConfig::default(), "page-1", collection)
    }

    fn ids(session: &CollectionSession) -> Vec<&str> {
        session.items().iter().map(|i| i.id.as_str()).collect()
    }

    // ========================================================================
    // Loading
    // ========================================================================

    #[tokio::test]
    async fn test_load_reads_definition_and_first_page_of_items() {
        let mut mock = MockPersistenceBackend::new();
        mock.expect_upsert_collection()
            .withf(|page, block, upsert| page == "page-1" && block == "collection-1" && upsert.schema.is_none())
            .times(1)
            .returning(|_, _, _| {
                Ok(CollectionRecord {
                    schema: default_schema(ViewType::Board),
                    config: default_config(ViewType::Board),
                    ..Default::default()
                })
            });
        mock.expect_query_items()
            .with(eq("page-1"), eq("collection-1"), eq(100), eq(0))
            .times(1)
            .returning(|_, _, _, _| Ok(vec![item("item-a", "A")]));

        let session = CollectionSession::load(
            Arc::new(mock),
            WorkbenchConfig::default(),
            "page-1",
            "collection-1",
            ViewType::Board,
        )
        .await
        .unwrap();

        assert_eq!(session.view_type(), ViewType::Board);
        assert_eq!(session.collection().config.group_prop.as_deref(), Some("Status"));
        assert_eq!(ids(&session), vec!["item-a"]);
    }

    #[tokio::test]
    async fn test_load_or_default_falls_back_on_failure() {
        let mut mock = MockPersistenceBackend::new();
        mock.expect_upsert_collection()
            .returning(|_, _, _| Err(ServiceError::transport("connection refused")));

        let session = CollectionSession::load_or_default(
            Arc::new(mock),
            WorkbenchConfig::default(),
            "page-1",
            "collection-1",
            ViewType::Calendar,
        )
        .await;

        assert!(session.items().is_empty());
        assert_eq!(session.collection().schema, default_schema(ViewType::Calendar));
        assert_eq!(session.collection().config.date_prop.as_deref(), Some("Date"));
    }

    #[tokio::test]
    async fn test_create_collection_persists_defaults() {
        let mut mock = MockPersistenceBackend::new();
        mock.expect_upsert_collection()
            .withf(|_, block, upsert| {
                block.starts_with("collection-") && upsert.schema == Some(default_schema(ViewType::Gallery))
            })
            .times(1)
            .returning(|_, _, upsert| {
                Ok(CollectionRecord {
                    schema: upsert.schema.unwrap_or_default(),
                    config: upsert.config.unwrap_or_default(),
                    ..Default::default()
                })
            });

        let session =
            CollectionSession::create_collection(Arc::new(mock), WorkbenchConfig::default(), "page-1", ViewType::Gallery)
                .await
                .unwrap();

        assert!(session.block_id().starts_with("collection-"));
        assert_eq!(session.collection().config.cover_prop.as_deref(), Some("Cover"));
    }

    // ========================================================================
    // Switching views
    // ========================================================================

    #[tokio::test]
    async fn test_switch_to_calendar_remaps_and_persists() {
        let mut mock = MockPersistenceBackend::new();
        mock.expect_upsert_collection()
            .withf(|_, _, upsert| {
                upsert
                    .config
                    .as_ref()
                    .and_then(|c| c.date_prop.as_deref())
                    .is_some_and(|p| p == "Date")
            })
            .times(1)
            .returning(|_, _, _| Ok(CollectionRecord::default()));

        let mut collection = Collection::new(
            "collection-1",
            ViewType::Table,
            [
                ("Title", PropertyDefinition::new(PropertyType::Title)),
                ("Date", PropertyDefinition::new(PropertyType::Date)),
            ]
            .into_iter()
            .collect::<Schema>(),
            ViewConfig {
                visible_cols: Some(vec!["Title".into()]),
                ..Default::default()
            },
        );
        collection.items.push(item("item-a", "A"));
        let mut session = CollectionSession::new(Arc::new(mock), WorkbenchConfig::default(), "page-1", collection);

        assert!(session.switch_view(ViewType::Calendar).await);
        assert_eq!(session.view_type(), ViewType::Calendar);
        assert_eq!(session.collection().config.date_prop.as_deref(), Some("Date"));
        assert!(matches!(session.render(today()), ViewProjection::Calendar(_)));
    }

    #[tokio::test]
    async fn test_board_to_timeline_with_one_date_property() {
        let mut mock = MockPersistenceBackend::new();
        mock.expect_upsert_collection()
            .times(1)
            .returning(|_, _, _| Ok(CollectionRecord::default()));

        let schema: Schema = [
            ("Title", PropertyDefinition::new(PropertyType::Title)),
            ("Status", PropertyDefinition::with_options(PropertyType::Select, ["Todo"])),
            ("Due", PropertyDefinition::new(PropertyType::Date)),
        ]
        .into_iter()
        .collect();
        let collection = Collection::new("collection-1", ViewType::Board, schema, default_config(ViewType::Board));
        let mut session = CollectionSession::new(Arc::new(mock), WorkbenchConfig::default(), "page-1", collection);

        session.switch_view(ViewType::Timeline).await;

        let config = &session.collection().config;
        assert_eq!(config.start_prop.as_deref(), Some("Due"));
        assert_eq!(config.end_prop.as_deref(), Some("Due"));
    }

    #[tokio::test]
    async fn test_switch_without_missing_keys_does_not_persist() {
        let mock = MockPersistenceBackend::new();
        let mut session = session(mock, ViewType::Calendar, Vec::new());
        session.collection.config.group_prop = Some("Status".into());

        assert!(!session.switch_view(ViewType::Board).await);
        assert_eq!(session.view_type(), ViewType::Board);
    }

    #[tokio::test]
    async fn test_remap_persist_failure_still_switches() {
        let mut mock = MockPersistenceBackend::new();
        mock.expect_upsert_collection()
            .returning(|_, _, _| Err(ServiceError::remote("ValidationError", "locked")));

        let mut session = session(mock, ViewType::Table, Vec::new());
        assert!(session.switch_view(ViewType::Board).await);
        assert_eq!(session.view_type(), ViewType::Board);
        assert_eq!(session.collection().config.group_prop.as_deref(), Some("Status"));
    }

    // ========================================================================
    // Item CRUD
    // ========================================================================

    #[tokio::test]
    async fn test_create_item_appends_even_when_persist_fails() {
        let mut mock = MockPersistenceBackend::new();
        mock.expect_upsert_item()
            .times(1)
            .returning(|_, _, _| Err(ServiceError::transport("timeout")));

        let mut session = session(mock, ViewType::Table, vec![item("item-a", "A")]);
        let editor = session.create_item(today()).await;

        assert_eq!(session.items().len(), 2);
        let created = &session.items()[1];
        assert_eq!(created.id, editor.item_id());
        assert_eq!(created.position, 1);
        assert_eq!(created.prop_str("Title"), Some("New Item"));
        assert_eq!(created.prop_str("Status"), Some("Not started"));
        assert_eq!(created.prop_str("StartDate"), Some("2024-03-14"));
        assert_eq!(editor.title(), "New Item");
    }

    #[tokio::test]
    async fn test_delete_removes_locally_when_remote_fails() {
        let mut mock = MockPersistenceBackend::new();
        mock.expect_delete_item()
            .with(eq("page-1"), eq("collection-1"), eq("item-a"))
            .times(1)
            .returning(|_, _, _| Err(ServiceError::transport("offline")));

        let mut session = session(mock, ViewType::List, vec![item("item-a", "A"), item("item-b", "B")]);
        let confirmed = session.delete_item("item-a", &|_: &str| true).await;

        assert!(confirmed);
        assert_eq!(ids(&session), vec!["item-b"]);
    }

    #[tokio::test]
    async fn test_delete_removes_locally_when_remote_succeeds() {
        let mut mock = MockPersistenceBackend::new();
        mock.expect_delete_item().times(1).returning(|_, _, _| Ok(()));

        let mut session = session(mock, ViewType::List, vec![item("item-a", "A")]);
        assert!(session.delete_item("item-a", &|_: &str| true).await);
        assert!(session.items().is_empty());
    }

    #[tokio::test]
    async fn test_declined_delete_changes_nothing() {
        let mut mock = MockPersistenceBackend::new();
        mock.expect_delete_item().never();

        let mut session = session(mock, ViewType::List, vec![item("item-a", "A")]);
        let prompt = |message: &str| {
            assert_eq!(message, DELETE_ITEM_PROMPT);
            false
        };

        assert!(!session.delete_item("item-a", &prompt).await);
        assert_eq!(ids(&session), vec!["item-a"]);
    }

    // ========================================================================
    // Item editor
    // ========================================================================

    #[tokio::test]
    async fn test_save_item_updates_matching_entry() {
        let mut mock = MockPersistenceBackend::new();
        mock.expect_upsert_item()
            .withf(|_, _, item| item.id == "item-a" && item.prop_str("Title") == Some("Renamed"))
            .times(1)
            .returning(|_, _, item| Ok(item));

        let mut session = session(mock, ViewType::Table, vec![item("item-a", "A"), item("item-b", "B")]);
        let mut editor = session.edit_item("item-a").unwrap();
        editor.set_title("Renamed");
        let first = editor.editor().document().first().id.clone();
        editor.handle(EditorEvent::focus(&first, 0));
        editor.handle(EditorEvent::input("Notes"));

        let saved = tokio_test::assert_ok!(session.save_item(&editor).await);

        assert_eq!(ids(&session), vec!["item-a", "item-b"]);
        assert_eq!(session.items()[0].prop_str("Title"), Some("Renamed"));
        let body = serializer::body_document(saved.content.body.as_ref());
        assert_eq!(body.first().text, "Notes");
    }

    #[tokio::test]
    async fn test_save_item_appends_unknown_item() {
        let mut mock = MockPersistenceBackend::new();
        mock.expect_upsert_item().returning(|_, _, item| Ok(item));

        let mut session = session(mock, ViewType::Table, Vec::new());
        let editor = ItemEditor::open(item("item-z", "Orphan"));
        session.save_item(&editor).await.unwrap();

        assert_eq!(ids(&session), vec!["item-z"]);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_local_list_unchanged() {
        let mut mock = MockPersistenceBackend::new();
        mock.expect_upsert_item()
            .returning(|_, _, _| Err(ServiceError::remote("PermissionError", "not allowed")));

        let mut session = session(mock, ViewType::Table, vec![item("item-a", "A")]);
        let mut editor = session.edit_item("item-a").unwrap();
        editor.set_title("Changed");

        let err = tokio_test::assert_err!(session.save_item(&editor).await);
        assert!(err.to_string().contains("not allowed"));
        assert_eq!(session.items()[0].prop_str("Title"), Some("A"));
        assert_eq!(editor.title(), "Changed");
    }

    #[test]
    fn test_item_editor_opens_legacy_body() {
        let mut legacy = item("item-a", "");
        legacy.content.body = Some(json!("# Plan\n- first\nclosing words"));

        let editor = ItemEditor::open(legacy);
        let texts: Vec<&str> = editor.editor().document().blocks().iter().map(|b| b.text.as_str()).collect();

        assert_eq!(texts, vec!["Plan", "first", "closing words"]);
        assert_eq!(editor.title(), "New Item");
    }

    #[test]
    fn test_item_editor_is_independent_of_other_sessions() {
        let mut first = ItemEditor::open(item("item-a", "A"));
        let second = ItemEditor::open(item("item-b", "B"));
        let id = first.editor().document().first().id.clone();

        first.handle(EditorEvent::focus(&id, 0));
        first.handle(EditorEvent::key(Key::Enter));

        assert_eq!(first.editor().document().len(), 2);
        assert_eq!(second.editor().document().len(), 1);
        assert!(second.editor().cursor().is_none());
    }

    #[test]
    fn test_item_editor_typed_props_are_validated() {
        let schema = default_schema(ViewType::Board);
        let mut editor = ItemEditor::open(item("item-a", "A"));

        assert!(editor
            .set_prop(&schema, "Status", TypedValue::Select("Done".into()))
            .is_ok());
        assert!(editor
            .set_prop(&schema, "Status", TypedValue::Select("Shipped".into()))
            .is_err());
        assert_eq!(editor.finish().prop_str("Status"), Some("Done"));
    }
}
