//! Collection Service
//!
//! This module binds an inline collection to its host page and the
//! persistence boundary. It loads the collection, switches views (remapping
//! config first), renders the active view, and runs item CRUD including the
//! modal item editor.
//!
//! ## Architecture
//!
//! - Local state is the fallback of record: creating and deleting an item
//!   change the local item list whether or not the remote call succeeds
//! - Saving the item editor is the one item operation whose failure is
//!   returned, so the caller can keep the editor open
//! - The item editor is an independent [`EditorSession`] bound to the
//!   item's body, never to the host page's editor
//!
//! # Examples
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use workbench_core::config::WorkbenchConfig;
//! # use workbench_core::models::ViewType;
//! # use workbench_core::services::{CollectionSession, InMemoryBackend, PersistenceBackend};
//! # async fn example() -> anyhow::Result<()> {
//! let backend = Arc::new(InMemoryBackend::new());
//! let page = backend.create_page("Roadmap").await?;
//! let mut session =
//!     CollectionSession::create_collection(backend, WorkbenchConfig::default(), &page.name, ViewType::Board).await?;
//!
//! let today = chrono::Local::now().date_naive();
//! let editor = session.create_item(today).await;
//! session.save_item(&editor).await?;
//! session.switch_view(ViewType::Calendar).await;
//! let projection = session.render(today);
//! # let _ = projection;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::WorkbenchConfig;
use crate::editor::{EditOutcome, EditorEvent, EditorSession};
use crate::models::{
    generate_collection_id, Collection, Item, PropertyValue, Schema, TypedValue, ValidationError, ViewType,
    DEFAULT_ITEM_TITLE,
};
use crate::serializer;
use crate::services::backend::{CollectionUpsert, PersistenceBackend};
use crate::services::collection_config::{default_config, default_schema, needs_config_remap, remap_config};
use crate::services::ServiceError;
use crate::views::{render_view, RenderContext, ViewProjection};

/// Message shown before an item is deleted
pub const DELETE_ITEM_PROMPT: &str = "Are you sure you want to delete this item?";

/// Interactive yes/no confirmation
pub trait ConfirmPrompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// One inline collection of a page, with its items loaded
pub struct CollectionSession {
    backend: Arc<dyn PersistenceBackend>,
    config: WorkbenchConfig,
    page: String,
    collection: Collection,
}

impl CollectionSession {
    pub fn new(
        backend: Arc<dyn PersistenceBackend>,
        config: WorkbenchConfig,
        page: impl Into<String>,
        collection: Collection,
    ) -> Self {
        Self {
            backend,
            config,
            page: page.into(),
            collection,
        }
    }

    /// Load the collection definition and its first page of items
    pub async fn load(
        backend: Arc<dyn PersistenceBackend>,
        config: WorkbenchConfig,
        page: &str,
        block_id: &str,
        view: ViewType,
    ) -> Result<Self, ServiceError> {
        let record = backend
            .upsert_collection(page, block_id, CollectionUpsert::load())
            .await?;
        let items = backend
            .query_items(page, block_id, config.item_page_size, 0)
            .await?;

        let mut collection = Collection::new(block_id, view, record.schema, record.config);
        collection.filters = record.filters;
        collection.sorts = record.sorts;
        collection.items = items;

        tracing::info!(
            "Loaded collection {} on page {} with {} items",
            block_id,
            page,
            collection.items.len()
        );
        Ok(Self::new(backend, config, page, collection))
    }

    /// Like [`CollectionSession::load`], falling back to the default schema
    /// and config with no items
    pub async fn load_or_default(
        backend: Arc<dyn PersistenceBackend>,
        config: WorkbenchConfig,
        page: &str,
        block_id: &str,
        view: ViewType,
    ) -> Self {
        match Self::load(backend.clone(), config.clone(), page, block_id, view).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Failed to load collection {}, using defaults: {}", block_id, e);
                let collection = Collection::new(block_id, view, default_schema(view), default_config(view));
                Self::new(backend, config, page, collection)
            }
        }
    }

    /// Create a new collection block with the default schema and config for `view`
    pub async fn create_collection(
        backend: Arc<dyn PersistenceBackend>,
        config: WorkbenchConfig,
        page: &str,
        view: ViewType,
    ) -> Result<Self, ServiceError> {
        let block_id = generate_collection_id();
        let record = backend
            .upsert_collection(
                page,
                &block_id,
                CollectionUpsert::create(default_schema(view), default_config(view)),
            )
            .await?;

        let mut collection = Collection::new(block_id, view, record.schema, record.config);
        collection.filters = record.filters;
        collection.sorts = record.sorts;

        tracing::info!("Created {} collection {} on page {}", view, collection.block_id, page);
        Ok(Self::new(backend, config, page, collection))
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn block_id(&self) -> &str {
        &self.collection.block_id
    }

    pub fn view_type(&self) -> ViewType {
        self.collection.view_type
    }

    pub fn items(&self) -> &[Item] {
        &self.collection.items
    }

    //
    // VIEWS
    //

    /// Make `view` the active view, remapping the config first if it lacks
    /// keys `view` requires
    ///
    /// Returns whether the config was remapped. A remapped config that fails
    /// to persist is still used locally.
    pub async fn switch_view(&mut self, view: ViewType) -> bool {
        let from = self.collection.view_type;
        let remapped = needs_config_remap(from, view, &self.collection.config);

        if remapped {
            self.collection.config = remap_config(from, view, &self.collection.config, &self.collection.schema);
            let upsert = CollectionUpsert::from_collection(&self.collection);
            if let Err(e) = self
                .backend
                .upsert_collection(&self.page, &self.collection.block_id, upsert)
                .await
            {
                tracing::warn!("Failed to persist remapped config for {}: {}", self.collection.block_id, e);
            }
        }

        self.collection.view_type = view;
        tracing::debug!("Switched {} from {} to {} view", self.collection.block_id, from, view);
        remapped
    }

    /// Project the items through the active view
    pub fn render(&self, today: NaiveDate) -> ViewProjection {
        let ctx = RenderContext::from_config(&self.config, today);
        render_view(
            self.collection.view_type,
            &self.collection.schema,
            &self.collection.config,
            &self.collection.items,
            &ctx,
        )
    }

    //
    // ITEMS
    //

    /// Create an item with default props and open it for editing
    ///
    /// The item is appended locally even when persisting it fails.
    pub async fn create_item(&mut self, today: NaiveDate) -> ItemEditor {
        let item = Item::with_defaults(&self.collection.schema, today, self.collection.next_position());

        match self
            .backend
            .upsert_item(&self.page, &self.collection.block_id, item.clone())
            .await
        {
            Ok(_) => tracing::info!("Created item {} in {}", item.id, self.collection.block_id),
            Err(e) => tracing::warn!("Failed to persist new item {}, keeping it locally: {}", item.id, e),
        }

        self.collection.items.push(item.clone());
        ItemEditor::open(item)
    }

    /// Open the item editor for an existing item
    pub fn edit_item(&self, item_id: &str) -> Option<ItemEditor> {
        self.collection.item(item_id).cloned().map(ItemEditor::open)
    }

    /// Delete an item after confirmation
    ///
    /// Once confirmed, the item is removed locally whatever the remote
    /// outcome. Returns whether the deletion was confirmed.
    pub async fn delete_item(&mut self, item_id: &str, prompt: &dyn ConfirmPrompt) -> bool {
        if !prompt.confirm(DELETE_ITEM_PROMPT) {
            return false;
        }

        if let Err(e) = self
            .backend
            .delete_item(&self.page, &self.collection.block_id, item_id)
            .await
        {
            tracing::warn!("Failed to delete item {} remotely: {}", item_id, e);
        }

        if self.collection.remove_item(item_id).is_some() {
            tracing::info!("Deleted item {} from {}", item_id, self.collection.block_id);
        }
        true
    }

    /// Persist the item editor's state and update the local item list
    ///
    /// On failure the local list is untouched and the error is returned;
    /// the editor remains usable for another attempt.
    pub async fn save_item(&mut self, editor: &ItemEditor) -> Result<Item, ServiceError> {
        let item = editor.finish();
        self.backend
            .upsert_item(&self.page, &self.collection.block_id, item.clone())
            .await?;

        self.collection.upsert_item(item.clone());
        tracing::debug!("Saved item {}", item.id);
        Ok(item)
    }
}

/// Modal editor for one item: a title field plus an independent block editor
/// over the item body
pub struct ItemEditor {
    item: Item,
    editor: EditorSession,
    title: String,
}

impl ItemEditor {
    pub fn open(item: Item) -> Self {
        let editor = EditorSession::new(serializer::body_document(item.content.body.as_ref()));
        let title = item.prop_str("Title").unwrap_or(DEFAULT_ITEM_TITLE).to_string();
        Self { item, editor, title }
    }

    pub fn item_id(&self) -> &str {
        &self.item.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn editor(&self) -> &EditorSession {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EditorSession {
        &mut self.editor
    }

    /// Apply an input event to the body editor
    pub fn handle(&mut self, event: EditorEvent) -> EditOutcome {
        self.editor.handle(event)
    }

    /// Set a property, checked against the collection schema
    pub fn set_prop(&mut self, schema: &Schema, name: &str, value: TypedValue) -> Result<(), ValidationError> {
        self.item.set_prop(schema, name, value)
    }

    /// The item as it would be saved: serialized body and the title field
    pub fn finish(&self) -> Item {
        let mut item = self.item.clone();
        item.content.body = Some(serializer::to_value(self.editor.document()));
        item.props
            .insert("Title".to_string(), PropertyValue::from(self.title.clone()));
        item
    }
}

#[cfg(test)]
#[path = "collection_service_test.rs"]
mod collection_service_test;
