//! Page Service
//!
//! Page lifecycle on top of a [`PersistenceBackend`]: listing, opening a page
//! into an editor session wired to debounced saves, creating (including the
//! seeded welcome page), renaming and deleting.
//!
//! Opening a page must happen inside a tokio runtime, since the returned
//! [`PageSession`] owns the debouncers that persist its edits.

use std::sync::Arc;

use crate::config::WorkbenchConfig;
use crate::editor::{EditOutcome, EditorEvent, EditorSession};
use crate::models::{Block, BlockType, Document};
use crate::serializer;
use crate::services::backend::{PageRef, PageSummary, PageUpdate, PersistenceBackend};
use crate::services::debounce::{Debouncer, DocumentSaver, PageContentSink, PageTitleSink};
use crate::services::ServiceError;

/// Title of the seeded first page
pub const WELCOME_TITLE: &str = "Welcome to Workbench";

/// Title used when the welcome page cannot be seeded
pub const FALLBACK_PAGE_TITLE: &str = "New Page";

/// Title stored for blank renames
pub const UNTITLED_PAGE: &str = "Untitled";

/// Content of the welcome page
pub fn welcome_document() -> Document {
    let bullet = |text: &str| Block::new(BlockType::Bulleted, 1, text, false);
    Document::from_blocks(vec![
        Block::new(BlockType::Heading, 1, "Welcome to Workbench!", false),
        Block::paragraph("This is a Notion-style editor. Try these features:"),
        bullet("Press '/' to open the slash menu"),
        bullet("Use Ctrl+B for bold, Ctrl+I for italic, Ctrl+U for underline"),
        bullet("Press Enter to create new blocks"),
        bullet("Use Tab to indent blocks"),
        Block::new(BlockType::Checklist, 1, "Try different block types from the slash menu", false),
        Block::new(BlockType::Code, 1, "// Code blocks for snippets", false),
        Block::new(BlockType::Quote, 1, "Quote blocks for important text", false),
        Block::new(BlockType::Divider, 1, "", false),
    ])
}

/// Page operations against one backend
#[derive(Clone)]
pub struct PageService {
    backend: Arc<dyn PersistenceBackend>,
    config: WorkbenchConfig,
}

impl PageService {
    pub fn new(backend: Arc<dyn PersistenceBackend>, config: WorkbenchConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &Arc<dyn PersistenceBackend> {
        &self.backend
    }

    pub async fn list(&self, search: &str) -> Result<Vec<PageSummary>, ServiceError> {
        self.backend.list_pages(search).await
    }

    /// Load a page and bind an editor session to it
    ///
    /// Unreadable content opens as a single empty paragraph. Saves continue
    /// numbering from the page's stored revision.
    pub async fn open(&self, name: &str) -> Result<PageSession, ServiceError> {
        let page = self.backend.get_page(name).await?;
        tracing::info!("Opened page {} ({})", page.name, page.title);

        let saver = DocumentSaver::new(
            self.config.save_debounce(),
            Arc::new(PageContentSink::new(self.backend.clone(), page.name.clone())),
        );
        let mut editor = EditorSession::with_save_queue(page.document(), Arc::new(saver));
        editor.set_revision(page.revision);

        let titles = Debouncer::<String>::spawn(
            self.config.title_debounce(),
            Arc::new(PageTitleSink::new(self.backend.clone(), page.name.clone())),
        );

        Ok(PageSession {
            name: page.name,
            title: page.title,
            editor,
            titles,
        })
    }

    pub async fn create(&self, title: &str) -> Result<PageRef, ServiceError> {
        let reference = self.backend.create_page(title).await?;
        tracing::info!("Created page {}", reference.name);
        Ok(reference)
    }

    /// Create and open the welcome page
    ///
    /// If seeding fails, a plain page titled "New Page" is created instead.
    pub async fn create_welcome(&self) -> Result<PageSession, ServiceError> {
        match self.seed_welcome().await {
            Ok(name) => self.open(&name).await,
            Err(e) => {
                tracing::warn!("Could not create welcome page, creating a blank one: {}", e);
                let reference = self.create(FALLBACK_PAGE_TITLE).await?;
                self.open(&reference.name).await
            }
        }
    }

    async fn seed_welcome(&self) -> Result<String, ServiceError> {
        let reference = self.create(WELCOME_TITLE).await?;
        let content = serializer::serialize(&welcome_document());
        self.backend
            .update_page(&reference.name, PageUpdate::content(content, 1))
            .await?;
        Ok(reference.name)
    }

    /// Open the first listed page, or the welcome page when there is none
    pub async fn open_first_or_welcome(&self) -> Result<PageSession, ServiceError> {
        match self.list("").await?.first() {
            Some(first) => self.open(&first.name).await,
            None => self.create_welcome().await,
        }
    }

    pub async fn delete(&self, name: &str) -> Result<(), ServiceError> {
        self.backend.delete_page(name).await
    }
}

/// An open page: its editor plus debounced content and title persistence
pub struct PageSession {
    name: String,
    title: String,
    editor: EditorSession,
    titles: Debouncer<String>,
}

impl PageSession {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn editor(&self) -> &EditorSession {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EditorSession {
        &mut self.editor
    }

    pub fn document(&self) -> &Document {
        self.editor.document()
    }

    /// Apply an input event to the page editor
    pub fn handle(&mut self, event: EditorEvent) -> EditOutcome {
        self.editor.handle(event)
    }

    /// Rename the page; blank titles become "Untitled"
    ///
    /// The new title is persisted after the title debounce window.
    pub fn rename(&mut self, title: &str) -> &str {
        self.title = match title.trim() {
            "" => UNTITLED_PAGE.to_string(),
            trimmed => trimmed.to_string(),
        };
        self.titles.push(self.title.clone());
        &self.title
    }
}
