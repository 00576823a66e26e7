//! PersistenceBackend Trait - Storage Abstraction Layer
//!
//! The page and collection services reach storage only through
//! [`PersistenceBackend`]. Two implementations ship with the crate:
//!
//! - [`RpcBackend`](crate::services::RpcBackend) - remote calls over an
//!   abstract transport, with anti-forgery token and error-envelope checks
//! - [`InMemoryBackend`](crate::services::InMemoryBackend) - process-local
//!   store with snapshot/restore and stale-revision rejection
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use workbench_core::services::{InMemoryBackend, PersistenceBackend};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend: Arc<dyn PersistenceBackend> = Arc::new(InMemoryBackend::new());
//!     let page = backend.create_page("Notes").await?;
//!     let loaded = backend.get_page(&page.name).await?;
//!     assert_eq!(loaded.title, "Notes");
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Collection, Document, Item, Schema, ViewConfig};
use crate::serializer::{self, PersistedDocument};
use crate::services::ServiceError;

/// Sidebar entry for a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub name: String,

    #[serde(default)]
    pub title: String,
}

/// A page with its persisted content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub name: String,

    #[serde(default)]
    pub title: String,

    /// Persisted document as stored: an object, a JSON string, or absent
    #[serde(default, alias = "content_json")]
    pub content: Option<Value>,

    /// Last applied content revision; stores without revisions report 0
    #[serde(default)]
    pub revision: u64,
}

impl Page {
    /// Decode the page content, tolerating absent or malformed content
    pub fn document(&self) -> Document {
        match &self.content {
            Some(content) => serializer::from_value(content),
            None => Document::new(),
        }
    }
}

/// Reference to a created or updated page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    pub name: String,
}

/// Partial page update
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageUpdate {
    pub title: Option<String>,
    pub content: Option<PersistedDocument>,
    /// Revision of `content`; title-only updates carry none
    pub revision: Option<u64>,
}

impl PageUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn content(content: PersistedDocument, revision: u64) -> Self {
        Self {
            content: Some(content),
            revision: Some(revision),
            ..Default::default()
        }
    }
}

/// Collection create/update request
///
/// `None` fields leave the stored value unchanged, so an all-`None` upsert
/// loads the collection (creating an empty one if needed).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectionUpsert {
    pub schema: Option<Schema>,
    pub config: Option<ViewConfig>,
    pub filters: Option<Vec<Value>>,
    pub sorts: Option<Vec<Value>>,
}

impl CollectionUpsert {
    /// Upsert that only reads back the stored collection
    pub fn load() -> Self {
        Self::default()
    }

    pub fn create(schema: Schema, config: ViewConfig) -> Self {
        Self {
            schema: Some(schema),
            config: Some(config),
            filters: Some(Vec::new()),
            sorts: Some(Vec::new()),
        }
    }

    /// Write back the current schema, config, filters and sorts
    pub fn from_collection(collection: &Collection) -> Self {
        Self {
            schema: Some(collection.schema.clone()),
            config: Some(collection.config.clone()),
            filters: Some(collection.filters.clone()),
            sorts: Some(collection.sorts.clone()),
        }
    }
}

/// Stored collection definition returned by an upsert
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectionRecord {
    #[serde(default)]
    pub schema: Schema,

    #[serde(default)]
    pub config: ViewConfig,

    #[serde(default)]
    pub filters: Vec<Value>,

    #[serde(default)]
    pub sorts: Vec<Value>,
}

/// Abstraction over page and collection persistence
///
/// Every method is a single round trip. Implementations surface remote
/// failures as errors and never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    //
    // PAGES
    //

    /// Pages whose title contains `search` (all pages for an empty search)
    async fn list_pages(&self, search: &str) -> Result<Vec<PageSummary>, ServiceError>;

    async fn get_page(&self, name: &str) -> Result<Page, ServiceError>;

    async fn create_page(&self, title: &str) -> Result<PageRef, ServiceError>;

    /// Apply a partial update
    ///
    /// # Errors
    ///
    /// `ServiceError::StaleWrite` when the store tracks revisions and
    /// `update.revision` is older than the last applied one.
    async fn update_page(&self, name: &str, update: PageUpdate) -> Result<PageRef, ServiceError>;

    async fn delete_page(&self, name: &str) -> Result<(), ServiceError>;

    //
    // COLLECTIONS
    //

    /// Create or update the collection identified by `(page, block_id)`
    async fn upsert_collection(
        &self,
        page: &str,
        block_id: &str,
        upsert: CollectionUpsert,
    ) -> Result<CollectionRecord, ServiceError>;

    /// Items ordered by position, paged by `limit`/`offset`
    async fn query_items(
        &self,
        page: &str,
        block_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Item>, ServiceError>;

    async fn upsert_item(&self, page: &str, block_id: &str, item: Item) -> Result<Item, ServiceError>;

    async fn delete_item(&self, page: &str, block_id: &str, item_id: &str) -> Result<(), ServiceError>;
}
