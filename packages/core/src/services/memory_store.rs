//! In-memory persistence
//!
//! A process-local [`PersistenceBackend`]. Content writes carry revisions and
//! a write older than the last applied one is rejected with
//! [`ServiceError::StaleWrite`], so a slow save that lands after a newer one
//! cannot roll a page back. State can be exported as a [`StoreSnapshot`] and
//! restored later.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Item, Schema, ViewConfig};
use crate::serializer::{self, PersistedDocument};
use crate::services::backend::{
    CollectionRecord, CollectionUpsert, Page, PageRef, PageSummary, PageUpdate, PersistenceBackend,
};
use crate::services::ServiceError;

/// Title stored when a page is renamed to a blank title
const FALLBACK_TITLE: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPage {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<PersistedDocument>,
    #[serde(default)]
    pub revision: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoredCollection {
    pub page: String,
    pub block_id: String,
    #[serde(default)]
    pub schema: Schema,
    #[serde(default)]
    pub config: ViewConfig,
    #[serde(default)]
    pub filters: Vec<Value>,
    #[serde(default)]
    pub sorts: Vec<Value>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl StoredCollection {
    fn record(&self) -> CollectionRecord {
        CollectionRecord {
            schema: self.schema.clone(),
            config: self.config.clone(),
            filters: self.filters.clone(),
            sorts: self.sorts.clone(),
        }
    }
}

/// Serializable store contents
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub pages: IndexMap<String, StoredPage>,
    #[serde(default)]
    pub collections: Vec<StoredCollection>,
}

impl StoreSnapshot {
    fn collection(&self, page: &str, block_id: &str) -> Option<&StoredCollection> {
        self.collections
            .iter()
            .find(|c| c.page == page && c.block_id == block_id)
    }

    fn collection_mut(&mut self, page: &str, block_id: &str) -> Option<&mut StoredCollection> {
        self.collections
            .iter_mut()
            .find(|c| c.page == page && c.block_id == block_id)
    }
}

fn generate_page_name() -> String {
    Uuid::new_v4().simple().to_string()[..10].to_string()
}

/// Process-local [`PersistenceBackend`]
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: RwLock<StoreSnapshot>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.clone()
    }

    pub async fn restore(&self, snapshot: StoreSnapshot) {
        *self.state.write().await = snapshot;
    }
}

#[async_trait]
impl PersistenceBackend for InMemoryBackend {
    async fn list_pages(&self, search: &str) -> Result<Vec<PageSummary>, ServiceError> {
        let needle = search.trim().to_lowercase();
        let state = self.state.read().await;
        Ok(state
            .pages
            .values()
            .filter(|page| needle.is_empty() || page.title.to_lowercase().contains(&needle))
            .map(|page| PageSummary {
                name: page.name.clone(),
                title: page.title.clone(),
            })
            .collect())
    }

    async fn get_page(&self, name: &str) -> Result<Page, ServiceError> {
        let state = self.state.read().await;
        let page = state
            .pages
            .get(name)
            .ok_or_else(|| ServiceError::not_found(format!("page {}", name)))?;
        Ok(Page {
            name: page.name.clone(),
            title: page.title.clone(),
            content: page.content.as_ref().map(serde_json::to_value).transpose()?,
            revision: page.revision,
        })
    }

    async fn create_page(&self, title: &str) -> Result<PageRef, ServiceError> {
        let name = generate_page_name();
        let title = match title.trim() {
            "" => FALLBACK_TITLE.to_string(),
            trimmed => trimmed.to_string(),
        };
        tracing::info!("Created page {} ({})", name, title);

        self.state.write().await.pages.insert(
            name.clone(),
            StoredPage {
                name: name.clone(),
                title,
                content: None,
                revision: 0,
            },
        );
        Ok(PageRef { name })
    }

    async fn update_page(&self, name: &str, update: PageUpdate) -> Result<PageRef, ServiceError> {
        let mut state = self.state.write().await;
        let page = state
            .pages
            .get_mut(name)
            .ok_or_else(|| ServiceError::not_found(format!("page {}", name)))?;

        if let Some(content) = update.content {
            let revision = update.revision.unwrap_or(page.revision);
            if revision < page.revision {
                return Err(ServiceError::stale_write(format!("page {}", name), revision, page.revision));
            }
            // Stored content is re-encoded from its decoded form
            let document = serializer::deserialize(Some(&content));
            page.content = Some(serializer::serialize(&document));
            page.revision = revision;
        }
        if let Some(title) = update.title {
            page.title = match title.trim() {
                "" => FALLBACK_TITLE.to_string(),
                trimmed => trimmed.to_string(),
            };
        }

        Ok(PageRef { name: name.to_string() })
    }

    async fn delete_page(&self, name: &str) -> Result<(), ServiceError> {
        let mut state = self.state.write().await;
        state
            .pages
            .shift_remove(name)
            .ok_or_else(|| ServiceError::not_found(format!("page {}", name)))?;
        state.collections.retain(|c| c.page != name);
        tracing::info!("Deleted page {}", name);
        Ok(())
    }

    async fn upsert_collection(
        &self,
        page: &str,
        block_id: &str,
        upsert: CollectionUpsert,
    ) -> Result<CollectionRecord, ServiceError> {
        let mut state = self.state.write().await;
        if state.collection(page, block_id).is_none() {
            state.collections.push(StoredCollection {
                page: page.to_string(),
                block_id: block_id.to_string(),
                ..Default::default()
            });
        }
        let collection = state
            .collection_mut(page, block_id)
            .ok_or_else(|| ServiceError::not_found(format!("collection {}", block_id)))?;

        if let Some(schema) = upsert.schema {
            collection.schema = schema;
        }
        if let Some(config) = upsert.config {
            collection.config = config;
        }
        if let Some(filters) = upsert.filters {
            collection.filters = filters;
        }
        if let Some(sorts) = upsert.sorts {
            collection.sorts = sorts;
        }

        Ok(collection.record())
    }

    async fn query_items(
        &self,
        page: &str,
        block_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Item>, ServiceError> {
        let state = self.state.read().await;
        let Some(collection) = state.collection(page, block_id) else {
            return Ok(Vec::new());
        };

        let mut items = collection.items.clone();
        // Stable: equal positions keep insertion order
        items.sort_by_key(|item| item.position);
        Ok(items.into_iter().skip(offset).take(limit).collect())
    }

    async fn upsert_item(&self, page: &str, block_id: &str, item: Item) -> Result<Item, ServiceError> {
        let mut state = self.state.write().await;
        let collection = state
            .collection_mut(page, block_id)
            .ok_or_else(|| ServiceError::not_found(format!("collection {}", block_id)))?;

        match collection.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item.clone(),
            None => collection.items.push(item.clone()),
        }
        Ok(item)
    }

    async fn delete_item(&self, page: &str, block_id: &str, item_id: &str) -> Result<(), ServiceError> {
        let mut state = self.state.write().await;
        let collection = state
            .collection_mut(page, block_id)
            .ok_or_else(|| ServiceError::not_found(format!("collection {}", block_id)))?;

        let before = collection.items.len();
        collection.items.retain(|item| item.id != item_id);
        if collection.items.len() == before {
            return Err(ServiceError::not_found(format!("item {}", item_id)));
        }
        Ok(())
    }
}
