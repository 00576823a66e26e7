//! Business Services
//!
//! This module contains the services that sit between the editing core and
//! persistence:
//!
//! - `PersistenceBackend` - The page and collection persistence boundary
//! - `RpcBackend` - Boundary implementation over an HTTP/RPC transport
//! - `InMemoryBackend` - Boundary implementation held in memory, snapshot-able
//! - `Debouncer` - Coalesces bursts of saves into one flush of the latest
//! - `PageService` - Page lifecycle and editor sessions bound to pages
//! - `CollectionSession` - Inline collection loading, view switching and item CRUD
//!
//! Local state stays the source of truth whenever a persistence call fails.

pub mod backend;
pub mod collection_config;
pub mod collection_service;
pub mod debounce;
pub mod error;
pub mod memory_store;
pub mod page_service;
pub mod rpc;

pub use backend::{
    CollectionRecord, CollectionUpsert, Page, PageRef, PageSummary, PageUpdate, PersistenceBackend,
};
pub use collection_config::{default_config, default_schema, needs_config_remap, remap_config};
pub use collection_service::{CollectionSession, ConfirmPrompt, ItemEditor, DELETE_ITEM_PROMPT};
pub use debounce::{Debouncer, DocumentSaver, FlushSink, PageContentSink, PageTitleSink, PendingSave};
pub use error::ServiceError;
pub use memory_store::{InMemoryBackend, StoreSnapshot};
pub use page_service::{welcome_document, PageService, PageSession, UNTITLED_PAGE, WELCOME_TITLE};
pub use rpc::{HttpMethod, RpcBackend, RpcRequest, RpcTransport};
