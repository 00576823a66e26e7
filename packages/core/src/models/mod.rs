//! Data Models
//!
//! This module contains the core data structures used throughout Workbench:
//!
//! - `Block` / `Document` - Typed content blocks and the ordered page body
//! - `Collection` / `Schema` - Inline collections and their property schema
//! - `Item` - Structured records with schema-keyed properties
//! - `ViewType` / `ViewConfig` - The six collection views and their settings

mod block;
mod collection;
mod document;
mod item;
mod view;

pub use block::{generate_block_id, Block, BlockType, BLOCK_ID_PREFIX};
pub use collection::{
    generate_collection_id, Collection, PropertyDefinition, PropertyType, Schema, COLLECTION_ID_PREFIX,
};
pub use document::{Document, DropPosition};
pub use item::{
    generate_item_id, parse_date, Item, ItemContent, PropertyValue, TypedValue, ValidationError,
    DEFAULT_ITEM_TITLE, ITEM_ID_PREFIX,
};
pub use view::{ConfigKey, ViewConfig, ViewType};
