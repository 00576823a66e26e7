//! Workbench Core Editing and Collection Layer
//!
//! This crate provides the block document model, the in-place editing state
//! machine, and the inline collection view engine for the Workbench page
//! editor.
//!
//! # Architecture
//!
//! - **Typed Blocks**: A page is an ordered sequence of typed blocks; block
//!   types dispatch through a behavior registry built once
//! - **Editor Sessions**: One `EditorSession` per editing surface (page or
//!   item modal), never shared
//! - **Full-State Saves**: Every save carries the whole serialized document
//!   plus a revision, debounced before it reaches persistence
//! - **Schema-Driven Views**: Six renderers project `(schema, config, items)`
//!   into typed view models; switching views remaps config from the schema
//!
//! # Modules
//!
//! - [`models`] - Data structures (Block, Document, Collection, Item, ...)
//! - [`behaviors`] - Block type system and per-type behaviors
//! - [`editor`] - Cursor protocol, input events and the editing engine
//! - [`serializer`] - Persisted document form
//! - [`views`] - Collection view renderers
//! - [`services`] - Persistence boundary, pages and collections
//! - [`config`] - Runtime settings

pub mod behaviors;
pub mod config;
pub mod editor;
pub mod models;
pub mod serializer;
pub mod services;
pub mod utils;
pub mod views;

// Re-export commonly used types
pub use behaviors::*;
pub use config::{ConfigError, WorkbenchConfig};
pub use editor::{EditOutcome, EditorEvent, EditorSession};
pub use models::*;
pub use services::*;
pub use views::{render_view, RenderContext, ViewProjection};
