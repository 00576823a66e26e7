//! Block Behavior System
//!
//! This module provides the trait-based behavior system for the block types:
//!
//! - `BlockBehavior` trait - Type-specific rendering, content extraction and
//!   continuation rules
//! - Built-in behaviors, one per [`BlockType`] variant
//! - `BlockBehaviorRegistry` - Lookup table from type to behavior, built once
//!
//! Render, serialize and Enter/paste handling all dispatch through the
//! registry instead of matching on the type at each call site.
//!
//! # Examples
//!
//! ```rust
//! use workbench_core::behaviors::render_inline;
//! use workbench_core::models::BlockType;
//!
//! let html = render_inline(BlockType::Bulleted, 1, "Milk", false);
//! assert_eq!(html, r#"<ul class="wb-ul"><li contenteditable="true" tabindex="0">Milk</li></ul>"#);
//! ```

mod builtin;

pub use builtin::{
    BulletedBehavior, ChecklistBehavior, CodeBehavior, DividerBehavior, EmbedBehavior,
    HeadingBehavior, ImageBehavior, NumberedBehavior, ParagraphBehavior, QuoteBehavior,
};

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::models::{Block, BlockType};

/// Per-type block behavior
pub trait BlockBehavior: Send + Sync {
    /// The variant this behavior handles
    fn block_type(&self) -> BlockType;

    /// Type-appropriate content fragment for the given block fields
    ///
    /// `text` is already marked-up and is emitted as-is.
    fn render_inline(&self, level: u32, text: &str, checked: bool) -> String;

    /// Type of the block created when Enter splits this block, or when a
    /// multi-line paste continues past it
    fn continuation_type(&self) -> BlockType {
        BlockType::Paragraph
    }

    /// Whether an empty block of this type outdents/demotes on Enter
    fn is_list_like(&self) -> bool {
        false
    }

    /// Whether the block holds caret-editable text
    fn is_editable(&self) -> bool {
        true
    }

    /// The `(text, checked)` pair persisted for this block
    fn authoritative_content(&self, block: &Block) -> (String, bool) {
        (block.text.clone(), false)
    }
}

/// Registry mapping block types to their behaviors
pub struct BlockBehaviorRegistry {
    behaviors: HashMap<BlockType, Arc<dyn BlockBehavior>>,
}

impl Default for BlockBehaviorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockBehaviorRegistry {
    /// Registry holding every built-in behavior
    pub fn new() -> Self {
        let mut registry = Self {
            behaviors: HashMap::new(),
        };
        registry.register(Arc::new(ParagraphBehavior));
        registry.register(Arc::new(HeadingBehavior));
        registry.register(Arc::new(BulletedBehavior));
        registry.register(Arc::new(NumberedBehavior));
        registry.register(Arc::new(ChecklistBehavior));
        registry.register(Arc::new(CodeBehavior));
        registry.register(Arc::new(QuoteBehavior));
        registry.register(Arc::new(DividerBehavior));
        registry.register(Arc::new(ImageBehavior));
        registry.register(Arc::new(EmbedBehavior));
        registry
    }

    /// Register (or replace) the behavior for its block type
    pub fn register(&mut self, behavior: Arc<dyn BlockBehavior>) {
        self.behaviors.insert(behavior.block_type(), behavior);
    }

    /// Behavior for `block_type`, falling back to paragraph
    pub fn get(&self, block_type: BlockType) -> &dyn BlockBehavior {
        match self.behaviors.get(&block_type) {
            Some(behavior) => behavior.as_ref(),
            None => &ParagraphBehavior,
        }
    }
}

static REGISTRY: LazyLock<BlockBehaviorRegistry> = LazyLock::new(BlockBehaviorRegistry::new);

/// Shared built-in registry
pub fn registry() -> &'static BlockBehaviorRegistry {
    &REGISTRY
}

/// Behavior for a block type from the shared registry
pub fn behavior(block_type: BlockType) -> &'static dyn BlockBehavior {
    REGISTRY.get(block_type)
}

/// Render a block's content fragment from its fields
pub fn render_inline(block_type: BlockType, level: u32, text: &str, checked: bool) -> String {
    behavior(block_type).render_inline(level, text, checked)
}

/// Render a block's content fragment
pub fn render_block(block: &Block) -> String {
    render_inline(block.block_type, block.level, &block.text, block.checked)
}
