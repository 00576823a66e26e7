//! Document Model
//!
//! A `Document` is the ordered sequence of blocks behind one page or one item
//! body. Order in the vector is the only ordering signal.
//!
//! # Invariants
//!
//! - A document is never empty: removing the last block synthesizes a single
//!   empty paragraph.
//! - Block ids are unique. Decoding repairs duplicates by assigning fresh ids.

use std::collections::HashSet;

use crate::models::block::{generate_block_id, Block, BlockType};

/// Where a dragged block lands relative to its drop target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    Above,
    Below,
}

/// Ordered, never-empty sequence of blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Document holding one empty paragraph
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::empty_paragraph()],
        }
    }

    /// Build a document from blocks, enforcing both invariants
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut seen = HashSet::with_capacity(blocks.len());
        let mut repaired = Vec::with_capacity(blocks.len());

        for mut block in blocks {
            if !seen.insert(block.id.clone()) {
                let fresh = generate_block_id();
                tracing::warn!("Duplicate block id '{}' reassigned to '{}'", block.id, fresh);
                block.id = fresh.clone();
                seen.insert(fresh);
            }
            repaired.push(block);
        }

        let mut document = Self { blocks: repaired };
        document.ensure_not_empty();
        document
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false for a well-formed document; kept for API symmetry
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn first(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn last(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    pub fn block_at(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn block_at_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    /// Insert `block` immediately after the block with `after_id`
    ///
    /// Appends when `after_id` is unknown. Returns the insertion index.
    pub fn insert_after(&mut self, after_id: &str, block: Block) -> usize {
        let index = self
            .index_of(after_id)
            .map(|i| i + 1)
            .unwrap_or(self.blocks.len());
        self.blocks.insert(index, block);
        index
    }

    /// Append a block at the end
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Remove a block by id
    ///
    /// If the document would become empty, an empty paragraph is synthesized.
    pub fn remove(&mut self, id: &str) -> Option<Block> {
        let index = self.index_of(id)?;
        let removed = self.blocks.remove(index);
        self.ensure_not_empty();
        Some(removed)
    }

    /// Replace the block with `id` by `replacement`, keeping its position
    pub fn replace(&mut self, id: &str, replacement: Block) -> Option<Block> {
        let index = self.index_of(id)?;
        Some(std::mem::replace(&mut self.blocks[index], replacement))
    }

    /// Relocate `dragged_id` above or below `target_id`
    ///
    /// Purely positional: levels are not adjusted. Returns false when either
    /// id is unknown or both name the same block.
    pub fn move_block(&mut self, dragged_id: &str, target_id: &str, position: DropPosition) -> bool {
        if dragged_id == target_id {
            return false;
        }
        let Some(from) = self.index_of(dragged_id) else {
            return false;
        };
        if self.index_of(target_id).is_none() {
            return false;
        }

        let block = self.blocks.remove(from);
        // Target index must be looked up again after removal
        let target = self.index_of(target_id).unwrap_or(self.blocks.len());
        let index = match position {
            DropPosition::Above => target,
            DropPosition::Below => target + 1,
        };
        self.blocks.insert(index.min(self.blocks.len()), block);
        true
    }

    /// Display ordinal for each numbered block, `None` for every other block
    ///
    /// Numbering restarts after any non-numbered block.
    pub fn numbered_positions(&self) -> Vec<Option<u32>> {
        let mut counter = 0;
        self.blocks
            .iter()
            .map(|block| {
                if block.block_type == BlockType::Numbered {
                    counter += 1;
                    Some(counter)
                } else {
                    counter = 0;
                    None
                }
            })
            .collect()
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    fn ensure_not_empty(&mut self) {
        if self.blocks.is_empty() {
            self.blocks.push(Block::empty_paragraph());
        }
    }
}

#[cfg(test)]
#[path = "document_test.rs"]
mod document_test;
