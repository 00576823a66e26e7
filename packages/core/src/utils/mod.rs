//! Utility functions for Workbench Core
//!
//! This module provides common utility functions used across the codebase.

mod markup;

pub use markup::{
    blocks_from_lines, byte_index, char_len, delete_before_char, escape_attribute, escape_text,
    insert_at_char, is_blank, plain_text, snap_to_boundary, split_at_char,
};
