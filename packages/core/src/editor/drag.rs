//! Drag-to-reorder state

use crate::models::DropPosition;

/// Insertion indicator shown while dragging over a block
#[derive(Debug, Clone, PartialEq)]
pub struct DropIndicator {
    pub target_id: String,
    pub position: DropPosition,
}

/// Pointer in the upper half of the target drops above it, otherwise below
pub fn drop_position(pointer_y: f64, target_top: f64, target_height: f64) -> DropPosition {
    if pointer_y < target_top + target_height / 2.0 {
        DropPosition::Above
    } else {
        DropPosition::Below
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragState {
    dragged: Option<String>,
    indicator: Option<DropIndicator>,
}

impl DragState {
    pub fn start(&mut self, block_id: impl Into<String>) {
        self.dragged = Some(block_id.into());
        self.indicator = None;
    }

    pub fn dragged(&self) -> Option<&str> {
        self.dragged.as_deref()
    }

    pub fn indicator(&self) -> Option<&DropIndicator> {
        self.indicator.as_ref()
    }

    /// Update the indicator; dragging over the dragged block itself clears it
    pub fn hover(&mut self, target_id: &str, position: DropPosition) {
        self.indicator = match self.dragged.as_deref() {
            Some(dragged) if dragged != target_id => Some(DropIndicator {
                target_id: target_id.to_string(),
                position,
            }),
            _ => None,
        };
    }

    /// Position last indicated for `target_id`
    pub fn position_for(&self, target_id: &str) -> Option<DropPosition> {
        self.indicator
            .as_ref()
            .filter(|indicator| indicator.target_id == target_id)
            .map(|indicator| indicator.position)
    }

    pub fn clear(&mut self) {
        self.dragged = None;
        self.indicator = None;
    }
}
