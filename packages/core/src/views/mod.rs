//! Collection View Renderers
//!
//! Each view is a pure function from `(schema, config, items)` to a typed
//! projection that a host surface can draw. Every projection carries the
//! per-item Edit/Delete actions, and an empty item list always produces the
//! view's [`EmptyState`] instead.
//!
//! # Architecture
//!
//! - `ViewRenderer` trait - one implementation per [`ViewType`]
//! - `ViewRegistry` - lookup table from view type to renderer, built once
//! - [`RenderContext`] - the date treated as today plus timeline sizing, so
//!   rendering never reads the clock
//!
//! # Examples
//!
//! ```rust
//! use chrono::NaiveDate;
//! use workbench_core::models::{Schema, ViewConfig, ViewType};
//! use workbench_core::views::{render_view, RenderContext, ViewProjection};
//!
//! let ctx = RenderContext::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
//! let projection = render_view(ViewType::Board, &Schema::new(), &ViewConfig::default(), &[], &ctx);
//!
//! match projection {
//!     ViewProjection::Empty(empty) => assert_eq!(empty.text, "No items yet"),
//!     other => panic!("unexpected projection: {:?}", other),
//! }
//! ```

mod board;
mod calendar;
mod gallery;
mod list;
mod table;
mod timeline;

pub use board::{BoardCard, BoardColumn, BoardRenderer, BoardView};
pub use calendar::{CalendarDay, CalendarEntry, CalendarRenderer, CalendarView};
pub use gallery::{GalleryCard, GalleryRenderer, GalleryView};
pub use list::{ListRenderer, ListRow, ListView};
pub use table::{TableCell, TableColumn, TableRenderer, TableRow, TableView};
pub use timeline::{TimelineEntry, TimelineRenderer, TimelineShape, TimelineView};

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::config::WorkbenchConfig;
use crate::models::{Item, Schema, ViewConfig, ViewType};

/// Title shown for items without one
pub const UNTITLED: &str = "Untitled";

/// Status shown for items without one
pub const DEFAULT_STATUS: &str = "Not started";

/// Inputs to rendering that do not come from the collection itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    /// Date treated as today (selects the calendar month)
    pub today: NaiveDate,

    pub px_per_day: u32,

    pub max_bar_px: u32,
}

impl RenderContext {
    pub fn new(today: NaiveDate) -> Self {
        Self::from_config(&WorkbenchConfig::default(), today)
    }

    pub fn from_config(config: &WorkbenchConfig, today: NaiveDate) -> Self {
        Self {
            today,
            px_per_day: config.timeline_px_per_day,
            max_bar_px: config.timeline_max_bar_px,
        }
    }
}

/// Per-item affordance routed to the shared item operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "item_id", rename_all = "lowercase")]
pub enum ItemAction {
    Edit(String),
    Delete(String),
}

/// Edit and Delete actions for one item
pub fn item_actions(item: &Item) -> Vec<ItemAction> {
    vec![ItemAction::Edit(item.id.clone()), ItemAction::Delete(item.id.clone())]
}

/// Placeholder shown when a collection has no items
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    pub view: ViewType,
    pub icon: &'static str,
    pub text: &'static str,
    pub subtext: &'static str,
}

impl EmptyState {
    pub fn for_view(view: ViewType) -> Self {
        Self {
            view,
            icon: view.icon(),
            text: "No items yet",
            subtext: "Click \"New\" to create your first item",
        }
    }
}

/// Output of a view renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ViewProjection {
    Table(TableView),
    Board(BoardView),
    Calendar(CalendarView),
    Gallery(GalleryView),
    Timeline(TimelineView),
    List(ListView),
    Empty(EmptyState),
}

impl ViewProjection {
    pub fn is_empty_state(&self) -> bool {
        matches!(self, Self::Empty(_))
    }
}

/// Renders one view type
pub trait ViewRenderer: Send + Sync {
    fn view_type(&self) -> ViewType;

    /// Projection for a non-empty item list
    fn render_items(&self, schema: &Schema, config: &ViewConfig, items: &[Item], ctx: &RenderContext) -> ViewProjection;

    /// Projection for any item list, empty lists yielding the empty state
    fn render(&self, schema: &Schema, config: &ViewConfig, items: &[Item], ctx: &RenderContext) -> ViewProjection {
        if items.is_empty() {
            ViewProjection::Empty(EmptyState::for_view(self.view_type()))
        } else {
            self.render_items(schema, config, items, ctx)
        }
    }
}

/// Registry mapping view types to their renderers
pub struct ViewRegistry {
    renderers: HashMap<ViewType, Arc<dyn ViewRenderer>>,
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            renderers: HashMap::new(),
        };
        registry.register(Arc::new(TableRenderer));
        registry.register(Arc::new(BoardRenderer));
        registry.register(Arc::new(CalendarRenderer));
        registry.register(Arc::new(GalleryRenderer));
        registry.register(Arc::new(TimelineRenderer));
        registry.register(Arc::new(ListRenderer));
        registry
    }

    pub fn register(&mut self, renderer: Arc<dyn ViewRenderer>) {
        self.renderers.insert(renderer.view_type(), renderer);
    }

    /// Renderer for `view`, falling back to the table renderer
    pub fn get(&self, view: ViewType) -> &dyn ViewRenderer {
        match self.renderers.get(&view) {
            Some(renderer) => renderer.as_ref(),
            None => &TableRenderer,
        }
    }
}

static REGISTRY: LazyLock<ViewRegistry> = LazyLock::new(ViewRegistry::new);

/// Render a view through the shared registry
pub fn render_view(
    view: ViewType,
    schema: &Schema,
    config: &ViewConfig,
    items: &[Item],
    ctx: &RenderContext,
) -> ViewProjection {
    REGISTRY.get(view).render(schema, config, items, ctx)
}

// ============================================================================
// Shared item accessors
// ============================================================================

pub(crate) fn title_of(item: &Item) -> String {
    item.prop_str("Title").unwrap_or(UNTITLED).to_string()
}

pub(crate) fn status_of(item: &Item) -> String {
    item.prop_str("Status").unwrap_or(DEFAULT_STATUS).to_string()
}

/// Non-empty display value of a property
pub(crate) fn display_of(item: &Item, name: &str) -> Option<String> {
    item.prop(name)
        .filter(|value| !value.is_empty())
        .map(|value| value.display())
}

/// Short numeric date, e.g. `3/9/2024`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}


#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::{Item, PropertyValue};

    /// Item with textual props, in the given order
    pub fn item(id: &str, props: &[(&str, &str)]) -> Item {
        Item {
            id: id.to_string(),
            props: props
                .iter()
                .map(|(k, v)| (k.to_string(), PropertyValue::from(*v)))
                .collect(),
            content: Default::default(),
            position: 0,
        }
    }
}
