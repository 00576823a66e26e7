//! Board view: items grouped into columns by their `Status`

use indexmap::IndexMap;
use serde::Serialize;

use crate::models::{Item, Schema, ViewConfig, ViewType};
use crate::views::{
    display_of, format_date, item_actions, title_of, ItemAction, RenderContext, ViewProjection, ViewRenderer,
    DEFAULT_STATUS,
};

/// Columns always come from this property; a configured `groupProp` is not consulted
const GROUP_PROP: &str = "Status";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    pub group_prop: String,
    pub columns: Vec<BoardColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardColumn {
    pub label: String,
    pub count: usize,
    pub cards: Vec<BoardCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardCard {
    pub item_id: String,
    pub title: String,
    pub date: Option<String>,
    pub actions: Vec<ItemAction>,
}

impl BoardCard {
    fn from_item(item: &Item) -> Self {
        Self {
            item_id: item.id.clone(),
            title: title_of(item),
            date: item
                .prop_date("Date")
                .map(format_date)
                .or_else(|| display_of(item, "Date")),
            actions: item_actions(item),
        }
    }
}

pub struct BoardRenderer;

impl ViewRenderer for BoardRenderer {
    fn view_type(&self) -> ViewType {
        ViewType::Board
    }

    fn render_items(&self, _schema: &Schema, _config: &ViewConfig, items: &[Item], _ctx: &RenderContext) -> ViewProjection {

        // Columns appear in the order their first item does
        let mut groups: IndexMap<String, Vec<BoardCard>> = IndexMap::new();
        for item in items {
            let label = display_of(item, GROUP_PROP).unwrap_or_else(|| DEFAULT_STATUS.to_string());
            groups.entry(label).or_default().push(BoardCard::from_item(item));
        }

        let columns = groups
            .into_iter()
            .map(|(label, cards)| BoardColumn {
                label,
                count: cards.len(),
                cards,
            })
            .collect();

        ViewProjection::Board(BoardView {
            group_prop: GROUP_PROP.to_string(),
            columns,
        })
    }
}
