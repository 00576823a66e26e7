//! Table view: one row per item, one cell per visible column

use serde::Serialize;

use crate::models::{Item, PropertyType, PropertyValue, Schema, ViewConfig, ViewType};
use crate::views::{format_date, item_actions, ItemAction, RenderContext, ViewProjection, ViewRenderer};

/// Number of schema properties shown when no columns are configured
const DEFAULT_COLUMN_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableColumn {
    pub name: String,
    pub property_type: PropertyType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub item_id: String,
    pub cells: Vec<TableCell>,
    pub actions: Vec<ItemAction>,
}

/// A formatted cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TableCell {
    Empty,
    Text(String),
    /// Single select value
    Chip(String),
    /// Multi-select values
    Chips(Vec<String>),
    /// Date formatted for display
    Date(String),
    /// File reference label
    File(String),
}

impl TableCell {
    /// Format a value according to its column type
    pub fn format(value: Option<&PropertyValue>, property_type: PropertyType) -> Self {
        let Some(value) = value.filter(|value| !value.is_empty()) else {
            return Self::Empty;
        };
        match property_type {
            PropertyType::Select => Self::Chip(value.display()),
            PropertyType::MultiSelect => Self::Chips(value.values()),
            PropertyType::Date => match value.as_date() {
                Some(date) => Self::Date(format_date(date)),
                None => Self::Text(value.display()),
            },
            PropertyType::File => Self::File(format!("📎 {}", value.display())),
            PropertyType::Title | PropertyType::Text => Self::Text(value.display()),
        }
    }
}

pub struct TableRenderer;

impl TableRenderer {
    /// Configured columns, or the first schema properties
    fn columns(schema: &Schema, config: &ViewConfig) -> Vec<TableColumn> {
        let names: Vec<String> = match &config.visible_cols {
            Some(cols) => cols.clone(),
            None => schema
                .keys()
                .take(DEFAULT_COLUMN_COUNT)
                .map(String::from)
                .collect(),
        };
        names
            .into_iter()
            .map(|name| TableColumn {
                property_type: schema.type_of(&name).unwrap_or_default(),
                name,
            })
            .collect()
    }
}

impl ViewRenderer for TableRenderer {
    fn view_type(&self) -> ViewType {
        ViewType::Table
    }

    fn render_items(&self, schema: &Schema, config: &ViewConfig, items: &[Item], _ctx: &RenderContext) -> ViewProjection {
        let columns = Self::columns(schema, config);
        let rows = items
            .iter()
            .map(|item| TableRow {
                item_id: item.id.clone(),
                cells: columns
                    .iter()
                    .map(|column| TableCell::format(item.prop(&column.name), column.property_type))
                    .collect(),
                actions: item_actions(item),
            })
            .collect();

        ViewProjection::Table(TableView { columns, rows })
    }
}
