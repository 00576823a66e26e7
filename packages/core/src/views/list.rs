//! List view: one compact row per item

use serde::Serialize;

use crate::models::{Item, Schema, ViewConfig, ViewType};
use crate::views::{
    display_of, item_actions, status_of, title_of, ItemAction, RenderContext, ViewProjection, ViewRenderer,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView {
    pub rows: Vec<ListRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRow {
    pub item_id: String,
    pub title: String,
    pub status: String,
    pub date: Option<String>,
    pub actions: Vec<ItemAction>,
}

pub struct ListRenderer;

impl ViewRenderer for ListRenderer {
    fn view_type(&self) -> ViewType {
        ViewType::List
    }

    fn render_items(&self, _schema: &Schema, _config: &ViewConfig, items: &[Item], _ctx: &RenderContext) -> ViewProjection {
        ViewProjection::List(ListView {
            rows: items
                .iter()
                .map(|item| ListRow {
                    item_id: item.id.clone(),
                    title: title_of(item),
                    status: status_of(item),
                    date: display_of(item, "Date"),
                    actions: item_actions(item),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::test_support::item;
    use chrono::NaiveDate;

    #[test]
    fn test_rows_keep_item_order() {
        let ctx = RenderContext::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let items = vec![
            item("a", &[("Title", "First"), ("Status", "Done"), ("Date", "2024-01-02")]),
            item("b", &[]),
        ];

        let ViewProjection::List(list) = ListRenderer.render(&Schema::new(), &ViewConfig::default(), &items, &ctx) else {
            panic!("expected list");
        };

        let rows: Vec<(&str, &str, Option<&str>)> = list
            .rows
            .iter()
            .map(|r| (r.title.as_str(), r.status.as_str(), r.date.as_deref()))
            .collect();
        assert_eq!(
            rows,
            vec![("First", "Done", Some("2024-01-02")), ("Untitled", "Not started", None)]
        );
        assert_eq!(list.rows[1].actions[1], ItemAction::Delete("b".into()));
    }
}
