//! Gallery view: one card per item with an image slot

use serde::Serialize;

use crate::models::{ConfigKey, Item, Schema, ViewConfig, ViewType};
use crate::views::{
    display_of, item_actions, status_of, title_of, ItemAction, RenderContext, ViewProjection, ViewRenderer,
};

/// Image slot content when an item has no cover
pub const COVER_PLACEHOLDER: &str = "📄";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryView {
    pub cover_prop: Option<String>,
    pub cards: Vec<GalleryCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryCard {
    pub item_id: String,
    pub title: String,
    pub status: String,
    pub date: Option<String>,
    /// Value of the cover property, if any
    pub cover: Option<String>,
    pub placeholder: &'static str,
    pub actions: Vec<ItemAction>,
}

pub struct GalleryRenderer;

impl ViewRenderer for GalleryRenderer {
    fn view_type(&self) -> ViewType {
        ViewType::Gallery
    }

    fn render_items(&self, _schema: &Schema, config: &ViewConfig, items: &[Item], _ctx: &RenderContext) -> ViewProjection {
        let cover_prop = config.prop(ConfigKey::CoverProp);
        let cards = items
            .iter()
            .map(|item| GalleryCard {
                item_id: item.id.clone(),
                title: title_of(item),
                status: status_of(item),
                date: display_of(item, "Date"),
                cover: cover_prop.and_then(|prop| display_of(item, prop)),
                placeholder: COVER_PLACEHOLDER,
                actions: item_actions(item),
            })
            .collect();

        ViewProjection::Gallery(GalleryView {
            cover_prop: cover_prop.map(String::from),
            cards,
        })
    }
}
