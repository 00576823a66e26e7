//! Timeline view: items in start-date order, ranged items drawn as bars
//!
//! Start resolves from `StartDate`, the configured start property, then
//! `Date`; end from `EndDate`, then the configured end property. Items with
//! no parseable start sort after every dated item, keeping their order.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{ConfigKey, Item, Schema, ViewConfig, ViewType};
use crate::views::{
    display_of, format_date, item_actions, status_of, title_of, ItemAction, RenderContext, ViewProjection,
    ViewRenderer,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineView {
    pub entries: Vec<TimelineEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub item_id: String,
    pub title: String,
    pub status: String,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub date_label: Option<String>,
    pub shape: TimelineShape,
    pub actions: Vec<ItemAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum TimelineShape {
    Point,
    Range { duration_days: u32, bar_width_px: u32 },
}

pub struct TimelineRenderer;

impl TimelineRenderer {
    fn start_of(item: &Item, config: &ViewConfig) -> Option<NaiveDate> {
        item.prop_date("StartDate")
            .or_else(|| config.prop(ConfigKey::StartProp).and_then(|p| item.prop_date(p)))
            .or_else(|| item.prop_date("Date"))
    }

    fn end_of(item: &Item, config: &ViewConfig) -> Option<NaiveDate> {
        item.prop_date("EndDate")
            .or_else(|| config.prop(ConfigKey::EndProp).and_then(|p| item.prop_date(p)))
    }

    fn entry(item: &Item, config: &ViewConfig, start: Option<NaiveDate>, ctx: &RenderContext) -> TimelineEntry {
        let end = Self::end_of(item, config);

        let (shape, date_label) = match (start, end) {
            (Some(start), Some(end)) if end > start => {
                let duration_days = (end - start).num_days() as u32 + 1;
                let bar_width_px = duration_days.saturating_mul(ctx.px_per_day).min(ctx.max_bar_px);
                (
                    TimelineShape::Range {
                        duration_days,
                        bar_width_px,
                    },
                    Some(format!(
                        "{} - {} ({} days)",
                        format_date(start),
                        format_date(end),
                        duration_days
                    )),
                )
            }
            (start, _) => (TimelineShape::Point, start.map(format_date)),
        };

        TimelineEntry {
            item_id: item.id.clone(),
            title: title_of(item),
            status: status_of(item),
            priority: display_of(item, "Priority"),
            assignee: display_of(item, "AssignedTo"),
            date_label,
            shape,
            actions: item_actions(item),
        }
    }
}

impl ViewRenderer for TimelineRenderer {
    fn view_type(&self) -> ViewType {
        ViewType::Timeline
    }

    fn render_items(&self, _schema: &Schema, config: &ViewConfig, items: &[Item], ctx: &RenderContext) -> ViewProjection {
        let mut dated: Vec<(Option<NaiveDate>, &Item)> =
            items.iter().map(|item| (Self::start_of(item, config), item)).collect();
        // Stable sort; `None` orders last
        dated.sort_by_key(|(start, _)| (start.is_none(), *start));

        ViewProjection::Timeline(TimelineView {
            entries: dated
                .into_iter()
                .map(|(start, item)| Self::entry(item, config, start, ctx))
                .collect(),
        })
    }
}
