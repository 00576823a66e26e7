//! Calendar view: a month grid with items placed on the days they cover
//!
//! An item's start is its `StartDate`, else the configured date property;
//! its end is `EndDate`, else the start. An item with only an end date sits
//! on that single day. An item shows on its start day, its end day and every
//! day between them, so an end before the start still marks both days.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::models::{ConfigKey, Item, Schema, ViewConfig, ViewType};
use crate::views::{display_of, item_actions, title_of, ItemAction, RenderContext, ViewProjection, ViewRenderer};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarView {
    pub year: i32,
    pub month: u32,
    /// Month heading, e.g. `March 2024`
    pub title: String,
    /// Empty cells before day 1 (weeks start on Sunday)
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    pub day: u32,
    pub is_today: bool,
    pub entries: Vec<CalendarEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEntry {
    pub item_id: String,
    pub title: String,
    pub assignee: Option<String>,
    pub priority: Option<String>,
    pub is_start: bool,
    pub is_end: bool,
    /// Day falls strictly between start and end
    pub is_spanning: bool,
    pub actions: Vec<ItemAction>,
}

/// Start and end days of one item; `end` may precede `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: NaiveDate,
    end: NaiveDate,
}

impl Span {
    fn of(item: &Item, date_prop: Option<&str>) -> Option<Self> {
        let start = item
            .prop_date("StartDate")
            .or_else(|| date_prop.and_then(|prop| item.prop_date(prop)));
        let end = item.prop_date("EndDate");

        match (start, end) {
            (Some(start), Some(end)) => Some(Self { start, end }),
            (Some(start), None) => Some(Self { start, end: start }),
            (None, Some(end)) => Some(Self { start: end, end }),
            (None, None) => None,
        }
    }

    fn covers(&self, date: NaiveDate) -> bool {
        date == self.start || date == self.end || (self.start <= date && date <= self.end)
    }
}

fn days_in_month(first: NaiveDate) -> u32 {
    first
        .checked_add_months(Months::new(1))
        .map(|next| next.signed_duration_since(first).num_days() as u32)
        .unwrap_or(31)
}

pub struct CalendarRenderer;

impl ViewRenderer for CalendarRenderer {
    fn view_type(&self) -> ViewType {
        ViewType::Calendar
    }

    fn render_items(&self, _schema: &Schema, config: &ViewConfig, items: &[Item], ctx: &RenderContext) -> ViewProjection {
        let first = ctx.today.with_day(1).unwrap_or(ctx.today);
        let date_prop = config.prop(ConfigKey::DateProp);
        let spans: Vec<(&Item, Span)> = items
            .iter()
            .filter_map(|item| Span::of(item, date_prop).map(|span| (item, span)))
            .collect();

        let days = (1..=days_in_month(first))
            .filter_map(|day| first.with_day(day))
            .map(|date| CalendarDay {
                day: date.day(),
                is_today: date == ctx.today,
                entries: spans
                    .iter()
                    .filter(|(_, span)| span.covers(date))
                    .map(|(item, span)| CalendarEntry {
                        item_id: item.id.clone(),
                        title: title_of(item),
                        assignee: display_of(item, "AssignedTo"),
                        priority: display_of(item, "Priority"),
                        is_start: date == span.start,
                        is_end: date == span.end,
                        is_spanning: span.start < date && date < span.end,
                        actions: item_actions(item),
                    })
                    .collect(),
            })
            .collect();

        ViewProjection::Calendar(CalendarView {
            year: first.year(),
            month: first.month(),
            title: first.format("%B %Y").to_string(),
            leading_blanks: first.weekday().num_days_from_sunday(),
            days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::test_support::item;

    fn render(config: &ViewConfig, items: &[Item], today: NaiveDate) -> CalendarView {
        match CalendarRenderer.render(&Schema::new(), config, items, &RenderContext::new(today)) {
            ViewProjection::Calendar(calendar) => calendar,
            other => panic!("expected calendar, got {:?}", other),
        }
    }

    fn march_15() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn days_with(calendar: &CalendarView, item_id: &str) -> Vec<u32> {
        calendar
            .days
            .iter()
            .filter(|d| d.entries.iter().any(|e| e.item_id == item_id))
            .map(|d| d.day)
            .collect()
    }

    #[test]
    fn test_month_grid_layout() {
        let calendar = render(&ViewConfig::default(), &[item("a", &[])], march_15());

        assert_eq!((calendar.year, calendar.month), (2024, 3));
        assert_eq!(calendar.title, "March 2024");
        // 1 March 2024 is a Friday
        assert_eq!(calendar.leading_blanks, 5);
        assert_eq!(calendar.days.len(), 31);
        assert!(calendar.days[14].is_today);
        assert_eq!(calendar.days.iter().filter(|d| d.is_today).count(), 1);
    }

    #[test]
    fn test_leap_february_has_29_days() {
        let calendar = render(
            &ViewConfig::default(),
            &[item("a", &[])],
            NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
        );
        assert_eq!(calendar.days.len(), 29);
    }

    #[test]
    fn test_ranged_item_marks_start_span_and_end() {
        let items = vec![item(
            "a",
            &[("StartDate", "2024-03-04"), ("EndDate", "2024-03-06"), ("AssignedTo", "Ana")],
        )];
        let calendar = render(&ViewConfig::default(), &items, march_15());

        assert_eq!(days_with(&calendar, "a"), vec![4, 5, 6]);
        let flags = |day: usize| {
            let entry = &calendar.days[day - 1].entries[0];
            (entry.is_start, entry.is_spanning, entry.is_end)
        };
        assert_eq!(flags(4), (true, false, false));
        assert_eq!(flags(5), (false, true, false));
        assert_eq!(flags(6), (false, false, true));
        assert_eq!(calendar.days[3].entries[0].assignee.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_end_before_start_shows_on_both_days() {
        let items = vec![item("a", &[("StartDate", "2024-03-10"), ("EndDate", "2024-03-05")])];
        let calendar = render(&ViewConfig::default(), &items, march_15());

        assert_eq!(days_with(&calendar, "a"), vec![5, 10]);
        let end = &calendar.days[4].entries[0];
        assert!(end.is_end && !end.is_start && !end.is_spanning);
        let start = &calendar.days[9].entries[0];
        assert!(start.is_start && !start.is_end && !start.is_spanning);
    }

    #[test]
    fn test_range_crossing_month_boundary_fills_visible_days() {
        let items = vec![item("a", &[("StartDate", "2024-02-27"), ("EndDate", "2024-03-02")])];
        let calendar = render(&ViewConfig::default(), &items, march_15());
        assert_eq!(days_with(&calendar, "a"), vec![1, 2]);
        assert!(calendar.days[0].entries[0].is_spanning);
    }

    #[test]
    fn test_same_day_in_other_month_is_not_shown() {
        let items = vec![item("a", &[("StartDate", "2024-04-15")])];
        let calendar = render(&ViewConfig::default(), &items, march_15());
        assert!(days_with(&calendar, "a").is_empty());
    }

    #[test]
    fn test_configured_date_prop_and_end_only_items() {
        let mut config = ViewConfig::default();
        config.set_prop(ConfigKey::DateProp, "Due");
        let items = vec![
            item("due", &[("Due", "2024-03-09")]),
            item("end", &[("EndDate", "2024-03-20")]),
            item("none", &[("Title", "Undated")]),
        ];

        let calendar = render(&config, &items, march_15());

        assert_eq!(days_with(&calendar, "due"), vec![9]);
        assert_eq!(days_with(&calendar, "end"), vec![20]);
        assert!(days_with(&calendar, "none").is_empty());
        let entry = &calendar.days[8].entries[0];
        assert!(entry.is_start && entry.is_end && !entry.is_spanning);
    }
}
