//! Collection Schema/Config Engine
//!
//! Default schema and config for each view type, and the remap that fills
//! the config keys a view needs from the schema when switching views.
//!
//! ## Remap rules
//!
//! | missing key | filled with |
//! |---|---|
//! | `dateProp`, `startProp` | first `date` property |
//! | `endProp` | second `date` property, else the start property |
//! | `coverProp` | first `file` property |
//! | `groupProp` | first `select` property |
//! | `visibleCols` | left unset (tables fall back to the first columns) |
//!
//! A key with no candidate in the schema stays unset; rendering proceeds
//! with whatever resolved.

use crate::models::{ConfigKey, PropertyDefinition, PropertyType, Schema, ViewConfig, ViewType};

const STATUS_OPTIONS: [&str; 3] = ["Not started", "In progress", "Done"];
const ASSIGNEE_OPTIONS: [&str; 5] = ["John Doe", "Jane Smith", "Mike Johnson", "Sarah Wilson", "Alex Brown"];
const PRIORITY_OPTIONS: [&str; 4] = ["Low", "Medium", "High", "Urgent"];
const TAG_OPTIONS: [&str; 6] = ["UI", "Backend", "Bug", "Feature", "Design", "Testing"];

/// Schema a new collection of `view` starts with
pub fn default_schema(view: ViewType) -> Schema {
    let mut schema: Schema = [
        ("Title", PropertyDefinition::new(PropertyType::Title)),
        ("Status", PropertyDefinition::with_options(PropertyType::Select, STATUS_OPTIONS)),
        ("StartDate", PropertyDefinition::new(PropertyType::Date)),
        ("EndDate", PropertyDefinition::new(PropertyType::Date)),
        ("AssignedTo", PropertyDefinition::with_options(PropertyType::Select, ASSIGNEE_OPTIONS)),
        ("Priority", PropertyDefinition::with_options(PropertyType::Select, PRIORITY_OPTIONS)),
        ("Tags", PropertyDefinition::with_options(PropertyType::MultiSelect, TAG_OPTIONS)),
    ]
    .into_iter()
    .collect();

    match view {
        ViewType::Timeline => {
            schema.insert("Start", PropertyDefinition::new(PropertyType::Date));
            schema.insert("End", PropertyDefinition::new(PropertyType::Date));
        }
        ViewType::Calendar => schema.insert("Date", PropertyDefinition::new(PropertyType::Date)),
        ViewType::Gallery => schema.insert("Cover", PropertyDefinition::new(PropertyType::File)),
        ViewType::Board | ViewType::Table | ViewType::List => {}
    }
    schema
}

/// Config a new collection of `view` starts with
pub fn default_config(view: ViewType) -> ViewConfig {
    let columns = |names: &[&str]| Some(names.iter().map(|n| n.to_string()).collect::<Vec<_>>());
    match view {
        ViewType::Timeline => ViewConfig {
            start_prop: Some("Start".into()),
            end_prop: Some("End".into()),
            zoom: Some("month".into()),
            ..Default::default()
        },
        ViewType::Calendar => ViewConfig {
            date_prop: Some("Date".into()),
            ..Default::default()
        },
        ViewType::Gallery => ViewConfig {
            cover_prop: Some("Cover".into()),
            card_fields: columns(&["Title", "Status"]),
            size: Some("medium".into()),
            ..Default::default()
        },
        ViewType::Board => ViewConfig {
            group_prop: Some("Status".into()),
            ..Default::default()
        },
        ViewType::Table => ViewConfig {
            visible_cols: columns(&["Title", "Status", "Date"]),
            ..Default::default()
        },
        ViewType::List => ViewConfig {
            visible_cols: columns(&["Title", "Status"]),
            ..Default::default()
        },
    }
}

/// Whether `config` lacks a key that `to` requires
pub fn needs_config_remap(_from: ViewType, to: ViewType, config: &ViewConfig) -> bool {
    !config.missing_keys(to).is_empty()
}

/// Fill the keys `to` requires from `schema`, keeping every key already set
pub fn remap_config(_from: ViewType, to: ViewType, config: &ViewConfig, schema: &Schema) -> ViewConfig {
    let mut remapped = config.clone();
    let dates = schema.properties_of_type(PropertyType::Date);

    for key in config.missing_keys(to) {
        let candidate = match key {
            ConfigKey::DateProp | ConfigKey::StartProp => dates.first().map(|s| s.to_string()),
            ConfigKey::EndProp => dates
                .get(1)
                .map(|s| s.to_string())
                .or_else(|| remapped.prop(ConfigKey::StartProp).map(String::from))
                .or_else(|| dates.first().map(|s| s.to_string())),
            ConfigKey::CoverProp => schema.first_of_type(PropertyType::File).map(String::from),
            ConfigKey::GroupProp => schema.first_of_type(PropertyType::Select).map(String::from),
            ConfigKey::VisibleCols => None,
        };

        match candidate {
            Some(name) => {
                tracing::debug!("Remapped {} to '{}' for {} view", key.as_str(), name, to);
                remapped.set_prop(key, name);
            }
            None => tracing::debug!("No schema property for {} in {} view", key.as_str(), to),
        }
    }
    remapped
}
