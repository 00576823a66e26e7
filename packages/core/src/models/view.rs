//! View Types and Per-View Configuration
//!
//! A collection is shown through exactly one of six [`ViewType`]s at a time.
//! Each view needs certain [`ConfigKey`]s to be set in the shared
//! [`ViewConfig`] before it can render meaningfully.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// The six visual projections of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    #[default]
    Table,
    Board,
    Calendar,
    Gallery,
    Timeline,
    List,
}

impl ViewType {
    /// Every view, in view-switcher order
    pub const ALL: [ViewType; 6] = [
        ViewType::Table,
        ViewType::Board,
        ViewType::Calendar,
        ViewType::Gallery,
        ViewType::Timeline,
        ViewType::List,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Board => "board",
            Self::Calendar => "calendar",
            Self::Gallery => "gallery",
            Self::Timeline => "timeline",
            Self::List => "list",
        }
    }

    /// Configuration keys this view cannot render without
    pub fn required_keys(&self) -> &'static [ConfigKey] {
        match self {
            Self::Calendar => &[ConfigKey::DateProp],
            Self::Timeline => &[ConfigKey::StartProp, ConfigKey::EndProp],
            Self::Gallery => &[ConfigKey::CoverProp],
            Self::Board => &[ConfigKey::GroupProp],
            Self::Table | Self::List => &[ConfigKey::VisibleCols],
        }
    }

    /// Icon shown in the empty state
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Table => "📊",
            Self::Board => "📋",
            Self::Calendar => "📅",
            Self::Gallery => "🖼️",
            Self::Timeline => "📈",
            Self::List => "📝",
        }
    }
}

impl FromStr for ViewType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewType::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("Invalid view type: {}", s))
    }
}

impl std::fmt::Display for ViewType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configuration key some view requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    VisibleCols,
    GroupProp,
    DateProp,
    StartProp,
    EndProp,
    CoverProp,
}

impl ConfigKey {
    /// Name of the key in the persisted config object
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VisibleCols => "visibleCols",
            Self::GroupProp => "groupProp",
            Self::DateProp => "dateProp",
            Self::StartProp => "startProp",
            Self::EndProp => "endProp",
            Self::CoverProp => "coverProp",
        }
    }
}

/// View-specific settings shared by all views of one collection
///
/// Keys this crate does not know about are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_cols: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_prop: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_prop: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_prop: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_prop: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_prop: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_fields: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ViewConfig {
    /// Decode a stored config, falling back to an empty config when the
    /// stored value does not have the expected shape
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Self::default(),
            other => serde_json::from_value(other).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed view config: {}", e);
                Self::default()
            }),
        }
    }

    /// String value of a property-name key, treating empty strings as unset
    pub fn prop(&self, key: ConfigKey) -> Option<&str> {
        let value = match key {
            ConfigKey::GroupProp => &self.group_prop,
            ConfigKey::DateProp => &self.date_prop,
            ConfigKey::StartProp => &self.start_prop,
            ConfigKey::EndProp => &self.end_prop,
            ConfigKey::CoverProp => &self.cover_prop,
            ConfigKey::VisibleCols => return None,
        };
        value.as_deref().filter(|s| !s.is_empty())
    }

    /// Set a property-name key; `VisibleCols` is set to a single column
    pub fn set_prop(&mut self, key: ConfigKey, name: impl Into<String>) {
        let name = name.into();
        match key {
            ConfigKey::GroupProp => self.group_prop = Some(name),
            ConfigKey::DateProp => self.date_prop = Some(name),
            ConfigKey::StartProp => self.start_prop = Some(name),
            ConfigKey::EndProp => self.end_prop = Some(name),
            ConfigKey::CoverProp => self.cover_prop = Some(name),
            ConfigKey::VisibleCols => self.visible_cols = Some(vec![name]),
        }
    }

    /// Whether a key holds a usable value
    ///
    /// Empty strings count as unset; an empty column list counts as set.
    pub fn has(&self, key: ConfigKey) -> bool {
        match key {
            ConfigKey::VisibleCols => self.visible_cols.is_some(),
            other => self.prop(other).is_some(),
        }
    }

    /// Keys required by `view` that are not set
    pub fn missing_keys(&self, view: ViewType) -> Vec<ConfigKey> {
        view.required_keys()
            .iter()
            .copied()
            .filter(|key| !self.has(*key))
            .collect()
    }
}
