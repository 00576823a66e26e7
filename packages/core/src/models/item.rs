//! Collection Item Model
//!
//! An item is one structured record of a collection: a property bag keyed by
//! schema property names, a free-form content body, and an append-only
//! position hint.
//!
//! Property values are read permissively: whatever shape the store returns is
//! kept as a [`PropertyValue`] and written back unchanged. Writes that go
//! through [`Item::set_prop`] are typed ([`TypedValue`]) and validated against
//! the collection [`Schema`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::models::collection::{PropertyType, Schema};

/// Prefix applied to generated item identifiers
pub const ITEM_ID_PREFIX: &str = "item-";

/// Title given to freshly created items
pub const DEFAULT_ITEM_TITLE: &str = "New Item";

/// Validation errors for item properties
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error("Property '{property}' expects {expected}, got {found}")]
    TypeMismatch {
        property: String,
        expected: PropertyType,
        found: PropertyType,
    },

    #[error("Value '{value}' is not an option of property '{property}'")]
    OptionNotAllowed { property: String, value: String },

    #[error("Property '{property}' has a value of the wrong shape")]
    InvalidShape { property: String },
}

/// A stored property value, in whatever shape it was persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    List(Vec<String>),
    Other(Value),
}

impl PropertyValue {
    /// String content, if the value is textual
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Textual content that is not empty
    pub fn non_empty_str(&self) -> Option<&str> {
        self.as_str().filter(|s| !s.is_empty())
    }

    /// Null, empty string, and empty list count as empty
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::List(values) => values.is_empty(),
            Self::Other(Value::Null) => true,
            Self::Other(_) => false,
        }
    }

    /// Multi-valued view: a list as-is, or a comma-separated string split
    pub fn values(&self) -> Vec<String> {
        match self {
            Self::List(values) => values.clone(),
            Self::Text(s) => s
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect(),
            Self::Other(_) => Vec::new(),
        }
    }

    /// Calendar date, if the value parses as one
    pub fn as_date(&self) -> Option<NaiveDate> {
        self.as_str().and_then(parse_date)
    }

    /// Display form of the value for plain-text contexts
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::List(values) => values.join(", "),
            Self::Other(Value::Null) => String::new(),
            Self::Other(other) => other.to_string(),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Parse the date forms the store produces: `YYYY-MM-DD`, or a datetime
/// whose date part is used
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|datetime| datetime.date())
}

/// A typed property value for validated writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    Title(String),
    Text(String),
    Select(String),
    MultiSelect(Vec<String>),
    Date(NaiveDate),
    File(String),
}

impl TypedValue {
    pub fn property_type(&self) -> PropertyType {
        match self {
            Self::Title(_) => PropertyType::Title,
            Self::Text(_) => PropertyType::Text,
            Self::Select(_) => PropertyType::Select,
            Self::MultiSelect(_) => PropertyType::MultiSelect,
            Self::Date(_) => PropertyType::Date,
            Self::File(_) => PropertyType::File,
        }
    }

    fn into_stored(self) -> PropertyValue {
        match self {
            Self::Title(s) | Self::Text(s) | Self::Select(s) | Self::File(s) => PropertyValue::Text(s),
            Self::MultiSelect(values) => PropertyValue::List(values),
            Self::Date(date) => PropertyValue::Text(date.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Free-form item body
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemContent {
    /// Persisted document, legacy plain-text body, or absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One structured record of a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Opaque identifier; stores may return it as `name`
    #[serde(alias = "name")]
    pub id: String,

    #[serde(default)]
    pub props: IndexMap<String, PropertyValue>,

    #[serde(default)]
    pub content: ItemContent,

    #[serde(default)]
    pub position: i64,
}

impl Item {
    /// Create an item with default props for every schema property
    ///
    /// title → "New Item", select → first option (or empty),
    /// multi_select → empty list, date → `today`, anything else → empty.
    pub fn with_defaults(schema: &Schema, today: NaiveDate, position: i64) -> Self {
        let props = schema
            .iter()
            .map(|(name, def)| {
                let value = match def.property_type {
                    PropertyType::Title => PropertyValue::from(DEFAULT_ITEM_TITLE),
                    PropertyType::Select => {
                        PropertyValue::Text(def.options.first().cloned().unwrap_or_default())
                    }
                    PropertyType::MultiSelect => PropertyValue::List(Vec::new()),
                    PropertyType::Date => PropertyValue::Text(today.format("%Y-%m-%d").to_string()),
                    PropertyType::File | PropertyType::Text => PropertyValue::Text(String::new()),
                };
                (name.to_string(), value)
            })
            .collect();

        Self {
            id: generate_item_id(),
            props,
            content: ItemContent::default(),
            position,
        }
    }

    pub fn prop(&self, name: &str) -> Option<&PropertyValue> {
        self.props.get(name)
    }

    /// Non-empty textual value of a property
    pub fn prop_str(&self, name: &str) -> Option<&str> {
        self.prop(name).and_then(PropertyValue::non_empty_str)
    }

    pub fn prop_date(&self, name: &str) -> Option<NaiveDate> {
        self.prop(name).and_then(PropertyValue::as_date)
    }

    /// Write a property after checking it against the schema
    pub fn set_prop(&mut self, schema: &Schema, name: &str, value: TypedValue) -> Result<(), ValidationError> {
        let definition = schema
            .get(name)
            .ok_or_else(|| ValidationError::UnknownProperty(name.to_string()))?;

        if definition.property_type != value.property_type() {
            return Err(ValidationError::TypeMismatch {
                property: name.to_string(),
                expected: definition.property_type,
                found: value.property_type(),
            });
        }

        let rejected = match &value {
            TypedValue::Select(choice) if !choice.is_empty() && !definition.allows(choice) => Some(choice.clone()),
            TypedValue::MultiSelect(choices) => choices.iter().find(|c| !definition.allows(c)).cloned(),
            _ => None,
        };
        if let Some(value) = rejected {
            return Err(ValidationError::OptionNotAllowed {
                property: name.to_string(),
                value,
            });
        }

        self.props.insert(name.to_string(), value.into_stored());
        Ok(())
    }

    /// Check stored props against the schema, reporting the first problem
    ///
    /// Reads never call this; it is offered to callers that want to report
    /// drift between items and their schema.
    pub fn validate(&self, schema: &Schema) -> Result<(), ValidationError> {
        for (name, value) in &self.props {
            let definition = schema
                .get(name)
                .ok_or_else(|| ValidationError::UnknownProperty(name.clone()))?;

            match definition.property_type {
                PropertyType::MultiSelect => {
                    if let Some(bad) = value.values().into_iter().find(|v| !definition.allows(v)) {
                        return Err(ValidationError::OptionNotAllowed {
                            property: name.clone(),
                            value: bad,
                        });
                    }
                }
                PropertyType::Select => match value.as_str() {
                    Some(choice) if !choice.is_empty() && !definition.allows(choice) => {
                        return Err(ValidationError::OptionNotAllowed {
                            property: name.clone(),
                            value: choice.to_string(),
                        });
                    }
                    Some(_) => {}
                    None if value.is_empty() => {}
                    None => return Err(ValidationError::InvalidShape { property: name.clone() }),
                },
                PropertyType::Date => {
                    if !value.is_empty() && value.as_date().is_none() {
                        return Err(ValidationError::InvalidShape { property: name.clone() });
                    }
                }
                PropertyType::Title | PropertyType::Text | PropertyType::File => {
                    if matches!(value, PropertyValue::List(_)) {
                        return Err(ValidationError::InvalidShape { property: name.clone() });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Generate a fresh, prefixed item id
pub fn generate_item_id() -> String {
    format!("{}{}", ITEM_ID_PREFIX, Uuid::new_v4().simple())
}
