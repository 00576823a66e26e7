//! Collection Schema Model
//!
//! A collection is a schema-driven set of items embedded in a page under a
//! block id. The schema maps property names (in insertion order) to
//! [`PropertyDefinition`]s; each definition carries a [`PropertyType`] and,
//! for select types, the ordered list of allowed options.
//!
//! # Examples
//!
//! ```rust
//! use workbench_core::models::{PropertyDefinition, PropertyType, Schema};
//!
//! let mut schema = Schema::new();
//! schema.insert("Title", PropertyDefinition::new(PropertyType::Title));
//! schema.insert("Due", PropertyDefinition::new(PropertyType::Date));
//!
//! assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["Title", "Due"]);
//! assert_eq!(schema.first_of_type(PropertyType::Date), Some("Due"));
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::item::Item;
use crate::models::view::{ViewConfig, ViewType};

/// Prefix of generated collection block ids
pub const COLLECTION_ID_PREFIX: &str = "collection-";

/// Semantic type of a schema property
///
/// Unknown type names decode as [`PropertyType::Text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyType {
    Title,
    Select,
    MultiSelect,
    Date,
    File,
    #[default]
    Text,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
            Self::Date => "date",
            Self::File => "file",
            Self::Text => "text",
        }
    }
}

impl From<String> for PropertyType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "title" => Self::Title,
            "select" => Self::Select,
            "multi_select" => Self::MultiSelect,
            "date" => Self::Date,
            "file" => Self::File,
            _ => Self::Text,
        }
    }
}

impl From<PropertyType> for String {
    fn from(property_type: PropertyType) -> Self {
        property_type.as_str().to_string()
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Definition of one schema property
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PropertyDefinition {
    #[serde(rename = "type", default)]
    pub property_type: PropertyType,

    /// Allowed values, in display order (select and multi_select only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl PropertyDefinition {
    pub fn new(property_type: PropertyType) -> Self {
        Self {
            property_type,
            options: Vec::new(),
        }
    }

    pub fn with_options<I, S>(property_type: PropertyType, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            property_type,
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, value: &str) -> bool {
        self.options.is_empty() || self.options.iter().any(|o| o == value)
    }
}

/// Ordered mapping from property name to definition
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema(IndexMap<String, PropertyDefinition>);

impl Schema {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Insert or replace a property, keeping its original position on replace
    pub fn insert(&mut self, name: impl Into<String>, definition: PropertyDefinition) {
        self.0.insert(name.into(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&PropertyDefinition> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyDefinition)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Names of properties with the given type, in schema order
    pub fn properties_of_type(&self, property_type: PropertyType) -> Vec<&str> {
        self.iter()
            .filter(|(_, def)| def.property_type == property_type)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn first_of_type(&self, property_type: PropertyType) -> Option<&str> {
        self.iter()
            .find(|(_, def)| def.property_type == property_type)
            .map(|(name, _)| name)
    }

    pub fn type_of(&self, name: &str) -> Option<PropertyType> {
        self.get(name).map(|def| def.property_type)
    }
}

impl<K: Into<String>> FromIterator<(K, PropertyDefinition)> for Schema {
    fn from_iter<T: IntoIterator<Item = (K, PropertyDefinition)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// An inline collection owned by a host page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Identity of the collection block within its page
    pub block_id: String,

    pub schema: Schema,

    pub config: ViewConfig,

    /// Carried through persistence, not used when rendering
    #[serde(default)]
    pub filters: Vec<Value>,

    /// Carried through persistence, not used when rendering
    #[serde(default)]
    pub sorts: Vec<Value>,

    pub view_type: ViewType,

    #[serde(default)]
    pub items: Vec<Item>,
}

impl Collection {
    pub fn new(block_id: impl Into<String>, view_type: ViewType, schema: Schema, config: ViewConfig) -> Self {
        Self {
            block_id: block_id.into(),
            schema,
            config,
            filters: Vec::new(),
            sorts: Vec::new(),
            view_type,
            items: Vec::new(),
        }
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Replace the item with the same id, or append it
    pub fn upsert_item(&mut self, item: Item) {
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Remove an item by id; removing an absent id is a no-op
    pub fn remove_item(&mut self, id: &str) -> Option<Item> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Position assigned to the next appended item
    pub fn next_position(&self) -> i64 {
        self.items.len() as i64
    }
}

/// Generate a new collection block id
pub fn generate_collection_id() -> String {
    format!("{}{}", COLLECTION_ID_PREFIX, Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_property_type_decodes_as_text() {
        let def: PropertyDefinition = serde_json::from_value(json!({"type": "rollup"})).unwrap();
        assert_eq!(def.property_type, PropertyType::Text);

        let def: PropertyDefinition = serde_json::from_value(json!({})).unwrap();
        assert_eq!(def.property_type, PropertyType::Text);
    }

    #[test]
    fn test_schema_preserves_key_order() {
        let schema: Schema = serde_json::from_value(json!({
            "Zeta": {"type": "title"},
            "Alpha": {"type": "select", "options": ["a", "b"]},
            "Mid": {"type": "multi_select"}
        }))
        .unwrap();

        assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["Zeta", "Alpha", "Mid"]);
        assert_eq!(schema.get("Alpha").unwrap().options, vec!["a", "b"]);
        assert_eq!(schema.type_of("Mid"), Some(PropertyType::MultiSelect));
    }

    #[test]
    fn test_properties_of_type_in_order() {
        let schema: Schema = [
            ("Start", PropertyDefinition::new(PropertyType::Date)),
            ("Title", PropertyDefinition::new(PropertyType::Title)),
            ("End", PropertyDefinition::new(PropertyType::Date)),
        ]
        .into_iter()
        .collect();

        assert_eq!(schema.properties_of_type(PropertyType::Date), vec!["Start", "End"]);
        assert!(schema.properties_of_type(PropertyType::File).is_empty());
    }

    #[test]
    fn test_property_type_serializes_snake_case() {
        let json = serde_json::to_value(PropertyDefinition::new(PropertyType::MultiSelect)).unwrap();
        assert_eq!(json, json!({"type": "multi_select"}));
    }
}
