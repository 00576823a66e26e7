//! Document Serializer
//!
//! Converts a [`Document`] to and from its persisted form: an ordered list of
//! `{id, type, level, text, checked}` entries wrapped in `{"blocks": [...]}`.
//!
//! Decoding never fails. Absent, malformed, or empty content yields a
//! document holding one empty paragraph. Individual entries that cannot be
//! read are skipped with a warning, and older spellings are accepted:
//!
//! - text stored under `content` instead of `text`
//! - `heading1` / `heading2` / `heading3` type names
//! - unknown type names (decoded as paragraphs)
//!
//! Item bodies may additionally be plain text with line prefixes; see
//! [`body_document`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::behaviors::behavior;
use crate::models::{generate_block_id, Block, BlockType, Document};
use crate::utils::blocks_from_lines;

/// Persisted form of a document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersistedDocument {
    pub blocks: Vec<PersistedBlock>,
}

/// Persisted form of one block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedBlock {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type", default = "default_type")]
    pub block_type: String,

    #[serde(default = "default_level")]
    pub level: u32,

    #[serde(default, alias = "content")]
    pub text: String,

    #[serde(default)]
    pub checked: bool,
}

fn default_type() -> String {
    BlockType::Paragraph.as_str().to_string()
}

fn default_level() -> u32 {
    1
}

impl PersistedBlock {
    fn into_block(self) -> Block {
        let (block_type, legacy_level) = BlockType::parse_legacy(&self.block_type).unwrap_or_else(|| {
            tracing::warn!("Unknown block type '{}' decoded as paragraph", self.block_type);
            (BlockType::Paragraph, None)
        });
        let id = if self.id.is_empty() {
            generate_block_id()
        } else {
            self.id
        };
        Block::with_id(
            id,
            block_type,
            legacy_level.unwrap_or(self.level),
            self.text,
            self.checked,
        )
    }
}

impl From<&Document> for PersistedDocument {
    fn from(document: &Document) -> Self {
        serialize(document)
    }
}

/// Walk the document in order, extracting each block's authoritative content
pub fn serialize(document: &Document) -> PersistedDocument {
    let blocks = document
        .blocks()
        .iter()
        .map(|block| {
            let (text, checked) = behavior(block.block_type).authoritative_content(block);
            PersistedBlock {
                id: block.id.clone(),
                block_type: block.block_type.as_str().to_string(),
                level: block.level,
                text,
                checked,
            }
        })
        .collect();

    PersistedDocument { blocks }
}

/// Rebuild a document; absent or empty forms yield one empty paragraph
pub fn deserialize(form: Option<&PersistedDocument>) -> Document {
    let blocks = form
        .map(|form| form.blocks.iter().cloned().map(PersistedBlock::into_block).collect())
        .unwrap_or_default();
    Document::from_blocks(blocks)
}

/// Serialized document as a JSON value
pub fn to_value(document: &Document) -> Value {
    serde_json::to_value(serialize(document)).unwrap_or(Value::Null)
}

/// Serialized document as a JSON string
pub fn to_json(document: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string(&serialize(document))
}

/// Decode a JSON string; `None`, empty, or unparseable input yields the default document
pub fn from_json(raw: Option<&str>) -> Document {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Document::new();
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => from_value(&value),
        Err(e) => {
            tracing::warn!("Unparseable document content, starting empty: {}", e);
            Document::new()
        }
    }
}

/// Decode a JSON value entry by entry, skipping entries that cannot be read
///
/// Accepts the `{"blocks": [...]}` object or a string holding it.
pub fn from_value(value: &Value) -> Document {
    let entries = match value {
        Value::Object(map) => map.get("blocks").and_then(Value::as_array),
        Value::String(raw) => return from_json(Some(raw)),
        _ => None,
    };
    let Some(entries) = entries else {
        if !value.is_null() {
            tracing::warn!("Document content has no block list, starting empty");
        }
        return Document::new();
    };

    let blocks = entries
        .iter()
        .filter_map(|entry| match serde_json::from_value::<PersistedBlock>(entry.clone()) {
            Ok(persisted) => Some(persisted.into_block()),
            Err(e) => {
                tracing::warn!("Skipping malformed block entry: {}", e);
                None
            }
        })
        .collect();

    Document::from_blocks(blocks)
}

/// Decode an item body
///
/// The body may be a persisted document (as an object or as a JSON string),
/// or a legacy plain-text body whose lines carry `# `, `## `, `### `, `- `,
/// or `1. ` prefixes.
pub fn body_document(body: Option<&Value>) -> Document {
    match body {
        None | Some(Value::Null) => Document::new(),
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Document::new();
            }
            if trimmed.starts_with('{') {
                if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
                    return from_value(&value);
                }
            }
            Document::from_blocks(blocks_from_lines(raw))
        }
        Some(other) => from_value(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tuples(document: &Document) -> Vec<(BlockType, u32, String, bool)> {
        document
            .blocks()
            .iter()
            .map(|b| (b.block_type, b.level, b.text.clone(), b.checked))
            .collect()
    }

    #[test]
    fn test_round_trip_preserves_every_type() {
        let original = Document::from_blocks(vec![
            Block::new(BlockType::Heading, 2, "Title", false),
            Block::paragraph("a &amp; <b>b</b>"),
            Block::new(BlockType::Bulleted, 3, "deep", false),
            Block::new(BlockType::Numbered, 1, "one", false),
            Block::new(BlockType::Checklist, 1, "todo", true),
            Block::new(BlockType::Code, 1, "fn main() {}", false),
            Block::new(BlockType::Quote, 1, "q", false),
            Block::new(BlockType::Divider, 1, "", false),
            Block::new(BlockType::Image, 1, "https://x/y.png", false),
            Block::new(BlockType::Embed, 1, "https://x", false),
        ]);

        let restored = deserialize(Some(&serialize(&original)));
        assert_eq!(tuples(&restored), tuples(&original));
        assert_eq!(restored, original);
    }

    #[test]
    fn test_absent_or_empty_yields_single_paragraph() {
        for document in [
            deserialize(None),
            deserialize(Some(&PersistedDocument::default())),
            from_json(None),
            from_json(Some("")),
            from_json(Some("{not json")),
            from_value(&json!({"pages": []})),
            from_value(&json!(42)),
        ] {
            assert_eq!(document.len(), 1);
            assert_eq!(document.first().block_type, BlockType::Paragraph);
            assert_eq!(document.first().text, "");
        }
    }

    #[test]
    fn test_legacy_entries_are_accepted() {
        let document = from_value(&json!({
            "blocks": [
                {"id": "block-1", "type": "heading1", "content": "Welcome", "level": 1},
                {"id": "block-2", "type": "heading3", "content": "Small"},
                {"id": "block-3", "type": "toggle", "text": "Odd"},
                {"id": "block-4", "type": "paragraph", "level": -2},
                {"type": "quote", "text": "no id"}
            ]
        }));

        assert_eq!(
            tuples(&document),
            vec![
                (BlockType::Heading, 1, "Welcome".to_string(), false),
                (BlockType::Heading, 3, "Small".to_string(), false),
                (BlockType::Paragraph, 1, "Odd".to_string(), false),
                (BlockType::Quote, 1, "no id".to_string(), false),
            ]
        );
        assert!(!document.blocks()[3].id.is_empty());
    }

    #[test]
    fn test_json_string_content_is_decoded() {
        let raw = r#"{"blocks":[{"id":"b-1","type":"checklist","level":1,"text":"x","checked":true}]}"#;
        let document = from_value(&Value::String(raw.to_string()));
        assert_eq!(document.first().id, "b-1");
        assert!(document.first().checked);
    }

    #[test]
    fn test_serialized_shape() {
        let document = Document::from_blocks(vec![Block::with_id("b-1", BlockType::Paragraph, 1, "hi", false)]);
        assert_eq!(
            to_value(&document),
            json!({"blocks": [{"id": "b-1", "type": "paragraph", "level": 1, "text": "hi", "checked": false}]})
        );
    }

    #[test]
    fn test_body_document_reads_legacy_lines() {
        let body = json!("# Plan\n- buy milk\nthen rest");
        let document = body_document(Some(&body));
        assert_eq!(
            document.blocks().iter().map(|b| b.block_type).collect::<Vec<_>>(),
            vec![BlockType::Heading, BlockType::Bulleted, BlockType::Paragraph]
        );
    }

    #[test]
    fn test_body_document_reads_persisted_form() {
        let body = json!({"blocks": [{"id": "b-9", "type": "quote", "level": 2, "text": "said"}]});
        let document = body_document(Some(&body));
        assert_eq!(document.first().id, "b-9");
        assert_eq!(document.first().level, 2);

        assert_eq!(body_document(Some(&json!("   "))).len(), 1);
        assert_eq!(body_document(None).first().text, "");
    }
}
