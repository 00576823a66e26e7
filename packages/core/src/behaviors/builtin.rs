//! Built-in block behaviors, one per block type

use crate::behaviors::BlockBehavior;
use crate::models::{Block, BlockType};

const EDITABLE: &str = r#"contenteditable="true" tabindex="0""#;

/// Marked-up text placed inside a double-quoted attribute
fn attribute(text: &str) -> String {
    text.replace('"', "&quot;")
}

/// Plain text paragraph, also the fallback for unknown types
pub struct ParagraphBehavior;

impl BlockBehavior for ParagraphBehavior {
    fn block_type(&self) -> BlockType {
        BlockType::Paragraph
    }

    fn render_inline(&self, _level: u32, text: &str, _checked: bool) -> String {
        format!("<p {}>{}</p>", EDITABLE, text)
    }
}

/// Section heading; the display size follows the level, capped at h3
pub struct HeadingBehavior;

impl BlockBehavior for HeadingBehavior {
    fn block_type(&self) -> BlockType {
        BlockType::Heading
    }

    fn render_inline(&self, level: u32, text: &str, _checked: bool) -> String {
        format!(r#"<div class="wb-h{}" {}>{}</div>"#, level.clamp(1, 3), EDITABLE, text)
    }
}

pub struct BulletedBehavior;

impl BlockBehavior for BulletedBehavior {
    fn block_type(&self) -> BlockType {
        BlockType::Bulleted
    }

    fn render_inline(&self, _level: u32, text: &str, _checked: bool) -> String {
        format!(r#"<ul class="wb-ul"><li {}>{}</li></ul>"#, EDITABLE, text)
    }

    fn continuation_type(&self) -> BlockType {
        BlockType::Bulleted
    }

    fn is_list_like(&self) -> bool {
        true
    }
}

pub struct NumberedBehavior;

impl BlockBehavior for NumberedBehavior {
    fn block_type(&self) -> BlockType {
        BlockType::Numbered
    }

    fn render_inline(&self, _level: u32, text: &str, _checked: bool) -> String {
        format!(r#"<ol class="wb-ol"><li {}>{}</li></ol>"#, EDITABLE, text)
    }

    fn continuation_type(&self) -> BlockType {
        BlockType::Numbered
    }

    fn is_list_like(&self) -> bool {
        true
    }
}

/// To-do item: a checkbox plus its label
pub struct ChecklistBehavior;

impl BlockBehavior for ChecklistBehavior {
    fn block_type(&self) -> BlockType {
        BlockType::Checklist
    }

    fn render_inline(&self, _level: u32, text: &str, checked: bool) -> String {
        format!(
            r#"<div class="wb-check"><input class="wb-checkbox" type="checkbox" {}/><span {}>{}</span></div>"#,
            if checked { "checked" } else { "" },
            EDITABLE,
            text
        )
    }

    fn continuation_type(&self) -> BlockType {
        BlockType::Checklist
    }

    fn is_list_like(&self) -> bool {
        true
    }

    fn authoritative_content(&self, block: &Block) -> (String, bool) {
        (block.text.clone(), block.checked)
    }
}

pub struct CodeBehavior;

impl BlockBehavior for CodeBehavior {
    fn block_type(&self) -> BlockType {
        BlockType::Code
    }

    fn render_inline(&self, _level: u32, text: &str, _checked: bool) -> String {
        format!(r#"<pre class="wb-code"><code {}>{}</code></pre>"#, EDITABLE, text)
    }
}

pub struct QuoteBehavior;

impl BlockBehavior for QuoteBehavior {
    fn block_type(&self) -> BlockType {
        BlockType::Quote
    }

    fn render_inline(&self, _level: u32, text: &str, _checked: bool) -> String {
        format!(r#"<blockquote class="wb-quote" {}>{}</blockquote>"#, EDITABLE, text)
    }
}

/// Horizontal rule; carries no text
pub struct DividerBehavior;

impl BlockBehavior for DividerBehavior {
    fn block_type(&self) -> BlockType {
        BlockType::Divider
    }

    fn render_inline(&self, _level: u32, _text: &str, _checked: bool) -> String {
        r#"<div class="wb-divider"></div>"#.to_string()
    }

    fn is_editable(&self) -> bool {
        false
    }

    fn authoritative_content(&self, _block: &Block) -> (String, bool) {
        (String::new(), false)
    }
}

/// Image whose text is the source URL
pub struct ImageBehavior;

impl BlockBehavior for ImageBehavior {
    fn block_type(&self) -> BlockType {
        BlockType::Image
    }

    fn render_inline(&self, _level: u32, text: &str, _checked: bool) -> String {
        format!(
            r#"<div class="wb-image"><img src="{}" alt="Image" style="max-width:100%; height:auto;"><div class="wb-image-url" {}>{}</div></div>"#,
            attribute(text),
            EDITABLE,
            text
        )
    }
}

/// Embedded frame whose text is the source URL
pub struct EmbedBehavior;

impl BlockBehavior for EmbedBehavior {
    fn block_type(&self) -> BlockType {
        BlockType::Embed
    }

    fn render_inline(&self, _level: u32, text: &str, _checked: bool) -> String {
        format!(
            r#"<div class="wb-embed"><iframe src="{}" frameborder="0" style="width:100%; height:200px;"></iframe><div class="wb-embed-url" {}>{}</div></div>"#,
            attribute(text),
            EDITABLE,
            text
        )
    }
}
