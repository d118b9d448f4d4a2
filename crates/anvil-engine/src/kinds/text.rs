use serde_json::Value;

use crate::model::Block;
use crate::registry::{Attrs, BlockType, BlockTypeDefinition, Supports};
use crate::render::{BlockFrame, RenderContext, html};

pub struct Paragraph;

impl BlockType for Paragraph {
    fn definition(&self) -> BlockTypeDefinition {
        BlockTypeDefinition::new("paragraph", "Paragraph", "text", "text")
            .string("content", "")
            .boolean("dropCap", false)
            .supports(Supports::TEXT)
    }

    fn render(&self, _: &Block, attrs: &Attrs<'_>, _: &RenderContext<'_>) -> String {
        let frame =
            BlockFrame::new("anvil-block-paragraph", attrs).class_if(attrs.bool("dropCap"), "has-drop-cap");
        format!(
            "<p{}>{}</p>",
            frame.attributes(),
            html::text(attrs.str("content"))
        )
    }
}

pub struct Heading;

impl BlockType for Heading {
    fn definition(&self) -> BlockTypeDefinition {
        BlockTypeDefinition::new("heading", "Heading", "text", "heading")
            .string("content", "")
            .integer("level", 2)
            .supports(Supports::TEXT)
    }

    fn render(&self, _: &Block, attrs: &Attrs<'_>, _: &RenderContext<'_>) -> String {
        let level = attrs.int_clamped("level", 1, 6);
        let frame = BlockFrame::new("anvil-block-heading", attrs);
        format!(
            "<h{level}{}>{}</h{level}>",
            frame.attributes(),
            html::text(attrs.str("content"))
        )
    }
}

pub struct List;

impl BlockType for List {
    fn definition(&self) -> BlockTypeDefinition {
        BlockTypeDefinition::new("list", "List", "text", "list")
            .array("items")
            .boolean("ordered", false)
            .supports(Supports::BASIC)
    }

    fn render(&self, _: &Block, attrs: &Attrs<'_>, _: &RenderContext<'_>) -> String {
        let tag = if attrs.bool("ordered") { "ol" } else { "ul" };
        let frame = BlockFrame::new("anvil-block-list", attrs);
        let items: String = attrs
            .array("items")
            .iter()
            .filter_map(item_text)
            .map(|item| format!("<li>{}</li>", html::text(&item)))
            .collect();
        format!("<{tag}{}>{items}</{tag}>", frame.attributes())
    }
}

/// List items are stored as plain strings; numbers and `{content}` objects
/// written by older editors are accepted too.
fn item_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("content").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

pub struct Quote;

impl BlockType for Quote {
    fn definition(&self) -> BlockTypeDefinition {
        BlockTypeDefinition::new("quote", "Quote", "text", "quote")
            .string("content", "")
            .string("citation", "")
            .supports(Supports::TEXT)
    }

    fn render(&self, _: &Block, attrs: &Attrs<'_>, _: &RenderContext<'_>) -> String {
        let frame = BlockFrame::new("anvil-block-quote", attrs);
        let citation = attrs.str("citation");
        let cite = if citation.is_empty() {
            String::new()
        } else {
            format!("<cite>{}</cite>", html::text(citation))
        };
        format!(
            "<blockquote{}><p>{}</p>{cite}</blockquote>",
            frame.attributes(),
            html::text(attrs.str("content"))
        )
    }
}

pub struct Code;

impl BlockType for Code {
    fn definition(&self) -> BlockTypeDefinition {
        BlockTypeDefinition::new("code", "Code", "text", "code")
            .string("content", "")
            .string("language", "")
            .supports(Supports::BASIC)
    }

    fn render(&self, _: &Block, attrs: &Attrs<'_>, _: &RenderContext<'_>) -> String {
        let frame = BlockFrame::new("anvil-block-code", attrs);
        let language = html::class_token(attrs.str("language"));
        let code_class = if language.is_empty() {
            String::new()
        } else {
            format!(" class=\"language-{language}\"")
        };
        format!(
            "<pre{}><code{code_class}>{}</code></pre>",
            frame.attributes(),
            html::text(attrs.str("content"))
        )
    }
}
