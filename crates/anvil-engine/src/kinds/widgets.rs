use serde_json::Value;

use super::media::media_id;
use crate::model::Block;
use crate::registry::{Attrs, BlockType, BlockTypeDefinition, Supports};
use crate::render::{BlockFrame, RenderContext, html};

pub struct Button;

impl BlockType for Button {
    fn definition(&self) -> BlockTypeDefinition {
        BlockTypeDefinition::new("button", "Button", "widgets", "button")
            .string("text", "")
            .string("url", "")
            .string("style", "primary")
            .boolean("newTab", false)
            .supports(Supports::TEXT)
    }

    fn render(&self, _: &Block, attrs: &Attrs<'_>, _: &RenderContext<'_>) -> String {
        let style = html::class_token(attrs.str("style"));
        let frame = BlockFrame::new("anvil-block-button", attrs);
        let target = if attrs.bool("newTab") {
            " target=\"_blank\" rel=\"noopener\""
        } else {
            ""
        };
        format!(
            "<div{}><a class=\"anvil-button anvil-button-{style}\" href=\"{}\"{target}>{}</a></div>",
            frame.attributes(),
            html::attr(html::url(attrs.str("url"))),
            html::text(attrs.str("text"))
        )
    }
}

pub struct Card;

impl BlockType for Card {
    fn definition(&self) -> BlockTypeDefinition {
        BlockTypeDefinition::new("card", "Card", "widgets", "card")
            .string("title", "")
            .string("content", "")
            .integer("mediaId", 0)
            .string("imageUrl", "")
            .string("linkUrl", "")
            .string("linkText", "")
            .supports(Supports::BASIC)
    }

    fn render(&self, _: &Block, attrs: &Attrs<'_>, cx: &RenderContext<'_>) -> String {
        let frame = BlockFrame::new("anvil-block-card", attrs);
        let mut body = String::new();

        let media = media_id(attrs.get("mediaId")).and_then(|id| cx.media().resolve(id));
        let (src, alt) = match &media {
            Some(media) => (html::url(&media.url), media.alt.as_str()),
            None => (html::url(attrs.str("imageUrl")), ""),
        };
        if !src.is_empty() {
            body.push_str(&format!(
                "<img class=\"anvil-card-image\" src=\"{}\" alt=\"{}\" loading=\"lazy\">",
                html::attr(src),
                html::attr(alt)
            ));
        }

        body.push_str("<div class=\"anvil-card-body\">");
        let title = attrs.str("title");
        if !title.is_empty() {
            body.push_str(&format!("<h3 class=\"anvil-card-title\">{}</h3>", html::text(title)));
        }
        let content = attrs.str("content");
        if !content.is_empty() {
            body.push_str(&format!("<p class=\"anvil-card-text\">{}</p>", html::text(content)));
        }
        let link = html::url(attrs.str("linkUrl"));
        if !link.is_empty() {
            let text = match attrs.str("linkText") {
                "" => "Read more",
                text => text,
            };
            body.push_str(&format!(
                "<a class=\"anvil-card-link\" href=\"{}\">{}</a>",
                html::attr(link),
                html::text(text)
            ));
        }
        body.push_str("</div>");

        format!("<div{}>{body}</div>", frame.attributes())
    }
}

/// One table row: cell texts in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableRow(pub Vec<String>);

impl TableRow {
    /// Rows are stored as arrays of cells. Scalar cells are stringified;
    /// anything else becomes an empty cell.
    pub fn from_value(value: &Value) -> Option<Self> {
        let cells = value.as_array()?;
        Some(TableRow(cells.iter().map(cell_text).collect()))
    }

    fn render(&self, cell: &str) -> String {
        let cells: String = self
            .0
            .iter()
            .map(|text| format!("<{cell}>{}</{cell}>", html::text(text)))
            .collect();
        format!("<tr>{cells}</tr>")
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

pub struct Table;

impl BlockType for Table {
    fn definition(&self) -> BlockTypeDefinition {
        BlockTypeDefinition::new("table", "Table", "widgets", "table")
            .array("rows")
            .boolean("hasHeader", false)
            .boolean("striped", false)
            .supports(Supports::BASIC)
    }

    fn render(&self, _: &Block, attrs: &Attrs<'_>, _: &RenderContext<'_>) -> String {
        let frame = BlockFrame::new("anvil-block-table", attrs).class_if(attrs.bool("striped"), "is-striped");
        let rows: Vec<TableRow> = attrs
            .array("rows")
            .iter()
            .filter_map(TableRow::from_value)
            .collect();

        let (head, body) = match rows.split_first() {
            Some((first, rest)) if attrs.bool("hasHeader") => {
                (format!("<thead>{}</thead>", first.render("th")), rest)
            }
            _ => (String::new(), rows.as_slice()),
        };
        let body: String = body.iter().map(|row| row.render("td")).collect();

        format!(
            "<figure{}><table>{head}<tbody>{body}</tbody></table></figure>",
            frame.attributes()
        )
    }
}

/// One collapsible accordion section.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccordionItem {
    pub title: String,
    pub content: String,
}

impl AccordionItem {
    pub fn from_value(value: &Value) -> Option<Self> {
        let item = value.as_object()?;
        let field = |name: &str| item.get(name).map(cell_text).unwrap_or_default();
        Some(AccordionItem {
            title: field("title"),
            content: field("content"),
        })
    }
}

pub struct Accordion;

impl BlockType for Accordion {
    fn definition(&self) -> BlockTypeDefinition {
        BlockTypeDefinition::new("accordion", "Accordion", "widgets", "accordion")
            .array("items")
            .boolean("openFirst", false)
            .supports(Supports::BASIC)
    }

    fn render(&self, _: &Block, attrs: &Attrs<'_>, _: &RenderContext<'_>) -> String {
        let frame = BlockFrame::new("anvil-block-accordion", attrs);
        let open_first = attrs.bool("openFirst");
        let items: String = attrs
            .array("items")
            .iter()
            .filter_map(AccordionItem::from_value)
            .enumerate()
            .map(|(i, item)| {
                let open = if open_first && i == 0 { " open" } else { "" };
                format!(
                    "<details class=\"anvil-accordion-item\"{open}><summary>{}</summary><div class=\"anvil-accordion-content\">{}</div></details>",
                    html::text(&item.title),
                    html::text(&item.content)
                )
            })
            .collect();
        format!("<div{}>{items}</div>", frame.attributes())
    }
}

/// Raw markup from a trusted author. `content` is emitted verbatim.
pub struct Html;

impl BlockType for Html {
    fn definition(&self) -> BlockTypeDefinition {
        BlockTypeDefinition::new("html", "Custom HTML", "widgets", "html")
            .string("content", "")
            .supports(Supports::NONE)
    }

    fn render(&self, _: &Block, attrs: &Attrs<'_>, _: &RenderContext<'_>) -> String {
        attrs.str("content").to_string()
    }
}
