use crate::model::{Block, Column};
use crate::registry::{Attrs, BlockType, BlockTypeDefinition, Supports};
use crate::render::{BlockFrame, RenderContext, html};

pub const MIN_COLUMNS: i64 = 2;
pub const MAX_COLUMNS: i64 = 6;

pub struct Columns;

impl BlockType for Columns {
    fn definition(&self) -> BlockTypeDefinition {
        BlockTypeDefinition::new("columns", "Columns", "layout", "columns")
            .integer("columnCount", 2)
            .string("gap", "md")
            .string("verticalAlign", "")
            .supports(Supports {
                nested_blocks: true,
                ..Supports::BASIC
            })
    }

    /// Exactly `columnCount` column wrappers, clamped to 2..=6. Extra stored
    /// columns are not rendered; missing ones render empty.
    fn render(&self, block: &Block, attrs: &Attrs<'_>, cx: &RenderContext<'_>) -> String {
        if cx.depth() > 0 {
            log::warn!("columns block {} nested inside a column; not rendered", block.id);
            return String::new();
        }

        let count = attrs.int_clamped("columnCount", MIN_COLUMNS, MAX_COLUMNS) as usize;
        let valign = attrs.str("verticalAlign");
        let frame = BlockFrame::new("anvil-block-columns", attrs)
            .class(&format!("anvil-columns-{count}"))
            .class(&format!("anvil-gap-{}", html::class_token(attrs.str("gap"))))
            .class_if(!valign.is_empty(), &format!("is-vertically-aligned-{valign}"));

        let empty = Column::default();
        let columns: String = (0..count)
            .map(|i| {
                let column = block.columns.get(i).unwrap_or(&empty);
                format!(
                    "<div class=\"anvil-column\">{}</div>",
                    cx.render_children(&column.blocks)
                )
            })
            .collect();

        format!("<div{}>{columns}</div>", frame.attributes())
    }
}

pub struct Spacer;

impl BlockType for Spacer {
    fn definition(&self) -> BlockTypeDefinition {
        BlockTypeDefinition::new("spacer", "Spacer", "layout", "spacer")
            .integer("height", 40)
            .supports(Supports::NONE)
    }

    fn render(&self, _: &Block, attrs: &Attrs<'_>, _: &RenderContext<'_>) -> String {
        let height = attrs.int_clamped("height", 0, 500);
        format!(
            "<div{} style=\"height:{height}px\" aria-hidden=\"true\"></div>",
            BlockFrame::new("anvil-block-spacer", attrs).attributes()
        )
    }
}

pub struct Separator;

impl BlockType for Separator {
    fn definition(&self) -> BlockTypeDefinition {
        BlockTypeDefinition::new("separator", "Separator", "layout", "separator")
            .string("style", "default")
            .supports(Supports::BASIC)
    }

    fn render(&self, _: &Block, attrs: &Attrs<'_>, _: &RenderContext<'_>) -> String {
        let style = match html::class_token(attrs.str("style")) {
            s if s.is_empty() => "default".to_string(),
            s => s,
        };
        let frame = BlockFrame::new("anvil-block-separator", attrs).class(&format!("is-style-{style}"));
        format!("<hr{}>", frame.attributes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BlockRegistry;
    use crate::render::Renderer;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn render(block: Block) -> String {
        let registry = BlockRegistry::with_core_blocks();
        Renderer::new(&registry).render(&block)
    }

    fn column_count(html: &str) -> usize {
        html.matches(r#"<div class="anvil-column">"#).count()
    }

    #[rstest]
    #[case(1, 2)]
    #[case(3, 3)]
    #[case(9, 6)]
    fn column_count_is_clamped(#[case] requested: i64, #[case] rendered: usize) {
        let html = render(Block::new("columns").attr("columnCount", requested));
        assert_eq!(column_count(&html), rendered);
        assert!(html.contains(&format!("anvil-columns-{rendered}")));
    }

    #[test]
    fn missing_columns_render_empty() {
        let block = Block::new("columns")
            .attr("columnCount", 4)
            .with_columns(vec![
                Column::new(vec![Block::new("paragraph").attr("content", "a")]),
                Column::new(vec![Block::new("paragraph").attr("content", "b")]),
            ]);

        assert_eq!(
            render(block),
            concat!(
                r#"<div class="anvil-block-columns anvil-columns-4 anvil-gap-md">"#,
                r#"<div class="anvil-column"><p class="anvil-block-paragraph">a</p></div>"#,
                r#"<div class="anvil-column"><p class="anvil-block-paragraph">b</p></div>"#,
                r#"<div class="anvil-column"></div>"#,
                r#"<div class="anvil-column"></div>"#,
                "</div>"
            )
        );
    }

    #[test]
    fn extra_stored_columns_are_not_rendered() {
        let block = Block::new("columns").with_columns(vec![
            Column::default(),
            Column::default(),
            Column::new(vec![Block::new("paragraph").attr("content", "hidden")]),
        ]);
        let html = render(block);
        assert_eq!(column_count(&html), 2);
        assert!(!html.contains("hidden"));
    }

    #[test]
    fn nested_columns_are_not_rendered() {
        let inner = Block::new("columns").with_columns(vec![Column::new(vec![
            Block::new("paragraph").attr("content", "deep"),
        ])]);
        let outer = Block::new("columns")
            .attr("verticalAlign", "center")
            .with_columns(vec![Column::new(vec![inner])]);

        let html = render(outer);

        assert!(html.contains("is-vertically-aligned-center"));
        assert!(!html.contains("deep"));
        assert_eq!(column_count(&html), 2);
    }

    #[rstest]
    #[case(serde_json::json!(80), "80")]
    #[case(serde_json::json!(-5), "0")]
    #[case(serde_json::json!(9000), "500")]
    fn spacer_height(#[case] height: serde_json::Value, #[case] px: &str) {
        assert_eq!(
            render(Block::new("spacer").attr("height", height)),
            format!(r#"<div class="anvil-block-spacer" style="height:{px}px" aria-hidden="true"></div>"#)
        );
    }

    #[test]
    fn separator_style() {
        assert_eq!(
            render(Block::new("separator").attr("style", "dots")),
            r#"<hr class="anvil-block-separator is-style-dots">"#
        );
        assert_eq!(
            render(Block::new("separator")),
            r#"<hr class="anvil-block-separator is-style-default">"#
        );
    }
}
