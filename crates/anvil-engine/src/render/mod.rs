//! # Block Renderer
//!
//! Turns a document tree into HTML. Rendering is a pure function of the
//! blocks, the registry and the media resolver: no counters, no randomness,
//! so rendering an unchanged tree twice yields identical bytes.
//!
//! A block whose type is not registered renders as an empty string and is
//! left untouched in the tree; its siblings render normally.

pub mod html;

use crate::media::{MediaResolver, NoMedia};
use crate::model::Block;
use crate::parsing;
use crate::registry::{Attrs, BlockRegistry};

use html::ClassList;

static NO_MEDIA: NoMedia = NoMedia;

pub struct Renderer<'a> {
    registry: &'a BlockRegistry,
    media: &'a dyn MediaResolver,
}

impl<'a> Renderer<'a> {
    pub fn new(registry: &'a BlockRegistry) -> Self {
        Self {
            registry,
            media: &NO_MEDIA,
        }
    }

    pub fn with_media(mut self, media: &'a dyn MediaResolver) -> Self {
        self.media = media;
        self
    }

    pub fn registry(&self) -> &'a BlockRegistry {
        self.registry
    }

    /// Render one top-level block.
    pub fn render(&self, block: &Block) -> String {
        self.render_at(block, 0)
    }

    /// Render a block sequence in order.
    pub fn render_document(&self, blocks: &[Block]) -> String {
        self.render_sequence(blocks, 0)
    }

    /// Render stored page content: tree-structured content goes through the
    /// block renderer, anything else is legacy markup and passes through.
    pub fn render_stored(&self, stored: &str) -> String {
        match parsing::parse(stored) {
            Some(doc) => self.render_document(doc.blocks()),
            None => stored.to_string(),
        }
    }

    fn render_sequence(&self, blocks: &[Block], depth: usize) -> String {
        blocks
            .iter()
            .map(|block| self.render_at(block, depth))
            .collect()
    }

    fn render_at(&self, block: &Block, depth: usize) -> String {
        let Some((definition, kind)) = self.registry.lookup(&block.block_type) else {
            log::warn!(
                "skipping block {} of unknown type `{}`",
                block.id,
                block.block_type
            );
            return String::new();
        };
        let attrs = Attrs::new(definition, &block.attributes);
        let cx = RenderContext {
            renderer: self,
            depth,
        };
        kind.render(block, &attrs, &cx)
    }
}

/// What a block kind can reach while rendering.
pub struct RenderContext<'a> {
    renderer: &'a Renderer<'a>,
    depth: usize,
}

impl RenderContext<'_> {
    /// Nesting depth: 0 for top-level blocks, 1 inside a column.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn media(&self) -> &dyn MediaResolver {
        self.renderer.media
    }

    /// Render a nested block sequence one level deeper.
    pub fn render_children(&self, blocks: &[Block]) -> String {
        self.renderer.render_sequence(blocks, self.depth + 1)
    }
}

/// Wrapper classes and id derived from a block's supported capabilities.
#[derive(Debug, Clone)]
pub struct BlockFrame {
    classes: ClassList,
    custom: ClassList,
    anchor: Option<String>,
}

impl BlockFrame {
    /// Start from `base` and apply alignment, custom class and anchor when the
    /// block type supports them.
    pub fn new(base: &str, attrs: &Attrs<'_>) -> Self {
        let supports = attrs.definition().supports;
        let mut classes = ClassList::new(base);
        let mut custom = ClassList::default();
        let mut anchor = None;

        if supports.alignment {
            let align = attrs.str("align");
            if !align.is_empty() {
                classes.push(&format!("has-text-align-{align}"));
            }
        }
        if supports.anchor {
            let id = attrs.str("anchor").trim();
            if !id.is_empty() {
                anchor = Some(id.to_string());
            }
        }
        if supports.custom_class_name {
            custom.extend_from(attrs.str("className"));
        }

        Self {
            classes,
            custom,
            anchor,
        }
    }

    pub fn class(mut self, token: &str) -> Self {
        self.classes.push(token);
        self
    }

    pub fn class_if(mut self, condition: bool, token: &str) -> Self {
        self.classes.push_if(condition, token);
        self
    }

    /// ` class="…"` plus ` id="…"` when an anchor is set. Author-supplied
    /// classes come last.
    pub fn attributes(&self) -> String {
        let mut classes = self.classes.clone();
        classes.extend_from(&self.custom.to_string());
        let mut out = format!(" class=\"{}\"", html::attr(&classes.to_string()));
        if let Some(anchor) = &self.anchor {
            out.push_str(&format!(" id=\"{}\"", html::attr(anchor)));
        }
        out
    }
}
