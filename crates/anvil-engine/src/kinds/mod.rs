//! # Core Block Kinds
//!
//! Each block kind is a unit struct implementing [`BlockType`]: it owns its
//! attribute schema and its markup, and nothing else knows either.
//!
//! Palette categories, in registration order: `text`, `media`, `layout`,
//! `widgets`.
//!
//! ## Escaping
//!
//! Every attribute emitted as text or inside an HTML attribute is escaped.
//! The one exception is [`widgets::Html`], whose `content` is emitted
//! verbatim: authors are trusted to inject markup through that block.

pub mod embed;
pub mod layout;
pub mod media;
pub mod text;
pub mod widgets;

use crate::registry::{BlockRegistry, BlockType, RegistryError};

/// Register every core kind, in palette order.
pub fn register_core_blocks(registry: &mut BlockRegistry) -> Result<(), RegistryError> {
    let kinds: Vec<Box<dyn BlockType>> = vec![
        Box::new(text::Paragraph),
        Box::new(text::Heading),
        Box::new(text::List),
        Box::new(text::Quote),
        Box::new(text::Code),
        Box::new(media::Image),
        Box::new(media::Gallery),
        Box::new(embed::Embed),
        Box::new(layout::Columns),
        Box::new(layout::Spacer),
        Box::new(layout::Separator),
        Box::new(widgets::Button),
        Box::new(widgets::Card),
        Box::new(widgets::Table),
        Box::new(widgets::Accordion),
        Box::new(widgets::Html),
    ];
    for kind in kinds {
        registry.register_boxed(kind)?;
    }
    Ok(())
}
