use serde_json::Value;

use crate::media::Media;
use crate::model::Block;
use crate::registry::{Attrs, BlockType, BlockTypeDefinition, Supports};
use crate::render::{BlockFrame, RenderContext, html};

pub struct Image;

impl BlockType for Image {
    fn definition(&self) -> BlockTypeDefinition {
        BlockTypeDefinition::new("image", "Image", "media", "image")
            .integer("mediaId", 0)
            .string("url", "")
            .string("alt", "")
            .string("caption", "")
            .integer("width", 0)
            .supports(Supports::TEXT)
    }

    fn render(&self, _: &Block, attrs: &Attrs<'_>, cx: &RenderContext<'_>) -> String {
        let frame = BlockFrame::new("anvil-block-image", attrs);
        let media = media_id(attrs.get("mediaId")).and_then(|id| cx.media().resolve(id));

        let src = match &media {
            Some(media) => media.url.as_str(),
            None => attrs.str("url"),
        };
        let src = html::url(src);
        if src.is_empty() {
            return format!("<figure{}></figure>", frame.class("anvil-no-media").attributes());
        }

        let alt = match attrs.str("alt") {
            "" => media.as_ref().map(|m| m.alt.as_str()).unwrap_or(""),
            alt => alt,
        };
        let mut img = format!(
            "<img src=\"{}\" alt=\"{}\"",
            html::attr(src),
            html::attr(alt)
        );
        let width = attrs.int("width");
        if width > 0 {
            img.push_str(&format!(" width=\"{width}\""));
        } else if let Some(Media {
            width: Some(w),
            height: Some(h),
            ..
        }) = &media
        {
            img.push_str(&format!(" width=\"{w}\" height=\"{h}\""));
        }
        img.push_str(" loading=\"lazy\">");

        format!(
            "<figure{}>{img}{}</figure>",
            frame.attributes(),
            caption(attrs.str("caption"))
        )
    }
}

pub struct Gallery;

impl BlockType for Gallery {
    fn definition(&self) -> BlockTypeDefinition {
        BlockTypeDefinition::new("gallery", "Gallery", "media", "gallery")
            .array("mediaIds")
            .integer("columns", 3)
            .supports(Supports::BASIC)
    }

    fn render(&self, _: &Block, attrs: &Attrs<'_>, cx: &RenderContext<'_>) -> String {
        let columns = attrs.int_clamped("columns", 1, 6);
        let frame = BlockFrame::new("anvil-block-gallery", attrs)
            .class(&format!("anvil-gallery-columns-{columns}"));

        let items: String = attrs
            .array("mediaIds")
            .iter()
            .filter_map(media_id)
            .filter_map(|id| cx.media().resolve(id))
            .filter(|media| !html::url(&media.url).is_empty())
            .map(|media| {
                format!(
                    "<figure class=\"anvil-gallery-item\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\"></figure>",
                    html::attr(html::url(&media.url)),
                    html::attr(&media.alt)
                )
            })
            .collect();

        if items.is_empty() {
            return format!("<div{}></div>", frame.class("anvil-no-media").attributes());
        }
        format!("<div{}>{items}</div>", frame.attributes())
    }
}

/// Positive media id from a stored number or numeric string.
pub(crate) fn media_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|id| *id > 0)
}

pub(crate) fn caption(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("<figcaption>{}</figcaption>", html::text(text))
    }
}
