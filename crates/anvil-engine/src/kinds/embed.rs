use std::sync::LazyLock;

use regex::Regex;

use crate::kinds::media::caption;
use crate::model::Block;
use crate::registry::{Attrs, BlockType, BlockTypeDefinition, Supports};
use crate::render::{BlockFrame, RenderContext, html};

static YOUTUBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com/(?:watch\?(?:.*&)?v=|embed/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{11})")
        .expect("youtube pattern is valid")
});

static VIMEO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"vimeo\.com/(?:video/)?(\d+)").expect("vimeo pattern is valid"));

const DEFAULT_RATIO: (f64, f64) = (16.0, 9.0);

/// Where an embed URL points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedProvider {
    YouTube { video_id: String },
    Vimeo { video_id: String },
    Generic,
}

impl EmbedProvider {
    pub fn name(&self) -> &'static str {
        match self {
            EmbedProvider::YouTube { .. } => "youtube",
            EmbedProvider::Vimeo { .. } => "vimeo",
            EmbedProvider::Generic => "generic",
        }
    }

    /// Player URL for the iframe. Generic embeds use the URL as given.
    pub fn player_url<'a>(&self, url: &'a str) -> std::borrow::Cow<'a, str> {
        match self {
            EmbedProvider::YouTube { video_id } => {
                format!("https://www.youtube.com/embed/{video_id}").into()
            }
            EmbedProvider::Vimeo { video_id } => {
                format!("https://player.vimeo.com/video/{video_id}").into()
            }
            EmbedProvider::Generic => url.into(),
        }
    }
}

pub fn detect_provider(url: &str) -> EmbedProvider {
    if let Some(caps) = YOUTUBE.captures(url) {
        return EmbedProvider::YouTube {
            video_id: caps[1].to_string(),
        };
    }
    if let Some(caps) = VIMEO.captures(url) {
        return EmbedProvider::Vimeo {
            video_id: caps[1].to_string(),
        };
    }
    EmbedProvider::Generic
}

/// Parse `W:H` or `W/H`. Anything malformed or non-positive is `None`.
pub fn parse_aspect_ratio(ratio: &str) -> Option<(f64, f64)> {
    let (w, h) = ratio.split_once([':', '/'])?;
    let w: f64 = w.trim().parse().ok()?;
    let h: f64 = h.trim().parse().ok()?;
    (w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0).then_some((w, h))
}

pub struct Embed;

impl BlockType for Embed {
    fn definition(&self) -> BlockTypeDefinition {
        BlockTypeDefinition::new("embed", "Embed", "media", "embed")
            .string("url", "")
            .string("aspectRatio", "16:9")
            .string("caption", "")
            .supports(Supports::BASIC)
    }

    fn render(&self, _: &Block, attrs: &Attrs<'_>, _: &RenderContext<'_>) -> String {
        let url = html::url(attrs.str("url"));
        if url.is_empty() {
            return String::new();
        }

        let provider = detect_provider(url);
        let ratio = attrs.str("aspectRatio");
        let (w, h) = parse_aspect_ratio(ratio).unwrap_or_else(|| {
            log::debug!("embed aspect ratio `{ratio}` is malformed; using 16:9");
            DEFAULT_RATIO
        });
        let frame = BlockFrame::new("anvil-block-embed", attrs)
            .class(&format!("is-provider-{}", provider.name()));

        format!(
            concat!(
                "<figure{}>",
                "<div class=\"anvil-embed-wrapper\" style=\"padding-top:{}%\">",
                "<iframe src=\"{}\" allowfullscreen loading=\"lazy\"></iframe>",
                "</div>{}</figure>"
            ),
            frame.attributes(),
            html::percent(h / w * 100.0),
            html::attr(&provider.player_url(url)),
            caption(attrs.str("caption"))
        )
    }
}
