//! Content filter chain applied to a page's rendered markup.
//!
//! Block rendering produces a fragment; themes and plugins may wrap or
//! rewrite it afterwards. Filters run in ascending priority, ties in the
//! order they were added.

use anyhow::Context;

use crate::io::ContentStore;
use crate::render::Renderer;

pub const DEFAULT_PRIORITY: i32 = 10;

type Filter = Box<dyn Fn(String) -> String + Send + Sync>;

#[derive(Default)]
pub struct ContentFilters {
    filters: Vec<(i32, Filter)>,
}

impl ContentFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, filter: impl Fn(String) -> String + Send + Sync + 'static) -> &mut Self {
        self.add_with_priority(DEFAULT_PRIORITY, filter)
    }

    pub fn add_with_priority(
        &mut self,
        priority: i32,
        filter: impl Fn(String) -> String + Send + Sync + 'static,
    ) -> &mut Self {
        // After every filter of equal or lower priority.
        let at = self
            .filters
            .iter()
            .position(|(p, _)| *p > priority)
            .unwrap_or(self.filters.len());
        self.filters.insert(at, (priority, Box::new(filter)));
        self
    }

    pub fn apply(&self, html: String) -> String {
        self.filters.iter().fold(html, |html, (_, filter)| filter(html))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl std::fmt::Debug for ContentFilters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentFilters")
            .field("priorities", &self.filters.iter().map(|(p, _)| p).collect::<Vec<_>>())
            .finish()
    }
}

/// Render stored page content (block tree or legacy markup) and run it
/// through the filter chain.
pub fn render_page(renderer: &Renderer<'_>, stored: &str, filters: &ContentFilters) -> String {
    filters.apply(renderer.render_stored(stored))
}

/// Load `content_id` from `store` and render it as a full page. Missing
/// content renders as an empty page.
pub fn render_content_page(
    store: &dyn ContentStore,
    content_id: &str,
    renderer: &Renderer<'_>,
    filters: &ContentFilters,
) -> anyhow::Result<String> {
    let stored = store
        .load(content_id)
        .with_context(|| format!("failed to load content `{content_id}`"))?
        .unwrap_or_default();
    Ok(render_page(renderer, &stored, filters))
}
