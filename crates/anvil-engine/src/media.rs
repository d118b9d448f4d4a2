//! Media/asset lookup used by blocks that reference uploaded files.

use std::collections::HashMap;

/// A resolved upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub url: String,
    pub alt: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Media {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt: String::new(),
            width: None,
            height: None,
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = alt.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// Resolves media ids. An unresolved id means "no media"; blocks render
/// their fallback instead of failing.
pub trait MediaResolver: Send + Sync {
    fn resolve(&self, id: u64) -> Option<Media>;
}

/// Resolver that knows no media at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMedia;

impl MediaResolver for NoMedia {
    fn resolve(&self, _id: u64) -> Option<Media> {
        None
    }
}

/// In-memory media table.
#[derive(Debug, Clone, Default)]
pub struct MediaLibrary {
    items: HashMap<u64, Media>,
}

impl MediaLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u64, media: Media) {
        self.items.insert(id, media);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl MediaResolver for MediaLibrary {
    fn resolve(&self, id: u64) -> Option<Media> {
        self.items.get(&id).cloned()
    }
}

impl FromIterator<(u64, Media)> for MediaLibrary {
    fn from_iter<T: IntoIterator<Item = (u64, Media)>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
