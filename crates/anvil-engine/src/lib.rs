pub mod editing;
pub mod filters;
pub mod io;
pub mod kinds;
pub mod media;
pub mod model;
pub mod parsing;
pub mod registry;
pub mod render;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use editing::{
    Autosave, Cmd, DragController, DragKind, DropTarget, EditingSession, LayoutSnapshot, Patch,
    Point, Rect, SessionOptions,
};
pub use filters::{ContentFilters, render_content_page, render_page};
pub use io::{ContentStore, FileStore, MemoryStore, StoreError};
pub use kinds::register_core_blocks;
pub use media::{Media, MediaLibrary, MediaResolver, NoMedia};
pub use model::{Block, BlockId, COLUMNS, Column, Document, Location};
pub use parsing::{parse, serialize};
pub use registry::{
    AttrKind, AttributeError, AttributeSchema, Attrs, BlockRegistry, BlockType,
    BlockTypeDefinition, Category, RegistryError, Supports,
};
pub use render::{RenderContext, Renderer};
