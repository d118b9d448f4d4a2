//! # Document Tree Model
//!
//! A page's content is an ordered sequence of [`Block`]s. Exactly one block
//! type, [`COLUMNS`], owns nested content: an ordered list of [`Column`]s, each
//! of which is again an ordered sequence of blocks.
//!
//! ## Key Invariants
//!
//! - Nesting is one level deep. A columns block inside a column never carries
//!   nested columns of its own; the tree operations refuse to create one.
//! - Every block is reachable through exactly one [`Location`].
//! - Block ids are opaque, stable across edits and never reused.

pub mod document;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub use document::Document;

/// Name of the only block type allowed to own nested blocks.
pub const COLUMNS: &str = "columns";

/// Stable identifier of a block.
///
/// Ids loaded from storage are preserved verbatim; fresh ids are random
/// (UUID v4) so they cannot collide within an editing session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub String);

impl BlockId {
    /// Generate a fresh, never-before-seen id.
    pub fn new() -> Self {
        Self(format!("block-{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A single typed content node.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    /// Registered block type name, e.g. `"paragraph"`.
    pub block_type: String,
    /// Explicitly set attributes only. Schema defaults are applied when the
    /// block is read through [`crate::registry::Attrs`], never stored here.
    pub attributes: Map<String, Value>,
    /// Nested columns. Always empty unless `block_type == COLUMNS`.
    pub columns: Vec<Column>,
}

impl Block {
    /// Create a block of the given type with a fresh id and no attributes.
    pub fn new(block_type: impl Into<String>) -> Self {
        Self::with_id(BlockId::new(), block_type)
    }

    pub fn with_id(id: BlockId, block_type: impl Into<String>) -> Self {
        Self {
            id,
            block_type: block_type.into(),
            attributes: Map::new(),
            columns: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder-style column setter.
    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn is_columns(&self) -> bool {
        self.block_type == COLUMNS
    }

    /// Only a columns block may hold columns, and nothing inside a column
    /// may be a columns block or hold columns of its own.
    pub fn is_well_nested(&self) -> bool {
        (self.columns.is_empty() || self.is_columns())
            && self
                .columns
                .iter()
                .flat_map(|column| column.blocks.iter())
                .all(|child| !child.is_columns() && child.columns.is_empty())
    }

    /// Deep copy with fresh ids for this block and every nested block.
    pub fn fresh_copy(&self) -> Self {
        Self {
            id: BlockId::new(),
            block_type: self.block_type.clone(),
            attributes: self.attributes.clone(),
            columns: self
                .columns
                .iter()
                .map(|column| Column::new(column.blocks.iter().map(Block::fresh_copy).collect()))
                .collect(),
        }
    }
}

/// An ordered sequence of blocks nested inside a columns block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Column {
    pub blocks: Vec<Block>,
}

impl Column {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Where a block currently lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Index into the document's top-level sequence.
    TopLevel(usize),
    /// Position inside one column of a top-level columns block.
    Column {
        parent: BlockId,
        column: usize,
        index: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fresh_ids_are_unique() {
        let a = BlockId::new();
        let b = BlockId::new();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("block-"));
    }

    #[test]
    fn fresh_copy_regenerates_nested_ids() {
        let inner = Block::new("paragraph").attr("content", "hi");
        let original = Block::new(COLUMNS).with_columns(vec![
            Column::new(vec![inner.clone()]),
            Column::default(),
        ]);

        let copy = original.fresh_copy();

        assert_ne!(copy.id, original.id);
        assert_ne!(copy.columns[0].blocks[0].id, inner.id);
        assert_eq!(copy.columns[0].blocks[0].attributes["content"], json!("hi"));
        assert_eq!(copy.columns.len(), 2);
    }

    #[test]
    fn block_id_serializes_as_plain_string() {
        let id = BlockId::from("abc");
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("abc"));
    }
}
