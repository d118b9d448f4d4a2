use std::collections::HashSet;

use serde_json::Value;

use super::{Block, BlockId, COLUMNS, Column, Location};
use crate::parsing;

/// Stored `columnCount` assumed when a columns block has none set.
pub const DEFAULT_COLUMN_COUNT: usize = 2;

/// The ordered top-level sequence of blocks for one page.
///
/// All structural operations are fail-soft: a missing id or an invalid target
/// turns the operation into a no-op (reported through the return value)
/// rather than an error, so a stale drag or a concurrent removal can never
/// corrupt the tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Every block in document order: each top-level block followed by the
    /// contents of its columns.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().flat_map(|block| {
            std::iter::once(block).chain(
                block
                    .columns
                    .iter()
                    .flat_map(|column| column.blocks.iter()),
            )
        })
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.iter().any(|block| &block.id == id)
    }

    /// Locate a block. Top-level blocks are searched first, then each columns
    /// block's columns in document order.
    pub fn find_location(&self, id: &BlockId) -> Option<Location> {
        if let Some(index) = self.blocks.iter().position(|b| &b.id == id) {
            return Some(Location::TopLevel(index));
        }

        self.blocks.iter().find_map(|parent| {
            parent
                .columns
                .iter()
                .enumerate()
                .find_map(|(column, col)| {
                    col.blocks
                        .iter()
                        .position(|b| &b.id == id)
                        .map(|index| Location::Column {
                            parent: parent.id.clone(),
                            column,
                            index,
                        })
                })
        })
    }

    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        match self.find_location(id)? {
            Location::TopLevel(index) => self.blocks.get(index),
            Location::Column {
                parent,
                column,
                index,
            } => self
                .top_level(&parent)?
                .columns
                .get(column)?
                .blocks
                .get(index),
        }
    }

    pub fn get_mut(&mut self, id: &BlockId) -> Option<&mut Block> {
        match self.find_location(id)? {
            Location::TopLevel(index) => self.blocks.get_mut(index),
            Location::Column {
                parent,
                column,
                index,
            } => self
                .top_level_mut(&parent)?
                .columns
                .get_mut(column)?
                .blocks
                .get_mut(index),
        }
    }

    /// Splice a block out of wherever it lives.
    pub fn remove_from_anywhere(&mut self, id: &BlockId) -> Option<Block> {
        match self.find_location(id)? {
            Location::TopLevel(index) => Some(self.blocks.remove(index)),
            Location::Column {
                parent,
                column,
                index,
            } => {
                let col = self.top_level_mut(&parent)?.columns.get_mut(column)?;
                Some(col.blocks.remove(index))
            }
        }
    }

    /// Insert into the top-level sequence, clamping `index` to `[0, len]`.
    /// Returns the index actually used.
    ///
    /// A columns block arriving here from inside a column (or from a paste)
    /// may still carry its columns as a raw attribute; those are lifted into
    /// real columns so what renders is what gets stored.
    pub fn insert_at(&mut self, mut block: Block, index: usize) -> usize {
        if block.is_columns() && block.attributes.contains_key(COLUMNS) {
            let mut taken: HashSet<BlockId> = self.iter().map(|b| b.id.clone()).collect();
            taken.insert(block.id.clone());
            parsing::lift_raw_columns(&mut block, taken);
        }
        let index = index.min(self.blocks.len());
        self.blocks.insert(index, block);
        index
    }

    /// Append `block` to column `column` of the columns block `parent`.
    ///
    /// Returns `false` (and discards nothing from the tree) when the parent is
    /// missing, is not a columns block, or when `block` is itself a columns
    /// block.
    pub fn insert_into_column(&mut self, parent: &BlockId, column: usize, block: Block) -> bool {
        self.try_insert_into_column(parent, column, block).is_ok()
    }

    /// Like [`Self::insert_into_column`], but hands the block back on failure.
    pub fn try_insert_into_column(
        &mut self,
        parent: &BlockId,
        column: usize,
        block: Block,
    ) -> Result<(), Block> {
        if block.is_columns() {
            log::warn!("refusing to nest columns block {} inside a column", block.id);
            return Err(block);
        }

        let Some(target) = self.top_level_mut(parent).filter(|b| b.is_columns()) else {
            log::warn!("column insert target {parent} is not a top-level columns block");
            return Err(block);
        };

        grow_columns(target, column);
        target.columns[column].blocks.push(block);
        Ok(())
    }

    /// Move a block to the top level so that it ends up at index `to` of the
    /// resulting sequence (clamped).
    ///
    /// `to` counts positions with the moved block already taken out, so
    /// moving the first of `[A, B, C]` to `2` yields `[B, C, A]`. Drop gaps
    /// measured against the rendered siblings are converted with
    /// [`Document::gap_to_index`].
    pub fn move_block(&mut self, id: &BlockId, to: usize) -> bool {
        let Some(block) = self.remove_from_anywhere(id) else {
            return false;
        };
        self.insert_at(block, to);
        true
    }

    /// Translate a visual drop gap (`0..=len`, counted over the siblings
    /// including the dragged block) into a [`Document::move_block`] target.
    /// A gap after the block's current position is one less once the block
    /// has been lifted out.
    pub fn gap_to_index(&self, id: &BlockId, gap: usize) -> usize {
        match self.find_location(id) {
            Some(Location::TopLevel(current)) if gap > current => gap - 1,
            _ => gap,
        }
    }

    /// Move a block to the end of a column. If the parent cannot be resolved
    /// as a columns block the block is appended to the top level instead, so
    /// content is never lost. Columns blocks cannot be moved into a column.
    pub fn move_to_column(&mut self, id: &BlockId, parent: &BlockId, column: usize) -> bool {
        match self.get(id) {
            None => return false,
            Some(block) if block.is_columns() => {
                log::warn!("refusing to move columns block {id} into a column");
                return false;
            }
            Some(_) => {}
        }

        let Some(block) = self.remove_from_anywhere(id) else {
            return false;
        };

        if let Err(block) = self.try_insert_into_column(parent, column, block) {
            self.blocks.push(block);
        }
        true
    }

    /// Insert a fresh-id copy of `id` directly after it, in the same
    /// container. Returns the new block's id.
    pub fn duplicate(&mut self, id: &BlockId) -> Option<BlockId> {
        let copy = self.get(id)?.fresh_copy();
        let new_id = copy.id.clone();

        match self.find_location(id)? {
            Location::TopLevel(index) => {
                self.blocks.insert(index + 1, copy);
            }
            Location::Column {
                parent,
                column,
                index,
            } => {
                let col = self.top_level_mut(&parent)?.columns.get_mut(column)?;
                col.blocks.insert(index + 1, copy);
            }
        }
        Some(new_id)
    }

    fn top_level(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    fn top_level_mut(&mut self, id: &BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| &b.id == id)
    }
}

/// Grow `parent.columns` so that `column` is a valid index. Existing columns
/// keep their position and contents. A stored `columnCount` smaller than the
/// new column total is raised to match so the added columns are rendered.
fn grow_columns(parent: &mut Block, column: usize) {
    debug_assert_eq!(parent.block_type, COLUMNS);
    if parent.columns.len() > column {
        return;
    }
    parent.columns.resize_with(column + 1, Column::default);

    let stored = parent
        .attributes
        .get("columnCount")
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_COLUMN_COUNT);
    if stored < parent.columns.len() {
        parent
            .attributes
            .insert("columnCount".to_string(), Value::from(parent.columns.len()));
    }
}

impl From<Vec<Block>> for Document {
    fn from(blocks: Vec<Block>) -> Self {
        Self::from_blocks(blocks)
    }
}
