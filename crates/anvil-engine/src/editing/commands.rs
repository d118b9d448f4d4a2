use serde_json::Value;

use crate::model::{Block, BlockId, COLUMNS, Document};
use crate::registry::BlockRegistry;

/// A structural edit of the live document.
///
/// Commands never fail loudly: an unknown id, a non-columns parent or a
/// mistyped attribute turns the command into a no-op.
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Insert a fresh block of a registered type at a top-level index.
    InsertNew { block_type: String, at: usize },
    /// Insert an existing block value (e.g. pasted) at a top-level index.
    Insert { block: Block, at: usize },
    InsertNewIntoColumn {
        block_type: String,
        parent: BlockId,
        column: usize,
    },
    InsertIntoColumn {
        parent: BlockId,
        column: usize,
        block: Block,
    },
    /// Move to the final top-level index `to`; see [`Document::move_block`].
    Move { id: BlockId, to: usize },
    MoveToColumn {
        id: BlockId,
        parent: BlockId,
        column: usize,
    },
    Remove { id: BlockId },
    /// Deep copy with fresh ids, placed directly after the original.
    Duplicate { id: BlockId },
    SetAttribute {
        id: BlockId,
        name: String,
        value: Value,
    },
}

impl Cmd {
    /// Mutate `doc`. Returns the affected block ids, the block the edit is
    /// about first, or `None` when nothing was done.
    pub(crate) fn apply(self, doc: &mut Document, registry: &BlockRegistry) -> Option<Vec<BlockId>> {
        match self {
            Cmd::InsertNew { block_type, at } => {
                let block = instantiate(registry, &block_type)?;
                Cmd::Insert { block, at }.apply(doc, registry)
            }
            Cmd::Insert { block, at } => {
                if !insertable(doc, &block) {
                    return None;
                }
                let id = block.id.clone();
                doc.insert_at(block, at);
                Some(vec![id])
            }
            Cmd::InsertNewIntoColumn {
                block_type,
                parent,
                column,
            } => {
                let block = instantiate(registry, &block_type)?;
                Cmd::InsertIntoColumn {
                    parent,
                    column,
                    block,
                }
                .apply(doc, registry)
            }
            Cmd::InsertIntoColumn {
                parent,
                column,
                block,
            } => {
                if !insertable(doc, &block) {
                    return None;
                }
                let id = block.id.clone();
                doc.insert_into_column(&parent, column, block)
                    .then(|| vec![id, parent])
            }
            Cmd::Move { id, to } => doc.move_block(&id, to).then(|| vec![id]),
            Cmd::MoveToColumn { id, parent, column } => doc
                .move_to_column(&id, &parent, column)
                .then(|| vec![id, parent]),
            Cmd::Remove { id } => doc.remove_from_anywhere(&id).map(|_| vec![id]),
            Cmd::Duplicate { id } => doc.duplicate(&id).map(|copy| vec![copy, id]),
            Cmd::SetAttribute { id, name, value } => {
                let block = doc.get_mut(&id)?;
                if block.is_columns() && name == COLUMNS {
                    log::warn!("`columns` of block {id} is structural; use the column commands");
                    return None;
                }
                // Blocks of unregistered types keep whatever is set.
                if let Ok(definition) = registry.resolve(&block.block_type)
                    && let Err(e) = definition.check(&name, &value)
                {
                    log::warn!("ignoring attribute update on {id}: {e}");
                    return None;
                }
                block.attributes.insert(name, value);
                Some(vec![id])
            }
        }
    }
}

fn instantiate(registry: &BlockRegistry, block_type: &str) -> Option<Block> {
    match registry.resolve(block_type) {
        Ok(definition) => Some(definition.instantiate()),
        Err(e) => {
            log::warn!("cannot insert block: {e}");
            None
        }
    }
}

/// A block value can enter the tree only if its nesting is storable and
/// none of its ids is already taken.
fn insertable(doc: &Document, block: &Block) -> bool {
    if !block.is_well_nested() {
        log::warn!("refusing to insert block {}: columns nested too deep", block.id);
        return false;
    }
    !collides(doc, block)
}

/// Whether any id in `block` (or its columns) already exists in `doc`.
fn collides(doc: &Document, block: &Block) -> bool {
    let nested = block.columns.iter().flat_map(|column| column.blocks.iter());
    let clash = std::iter::once(block)
        .chain(nested)
        .find(|candidate| doc.contains(&candidate.id));
    if let Some(clash) = clash {
        log::warn!("refusing to insert block {}: id already in use", clash.id);
        return true;
    }
    false
}
