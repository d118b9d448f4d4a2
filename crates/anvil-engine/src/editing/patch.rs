use crate::model::BlockId;

/// Result of applying an edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Blocks whose subtree must be re-rendered. Empty means the whole
    /// document (undo/redo).
    pub affected: Vec<BlockId>,
    pub version: u64,
}

impl Patch {
    pub fn whole_document(version: u64) -> Self {
        Self {
            affected: Vec::new(),
            version,
        }
    }

    pub fn is_whole_document(&self) -> bool {
        self.affected.is_empty()
    }
}
