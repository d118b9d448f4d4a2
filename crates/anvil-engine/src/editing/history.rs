use crate::model::Document;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Bounded undo/redo stacks of whole-document snapshots.
#[derive(Debug, Clone)]
pub struct History {
    undo: Vec<Document>,
    redo: Vec<Document>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            limit,
        }
    }

    /// Record the state before a mutation. Any pending redo is discarded.
    pub fn record(&mut self, before: Document) {
        self.undo.push(before);
        self.trim_undo();
        self.redo.clear();
    }

    /// Step back: returns the previous document and keeps `current` for redo.
    pub fn undo(&mut self, current: &Document) -> Option<Document> {
        let previous = self.undo.pop()?;
        self.redo.push(current.clone());
        trim_history_stack(&mut self.redo, self.limit);
        Some(previous)
    }

    pub fn redo(&mut self, current: &Document) -> Option<Document> {
        let next = self.redo.pop()?;
        self.undo.push(current.clone());
        self.trim_undo();
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn trim_undo(&mut self) {
        trim_history_stack(&mut self.undo, self.limit);
    }
}

/// Drop the oldest entries so at most `limit` remain.
fn trim_history_stack(entries: &mut Vec<Document>, limit: usize) {
    if entries.len() > limit {
        let drop_count = entries.len() - limit;
        entries.drain(0..drop_count);
    }
}
