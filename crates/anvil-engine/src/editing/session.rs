use std::time::{Duration, Instant};

use crate::editing::autosave::DEFAULT_AUTOSAVE_DELAY;
use crate::editing::history::DEFAULT_HISTORY_LIMIT;
use crate::editing::{
    Autosave, Cmd, DragController, DragKind, DropTarget, History, LayoutSnapshot, Patch, Point,
};
use crate::io::{ContentStore, StoreError};
use crate::model::{Block, BlockId, Document};
use crate::parsing;
use crate::registry::{BlockRegistry, Category};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub history_limit: usize,
    pub autosave_delay: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            autosave_delay: DEFAULT_AUTOSAVE_DELAY,
        }
    }
}

/// The live, mutable state of one open editor.
pub struct EditingSession<'r> {
    registry: &'r BlockRegistry,
    content_id: String,
    document: Document,
    saved: Document,
    selected: Option<BlockId>,
    history: History,
    drag: DragController,
    autosave: Autosave,
    version: u64,
}

impl<'r> EditingSession<'r> {
    pub fn new(registry: &'r BlockRegistry, content_id: impl Into<String>, document: Document) -> Self {
        Self::with_options(registry, content_id, document, SessionOptions::default())
    }

    pub fn with_options(
        registry: &'r BlockRegistry,
        content_id: impl Into<String>,
        document: Document,
        options: SessionOptions,
    ) -> Self {
        Self {
            registry,
            content_id: content_id.into(),
            saved: document.clone(),
            document,
            selected: None,
            history: History::new(options.history_limit),
            drag: DragController::new(),
            autosave: Autosave::new(options.autosave_delay),
            version: 0,
        }
    }

    /// Open `content_id` from `store`. Missing content starts an empty
    /// document; legacy free-form content becomes a single `html` block.
    pub fn load(
        registry: &'r BlockRegistry,
        store: &dyn ContentStore,
        content_id: &str,
        options: SessionOptions,
    ) -> Result<Self, StoreError> {
        let document = match store.load(content_id)? {
            None => Document::new(),
            Some(text) => parsing::parse(&text).unwrap_or_else(|| legacy_document(&text)),
        };
        log::debug!("loaded {content_id} with {} top-level blocks", document.len());
        Ok(Self::with_options(registry, content_id, document, options))
    }

    pub fn registry(&self) -> &'r BlockRegistry {
        self.registry
    }

    pub fn content_id(&self) -> &str {
        &self.content_id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn selected(&self) -> Option<&BlockId> {
        self.selected.as_ref()
    }

    /// Select a block, or clear the selection. Unknown ids clear it.
    pub fn select(&mut self, id: Option<BlockId>) {
        self.selected = id.filter(|id| self.document.contains(id));
    }

    /// Palette contents: block types grouped by category.
    pub fn palette(&self) -> Vec<Category<'r>> {
        self.registry.list_by_category()
    }

    pub fn apply(&mut self, cmd: Cmd) -> Option<Patch> {
        self.apply_at(cmd, Instant::now())
    }

    /// Apply `cmd` as of `now` (used to arm autosave). `None` when the
    /// command changed nothing; such commands leave history untouched.
    pub fn apply_at(&mut self, cmd: Cmd, now: Instant) -> Option<Patch> {
        let before = self.document.clone();
        let affected = cmd.apply(&mut self.document, self.registry)?;
        if self.document == before {
            return None;
        }

        self.history.record(before);
        self.selected = affected
            .first()
            .filter(|id| self.document.contains(id))
            .cloned();
        Some(self.changed(affected, now))
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> Option<Patch> {
        self.undo_at(Instant::now())
    }

    pub fn undo_at(&mut self, now: Instant) -> Option<Patch> {
        let previous = self.history.undo(&self.document)?;
        self.document = previous;
        log::debug!("undo; {} steps left", self.history.undo_len());
        Some(self.restored(now))
    }

    pub fn redo(&mut self) -> Option<Patch> {
        self.redo_at(Instant::now())
    }

    pub fn redo_at(&mut self, now: Instant) -> Option<Patch> {
        let next = self.history.redo(&self.document)?;
        self.document = next;
        log::debug!("redo; {} steps left", self.history.redo_len());
        Some(self.restored(now))
    }

    /// True iff the live document differs from the last saved one.
    pub fn is_dirty(&self) -> bool {
        self.document != self.saved
    }

    /// Persist the live document. Saving a clean document still writes.
    pub fn save(&mut self, store: &mut dyn ContentStore) -> Result<(), StoreError> {
        store.save(&self.content_id, &parsing::serialize(&self.document))?;
        self.saved = self.document.clone();
        self.autosave.cancel();
        log::debug!("saved {} at version {}", self.content_id, self.version);
        Ok(())
    }

    /// Save if the autosave deadline has passed and there is something to
    /// save. Returns whether a save happened.
    pub fn poll_autosave(
        &mut self,
        now: Instant,
        store: &mut dyn ContentStore,
    ) -> Result<bool, StoreError> {
        if !self.autosave.due(now) || !self.is_dirty() {
            return Ok(false);
        }
        log::debug!("autosave firing for {}", self.content_id);
        self.save(store)?;
        Ok(true)
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    /// Start dragging a new block from the palette. Unknown types are refused.
    pub fn begin_drag_new(&mut self, block_type: &str) -> bool {
        if !self.registry.contains(block_type) {
            log::warn!("cannot drag unknown block type `{block_type}`");
            return false;
        }
        self.drag.begin(
            DragKind::New {
                block_type: block_type.to_string(),
            },
            block_type == crate::model::COLUMNS,
        );
        true
    }

    /// Start dragging an existing block by its handle.
    pub fn begin_drag_move(&mut self, id: &BlockId) -> bool {
        let Some(block) = self.document.get(id) else {
            log::warn!("cannot drag missing block {id}");
            return false;
        };
        let is_columns = block.is_columns();
        self.drag.begin(DragKind::Move { id: id.clone() }, is_columns);
        true
    }

    pub fn drag_over(&mut self, at: Point, layout: &LayoutSnapshot) -> Option<DropTarget> {
        self.drag.pointer_moved(at, layout).cloned()
    }

    /// Drop at `at`. Applies the resulting edit, if any.
    pub fn release(&mut self, at: Point, layout: &LayoutSnapshot) -> Option<Patch> {
        let cmd = self.drag.release(at, layout)?;
        self.apply(cmd)
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    fn changed(&mut self, affected: Vec<BlockId>, now: Instant) -> Patch {
        self.version += 1;
        self.rearm(now);
        log::debug!("edit v{} touched {affected:?}", self.version);
        Patch {
            affected,
            version: self.version,
        }
    }

    fn restored(&mut self, now: Instant) -> Patch {
        if self
            .selected
            .as_ref()
            .is_some_and(|id| !self.document.contains(id))
        {
            self.selected = None;
        }
        self.version += 1;
        self.rearm(now);
        Patch::whole_document(self.version)
    }

    fn rearm(&mut self, now: Instant) {
        if self.is_dirty() {
            self.autosave.arm(now);
        } else {
            self.autosave.cancel();
        }
    }
}

fn legacy_document(text: &str) -> Document {
    if text.trim().is_empty() {
        return Document::new();
    }
    log::debug!("wrapping legacy content in an html block");
    Document::from_blocks(vec![Block::new("html").attr("content", text)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::{BlockRegion, Rect};
    use crate::io::MemoryStore;
    use crate::model::{COLUMNS, Column};
    use crate::render::Renderer;
    use pretty_assertions::assert_eq;

    fn para(id: &str) -> Block {
        Block::with_id(BlockId::from(id), "paragraph").attr("content", id)
    }

    fn ids(session: &EditingSession<'_>) -> Vec<String> {
        session
            .document()
            .blocks()
            .iter()
            .map(|b| b.id.to_string())
            .collect()
    }

    fn insert_paragraph(at: usize) -> Cmd {
        Cmd::InsertNew {
            block_type: "paragraph".to_string(),
            at,
        }
    }

    #[test]
    fn insert_paragraph_into_empty_document_and_render() {
        let registry = BlockRegistry::with_core_blocks();
        let mut session = EditingSession::new(&registry, "home", Document::new());

        let patch = session.apply(insert_paragraph(0)).unwrap();

        let doc = session.document();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.blocks()[0].block_type, "paragraph");
        assert!(doc.blocks()[0].attributes.is_empty());
        assert_eq!(patch.affected, vec![doc.blocks()[0].id.clone()]);
        assert_eq!(session.selected(), Some(&doc.blocks()[0].id));
        assert_eq!(
            Renderer::new(&registry).render_document(doc.blocks()),
            r#"<p class="anvil-block-paragraph"></p>"#
        );
    }

    #[test]
    fn undo_restores_original_and_redo_reapplies() {
        let registry = BlockRegistry::with_core_blocks();
        let original = Document::from_blocks(vec![para("a"), para("b"), para("c")]);
        let mut session = EditingSession::new(&registry, "home", original.clone());

        session.apply(Cmd::Move { id: "a".into(), to: 2 });
        session.apply(Cmd::Remove { id: "b".into() });
        session.apply(insert_paragraph(0));
        let after_three = session.document().clone();

        for _ in 0..3 {
            assert!(session.undo().is_some());
        }
        assert_eq!(session.document(), &original);
        assert!(!session.is_dirty());
        assert!(session.undo().is_none());

        session.redo();
        session.redo();
        session.redo();
        assert_eq!(session.document(), &after_three);
    }

    #[test]
    fn new_edit_after_undo_clears_redo() {
        let registry = BlockRegistry::with_core_blocks();
        let mut session = EditingSession::new(&registry, "home", Document::from_blocks(vec![para("a")]));

        session.apply(insert_paragraph(1));
        session.undo();
        assert!(session.can_redo());

        session.apply(Cmd::Duplicate { id: "a".into() });

        assert!(!session.can_redo());
    }

    #[test]
    fn noop_commands_leave_history_alone() {
        let registry = BlockRegistry::with_core_blocks();
        let mut session =
            EditingSession::new(&registry, "home", Document::from_blocks(vec![para("a"), para("b")]));

        assert!(session.apply(Cmd::Move { id: "a".into(), to: 0 }).is_none());
        assert!(session.apply(Cmd::Remove { id: "nope".into() }).is_none());

        assert!(!session.can_undo());
        assert!(!session.is_dirty());
        assert_eq!(session.version(), 0);
    }

    #[test]
    fn history_is_bounded() {
        let registry = BlockRegistry::with_core_blocks();
        let options = SessionOptions {
            history_limit: 2,
            ..SessionOptions::default()
        };
        let mut session = EditingSession::with_options(&registry, "home", Document::new(), options);

        for _ in 0..5 {
            session.apply(insert_paragraph(0));
        }

        assert!(session.undo().is_some());
        assert!(session.undo().is_some());
        assert!(session.undo().is_none());
        assert_eq!(session.document().len(), 3);
    }

    #[test]
    fn removing_selected_block_clears_selection() {
        let registry = BlockRegistry::with_core_blocks();
        let mut session = EditingSession::new(&registry, "home", Document::from_blocks(vec![para("a")]));
        session.select(Some("a".into()));
        assert_eq!(session.selected(), Some(&BlockId::from("a")));

        session.apply(Cmd::Remove { id: "a".into() });

        assert_eq!(session.selected(), None);
    }

    #[test]
    fn select_unknown_id_clears_selection() {
        let registry = BlockRegistry::with_core_blocks();
        let mut session = EditingSession::new(&registry, "home", Document::from_blocks(vec![para("a")]));
        session.select(Some("ghost".into()));
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn save_clears_dirty_and_writes_store() {
        let registry = BlockRegistry::with_core_blocks();
        let mut store = MemoryStore::new();
        let mut session = EditingSession::new(&registry, "home", Document::new());
        session.apply(insert_paragraph(0));
        assert!(session.is_dirty());

        session.save(&mut store).unwrap();

        assert!(!session.is_dirty());
        let stored = parsing::parse(store.get("home").unwrap()).unwrap();
        assert_eq!(&stored, session.document());

        // Undoing past the save makes it dirty again.
        session.undo();
        assert!(session.is_dirty());
    }

    #[test]
    fn autosave_debounces_bursts() {
        let registry = BlockRegistry::with_core_blocks();
        let mut store = MemoryStore::new();
        let options = SessionOptions {
            autosave_delay: Duration::from_secs(10),
            ..SessionOptions::default()
        };
        let mut session = EditingSession::with_options(&registry, "home", Document::new(), options);
        let start = Instant::now();

        session.apply_at(insert_paragraph(0), start);
        session.apply_at(insert_paragraph(0), start + Duration::from_secs(8));

        assert!(!session.poll_autosave(start + Duration::from_secs(12), &mut store).unwrap());
        assert!(session.poll_autosave(start + Duration::from_secs(18), &mut store).unwrap());
        assert!(store.get("home").is_some());
        assert!(!session.is_dirty());
        assert!(!session.poll_autosave(start + Duration::from_secs(60), &mut store).unwrap());
    }

    #[test]
    fn undo_to_saved_state_cancels_autosave() {
        let registry = BlockRegistry::with_core_blocks();
        let mut session = EditingSession::new(&registry, "home", Document::new());
        let start = Instant::now();

        session.apply_at(insert_paragraph(0), start);
        assert!(session.autosave_pending());

        session.undo_at(start);
        assert!(!session.autosave_pending());
    }

    #[test]
    fn load_missing_and_legacy_content() {
        let registry = BlockRegistry::with_core_blocks();
        let store = MemoryStore::new().with("old", "<p>Hand written</p>");

        let empty = EditingSession::load(&registry, &store, "new", SessionOptions::default()).unwrap();
        assert!(empty.document().is_empty());

        let legacy = EditingSession::load(&registry, &store, "old", SessionOptions::default()).unwrap();
        let blocks = legacy.document().blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].block_type, "html");
        assert!(!legacy.is_dirty());
        assert_eq!(
            Renderer::new(&registry).render_document(blocks),
            "<p>Hand written</p>"
        );
    }

    #[test]
    fn drag_new_paragraph_into_column() {
        let registry = BlockRegistry::with_core_blocks();
        let doc = Document::from_blocks(vec![
            Block::with_id("cols".into(), COLUMNS)
                .attr("columnCount", 2)
                .with_columns(vec![Column::default(), Column::default()]),
        ]);
        let mut session = EditingSession::new(&registry, "home", doc);
        let layout = LayoutSnapshot {
            container: Rect::new(0.0, 0.0, 400.0, 200.0),
            blocks: vec![BlockRegion {
                id: "cols".into(),
                rect: Rect::new(0.0, 0.0, 400.0, 200.0),
            }],
            columns: vec![
                crate::editing::ColumnRegion {
                    parent: "cols".into(),
                    column: 0,
                    rect: Rect::new(0.0, 0.0, 200.0, 200.0),
                },
                crate::editing::ColumnRegion {
                    parent: "cols".into(),
                    column: 1,
                    rect: Rect::new(200.0, 0.0, 200.0, 200.0),
                },
            ],
        };

        assert!(session.begin_drag_new("paragraph"));
        assert_eq!(
            session.drag_over(Point::new(300.0, 50.0), &layout),
            Some(DropTarget::Column {
                parent: "cols".into(),
                column: 1
            })
        );
        let patch = session.release(Point::new(300.0, 50.0), &layout).unwrap();

        let columns = &session.document().blocks()[0].columns;
        assert!(columns[0].is_empty());
        assert_eq!(columns[1].blocks.len(), 1);
        assert_eq!(patch.affected[0], columns[1].blocks[0].id);
        assert!(!session.drag().is_dragging());
    }

    #[test]
    fn drag_move_and_cancel() {
        let registry = BlockRegistry::with_core_blocks();
        let mut session = EditingSession::new(
            &registry,
            "home",
            Document::from_blocks(vec![para("a"), para("b"), para("c")]),
        );
        let layout = LayoutSnapshot {
            container: Rect::new(0.0, 0.0, 100.0, 300.0),
            blocks: ["a", "b", "c"]
                .iter()
                .enumerate()
                .map(|(i, id)| BlockRegion {
                    id: BlockId::from(*id),
                    rect: Rect::new(0.0, i as f64 * 100.0, 100.0, 100.0),
                })
                .collect(),
            columns: Vec::new(),
        };

        assert!(session.begin_drag_move(&"a".into()));
        session.cancel_drag();
        assert!(session.release(Point::new(50.0, 290.0), &layout).is_none());
        assert_eq!(ids(&session), vec!["a", "b", "c"]);

        assert!(session.begin_drag_move(&"a".into()));
        session.release(Point::new(50.0, 290.0), &layout).unwrap();
        assert_eq!(ids(&session), vec!["b", "c", "a"]);

        assert!(!session.begin_drag_move(&"ghost".into()));
        assert!(!session.begin_drag_new("hologram"));
    }
}
