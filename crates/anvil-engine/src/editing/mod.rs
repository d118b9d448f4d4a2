/*!
 * # Editing Session
 *
 * Client-side editing of one page's block tree.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Source of Truth: the live `Document`
 * - An [`EditingSession`] owns the live [`crate::Document`] for one open editor
 * - Every structural edit is a [`Cmd`]; commands are the only writers of the tree
 * - A command that leaves the document unchanged is a no-op: nothing is
 *   recorded, nothing is marked dirty
 *
 * ### 2. Snapshot History
 * - Each applied command pushes the pre-edit document onto a bounded undo stack
 *   and clears the redo stack
 * - Undo/redo swap whole snapshots; documents are small (human-editable pages)
 *
 * ### 3. Dirty Tracking and Autosave
 * - Dirty means "live document differs from the last saved one", so undoing back
 *   to the saved state is clean again
 * - [`Autosave`] debounces: every dirty-marking edit pushes the deadline out
 *
 * ### 4. Drag and Drop
 * - [`DragController`] is a small state machine (Idle, Dragging) fed with pointer
 *   samples and a [`LayoutSnapshot`] of the rendered blocks
 * - On release it yields the [`Cmd`] to apply, or nothing when cancelled
 *
 * ## Module Structure
 *
 * - **`commands`**: `Cmd` enum and how each command mutates the tree
 * - **`history`**: bounded undo/redo snapshot stacks
 * - **`autosave`**: debounce timer
 * - **`drag`**: drag/drop state machine and drop-target computation
 * - **`patch`**: result metadata of an applied edit
 * - **`session`**: `EditingSession`, tying the above together
 *
 * ## Usage Pattern
 *
 * ```rust
 * use anvil_engine::editing::*;
 * use anvil_engine::{BlockRegistry, Document};
 *
 * let registry = BlockRegistry::with_core_blocks();
 * let mut session = EditingSession::new(&registry, "home", Document::new());
 *
 * let patch = session.apply(Cmd::InsertNew { block_type: "paragraph".into(), at: 0 });
 * assert!(patch.is_some());
 * assert!(session.is_dirty());
 *
 * session.undo();
 * assert!(!session.is_dirty());
 * ```
 */

pub mod autosave;
pub mod commands;
pub mod drag;
pub mod history;
pub mod patch;
pub mod session;

pub use autosave::Autosave;
pub use commands::Cmd;
pub use drag::{
    BlockRegion, ColumnRegion, DragController, DragKind, DropTarget, LayoutSnapshot, Point, Rect,
};
pub use history::History;
pub use patch::Patch;
pub use session::{EditingSession, SessionOptions};
