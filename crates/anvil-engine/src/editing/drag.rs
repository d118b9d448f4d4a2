//! Drag/drop state machine: Idle → Dragging → (Dropped | Cancelled) → Idle.
//!
//! The controller never touches the document. Hosts feed it pointer samples
//! together with a [`LayoutSnapshot`] of where blocks and columns are drawn,
//! and on release it hands back the [`Cmd`] to apply.

use crate::editing::Cmd;
use crate::model::BlockId;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open: the right and bottom edges are outside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Where a top-level block is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRegion {
    pub id: BlockId,
    pub rect: Rect,
}

/// Where one column of a columns block is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRegion {
    pub parent: BlockId,
    pub column: usize,
    pub rect: Rect,
}

/// Rendered geometry at the time of a pointer sample. `blocks` lists the
/// top-level blocks in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutSnapshot {
    pub container: Rect,
    pub blocks: Vec<BlockRegion>,
    pub columns: Vec<ColumnRegion>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragKind {
    /// A new block of this type, dragged from the palette.
    New { block_type: String },
    /// An existing block, dragged by its handle.
    Move { id: BlockId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Top-level index, already adjusted for a block being moved.
    Index(usize),
    Column { parent: BlockId, column: usize },
}

#[derive(Debug, Clone, PartialEq)]
struct ActiveDrag {
    kind: DragKind,
    /// A columns block can never land inside a column.
    is_columns: bool,
    ghost: Option<Point>,
    target: Option<DropTarget>,
}

#[derive(Debug, Clone, PartialEq, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging(ActiveDrag),
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle → Dragging. A drag already in progress is replaced.
    pub fn begin(&mut self, kind: DragKind, is_columns: bool) {
        log::debug!("drag started: {kind:?}");
        self.state = DragState::Dragging(ActiveDrag {
            kind,
            is_columns,
            ghost: None,
            target: None,
        });
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn kind(&self) -> Option<&DragKind> {
        self.active().map(|drag| &drag.kind)
    }

    /// Pointer position of the floating ghost.
    pub fn ghost(&self) -> Option<Point> {
        self.active().and_then(|drag| drag.ghost)
    }

    /// Current drop indicator, if any.
    pub fn indicator(&self) -> Option<&DropTarget> {
        self.active().and_then(|drag| drag.target.as_ref())
    }

    /// Track the pointer and recompute the drop target.
    pub fn pointer_moved(&mut self, at: Point, layout: &LayoutSnapshot) -> Option<&DropTarget> {
        let DragState::Dragging(drag) = &mut self.state else {
            return None;
        };
        drag.ghost = Some(at);
        drag.target = drop_target(drag, at, layout);
        drag.target.as_ref()
    }

    /// Dragging → Idle. Yields the command for a valid target; a release
    /// with no target is a cancel.
    pub fn release(&mut self, at: Point, layout: &LayoutSnapshot) -> Option<Cmd> {
        let DragState::Dragging(drag) = std::mem::take(&mut self.state) else {
            return None;
        };
        let Some(target) = drop_target(&drag, at, layout) else {
            log::debug!("drag released without a target; cancelled");
            return None;
        };

        let cmd = match (drag.kind, target) {
            (DragKind::New { block_type }, DropTarget::Index(index)) => Cmd::InsertNew {
                block_type,
                at: index,
            },
            (DragKind::New { block_type }, DropTarget::Column { parent, column }) => {
                Cmd::InsertNewIntoColumn {
                    block_type,
                    parent,
                    column,
                }
            }
            (DragKind::Move { id }, DropTarget::Index(to)) => Cmd::Move { id, to },
            (DragKind::Move { id }, DropTarget::Column { parent, column }) => {
                Cmd::MoveToColumn { id, parent, column }
            }
        };
        log::debug!("drag dropped: {cmd:?}");
        Some(cmd)
    }

    /// Dragging → Idle with no mutation.
    pub fn cancel(&mut self) {
        if self.is_dragging() {
            log::debug!("drag cancelled");
        }
        self.state = DragState::Idle;
    }

    fn active(&self) -> Option<&ActiveDrag> {
        match &self.state {
            DragState::Dragging(drag) => Some(drag),
            DragState::Idle => None,
        }
    }
}

fn drop_target(drag: &ActiveDrag, at: Point, layout: &LayoutSnapshot) -> Option<DropTarget> {
    if !layout.container.contains(at) {
        return None;
    }

    if !drag.is_columns
        && let Some(region) = layout.columns.iter().find(|c| c.rect.contains(at))
    {
        return Some(DropTarget::Column {
            parent: region.parent.clone(),
            column: region.column,
        });
    }

    let moving = match &drag.kind {
        DragKind::Move { id } => Some(id),
        DragKind::New { .. } => None,
    };
    let gap = layout
        .blocks
        .iter()
        .enumerate()
        .filter(|(_, region)| Some(&region.id) != moving)
        .find(|(_, region)| at.y < region.rect.mid_y())
        .map(|(index, _)| index)
        .unwrap_or(layout.blocks.len());

    let current = moving.and_then(|id| layout.blocks.iter().position(|region| &region.id == id));
    let index = match current {
        Some(current) if gap > current => gap - 1,
        _ => gap,
    };
    Some(DropTarget::Index(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    /// Three 100px-tall blocks a, b, c stacked from y=0, plus a columns block
    /// "cols" at y=300 whose two columns sit side by side.
    fn layout() -> LayoutSnapshot {
        let block = |id: &str, y: f64| BlockRegion {
            id: BlockId::from(id),
            rect: Rect::new(0.0, y, 400.0, 100.0),
        };
        LayoutSnapshot {
            container: Rect::new(0.0, 0.0, 400.0, 400.0),
            blocks: vec![
                block("a", 0.0),
                block("b", 100.0),
                block("c", 200.0),
                block("cols", 300.0),
            ],
            columns: vec![
                ColumnRegion {
                    parent: BlockId::from("cols"),
                    column: 0,
                    rect: Rect::new(0.0, 300.0, 200.0, 100.0),
                },
                ColumnRegion {
                    parent: BlockId::from("cols"),
                    column: 1,
                    rect: Rect::new(200.0, 300.0, 200.0, 100.0),
                },
            ],
        }
    }

    fn dragging_new() -> DragController {
        let mut drag = DragController::new();
        drag.begin(
            DragKind::New {
                block_type: "paragraph".to_string(),
            },
            false,
        );
        drag
    }

    fn dragging(id: &str) -> DragController {
        let mut drag = DragController::new();
        drag.begin(DragKind::Move { id: BlockId::from(id) }, false);
        drag
    }

    #[rstest]
    #[case(10.0, 0)]
    #[case(60.0, 1)]
    #[case(140.0, 1)]
    #[case(260.0, 3)]
    fn new_block_gap(#[case] y: f64, #[case] expected: usize) {
        let mut drag = dragging_new();
        let target = drag.pointer_moved(Point::new(50.0, y), &layout()).cloned();
        assert_eq!(target, Some(DropTarget::Index(expected)));
        assert_eq!(drag.ghost(), Some(Point::new(50.0, y)));
    }

    #[test]
    fn moving_first_block_below_c_lands_after_c() {
        let mut drag = dragging("a");
        // Below c's midpoint but above the columns block's midpoint.
        let cmd = drag.release(Point::new(50.0, 260.0), &layout());
        assert_eq!(
            cmd,
            Some(Cmd::Move {
                id: BlockId::from("a"),
                to: 2
            })
        );
        assert!(!drag.is_dragging());
    }

    #[test]
    fn moving_block_excludes_itself_from_scan() {
        let mut drag = dragging("b");
        // Inside b's own upper half: b is skipped, c is the first block below.
        let target = drag.pointer_moved(Point::new(50.0, 120.0), &layout()).cloned();
        assert_eq!(target, Some(DropTarget::Index(1)));
    }

    #[test]
    fn moving_backwards_is_not_decremented() {
        let mut drag = dragging("c");
        let target = drag.pointer_moved(Point::new(50.0, 10.0), &layout()).cloned();
        assert_eq!(target, Some(DropTarget::Index(0)));
    }

    #[test]
    fn column_region_takes_precedence() {
        let mut drag = dragging_new();
        let cmd = drag.release(Point::new(250.0, 320.0), &layout());
        assert_eq!(
            cmd,
            Some(Cmd::InsertNewIntoColumn {
                block_type: "paragraph".to_string(),
                parent: BlockId::from("cols"),
                column: 1
            })
        );
    }

    #[test]
    fn columns_block_ignores_column_regions() {
        let mut drag = DragController::new();
        drag.begin(
            DragKind::New {
                block_type: "columns".to_string(),
            },
            true,
        );
        let target = drag.pointer_moved(Point::new(250.0, 320.0), &layout()).cloned();
        assert_eq!(target, Some(DropTarget::Index(3)));
    }

    #[test]
    fn release_outside_container_cancels() {
        let mut drag = dragging("a");
        drag.pointer_moved(Point::new(50.0, 260.0), &layout());
        assert!(drag.indicator().is_some());

        assert_eq!(drag.release(Point::new(900.0, 10.0), &layout()), None);
        assert!(!drag.is_dragging());
        assert_eq!(drag.indicator(), None);
        assert_eq!(drag.ghost(), None);
    }

    #[test]
    fn pointer_outside_has_no_target() {
        let mut drag = dragging_new();
        assert_eq!(drag.pointer_moved(Point::new(-1.0, 10.0), &layout()), None);
    }

    #[test]
    fn idle_controller_ignores_samples() {
        let mut drag = DragController::new();
        assert_eq!(drag.pointer_moved(Point::new(10.0, 10.0), &layout()), None);
        assert_eq!(drag.release(Point::new(10.0, 10.0), &layout()), None);
    }

    #[test]
    fn cancel_resets_state() {
        let mut drag = dragging("a");
        drag.pointer_moved(Point::new(10.0, 10.0), &layout());
        drag.cancel();
        assert!(!drag.is_dragging());
        assert_eq!(drag.kind(), None);
    }
}
