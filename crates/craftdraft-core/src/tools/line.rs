//! Line tool: press to anchor, drag, release to commit.

use super::{AxisLock, ToolContext, ToolHandler, UndoGroup};
use crate::error::{ToolError, ToolResult};
use crate::input::{Key, KeyEvent};
use crate::kernel::EditOp;
use crate::numeric::NumericInput;
use crate::overlay::{OverlayItem, OverlayStyle};
use crate::snap::SnapResult;
use kurbo::Point;

/// Undo group wrapping one line drag.
const GROUP_NAME: &str = "LineToolDrag";

/// Gesture state of the line tool.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LineState {
    #[default]
    Idle,
    /// Start placed; `cursor` is the latest snapped pointer position before
    /// the axis lock is applied.
    Anchored { start: Point, cursor: Point },
}

#[derive(Debug, Clone, Default)]
pub struct LineTool {
    state: LineState,
    lock: AxisLock,
    snap: SnapResult,
    numeric: NumericInput,
    group: UndoGroup,
}

impl LineTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LineState {
        self.state
    }

    pub fn lock(&self) -> AxisLock {
        self.lock
    }

    /// End point after the lock and the numeric override.
    fn end_point(&self, start: Point, cursor: Point) -> Point {
        let end = self.lock.apply(start, cursor);
        let Some(length) = self.numeric.value() else {
            return end;
        };
        let v = end - start;
        if v.hypot() == 0.0 {
            return end;
        }
        let dir = self.lock.direction(v).unwrap_or_else(|| v.normalize());
        start + dir * length
    }

    fn reset(&mut self, ctx: &mut ToolContext<'_>) {
        self.state = LineState::Idle;
        self.lock = AxisLock::None;
        self.snap = SnapResult::default();
        self.numeric.clear();
        self.group.end(ctx.store);
    }

    fn submit(ctx: &mut ToolContext<'_>, a: Point, b: Point) -> ToolResult {
        if a.distance(b) <= ctx.store.eps().eq_dist {
            return Err(ToolError::Degenerate("line has zero length".into()).into());
        }
        let layer_id = ctx.target_layer()?;
        ctx.commit(EditOp::CreateLine { layer_id, a, b })?;
        Ok(())
    }
}

impl ToolHandler for LineTool {
    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        let world = ctx.to_world(screen);
        self.snap = ctx.snap(world, None);
        let start = self.snap.point_or(world);
        self.state = LineState::Anchored { start, cursor: start };
        self.group.begin(ctx.store, GROUP_NAME);
        Ok(())
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        let LineState::Anchored { start, .. } = self.state else {
            return Ok(());
        };
        let world = ctx.to_world(screen);
        self.snap = ctx.snap(world, Some(start));
        self.state = LineState::Anchored { start, cursor: self.snap.point_or(world) };
        Ok(())
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolContext<'_>, _screen: Point) -> ToolResult {
        let LineState::Anchored { start, cursor } = self.state else {
            return Ok(());
        };
        let end = self.end_point(start, cursor);
        let result = Self::submit(ctx, start, end);
        self.reset(ctx);
        result
    }

    fn on_key(&mut self, ctx: &mut ToolContext<'_>, key: &KeyEvent) -> ToolResult {
        match key.key {
            Key::Escape => self.cancel(ctx),
            _ if key.key.is_char('h') => self.lock = self.lock.toggle(AxisLock::Horizontal),
            _ if key.key.is_char('v') => self.lock = self.lock.toggle(AxisLock::Vertical),
            ref k => {
                self.numeric.handle_key(k);
            }
        }
        Ok(())
    }

    fn cancel(&mut self, ctx: &mut ToolContext<'_>) {
        self.reset(ctx);
    }

    fn overlay(&self) -> Vec<OverlayItem> {
        let mut items = Vec::new();
        if let LineState::Anchored { start, cursor } = self.state {
            items.push(OverlayItem::segment(start, self.end_point(start, cursor), OverlayStyle::Preview));
        }
        if let Some(best) = &self.snap.best {
            items.push(OverlayItem::snap(best));
        }
        items
    }

    fn is_idle(&self) -> bool {
        self.state == LineState::Idle
    }

    fn numeric(&self) -> &NumericInput {
        &self.numeric
    }
}
