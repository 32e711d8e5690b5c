//! Move tool: drag the selection by a vector.

use super::transform::{Drag, Snapshot, commit_transform};
use super::{AxisLock, ToolContext, ToolHandler, UndoGroup};
use crate::error::{ToolError, ToolResult};
use crate::geometry::Transform;
use crate::input::{Key, KeyEvent};
use crate::numeric::NumericInput;
use crate::overlay::OverlayItem;
use kurbo::{Point, Vec2};

const GROUP_NAME: &str = "Move";

#[derive(Debug, Clone, Default)]
pub struct MoveTool {
    drag: Option<Drag>,
    /// `X` keeps the move horizontal, `Y` vertical.
    lock: AxisLock,
    numeric: NumericInput,
    group: UndoGroup,
}

impl MoveTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) -> AxisLock {
        self.lock
    }

    /// Translation for the current drag. A typed value replaces the length,
    /// keeping the direction of the drag or the locked axis.
    fn delta(&self, drag: &Drag) -> Result<Vec2, ToolError> {
        let raw = self.lock.apply(drag.start, drag.current) - drag.start;
        let Some(length) = self.numeric.value() else {
            return Ok(raw);
        };
        if let Some(dir) = self.lock.direction(raw) {
            return Ok(dir * length);
        }
        if raw.hypot() == 0.0 {
            return Err(ToolError::InvalidEditNumeric("the drag has no direction".into()));
        }
        Ok(raw.normalize() * length)
    }

    fn reset(&mut self, ctx: &mut ToolContext<'_>) {
        self.drag = None;
        self.numeric.clear();
        self.group.end(ctx.store);
    }
}

impl ToolHandler for MoveTool {
    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        let snapshot = Snapshot::capture(ctx.store)?;
        self.drag = Some(Drag::new(snapshot, ctx.to_world(screen)));
        self.group.begin(ctx.store, GROUP_NAME);
        Ok(())
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        if let Some(drag) = &mut self.drag {
            drag.current = ctx.to_world(screen);
        }
        Ok(())
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolContext<'_>, _screen: Point) -> ToolResult {
        let Some(drag) = self.drag.take() else {
            return Ok(());
        };
        let result = match self.delta(&drag) {
            Ok(d) if d.hypot() <= ctx.store.eps().eq_dist => Ok(()),
            Ok(d) => commit_transform(ctx, &drag.snapshot, Transform::Translate { dx: d.x, dy: d.y }),
            Err(err) => Err(err.into()),
        };
        self.reset(ctx);
        result
    }

    fn on_key(&mut self, ctx: &mut ToolContext<'_>, key: &KeyEvent) -> ToolResult {
        match key.key {
            Key::Escape => self.cancel(ctx),
            _ if key.key.is_char('x') => self.lock = self.lock.toggle(AxisLock::Horizontal),
            _ if key.key.is_char('y') => self.lock = self.lock.toggle(AxisLock::Vertical),
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
        let Some(drag) = &self.drag else {
            return Vec::new();
        };
        let d = self.delta(drag).unwrap_or(Vec2::ZERO);
        drag.snapshot.preview(&Transform::Translate { dx: d.x, dy: d.y }).collect()
    }

    fn is_idle(&self) -> bool {
        self.drag.is_none()
    }

    fn numeric(&self) -> &NumericInput {
        &self.numeric
    }
}
