//! Rectangle tool: drag between opposite corners, or click twice.

use super::{AxisLocks, ToolContext, ToolHandler};
use crate::error::{ToolError, ToolResult};
use crate::geometry::Geometry;
use crate::input::{Key, KeyEvent};
use crate::kernel::EditOp;
use crate::numeric::NumericInput;
use crate::overlay::{OverlayItem, OverlayStyle};
use crate::snap::SnapResult;
use kurbo::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Corners {
    p0: Point,
    p1: Point,
    /// The first click was released without dragging; the next press places `p1`.
    awaiting_second: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RectTool {
    corners: Option<Corners>,
    locks: AxisLocks,
    snap: SnapResult,
    numeric: NumericInput,
}

impl RectTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn locks(&self) -> AxisLocks {
        self.locks
    }

    fn place(&mut self, ctx: &ToolContext<'_>, p0: Point, screen: Point) -> Point {
        let world = ctx.to_world(screen);
        self.snap = ctx.snap(world, Some(p0));
        self.locks.apply(p0, self.snap.point_or(world))
    }

    /// Opposite corner after the numeric override: the longer side becomes
    /// the typed length and the aspect ratio is kept.
    fn sized(&self, p0: Point, p1: Point) -> Result<Point, ToolError> {
        let Some(len) = self.numeric.value() else {
            return Ok(p1);
        };
        if len <= 0.0 {
            return Err(ToolError::InvalidDrawNumeric(format!("side length {len}")));
        }
        let d = p1 - p0;
        let longer = d.x.abs().max(d.y.abs());
        if longer == 0.0 {
            return Err(ToolError::Degenerate("rectangle has no extent to scale".into()));
        }
        Ok(p0 + d * (len / longer))
    }

    fn reset(&mut self) {
        self.corners = None;
        self.snap = SnapResult::default();
        self.locks = AxisLocks::default();
        self.numeric.clear();
    }

    fn submit(&self, ctx: &mut ToolContext<'_>, corners: Corners) -> ToolResult {
        if self.locks.conflict() {
            return Err(ToolError::ConstraintConflict.into());
        }
        let p1 = self.sized(corners.p0, corners.p1)?;
        let layer_id = ctx.target_layer()?;
        ctx.commit(EditOp::CreateRect {
            layer_id,
            p0: corners.p0,
            p1,
        })?;
        Ok(())
    }
}

impl ToolHandler for RectTool {
    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        match self.corners {
            Some(c) if c.awaiting_second => {
                let p1 = self.place(ctx, c.p0, screen);
                self.corners = Some(Corners {
                    p1,
                    awaiting_second: false,
                    ..c
                });
            }
            _ => {
                let world = ctx.to_world(screen);
                self.snap = ctx.snap(world, None);
                let p0 = self.snap.point_or(world);
                self.corners = Some(Corners {
                    p0,
                    p1: p0,
                    awaiting_second: false,
                });
            }
        }
        Ok(())
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        if let Some(c) = self.corners {
            let p1 = self.place(ctx, c.p0, screen);
            self.corners = Some(Corners { p1, ..c });
        }
        Ok(())
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolContext<'_>, _screen: Point) -> ToolResult {
        let Some(c) = self.corners else {
            return Ok(());
        };
        if c.awaiting_second {
            return Ok(());
        }
        if c.p0.distance(c.p1) <= ctx.store.eps().eq_dist && self.numeric.is_empty() {
            self.corners = Some(Corners {
                awaiting_second: true,
                ..c
            });
            return Ok(());
        }
        let result = self.submit(ctx, c);
        self.reset();
        result
    }

    fn on_key(&mut self, ctx: &mut ToolContext<'_>, key: &KeyEvent) -> ToolResult {
        if key.key == Key::Escape {
            self.cancel(ctx);
        } else if !self.locks.handle_key(key) {
            self.numeric.handle_key(&key.key);
        }
        Ok(())
    }

    fn cancel(&mut self, _ctx: &mut ToolContext<'_>) {
        self.reset();
    }

    fn overlay(&self) -> Vec<OverlayItem> {
        let mut items = Vec::new();
        if let Some(c) = self.corners {
            let p1 = self.sized(c.p0, c.p1).unwrap_or(c.p1);
            items.push(OverlayItem::shape(Geometry::rect(c.p0, p1), OverlayStyle::Preview));
        }
        if let Some(best) = &self.snap.best {
            items.push(OverlayItem::snap(best));
        }
        items
    }

    fn is_idle(&self) -> bool {
        self.corners.is_none()
    }

    fn numeric(&self) -> &NumericInput {
        &self.numeric
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::kernel::codes;
    use crate::tools::test_support::{Fixture, at, close, key, special};

    fn corners(fx: &Fixture) -> Vec<Point> {
        match fx.geoms().as_slice() {
            [Geometry::Polyline { pts, closed: true }] => pts.clone(),
            other => panic!("expected one rectangle, got {other:?}"),
        }
    }

    #[test]
    fn test_drag_creates_closed_rectangle() {
        let mut fx = Fixture::new();
        let mut tool = RectTool::new();
        tool.on_pointer_down(&mut fx.ctx(), at(1.0, 1.0)).unwrap();
        tool.on_pointer_move(&mut fx.ctx(), at(4.0, 3.0)).unwrap();
        tool.on_pointer_up(&mut fx.ctx(), at(4.0, 3.0)).unwrap();
        let pts = corners(&fx);
        assert_eq!(pts.len(), 4);
        assert!(close(pts[0], Point::new(1.0, 1.0)));
        assert!(close(pts[2], Point::new(4.0, 3.0)));
        assert!(tool.is_idle());
    }

    #[test]
    fn test_click_click() {
        let mut fx = Fixture::new();
        let mut tool = RectTool::new();
        tool.on_pointer_down(&mut fx.ctx(), at(0.0, 0.0)).unwrap();
        tool.on_pointer_up(&mut fx.ctx(), at(0.0, 0.0)).unwrap();
        assert!(!tool.is_idle());
        assert!(fx.geoms().is_empty());
        tool.on_pointer_move(&mut fx.ctx(), at(2.0, 2.0)).unwrap();
        tool.on_pointer_down(&mut fx.ctx(), at(2.0, 5.0)).unwrap();
        tool.on_pointer_up(&mut fx.ctx(), at(2.0, 5.0)).unwrap();
        let pts = corners(&fx);
        assert!(close(pts[2], Point::new(2.0, 5.0)));
    }

    #[test]
    fn test_numeric_sets_longer_side() {
        let mut fx = Fixture::new();
        let mut tool = RectTool::new();
        tool.on_pointer_down(&mut fx.ctx(), at(0.0, 0.0)).unwrap();
        tool.on_pointer_move(&mut fx.ctx(), at(4.0, -2.0)).unwrap();
        tool.on_key(&mut fx.ctx(), &key('8')).unwrap();
        tool.on_pointer_up(&mut fx.ctx(), at(4.0, -2.0)).unwrap();
        let pts = corners(&fx);
        assert!(close(pts[2], Point::new(8.0, -4.0)));
    }

    #[test]
    fn test_both_locks_conflict() {
        let mut fx = Fixture::new();
        let mut tool = RectTool::new();
        tool.on_key(&mut fx.ctx(), &key('h')).unwrap();
        tool.on_key(&mut fx.ctx(), &key('v')).unwrap();
        assert!(tool.locks().conflict());
        tool.on_pointer_down(&mut fx.ctx(), at(0.0, 0.0)).unwrap();
        tool.on_key(&mut fx.ctx(), &key('5')).unwrap();
        let err = tool.on_pointer_up(&mut fx.ctx(), at(0.0, 0.0)).unwrap_err();
        assert_eq!(err.code(), codes::DRAW_CONSTRAINT_CONFLICT);
        assert!(tool.is_idle());
        assert!(fx.geoms().is_empty());
    }

    #[test]
    fn test_horizontal_lock_collapses_to_kernel_failure() {
        let mut fx = Fixture::new();
        let mut tool = RectTool::new();
        tool.on_key(&mut fx.ctx(), &key('h')).unwrap();
        tool.on_pointer_down(&mut fx.ctx(), at(0.0, 0.0)).unwrap();
        tool.on_pointer_move(&mut fx.ctx(), at(3.0, 3.0)).unwrap();
        let err = tool.on_pointer_up(&mut fx.ctx(), at(3.0, 3.0)).unwrap_err();
        assert_eq!(err.code(), codes::GEOM_DEGENERATE);
    }

    #[test]
    fn test_escape_while_awaiting_second_click() {
        let mut fx = Fixture::new();
        let mut tool = RectTool::new();
        tool.on_pointer_down(&mut fx.ctx(), at(0.0, 0.0)).unwrap();
        tool.on_pointer_up(&mut fx.ctx(), at(0.0, 0.0)).unwrap();
        tool.on_key(&mut fx.ctx(), &special(Key::Escape)).unwrap();
        assert!(tool.is_idle());
        assert!(tool.overlay().is_empty());
    }

    #[test]
    fn test_escape_clears_locks() {
        let mut fx = Fixture::new();
        let mut tool = RectTool::new();
        tool.on_key(&mut fx.ctx(), &key('h')).unwrap();
        tool.on_key(&mut fx.ctx(), &key('v')).unwrap();
        tool.on_key(&mut fx.ctx(), &special(Key::Escape)).unwrap();
        assert_eq!(tool.locks(), AxisLocks::default());
        tool.on_pointer_down(&mut fx.ctx(), at(0.0, 0.0)).unwrap();
        tool.on_pointer_up(&mut fx.ctx(), at(3.0, 2.0)).unwrap();
        assert_eq!(fx.geoms().len(), 1);
    }
}
