//! Polyline tool: click vertices, Enter to finish open, `C` to finish closed.

use super::{AxisLocks, ToolContext, ToolHandler, with_length};
use crate::error::{ToolError, ToolResult};
use crate::geometry::Geometry;
use crate::input::{Key, KeyEvent};
use crate::kernel::EditOp;
use crate::numeric::NumericInput;
use crate::overlay::{OverlayItem, OverlayStyle};
use crate::snap::SnapResult;
use kurbo::Point;

#[derive(Debug, Clone, Default)]
pub struct PolylineTool {
    pts: Vec<Point>,
    hover: Option<Point>,
    locks: AxisLocks,
    snap: SnapResult,
    numeric: NumericInput,
}

impl PolylineTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[Point] {
        &self.pts
    }

    pub fn locks(&self) -> AxisLocks {
        self.locks
    }

    /// Snapped and constrained position for the next vertex.
    fn next_vertex(&mut self, ctx: &ToolContext<'_>, screen: Point) -> Point {
        let world = ctx.to_world(screen);
        let last = self.pts.last().copied();
        self.snap = ctx.snap(world, last);
        let p = self.snap.point_or(world);
        match last {
            Some(last) => self.locks.apply(last, p),
            None => p,
        }
    }

    fn reset(&mut self) {
        self.pts.clear();
        self.hover = None;
        self.snap = SnapResult::default();
        self.locks = AxisLocks::default();
        self.numeric.clear();
    }

    fn finish(&mut self, ctx: &mut ToolContext<'_>, closed: bool) -> ToolResult {
        let pts = std::mem::take(&mut self.pts);
        self.reset();
        if pts.len() < 2 {
            return Err(ToolError::InsufficientInput(format!("polyline has {} point(s)", pts.len())).into());
        }
        let layer_id = ctx.target_layer()?;
        ctx.commit(EditOp::CreatePolyline { layer_id, pts, closed })?;
        Ok(())
    }
}

impl ToolHandler for PolylineTool {
    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        if !self.pts.is_empty() && self.locks.conflict() {
            self.reset();
            return Err(ToolError::ConstraintConflict.into());
        }
        let mut p = self.next_vertex(ctx, screen);
        if let (Some(last), Some(len)) = (self.pts.last().copied(), self.numeric.value()) {
            p = with_length(last, p, len);
        }
        self.pts.push(p);
        self.hover = None;
        self.numeric.clear();
        Ok(())
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        if !self.pts.is_empty() {
            self.hover = Some(self.next_vertex(ctx, screen));
        }
        Ok(())
    }

    fn on_key(&mut self, ctx: &mut ToolContext<'_>, key: &KeyEvent) -> ToolResult {
        match key.key {
            Key::Escape => {
                self.cancel(ctx);
                Ok(())
            }
            Key::Enter => self.finish(ctx, false),
            _ if key.key.is_char('c') => self.finish(ctx, true),
            Key::Backspace if self.numeric.is_empty() => {
                self.pts.pop();
                if self.pts.is_empty() {
                    self.hover = None;
                }
                Ok(())
            }
            _ => {
                if !self.locks.handle_key(key) {
                    self.numeric.handle_key(&key.key);
                }
                Ok(())
            }
        }
    }

    fn cancel(&mut self, _ctx: &mut ToolContext<'_>) {
        self.reset();
    }

    fn overlay(&self) -> Vec<OverlayItem> {
        let mut items = Vec::new();
        if self.pts.len() >= 2 {
            let placed = Geometry::Polyline {
                pts: self.pts.clone(),
                closed: false,
            };
            items.push(OverlayItem::shape(placed, OverlayStyle::Preview));
        }
        if let (Some(last), Some(hover)) = (self.pts.last(), self.hover) {
            let end = self.numeric.value().map_or(hover, |len| with_length(*last, hover, len));
            items.push(OverlayItem::segment(*last, end, OverlayStyle::Preview));
        }
        if let Some(best) = &self.snap.best {
            items.push(OverlayItem::snap(best));
        }
        items
    }

    fn is_idle(&self) -> bool {
        self.pts.is_empty()
    }

    fn numeric(&self) -> &NumericInput {
        &self.numeric
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::codes;
    use crate::tools::test_support::{Fixture, at, close, key, special};

    fn click(tool: &mut PolylineTool, fx: &mut Fixture, x: f64, y: f64) -> ToolResult {
        tool.on_pointer_down(&mut fx.ctx(), at(x, y))?;
        tool.on_pointer_up(&mut fx.ctx(), at(x, y))
    }

    #[test]
    fn test_enter_finishes_open() {
        let mut fx = Fixture::new();
        let mut tool = PolylineTool::new();
        click(&mut tool, &mut fx, 0.0, 0.0).unwrap();
        click(&mut tool, &mut fx, 4.0, 0.0).unwrap();
        click(&mut tool, &mut fx, 4.0, 3.0).unwrap();
        tool.on_key(&mut fx.ctx(), &special(Key::Enter)).unwrap();
        match fx.geoms().as_slice() {
            [Geometry::Polyline { pts, closed: false }] => assert_eq!(pts.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
        assert!(tool.is_idle());
    }

    #[test]
    fn test_c_finishes_closed() {
        let mut fx = Fixture::new();
        let mut tool = PolylineTool::new();
        click(&mut tool, &mut fx, 0.0, 0.0).unwrap();
        click(&mut tool, &mut fx, 4.0, 0.0).unwrap();
        click(&mut tool, &mut fx, 4.0, 3.0).unwrap();
        tool.on_key(&mut fx.ctx(), &key('C')).unwrap();
        assert!(matches!(fx.geoms().as_slice(), [Geometry::Polyline { closed: true, .. }]));
    }

    #[test]
    fn test_single_point_is_insufficient() {
        let mut fx = Fixture::new();
        let mut tool = PolylineTool::new();
        click(&mut tool, &mut fx, 0.0, 0.0).unwrap();
        let err = tool.on_key(&mut fx.ctx(), &special(Key::Enter)).unwrap_err();
        assert_eq!(err.code(), codes::DRAW_INSUFFICIENT_INPUT);
        assert!(tool.is_idle());
        assert!(fx.geoms().is_empty());
    }

    #[test]
    fn test_backspace_edits_buffer_then_vertices() {
        let mut fx = Fixture::new();
        let mut tool = PolylineTool::new();
        click(&mut tool, &mut fx, 0.0, 0.0).unwrap();
        click(&mut tool, &mut fx, 1.0, 0.0).unwrap();
        tool.on_key(&mut fx.ctx(), &key('7')).unwrap();
        tool.on_key(&mut fx.ctx(), &special(Key::Backspace)).unwrap();
        assert!(tool.numeric().is_empty());
        assert_eq!(tool.points().len(), 2);
        tool.on_key(&mut fx.ctx(), &special(Key::Backspace)).unwrap();
        assert_eq!(tool.points(), &[Point::new(0.0, 0.0)]);
    }

    #[test]
    fn test_lock_and_numeric_segment() {
        let mut fx = Fixture::new();
        let mut tool = PolylineTool::new();
        click(&mut tool, &mut fx, 0.0, 0.0).unwrap();
        tool.on_key(&mut fx.ctx(), &key('v')).unwrap();
        tool.on_key(&mut fx.ctx(), &key('6')).unwrap();
        click(&mut tool, &mut fx, 2.0, 1.0).unwrap();
        assert!(close(tool.points()[1], Point::new(0.0, 6.0)));
        assert!(tool.numeric().is_empty());
    }

    #[test]
    fn test_conflicting_locks_reset() {
        let mut fx = Fixture::new();
        let mut tool = PolylineTool::new();
        click(&mut tool, &mut fx, 0.0, 0.0).unwrap();
        tool.on_key(&mut fx.ctx(), &key('h')).unwrap();
        tool.on_key(&mut fx.ctx(), &key('v')).unwrap();
        let err = click(&mut tool, &mut fx, 3.0, 3.0).unwrap_err();
        assert_eq!(err.code(), codes::DRAW_CONSTRAINT_CONFLICT);
        assert!(tool.is_idle());
    }

    #[test]
    fn test_escape_clears_locks() {
        let mut fx = Fixture::new();
        let mut tool = PolylineTool::new();
        click(&mut tool, &mut fx, 0.0, 0.0).unwrap();
        tool.on_key(&mut fx.ctx(), &key('h')).unwrap();
        tool.on_key(&mut fx.ctx(), &key('v')).unwrap();
        tool.on_key(&mut fx.ctx(), &special(Key::Escape)).unwrap();
        assert_eq!(tool.locks(), AxisLocks::default());
        click(&mut tool, &mut fx, 0.0, 0.0).unwrap();
        click(&mut tool, &mut fx, 2.0, 1.0).unwrap();
        assert!(close(tool.points()[1], Point::new(2.0, 1.0)));
    }
}
