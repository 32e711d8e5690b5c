//! Scale tool: drag away from or towards the selection centre.

use super::transform::{Drag, PIVOT_SIZE, Snapshot, commit_transform};
use super::{ToolContext, ToolHandler, UndoGroup};
use crate::error::{ToolError, ToolResult};
use crate::geometry::Transform;
use crate::input::{Key, KeyEvent};
use crate::numeric::NumericInput;
use crate::overlay::{OverlayItem, OverlayStyle};
use kurbo::Point;

const GROUP_NAME: &str = "Scale";

/// Start offsets shorter than this leave that axis unscaled.
const MIN_LEVER: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct ScaleTool {
    drag: Option<Drag>,
    center: Point,
    factors: (f64, f64),
    numeric: NumericInput,
    group: UndoGroup,
}

impl Default for ScaleTool {
    fn default() -> Self {
        Self {
            drag: None,
            center: Point::ZERO,
            factors: (1.0, 1.0),
            numeric: NumericInput::default(),
            group: UndoGroup::default(),
        }
    }
}

impl ScaleTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current `(sx, sy)`.
    pub fn factors(&self) -> (f64, f64) {
        self.factors
    }

    /// Per-axis ratio of the pointer's offset from the centre now versus at
    /// the start. Shift forces uniform scaling; a typed value sets both axes.
    fn refresh(&mut self, ctx: &ToolContext<'_>) {
        let Some(drag) = &self.drag else {
            return;
        };
        let d0 = drag.start - self.center;
        let d1 = drag.current - self.center;
        let sx = if d0.x.abs() > MIN_LEVER { d1.x / d0.x } else { 1.0 };
        let mut sy = if d0.y.abs() > MIN_LEVER { d1.y / d0.y } else { sx };
        if ctx.modifiers.shift {
            sy = sx;
        }
        self.factors = match self.numeric.value() {
            Some(n) => (n, n),
            None => (sx, sy),
        };
    }

    fn transform(&self) -> Transform {
        Transform::Scale {
            cx: self.center.x,
            cy: self.center.y,
            sx: self.factors.0,
            sy: self.factors.1,
        }
    }

    fn finish(&mut self, ctx: &mut ToolContext<'_>) -> ToolResult {
        let Some(drag) = self.drag.take() else {
            return Ok(());
        };
        let (sx, sy) = self.factors;
        let result = if sx <= 0.0 || sy <= 0.0 {
            Err(ToolError::TransformWouldDegenerate(format!("scale factors {sx} x {sy}")).into())
        } else if sx == 1.0 && sy == 1.0 {
            Ok(())
        } else {
            commit_transform(ctx, &drag.snapshot, self.transform())
        };
        self.reset(ctx);
        result
    }

    fn reset(&mut self, ctx: &mut ToolContext<'_>) {
        self.drag = None;
        self.factors = (1.0, 1.0);
        self.numeric.clear();
        self.group.end(ctx.store);
    }
}

impl ToolHandler for ScaleTool {
    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        let snapshot = Snapshot::capture(ctx.store)?;
        self.center = snapshot.center();
        self.drag = Some(Drag::new(snapshot, ctx.to_world(screen)));
        self.factors = (1.0, 1.0);
        self.group.begin(ctx.store, GROUP_NAME);
        Ok(())
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        let world = ctx.to_world(screen);
        if let Some(drag) = &mut self.drag {
            drag.current = world;
        }
        self.refresh(ctx);
        Ok(())
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolContext<'_>, _screen: Point) -> ToolResult {
        self.refresh(ctx);
        self.finish(ctx)
    }

    fn on_key(&mut self, ctx: &mut ToolContext<'_>, key: &KeyEvent) -> ToolResult {
        match &key.key {
            Key::Escape => {
                self.cancel(ctx);
                Ok(())
            }
            Key::Enter => {
                self.refresh(ctx);
                self.finish(ctx)
            }
            k => {
                if self.numeric.handle_key(k) {
                    self.refresh(ctx);
                }
                Ok(())
            }
        }
    }

    fn cancel(&mut self, ctx: &mut ToolContext<'_>) {
        self.reset(ctx);
    }

    fn overlay(&self) -> Vec<OverlayItem> {
        let Some(drag) = &self.drag else {
            return Vec::new();
        };
        let mut items: Vec<OverlayItem> = drag.snapshot.preview(&self.transform()).collect();
        items.push(OverlayItem::marker(self.center, PIVOT_SIZE, OverlayStyle::Pivot));
        items
    }

    fn is_idle(&self) -> bool {
        self.drag.is_none()
    }

    fn numeric(&self) -> &NumericInput {
        &self.numeric
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::input::Modifiers;
    use crate::kernel::codes;
    use crate::tools::test_support::{Fixture, at, close, key, special};

    fn fixture(geom: Geometry) -> Fixture {
        let mut fx = Fixture::with(vec![("a", geom)]);
        fx.select(&["a"]);
        fx
    }

    fn square() -> Geometry {
        Geometry::Polyline {
            pts: vec![
                Point::new(-1.0, -1.0),
                Point::new(1.0, -1.0),
                Point::new(1.0, 1.0),
                Point::new(-1.0, 1.0),
            ],
            closed: true,
        }
    }

    #[test]
    fn test_non_uniform_drag() {
        let mut fx = fixture(square());
        let mut tool = ScaleTool::new();
        tool.on_pointer_down(&mut fx.ctx(), at(1.0, 1.0)).unwrap();
        tool.on_pointer_move(&mut fx.ctx(), at(2.0, 3.0)).unwrap();
        assert_eq!(tool.factors(), (2.0, 3.0));
        tool.on_pointer_up(&mut fx.ctx(), at(2.0, 3.0)).unwrap();
        match fx.geom("a") {
            Geometry::Polyline { pts, .. } => assert!(close(pts[2], Point::new(2.0, 3.0))),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_shift_makes_uniform() {
        let mut fx = fixture(square());
        let mut tool = ScaleTool::new();
        fx.modifiers = Modifiers::shift();
        tool.on_pointer_down(&mut fx.ctx(), at(1.0, 1.0)).unwrap();
        tool.on_pointer_move(&mut fx.ctx(), at(2.0, 3.0)).unwrap();
        assert_eq!(tool.factors(), (2.0, 2.0));
    }

    #[test]
    fn test_numeric_factor_scales_circle() {
        let mut fx = fixture(Geometry::Circle { c: Point::ZERO, r: 2.0 });
        let mut tool = ScaleTool::new();
        tool.on_pointer_down(&mut fx.ctx(), at(2.0, 0.0)).unwrap();
        tool.on_key(&mut fx.ctx(), &key('3')).unwrap();
        tool.on_key(&mut fx.ctx(), &special(Key::Enter)).unwrap();
        assert_eq!(fx.geom("a"), Geometry::Circle { c: Point::ZERO, r: 6.0 });
        assert!(tool.is_idle());
    }

    #[test]
    fn test_flip_through_center_is_rejected() {
        let mut fx = fixture(square());
        let mut tool = ScaleTool::new();
        tool.on_pointer_down(&mut fx.ctx(), at(1.0, 1.0)).unwrap();
        tool.on_pointer_move(&mut fx.ctx(), at(-1.0, 1.0)).unwrap();
        let err = tool.on_pointer_up(&mut fx.ctx(), at(-1.0, 1.0)).unwrap_err();
        assert_eq!(err.code(), codes::EDIT_TRANSFORM_WOULD_DEGENERATE);
        assert!(tool.is_idle());
        assert_eq!(fx.geom("a"), square());
    }

    #[test]
    fn test_zero_numeric_is_rejected() {
        let mut fx = fixture(square());
        let mut tool = ScaleTool::new();
        tool.on_pointer_down(&mut fx.ctx(), at(1.0, 1.0)).unwrap();
        tool.on_key(&mut fx.ctx(), &key('0')).unwrap();
        let err = tool.on_pointer_up(&mut fx.ctx(), at(1.0, 1.0)).unwrap_err();
        assert_eq!(err.code(), codes::EDIT_TRANSFORM_WOULD_DEGENERATE);
    }
}
