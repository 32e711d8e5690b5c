//! Mirror tool: two clicks define the axis; reflected copies are added.

use super::transform::Snapshot;
use super::{ToolContext, ToolHandler};
use crate::error::{ToolError, ToolResult};
use crate::input::{Key, KeyEvent};
use crate::kernel::EditOp;
use crate::numeric::NumericInput;
use crate::overlay::{OverlayItem, OverlayStyle};
use kurbo::Point;

#[derive(Debug, Clone, PartialEq)]
struct Axis {
    snapshot: Snapshot,
    a: Point,
    cursor: Point,
}

#[derive(Debug, Clone, Default)]
pub struct MirrorTool {
    axis: Option<Axis>,
    /// Mirror takes no typed values; the buffer stays empty.
    numeric: NumericInput,
}

impl MirrorTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// First axis point, once placed.
    pub fn axis_start(&self) -> Option<Point> {
        self.axis.as_ref().map(|axis| axis.a)
    }
}

impl ToolHandler for MirrorTool {
    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        let world = ctx.to_world(screen);
        let Some(axis) = self.axis.take() else {
            let snapshot = Snapshot::capture(ctx.store)?;
            self.axis = Some(Axis {
                snapshot,
                a: world,
                cursor: world,
            });
            return Ok(());
        };
        if axis.a.distance(world) <= ctx.store.eps().eq_dist {
            return Err(ToolError::MirrorAxisInvalid.into());
        }
        ctx.commit(EditOp::Mirror {
            ids: axis.snapshot.ids,
            axis_a: axis.a,
            axis_b: world,
        })?;
        Ok(())
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        if let Some(axis) = &mut self.axis {
            axis.cursor = ctx.to_world(screen);
        }
        Ok(())
    }

    fn on_key(&mut self, ctx: &mut ToolContext<'_>, key: &KeyEvent) -> ToolResult {
        if key.key == Key::Escape {
            self.cancel(ctx);
        }
        Ok(())
    }

    fn cancel(&mut self, _ctx: &mut ToolContext<'_>) {
        self.axis = None;
    }

    fn overlay(&self) -> Vec<OverlayItem> {
        let Some(axis) = &self.axis else {
            return Vec::new();
        };
        let mut items = vec![OverlayItem::segment(axis.a, axis.cursor, OverlayStyle::Guide)];
        items.extend(
            axis.snapshot
                .geoms
                .iter()
                .filter_map(|g| g.mirrored(axis.a, axis.cursor))
                .map(|g| OverlayItem::shape(g, OverlayStyle::Preview)),
        );
        items
    }

    fn is_idle(&self) -> bool {
        self.axis.is_none()
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
    use crate::tools::test_support::{Fixture, at, close, special};

    fn fixture() -> Fixture {
        let mut fx = Fixture::with(vec![("a", Geometry::line(Point::new(1.0, 1.0), Point::new(3.0, 2.0)))]);
        fx.select(&["a"]);
        fx
    }

    #[test]
    fn test_mirror_across_y_axis_adds_copy() {
        let mut fx = fixture();
        let mut tool = MirrorTool::new();
        tool.on_pointer_down(&mut fx.ctx(), at(0.0, 0.0)).unwrap();
        tool.on_pointer_move(&mut fx.ctx(), at(0.0, 4.0)).unwrap();
        assert_eq!(tool.overlay().len(), 2);
        tool.on_pointer_down(&mut fx.ctx(), at(0.0, 4.0)).unwrap();
        assert!(tool.is_idle());

        let geoms = fx.geoms();
        assert_eq!(geoms.len(), 2);
        assert_eq!(geoms[0], Geometry::line(Point::new(1.0, 1.0), Point::new(3.0, 2.0)));
        match &geoms[1] {
            Geometry::Line { a, b } => {
                assert!(close(*a, Point::new(-1.0, 1.0)));
                assert!(close(*b, Point::new(-3.0, 2.0)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_requires_selection() {
        let mut fx = Fixture::with(vec![("a", Geometry::line(Point::ZERO, Point::new(1.0, 0.0)))]);
        let mut tool = MirrorTool::new();
        let err = tool.on_pointer_down(&mut fx.ctx(), at(0.0, 0.0)).unwrap_err();
        assert_eq!(err.code(), codes::EDIT_NO_SELECTION);
        assert!(tool.is_idle());
    }

    #[test]
    fn test_zero_length_axis() {
        let mut fx = fixture();
        let mut tool = MirrorTool::new();
        tool.on_pointer_down(&mut fx.ctx(), at(2.0, 2.0)).unwrap();
        let err = tool.on_pointer_down(&mut fx.ctx(), at(2.0, 2.0)).unwrap_err();
        assert_eq!(err.code(), codes::EDIT_MIRROR_AXIS_INVALID);
        assert!(tool.is_idle());
        assert_eq!(fx.geoms().len(), 1);
    }

    #[test]
    fn test_escape_clears_first_point() {
        let mut fx = fixture();
        let mut tool = MirrorTool::new();
        tool.on_pointer_down(&mut fx.ctx(), at(0.0, 0.0)).unwrap();
        assert_eq!(tool.axis_start(), Some(Point::ZERO));
        tool.on_key(&mut fx.ctx(), &special(Key::Escape)).unwrap();
        assert!(tool.is_idle());
        assert!(tool.overlay().is_empty());
    }
}
