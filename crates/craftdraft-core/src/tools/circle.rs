//! Circle tool: centre then a point on the rim.

use super::{ToolContext, ToolHandler};
use crate::error::{ToolError, ToolResult};
use crate::geometry::Geometry;
use crate::input::{Key, KeyEvent};
use crate::kernel::EditOp;
use crate::numeric::NumericInput;
use crate::overlay::{OverlayItem, OverlayStyle};
use crate::snap::SnapResult;
use kurbo::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Placing {
    center: Point,
    rim: Point,
    awaiting_rim: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CircleTool {
    placing: Option<Placing>,
    snap: SnapResult,
    numeric: NumericInput,
}

impl CircleTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Typed radius, or the distance to the rim point.
    fn radius(&self, p: &Placing) -> f64 {
        self.numeric.value().unwrap_or_else(|| p.center.distance(p.rim))
    }

    fn rim_point(&mut self, ctx: &ToolContext<'_>, center: Point, screen: Point) -> Point {
        let world = ctx.to_world(screen);
        self.snap = ctx.snap(world, Some(center));
        self.snap.point_or(world)
    }

    fn reset(&mut self) {
        self.placing = None;
        self.snap = SnapResult::default();
        self.numeric.clear();
    }

    fn submit(&self, ctx: &mut ToolContext<'_>, p: &Placing) -> ToolResult {
        let r = self.radius(p);
        if r <= ctx.store.eps().eq_dist {
            let err = if self.numeric.is_empty() {
                ToolError::Degenerate("circle has zero radius".into())
            } else {
                ToolError::InvalidDrawNumeric(format!("radius {r}"))
            };
            return Err(err.into());
        }
        let layer_id = ctx.target_layer()?;
        ctx.commit(EditOp::CreateCircle { layer_id, c: p.center, r })?;
        Ok(())
    }
}

impl ToolHandler for CircleTool {
    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        match self.placing {
            Some(p) if p.awaiting_rim => {
                let rim = self.rim_point(ctx, p.center, screen);
                self.placing = Some(Placing {
                    rim,
                    awaiting_rim: false,
                    ..p
                });
            }
            _ => {
                let world = ctx.to_world(screen);
                self.snap = ctx.snap(world, None);
                let center = self.snap.point_or(world);
                self.placing = Some(Placing {
                    center,
                    rim: center,
                    awaiting_rim: false,
                });
            }
        }
        Ok(())
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        if let Some(p) = self.placing {
            let rim = self.rim_point(ctx, p.center, screen);
            self.placing = Some(Placing { rim, ..p });
        }
        Ok(())
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolContext<'_>, _screen: Point) -> ToolResult {
        let Some(p) = self.placing else {
            return Ok(());
        };
        if p.awaiting_rim {
            return Ok(());
        }
        if p.center.distance(p.rim) <= ctx.store.eps().eq_dist && self.numeric.is_empty() {
            self.placing = Some(Placing { awaiting_rim: true, ..p });
            return Ok(());
        }
        let result = self.submit(ctx, &p);
        self.reset();
        result
    }

    fn on_key(&mut self, ctx: &mut ToolContext<'_>, key: &KeyEvent) -> ToolResult {
        if key.key == Key::Escape {
            self.cancel(ctx);
        } else {
            self.numeric.handle_key(&key.key);
        }
        Ok(())
    }

    fn cancel(&mut self, _ctx: &mut ToolContext<'_>) {
        self.reset();
    }

    fn overlay(&self) -> Vec<OverlayItem> {
        let mut items = Vec::new();
        if let Some(p) = &self.placing {
            let r = self.radius(p);
            if r > 0.0 {
                items.push(OverlayItem::shape(Geometry::Circle { c: p.center, r }, OverlayStyle::Preview));
                items.push(OverlayItem::segment(p.center, p.rim, OverlayStyle::Guide));
            }
        }
        if let Some(best) = &self.snap.best {
            items.push(OverlayItem::snap(best));
        }
        items
    }

    fn is_idle(&self) -> bool {
        self.placing.is_none()
    }

    fn numeric(&self) -> &NumericInput {
        &self.numeric
    }
}
