//! Arc tool: centre, start point, end point; always counter-clockwise.

use super::{ToolContext, ToolHandler};
use crate::error::{ToolError, ToolResult};
use crate::geometry::Geometry;
use crate::input::{Key, KeyEvent};
use crate::kernel::EditOp;
use crate::numeric::NumericInput;
use crate::overlay::{OverlayItem, OverlayStyle};
use crate::snap::{SnapResult, snap_angle};
use kurbo::Point;

/// Click progress of the arc tool.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ArcState {
    #[default]
    Idle,
    /// Centre placed; the next click fixes radius and start angle.
    Center { center: Point, cursor: Point },
    /// Start placed; the next click fixes the end angle.
    Sweep { center: Point, start: Point, end: Point },
}

#[derive(Debug, Clone, Default)]
pub struct ArcTool {
    state: ArcState,
    /// `A` rounds the end angle to the angle snap step.
    angle_lock: bool,
    angle_step: f64,
    /// Set by the third press; the following release commits.
    closing: bool,
    snap: SnapResult,
    numeric: NumericInput,
}

impl ArcTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ArcState {
        self.state
    }

    pub fn angle_lock(&self) -> bool {
        self.angle_lock
    }

    /// `(radius, start_angle, end_angle)` for a sweep.
    fn params(&self, center: Point, start: Point, end: Point) -> (f64, f64, f64) {
        let r = center.distance(start);
        let a0 = (start - center).atan2();
        let mut a1 = (end - center).atan2();
        if self.angle_lock {
            a1 = snap_angle(a1, self.angle_step);
        }
        if let Some(degrees) = self.numeric.value() {
            a1 = a0 + degrees.to_radians();
        }
        (r, a0, a1)
    }

    fn pick(&mut self, ctx: &ToolContext<'_>, screen: Point, anchor: Option<Point>) -> Point {
        let world = ctx.to_world(screen);
        self.snap = ctx.snap(world, anchor);
        self.snap.point_or(world)
    }

    fn reset(&mut self) {
        self.state = ArcState::Idle;
        self.closing = false;
        self.angle_lock = false;
        self.snap = SnapResult::default();
        self.numeric.clear();
    }

    fn submit(&self, ctx: &mut ToolContext<'_>, center: Point, start: Point, end: Point) -> ToolResult {
        if let Some(degrees) = self.numeric.value() {
            if degrees <= 0.0 || degrees > 360.0 {
                return Err(ToolError::InvalidDrawNumeric(format!("included angle {degrees}")).into());
            }
        }
        let (r, start_angle, end_angle) = self.params(center, start, end);
        if r <= ctx.store.eps().eq_dist {
            return Err(ToolError::Degenerate("arc has zero radius".into()).into());
        }
        let layer_id = ctx.target_layer()?;
        ctx.commit(EditOp::CreateArc {
            layer_id,
            c: center,
            r,
            start_angle,
            end_angle,
            ccw: true,
        })?;
        Ok(())
    }
}

impl ToolHandler for ArcTool {
    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        self.angle_step = ctx.config.angle_snap_degrees;
        self.state = match self.state {
            ArcState::Idle => {
                let center = self.pick(ctx, screen, None);
                ArcState::Center { center, cursor: center }
            }
            ArcState::Center { center, .. } => {
                let start = self.pick(ctx, screen, Some(center));
                ArcState::Sweep { center, start, end: start }
            }
            ArcState::Sweep { center, start, .. } => {
                let end = self.pick(ctx, screen, Some(center));
                self.closing = true;
                ArcState::Sweep { center, start, end }
            }
        };
        Ok(())
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        match self.state {
            ArcState::Idle => {}
            ArcState::Center { center, .. } => {
                let cursor = self.pick(ctx, screen, Some(center));
                self.state = ArcState::Center { center, cursor };
            }
            ArcState::Sweep { center, start, .. } => {
                let end = self.pick(ctx, screen, Some(center));
                self.state = ArcState::Sweep { center, start, end };
            }
        }
        Ok(())
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolContext<'_>, _screen: Point) -> ToolResult {
        let ArcState::Sweep { center, start, end } = self.state else {
            return Ok(());
        };
        if !self.closing {
            return Ok(());
        }
        let result = self.submit(ctx, center, start, end);
        self.reset();
        result
    }

    fn on_key(&mut self, ctx: &mut ToolContext<'_>, key: &KeyEvent) -> ToolResult {
        if key.key == Key::Escape {
            self.cancel(ctx);
        } else if key.key.is_char('a') {
            self.angle_lock = !self.angle_lock;
            self.angle_step = ctx.config.angle_snap_degrees;
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
        match self.state {
            ArcState::Idle => {}
            ArcState::Center { center, cursor } => {
                items.push(OverlayItem::segment(center, cursor, OverlayStyle::Guide));
            }
            ArcState::Sweep { center, start, end } => {
                let (r, start_angle, end_angle) = self.params(center, start, end);
                items.push(OverlayItem::segment(center, start, OverlayStyle::Guide));
                items.push(OverlayItem::segment(center, end, OverlayStyle::Guide));
                if r > 0.0 {
                    let arc = Geometry::Arc {
                        c: center,
                        r,
                        start_angle,
                        end_angle,
                        ccw: true,
                    };
                    items.push(OverlayItem::shape(arc, OverlayStyle::Preview));
                }
            }
        }
        if let Some(best) = &self.snap.best {
            items.push(OverlayItem::snap(best));
        }
        items
    }

    fn is_idle(&self) -> bool {
        self.state == ArcState::Idle
    }

    fn numeric(&self) -> &NumericInput {
        &self.numeric
    }
}
