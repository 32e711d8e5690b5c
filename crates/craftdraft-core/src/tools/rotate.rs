//! Rotate tool: drag around the selection centre or an Alt-clicked pivot.

use super::transform::{Drag, PIVOT_SIZE, Snapshot, commit_transform};
use super::{ToolContext, ToolHandler, UndoGroup};
use crate::error::{ToolError, ToolResult};
use crate::geometry::{Transform, normalize_angle};
use crate::input::{Key, KeyEvent};
use crate::numeric::NumericInput;
use crate::overlay::{OverlayItem, OverlayStyle};
use crate::snap::snap_angle;
use kurbo::Point;

const GROUP_NAME: &str = "Rotate";

#[derive(Debug, Clone, Default)]
pub struct RotateTool {
    drag: Option<Drag>,
    /// Pivot placed with Alt-click; kept until Escape or a commit.
    pivot: Option<Point>,
    /// Pivot of the running drag.
    center: Point,
    /// Angle of the running drag in radians, after snapping and numeric input.
    angle: f64,
    numeric: NumericInput,
    group: UndoGroup,
}

impl RotateTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pivot(&self) -> Option<Point> {
        self.pivot
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Recompute the angle from the drag. Shift snaps to the configured step;
    /// typed degrees replace the magnitude and keep the turning direction.
    fn refresh(&mut self, ctx: &ToolContext<'_>) {
        let Some(drag) = &self.drag else {
            return;
        };
        let a0 = (drag.start - self.center).atan2();
        let a1 = (drag.current - self.center).atan2();
        let mut angle = normalize_angle(a1 - a0);
        if ctx.modifiers.shift {
            angle = snap_angle(angle, ctx.config.angle_snap_degrees);
        }
        if let Some(degrees) = self.numeric.value() {
            angle = degrees.to_radians().copysign(if angle < 0.0 { -1.0 } else { 1.0 });
        }
        self.angle = angle;
    }

    fn finish(&mut self, ctx: &mut ToolContext<'_>) -> ToolResult {
        let Some(drag) = self.drag.take() else {
            return Ok(());
        };
        let typed = self.numeric.value();
        let result = if let Some(degrees) = typed.filter(|d| *d > 360.0) {
            Err(ToolError::InvalidEditNumeric(format!("rotation angle {degrees}")).into())
        } else if self.angle == 0.0 {
            Ok(())
        } else {
            let transform = Transform::Rotate {
                cx: self.center.x,
                cy: self.center.y,
                angle_rad: self.angle,
            };
            commit_transform(ctx, &drag.snapshot, transform)
        };
        self.pivot = None;
        self.reset(ctx);
        result
    }

    fn reset(&mut self, ctx: &mut ToolContext<'_>) {
        self.drag = None;
        self.angle = 0.0;
        self.numeric.clear();
        self.group.end(ctx.store);
    }
}

impl ToolHandler for RotateTool {
    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        let snapshot = Snapshot::capture(ctx.store)?;
        let world = ctx.to_world(screen);
        if ctx.modifiers.alt {
            self.pivot = Some(world);
            return Ok(());
        }
        self.center = self.pivot.unwrap_or_else(|| snapshot.center());
        self.drag = Some(Drag::new(snapshot, world));
        self.angle = 0.0;
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
        self.pivot = None;
        self.reset(ctx);
    }

    fn overlay(&self) -> Vec<OverlayItem> {
        let mut items = Vec::new();
        if let Some(drag) = &self.drag {
            let transform = Transform::Rotate {
                cx: self.center.x,
                cy: self.center.y,
                angle_rad: self.angle,
            };
            items.extend(drag.snapshot.preview(&transform));
            items.push(OverlayItem::marker(self.center, PIVOT_SIZE, OverlayStyle::Pivot));
        } else if let Some(pivot) = self.pivot {
            items.push(OverlayItem::marker(pivot, PIVOT_SIZE, OverlayStyle::Pivot));
        }
        items
    }

    fn is_idle(&self) -> bool {
        self.drag.is_none() && self.pivot.is_none()
    }

    fn numeric(&self) -> &NumericInput {
        &self.numeric
    }
}
