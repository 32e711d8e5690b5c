//! Offset tool: press on an entity, drag to the side, release to add the copy.

use super::{ToolContext, ToolHandler};
use crate::document::EntityId;
use crate::error::{ToolError, ToolResult};
use crate::geometry::Geometry;
use crate::input::{Key, KeyEvent};
use crate::kernel::EditOp;
use crate::numeric::NumericInput;
use crate::overlay::{OverlayItem, OverlayStyle};
use kurbo::Point;

#[derive(Debug, Clone, PartialEq)]
struct Target {
    id: EntityId,
    geom: Geometry,
    /// +1 or -1, from the side the pointer is on.
    side: f64,
    /// Signed distance the preview was built for.
    dist: f64,
    preview: Option<Geometry>,
}

#[derive(Debug, Clone, Default)]
pub struct OffsetTool {
    target: Option<Target>,
    default_distance: f64,
    numeric: NumericInput,
}

impl OffsetTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_id(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.id.as_str())
    }

    /// Typed distance, or the configured default.
    fn magnitude(&self) -> f64 {
        self.numeric.value().unwrap_or(self.default_distance)
    }

    fn refresh(&mut self) {
        let magnitude = self.magnitude();
        if let Some(target) = &mut self.target {
            target.dist = target.side * magnitude;
            target.preview = target.geom.offset_by(target.dist);
        }
    }

    fn finish(&mut self, ctx: &mut ToolContext<'_>) -> ToolResult {
        let Some(target) = self.target.take() else {
            return Ok(());
        };
        self.numeric.clear();
        if target.dist.abs() <= ctx.store.eps().eq_dist {
            return Err(ToolError::InvalidEditNumeric("offset distance must not be zero".into()).into());
        }
        ctx.commit(EditOp::Offset {
            entity_id: target.id,
            dist: target.dist,
        })?;
        Ok(())
    }
}

impl ToolHandler for OffsetTool {
    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        let picked = match ctx.hit(screen) {
            Some(hit) => ctx.store.entity(&hit.entity_id),
            None => None,
        };
        let Some(entity) = picked else {
            self.target = None;
            self.numeric.clear();
            return Err(ToolError::NoSelection.into());
        };
        let id = entity.id.clone();
        let geom = entity.geom.clone();
        let world = ctx.to_world(screen);
        ctx.store.selection_mut().set_single(id.clone());
        self.default_distance = ctx.config.default_offset_distance;
        self.target = Some(Target {
            id,
            side: geom.offset_side(world),
            geom,
            dist: 0.0,
            preview: None,
        });
        self.refresh();
        Ok(())
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        let world = ctx.to_world(screen);
        if let Some(target) = &mut self.target {
            target.side = target.geom.offset_side(world);
        }
        self.refresh();
        Ok(())
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolContext<'_>, _screen: Point) -> ToolResult {
        self.finish(ctx)
    }

    fn on_key(&mut self, ctx: &mut ToolContext<'_>, key: &KeyEvent) -> ToolResult {
        match &key.key {
            Key::Escape => {
                self.cancel(ctx);
                Ok(())
            }
            Key::Enter => self.finish(ctx),
            k => {
                if self.numeric.handle_key(k) {
                    self.refresh();
                }
                Ok(())
            }
        }
    }

    fn cancel(&mut self, _ctx: &mut ToolContext<'_>) {
        self.target = None;
        self.numeric.clear();
    }

    fn overlay(&self) -> Vec<OverlayItem> {
        let Some(target) = &self.target else {
            return Vec::new();
        };
        let mut items = vec![OverlayItem::shape(target.geom.clone(), OverlayStyle::Highlight)];
        if let Some(preview) = &target.preview {
            items.push(OverlayItem::shape(preview.clone(), OverlayStyle::Preview));
        }
        items
    }

    fn is_idle(&self) -> bool {
        self.target.is_none()
    }

    fn numeric(&self) -> &NumericInput {
        &self.numeric
    }
}
