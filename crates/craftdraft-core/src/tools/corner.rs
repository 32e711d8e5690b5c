//! Fillet and chamfer: pick two lines, round or cut the corner between them.

use super::{ToolContext, ToolHandler};
use crate::ambiguity::AmbiguityController;
use crate::document::EntityId;
use crate::error::{ToolError, ToolResult};
use crate::geometry::Geometry;
use crate::input::{Key, KeyEvent};
use crate::kernel::EditOp;
use crate::numeric::NumericInput;
use crate::overlay::{OverlayItem, OverlayStyle};
use kurbo::Point;

/// Which corner edit the tool performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerOp {
    Fillet,
    Chamfer,
}

impl CornerOp {
    fn name(self) -> &'static str {
        match self {
            CornerOp::Fillet => "fillet radius",
            CornerOp::Chamfer => "chamfer distance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CornerStep {
    #[default]
    Idle,
    FirstPicked {
        first: EntityId,
        geom: Geometry,
    },
    /// The lines cross; waiting for the user to choose a quadrant.
    Ambiguous {
        first: EntityId,
        second: EntityId,
    },
}

#[derive(Debug, Clone)]
pub struct CornerTool {
    op: CornerOp,
    step: CornerStep,
    ambiguity: AmbiguityController,
    numeric: NumericInput,
}

impl CornerTool {
    pub fn fillet() -> Self {
        Self::with_op(CornerOp::Fillet)
    }

    pub fn chamfer() -> Self {
        Self::with_op(CornerOp::Chamfer)
    }

    fn with_op(op: CornerOp) -> Self {
        Self {
            op,
            step: CornerStep::Idle,
            ambiguity: AmbiguityController::new(),
            numeric: NumericInput::new(),
        }
    }

    pub fn op(&self) -> CornerOp {
        self.op
    }

    pub fn step(&self) -> &CornerStep {
        &self.step
    }

    pub fn ambiguity(&self) -> &AmbiguityController {
        &self.ambiguity
    }

    fn reset(&mut self) {
        self.step = CornerStep::Idle;
        self.ambiguity.clear();
        self.numeric.clear();
    }

    fn size(&self, ctx: &ToolContext<'_>) -> Result<f64, ToolError> {
        let default = match self.op {
            CornerOp::Fillet => ctx.config.default_fillet_radius,
            CornerOp::Chamfer => ctx.config.default_chamfer_distance,
        };
        let size = self.numeric.value().unwrap_or(default);
        if size <= 0.0 {
            return Err(ToolError::InvalidEditNumeric(format!("{} {size}", self.op.name())));
        }
        Ok(size)
    }

    fn run(
        &mut self,
        ctx: &mut ToolContext<'_>,
        first: EntityId,
        second: EntityId,
        candidate_index: Option<usize>,
    ) -> ToolResult {
        let size = match self.size(ctx) {
            Ok(size) => size,
            Err(err) => {
                self.reset();
                return Err(err.into());
            }
        };
        let op = match self.op {
            CornerOp::Fillet => EditOp::Fillet {
                entity_a: first.clone(),
                entity_b: second.clone(),
                radius: size,
                candidate_index,
            },
            CornerOp::Chamfer => EditOp::Chamfer {
                entity_a: first.clone(),
                entity_b: second.clone(),
                distance: size,
                candidate_index,
            },
        };
        match ctx.commit(op) {
            Ok(()) => {
                self.reset();
                Ok(())
            }
            Err(reason) if reason.is_ambiguous() && candidate_index.is_none() => {
                log::info!("Corner {first}/{second} is ambiguous: {} candidates", reason.candidates.len());
                self.ambiguity.set_candidates(reason.candidates);
                self.step = CornerStep::Ambiguous { first, second };
                Ok(())
            }
            Err(reason) => {
                self.reset();
                Err(reason.into())
            }
        }
    }
}

impl ToolHandler for CornerTool {
    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        let Some(hit) = ctx.hit(screen) else {
            return Ok(());
        };
        match std::mem::take(&mut self.step) {
            CornerStep::Idle => {
                let Some(entity) = ctx.store.entity(&hit.entity_id) else {
                    return Ok(());
                };
                let geom = entity.geom.clone();
                ctx.store.selection_mut().set_single(hit.entity_id.clone());
                self.step = CornerStep::FirstPicked {
                    first: hit.entity_id,
                    geom,
                };
                Ok(())
            }
            CornerStep::FirstPicked { first, geom } => {
                if hit.entity_id == first {
                    self.step = CornerStep::FirstPicked { first, geom };
                    return Ok(());
                }
                ctx.store.selection_mut().add(hit.entity_id.clone());
                self.run(ctx, first, hit.entity_id, None)
            }
            ambiguous @ CornerStep::Ambiguous { .. } => {
                self.step = ambiguous;
                Ok(())
            }
        }
    }

    fn on_key(&mut self, ctx: &mut ToolContext<'_>, key: &KeyEvent) -> ToolResult {
        let ambiguous = matches!(self.step, CornerStep::Ambiguous { .. });
        match key.key {
            Key::Escape => self.cancel(ctx),
            Key::Tab if ambiguous => self.ambiguity.cycle(1),
            Key::BackTab if ambiguous => self.ambiguity.cycle(-1),
            Key::Enter if ambiguous => {
                if let CornerStep::Ambiguous { first, second } = std::mem::take(&mut self.step) {
                    let index = self.ambiguity.current_index();
                    return self.run(ctx, first, second, Some(index));
                }
            }
            ref k => {
                self.numeric.handle_key(k);
            }
        }
        Ok(())
    }

    fn on_wheel(&mut self, _ctx: &mut ToolContext<'_>, delta_y: f64) -> bool {
        if matches!(self.step, CornerStep::Ambiguous { .. }) && self.ambiguity.is_active() {
            self.ambiguity.on_wheel(delta_y);
            return true;
        }
        false
    }

    fn on_deactivate(&mut self, _ctx: &mut ToolContext<'_>) {
        if matches!(self.step, CornerStep::Ambiguous { .. }) {
            self.reset();
        }
    }

    fn cancel(&mut self, _ctx: &mut ToolContext<'_>) {
        self.reset();
    }

    fn overlay(&self) -> Vec<OverlayItem> {
        let mut items = Vec::new();
        if let CornerStep::FirstPicked { geom, .. } = &self.step {
            items.push(OverlayItem::shape(geom.clone(), OverlayStyle::Highlight));
        }
        items.extend(self.ambiguity.overlay());
        items
    }

    fn is_idle(&self) -> bool {
        self.step == CornerStep::Idle
    }

    fn numeric(&self) -> &NumericInput {
        &self.numeric
    }
}
