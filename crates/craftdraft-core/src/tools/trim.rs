//! Trim tool: pick the entity to cut, then the entity that cuts it.

use super::{ToolContext, ToolHandler};
use crate::ambiguity::AmbiguityController;
use crate::document::EntityId;
use crate::error::ToolResult;
use crate::geometry::Geometry;
use crate::input::{Key, KeyEvent};
use crate::kernel::EditOp;
use crate::numeric::NumericInput;
use crate::overlay::{OverlayItem, OverlayStyle};
use kurbo::Point;

/// Where the trim gesture is.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TrimStep {
    #[default]
    PickTarget,
    /// Target chosen; `pick` is the click that chose it and marks the side kept.
    PickCutter {
        target: EntityId,
        geom: Geometry,
        pick: Point,
    },
    /// The kernel found several equally good cuts; waiting for a choice.
    Ambiguous {
        target: EntityId,
        geom: Geometry,
        cutter: EntityId,
        pick: Point,
    },
}

#[derive(Debug, Clone, Default)]
pub struct TrimTool {
    step: TrimStep,
    ambiguity: AmbiguityController,
    /// Trim takes no typed values; kept empty.
    numeric: NumericInput,
}

impl TrimTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> &TrimStep {
        &self.step
    }

    pub fn ambiguity(&self) -> &AmbiguityController {
        &self.ambiguity
    }

    fn reset(&mut self) {
        self.step = TrimStep::PickTarget;
        self.ambiguity.clear();
    }

    /// Ask the kernel for the trim. An ambiguous answer parks the tool in
    /// [`TrimStep::Ambiguous`]; anything else ends the gesture.
    fn run(
        &mut self,
        ctx: &mut ToolContext<'_>,
        target: EntityId,
        geom: Geometry,
        cutter: EntityId,
        pick: Point,
        candidate_index: Option<usize>,
    ) -> ToolResult {
        let op = EditOp::Trim {
            target_id: target.clone(),
            cutter_id: cutter.clone(),
            pick,
            candidate_index,
        };
        match ctx.commit(op) {
            Ok(()) => {
                self.reset();
                Ok(())
            }
            Err(reason) if reason.is_ambiguous() && candidate_index.is_none() => {
                log::info!("Trim of {target} is ambiguous: {} candidates", reason.candidates.len());
                self.ambiguity.set_candidates(reason.candidates);
                self.step = TrimStep::Ambiguous { target, geom, cutter, pick };
                Ok(())
            }
            Err(reason) => {
                self.reset();
                Err(reason.into())
            }
        }
    }
}

impl ToolHandler for TrimTool {
    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, screen: Point) -> ToolResult {
        let Some(hit) = ctx.hit(screen) else {
            return Ok(());
        };
        match std::mem::take(&mut self.step) {
            TrimStep::PickTarget => {
                let Some(entity) = ctx.store.entity(&hit.entity_id) else {
                    return Ok(());
                };
                let geom = entity.geom.clone();
                ctx.store.selection_mut().set_single(hit.entity_id.clone());
                self.step = TrimStep::PickCutter {
                    target: hit.entity_id,
                    geom,
                    pick: ctx.to_world(screen),
                };
                Ok(())
            }
            TrimStep::PickCutter { target, geom, pick } => {
                if hit.entity_id == target {
                    self.step = TrimStep::PickCutter { target, geom, pick };
                    return Ok(());
                }
                self.run(ctx, target, geom, hit.entity_id, pick, None)
            }
            ambiguous @ TrimStep::Ambiguous { .. } => {
                self.step = ambiguous;
                Ok(())
            }
        }
    }

    fn on_key(&mut self, ctx: &mut ToolContext<'_>, key: &KeyEvent) -> ToolResult {
        if key.key == Key::Escape {
            self.cancel(ctx);
            return Ok(());
        }
        if !matches!(self.step, TrimStep::Ambiguous { .. }) {
            return Ok(());
        }
        match key.key {
            Key::Tab => self.ambiguity.cycle(1),
            Key::BackTab => self.ambiguity.cycle(-1),
            Key::Enter => {
                if let TrimStep::Ambiguous { target, geom, cutter, pick } = std::mem::take(&mut self.step) {
                    let index = self.ambiguity.current_index();
                    return self.run(ctx, target, geom, cutter, pick, Some(index));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_wheel(&mut self, _ctx: &mut ToolContext<'_>, delta_y: f64) -> bool {
        if matches!(self.step, TrimStep::Ambiguous { .. }) && self.ambiguity.is_active() {
            self.ambiguity.on_wheel(delta_y);
            return true;
        }
        false
    }

    fn on_deactivate(&mut self, _ctx: &mut ToolContext<'_>) {
        if matches!(self.step, TrimStep::Ambiguous { .. }) {
            self.reset();
        }
    }

    fn cancel(&mut self, _ctx: &mut ToolContext<'_>) {
        self.reset();
    }

    fn overlay(&self) -> Vec<OverlayItem> {
        let mut items = Vec::new();
        match &self.step {
            TrimStep::PickTarget => {}
            TrimStep::PickCutter { geom, .. } | TrimStep::Ambiguous { geom, .. } => {
                items.push(OverlayItem::shape(geom.clone(), OverlayStyle::Highlight));
            }
        }
        items.extend(self.ambiguity.overlay());
        items
    }

    fn is_idle(&self) -> bool {
        self.step == TrimStep::PickTarget
    }

    fn numeric(&self) -> &NumericInput {
        &self.numeric
    }
}
