//! In-memory kernel with snapshot-based undo history.

use super::ops::{self, CornerKind};
use super::{CommitRequest, EditOp, EpsPolicy, GeometryKernel, KernelResult, PatternParams, Projection, Reason, codes};
use crate::document::{Document, Entity, EntityId};
use crate::geometry::{Geometry, Transform};
use kurbo::Point;
use uuid::Uuid;

/// Maximum number of undo steps to keep.
const MAX_UNDO_HISTORY: usize = 100;

#[derive(Debug, Clone)]
struct OpenGroup {
    name: String,
    /// Whether a snapshot was already pushed for this group.
    recorded: bool,
}

/// A [`GeometryKernel`] that evaluates edits with [`ops`] and keeps whole-document
/// snapshots for undo and redo.
#[derive(Debug, Default)]
pub struct MemoryKernel {
    undo_stack: Vec<Document>,
    redo_stack: Vec<Document>,
    group: Option<OpenGroup>,
}

impl MemoryKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Name of the open undo group, if any.
    pub fn open_group(&self) -> Option<&str> {
        self.group.as_ref().map(|g| g.name.as_str())
    }

    fn record(&mut self, before: &Document) {
        if let Some(group) = self.group.as_mut() {
            if group.recorded {
                return;
            }
            group.recorded = true;
        }
        self.undo_stack.push(before.clone());
        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }
}

fn new_id() -> EntityId {
    Uuid::new_v4().to_string()
}

fn require_layer(doc: &Document, layer_id: &str) -> KernelResult<()> {
    if doc.layer(layer_id).is_none() {
        return Err(Reason::new(codes::MODEL_LAYER_NOT_FOUND, format!("layer {layer_id} not found")));
    }
    Ok(())
}

fn require_entity<'d>(doc: &'d Document, id: &str) -> KernelResult<&'d Entity> {
    doc.entity(id)
        .ok_or_else(|| Reason::new(codes::MODEL_REFERENCE_NOT_FOUND, format!("entity {id} not found")))
}

fn require_selection(doc: &Document, ids: &[EntityId]) -> KernelResult<()> {
    if ids.is_empty() {
        return Err(Reason::new(codes::EDIT_NO_SELECTION, "nothing selected"));
    }
    for id in ids {
        require_entity(doc, id)?;
    }
    Ok(())
}

fn create(doc: &Document, layer_id: &str, geom: Geometry, eps: &EpsPolicy) -> KernelResult<Document> {
    require_layer(doc, layer_id)?;
    ops::validate(&geom, eps)?;
    let mut out = doc.clone();
    out.push(Entity::new(new_id(), layer_id, geom));
    Ok(out)
}

fn replace(doc: &mut Document, id: &str, geom: Geometry) -> KernelResult<()> {
    let entity = doc
        .entity_mut(id)
        .ok_or_else(|| Reason::new(codes::MODEL_REFERENCE_NOT_FOUND, format!("entity {id} not found")))?;
    entity.geom = geom;
    Ok(())
}

/// Evaluate one edit against a document.
pub(super) fn apply_op(doc: &Document, op: &EditOp, eps: &EpsPolicy) -> KernelResult<Document> {
    match op {
        EditOp::CreateLine { layer_id, a, b } => create(doc, layer_id, Geometry::Line { a: *a, b: *b }, eps),
        EditOp::CreateRect { layer_id, p0, p1 } => {
            if (p1.x - p0.x).abs() <= eps.eq_dist || (p1.y - p0.y).abs() <= eps.eq_dist {
                return Err(Reason::new(codes::GEOM_DEGENERATE, "rectangle has zero width or height"));
            }
            create(doc, layer_id, Geometry::rect(*p0, *p1), eps)
        }
        EditOp::CreateCircle { layer_id, c, r } => create(doc, layer_id, Geometry::Circle { c: *c, r: *r }, eps),
        EditOp::CreateArc {
            layer_id,
            c,
            r,
            start_angle,
            end_angle,
            ccw,
        } => create(
            doc,
            layer_id,
            Geometry::Arc {
                c: *c,
                r: *r,
                start_angle: *start_angle,
                end_angle: *end_angle,
                ccw: *ccw,
            },
            eps,
        ),
        EditOp::CreatePolyline { layer_id, pts, closed } => create(
            doc,
            layer_id,
            Geometry::Polyline {
                pts: pts.clone(),
                closed: *closed,
            },
            eps,
        ),
        EditOp::TransformSelection { ids, transform } => {
            require_selection(doc, ids)?;
            let mut out = doc.clone();
            for id in ids {
                let geom = ops::transform(&require_entity(doc, id)?.geom, transform, eps)?;
                replace(&mut out, id, geom)?;
            }
            Ok(out)
        }
        EditOp::Offset { entity_id, dist } => {
            let source = require_entity(doc, entity_id)?;
            let geom = ops::offset(&source.geom, *dist, eps)?;
            let layer = source.layer_id.clone();
            let mut out = doc.clone();
            out.push(Entity::new(new_id(), layer, geom));
            Ok(out)
        }
        EditOp::Trim {
            target_id,
            cutter_id,
            pick,
            candidate_index,
        } => {
            let target = require_entity(doc, target_id)?;
            let cutter = require_entity(doc, cutter_id)?;
            let geom = ops::trim(&target.geom, &cutter.geom, *pick, *candidate_index, eps)?;
            let mut out = doc.clone();
            replace(&mut out, target_id, geom)?;
            Ok(out)
        }
        EditOp::Fillet {
            entity_a,
            entity_b,
            radius,
            candidate_index,
        } => corner_edit(doc, entity_a, entity_b, CornerKind::Fillet(*radius), *candidate_index, eps),
        EditOp::Chamfer {
            entity_a,
            entity_b,
            distance,
            candidate_index,
        } => corner_edit(doc, entity_a, entity_b, CornerKind::Chamfer(*distance), *candidate_index, eps),
        EditOp::Mirror { ids, axis_a, axis_b } => {
            require_selection(doc, ids)?;
            let mut out = doc.clone();
            for id in ids {
                let source = require_entity(doc, id)?;
                let geom = ops::mirror(&source.geom, *axis_a, *axis_b, eps)?;
                out.push(Entity::new(new_id(), source.layer_id.clone(), geom));
            }
            Ok(out)
        }
        EditOp::Pattern { ids, params } => {
            require_selection(doc, ids)?;
            let PatternParams::Linear { dx, dy, count } = *params;
            if count < 2 || !dx.is_finite() || !dy.is_finite() || (dx.hypot(dy) <= eps.eq_dist) {
                return Err(Reason::new(
                    codes::EDIT_PATTERN_INVALID_PARAMS,
                    format!("linear pattern needs count >= 2 and a non-zero step, got {count} x ({dx}, {dy})"),
                ));
            }
            let mut out = doc.clone();
            for i in 1..count {
                let step = Transform::Translate {
                    dx: dx * f64::from(i),
                    dy: dy * f64::from(i),
                };
                for id in ids {
                    let source = require_entity(doc, id)?;
                    let geom = ops::transform(&source.geom, &step, eps)?;
                    out.push(Entity::new(new_id(), source.layer_id.clone(), geom));
                }
            }
            Ok(out)
        }
    }
}

fn corner_edit(
    doc: &Document,
    first_id: &str,
    second_id: &str,
    kind: CornerKind,
    candidate_index: Option<usize>,
    eps: &EpsPolicy,
) -> KernelResult<Document> {
    let first = require_entity(doc, first_id)?;
    let second = require_entity(doc, second_id)?;
    let result = ops::corner(&first.geom, &second.geom, kind, candidate_index, eps)?;
    let layer = first.layer_id.clone();
    let mut out = doc.clone();
    replace(&mut out, first_id, result.first)?;
    replace(&mut out, second_id, result.second)?;
    out.push(Entity::new(new_id(), layer, result.joint));
    Ok(out)
}

impl GeometryKernel for MemoryKernel {
    fn project_point(&self, geom: &Geometry, point: Point, eps: &EpsPolicy) -> KernelResult<Projection> {
        ops::project_point(geom, point, eps)
    }

    fn intersect(&self, a: &Geometry, b: &Geometry, eps: &EpsPolicy) -> KernelResult<Vec<Point>> {
        ops::intersect(a, b, eps)
    }

    fn apply(&mut self, request: CommitRequest<'_>) -> KernelResult<Document> {
        let out = apply_op(request.document, &request.op, &request.eps)?;
        self.record(request.document);
        log::debug!("Applied {} ({} entities)", request.op.name(), out.entities.len());
        Ok(out)
    }

    fn undo(&mut self, current: &Document) -> KernelResult<Document> {
        let previous = self
            .undo_stack
            .pop()
            .ok_or_else(|| Reason::new(codes::HISTORY_NOTHING_TO_UNDO, "nothing to undo"))?;
        self.redo_stack.push(current.clone());
        Ok(previous)
    }

    fn redo(&mut self, current: &Document) -> KernelResult<Document> {
        let next = self
            .redo_stack
            .pop()
            .ok_or_else(|| Reason::new(codes::HISTORY_NOTHING_TO_REDO, "nothing to redo"))?;
        self.undo_stack.push(current.clone());
        Ok(next)
    }

    fn begin_group(&mut self, name: &str) -> KernelResult<()> {
        match self.group.as_mut() {
            Some(group) => {
                log::debug!("Undo group '{}' already open, continuing as '{}'", group.name, name);
                group.name = name.to_string();
            }
            None => {
                self.group = Some(OpenGroup {
                    name: name.to_string(),
                    recorded: false,
                });
            }
        }
        Ok(())
    }

    fn end_group(&mut self) -> KernelResult<()> {
        self.group
            .take()
            .map(|_| ())
            .ok_or_else(|| Reason::new(codes::HISTORY_GROUP_NOT_OPEN, "no undo group is open"))
    }
}
