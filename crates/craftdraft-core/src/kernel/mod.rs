//! Geometry kernel boundary.
//!
//! The interactive layer never mutates the document directly. It sends a
//! [`CommitRequest`] carrying the whole document and one [`EditOp`] to a
//! [`GeometryKernel`], which answers with a new document or a [`Reason`].
//! Undo/redo and undo grouping also live behind this boundary.

mod memory;
mod ops;

pub use memory::MemoryKernel;

use crate::document::{Document, EntityId, LayerId};
use crate::geometry::{Geometry, Transform};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable reason codes surfaced by the kernel and the tools.
pub mod codes {
    pub const EDIT_NO_SELECTION: &str = "EDIT_NO_SELECTION";
    pub const EDIT_INVALID_NUMERIC: &str = "EDIT_INVALID_NUMERIC";
    pub const EDIT_TRANSFORM_WOULD_DEGENERATE: &str = "EDIT_TRANSFORM_WOULD_DEGENERATE";
    pub const EDIT_TRIM_AMBIGUOUS_CANDIDATE: &str = "EDIT_TRIM_AMBIGUOUS_CANDIDATE";
    pub const EDIT_FILLET_AMBIGUOUS_CORNER: &str = "EDIT_FILLET_AMBIGUOUS_CORNER";
    pub const EDIT_MIRROR_AXIS_INVALID: &str = "EDIT_MIRROR_AXIS_INVALID";
    pub const EDIT_PATTERN_INVALID_PARAMS: &str = "EDIT_PATTERN_INVALID_PARAMS";
    pub const DRAW_CONSTRAINT_CONFLICT: &str = "DRAW_CONSTRAINT_CONFLICT";
    pub const DRAW_INVALID_NUMERIC: &str = "DRAW_INVALID_NUMERIC";
    pub const DRAW_INSUFFICIENT_INPUT: &str = "DRAW_INSUFFICIENT_INPUT";
    pub const GEOM_DEGENERATE: &str = "GEOM_DEGENERATE";
    pub const GEOM_CIRCLE_RADIUS_INVALID: &str = "GEOM_CIRCLE_RADIUS_INVALID";
    pub const GEOM_NO_INTERSECTION: &str = "GEOM_NO_INTERSECTION";
    pub const GEOM_TRIM_NO_INTERSECTION: &str = "GEOM_TRIM_NO_INTERSECTION";
    pub const GEOM_OFFSET_NOT_SUPPORTED: &str = "GEOM_OFFSET_NOT_SUPPORTED";
    pub const GEOM_OFFSET_SELF_INTERSECTION: &str = "GEOM_OFFSET_SELF_INTERSECTION";
    pub const GEOM_FILLET_RADIUS_TOO_LARGE: &str = "GEOM_FILLET_RADIUS_TOO_LARGE";
    pub const GEOM_LINES_PARALLEL: &str = "GEOM_LINES_PARALLEL";
    pub const GEOM_UNSUPPORTED_ENTITY: &str = "GEOM_UNSUPPORTED_ENTITY";
    pub const MODEL_REFERENCE_NOT_FOUND: &str = "MODEL_REFERENCE_NOT_FOUND";
    pub const MODEL_LAYER_NOT_FOUND: &str = "MODEL_LAYER_NOT_FOUND";
    pub const HISTORY_NOTHING_TO_UNDO: &str = "HISTORY_NOTHING_TO_UNDO";
    pub const HISTORY_NOTHING_TO_REDO: &str = "HISTORY_NOTHING_TO_REDO";
    pub const HISTORY_GROUP_NOT_OPEN: &str = "HISTORY_GROUP_NOT_OPEN";
}

/// Numeric tolerances shared between tools and kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpsPolicy {
    /// Two points closer than this are the same point.
    pub eq_dist: f64,
    /// Snap capture distance in world units.
    pub snap_dist: f64,
    /// Tolerance for intersection parameters and discriminants.
    pub intersect_tol: f64,
    /// Areas below this are degenerate.
    pub area_tol: f64,
}

impl Default for EpsPolicy {
    fn default() -> Self {
        Self {
            eq_dist: 1e-6,
            snap_dist: 1e-2,
            intersect_tol: 1e-6,
            area_tol: 1e-6,
        }
    }
}

/// Result of projecting a point onto an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Closest point on the geometry.
    pub point: Point,
    /// Curve parameter of `point`. Lines and polylines use a `[0, 1]` parameter
    /// along the whole chain; circles and arcs use the polar angle.
    pub t: f64,
    /// Distance from the query point to `point`.
    pub dist: f64,
}

/// One way an ambiguous edit could be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub index: usize,
    /// Where the candidate is drawn.
    pub point: Point,
    /// Curve parameter the candidate corresponds to, if any.
    #[serde(default)]
    pub t: f64,
}

/// Why a kernel request failed.
///
/// Ambiguity is reported through this type too: the code is one of the
/// `*_AMBIGUOUS_*` codes and `candidates` lists the alternatives.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct Reason {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl Reason {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            candidates: Vec::new(),
        }
    }

    /// An ambiguity reason listing the alternatives.
    pub fn ambiguous(code: &str, message: impl Into<String>, candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            ..Self::new(code, message)
        }
    }

    /// True when the request can be retried with a candidate index.
    pub fn is_ambiguous(&self) -> bool {
        !self.candidates.is_empty()
            && (self.code == codes::EDIT_TRIM_AMBIGUOUS_CANDIDATE
                || self.code == codes::EDIT_FILLET_AMBIGUOUS_CORNER)
    }
}

/// Kernel result type.
pub type KernelResult<T> = Result<T, Reason>;

/// Parameters of a linear array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PatternParams {
    /// `count` total instances, each offset by `(dx, dy)` from the previous.
    Linear { dx: f64, dy: f64, count: u32 },
}

/// One document edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum EditOp {
    CreateLine {
        layer_id: LayerId,
        a: Point,
        b: Point,
    },
    CreateRect {
        layer_id: LayerId,
        p0: Point,
        p1: Point,
    },
    CreateCircle {
        layer_id: LayerId,
        c: Point,
        r: f64,
    },
    CreateArc {
        layer_id: LayerId,
        c: Point,
        r: f64,
        start_angle: f64,
        end_angle: f64,
        ccw: bool,
    },
    CreatePolyline {
        layer_id: LayerId,
        pts: Vec<Point>,
        closed: bool,
    },
    TransformSelection {
        ids: Vec<EntityId>,
        transform: Transform,
    },
    Offset {
        entity_id: EntityId,
        dist: f64,
    },
    Trim {
        target_id: EntityId,
        cutter_id: EntityId,
        pick: Point,
        candidate_index: Option<usize>,
    },
    Fillet {
        entity_a: EntityId,
        entity_b: EntityId,
        radius: f64,
        candidate_index: Option<usize>,
    },
    Chamfer {
        entity_a: EntityId,
        entity_b: EntityId,
        distance: f64,
        candidate_index: Option<usize>,
    },
    Mirror {
        ids: Vec<EntityId>,
        axis_a: Point,
        axis_b: Point,
    },
    Pattern {
        ids: Vec<EntityId>,
        params: PatternParams,
    },
}

impl EditOp {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            EditOp::CreateLine { .. } => "CreateLine",
            EditOp::CreateRect { .. } => "CreateRect",
            EditOp::CreateCircle { .. } => "CreateCircle",
            EditOp::CreateArc { .. } => "CreateArc",
            EditOp::CreatePolyline { .. } => "CreatePolyline",
            EditOp::TransformSelection { .. } => "TransformSelection",
            EditOp::Offset { .. } => "Offset",
            EditOp::Trim { .. } => "Trim",
            EditOp::Fillet { .. } => "Fillet",
            EditOp::Chamfer { .. } => "Chamfer",
            EditOp::Mirror { .. } => "Mirror",
            EditOp::Pattern { .. } => "Pattern",
        }
    }
}

/// Everything the kernel needs to evaluate one edit.
#[derive(Debug, Clone)]
pub struct CommitRequest<'a> {
    pub document: &'a Document,
    pub op: EditOp,
    pub eps: EpsPolicy,
}

/// Exact geometry and history service.
pub trait GeometryKernel: Send {
    /// Closest point on `geom` to `point`.
    fn project_point(&self, geom: &Geometry, point: Point, eps: &EpsPolicy) -> KernelResult<Projection>;

    /// Intersection points of two geometries; empty when they do not meet.
    fn intersect(&self, a: &Geometry, b: &Geometry, eps: &EpsPolicy) -> KernelResult<Vec<Point>>;

    /// Apply an edit and return the resulting document.
    fn apply(&mut self, request: CommitRequest<'_>) -> KernelResult<Document>;

    /// Step back one history entry (a whole group counts as one).
    fn undo(&mut self, current: &Document) -> KernelResult<Document>;

    /// Re-apply the most recently undone entry.
    fn redo(&mut self, current: &Document) -> KernelResult<Document>;

    /// Open a named undo group; commits until [`end_group`](Self::end_group) undo together.
    fn begin_group(&mut self, name: &str) -> KernelResult<()>;

    /// Close the open undo group.
    fn end_group(&mut self) -> KernelResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_eps() {
        let eps = EpsPolicy::default();
        assert!((eps.eq_dist - 1e-6).abs() < f64::EPSILON);
        assert!((eps.snap_dist - 1e-2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_eps_partial_json_uses_defaults() {
        let eps: EpsPolicy = serde_json::from_str(r#"{"eq_dist":0.001}"#).unwrap();
        assert!((eps.eq_dist - 1e-3).abs() < f64::EPSILON);
        assert!((eps.intersect_tol - 1e-6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reason_display_and_ambiguity() {
        let r = Reason::new(codes::GEOM_DEGENERATE, "zero length");
        assert_eq!(r.to_string(), "GEOM_DEGENERATE: zero length");
        assert!(!r.is_ambiguous());

        let r = Reason::ambiguous(
            codes::EDIT_TRIM_AMBIGUOUS_CANDIDATE,
            "two cuts",
            vec![Candidate { index: 0, point: Point::ZERO, t: 0.0 }],
        );
        assert!(r.is_ambiguous());
    }

    #[test]
    fn test_edit_op_json_tag() {
        let op = EditOp::Offset { entity_id: "e".into(), dist: 2.0 };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "Offset");
        assert_eq!(op.name(), "Offset");
    }
}
