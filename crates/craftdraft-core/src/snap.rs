//! Object snapping to endpoints, midpoints and intersections, plus angle snapping.

use crate::geometry::Geometry;
use crate::store::DocStore;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Default angle snap increment in degrees.
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;

/// What a snap candidate sits on, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapKind {
    Endpoint,
    Intersection,
    Midpoint,
}

impl SnapKind {
    /// Lower ranks win.
    pub fn rank(self) -> u8 {
        match self {
            SnapKind::Endpoint => 0,
            SnapKind::Intersection => 1,
            SnapKind::Midpoint => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SnapKind::Endpoint => "Endpoint",
            SnapKind::Intersection => "Intersection",
            SnapKind::Midpoint => "Midpoint",
        }
    }
}

/// A point the cursor could snap to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapCandidate {
    pub point: Point,
    pub kind: SnapKind,
    /// Distance from the cursor, in world units.
    pub dist: f64,
}

/// Every candidate found, and the winner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapResult {
    pub best: Option<SnapCandidate>,
    pub candidates: Vec<SnapCandidate>,
}

impl SnapResult {
    /// The snapped point, or `fallback` when nothing snapped.
    pub fn point_or(&self, fallback: Point) -> Point {
        self.best.map_or(fallback, |b| b.point)
    }

    /// Drop the winner if it is farther than `radius` from the cursor.
    pub fn within(mut self, radius: Option<f64>) -> Self {
        if let (Some(r), Some(best)) = (radius, self.best) {
            if best.dist > r {
                self.best = None;
            }
        }
        self
    }
}

fn better(a: &SnapCandidate, b: &SnapCandidate) -> bool {
    (a.kind.rank(), a.dist) < (b.kind.rank(), b.dist)
}

/// Gather snap candidates around `cursor`.
///
/// Endpoints and midpoints come from every interactive entity. With an
/// `anchor`, the rubber-band segment from anchor to cursor is intersected with
/// each entity as well; pairs the kernel rejects are skipped. The winner has
/// the lowest rank, then the smallest distance.
pub fn compute_snap(store: &DocStore, cursor: Point, anchor: Option<Point>) -> SnapResult {
    let mut candidates = Vec::new();
    for entity in store.entities() {
        for p in entity.geom.endpoints() {
            candidates.push(SnapCandidate { point: p, kind: SnapKind::Endpoint, dist: p.distance(cursor) });
        }
        for p in entity.geom.midpoints() {
            candidates.push(SnapCandidate { point: p, kind: SnapKind::Midpoint, dist: p.distance(cursor) });
        }
    }

    if let Some(anchor) = anchor {
        let band = Geometry::line(anchor, cursor);
        for entity in store.entities() {
            match store.intersect(&band, &entity.geom) {
                Ok(points) => candidates.extend(points.into_iter().map(|p| SnapCandidate {
                    point: p,
                    kind: SnapKind::Intersection,
                    dist: p.distance(cursor),
                })),
                Err(reason) => log::trace!("No intersection snap with {}: {reason}", entity.id),
            }
        }
    }

    let best = candidates.iter().fold(None::<SnapCandidate>, |acc, c| match acc {
        Some(b) if !better(c, &b) => Some(b),
        _ => Some(*c),
    });
    SnapResult { best, candidates }
}

/// Round an angle in radians to the nearest multiple of `increment_degrees`.
pub fn snap_angle(angle: f64, increment_degrees: f64) -> f64 {
    let step = increment_degrees.to_radians();
    (angle / step).round() * step
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::document::{DEFAULT_LAYER_ID, Document, Entity};
    use crate::kernel::MemoryKernel;
    use std::f64::consts::FRAC_PI_2;

    fn store(geoms: Vec<Geometry>) -> DocStore {
        let mut doc = Document::new();
        for (i, g) in geoms.into_iter().enumerate() {
            doc.push(Entity::new(format!("e{i}"), DEFAULT_LAYER_ID, g));
        }
        DocStore::new(Box::new(MemoryKernel::new()), doc, &EngineConfig::default())
    }

    #[test]
    fn test_endpoint_beats_closer_midpoint() {
        let store = store(vec![Geometry::line(Point::new(0.0, 0.0), Point::new(10.0, 0.0))]);
        // Cursor sits right on the midpoint, endpoints are 5 away.
        let result = compute_snap(&store, Point::new(5.0, 0.1), None);
        let best = result.best.unwrap();
        assert_eq!(best.kind, SnapKind::Endpoint);
        assert_eq!(result.candidates.len(), 3);
    }

    #[test]
    fn test_nearest_endpoint_wins_within_rank() {
        let store = store(vec![Geometry::line(Point::new(0.0, 0.0), Point::new(10.0, 0.0))]);
        let best = compute_snap(&store, Point::new(9.0, 1.0), None).best.unwrap();
        assert_eq!(best.point, Point::new(10.0, 0.0));
    }

    #[test]
    fn test_intersection_beats_midpoint_with_anchor() {
        let store = store(vec![Geometry::Circle { c: Point::new(0.0, 0.0), r: 5.0 }]);
        let result = compute_snap(&store, Point::new(6.0, 0.0), Some(Point::new(-6.0, 0.0)));
        let best = result.best.unwrap();
        assert_eq!(best.kind, SnapKind::Intersection);
        assert!((best.point.x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_anchor_is_skipped() {
        let store = store(vec![Geometry::Circle { c: Point::ZERO, r: 5.0 }]);
        let p = Point::new(1.0, 1.0);
        let result = compute_snap(&store, p, Some(p));
        assert!(result.best.is_none());
    }

    #[test]
    fn test_empty_store_has_no_snap() {
        let store = store(vec![]);
        let result = compute_snap(&store, Point::new(1.0, 2.0), None);
        assert!(result.best.is_none());
        assert_eq!(result.point_or(Point::new(1.0, 2.0)), Point::new(1.0, 2.0));
    }

    #[test]
    fn test_within_radius_filter() {
        let store = store(vec![Geometry::line(Point::new(0.0, 0.0), Point::new(10.0, 0.0))]);
        let result = compute_snap(&store, Point::new(50.0, 50.0), None);
        assert!(result.clone().within(None).best.is_some());
        assert!(result.within(Some(1.0)).best.is_none());
    }

    #[test]
    fn test_snap_angle() {
        let a = snap_angle(88f64.to_radians(), ANGLE_SNAP_INCREMENT);
        assert!((a - FRAC_PI_2).abs() < 1e-12);
        let a = snap_angle((-10f64).to_radians(), ANGLE_SNAP_INCREMENT);
        assert!((a + 15f64.to_radians()).abs() < 1e-12);
    }
}
