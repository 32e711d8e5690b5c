//! Exact geometric operations backing the in-memory kernel.

use super::{Candidate, EpsPolicy, KernelResult, Projection, Reason, codes};
use crate::geometry::{
    Geometry, Transform, arc_sweep, cross, in_arc_range, offset_chain, point_on_circle, segments,
};
use kurbo::{Point, Vec2};
use std::f64::consts::PI;

/// Angular tolerance used when testing whether a point lies on an arc.
const ANGLE_TOL: f64 = 1e-9;

fn finite(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

fn degenerate(message: impl Into<String>) -> Reason {
    Reason::new(codes::GEOM_DEGENERATE, message)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reject geometry that cannot be stored.
pub fn validate(geom: &Geometry, eps: &EpsPolicy) -> KernelResult<()> {
    match geom {
        Geometry::Line { a, b } => {
            if !finite(*a) || !finite(*b) {
                return Err(degenerate("line has non-finite coordinates"));
            }
            if a.distance(*b) <= eps.eq_dist {
                return Err(degenerate("line has zero length"));
            }
        }
        Geometry::Polyline { pts, closed } => {
            if pts.len() < 2 {
                return Err(Reason::new(
                    codes::DRAW_INSUFFICIENT_INPUT,
                    "polyline needs at least two points",
                ));
            }
            if pts.iter().any(|p| !finite(*p)) {
                return Err(degenerate("polyline has non-finite coordinates"));
            }
            if pts.windows(2).any(|w| w[0].distance(w[1]) <= eps.eq_dist) {
                return Err(degenerate("polyline has a zero-length segment"));
            }
            if *closed && pts.len() < 3 {
                return Err(degenerate("closed polyline needs at least three points"));
            }
        }
        Geometry::Circle { c, r } => {
            if !finite(*c) || !r.is_finite() || *r <= eps.eq_dist {
                return Err(Reason::new(
                    codes::GEOM_CIRCLE_RADIUS_INVALID,
                    format!("invalid circle radius {r}"),
                ));
            }
        }
        Geometry::Arc {
            c,
            r,
            start_angle,
            end_angle,
            ccw,
        } => {
            if !finite(*c) || !r.is_finite() || *r <= eps.eq_dist {
                return Err(Reason::new(
                    codes::GEOM_CIRCLE_RADIUS_INVALID,
                    format!("invalid arc radius {r}"),
                ));
            }
            if !start_angle.is_finite() || !end_angle.is_finite() {
                return Err(degenerate("arc has non-finite angles"));
            }
            if arc_sweep(*start_angle, *end_angle, *ccw) * r <= eps.eq_dist {
                return Err(degenerate("arc has zero sweep"));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

fn project_segment(p: Point, a: Point, b: Point) -> (Point, f64) {
    let ab = b - a;
    let len2 = ab.dot(ab);
    if len2 <= 0.0 {
        return (a, 0.0);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    (a + ab * t, t)
}

/// Closest point on `geom` to `p`.
pub fn project_point(geom: &Geometry, p: Point, eps: &EpsPolicy) -> KernelResult<Projection> {
    match geom {
        Geometry::Line { a, b } => {
            let (q, t) = project_segment(p, *a, *b);
            Ok(Projection { point: q, t, dist: p.distance(q) })
        }
        Geometry::Polyline { pts, closed } => {
            if pts.is_empty() {
                return Err(degenerate("empty polyline"));
            }
            if pts.len() == 1 {
                return Ok(Projection { point: pts[0], t: 0.0, dist: p.distance(pts[0]) });
            }
            let count = segments(pts, *closed).count() as f64;
            let mut best: Option<Projection> = None;
            for (i, (a, b)) in segments(pts, *closed).enumerate() {
                let (q, t) = project_segment(p, a, b);
                let dist = p.distance(q);
                if best.is_none_or(|bp| dist < bp.dist) {
                    best = Some(Projection { point: q, t: (i as f64 + t) / count, dist });
                }
            }
            best.ok_or_else(|| degenerate("polyline has no segments"))
        }
        Geometry::Circle { c, r } => {
            if *r <= eps.eq_dist {
                return Err(Reason::new(codes::GEOM_CIRCLE_RADIUS_INVALID, "circle radius must be positive"));
            }
            let v = p - *c;
            let len = v.hypot();
            let (q, t) = if len <= eps.eq_dist {
                (Point::new(c.x + r, c.y), 0.0)
            } else {
                (*c + v * (r / len), v.y.atan2(v.x))
            };
            Ok(Projection { point: q, t, dist: p.distance(q) })
        }
        Geometry::Arc {
            c,
            r,
            start_angle,
            end_angle,
            ccw,
        } => {
            if *r <= eps.eq_dist {
                return Err(Reason::new(codes::GEOM_CIRCLE_RADIUS_INVALID, "arc radius must be positive"));
            }
            let v = p - *c;
            let theta = if v.hypot() <= eps.eq_dist { *start_angle } else { v.y.atan2(v.x) };
            if in_arc_range(theta, *start_angle, *end_angle, *ccw, ANGLE_TOL) {
                let q = point_on_circle(*c, *r, theta);
                return Ok(Projection { point: q, t: theta, dist: p.distance(q) });
            }
            let s = point_on_circle(*c, *r, *start_angle);
            let e = point_on_circle(*c, *r, *end_angle);
            if p.distance(s) <= p.distance(e) {
                Ok(Projection { point: s, t: *start_angle, dist: p.distance(s) })
            } else {
                Ok(Projection { point: e, t: *end_angle, dist: p.distance(e) })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Intersection
// ---------------------------------------------------------------------------

/// Straight or circular piece of a geometry.
#[derive(Debug, Clone, Copy)]
enum Prim {
    Seg(Point, Point),
    Circ {
        c: Point,
        r: f64,
        /// `(start, end, ccw)` when restricted to an arc.
        sweep: Option<(f64, f64, bool)>,
    },
}

fn primitives(geom: &Geometry, eps: &EpsPolicy) -> KernelResult<Vec<Prim>> {
    match geom {
        Geometry::Line { a, b } => {
            if a.distance(*b) <= eps.eq_dist {
                return Err(degenerate("line has zero length"));
            }
            Ok(vec![Prim::Seg(*a, *b)])
        }
        Geometry::Polyline { pts, closed } => {
            let prims: Vec<Prim> = segments(pts, *closed)
                .filter(|(a, b)| a.distance(*b) > eps.eq_dist)
                .map(|(a, b)| Prim::Seg(a, b))
                .collect();
            if prims.is_empty() {
                return Err(degenerate("polyline has no segments"));
            }
            Ok(prims)
        }
        Geometry::Circle { c, r } => {
            if *r <= eps.eq_dist {
                return Err(Reason::new(codes::GEOM_CIRCLE_RADIUS_INVALID, "circle radius must be positive"));
            }
            Ok(vec![Prim::Circ { c: *c, r: *r, sweep: None }])
        }
        Geometry::Arc {
            c,
            r,
            start_angle,
            end_angle,
            ccw,
        } => {
            if *r <= eps.eq_dist {
                return Err(Reason::new(codes::GEOM_CIRCLE_RADIUS_INVALID, "arc radius must be positive"));
            }
            Ok(vec![Prim::Circ {
                c: *c,
                r: *r,
                sweep: Some((*start_angle, *end_angle, *ccw)),
            }])
        }
    }
}

fn on_sweep(c: Point, sweep: Option<(f64, f64, bool)>, p: Point) -> bool {
    match sweep {
        None => true,
        Some((s, e, ccw)) => {
            let v = p - c;
            in_arc_range(v.y.atan2(v.x), s, e, ccw, ANGLE_TOL)
        }
    }
}

fn seg_seg(a1: Point, b1: Point, a2: Point, b2: Point, eps: &EpsPolicy, out: &mut Vec<Point>) {
    let r = b1 - a1;
    let s = b2 - a2;
    let denom = cross(r, s);
    if denom.abs() <= eps.intersect_tol * r.hypot() * s.hypot() {
        // Parallel or collinear: no isolated crossing.
        return;
    }
    let qp = a2 - a1;
    let t = cross(qp, s) / denom;
    let u = cross(qp, r) / denom;
    let tol_t = eps.intersect_tol / r.hypot().max(1.0);
    let tol_u = eps.intersect_tol / s.hypot().max(1.0);
    if (-tol_t..=1.0 + tol_t).contains(&t) && (-tol_u..=1.0 + tol_u).contains(&u) {
        out.push(a1 + r * t);
    }
}

fn seg_circle(
    a: Point,
    b: Point,
    c: Point,
    radius: f64,
    sweep: Option<(f64, f64, bool)>,
    eps: &EpsPolicy,
    out: &mut Vec<Point>,
) {
    let d = b - a;
    let f = a - c;
    let qa = d.dot(d);
    let qb = 2.0 * f.dot(d);
    let qc = f.dot(f) - radius * radius;
    let disc = qb * qb - 4.0 * qa * qc;
    let tol = eps.intersect_tol * qa.max(1.0) * radius.max(1.0);
    if disc < -tol {
        return;
    }
    let root = disc.max(0.0).sqrt();
    let mut ts = vec![(-qb - root) / (2.0 * qa)];
    if root > 0.0 {
        ts.push((-qb + root) / (2.0 * qa));
    }
    let tol_t = eps.intersect_tol / d.hypot().max(1.0);
    for t in ts {
        if (-tol_t..=1.0 + tol_t).contains(&t) {
            let p = a + d * t;
            if on_sweep(c, sweep, p) {
                out.push(p);
            }
        }
    }
}

fn circle_circle(
    (c1, r1, s1): (Point, f64, Option<(f64, f64, bool)>),
    (c2, r2, s2): (Point, f64, Option<(f64, f64, bool)>),
    eps: &EpsPolicy,
    out: &mut Vec<Point>,
) {
    let v = c2 - c1;
    let d = v.hypot();
    if d <= eps.eq_dist || d > r1 + r2 + eps.intersect_tol || d < (r1 - r2).abs() - eps.intersect_tol {
        return;
    }
    let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();
    let base = c1 + v * (a / d);
    let perp = Vec2::new(-v.y, v.x) * (h / d);
    let mut pts = vec![base + perp];
    if h > eps.eq_dist {
        pts.push(base - perp);
    }
    for p in pts {
        if on_sweep(c1, s1, p) && on_sweep(c2, s2, p) {
            out.push(p);
        }
    }
}

/// Intersection points of two geometries, de-duplicated within `eq_dist`.
pub fn intersect(a: &Geometry, b: &Geometry, eps: &EpsPolicy) -> KernelResult<Vec<Point>> {
    let pa = primitives(a, eps)?;
    let pb = primitives(b, eps)?;
    let mut raw = Vec::new();
    for x in &pa {
        for y in &pb {
            match (*x, *y) {
                (Prim::Seg(a1, b1), Prim::Seg(a2, b2)) => seg_seg(a1, b1, a2, b2, eps, &mut raw),
                (Prim::Seg(s0, s1), Prim::Circ { c, r, sweep })
                | (Prim::Circ { c, r, sweep }, Prim::Seg(s0, s1)) => {
                    seg_circle(s0, s1, c, r, sweep, eps, &mut raw)
                }
                (Prim::Circ { c: c1, r: r1, sweep: s1 }, Prim::Circ { c: c2, r: r2, sweep: s2 }) => {
                    circle_circle((c1, r1, s1), (c2, r2, s2), eps, &mut raw)
                }
            }
        }
    }
    let mut out: Vec<Point> = Vec::with_capacity(raw.len());
    for p in raw {
        if !out.iter().any(|q| q.distance(p) <= eps.eq_dist) {
            out.push(p);
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Transform / mirror
// ---------------------------------------------------------------------------

/// Apply a transform, rejecting ones that would collapse or distort the geometry.
pub fn transform(geom: &Geometry, t: &Transform, eps: &EpsPolicy) -> KernelResult<Geometry> {
    let invalid = |msg: &str| Reason::new(codes::EDIT_INVALID_NUMERIC, msg);
    match *t {
        Transform::Translate { dx, dy } => {
            if !dx.is_finite() || !dy.is_finite() {
                return Err(invalid("translation is not finite"));
            }
        }
        Transform::Rotate { cx, cy, angle_rad } => {
            if !cx.is_finite() || !cy.is_finite() || !angle_rad.is_finite() {
                return Err(invalid("rotation is not finite"));
            }
        }
        Transform::Scale { cx, cy, sx, sy } => {
            if !cx.is_finite() || !cy.is_finite() || !sx.is_finite() || !sy.is_finite() {
                return Err(invalid("scale is not finite"));
            }
            if sx <= eps.eq_dist || sy <= eps.eq_dist {
                return Err(Reason::new(
                    codes::EDIT_TRANSFORM_WOULD_DEGENERATE,
                    format!("scale factors ({sx}, {sy}) must be positive"),
                ));
            }
            let round = matches!(geom, Geometry::Circle { .. } | Geometry::Arc { .. });
            if round && (sx - sy).abs() > eps.eq_dist {
                return Err(Reason::new(
                    codes::EDIT_TRANSFORM_WOULD_DEGENERATE,
                    format!("non-uniform scale of a {}", geom.kind_name()),
                ));
            }
        }
    }
    let out = geom.transformed(t);
    validate(&out, eps).map_err(|r| {
        Reason::new(codes::EDIT_TRANSFORM_WOULD_DEGENERATE, r.message)
    })?;
    Ok(out)
}

/// Reflect a geometry across the line through `axis_a` and `axis_b`.
pub fn mirror(geom: &Geometry, axis_a: Point, axis_b: Point, eps: &EpsPolicy) -> KernelResult<Geometry> {
    let invalid = || Reason::new(codes::EDIT_MIRROR_AXIS_INVALID, "mirror axis has zero length");
    if !finite(axis_a) || !finite(axis_b) || axis_a.distance(axis_b) <= eps.eq_dist {
        return Err(invalid());
    }
    geom.mirrored(axis_a, axis_b).ok_or_else(invalid)
}

// ---------------------------------------------------------------------------
// Offset
// ---------------------------------------------------------------------------

/// Parallel copy at signed distance `dist`.
///
/// Positive distances go to the left of lines and polyline segments and
/// outwards for circles and arcs.
pub fn offset(geom: &Geometry, dist: f64, eps: &EpsPolicy) -> KernelResult<Geometry> {
    if !dist.is_finite() || dist.abs() <= eps.eq_dist {
        return Err(Reason::new(codes::EDIT_INVALID_NUMERIC, format!("invalid offset distance {dist}")));
    }
    match geom {
        Geometry::Line { a, b } if a.distance(*b) <= eps.eq_dist => {
            return Err(degenerate("line has zero length"));
        }
        Geometry::Polyline { closed: true, .. } => {
            return Err(Reason::new(
                codes::GEOM_OFFSET_NOT_SUPPORTED,
                "offset of closed polylines is not supported",
            ));
        }
        Geometry::Polyline { pts, closed: false } => return offset_open_chain(pts, dist, eps),
        Geometry::Circle { r, .. } | Geometry::Arc { r, .. } if r + dist <= eps.eq_dist => {
            return Err(Reason::new(
                codes::GEOM_CIRCLE_RADIUS_INVALID,
                format!("offset radius {} is not positive", r + dist),
            ));
        }
        _ => {}
    }
    geom.offset_by(dist)
        .ok_or_else(|| degenerate(format!("cannot offset {}", geom.kind_name())))
}

fn offset_open_chain(pts: &[Point], dist: f64, eps: &EpsPolicy) -> KernelResult<Geometry> {
    validate(&Geometry::Polyline { pts: pts.to_vec(), closed: false }, eps)?;
    let out = offset_chain(pts, dist, eps.intersect_tol);
    for (i, w) in out.windows(2).enumerate() {
        let orig = pts[i + 1] - pts[i];
        let shifted = w[1] - w[0];
        if shifted.hypot() <= eps.eq_dist || shifted.dot(orig) <= 0.0 {
            return Err(Reason::new(
                codes::GEOM_OFFSET_SELF_INTERSECTION,
                format!("segment {i} collapses at offset {dist}"),
            ));
        }
    }
    Ok(Geometry::Polyline { pts: out, closed: false })
}

// ---------------------------------------------------------------------------
// Trim
// ---------------------------------------------------------------------------

/// Position on an open point chain.
#[derive(Debug, Clone, Copy)]
struct ChainPos {
    seg: usize,
    point: Point,
    /// Arc length from the chain start.
    s: f64,
}

fn locate(pts: &[Point], p: Point) -> ChainPos {
    let mut best = ChainPos { seg: 0, point: pts[0], s: 0.0 };
    let mut best_dist = f64::INFINITY;
    let mut acc = 0.0;
    for (i, w) in pts.windows(2).enumerate() {
        let (q, t) = project_segment(p, w[0], w[1]);
        let len = w[0].distance(w[1]);
        let dist = p.distance(q);
        if dist < best_dist {
            best_dist = dist;
            best = ChainPos { seg: i, point: q, s: acc + t * len };
        }
        acc += len;
    }
    best
}

/// Trim `target` at its crossing with `cutter`, keeping the side that holds `pick`.
///
/// When two crossings are equally close to the pick the result is an
/// `EDIT_TRIM_AMBIGUOUS_CANDIDATE` reason; retry with `candidate_index`.
pub fn trim(
    target: &Geometry,
    cutter: &Geometry,
    pick: Point,
    candidate_index: Option<usize>,
    eps: &EpsPolicy,
) -> KernelResult<Geometry> {
    let (pts, as_line) = match target {
        Geometry::Line { a, b } => (vec![*a, *b], true),
        Geometry::Polyline { pts, closed: false } => (pts.clone(), false),
        other => {
            return Err(Reason::new(
                codes::GEOM_UNSUPPORTED_ENTITY,
                format!("cannot trim a {}", other.kind_name()),
            ));
        }
    };
    validate(&Geometry::Polyline { pts: pts.clone(), closed: false }, eps)?;
    let total: f64 = pts.windows(2).map(|w| w[0].distance(w[1])).sum();

    let picked = locate(&pts, pick);
    let mut cuts: Vec<ChainPos> = intersect(target, cutter, eps)?
        .into_iter()
        .map(|p| locate(&pts, p))
        .filter(|c| c.s > eps.eq_dist && c.s < total - eps.eq_dist)
        .collect();
    if cuts.is_empty() {
        return Err(Reason::new(
            codes::GEOM_TRIM_NO_INTERSECTION,
            "cutter does not cross the target's interior",
        ));
    }
    cuts.sort_by(|x, y| {
        (x.s - picked.s)
            .abs()
            .total_cmp(&(y.s - picked.s).abs())
            .then(x.s.total_cmp(&y.s))
    });

    let tied = cuts.len() > 1
        && ((cuts[0].s - picked.s).abs() - (cuts[1].s - picked.s).abs()).abs() <= eps.eq_dist;
    let candidates = || {
        cuts.iter()
            .enumerate()
            .map(|(index, c)| Candidate { index, point: c.point, t: c.s })
            .collect::<Vec<_>>()
    };
    let cut = match candidate_index {
        Some(i) if i < cuts.len() => cuts[i],
        Some(i) => {
            return Err(Reason::ambiguous(
                codes::EDIT_TRIM_AMBIGUOUS_CANDIDATE,
                format!("candidate {i} out of range"),
                candidates(),
            ));
        }
        None if tied => {
            return Err(Reason::ambiguous(
                codes::EDIT_TRIM_AMBIGUOUS_CANDIDATE,
                "multiple crossings are equally close to the pick",
                candidates(),
            ));
        }
        None => cuts[0],
    };

    let kept: Vec<Point> = if picked.s <= cut.s {
        let mut v: Vec<Point> = pts[..=cut.seg].to_vec();
        v.push(cut.point);
        v
    } else {
        let mut v = vec![cut.point];
        v.extend_from_slice(&pts[cut.seg + 1..]);
        v
    };
    let mut kept_clean: Vec<Point> = Vec::with_capacity(kept.len());
    for p in kept {
        if kept_clean.last().is_none_or(|q: &Point| q.distance(p) > eps.eq_dist) {
            kept_clean.push(p);
        }
    }
    if kept_clean.len() < 2 {
        return Err(degenerate("trim leaves nothing"));
    }
    if as_line {
        Ok(Geometry::Line { a: kept_clean[0], b: kept_clean[kept_clean.len() - 1] })
    } else {
        Ok(Geometry::Polyline { pts: kept_clean, closed: false })
    }
}

// ---------------------------------------------------------------------------
// Fillet / chamfer
// ---------------------------------------------------------------------------

/// What joins the two trimmed lines at a corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CornerKind {
    /// Tangent arc of the given radius.
    Fillet(f64),
    /// Straight cut at the given distance from the corner along each line.
    Chamfer(f64),
}

/// Output of a corner edit.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerResult {
    pub first: Geometry,
    pub second: Geometry,
    pub joint: Geometry,
}

fn line_ends(geom: &Geometry) -> KernelResult<(Point, Point)> {
    match geom {
        Geometry::Line { a, b } => Ok((*a, *b)),
        other => Err(Reason::new(
            codes::GEOM_UNSUPPORTED_ENTITY,
            format!("corner edits need two lines, got a {}", other.kind_name()),
        )),
    }
}

/// Ends of a line that may be kept, given the corner point parameter `t`.
fn kept_ends(a: Point, b: Point, corner: Point, t: f64, eps: &EpsPolicy) -> Vec<Point> {
    let len = a.distance(b);
    if t * len > eps.eq_dist && (1.0 - t) * len > eps.eq_dist {
        vec![b, a]
    } else if corner.distance(a) >= corner.distance(b) {
        vec![a]
    } else {
        vec![b]
    }
}

/// Fillet or chamfer the corner formed by two lines.
///
/// Lines that cross produce one candidate per quadrant and an
/// `EDIT_FILLET_AMBIGUOUS_CORNER` reason unless `candidate_index` picks one.
pub fn corner(
    first: &Geometry,
    second: &Geometry,
    kind: CornerKind,
    candidate_index: Option<usize>,
    eps: &EpsPolicy,
) -> KernelResult<CornerResult> {
    let (a1, b1) = line_ends(first)?;
    let (a2, b2) = line_ends(second)?;
    validate(first, eps)?;
    validate(second, eps)?;

    let size = match kind {
        CornerKind::Fillet(r) | CornerKind::Chamfer(r) => r,
    };
    if !size.is_finite() || size <= eps.eq_dist {
        let code = match kind {
            CornerKind::Fillet(_) => codes::GEOM_CIRCLE_RADIUS_INVALID,
            CornerKind::Chamfer(_) => codes::EDIT_INVALID_NUMERIC,
        };
        return Err(Reason::new(code, format!("corner size {size} must be positive")));
    }

    let d1 = b1 - a1;
    let d2 = b2 - a2;
    let denom = cross(d1, d2);
    if denom.abs() <= eps.intersect_tol * d1.hypot() * d2.hypot() {
        return Err(Reason::new(codes::GEOM_LINES_PARALLEL, "lines are parallel"));
    }
    let corner_pt = a1 + d1 * (cross(a2 - a1, d2) / denom);
    let t1 = (corner_pt - a1).dot(d1) / d1.dot(d1);
    let t2 = (corner_pt - a2).dot(d2) / d2.dot(d2);

    let ends1 = kept_ends(a1, b1, corner_pt, t1, eps);
    let ends2 = kept_ends(a2, b2, corner_pt, t2, eps);
    let combos: Vec<(Point, Point)> = ends1
        .iter()
        .flat_map(|f1| ends2.iter().map(move |f2| (*f1, *f2)))
        .collect();

    let (far1, far2) = match candidate_index {
        Some(i) if i < combos.len() => combos[i],
        _ if combos.len() == 1 => combos[0],
        _ => {
            let candidates = combos
                .iter()
                .enumerate()
                .map(|(index, (f1, f2))| {
                    let u1 = (*f1 - corner_pt).normalize();
                    let u2 = (*f2 - corner_pt).normalize();
                    let reach = (f1.distance(corner_pt)).min(f2.distance(corner_pt)) * 0.25;
                    let bis = u1 + u2;
                    let dir = if bis.hypot() > 0.0 { bis.normalize() } else { u1 };
                    Candidate { index, point: corner_pt + dir * reach, t: 0.0 }
                })
                .collect();
            return Err(Reason::ambiguous(
                codes::EDIT_FILLET_AMBIGUOUS_CORNER,
                "crossing lines form four corners",
                candidates,
            ));
        }
    };

    let len1 = far1.distance(corner_pt);
    let len2 = far2.distance(corner_pt);
    let u1 = (far1 - corner_pt) / len1;
    let u2 = (far2 - corner_pt) / len2;
    let theta = u1.dot(u2).clamp(-1.0, 1.0).acos();
    if theta <= ANGLE_TOL || PI - theta <= ANGLE_TOL {
        return Err(Reason::new(codes::GEOM_LINES_PARALLEL, "lines are parallel"));
    }

    let setback = match kind {
        CornerKind::Fillet(r) => r / (theta / 2.0).tan(),
        CornerKind::Chamfer(d) => d,
    };
    if setback >= len1 - eps.eq_dist || setback >= len2 - eps.eq_dist {
        return Err(Reason::new(
            codes::GEOM_FILLET_RADIUS_TOO_LARGE,
            format!("corner needs {setback:.6} of each line"),
        ));
    }
    let t1_pt = corner_pt + u1 * setback;
    let t2_pt = corner_pt + u2 * setback;

    let joint = match kind {
        CornerKind::Fillet(r) => {
            let bis = (u1 + u2).normalize();
            let center = corner_pt + bis * (r / (theta / 2.0).sin());
            let v1 = t1_pt - center;
            let v2 = t2_pt - center;
            let start = v1.y.atan2(v1.x);
            let end = v2.y.atan2(v2.x);
            let ccw = arc_sweep(start, end, true) <= PI;
            Geometry::Arc { c: center, r, start_angle: start, end_angle: end, ccw }
        }
        CornerKind::Chamfer(_) => Geometry::Line { a: t1_pt, b: t2_pt },
    };

    Ok(CornerResult {
        first: Geometry::Line { a: t1_pt, b: far1 },
        second: Geometry::Line { a: t2_pt, b: far2 },
        joint,
    })
}
