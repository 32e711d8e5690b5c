//! Geometry descriptors shared by the document model, the tools and the kernel boundary.

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// A planar world-space coordinate.
pub type WorldPoint = Point;

/// Exact geometry of a drawing entity.
///
/// Serialized with an inline `type` tag so documents read as
/// `{"type":"Line","a":{"x":0,"y":0},"b":{"x":1,"y":0}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Line {
        a: Point,
        b: Point,
    },
    Polyline {
        pts: Vec<Point>,
        #[serde(default)]
        closed: bool,
    },
    Circle {
        c: Point,
        r: f64,
    },
    Arc {
        c: Point,
        r: f64,
        start_angle: f64,
        end_angle: f64,
        ccw: bool,
    },
}

impl Geometry {
    /// Convenience constructor for a line segment.
    pub fn line(a: Point, b: Point) -> Self {
        Geometry::Line { a, b }
    }

    /// Axis-aligned world bounds.
    ///
    /// Arcs use the bounds of their full circle.
    pub fn bounds(&self) -> Rect {
        match self {
            Geometry::Line { a, b } => Rect::from_points(*a, *b),
            Geometry::Polyline { pts, .. } => {
                let mut iter = pts.iter();
                let Some(first) = iter.next() else {
                    return Rect::ZERO;
                };
                iter.fold(Rect::from_points(*first, *first), |acc, p| {
                    acc.union_pt(*p)
                })
            }
            Geometry::Circle { c, r } | Geometry::Arc { c, r, .. } => {
                Rect::new(c.x - r, c.y - r, c.x + r, c.y + r)
            }
        }
    }

    /// Points a user can snap to as endpoints.
    pub fn endpoints(&self) -> Vec<Point> {
        match self {
            Geometry::Line { a, b } => vec![*a, *b],
            Geometry::Polyline { pts, .. } => pts.clone(),
            Geometry::Circle { .. } => Vec::new(),
            Geometry::Arc {
                c,
                r,
                start_angle,
                end_angle,
                ..
            } => vec![point_on_circle(*c, *r, *start_angle), point_on_circle(*c, *r, *end_angle)],
        }
    }

    /// Midpoints of every straight segment, and the sweep midpoint of an arc.
    pub fn midpoints(&self) -> Vec<Point> {
        match self {
            Geometry::Line { a, b } => vec![a.midpoint(*b)],
            Geometry::Polyline { pts, closed } => segments(pts, *closed)
                .map(|(a, b)| a.midpoint(b))
                .collect(),
            Geometry::Circle { .. } => Vec::new(),
            Geometry::Arc {
                c,
                r,
                start_angle,
                end_angle,
                ccw,
            } => {
                let sweep = arc_sweep(*start_angle, *end_angle, *ccw);
                let mid = if *ccw {
                    start_angle + sweep / 2.0
                } else {
                    start_angle - sweep / 2.0
                };
                vec![point_on_circle(*c, *r, mid)]
            }
        }
    }

    /// Apply a transform without validating it.
    ///
    /// Used for previews; the kernel performs the validated version on commit.
    /// Circles and arcs take the x scale factor as their radius scale.
    pub fn transformed(&self, transform: &Transform) -> Geometry {
        let affine = transform.to_affine();
        match self {
            Geometry::Line { a, b } => Geometry::Line {
                a: affine * *a,
                b: affine * *b,
            },
            Geometry::Polyline { pts, closed } => Geometry::Polyline {
                pts: pts.iter().map(|p| affine * *p).collect(),
                closed: *closed,
            },
            Geometry::Circle { c, r } => Geometry::Circle {
                c: affine * *c,
                r: r * transform.radius_scale(),
            },
            Geometry::Arc {
                c,
                r,
                start_angle,
                end_angle,
                ccw,
            } => {
                let turn = transform.rotation();
                Geometry::Arc {
                    c: affine * *c,
                    r: r * transform.radius_scale(),
                    start_angle: start_angle + turn,
                    end_angle: end_angle + turn,
                    ccw: *ccw,
                }
            }
        }
    }

    /// Closed four-corner polyline spanning two opposite corners.
    pub fn rect(p0: Point, p1: Point) -> Geometry {
        Geometry::Polyline {
            pts: vec![p0, Point::new(p1.x, p0.y), p1, Point::new(p0.x, p1.y)],
            closed: true,
        }
    }

    /// Reflection across the line through `axis_a` and `axis_b`, unvalidated.
    ///
    /// `None` when the axis has no direction. Arcs flip their winding.
    pub fn mirrored(&self, axis_a: Point, axis_b: Point) -> Option<Geometry> {
        let axis = axis_b - axis_a;
        let len = axis.hypot();
        if !(len > 0.0 && len.is_finite()) {
            return None;
        }
        let dir = axis / len;
        let phi = axis.y.atan2(axis.x);
        let reflect = |p: Point| {
            let v = p - axis_a;
            axis_a + dir * v.dot(dir) * 2.0 - v
        };
        Some(match self {
            Geometry::Line { a, b } => Geometry::Line {
                a: reflect(*a),
                b: reflect(*b),
            },
            Geometry::Polyline { pts, closed } => Geometry::Polyline {
                pts: pts.iter().map(|p| reflect(*p)).collect(),
                closed: *closed,
            },
            Geometry::Circle { c, r } => Geometry::Circle { c: reflect(*c), r: *r },
            Geometry::Arc {
                c,
                r,
                start_angle,
                end_angle,
                ccw,
            } => Geometry::Arc {
                c: reflect(*c),
                r: *r,
                start_angle: normalize_angle(2.0 * phi - start_angle),
                end_angle: normalize_angle(2.0 * phi - end_angle),
                ccw: !ccw,
            },
        })
    }

    /// Parallel copy at signed distance `dist`, unvalidated.
    ///
    /// Positive goes to the left of lines and polyline segments and outwards
    /// for circles and arcs. `None` for closed polylines, chains shorter than
    /// two points, and radii that would not stay positive.
    pub fn offset_by(&self, dist: f64) -> Option<Geometry> {
        match self {
            Geometry::Line { a, b } => {
                let n = left_normal(*a, *b) * dist;
                Some(Geometry::Line { a: *a + n, b: *b + n })
            }
            Geometry::Polyline { closed: true, .. } => None,
            Geometry::Polyline { pts, closed: false } => (pts.len() >= 2).then(|| Geometry::Polyline {
                pts: offset_chain(pts, dist, PARALLEL_TOL),
                closed: false,
            }),
            Geometry::Circle { c, r } => (r + dist > 0.0).then(|| Geometry::Circle { c: *c, r: r + dist }),
            Geometry::Arc {
                c,
                r,
                start_angle,
                end_angle,
                ccw,
            } => (r + dist > 0.0).then(|| Geometry::Arc {
                c: *c,
                r: r + dist,
                start_angle: *start_angle,
                end_angle: *end_angle,
                ccw: *ccw,
            }),
        }
    }

    /// Sign of the side `point` lies on, matching the kernel's offset convention:
    /// positive is the left normal of a line/segment, or outside a circle/arc.
    pub fn offset_side(&self, point: Point) -> f64 {
        let side = match self {
            Geometry::Line { a, b } => cross(*b - *a, point - *a),
            Geometry::Polyline { pts, closed } => segments(pts, *closed)
                .map(|(a, b)| (distance_to_segment(point, a, b), cross(b - a, point - a)))
                .min_by(|l, r| l.0.total_cmp(&r.0))
                .map(|(_, side)| side)
                .unwrap_or(1.0),
            Geometry::Circle { c, r } | Geometry::Arc { c, r, .. } => point.distance(*c) - r,
        };
        if side < 0.0 { -1.0 } else { 1.0 }
    }

    /// Short name of the variant, used in logs and warnings.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Geometry::Line { .. } => "Line",
            Geometry::Polyline { .. } => "Polyline",
            Geometry::Circle { .. } => "Circle",
            Geometry::Arc { .. } => "Arc",
        }
    }
}

/// Affine edit applied to a selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Transform {
    Translate { dx: f64, dy: f64 },
    Rotate { cx: f64, cy: f64, angle_rad: f64 },
    Scale { cx: f64, cy: f64, sx: f64, sy: f64 },
}

impl Transform {
    /// The equivalent affine matrix.
    pub fn to_affine(&self) -> Affine {
        match *self {
            Transform::Translate { dx, dy } => Affine::translate(Vec2::new(dx, dy)),
            Transform::Rotate { cx, cy, angle_rad } => {
                Affine::rotate_about(angle_rad, Point::new(cx, cy))
            }
            Transform::Scale { cx, cy, sx, sy } => {
                let center = Vec2::new(cx, cy);
                Affine::translate(center) * Affine::scale_non_uniform(sx, sy) * Affine::translate(-center)
            }
        }
    }

    /// Transform a single point.
    pub fn apply(&self, point: Point) -> Point {
        self.to_affine() * point
    }

    fn rotation(&self) -> f64 {
        match *self {
            Transform::Rotate { angle_rad, .. } => angle_rad,
            _ => 0.0,
        }
    }

    fn radius_scale(&self) -> f64 {
        match *self {
            Transform::Scale { sx, .. } => sx.abs(),
            _ => 1.0,
        }
    }
}

/// Iterate the straight segments of a point chain.
pub fn segments(pts: &[Point], closed: bool) -> impl Iterator<Item = (Point, Point)> + '_ {
    let wrap = if closed && pts.len() > 2 {
        Some((pts[pts.len() - 1], pts[0]))
    } else {
        None
    };
    pts.windows(2).map(|w| (w[0], w[1])).chain(wrap)
}

/// Relative tolerance below which adjacent chain segments count as parallel.
const PARALLEL_TOL: f64 = 1e-9;

/// Unit normal to the left of `a`-`b`.
pub fn left_normal(a: Point, b: Point) -> Vec2 {
    let d = b - a;
    Vec2::new(-d.y, d.x) / d.hypot()
}

/// Vertices of an open chain shifted by `dist`, with mitred joins.
///
/// Joins whose segments are parallel within `parallel_tol` are shifted
/// along the outgoing normal. Needs at least two points.
pub fn offset_chain(pts: &[Point], dist: f64, parallel_tol: f64) -> Vec<Point> {
    let normals: Vec<Vec2> = pts.windows(2).map(|w| left_normal(w[0], w[1])).collect();
    let n = pts.len();
    let mut out = Vec::with_capacity(n);
    out.push(pts[0] + normals[0] * dist);
    for i in 1..n - 1 {
        let d0 = pts[i] - pts[i - 1];
        let d1 = pts[i + 1] - pts[i];
        let p0 = pts[i - 1] + normals[i - 1] * dist;
        let p1 = pts[i] + normals[i] * dist;
        let denom = cross(d0, d1);
        if denom.abs() <= parallel_tol * d0.hypot() * d1.hypot() {
            out.push(p1);
        } else {
            // Mitre: intersection of the two shifted segment lines.
            let s = cross(p1 - p0, d1) / denom;
            out.push(p0 + d0 * s);
        }
    }
    out.push(pts[n - 1] + normals[n - 2] * dist);
    out
}

/// 2D cross product (z component).
pub fn cross(a: Vec2, b: Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.dot(ab);
    if len2 <= 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Point on a circle at `angle` radians.
pub fn point_on_circle(c: Point, r: f64, angle: f64) -> Point {
    Point::new(c.x + r * angle.cos(), c.y + r * angle.sin())
}

/// Wrap an angle into `(-PI, PI]`.
///
/// Non-finite input stays non-finite.
pub fn normalize_angle(a: f64) -> f64 {
    let a = a.rem_euclid(TAU);
    if a > PI { a - TAU } else { a }
}

/// Swept angle of an arc in `[0, TAU)`, measured in its winding direction.
pub fn arc_sweep(start: f64, end: f64, ccw: bool) -> f64 {
    let s = normalize_angle(start);
    let e = normalize_angle(end);
    let d = if ccw { e - s } else { s - e };
    if d < 0.0 { d + TAU } else { d }
}

/// Whether `theta` lies within the arc's sweep, with angular tolerance `eps`.
pub fn in_arc_range(theta: f64, start: f64, end: f64, ccw: bool, eps: f64) -> bool {
    let t = normalize_angle(theta);
    let s = normalize_angle(start);
    let sweep = arc_sweep(start, end, ccw);
    let mut u = if ccw { t - s } else { s - t };
    if u < 0.0 {
        u += TAU;
    }
    u <= sweep + eps || u >= TAU - eps
}
