//! Display list of transient overlay items for the host to draw.
//!
//! Items are in world coordinates; the host maps them through the camera.

use crate::geometry::Geometry;
use crate::snap::SnapCandidate;
use kurbo::Point;

/// Visual role of an overlay item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayStyle {
    /// Rubber-band preview of pending geometry.
    Preview,
    /// Construction guide, such as a radius line.
    Guide,
    /// Entity picked as the operand of an edit.
    Highlight,
    /// Winning snap point.
    Snap,
    /// Rotation or scale pivot.
    Pivot,
    /// Ambiguity candidate that is not current.
    Candidate,
    /// Ambiguity candidate that Enter would commit.
    CurrentCandidate,
}

/// One thing to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayItem {
    Shape {
        geom: Geometry,
        style: OverlayStyle,
    },
    Marker {
        point: Point,
        /// Marker size in screen pixels.
        size: f64,
        label: Option<&'static str>,
        style: OverlayStyle,
    },
}

impl OverlayItem {
    pub fn shape(geom: Geometry, style: OverlayStyle) -> Self {
        OverlayItem::Shape { geom, style }
    }

    pub fn segment(a: Point, b: Point, style: OverlayStyle) -> Self {
        OverlayItem::Shape {
            geom: Geometry::line(a, b),
            style,
        }
    }

    pub fn marker(point: Point, size: f64, style: OverlayStyle) -> Self {
        OverlayItem::Marker {
            point,
            size,
            label: None,
            style,
        }
    }

    /// Snap marker labelled with the snap kind.
    pub fn snap(candidate: &SnapCandidate) -> Self {
        OverlayItem::Marker {
            point: candidate.point,
            size: 6.0,
            label: Some(candidate.kind.label()),
            style: OverlayStyle::Snap,
        }
    }

    pub fn style(&self) -> OverlayStyle {
        match self {
            OverlayItem::Shape { style, .. } | OverlayItem::Marker { style, .. } => *style,
        }
    }
}
