//! Pieces shared by the move, rotate and scale tools.

use super::ToolContext;
use crate::document::EntityId;
use crate::error::{ToolError, ToolResult};
use crate::geometry::{Geometry, Transform};
use crate::kernel::EditOp;
use crate::overlay::{OverlayItem, OverlayStyle};
use crate::store::DocStore;
use kurbo::{Point, Rect};

/// Pixel size of the pivot marker.
pub(crate) const PIVOT_SIZE: f64 = 4.0;

/// Selected geometry captured when a transform drag starts.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Snapshot {
    pub ids: Vec<EntityId>,
    pub geoms: Vec<Geometry>,
    pub bounds: Rect,
}

impl Snapshot {
    /// Capture every selected entity that is currently interactive.
    pub fn capture(store: &DocStore) -> Result<Self, ToolError> {
        let mut ids = Vec::new();
        let mut geoms = Vec::new();
        let mut bounds: Option<Rect> = None;
        for entity in store.selected_entities() {
            ids.push(entity.id.clone());
            geoms.push(entity.geom.clone());
            bounds = Some(bounds.map_or(entity.bounds, |b| b.union(entity.bounds)));
        }
        match bounds {
            Some(bounds) => Ok(Self { ids, geoms, bounds }),
            None => Err(ToolError::NoSelection),
        }
    }

    /// Centre of the selection's bounding box.
    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    pub fn preview<'a>(&'a self, transform: &'a Transform) -> impl Iterator<Item = OverlayItem> + 'a {
        self.geoms
            .iter()
            .map(move |g| OverlayItem::shape(g.transformed(transform), OverlayStyle::Preview))
    }
}

/// A pointer drag over a captured selection, in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Drag {
    pub snapshot: Snapshot,
    pub start: Point,
    pub current: Point,
}

impl Drag {
    pub fn new(snapshot: Snapshot, start: Point) -> Self {
        Self { snapshot, start, current: start }
    }
}

/// Send one transform of the captured selection to the kernel.
pub(crate) fn commit_transform(ctx: &mut ToolContext<'_>, snapshot: &Snapshot, transform: Transform) -> ToolResult {
    ctx.commit(EditOp::TransformSelection {
        ids: snapshot.ids.clone(),
        transform,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::Fixture;

    #[test]
    fn test_capture_requires_selection() {
        let fx = Fixture::with(vec![("a", Geometry::line(Point::ZERO, Point::new(1.0, 1.0)))]);
        assert_eq!(Snapshot::capture(&fx.store), Err(ToolError::NoSelection));
    }

    #[test]
    fn test_capture_bounds_union() {
        let mut fx = Fixture::with(vec![
            ("a", Geometry::line(Point::new(-2.0, 0.0), Point::new(0.0, 0.0))),
            ("b", Geometry::Circle { c: Point::new(4.0, 0.0), r: 1.0 }),
            ("c", Geometry::line(Point::new(50.0, 50.0), Point::new(60.0, 60.0))),
        ]);
        fx.select(&["a", "b"]);
        let snap = Snapshot::capture(&fx.store).unwrap();
        assert_eq!(snap.ids, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(snap.bounds, Rect::new(-2.0, -1.0, 5.0, 1.0));
        assert_eq!(snap.center(), Point::new(1.5, 0.0));
        assert_eq!(snap.preview(&Transform::Translate { dx: 1.0, dy: 0.0 }).count(), 2);
    }

    #[test]
    fn test_preview_borrows_snapshot_and_transform() {
        let mut fx = Fixture::with(vec![("a", Geometry::line(Point::ZERO, Point::new(2.0, 0.0)))]);
        fx.select(&["a"]);
        let snap = Snapshot::capture(&fx.store).unwrap();
        let shift = Transform::Translate { dx: 0.0, dy: 3.0 };
        let items = snap.preview(&shift);
        let collected: Vec<OverlayItem> = items.collect();
        assert_eq!(
            collected,
            vec![OverlayItem::shape(
                Geometry::line(Point::new(0.0, 3.0), Point::new(2.0, 3.0)),
                OverlayStyle::Preview
            )]
        );
    }
}
