//! Uniform-grid spatial index over entity bounding boxes.

use kurbo::{Point, Rect};
use std::collections::{HashMap, HashSet};

/// Default grid cell size in world units.
pub const DEFAULT_CELL_SIZE: f64 = 64.0;

/// Integer cell coordinate.
pub type Cell = (i64, i64);

/// Maps grid cells to the indices of entities whose bounds overlap them.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f64,
    buckets: HashMap<Cell, Vec<usize>>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

impl SpatialIndex {
    /// Create an empty index; non-positive sizes fall back to the default.
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            DEFAULT_CELL_SIZE
        };
        Self {
            cell_size,
            buckets: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Cell containing a world point.
    pub fn cell_of(&self, p: Point) -> Cell {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
        )
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.buckets.len()
    }

    /// Register `index` in every cell its bounds overlap.
    pub fn insert(&mut self, index: usize, bounds: Rect) {
        let (cx0, cy0) = self.cell_of(Point::new(bounds.x0, bounds.y0));
        let (cx1, cy1) = self.cell_of(Point::new(bounds.x1, bounds.y1));
        for cx in cx0..=cx1 {
            for cy in cy0..=cy1 {
                self.buckets.entry((cx, cy)).or_default().push(index);
            }
        }
    }

    /// Indices whose cells overlap the square window `[p - r, p + r]`.
    ///
    /// Each index appears once, in first-seen order.
    pub fn query(&self, p: Point, radius: f64) -> Vec<usize> {
        let r = radius.abs();
        let (cx0, cy0) = self.cell_of(Point::new(p.x - r, p.y - r));
        let (cx1, cy1) = self.cell_of(Point::new(p.x + r, p.y + r));

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for cx in cx0..=cx1 {
            for cy in cy0..=cy1 {
                let Some(bucket) = self.buckets.get(&(cx, cy)) else {
                    continue;
                };
                for &index in bucket {
                    if seen.insert(index) {
                        out.push(index);
                    }
                }
            }
        }
        out
    }
}
