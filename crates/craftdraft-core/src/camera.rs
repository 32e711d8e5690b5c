//! Camera module for pan/zoom transforms between screen pixels and world units.
//!
//! Screen space has its origin at the top-left with Y growing downwards.
//! World space has Y growing upwards, so the mapping flips the Y axis.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Default lower zoom bound.
pub const DEFAULT_MIN_ZOOM: f64 = 0.05;
/// Default upper zoom bound.
pub const DEFAULT_MAX_ZOOM: f64 = 100.0;
/// Multiplicative zoom change applied per wheel step.
pub const WHEEL_ZOOM_FACTOR: f64 = 1.1;

/// Camera manages the view transform for the canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// World point shown at the screen's top-left corner.
    pub origin: Point,
    /// Screen pixels per world unit.
    pub zoom: f64,
    /// Minimum allowed zoom level
    pub min_zoom: f64,
    /// Maximum allowed zoom level
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            zoom: 1.0,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera with explicit zoom limits.
    pub fn with_limits(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            min_zoom,
            max_zoom,
            ..Self::default()
        }
    }

    /// Affine transform from world to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::new([
            self.zoom,
            0.0,
            0.0,
            -self.zoom,
            -self.origin.x * self.zoom,
            self.origin.y * self.zoom,
        ])
    }

    /// Affine transform from screen to world coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::new([
            1.0 / self.zoom,
            0.0,
            0.0,
            -1.0 / self.zoom,
            self.origin.x,
            self.origin.y,
        ])
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        Point::new(
            self.origin.x + screen_point.x / self.zoom,
            self.origin.y - screen_point.y / self.zoom,
        )
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        Point::new(
            (world_point.x - self.origin.x) * self.zoom,
            -(world_point.y - self.origin.y) * self.zoom,
        )
    }

    /// Convert a screen-pixel length into world units.
    pub fn world_radius(&self, pixels: f64) -> f64 {
        pixels / self.zoom
    }

    /// Set the zoom level, clamped to the camera's limits.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        }
    }

    /// Pan the camera by a delta in screen coordinates.
    ///
    /// Content follows the pointer: dragging right reveals world to the left.
    pub fn pan(&mut self, delta: Vec2) {
        self.origin.x -= delta.x / self.zoom;
        self.origin.y += delta.y / self.zoom;
    }

    /// Zoom the camera, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;

        // Move the origin so world_point stays under screen_point
        self.origin = Point::new(
            world_point.x - screen_point.x / self.zoom,
            world_point.y + screen_point.y / self.zoom,
        );
    }

    /// Apply one wheel step around `screen_point`.
    ///
    /// Positive `delta_y` zooms in by `step_factor`, negative zooms out, zero does nothing.
    pub fn wheel_zoom(&mut self, screen_point: Point, delta_y: f64, step_factor: f64) {
        if delta_y > 0.0 {
            self.zoom_at(screen_point, step_factor);
        } else if delta_y < 0.0 {
            self.zoom_at(screen_point, 1.0 / step_factor);
        }
    }

    /// Reset camera to default position and zoom.
    pub fn reset(&mut self) {
        self.origin = Point::ZERO;
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.origin, Point::ZERO);
        assert!((camera.zoom - 1.0).abs() < f64::EPSILON);
        assert!((camera.min_zoom - 0.05).abs() < f64::EPSILON);
        assert!((camera.max_zoom - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_flips_y() {
        let camera = Camera::new();
        let world = camera.screen_to_world(Point::new(100.0, 200.0));
        assert!((world.x - 100.0).abs() < f64::EPSILON);
        assert!((world.y + 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_origin_and_zoom() {
        let camera = Camera {
            origin: Point::new(50.0, 100.0),
            zoom: 2.0,
            ..Camera::default()
        };
        let world = camera.screen_to_world(Point::new(100.0, 200.0));
        assert!((world.x - 100.0).abs() < f64::EPSILON);
        assert!((world.y - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let camera = Camera {
            origin: Point::new(30.0, -20.0),
            zoom: 1.5,
            ..Camera::default()
        };

        let original = Point::new(123.0, 456.0);
        let world = camera.screen_to_world(original);
        let back = camera.world_to_screen(world);

        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_affine_matches_pointwise_mapping() {
        let camera = Camera {
            origin: Point::new(-7.0, 12.5),
            zoom: 3.25,
            ..Camera::default()
        };
        let w = Point::new(4.0, -9.0);
        let a = camera.transform() * w;
        let b = camera.world_to_screen(w);
        assert!((a.x - b.x).abs() < 1e-10);
        assert!((a.y - b.y).abs() < 1e-10);

        let back = camera.inverse_transform() * b;
        assert!((back.x - w.x).abs() < 1e-10);
        assert!((back.y - w.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 0.001);
        assert!((camera.zoom - camera.min_zoom).abs() < f64::EPSILON);

        camera.zoom = 1.0;
        camera.zoom_at(Point::ZERO, 1000.0);
        assert!((camera.zoom - camera.max_zoom).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wheel_zoom_saturates_at_bounds() {
        let mut camera = Camera::new();
        for _ in 0..200 {
            camera.wheel_zoom(Point::new(10.0, 10.0), 1.0, WHEEL_ZOOM_FACTOR);
        }
        assert!((camera.zoom - 100.0).abs() < f64::EPSILON);
        let origin = camera.origin;
        camera.wheel_zoom(Point::new(10.0, 10.0), 1.0, WHEEL_ZOOM_FACTOR);
        assert_eq!(camera.origin, origin);

        for _ in 0..400 {
            camera.wheel_zoom(Point::new(10.0, 10.0), -1.0, WHEEL_ZOOM_FACTOR);
        }
        assert!((camera.zoom - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wheel_zoom_is_multiplicative() {
        let mut camera = Camera::new();
        camera.wheel_zoom(Point::ZERO, 1.0, WHEEL_ZOOM_FACTOR);
        assert!((camera.zoom - 1.1).abs() < 1e-12);
        camera.wheel_zoom(Point::ZERO, -1.0, WHEEL_ZOOM_FACTOR);
        assert!((camera.zoom - 1.0).abs() < 1e-12);
        camera.wheel_zoom(Point::ZERO, 0.0, WHEEL_ZOOM_FACTOR);
        assert!((camera.zoom - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zoom_at_keeps_anchor_fixed() {
        let mut camera = Camera::new();
        let anchor = Point::new(300.0, 150.0);
        let before = camera.screen_to_world(anchor);
        camera.zoom_at(anchor, 2.0);
        let after = camera.screen_to_world(anchor);
        assert!((before.x - after.x).abs() < 1e-10);
        assert!((before.y - after.y).abs() < 1e-10);
    }

    #[test]
    fn test_pan() {
        let mut camera = Camera::new();
        camera.zoom = 2.0;
        let w = camera.screen_to_world(Point::new(10.0, 10.0));
        camera.pan(Vec2::new(10.0, 20.0));
        // The same world point is now under the shifted cursor
        let s = camera.world_to_screen(w);
        assert!((s.x - 20.0).abs() < 1e-10);
        assert!((s.y - 30.0).abs() < 1e-10);
    }

    #[test]
    fn test_world_radius_scales_with_zoom() {
        let mut camera = Camera::new();
        camera.zoom = 4.0;
        assert!((camera.world_radius(8.0) - 2.0).abs() < f64::EPSILON);
    }
}
