//! Viewport camera: zoom, pan, and screen/logical coordinate conversion.
//!
//! Elements are stored in logical space. Pointer events arrive in screen
//! space relative to the page; the camera subtracts the canvas origin, divides
//! by zoom, and removes the pan offset. The pan offset is itself expressed in
//! logical units, so panning by a screen distance adds `distance / zoom`.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};

/// A point in either screen or logical space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// This point moved by `(dx, dy)`.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

/// Camera state for the stage canvas.
///
/// `origin_x` / `origin_y` are the canvas's top-left corner in screen pixels.
/// `pan_x` / `pan_y` are in logical units. `zoom` is a scale factor (1.0 = none).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { zoom: 1.0, pan_x: 0.0, pan_y: 0.0, origin_x: 0.0, origin_y: 0.0 }
    }
}

impl Camera {
    /// Convert a screen-space point to logical coordinates.
    #[must_use]
    pub fn screen_to_logical(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.origin_x) / self.zoom - self.pan_x,
            y: (screen.y - self.origin_y) / self.zoom - self.pan_y,
        }
    }

    /// Convert a logical point to screen coordinates. Used for transient overlays.
    #[must_use]
    pub fn logical_to_screen(&self, logical: Point) -> Point {
        Point {
            x: (logical.x + self.pan_x) * self.zoom + self.origin_x,
            y: (logical.y + self.pan_y) * self.zoom + self.origin_y,
        }
    }

    /// Convert a screen-space distance (pixels) to a logical distance.
    #[must_use]
    pub fn screen_dist_to_logical(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Set the zoom factor, silently clamped to the allowed range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = if zoom.is_finite() { zoom.clamp(ZOOM_MIN, ZOOM_MAX) } else { self.zoom };
    }

    /// Multiply the zoom factor by `factor`, clamped.
    pub fn zoom_by(&mut self, factor: f64) {
        self.set_zoom(self.zoom * factor);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(1.0 / ZOOM_STEP);
    }

    /// Reset zoom to 1 and pan to the origin. The canvas origin is untouched.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }

    /// Pan by a screen-space pointer delta.
    pub fn pan_by_screen(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx / self.zoom;
        self.pan_y += dy / self.zoom;
    }

    /// Record where the canvas sits on screen.
    pub fn set_origin(&mut self, origin_x: f64, origin_y: f64) {
        self.origin_x = origin_x;
        self.origin_y = origin_y;
    }
}
