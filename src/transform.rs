//! Transform math for drag, resize, rotate, font resize, and group scale.
//!
//! Everything here is pure numeric code over logical coordinates. Out-of-range
//! results saturate (size floors, font range, origin clamp) instead of failing.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use std::collections::HashMap;

use crate::camera::Point;
use crate::consts::FONT_RESIZE_STEP;
use crate::doc::{Element, ElementId, Scene, clamp_font_size, clamp_object_size, normalize_degrees};
use crate::geom::Bounds;
use crate::hit::Corner;
use crate::selection::SelectionEntry;

// =============================================================================
// DRAG
// =============================================================================

/// Round to the nearest multiple of `grid`. A non-positive grid disables snapping.
#[must_use]
pub fn snap_to_grid(value: f64, grid: f64) -> f64 {
    if grid > 0.0 { (value / grid).round() * grid } else { value }
}

/// New element origin for a single-element drag: pointer minus the offset
/// captured at press time, optionally snapped.
#[must_use]
pub fn drag_target(pointer: Point, grab_offset: Point, snap: Option<f64>) -> Point {
    let raw = Point::new(pointer.x - grab_offset.x, pointer.y - grab_offset.y);
    match snap {
        Some(grid) => Point::new(snap_to_grid(raw.x, grid), snap_to_grid(raw.y, grid)),
        None => raw,
    }
}

/// Keep an origin on the canvas (`x, y >= 0`).
#[must_use]
pub fn clamp_origin(p: Point) -> Point {
    Point::new(p.x.max(0.0), p.y.max(0.0))
}

// =============================================================================
// RESIZE
// =============================================================================

/// Rectangle geometry of a placed object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectGeom {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Resize `start` by dragging `corner` through `(dx, dy)`.
///
/// East/south handles grow the size directly. West/north handles grow it the
/// other way and shift the origin so the opposite edge stays put. Sizes never
/// drop below the object floor.
#[must_use]
pub fn resize_rect(start: RectGeom, corner: Corner, dx: f64, dy: f64) -> RectGeom {
    let mut out = start;
    if corner.east() {
        out.width = clamp_object_size(start.width + dx);
    }
    if corner.west() {
        out.width = clamp_object_size(start.width - dx);
        out.x = start.x + (start.width - out.width);
    }
    if corner.south() {
        out.height = clamp_object_size(start.height + dy);
    }
    if corner.north() {
        out.height = clamp_object_size(start.height - dy);
        out.y = start.y + (start.height - out.height);
    }
    out
}

/// Label font size after a vertical handle drag of `dy`.
#[must_use]
pub fn resize_font(start_size: f64, dy: f64) -> f64 {
    clamp_font_size(start_size + (dy / FONT_RESIZE_STEP).round())
}

// =============================================================================
// ROTATE
// =============================================================================

/// Rotation that points an object's top toward `pointer`. 0 degrees means the
/// pointer is straight above `center`; angles grow clockwise.
#[must_use]
pub fn rotation_at(center: Point, pointer: Point) -> f64 {
    let degrees = (pointer.y - center.y).atan2(pointer.x - center.x).to_degrees() + 90.0;
    normalize_degrees(degrees)
}

// =============================================================================
// GROUP
// =============================================================================

/// Uniform scale factor from the distance ratio `|current - center| / |start - center|`.
/// A degenerate start vector yields 1.
#[must_use]
pub fn group_scale_factor(center: Point, start: Point, current: Point) -> f64 {
    let start_dist = start.distance(center);
    if start_dist <= f64::EPSILON || !start_dist.is_finite() {
        return 1.0;
    }
    let scale = current.distance(center) / start_dist;
    if scale.is_finite() { scale } else { 1.0 }
}

fn scale_point(p: Point, center: Point, s: f64) -> Point {
    Point::new(center.x + (p.x - center.x) * s, center.y + (p.y - center.y) * s)
}

/// Scale an element about `center` by `s`.
///
/// Positions and endpoints move radially. Object sizes scale (floored), label
/// font sizes scale (clamped), stroke widths and rotation are kept.
#[must_use]
pub fn scale_about(element: &Element, center: Point, s: f64) -> Element {
    let mut out = element.clone();
    match &mut out {
        Element::Object(o) => {
            let origin = scale_point(Point::new(o.x, o.y), center, s);
            o.x = origin.x;
            o.y = origin.y;
            o.width = clamp_object_size(o.width * s);
            o.height = clamp_object_size(o.height * s);
        }
        Element::Line(l) => {
            let a = scale_point(Point::new(l.x1, l.y1), center, s);
            let b = scale_point(Point::new(l.x2, l.y2), center, s);
            (l.x1, l.y1, l.x2, l.y2) = (a.x, a.y, b.x, b.y);
        }
        Element::Label(l) => {
            let anchor = scale_point(Point::new(l.x, l.y), center, s);
            l.x = anchor.x;
            l.y = anchor.y;
            l.font_size = clamp_font_size(l.font_size * s);
        }
        Element::Drawing(d) => {
            for p in &mut d.points {
                *p = scale_point(*p, center, s);
            }
        }
    }
    out
}

/// State of one group-resize gesture.
///
/// Each element's geometry is captured the first time the gesture touches it
/// and every later step scales from that original, so incremental moves never
/// compound. Dropping the value discards the captured originals.
#[derive(Debug, Clone)]
pub struct GroupScale {
    pub center: Point,
    pub start: Point,
    pub corner: Corner,
    originals: HashMap<ElementId, Element>,
}

impl GroupScale {
    /// Begin a gesture on `bounds` with the pointer at `start`.
    #[must_use]
    pub fn begin(bounds: &Bounds, corner: Corner, start: Point) -> Self {
        Self { center: bounds.center(), start, corner, originals: HashMap::new() }
    }

    /// Number of elements captured so far.
    #[must_use]
    pub fn captured(&self) -> usize {
        self.originals.len()
    }

    /// Scale every selected element for the pointer at `current`. Missing
    /// elements are skipped. Returns the updated elements and the factor used.
    pub fn apply(&mut self, scene: &mut Scene, entries: &[SelectionEntry], current: Point) -> (Vec<Element>, f64) {
        let s = group_scale_factor(self.center, self.start, current);
        let mut updated = Vec::with_capacity(entries.len());
        for entry in entries {
            let Some(live) = scene.get(&entry.id) else {
                continue;
            };
            let original = self.originals.entry(entry.id.clone()).or_insert_with(|| live.clone());
            let scaled = scale_about(original, self.center, s);
            if scene.update(scaled.clone()) {
                updated.push(scaled);
            }
        }
        (updated, s)
    }
}
