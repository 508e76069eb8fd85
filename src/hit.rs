//! Hit-testing for element bodies, per-element handles, and the group box.
//!
//! All inputs are logical points. Handle radii are specified in screen pixels
//! and converted through the camera so handles stay the same on-screen size at
//! every zoom level.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point};
use crate::consts::{GROUP_BOX_PADDING, GROUP_HANDLE_RADIUS_PX, HANDLE_RADIUS_PX, ROTATE_HANDLE_OFFSET_PX};
use crate::doc::{Element, ElementId, ElementKind, PlacedObject, Scene};
use crate::geom::Bounds;
use crate::selection::Selection;

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(Corner),
    RotateHandle,
    LineEndpoint(LineEnd),
    FontHandle,
}

/// Corner handle position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Corner {
    /// Same order as [`Bounds::corners`].
    pub const ALL: [Corner; 4] = [Self::Nw, Self::Ne, Self::Sw, Self::Se];

    /// Whether the handle drags the right edge.
    #[must_use]
    pub fn east(self) -> bool {
        matches!(self, Self::Ne | Self::Se)
    }

    /// Whether the handle drags the left edge.
    #[must_use]
    pub fn west(self) -> bool {
        matches!(self, Self::Nw | Self::Sw)
    }

    /// Whether the handle drags the top edge.
    #[must_use]
    pub fn north(self) -> bool {
        matches!(self, Self::Nw | Self::Ne)
    }

    /// Whether the handle drags the bottom edge.
    #[must_use]
    pub fn south(self) -> bool {
        matches!(self, Self::Sw | Self::Se)
    }
}

/// Which end of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnd {
    Start,
    End,
}

/// Result of a hit test.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub id: ElementId,
    pub kind: ElementKind,
    pub part: HitPart,
}

/// Result of testing against the group bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupHit {
    Corner(Corner),
    Body,
}

/// Shortest distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn dist_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Rotate `p` about `center` by `degrees` (clockwise on a y-down canvas).
#[must_use]
pub fn rotate_about(p: Point, center: Point, degrees: f64) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (dx, dy) = (p.x - center.x, p.y - center.y);
    Point::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
}

/// Map `p` into the unrotated frame of `obj`.
fn to_object_local(p: Point, obj: &PlacedObject) -> Point {
    let center = Point::new(obj.x + obj.width / 2.0, obj.y + obj.height / 2.0);
    rotate_about(p, center, -obj.rotation)
}

/// Where the rotate handle sits in the object's unrotated frame.
#[must_use]
pub fn rotate_handle_local(obj: &PlacedObject, camera: &Camera) -> Point {
    Point::new(obj.x + obj.width / 2.0, obj.y - camera.screen_dist_to_logical(ROTATE_HANDLE_OFFSET_PX))
}

fn corner_within(p: Point, bounds: &Bounds, radius: f64) -> Option<Corner> {
    Corner::ALL
        .into_iter()
        .zip(bounds.corners())
        .find(|(_, c)| p.distance(*c) <= radius)
        .map(|(corner, _)| corner)
}

/// The group box as drawn: element union plus a small margin.
#[must_use]
pub fn padded_group_box(bounds: &Bounds) -> Bounds {
    bounds.expand(GROUP_BOX_PADDING)
}

/// Test `p` against the group box. Corner handles win over the interior.
#[must_use]
pub fn hit_group(p: Point, bounds: &Bounds, camera: &Camera) -> Option<GroupHit> {
    let padded = padded_group_box(bounds);
    let radius = camera.screen_dist_to_logical(GROUP_HANDLE_RADIUS_PX);
    if let Some(corner) = corner_within(p, &padded, radius) {
        return Some(GroupHit::Corner(corner));
    }
    padded.contains(p).then_some(GroupHit::Body)
}

/// Test `p` against the handles a selected element exposes.
#[must_use]
pub fn hit_handles(p: Point, element: &Element, camera: &Camera) -> Option<HitPart> {
    let radius = camera.screen_dist_to_logical(HANDLE_RADIUS_PX);
    match element {
        Element::Object(obj) => {
            let local = to_object_local(p, obj);
            if local.distance(rotate_handle_local(obj, camera)) <= radius {
                return Some(HitPart::RotateHandle);
            }
            let rect = Bounds::from_rect(obj.x, obj.y, obj.width, obj.height);
            corner_within(local, &rect, radius).map(HitPart::ResizeHandle)
        }
        Element::Line(line) => {
            if p.distance(Point::new(line.x1, line.y1)) <= radius {
                Some(HitPart::LineEndpoint(LineEnd::Start))
            } else if p.distance(Point::new(line.x2, line.y2)) <= radius {
                Some(HitPart::LineEndpoint(LineEnd::End))
            } else {
                None
            }
        }
        Element::Label(_) => {
            let bounds = element.bounds()?;
            corner_within(p, &bounds, radius).map(|_| HitPart::FontHandle)
        }
        Element::Drawing(_) => None,
    }
}

/// Test `p` against an element's body.
#[must_use]
pub fn hit_body(p: Point, element: &Element, camera: &Camera) -> bool {
    let slop = camera.screen_dist_to_logical(HANDLE_RADIUS_PX);
    match element {
        Element::Object(obj) => {
            Bounds::from_rect(obj.x, obj.y, obj.width, obj.height).contains(to_object_local(p, obj))
        }
        Element::Label(_) => element.bounds().is_some_and(|b| b.contains(p)),
        Element::Line(line) => {
            let tolerance = (line.width / 2.0).max(slop);
            dist_to_segment(p, Point::new(line.x1, line.y1), Point::new(line.x2, line.y2)) <= tolerance
        }
        Element::Drawing(stroke) => {
            let tolerance = (stroke.width / 2.0).max(slop);
            match stroke.points.as_slice() {
                [] => false,
                [only] => p.distance(*only) <= tolerance,
                points => points.windows(2).any(|w| dist_to_segment(p, w[0], w[1]) <= tolerance),
            }
        }
    }
}

/// Find what is under `p`.
///
/// Handles of selected elements are checked first, most recently selected
/// first. Then bodies, topmost first: labels, objects, lines, drawings, each
/// newest first.
#[must_use]
pub fn hit_test(p: Point, scene: &Scene, camera: &Camera, selection: &Selection) -> Option<Hit> {
    for entry in selection.current().iter().rev() {
        let Some(element) = scene.get(&entry.id) else {
            continue;
        };
        if let Some(part) = hit_handles(p, element, camera) {
            return Some(Hit { id: entry.id.clone(), kind: entry.kind, part });
        }
    }

    [ElementKind::Label, ElementKind::Object, ElementKind::Line, ElementKind::Drawing]
        .into_iter()
        .flat_map(|kind| scene.all(kind).iter().rev())
        .find(|e| hit_body(p, e, camera))
        .map(|e| Hit { id: e.id().clone(), kind: e.kind(), part: HitPart::Body })
}
