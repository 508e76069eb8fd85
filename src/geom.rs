//! Axis-aligned bounds and the aggregate bounding box of element sets.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::doc::Element;

/// Axis-aligned rectangle in logical space. `width` and `height` are kept in
/// step with the edges by every constructor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Build from edges. Edges are normalized so `left <= right` and `top <= bottom`.
    #[must_use]
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        let (left, right) = if left <= right { (left, right) } else { (right, left) };
        let (top, bottom) = if top <= bottom { (top, bottom) } else { (bottom, top) };
        Self { left, top, right, bottom, width: right - left, height: bottom - top }
    }

    /// Rectangle spanned by two opposite corners in any order.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::from_edges(a.x, a.y, b.x, b.y)
    }

    /// Rectangle from a top-left origin and a size.
    #[must_use]
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::from_edges(x, y, x + width, y + height)
    }

    /// Tight bounds of a point set. `None` when the set is empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut left, mut top, mut right, mut bottom) = (first.x, first.y, first.x, first.y);
        for p in iter {
            left = left.min(p.x);
            top = top.min(p.y);
            right = right.max(p.x);
            bottom = bottom.max(p.y);
        }
        Some(Self::from_edges(left, top, right, bottom))
    }

    /// Smallest rectangle covering both.
    #[must_use]
    pub fn union(self, other: Bounds) -> Self {
        Self::from_edges(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Grow every edge outward by `pad`.
    #[must_use]
    pub fn expand(self, pad: f64) -> Self {
        Self::from_edges(self.left - pad, self.top - pad, self.right + pad, self.bottom + pad)
    }

    /// Rectangles intersect unless one lies entirely above, below, left, or
    /// right of the other. Touching edges count as intersecting.
    #[must_use]
    pub fn intersects(&self, other: &Bounds) -> bool {
        !(other.left > self.right || other.right < self.left || other.top > self.bottom || other.bottom < self.top)
    }

    /// Inclusive point containment.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// The four corners in `nw, ne, sw, se` order.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right, self.top),
            Point::new(self.left, self.bottom),
            Point::new(self.right, self.bottom),
        ]
    }
}

/// Union of every element's axis-aligned bounds. `None` for an empty set.
pub fn bounds_of<'a, I>(elements: I) -> Option<Bounds>
where
    I: IntoIterator<Item = &'a Element>,
{
    elements
        .into_iter()
        .filter_map(Element::bounds)
        .reduce(Bounds::union)
}
