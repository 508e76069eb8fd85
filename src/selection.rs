//! Selection model and marquee hit-testing.
//!
//! The selection stores references (id + kind) into the scene, never copies.
//! Policy (additive vs. replacing) belongs to the interaction engine; this
//! module only stores and queries.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use crate::consts::{MARQUEE_MIN_SIZE, THIN_ELEMENT_SLOP};
use crate::doc::{Element, ElementId, ElementKind, Scene};
use crate::geom::{Bounds, bounds_of};

/// A reference to one selected element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionEntry {
    pub id: ElementId,
    pub kind: ElementKind,
}

impl SelectionEntry {
    #[must_use]
    pub fn of(element: &Element) -> Self {
        Self { id: element.id().clone(), kind: element.kind() }
    }
}

/// Currently selected elements, in selection order, plus the cached group box.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    entries: Vec<SelectionEntry>,
    group_bounds: Option<Bounds>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element. Returns `false` when it was already selected.
    pub fn select(&mut self, id: ElementId, kind: ElementKind) -> bool {
        if self.is_selected(&id) {
            return false;
        }
        self.entries.push(SelectionEntry { id, kind });
        true
    }

    /// Remove one element. Returns `false` when it was not selected.
    pub fn deselect(&mut self, id: &ElementId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.id != id);
        self.entries.len() != before
    }

    /// Clear everything, including the cached group box. Returns the cleared entries.
    pub fn deselect_all(&mut self) -> Vec<SelectionEntry> {
        self.group_bounds = None;
        std::mem::take(&mut self.entries)
    }

    #[must_use]
    pub fn is_selected(&self, id: &ElementId) -> bool {
        self.entries.iter().any(|e| &e.id == id)
    }

    #[must_use]
    pub fn current(&self) -> &[SelectionEntry] {
        &self.entries
    }

    /// Selected ids, in selection order.
    #[must_use]
    pub fn ids(&self) -> Vec<ElementId> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the group box and its handles apply.
    #[must_use]
    pub fn is_group(&self) -> bool {
        self.entries.len() >= 2
    }

    /// Drop entries whose element is no longer in the scene. Returns the dropped entries.
    pub fn retain_present(&mut self, scene: &Scene) -> Vec<SelectionEntry> {
        let (kept, dropped): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| scene.contains(&e.id));
        self.entries = kept;
        dropped
    }

    /// Recompute the group box from current element geometry. Only set when
    /// two or more elements are selected.
    pub fn refresh_group_bounds(&mut self, scene: &Scene) {
        self.group_bounds = if self.is_group() {
            bounds_of(self.entries.iter().filter_map(|e| scene.get(&e.id)))
        } else {
            None
        };
    }

    #[must_use]
    pub fn group_bounds(&self) -> Option<Bounds> {
        self.group_bounds
    }
}

/// Whether a marquee rectangle is big enough to select anything.
#[must_use]
pub fn is_marquee_significant(rect: &Bounds) -> bool {
    rect.width > MARQUEE_MIN_SIZE || rect.height > MARQUEE_MIN_SIZE
}

/// Bounds used when testing an element against a marquee. Lines and strokes
/// are padded so thin horizontal or vertical ones can still be caught.
#[must_use]
pub fn marquee_bounds(element: &Element) -> Option<Bounds> {
    let b = element.bounds()?;
    Some(match element {
        Element::Line(_) | Element::Drawing(_) => b.expand(THIN_ELEMENT_SLOP),
        Element::Object(_) | Element::Label(_) => b,
    })
}

/// Every element intersecting `rect`, in scene order. Empty when the marquee
/// is below the accidental-drag threshold.
#[must_use]
pub fn marquee_hits(scene: &Scene, rect: &Bounds) -> Vec<SelectionEntry> {
    if !is_marquee_significant(rect) {
        return Vec::new();
    }
    scene
        .iter()
        .filter(|e| marquee_bounds(e).is_some_and(|b| rect.intersects(&b)))
        .map(SelectionEntry::of)
        .collect()
}
