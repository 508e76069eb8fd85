//! Rendering interface: the calls the engine makes after every mutation.
//!
//! The engine never paints. It tells a [`Renderer`] which elements appeared,
//! moved, vanished, or changed selection state, and which transient overlays
//! (marquee, group box, line preview, in-progress stroke) are visible. Overlay
//! geometry is already in screen coordinates.
//!
//! Three implementations ship with the crate: [`NullRenderer`] ignores
//! everything, [`RenderQueue`] buffers calls for a host to drain once per
//! frame, and [`TracingRenderer`] logs each call.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::camera::Point;
use crate::doc::{Element, ElementId};
use crate::geom::Bounds;

/// Transient UI drawn over the scene, in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// Selection rectangle being dragged.
    Marquee { rect: Bounds },
    /// Box around a multi-selection with its four corner handles (nw, ne, sw, se).
    GroupBox { rect: Bounds, handles: [Point; 4] },
    /// Dashed preview from the first line click to the pointer.
    LinePreview { from: Point, to: Point },
    /// Freehand stroke still being drawn.
    StrokePreview { points: Vec<Point>, color: String, width: f64 },
}

/// Paint surface driven by the engine.
pub trait Renderer {
    /// A new element should be shown.
    fn place(&mut self, element: &Element);

    /// An existing element's geometry or properties changed.
    fn update_geometry(&mut self, element: &Element);

    /// An element is gone.
    fn remove(&mut self, id: &ElementId);

    /// Toggle the selected look (handles, outline) of an element.
    fn set_selected(&mut self, id: &ElementId, selected: bool);

    /// Replace the visible overlays.
    fn set_overlays(&mut self, _overlays: &[Overlay]) {}
}

/// Renderer that ignores every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn place(&mut self, _element: &Element) {}
    fn update_geometry(&mut self, _element: &Element) {}
    fn remove(&mut self, _id: &ElementId) {}
    fn set_selected(&mut self, _id: &ElementId, _selected: bool) {}
}

/// One recorded renderer call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Place(Element),
    UpdateGeometry(Element),
    Remove(ElementId),
    SetSelected { id: ElementId, selected: bool },
    SetOverlays(Vec<Overlay>),
}

/// Buffers renderer calls behind a shared handle.
///
/// Give one clone to the engine and keep another; `drain` returns everything
/// recorded since the last drain.
#[derive(Debug, Clone, Default)]
pub struct RenderQueue {
    calls: Rc<RefCell<Vec<RenderCall>>>,
}

impl RenderQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every buffered call, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<RenderCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }

    fn push(&self, call: RenderCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Renderer for RenderQueue {
    fn place(&mut self, element: &Element) {
        self.push(RenderCall::Place(element.clone()));
    }

    fn update_geometry(&mut self, element: &Element) {
        self.push(RenderCall::UpdateGeometry(element.clone()));
    }

    fn remove(&mut self, id: &ElementId) {
        self.push(RenderCall::Remove(id.clone()));
    }

    fn set_selected(&mut self, id: &ElementId, selected: bool) {
        self.push(RenderCall::SetSelected { id: id.clone(), selected });
    }

    fn set_overlays(&mut self, overlays: &[Overlay]) {
        self.push(RenderCall::SetOverlays(overlays.to_vec()));
    }
}

/// Logs every call at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRenderer;

impl Renderer for TracingRenderer {
    fn place(&mut self, element: &Element) {
        debug!(id = %element.id(), kind = ?element.kind(), "render place");
    }

    fn update_geometry(&mut self, element: &Element) {
        debug!(id = %element.id(), kind = ?element.kind(), "render update");
    }

    fn remove(&mut self, id: &ElementId) {
        debug!(%id, "render remove");
    }

    fn set_selected(&mut self, id: &ElementId, selected: bool) {
        debug!(%id, selected, "render selection");
    }

    fn set_overlays(&mut self, overlays: &[Overlay]) {
        debug!(count = overlays.len(), "render overlays");
    }
}
