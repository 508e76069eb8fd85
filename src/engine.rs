//! Interaction engine: the `EditorSession` aggregate and its event intake.
//!
//! DESIGN
//! ======
//! One `EditorSession` owns the scene, the selection, the undo history, the
//! camera, and the gesture state. Pointer and key events arrive in screen
//! space, are mapped to logical space through the camera, and drive the
//! `InputState` machine. Every terminal transition that changed the document
//! takes exactly one history snapshot; continuous moves never do.
//!
//! The renderer is told about every placement, geometry change, removal, and
//! selection toggle as it happens, and receives the current overlay set after
//! each event. Host-facing hints (cursor, commits, view changes) are returned
//! as `Action`s.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here fails. Out-of-range geometry is clamped, gestures whose
//! target has disappeared become no-ops, and a degenerate group scale is 1.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::{debug, info};

use crate::camera::{Camera, Point};
use crate::config::EditorConfig;
use crate::consts::{
    BRUSH_WIDTH_FACTOR, DEFAULT_LINE_WIDTH, DUPLICATE_OFFSET, MIN_STROKE_POINTS, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT,
};
use crate::doc::{
    Connector, Element, ElementId, Label, LabelPatch, LinePatch, LineStyle, ObjectPatch, PlacedObject, Scene,
    SceneData, Stroke, StrokeTool, clamp_object_size,
};
use crate::geom::Bounds;
use crate::hit::{Corner, GroupHit, HitPart, LineEnd, hit_group, hit_test, padded_group_box};
use crate::history::History;
use crate::input::{Button, InputState, Key, Modifiers, Tool, UiState, WheelDelta};
use crate::persist::{LibraryItem, RecordId, StoredDesign};
use crate::render::{NullRenderer, Overlay, Renderer};
use crate::selection::{Selection, SelectionEntry, marquee_hits};
use crate::transform::{
    GroupScale, RectGeom, clamp_origin, drag_target, resize_font, resize_rect, rotation_at,
};

/// Pointer cursor the host should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Move,
    Grab,
    Grabbing,
    Crosshair,
    Text,
    ResizeNwse,
    ResizeNesw,
    Rotate,
}

impl Cursor {
    /// CSS cursor keyword.
    #[must_use]
    pub fn css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Move => "move",
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
            Self::Crosshair => "crosshair",
            Self::Text => "text",
            Self::ResizeNwse => "nwse-resize",
            Self::ResizeNesw => "nesw-resize",
            Self::Rotate => "alias",
        }
    }
}

fn corner_cursor(corner: Corner) -> Cursor {
    match corner {
        Corner::Nw | Corner::Se => Cursor::ResizeNwse,
        Corner::Ne | Corner::Sw => Cursor::ResizeNesw,
    }
}

/// Hints returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetCursor(Cursor),
    /// A history snapshot was taken.
    Committed { reason: &'static str },
    SelectionChanged,
    /// Zoom or pan changed.
    ViewChanged,
    RenderNeeded,
}

/// Synchronous text entry used by the label tool.
pub trait TextPrompt {
    /// Ask the user for label text at logical point `at`. `None` means cancelled.
    fn request_text(&mut self, at: Point) -> Option<String>;
}

/// Prompt that always cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl TextPrompt for NoPrompt {
    fn request_text(&mut self, _at: Point) -> Option<String> {
        None
    }
}

/// The stored design the session was loaded from, for quick-save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignRef {
    pub id: RecordId,
    pub name: String,
}

/// Everything one editing session owns.
pub struct EditorSession {
    pub scene: Scene,
    pub selection: Selection,
    pub history: History,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    pub config: EditorConfig,
    renderer: Box<dyn Renderer>,
    prompt: Box<dyn TextPrompt>,
    design: Option<DesignRef>,
    cursor: Cursor,
    overlays: Vec<Overlay>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default(), Box::new(NullRenderer), Box::new(NoPrompt))
    }
}

impl EditorSession {
    /// Start a session on an empty document. The empty baseline is the first
    /// history snapshot.
    #[must_use]
    pub fn new(config: EditorConfig, renderer: Box<dyn Renderer>, prompt: Box<dyn TextPrompt>) -> Self {
        let scene = Scene::new();
        let mut history = History::new(config.history_cap);
        history.snapshot(scene.to_data());
        let ui = UiState { snap_to_grid: config.snap_to_grid, ..UiState::default() };
        Self {
            scene,
            selection: Selection::new(),
            history,
            camera: Camera::default(),
            ui,
            input: InputState::Idle,
            config,
            renderer,
            prompt,
            design: None,
            cursor: Cursor::Default,
            overlays: Vec::new(),
        }
    }

    // --- Queries ---

    /// Deep copy of the document in its persisted shape.
    #[must_use]
    pub fn document(&self) -> SceneData {
        self.scene.to_data()
    }

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.scene.get(id)
    }

    #[must_use]
    pub fn design(&self) -> Option<&DesignRef> {
        self.design.as_ref()
    }

    /// Remember where the document was saved so the next save overwrites it.
    pub fn set_design(&mut self, id: RecordId, name: impl Into<String>) {
        self.design = Some(DesignRef { id, name: name.into() });
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Overlays last pushed to the renderer, in screen coordinates.
    #[must_use]
    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    /// Recompute the cached group box from current geometry and return it.
    /// `None` unless two or more elements are selected.
    pub fn refresh_group_bounds(&mut self) -> Option<Bounds> {
        if !self.selection.is_group() {
            return None;
        }
        self.selection.refresh_group_bounds(&self.scene);
        self.selection.group_bounds()
    }

    // --- Internal helpers ---

    fn commit(&mut self, reason: &'static str) -> Action {
        self.history.snapshot(self.scene.to_data());
        debug!(reason, snapshots = self.history.len(), cursor = self.history.cursor(), "history snapshot");
        Action::Committed { reason }
    }

    fn set_cursor(&mut self, cursor: Cursor, actions: &mut Vec<Action>) {
        if self.cursor != cursor {
            self.cursor = cursor;
            actions.push(Action::SetCursor(cursor));
        }
    }

    fn select_entry(&mut self, entry: SelectionEntry) -> bool {
        let id = entry.id.clone();
        if self.selection.select(entry.id, entry.kind) {
            self.renderer.set_selected(&id, true);
            return true;
        }
        false
    }

    /// Deselect everything. Returns whether anything was selected.
    fn clear_selection(&mut self) -> bool {
        let cleared = self.selection.deselect_all();
        for entry in &cleared {
            self.renderer.set_selected(&entry.id, false);
        }
        !cleared.is_empty()
    }

    /// Mutate one element in place and tell the renderer. Absent ids are a no-op.
    fn edit_element(&mut self, id: &ElementId, edit: impl FnOnce(&mut Element)) -> bool {
        let Some(element) = self.scene.get_mut(id) else {
            return false;
        };
        edit(element);
        element.sanitize();
        self.renderer.update_geometry(element);
        true
    }

    /// Add an element, show it, and return its id.
    fn add_element(&mut self, element: Element) -> ElementId {
        let id = self.scene.add(element);
        if let Some(added) = self.scene.get(&id) {
            self.renderer.place(added);
        }
        id
    }

    /// Swap in a whole new document. The selection is dropped first so no
    /// entry can outlive its element.
    fn swap_scene(&mut self, data: SceneData, reset_counter: bool) {
        self.input = InputState::Idle;
        self.selection.deselect_all();
        for element in self.scene.iter() {
            self.renderer.remove(element.id());
        }
        if reset_counter {
            self.scene.replace_all(data);
        } else {
            self.scene.restore(data);
        }
        for element in self.scene.iter() {
            self.renderer.place(element);
        }
    }

    fn stroke_width(&self, tool: StrokeTool) -> f64 {
        match tool {
            StrokeTool::Pen => self.config.brush_size,
            StrokeTool::Brush => self.config.brush_size * BRUSH_WIDTH_FACTOR,
        }
    }

    fn compute_overlays(&mut self) -> Vec<Overlay> {
        let mut out = Vec::new();
        let cam = self.camera;
        if let Some(bounds) = self.refresh_group_bounds() {
            let padded = padded_group_box(&bounds);
            let [nw, ne, sw, se] = padded.corners();
            let handles = [nw, ne, sw, se].map(|c| cam.logical_to_screen(c));
            out.push(Overlay::GroupBox { rect: Bounds::from_corners(handles[0], handles[3]), handles });
        }
        match &self.input {
            InputState::MarqueeSelecting { start, current, .. } => out.push(Overlay::Marquee {
                rect: Bounds::from_corners(cam.logical_to_screen(*start), cam.logical_to_screen(*current)),
            }),
            InputState::PlacingLine { start, current } => out.push(Overlay::LinePreview {
                from: cam.logical_to_screen(*start),
                to: cam.logical_to_screen(*current),
            }),
            InputState::DrawingStroke { tool, points } => out.push(Overlay::StrokePreview {
                points: points.iter().map(|p| cam.logical_to_screen(*p)).collect(),
                color: self.config.stroke_color.clone(),
                width: self.stroke_width(*tool) * cam.zoom,
            }),
            _ => {}
        }
        out
    }

    /// Push overlays to the renderer when they changed.
    fn refresh_overlays(&mut self) {
        let overlays = self.compute_overlays();
        if overlays != self.overlays {
            self.renderer.set_overlays(&overlays);
            self.overlays = overlays;
        }
    }

    fn hover_cursor(&mut self, p: Point) -> Cursor {
        match self.ui.tool {
            Tool::Line | Tool::Pen | Tool::Brush => return Cursor::Crosshair,
            Tool::Label => return Cursor::Text,
            Tool::Select => {}
        }
        if self.ui.space_held {
            return Cursor::Grab;
        }
        let group = self.refresh_group_bounds().and_then(|b| hit_group(p, &b, &self.camera));
        if let Some(GroupHit::Corner(corner)) = group {
            return corner_cursor(corner);
        }
        match hit_test(p, &self.scene, &self.camera, &self.selection).map(|h| h.part) {
            Some(HitPart::Body) => Cursor::Move,
            Some(HitPart::ResizeHandle(corner)) => corner_cursor(corner),
            Some(HitPart::RotateHandle) => Cursor::Rotate,
            Some(HitPart::LineEndpoint(_) | HitPart::FontHandle) => Cursor::Crosshair,
            None if group == Some(GroupHit::Body) => Cursor::Move,
            None => Cursor::Default,
        }
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        let placing_line = matches!(self.input, InputState::PlacingLine { .. });
        if self.input.is_active() && !placing_line {
            return actions;
        }
        let p = self.camera.screen_to_logical(screen_pt);

        if button == Button::Middle || (button == Button::Primary && self.ui.space_held) {
            if placing_line {
                return actions;
            }
            self.input = InputState::Panning { last_screen: screen_pt };
            self.set_cursor(Cursor::Grabbing, &mut actions);
            return actions;
        }
        if button != Button::Primary {
            return actions;
        }

        match self.ui.tool {
            Tool::Select => self.press_select(p, modifiers, &mut actions),
            Tool::Line => self.press_line(p, &mut actions),
            Tool::Label => self.press_label(p, &mut actions),
            Tool::Pen | Tool::Brush => {
                if let Some(tool) = self.ui.tool.stroke_tool() {
                    self.input = InputState::DrawingStroke { tool, points: vec![p] };
                }
            }
        }
        if self.input.is_active() {
            debug!(gesture = self.input.name(), x = p.x, y = p.y, "gesture start");
        }
        self.refresh_overlays();
        actions
    }

    fn press_select(&mut self, p: Point, modifiers: Modifiers, actions: &mut Vec<Action>) {
        let group = self.refresh_group_bounds();

        if let Some(bounds) = group {
            if let Some(GroupHit::Corner(corner)) = hit_group(p, &bounds, &self.camera) {
                self.input = InputState::ResizingGroup { gesture: GroupScale::begin(&bounds, corner, p), moved: false };
                self.set_cursor(corner_cursor(corner), actions);
                return;
            }
        }

        if let Some(hit) = hit_test(p, &self.scene, &self.camera, &self.selection) {
            self.press_element(p, hit.id, hit.part, modifiers, actions);
            return;
        }

        if let Some(bounds) = group {
            if hit_group(p, &bounds, &self.camera) == Some(GroupHit::Body) {
                self.input = InputState::DraggingGroup { last: p, moved: false };
                self.set_cursor(Cursor::Move, actions);
                return;
            }
        }

        let additive = modifiers.additive();
        if !additive && self.clear_selection() {
            actions.push(Action::SelectionChanged);
        }
        self.input = InputState::MarqueeSelecting { start: p, current: p, additive };
    }

    fn press_element(&mut self, p: Point, id: ElementId, part: HitPart, modifiers: Modifiers, actions: &mut Vec<Action>) {
        let Some(element) = self.scene.get(&id).cloned() else {
            return;
        };
        match (part, &element) {
            (HitPart::ResizeHandle(corner), Element::Object(o)) => {
                let orig = RectGeom { x: o.x, y: o.y, width: o.width, height: o.height };
                self.input = InputState::ResizingSingle { id, corner, start: p, orig, moved: false };
                self.set_cursor(corner_cursor(corner), actions);
            }
            (HitPart::RotateHandle, Element::Object(o)) => {
                let center = Point::new(o.x + o.width / 2.0, o.y + o.height / 2.0);
                self.input = InputState::RotatingObject { id, center, moved: false };
                self.set_cursor(Cursor::Rotate, actions);
            }
            (HitPart::LineEndpoint(end), Element::Line(_)) => {
                self.input = InputState::DraggingEndpoint { id, end, moved: false };
                self.set_cursor(Cursor::Crosshair, actions);
            }
            (HitPart::FontHandle, Element::Label(l)) => {
                self.input = InputState::ResizingLabel { id, start: p, orig_size: l.font_size, moved: false };
                self.set_cursor(Cursor::ResizeNwse, actions);
            }
            _ => {
                if !self.selection.is_selected(&id) {
                    if !modifiers.additive() {
                        self.clear_selection();
                    }
                    self.select_entry(SelectionEntry::of(&element));
                    actions.push(Action::SelectionChanged);
                }
                let origin = element.origin();
                let grab_offset = Point::new(p.x - origin.x, p.y - origin.y);
                self.input = InputState::DraggingSingle { id, grab_offset, moved: false };
                self.set_cursor(Cursor::Move, actions);
            }
        }
    }

    fn press_line(&mut self, p: Point, actions: &mut Vec<Action>) {
        match std::mem::take(&mut self.input) {
            InputState::PlacingLine { start, .. } => {
                let line = Element::Line(Connector {
                    id: ElementId::default(),
                    x1: start.x,
                    y1: start.y,
                    x2: p.x,
                    y2: p.y,
                    color: self.config.stroke_color.clone(),
                    width: DEFAULT_LINE_WIDTH,
                    style: LineStyle::Solid,
                });
                let id = self.add_element(line);
                info!(%id, "line placed");
                actions.push(self.commit("line"));
                actions.push(Action::RenderNeeded);
            }
            _ => self.input = InputState::PlacingLine { start: p, current: p },
        }
    }

    fn press_label(&mut self, p: Point, actions: &mut Vec<Action>) {
        let Some(text) = self.prompt.request_text(p) else {
            return;
        };
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let label = Element::Label(Label {
            id: ElementId::default(),
            text: text.to_owned(),
            x: p.x,
            y: p.y,
            font_size: self.config.label_font_size,
            color: self.config.stroke_color.clone(),
            bold: false,
        });
        let id = self.add_element(label);
        info!(%id, "label placed");
        actions.push(self.commit("label"));
        actions.push(Action::RenderNeeded);
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        let p = self.camera.screen_to_logical(screen_pt);
        let state = std::mem::take(&mut self.input);
        let mut changed = false;

        self.input = match state {
            InputState::Idle => {
                let cursor = self.hover_cursor(p);
                self.set_cursor(cursor, &mut actions);
                InputState::Idle
            }
            InputState::Panning { last_screen } => {
                self.camera.pan_by_screen(screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                actions.push(Action::ViewChanged);
                InputState::Panning { last_screen: screen_pt }
            }
            InputState::MarqueeSelecting { start, additive, .. } => {
                InputState::MarqueeSelecting { start, current: p, additive }
            }
            InputState::DraggingSingle { id, grab_offset, moved } => {
                changed = self.drag_single(&id, grab_offset, p);
                InputState::DraggingSingle { id, grab_offset, moved: moved || changed }
            }
            InputState::ResizingSingle { id, corner, start, orig, moved } => {
                let geom = resize_rect(orig, corner, p.x - start.x, p.y - start.y);
                changed = self.edit_element(&id, |el| {
                    if let Element::Object(o) = el {
                        o.x = geom.x;
                        o.y = geom.y;
                        o.width = geom.width;
                        o.height = geom.height;
                    }
                });
                InputState::ResizingSingle { id, corner, start, orig, moved: moved || (changed && geom != orig) }
            }
            InputState::ResizingLabel { id, start, orig_size, moved } => {
                let size = resize_font(orig_size, p.y - start.y);
                changed = self.edit_element(&id, |el| {
                    if let Element::Label(l) = el {
                        l.font_size = size;
                    }
                });
                let differs = (size - orig_size).abs() > f64::EPSILON;
                InputState::ResizingLabel { id, start, orig_size, moved: moved || (changed && differs) }
            }
            InputState::RotatingObject { id, center, moved } => {
                let rotation = rotation_at(center, p);
                changed = self.edit_element(&id, |el| {
                    if let Element::Object(o) = el {
                        o.rotation = rotation;
                    }
                });
                InputState::RotatingObject { id, center, moved: moved || changed }
            }
            InputState::DraggingEndpoint { id, end, moved } => {
                changed = self.edit_element(&id, |el| {
                    if let Element::Line(l) = el {
                        match end {
                            LineEnd::Start => (l.x1, l.y1) = (p.x, p.y),
                            LineEnd::End => (l.x2, l.y2) = (p.x, p.y),
                        }
                    }
                });
                InputState::DraggingEndpoint { id, end, moved: moved || changed }
            }
            InputState::DraggingGroup { last, moved } => {
                changed = self.drag_group(last, p);
                InputState::DraggingGroup { last: p, moved: moved || changed }
            }
            InputState::ResizingGroup { mut gesture, moved } => {
                let (updated, scale) = gesture.apply(&mut self.scene, self.selection.current(), p);
                for element in &updated {
                    self.renderer.update_geometry(element);
                }
                changed = !updated.is_empty();
                let scaled = changed && (scale - 1.0).abs() > f64::EPSILON;
                InputState::ResizingGroup { gesture, moved: moved || scaled }
            }
            InputState::DrawingStroke { tool, mut points } => {
                if points.last() != Some(&p) {
                    points.push(p);
                }
                InputState::DrawingStroke { tool, points }
            }
            InputState::PlacingLine { start, .. } => InputState::PlacingLine { start, current: p },
        };

        if changed {
            actions.push(Action::RenderNeeded);
        }
        self.refresh_overlays();
        actions
    }

    /// Move the dragged element to the pointer (less the grab offset) and move
    /// the rest of the selection by the same delta.
    fn drag_single(&mut self, id: &ElementId, grab_offset: Point, p: Point) -> bool {
        let Some(element) = self.scene.get(id) else {
            return false;
        };
        let snap = self.ui.snap_to_grid.then_some(self.config.grid_size);
        let mut target = drag_target(p, grab_offset, snap);
        if element.clamps_to_origin() {
            target = clamp_origin(target);
        }
        let origin = element.origin();
        let (dx, dy) = (target.x - origin.x, target.y - origin.y);
        if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
            return false;
        }
        self.edit_element(id, |el| el.translate(dx, dy));
        for other in self.selection.ids() {
            if &other != id {
                self.edit_element(&other, |el| el.translate(dx, dy));
            }
        }
        true
    }

    /// Move every selected element by the pointer delta since the last event.
    fn drag_group(&mut self, last: Point, p: Point) -> bool {
        let (dx, dy) = (p.x - last.x, p.y - last.y);
        if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
            return false;
        }
        let clamp = self.config.clamp_group_drag;
        let mut changed = false;
        for id in self.selection.ids() {
            changed |= self.edit_element(&id, |el| {
                el.translate(dx, dy);
                if clamp && el.clamps_to_origin() {
                    let origin = el.origin();
                    let clamped = clamp_origin(origin);
                    el.translate(clamped.x - origin.x, clamped.y - origin.y);
                }
            });
        }
        changed
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        let p = self.camera.screen_to_logical(screen_pt);
        let state = std::mem::take(&mut self.input);

        match state {
            InputState::Idle => {}
            InputState::Panning { .. } => {
                let cursor = if self.ui.space_held { Cursor::Grab } else { Cursor::Default };
                self.set_cursor(cursor, &mut actions);
            }
            InputState::MarqueeSelecting { start, additive, .. } => {
                let rect = Bounds::from_corners(start, p);
                let hits = marquee_hits(&self.scene, &rect);
                debug!(hits = hits.len(), additive, "marquee complete");
                let mut changed = false;
                for entry in hits {
                    changed |= self.select_entry(entry);
                }
                if changed {
                    actions.push(Action::SelectionChanged);
                }
            }
            InputState::DraggingSingle { moved, .. } => self.finish(moved, "drag", &mut actions),
            InputState::ResizingSingle { moved, .. } => self.finish(moved, "resize", &mut actions),
            InputState::ResizingLabel { moved, .. } => self.finish(moved, "font resize", &mut actions),
            InputState::RotatingObject { moved, .. } => self.finish(moved, "rotate", &mut actions),
            InputState::DraggingEndpoint { moved, .. } => self.finish(moved, "endpoint drag", &mut actions),
            InputState::DraggingGroup { moved, .. } => self.finish(moved, "group drag", &mut actions),
            InputState::ResizingGroup { moved, .. } => self.finish(moved, "group resize", &mut actions),
            InputState::DrawingStroke { tool, mut points } => {
                if points.last() != Some(&p) {
                    points.push(p);
                }
                if points.len() >= MIN_STROKE_POINTS {
                    let stroke = Element::Drawing(Stroke {
                        id: ElementId::default(),
                        points,
                        color: self.config.stroke_color.clone(),
                        width: self.stroke_width(tool),
                        tool,
                    });
                    let id = self.add_element(stroke);
                    info!(%id, "stroke finished");
                    actions.push(self.commit("stroke"));
                    actions.push(Action::RenderNeeded);
                } else {
                    debug!("stroke too short, discarded");
                }
            }
            // Line placement ends on the second click, not on release.
            InputState::PlacingLine { start, current } => self.input = InputState::PlacingLine { start, current },
        }

        if !self.input.is_active() && self.ui.tool == Tool::Select && !self.ui.space_held {
            let cursor = self.hover_cursor(p);
            self.set_cursor(cursor, &mut actions);
        }
        self.refresh_overlays();
        actions
    }

    fn finish(&mut self, moved: bool, reason: &'static str, actions: &mut Vec<Action>) {
        if moved {
            actions.push(self.commit(reason));
        }
    }

    pub fn on_wheel(&mut self, _screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        if modifiers.command() {
            let factor = if delta.dy < 0.0 { WHEEL_ZOOM_IN } else { WHEEL_ZOOM_OUT };
            self.camera.zoom_by(factor);
        } else {
            self.camera.pan_by_screen(-delta.dx, -delta.dy);
        }
        self.refresh_overlays();
        vec![Action::ViewChanged]
    }

    // --- Keyboard input ---

    pub fn on_key_down(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        if key.is_space() {
            self.ui.space_held = true;
            if !self.input.is_active() {
                self.set_cursor(Cursor::Grab, &mut actions);
            }
        } else if key.is("Escape") {
            actions.extend(self.escape());
        } else if (key.is("Delete") || key.is("Backspace")) && !self.input.is_active() {
            if self.delete_selected() > 0 {
                actions.push(Action::Committed { reason: "delete" });
                actions.push(Action::SelectionChanged);
                actions.push(Action::RenderNeeded);
            }
        }
        actions
    }

    pub fn on_key_up(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        if key.is_space() {
            self.ui.space_held = false;
            if !matches!(self.input, InputState::Panning { .. }) {
                self.set_cursor(Cursor::Default, &mut actions);
            }
        }
        actions
    }

    /// Abort the gesture in progress, or clear the selection when idle.
    ///
    /// Marquee, line placement, and strokes are discarded. Gestures that were
    /// editing geometry are rolled back to the last committed snapshot. No
    /// snapshot is taken either way.
    pub fn escape(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        let state = std::mem::take(&mut self.input);
        if state.is_active() {
            debug!(gesture = state.name(), "gesture cancelled");
        }
        if matches!(state, InputState::Panning { .. }) {
            let cursor = if self.ui.space_held { Cursor::Grab } else { Cursor::Default };
            self.set_cursor(cursor, &mut actions);
        }
        if state.edits_geometry() {
            self.rollback();
            actions.push(Action::RenderNeeded);
        } else if !state.is_active() && self.clear_selection() {
            actions.push(Action::SelectionChanged);
        }
        self.refresh_overlays();
        actions
    }

    /// Restore the last committed snapshot, keeping the selection.
    fn rollback(&mut self) {
        let Some(data) = self.history.current().cloned() else {
            return;
        };
        let keep = self.selection.current().to_vec();
        self.swap_scene(data, false);
        for entry in keep {
            if self.scene.contains(&entry.id) {
                self.select_entry(entry);
            }
        }
    }

    // --- Commands ---

    /// Switch tools. An unfinished line, stroke, or marquee is discarded; an
    /// edit gesture is rolled back.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.input.is_active() {
            self.escape();
        }
        self.ui.tool = tool;
        self.cursor = match tool {
            Tool::Select => Cursor::Default,
            Tool::Line | Tool::Pen | Tool::Brush => Cursor::Crosshair,
            Tool::Label => Cursor::Text,
        };
        debug!(?tool, "tool changed");
    }

    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.ui.snap_to_grid = enabled;
    }

    /// Record where the canvas sits on screen.
    pub fn set_canvas_origin(&mut self, x: f64, y: f64) {
        self.camera.set_origin(x, y);
        self.refresh_overlays();
    }

    pub fn zoom_in(&mut self) {
        self.camera.zoom_in();
        self.refresh_overlays();
    }

    pub fn zoom_out(&mut self) {
        self.camera.zoom_out();
        self.refresh_overlays();
    }

    pub fn reset_zoom(&mut self) {
        self.camera.reset();
        self.refresh_overlays();
    }

    /// Set the zoom factor, clamped.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.camera.set_zoom(zoom);
        self.refresh_overlays();
    }

    /// Drop a library item onto the stage, centered on logical point `at`.
    pub fn place_object(&mut self, item: &LibraryItem, at: Point) -> ElementId {
        let width = clamp_object_size(item.default_width);
        let height = clamp_object_size(item.default_height);
        let object = Element::Object(PlacedObject {
            id: ElementId::default(),
            library_id: Some(item.id),
            name: item.name.clone(),
            image_data: item.image_ref.clone(),
            x: at.x - width / 2.0,
            y: at.y - height / 2.0,
            width,
            height,
            rotation: 0.0,
            label: Some(item.name.clone()),
        });
        let id = self.add_element(object);
        info!(%id, library_id = item.id, "object placed");
        self.commit("place object");
        id
    }

    /// Delete every selected element. Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        let ids = self.selection.ids();
        if ids.is_empty() {
            return 0;
        }
        self.selection.deselect_all();
        let removed = self.scene.remove(&ids);
        for element in &removed {
            self.renderer.remove(element.id());
        }
        info!(count = removed.len(), "elements deleted");
        self.commit("delete");
        self.refresh_overlays();
        removed.len()
    }

    /// Clone the selection offset down and right; the clones become the selection.
    pub fn duplicate_selected(&mut self) -> Vec<ElementId> {
        let originals: Vec<Element> =
            self.selection.current().iter().filter_map(|e| self.scene.get(&e.id)).cloned().collect();
        if originals.is_empty() {
            return Vec::new();
        }
        self.clear_selection();
        let mut created = Vec::with_capacity(originals.len());
        for mut element in originals {
            element.translate(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
            let kind = element.kind();
            let id = self.add_element(element);
            self.select_entry(SelectionEntry { id: id.clone(), kind });
            created.push(id);
        }
        info!(count = created.len(), "elements duplicated");
        self.commit("duplicate");
        self.refresh_overlays();
        created
    }

    /// Select every element in the document.
    pub fn select_all(&mut self) {
        self.clear_selection();
        let entries: Vec<SelectionEntry> = self.scene.iter().map(SelectionEntry::of).collect();
        for entry in entries {
            self.select_entry(entry);
        }
        self.refresh_overlays();
    }

    /// Replace the selection with the given ids. Unknown ids are skipped.
    pub fn select_ids(&mut self, ids: &[ElementId]) {
        self.clear_selection();
        let entries: Vec<SelectionEntry> =
            ids.iter().filter_map(|id| self.scene.get(id)).map(SelectionEntry::of).collect();
        for entry in entries {
            self.select_entry(entry);
        }
        self.refresh_overlays();
    }

    fn restore_snapshot(&mut self, data: SceneData) {
        self.swap_scene(data, false);
        self.refresh_overlays();
    }

    /// Step back one snapshot. Returns false at the baseline.
    pub fn undo(&mut self) -> bool {
        if self.input.is_active() {
            self.escape();
        }
        let Some(data) = self.history.undo() else {
            return false;
        };
        self.restore_snapshot(data);
        info!(cursor = self.history.cursor(), "undo");
        true
    }

    /// Step forward one snapshot. Returns false at the tail.
    pub fn redo(&mut self) -> bool {
        if self.input.is_active() {
            self.escape();
        }
        let Some(data) = self.history.redo() else {
            return false;
        };
        self.restore_snapshot(data);
        info!(cursor = self.history.cursor(), "redo");
        true
    }

    fn apply_patch(&mut self, id: &ElementId, reason: &'static str, edit: impl FnOnce(&mut Element) -> bool) -> bool {
        let mut applied = false;
        let found = self.edit_element(id, |el| applied = edit(el));
        if !(found && applied) {
            return false;
        }
        self.commit(reason);
        self.refresh_overlays();
        true
    }

    /// Apply a sparse property edit to a placed object.
    pub fn update_object(&mut self, id: &ElementId, patch: &ObjectPatch) -> bool {
        self.apply_patch(id, "edit object", |el| match el {
            Element::Object(o) => {
                patch.apply(o);
                true
            }
            _ => false,
        })
    }

    /// Apply a sparse property edit to a connector.
    pub fn update_line(&mut self, id: &ElementId, patch: &LinePatch) -> bool {
        self.apply_patch(id, "edit line", |el| match el {
            Element::Line(l) => {
                patch.apply(l);
                true
            }
            _ => false,
        })
    }

    /// Apply a sparse property edit to a label.
    pub fn update_label(&mut self, id: &ElementId, patch: &LabelPatch) -> bool {
        self.apply_patch(id, "edit label", |el| match el {
            Element::Label(l) => {
                patch.apply(l);
                true
            }
            _ => false,
        })
    }

    /// Replace the document with a stored design and remember its id and name.
    pub fn load_document(&mut self, design: StoredDesign) {
        let StoredDesign { id, name, elements } = design;
        info!(id, %name, elements = elements.len(), "design loaded");
        self.swap_scene(elements, true);
        self.design = Some(DesignRef { id, name });
        self.commit("load document");
        self.refresh_overlays();
    }

    /// Replace the document with a template. The result is an unsaved design.
    pub fn load_template(&mut self, elements: SceneData) {
        info!(elements = elements.len(), "template loaded");
        self.swap_scene(elements, true);
        self.design = None;
        self.commit("load template");
        self.refresh_overlays();
    }

    /// Empty the document and forget the design reference.
    pub fn clear(&mut self) {
        self.swap_scene(SceneData::default(), false);
        self.design = None;
        info!("canvas cleared");
        self.commit("clear");
        self.refresh_overlays();
    }
}
