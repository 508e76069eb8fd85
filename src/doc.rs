//! Scene document: element types, sparse property patches, and the in-memory store.
//!
//! This module defines what is on the stage (`Element` and its four per-kind
//! structs), the persisted shape of a whole scene (`SceneData`), sparse update
//! types for property edits (`ObjectPatch`, `LinePatch`, `LabelPatch`), and the
//! runtime store that owns all live elements (`Scene`).
//!
//! Data flows into this layer from persistence (JSON deserialization into
//! `SceneData`, then `Scene::replace_all`) and from the interaction engine
//! (additions, removals, geometry updates). History snapshots are `SceneData`
//! deep copies taken with `Scene::to_data`.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::consts::{
    BOLD_GLYPH_ADVANCE_EM, DEFAULT_COLOR, DEFAULT_LINE_WIDTH, FONT_SIZE_MAX, FONT_SIZE_MIN, GLYPH_ADVANCE_EM,
    MIN_LINE_WIDTH, MIN_OBJECT_SIZE,
};
use crate::error::ErrorCode;
use crate::geom::Bounds;

// =============================================================================
// IDS AND KINDS
// =============================================================================

/// Stable string identifier of an element, unique within the document's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

/// The kind of a scene element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Library image placed on the stage.
    Object,
    /// Straight connector between two endpoints.
    Line,
    /// Free-floating text.
    Label,
    /// Freehand pen or brush stroke.
    Drawing,
}

impl ElementKind {
    /// Every kind, in document collection order.
    pub const ALL: [ElementKind; 4] = [Self::Object, Self::Line, Self::Label, Self::Drawing];

    fn id_prefix(self) -> &'static str {
        match self {
            Self::Object => "obj",
            Self::Line => "line",
            Self::Label => "label",
            Self::Drawing => "drawing",
        }
    }
}

/// Dash pattern of a connector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Tool that produced a freehand stroke.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeTool {
    #[default]
    Pen,
    Brush,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_owned()
}

fn default_line_width() -> f64 {
    DEFAULT_LINE_WIDTH
}

// =============================================================================
// ELEMENT VARIANTS
// =============================================================================

/// A library image placed on the stage. `(x, y)` is the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedObject {
    pub id: ElementId,
    /// Library item this object was dropped from, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    /// Reference to the library item's image.
    #[serde(default)]
    pub image_data: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees around the object center, in `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
    /// Optional caption shown with the object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Straight connector between `(x1, y1)` and `(x2, y2)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub id: ElementId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_line_width")]
    pub width: f64,
    #[serde(default)]
    pub style: LineStyle,
}

/// Text anchored at its baseline-left corner `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: ElementId,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub bold: bool,
}

impl Label {
    /// Estimated rendered width from the current text, size, and weight.
    #[must_use]
    pub fn text_width(&self) -> f64 {
        let advance = if self.bold { BOLD_GLYPH_ADVANCE_EM } else { GLYPH_ADVANCE_EM };
        #[allow(clippy::cast_precision_loss)]
        let chars = self.text.chars().count() as f64;
        chars * self.font_size * advance
    }
}

/// Freehand stroke. Points are appended while drawing and frozen once added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub id: ElementId,
    pub points: Vec<Point>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_line_width")]
    pub width: f64,
    #[serde(default)]
    pub tool: StrokeTool,
}

/// Any element of the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Object(PlacedObject),
    Line(Connector),
    Label(Label),
    Drawing(Stroke),
}

/// Wrap rotation into `[0, 360)`; non-finite input becomes 0.
#[must_use]
pub fn normalize_degrees(degrees: f64) -> f64 {
    if degrees.is_finite() { degrees.rem_euclid(360.0) } else { 0.0 }
}

/// Clamp a font size into the label range; non-finite input becomes the floor.
#[must_use]
pub fn clamp_font_size(size: f64) -> f64 {
    if size.is_finite() { size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX) } else { FONT_SIZE_MIN }
}

/// Apply the object size floor; non-finite input becomes the floor.
#[must_use]
pub fn clamp_object_size(size: f64) -> f64 {
    if size.is_finite() { size.max(MIN_OBJECT_SIZE) } else { MIN_OBJECT_SIZE }
}

impl Element {
    #[must_use]
    pub fn id(&self) -> &ElementId {
        match self {
            Self::Object(o) => &o.id,
            Self::Line(l) => &l.id,
            Self::Label(l) => &l.id,
            Self::Drawing(d) => &d.id,
        }
    }

    fn set_id(&mut self, id: ElementId) {
        match self {
            Self::Object(o) => o.id = id,
            Self::Line(l) => l.id = id,
            Self::Label(l) => l.id = id,
            Self::Drawing(d) => d.id = id,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Object(_) => ElementKind::Object,
            Self::Line(_) => ElementKind::Line,
            Self::Label(_) => ElementKind::Label,
            Self::Drawing(_) => ElementKind::Drawing,
        }
    }

    /// Axis-aligned bounds in logical space. `None` only for a stroke with no points.
    ///
    /// Object rotation is ignored: bounds describe the unrotated rectangle.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Self::Object(o) => Some(Bounds::from_rect(o.x, o.y, o.width, o.height)),
            Self::Line(l) => Some(Bounds::from_edges(l.x1, l.y1, l.x2, l.y2)),
            Self::Label(l) => Some(Bounds::from_edges(l.x, l.y - l.font_size, l.x + l.text_width(), l.y)),
            Self::Drawing(d) => Bounds::from_points(d.points.iter().copied()),
        }
    }

    /// Reference point moved by a single-element drag.
    #[must_use]
    pub fn origin(&self) -> Point {
        match self {
            Self::Object(o) => Point::new(o.x, o.y),
            Self::Line(l) => Point::new(l.x1, l.y1),
            Self::Label(l) => Point::new(l.x, l.y),
            Self::Drawing(d) => d.points.first().copied().unwrap_or(Point::new(0.0, 0.0)),
        }
    }

    /// Whether dragging keeps this element's origin at `x, y >= 0`.
    #[must_use]
    pub fn clamps_to_origin(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Label(_))
    }

    /// Move every coordinate of the element by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            Self::Object(o) => {
                o.x += dx;
                o.y += dy;
            }
            Self::Line(l) => {
                l.x1 += dx;
                l.y1 += dy;
                l.x2 += dx;
                l.y2 += dy;
            }
            Self::Label(l) => {
                l.x += dx;
                l.y += dy;
            }
            Self::Drawing(d) => {
                for p in &mut d.points {
                    p.x += dx;
                    p.y += dy;
                }
            }
        }
    }

    /// Pull out-of-range geometry back to the nearest valid value.
    pub fn sanitize(&mut self) {
        match self {
            Self::Object(o) => {
                o.width = clamp_object_size(o.width);
                o.height = clamp_object_size(o.height);
                o.rotation = normalize_degrees(o.rotation);
            }
            Self::Line(l) => {
                l.width = if l.width.is_finite() { l.width.max(MIN_LINE_WIDTH) } else { MIN_LINE_WIDTH };
            }
            Self::Label(l) => l.font_size = clamp_font_size(l.font_size),
            Self::Drawing(_) => {}
        }
    }
}

// =============================================================================
// SPARSE PATCHES
// =============================================================================

/// Sparse update for a placed object. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// New caption; an empty string removes it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl ObjectPatch {
    pub fn apply(&self, obj: &mut PlacedObject) {
        if let Some(x) = self.x {
            obj.x = x;
        }
        if let Some(y) = self.y {
            obj.y = y;
        }
        if let Some(w) = self.width {
            obj.width = clamp_object_size(w);
        }
        if let Some(h) = self.height {
            obj.height = clamp_object_size(h);
        }
        if let Some(r) = self.rotation {
            obj.rotation = normalize_degrees(r);
        }
        if let Some(ref caption) = self.caption {
            obj.label = if caption.is_empty() { None } else { Some(caption.clone()) };
        }
    }
}

/// Sparse update for a connector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<LineStyle>,
}

impl LinePatch {
    pub fn apply(&self, line: &mut Connector) {
        if let Some(v) = self.x1 {
            line.x1 = v;
        }
        if let Some(v) = self.y1 {
            line.y1 = v;
        }
        if let Some(v) = self.x2 {
            line.x2 = v;
        }
        if let Some(v) = self.y2 {
            line.y2 = v;
        }
        if let Some(ref color) = self.color {
            line.color.clone_from(color);
        }
        if let Some(w) = self.width {
            line.width = if w.is_finite() { w.max(MIN_LINE_WIDTH) } else { MIN_LINE_WIDTH };
        }
        if let Some(style) = self.style {
            line.style = style;
        }
    }
}

/// Sparse update for a text label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
}

impl LabelPatch {
    pub fn apply(&self, label: &mut Label) {
        if let Some(ref text) = self.text {
            label.text.clone_from(text);
        }
        if let Some(x) = self.x {
            label.x = x;
        }
        if let Some(y) = self.y {
            label.y = y;
        }
        if let Some(size) = self.font_size {
            label.font_size = clamp_font_size(size);
        }
        if let Some(ref color) = self.color {
            label.color.clone_from(color);
        }
        if let Some(bold) = self.bold {
            label.bold = bold;
        }
    }
}

// =============================================================================
// PERSISTED SHAPE
// =============================================================================

/// Errors produced when decoding or encoding a scene document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("malformed scene document: {0}")]
    Codec(#[from] serde_json::Error),
}

impl ErrorCode for DocumentError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Codec(_) => "E_DOCUMENT_CODEC",
        }
    }
}

/// Serializable scene: four order-preserving arrays, one per element kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneData {
    #[serde(default)]
    pub objects: Vec<PlacedObject>,
    #[serde(default)]
    pub lines: Vec<Connector>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub drawings: Vec<Stroke>,
}

impl SceneData {
    /// Parse a scene document. Missing arrays are treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Codec`] when the JSON is malformed or a field has
    /// the wrong type.
    pub fn from_json(raw: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Encode as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Codec`] if serialization fails (non-string map keys
    /// cannot occur here, so this is practically infallible).
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Total number of elements across all four arrays.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len() + self.lines.len() + self.labels.len() + self.drawings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// STORE
// =============================================================================

fn now_ms() -> u128 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    dur.as_millis()
}

/// Numeric part of an `obj_<n>` id, if it has one.
fn object_serial(id: &ElementId) -> Option<u64> {
    match id.as_str().strip_prefix("obj_")?.parse::<u64>() {
        Ok(n) => Some(n),
        Err(_) => None,
    }
}

/// In-memory store of scene elements, one insertion-ordered collection per kind.
#[derive(Debug, Clone)]
pub struct Scene {
    objects: Vec<Element>,
    lines: Vec<Element>,
    labels: Vec<Element>,
    drawings: Vec<Element>,
    next_object_id: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene. The first placed object receives `obj_1`.
    #[must_use]
    pub fn new() -> Self {
        Self { objects: Vec::new(), lines: Vec::new(), labels: Vec::new(), drawings: Vec::new(), next_object_id: 1 }
    }

    fn collection(&self, kind: ElementKind) -> &Vec<Element> {
        match kind {
            ElementKind::Object => &self.objects,
            ElementKind::Line => &self.lines,
            ElementKind::Label => &self.labels,
            ElementKind::Drawing => &self.drawings,
        }
    }

    fn collection_mut(&mut self, kind: ElementKind) -> &mut Vec<Element> {
        match kind {
            ElementKind::Object => &mut self.objects,
            ElementKind::Line => &mut self.lines,
            ElementKind::Label => &mut self.labels,
            ElementKind::Drawing => &mut self.drawings,
        }
    }

    /// Mint an id never handed out before in this session.
    ///
    /// Objects use a counter; other kinds use the creation time plus a random
    /// tiebreaker, regenerated on the rare collision.
    fn fresh_id(&mut self, kind: ElementKind) -> ElementId {
        if kind == ElementKind::Object {
            let id = ElementId(format!("obj_{}", self.next_object_id));
            self.next_object_id += 1;
            return id;
        }
        loop {
            let tiebreak: u32 = rand::random();
            let id = ElementId(format!("{}_{}_{tiebreak:08x}", kind.id_prefix(), now_ms()));
            if !self.contains(&id) {
                return id;
            }
        }
    }

    /// Add an element under a freshly assigned id and return that id.
    ///
    /// Whatever id the element carried is discarded. Geometry is sanitized.
    pub fn add(&mut self, mut element: Element) -> ElementId {
        let id = self.fresh_id(element.kind());
        element.set_id(id.clone());
        element.sanitize();
        self.collection_mut(element.kind()).push(element);
        id
    }

    /// Remove every element whose id is listed. Absent ids are ignored.
    /// Returns the removed elements.
    pub fn remove(&mut self, ids: &[ElementId]) -> Vec<Element> {
        let mut removed = Vec::new();
        for kind in ElementKind::ALL {
            let coll = self.collection_mut(kind);
            let mut kept = Vec::with_capacity(coll.len());
            for element in coll.drain(..) {
                if ids.contains(element.id()) {
                    removed.push(element);
                } else {
                    kept.push(element);
                }
            }
            *coll = kept;
        }
        removed
    }

    /// Return a reference to an element by id.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.iter().find(|e| e.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.objects
            .iter_mut()
            .chain(self.lines.iter_mut())
            .chain(self.labels.iter_mut())
            .chain(self.drawings.iter_mut())
            .find(|e| e.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Overwrite the stored element with the same id and kind.
    /// Returns false (and changes nothing) when no such element exists.
    pub fn update(&mut self, mut element: Element) -> bool {
        let kind = element.kind();
        let Some(slot) = self.collection_mut(kind).iter_mut().find(|e| e.id() == element.id()) else {
            return false;
        };
        element.sanitize();
        *slot = element;
        true
    }

    /// All elements of one kind, in insertion order.
    #[must_use]
    pub fn all(&self, kind: ElementKind) -> &[Element] {
        self.collection(kind)
    }

    /// Every element: objects, lines, labels, then drawings.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.objects
            .iter()
            .chain(self.lines.iter())
            .chain(self.labels.iter())
            .chain(self.drawings.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len() + self.lines.len() + self.labels.len() + self.drawings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The id number the next placed object will receive.
    #[must_use]
    pub fn next_object_id(&self) -> u64 {
        self.next_object_id
    }

    /// Deep copy into the persisted shape.
    #[must_use]
    pub fn to_data(&self) -> SceneData {
        let mut data = SceneData::default();
        for element in self.iter() {
            match element.clone() {
                Element::Object(o) => data.objects.push(o),
                Element::Line(l) => data.lines.push(l),
                Element::Label(l) => data.labels.push(l),
                Element::Drawing(d) => data.drawings.push(d),
            }
        }
        data
    }

    fn repopulate(&mut self, data: SceneData) {
        self.clear_elements();
        let SceneData { objects, lines, labels, drawings } = data;
        let elements = objects
            .into_iter()
            .map(Element::Object)
            .chain(lines.into_iter().map(Element::Line))
            .chain(labels.into_iter().map(Element::Label))
            .chain(drawings.into_iter().map(Element::Drawing));
        for mut element in elements {
            element.sanitize();
            self.collection_mut(element.kind()).push(element);
        }
    }

    fn max_object_serial(&self) -> u64 {
        self.objects.iter().filter_map(|e| object_serial(e.id())).max().unwrap_or(0)
    }

    /// Replace every collection with a loaded document and reset the object
    /// counter to one past the largest existing object id.
    pub fn replace_all(&mut self, data: SceneData) {
        self.repopulate(data);
        self.next_object_id = self.max_object_serial() + 1;
    }

    /// Replace every collection with a history snapshot. The object counter
    /// never moves backwards, so ids from undone edits are not reissued.
    pub fn restore(&mut self, data: SceneData) {
        self.repopulate(data);
        self.next_object_id = self.next_object_id.max(self.max_object_serial() + 1);
    }

    fn clear_elements(&mut self) {
        self.objects.clear();
        self.lines.clear();
        self.labels.clear();
        self.drawings.clear();
    }

    /// Remove every element. The object counter is kept.
    pub fn clear(&mut self) {
        self.clear_elements();
    }
}
