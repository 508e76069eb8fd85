//! Shared numeric constants for the editing engine.

// ── Viewport ────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const ZOOM_MIN: f64 = 0.1;

/// Largest allowed zoom factor.
pub const ZOOM_MAX: f64 = 3.0;

/// Multiplier applied by one zoom-in step (zoom-out divides by it).
pub const ZOOM_STEP: f64 = 1.2;

/// Ctrl+wheel zoom multiplier when scrolling up.
pub const WHEEL_ZOOM_IN: f64 = 1.1;

/// Ctrl+wheel zoom multiplier when scrolling down.
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

// ── Element limits ──────────────────────────────────────────────

/// Resize floor for placed object width and height, in logical units.
pub const MIN_OBJECT_SIZE: f64 = 20.0;

/// Smallest label font size.
pub const FONT_SIZE_MIN: f64 = 8.0;

/// Largest label font size.
pub const FONT_SIZE_MAX: f64 = 72.0;

/// Logical pixels of vertical drag per font-size point on a label handle.
pub const FONT_RESIZE_STEP: f64 = 5.0;

/// Average glyph advance as a fraction of the font size, regular weight.
pub const GLYPH_ADVANCE_EM: f64 = 0.6;

/// Average glyph advance as a fraction of the font size, bold weight.
pub const BOLD_GLYPH_ADVANCE_EM: f64 = 0.66;

/// Thinnest allowed connector stroke.
pub const MIN_LINE_WIDTH: f64 = 1.0;

/// Stroke width of a newly placed connector.
pub const DEFAULT_LINE_WIDTH: f64 = 2.0;

/// Stroke colour used when nothing else is configured.
pub const DEFAULT_COLOR: &str = "#1f2937";

/// Font size of a newly placed label.
pub const DEFAULT_FONT_SIZE: f64 = 14.0;

/// Base pen width; the brush tool doubles it.
pub const DEFAULT_BRUSH_SIZE: f64 = 3.0;

/// Width multiplier for the brush tool relative to the pen.
pub const BRUSH_WIDTH_FACTOR: f64 = 2.0;

/// A freehand stroke with fewer samples than this is discarded on release.
pub const MIN_STROKE_POINTS: usize = 2;

// ── Snapping / selection ────────────────────────────────────────

/// Grid pitch for drag snapping, in logical units.
pub const GRID_SIZE: f64 = 20.0;

/// A marquee no larger than this on both axes is treated as an accidental drag.
pub const MARQUEE_MIN_SIZE: f64 = 5.0;

/// Padding around line and stroke bounds when testing against a marquee.
pub const THIN_ELEMENT_SLOP: f64 = 5.0;

/// Offset applied to duplicated elements.
pub const DUPLICATE_OFFSET: f64 = 20.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit radius for the group bounding-box corner handles.
pub const GROUP_HANDLE_RADIUS_PX: f64 = 15.0;

/// Screen-space hit radius for per-element handles and thin strokes.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Distance above an object's top edge to its rotate handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 24.0;

/// Padding drawn around the group bounding box overlay, in logical units.
pub const GROUP_BOX_PADDING: f64 = 5.0;

// ── History ─────────────────────────────────────────────────────

/// Default bound on stored history snapshots.
pub const DEFAULT_HISTORY_CAP: usize = 50;
