//! Input model: tools, modifier keys, mouse buttons, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `InputState` is the active gesture tracked between pointer-down and
//! pointer-up, carrying everything needed to compute the next geometry from
//! the pointer position and to decide on release whether anything changed.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::doc::{ElementId, StrokeTool};
use crate::hit::{Corner, LineEnd};
use crate::transform::{GroupScale, RectGeom};

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Select,
    /// Two-click straight connector.
    Line,
    /// Click to place a text label.
    Label,
    /// Thin freehand stroke.
    Pen,
    /// Thick freehand stroke.
    Brush,
}

impl Tool {
    /// The stroke tool this mode draws with, if it is a freehand mode.
    #[must_use]
    pub fn stroke_tool(self) -> Option<StrokeTool> {
        match self {
            Self::Pen => Some(StrokeTool::Pen),
            Self::Brush => Some(StrokeTool::Brush),
            Self::Select | Self::Line | Self::Label => None,
        }
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Meta / Command key.
    pub meta: bool,
}

impl Modifiers {
    /// Whether a click or marquee should extend the selection instead of replacing it.
    #[must_use]
    pub fn additive(self) -> bool {
        self.shift || self.ctrl || self.meta
    }

    /// Whether the platform's command modifier is held.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    #[default]
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key, named as the host reports it (e.g. `"Delete"`, `"Escape"`, `" "`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Case-insensitive comparison against a key name.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }

    #[must_use]
    pub fn is_space(&self) -> bool {
        self.0 == " " || self.is("Space") || self.is("Spacebar")
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelDelta {
    pub dx: f64,
    /// Positive scrolls down.
    pub dy: f64,
}

/// Persistent UI state that outlives individual gestures.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub tool: Tool,
    /// Spacebar is held: presses pan instead of selecting.
    pub space_held: bool,
    pub snap_to_grid: bool,
}

/// Internal state for the input state machine.
///
/// Each active variant carries the context needed to compute geometry on
/// pointer-move and to decide on pointer-up whether to commit.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the viewport.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// Drawing a selection rectangle.
    MarqueeSelecting {
        /// Logical corner where the drag started.
        start: Point,
        /// Logical position of the live pointer.
        current: Point,
        /// Hits are added to the existing selection.
        additive: bool,
    },
    /// Moving one element; other selected elements follow.
    DraggingSingle {
        id: ElementId,
        /// Pointer position relative to the element origin at press time.
        grab_offset: Point,
        moved: bool,
    },
    /// Resizing a placed object by a corner handle.
    ResizingSingle {
        id: ElementId,
        corner: Corner,
        /// Logical pointer position at press time.
        start: Point,
        orig: RectGeom,
        moved: bool,
    },
    /// Changing a label's font size by dragging a corner handle.
    ResizingLabel {
        id: ElementId,
        start: Point,
        orig_size: f64,
        moved: bool,
    },
    /// Rotating a placed object with its rotate handle.
    RotatingObject {
        id: ElementId,
        /// Rotation pivot (object center).
        center: Point,
        moved: bool,
    },
    /// Repositioning one endpoint of a connector.
    DraggingEndpoint {
        id: ElementId,
        end: LineEnd,
        moved: bool,
    },
    /// Moving every selected element by a shared delta.
    DraggingGroup {
        /// Logical pointer position at the previous event.
        last: Point,
        moved: bool,
    },
    /// Uniformly scaling the selection from a group-box corner.
    ResizingGroup {
        gesture: GroupScale,
        moved: bool,
    },
    /// Accumulating freehand samples while the button is held.
    DrawingStroke {
        tool: StrokeTool,
        points: Vec<Point>,
    },
    /// First line click recorded; waiting for the second.
    PlacingLine {
        start: Point,
        current: Point,
    },
}

impl InputState {
    /// Whether a gesture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Whether this gesture edits existing geometry in place (and so can be
    /// rolled back by restoring the last committed snapshot).
    #[must_use]
    pub fn edits_geometry(&self) -> bool {
        matches!(
            self,
            Self::DraggingSingle { .. }
                | Self::ResizingSingle { .. }
                | Self::ResizingLabel { .. }
                | Self::RotatingObject { .. }
                | Self::DraggingEndpoint { .. }
                | Self::DraggingGroup { .. }
                | Self::ResizingGroup { .. }
        )
    }

    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Panning { .. } => "panning",
            Self::MarqueeSelecting { .. } => "marquee_selecting",
            Self::DraggingSingle { .. } => "dragging_single",
            Self::ResizingSingle { .. } => "resizing_single",
            Self::ResizingLabel { .. } => "resizing_label",
            Self::RotatingObject { .. } => "rotating_object",
            Self::DraggingEndpoint { .. } => "dragging_endpoint",
            Self::DraggingGroup { .. } => "dragging_group",
            Self::ResizingGroup { .. } => "resizing_group",
            Self::DrawingStroke { .. } => "drawing_stroke",
            Self::PlacingLine { .. } => "placing_line",
        }
    }
}
