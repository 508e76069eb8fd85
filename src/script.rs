//! Input scripts: recorded pointer, key, and command sequences replayed into
//! an `EditorSession`.
//!
//! A script is a JSON array of `ScriptEvent`s tagged by `type`. Pointer
//! coordinates are in screen space, exactly as a host would deliver them.
//! Label text is supplied ahead of time with `text` events and consumed by the
//! next label-tool press.

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::camera::Point;
use crate::config::EditorConfig;
use crate::doc::{ElementId, LabelPatch, LinePatch, ObjectPatch};
use crate::engine::{Action, EditorSession, TextPrompt};
use crate::error::ErrorCode;
use crate::input::{Button, Key, Modifiers, Tool, WheelDelta};
use crate::persist::{LibraryItem, RecordId};
use crate::render::Renderer;

// =============================================================================
// EVENTS
// =============================================================================

/// One step of a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerUp {
        x: f64,
        y: f64,
        #[serde(default)]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Wheel {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default)]
        dx: f64,
        dy: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyDown {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyUp {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Answer for the next label prompt. `null` cancels it.
    Text { text: Option<String> },
    SetTool { tool: Tool },
    /// Drop a library item centered on logical `(x, y)`.
    PlaceObject { library_id: RecordId, x: f64, y: f64 },
    Select { ids: Vec<ElementId> },
    SelectAll,
    DeleteSelected,
    DuplicateSelected,
    Escape,
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    SetZoom { zoom: f64 },
    SetSnapToGrid { enabled: bool },
    SetCanvasOrigin { x: f64, y: f64 },
    UpdateObject { id: ElementId, patch: ObjectPatch },
    UpdateLine { id: ElementId, patch: LinePatch },
    UpdateLabel { id: ElementId, patch: LabelPatch },
    Clear,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("script decode failed: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("event {index}: unknown library item {id}")]
    UnknownLibraryItem { index: usize, id: RecordId },
}

impl ErrorCode for ScriptError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Codec(_) => "E_SCRIPT_CODEC",
            Self::UnknownLibraryItem { .. } => "E_UNKNOWN_LIBRARY_ITEM",
        }
    }
}

/// Decode a script from its JSON array form.
///
/// # Errors
///
/// Returns [`ScriptError::Codec`] when the text is not a valid event array.
pub fn parse_script(raw: &str) -> Result<Vec<ScriptEvent>, ScriptError> {
    Ok(serde_json::from_str(raw)?)
}

// =============================================================================
// PROMPT
// =============================================================================

/// Text prompt fed from a queue of prepared answers. Clones share the queue.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    answers: Rc<RefCell<VecDeque<Option<String>>>>,
}

impl ScriptedPrompt {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer for a future prompt.
    pub fn push(&self, answer: Option<String>) {
        self.answers.borrow_mut().push_back(answer);
    }

    /// Answers not yet consumed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.answers.borrow().len()
    }
}

impl TextPrompt for ScriptedPrompt {
    fn request_text(&mut self, at: Point) -> Option<String> {
        let answer = self.answers.borrow_mut().pop_front().flatten();
        debug!(x = at.x, y = at.y, answered = answer.is_some(), "scripted prompt");
        answer
    }
}

// =============================================================================
// REPLAY
// =============================================================================

/// What a replay run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayOutcome {
    pub events: usize,
    /// Actions returned by the input handlers, in order.
    pub actions: Vec<Action>,
}

impl ReplayOutcome {
    /// Number of handler-reported history commits.
    #[must_use]
    pub fn commits(&self) -> usize {
        self.actions.iter().filter(|a| matches!(a, Action::Committed { .. })).count()
    }
}

/// Drives an `EditorSession` from script events.
pub struct Replayer {
    session: EditorSession,
    prompt: ScriptedPrompt,
    library: Vec<LibraryItem>,
}

impl Replayer {
    /// Fresh session whose label prompt is answered from `text` events.
    #[must_use]
    pub fn new(config: EditorConfig, renderer: Box<dyn Renderer>, library: Vec<LibraryItem>) -> Self {
        let prompt = ScriptedPrompt::new();
        let session = EditorSession::new(config, renderer, Box::new(prompt.clone()));
        Self { session, prompt, library }
    }

    #[must_use]
    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    #[must_use]
    pub fn into_session(self) -> EditorSession {
        self.session
    }

    /// Apply every event in order.
    ///
    /// # Errors
    ///
    /// Stops at the first event naming a library item that was not supplied.
    pub fn run(&mut self, events: &[ScriptEvent]) -> Result<ReplayOutcome, ScriptError> {
        let mut outcome = ReplayOutcome::default();
        for (index, event) in events.iter().enumerate() {
            let actions = self.apply(index, event)?;
            outcome.actions.extend(actions);
            outcome.events += 1;
        }
        info!(
            events = outcome.events,
            commits = outcome.commits(),
            elements = self.session.scene.len(),
            "script replayed"
        );
        Ok(outcome)
    }

    fn apply(&mut self, index: usize, event: &ScriptEvent) -> Result<Vec<Action>, ScriptError> {
        let session = &mut self.session;
        let actions = match event {
            ScriptEvent::PointerDown { x, y, button, modifiers } => {
                session.on_pointer_down(Point::new(*x, *y), *button, *modifiers)
            }
            ScriptEvent::PointerMove { x, y, modifiers } => session.on_pointer_move(Point::new(*x, *y), *modifiers),
            ScriptEvent::PointerUp { x, y, button, modifiers } => {
                session.on_pointer_up(Point::new(*x, *y), *button, *modifiers)
            }
            ScriptEvent::Wheel { x, y, dx, dy, modifiers } => {
                session.on_wheel(Point::new(*x, *y), WheelDelta { dx: *dx, dy: *dy }, *modifiers)
            }
            ScriptEvent::KeyDown { key, modifiers } => session.on_key_down(key, *modifiers),
            ScriptEvent::KeyUp { key, modifiers } => session.on_key_up(key, *modifiers),
            ScriptEvent::Escape => session.escape(),
            ScriptEvent::Text { text } => {
                self.prompt.push(text.clone());
                Vec::new()
            }
            ScriptEvent::PlaceObject { library_id, x, y } => {
                let Some(item) = self.library.iter().find(|item| item.id == *library_id) else {
                    return Err(ScriptError::UnknownLibraryItem { index, id: *library_id });
                };
                session.place_object(item, Point::new(*x, *y));
                Vec::new()
            }
            other => {
                Self::apply_command(session, other);
                Vec::new()
            }
        };
        Ok(actions)
    }

    fn apply_command(session: &mut EditorSession, event: &ScriptEvent) {
        match event {
            ScriptEvent::SetTool { tool } => session.set_tool(*tool),
            ScriptEvent::Select { ids } => session.select_ids(ids),
            ScriptEvent::SelectAll => session.select_all(),
            ScriptEvent::DeleteSelected => {
                session.delete_selected();
            }
            ScriptEvent::DuplicateSelected => {
                session.duplicate_selected();
            }
            ScriptEvent::Undo => {
                session.undo();
            }
            ScriptEvent::Redo => {
                session.redo();
            }
            ScriptEvent::ZoomIn => session.zoom_in(),
            ScriptEvent::ZoomOut => session.zoom_out(),
            ScriptEvent::ResetZoom => session.reset_zoom(),
            ScriptEvent::SetZoom { zoom } => session.set_zoom(*zoom),
            ScriptEvent::SetSnapToGrid { enabled } => session.set_snap_to_grid(*enabled),
            ScriptEvent::SetCanvasOrigin { x, y } => session.set_canvas_origin(*x, *y),
            ScriptEvent::UpdateObject { id, patch } => {
                session.update_object(id, patch);
            }
            ScriptEvent::UpdateLine { id, patch } => {
                session.update_line(id, patch);
            }
            ScriptEvent::UpdateLabel { id, patch } => {
                session.update_label(id, patch);
            }
            ScriptEvent::Clear => session.clear(),
            ScriptEvent::PointerDown { .. }
            | ScriptEvent::PointerMove { .. }
            | ScriptEvent::PointerUp { .. }
            | ScriptEvent::Wheel { .. }
            | ScriptEvent::KeyDown { .. }
            | ScriptEvent::KeyUp { .. }
            | ScriptEvent::Escape
            | ScriptEvent::Text { .. }
            | ScriptEvent::PlaceObject { .. } => {}
        }
    }
}
