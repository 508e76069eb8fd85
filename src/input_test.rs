use super::*;

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_select() {
    assert_eq!(Tool::default(), Tool::Select);
}

#[test]
fn only_freehand_tools_have_stroke_tool() {
    assert_eq!(Tool::Pen.stroke_tool(), Some(StrokeTool::Pen));
    assert_eq!(Tool::Brush.stroke_tool(), Some(StrokeTool::Brush));
    assert_eq!(Tool::Select.stroke_tool(), None);
    assert_eq!(Tool::Line.stroke_tool(), None);
    assert_eq!(Tool::Label.stroke_tool(), None);
}

#[test]
fn tool_serde_lowercase() {
    assert_eq!(serde_json::to_string(&Tool::Brush).unwrap(), "\"brush\"");
    assert_eq!(serde_json::from_str::<Tool>("\"line\"").unwrap(), Tool::Line);
}

// =============================================================
// Modifiers
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift && !m.ctrl && !m.alt && !m.meta);
    assert!(!m.additive());
}

#[test]
fn additive_modifiers() {
    assert!(Modifiers { shift: true, ..Modifiers::default() }.additive());
    assert!(Modifiers { ctrl: true, ..Modifiers::default() }.additive());
    assert!(Modifiers { meta: true, ..Modifiers::default() }.additive());
    assert!(!Modifiers { alt: true, ..Modifiers::default() }.additive());
}

#[test]
fn command_modifier() {
    assert!(Modifiers { meta: true, ..Modifiers::default() }.command());
    assert!(!Modifiers { shift: true, ..Modifiers::default() }.command());
}

#[test]
fn modifiers_deserialize_partial() {
    let m: Modifiers = serde_json::from_str(r#"{"shift": true}"#).unwrap();
    assert!(m.shift);
    assert!(!m.ctrl);
}

// =============================================================
// Key
// =============================================================

#[test]
fn key_is_case_insensitive() {
    assert!(Key::new("Escape").is("escape"));
    assert!(!Key::new("Delete").is("Backspace"));
}

#[test]
fn key_space_variants() {
    assert!(Key::new(" ").is_space());
    assert!(Key::new("Space").is_space());
    assert!(!Key::new("s").is_space());
}

// =============================================================
// InputState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    let state = InputState::default();
    assert!(!state.is_active());
    assert_eq!(state.name(), "idle");
}

#[test]
fn marquee_is_active_but_not_geometry_edit() {
    let state = InputState::MarqueeSelecting {
        start: Point::new(0.0, 0.0),
        current: Point::new(1.0, 1.0),
        additive: false,
    };
    assert!(state.is_active());
    assert!(!state.edits_geometry());
}

#[test]
fn drags_edit_geometry() {
    let drag = InputState::DraggingGroup { last: Point::new(0.0, 0.0), moved: false };
    assert!(drag.edits_geometry());
    let rotate = InputState::RotatingObject { id: ElementId::new("obj_1"), center: Point::new(0.0, 0.0), moved: true };
    assert!(rotate.edits_geometry());
    assert_eq!(rotate.name(), "rotating_object");
}

#[test]
fn stroke_and_line_are_not_geometry_edits() {
    let stroke = InputState::DrawingStroke { tool: StrokeTool::Pen, points: vec![] };
    let line = InputState::PlacingLine { start: Point::new(0.0, 0.0), current: Point::new(0.0, 0.0) };
    assert!(!stroke.edits_geometry());
    assert!(!line.edits_geometry());
}
