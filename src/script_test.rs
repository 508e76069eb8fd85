#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{Element, ElementKind};
use crate::render::NullRenderer;

fn amp() -> LibraryItem {
    LibraryItem {
        id: 3,
        name: "Amp".into(),
        category: "audio".into(),
        image_ref: "library://3".into(),
        default_width: 80.0,
        default_height: 60.0,
    }
}

fn make_replayer() -> Replayer {
    Replayer::new(EditorConfig::default(), Box::new(NullRenderer), vec![amp()])
}

// =============================================================================
// Parsing
// =============================================================================

#[test]
fn parses_tagged_events_with_defaults() {
    let events = parse_script(
        r#"[
            {"type": "pointer_down", "x": 1, "y": 2},
            {"type": "pointer_up", "x": 1, "y": 2, "button": "middle", "modifiers": {"shift": true}},
            {"type": "key_down", "key": "Delete"},
            {"type": "set_tool", "tool": "brush"},
            {"type": "undo"}
        ]"#,
    )
    .unwrap();
    assert_eq!(
        events[0],
        ScriptEvent::PointerDown { x: 1.0, y: 2.0, button: Button::Primary, modifiers: Modifiers::default() }
    );
    match &events[1] {
        ScriptEvent::PointerUp { button, modifiers, .. } => {
            assert_eq!(*button, Button::Middle);
            assert!(modifiers.shift);
            assert!(!modifiers.ctrl);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(events[2], ScriptEvent::KeyDown { key: Key::new("Delete"), modifiers: Modifiers::default() });
    assert_eq!(events[3], ScriptEvent::SetTool { tool: Tool::Brush });
    assert_eq!(events[4], ScriptEvent::Undo);
}

#[test]
fn unknown_event_type_is_codec_error() {
    let err = parse_script(r#"[{"type": "teleport"}]"#).unwrap_err();
    assert_eq!(err.error_code(), "E_SCRIPT_CODEC");
}

// =============================================================================
// Prompt
// =============================================================================

#[test]
fn scripted_prompt_answers_in_order() {
    let queue = ScriptedPrompt::new();
    let mut prompt = queue.clone();
    queue.push(Some("A".into()));
    queue.push(None);
    assert_eq!(queue.pending(), 2);
    assert_eq!(prompt.request_text(Point::new(0.0, 0.0)), Some("A".into()));
    assert_eq!(prompt.request_text(Point::new(0.0, 0.0)), None);
    assert_eq!(prompt.request_text(Point::new(0.0, 0.0)), None);
    assert_eq!(queue.pending(), 0);
}

// =============================================================================
// Replay
// =============================================================================

#[test]
fn replays_place_and_drag() {
    let mut replayer = make_replayer();
    let events = vec![
        ScriptEvent::PlaceObject { library_id: 3, x: 100.0, y: 100.0 },
        ScriptEvent::PointerDown { x: 100.0, y: 100.0, button: Button::Primary, modifiers: Modifiers::default() },
        ScriptEvent::PointerMove { x: 120.0, y: 90.0, modifiers: Modifiers::default() },
        ScriptEvent::PointerUp { x: 120.0, y: 90.0, button: Button::Primary, modifiers: Modifiers::default() },
    ];
    let outcome = replayer.run(&events).unwrap();
    assert_eq!(outcome.events, 4);
    assert_eq!(outcome.commits(), 1);

    let session = replayer.into_session();
    match &session.scene.all(ElementKind::Object)[0] {
        Element::Object(o) => assert_eq!((o.x, o.y), (80.0, 60.0)),
        other => panic!("unexpected element {other:?}"),
    }
    assert_eq!(session.history.len(), 3);
}

#[test]
fn text_events_feed_label_tool() {
    let mut replayer = make_replayer();
    let events = parse_script(
        r#"[
            {"type": "set_tool", "tool": "label"},
            {"type": "text", "text": "Drums"},
            {"type": "pointer_down", "x": 10, "y": 20},
            {"type": "pointer_up", "x": 10, "y": 20},
            {"type": "text", "text": null},
            {"type": "pointer_down", "x": 50, "y": 20}
        ]"#,
    )
    .unwrap();
    replayer.run(&events).unwrap();
    let labels = replayer.session().scene.all(ElementKind::Label);
    assert_eq!(labels.len(), 1);
    match &labels[0] {
        Element::Label(l) => assert_eq!(l.text, "Drums"),
        other => panic!("unexpected element {other:?}"),
    }
}

#[test]
fn unknown_library_item_stops_replay() {
    let mut replayer = make_replayer();
    let events = vec![ScriptEvent::SelectAll, ScriptEvent::PlaceObject { library_id: 99, x: 0.0, y: 0.0 }];
    let err = replayer.run(&events).unwrap_err();
    assert!(matches!(err, ScriptError::UnknownLibraryItem { index: 1, id: 99 }));
    assert_eq!(err.error_code(), "E_UNKNOWN_LIBRARY_ITEM");
    assert!(replayer.session().scene.is_empty());
}

#[test]
fn commands_reach_the_session() {
    let mut replayer = make_replayer();
    let events = vec![
        ScriptEvent::PlaceObject { library_id: 3, x: 100.0, y: 100.0 },
        ScriptEvent::SelectAll,
        ScriptEvent::DuplicateSelected,
        ScriptEvent::DeleteSelected,
        ScriptEvent::Undo,
        ScriptEvent::SetZoom { zoom: 2.0 },
        ScriptEvent::UpdateObject {
            id: ElementId::new("obj_1"),
            patch: ObjectPatch { rotation: Some(45.0), ..ObjectPatch::default() },
        },
    ];
    replayer.run(&events).unwrap();
    let session = replayer.session_mut();
    assert_eq!(session.scene.len(), 2);
    assert_eq!(session.camera.zoom, 2.0);
    match session.element(&ElementId::new("obj_1")) {
        Some(Element::Object(o)) => assert_eq!(o.rotation, 45.0),
        other => panic!("unexpected element {other:?}"),
    }
    session.clear();
    assert!(session.scene.is_empty());
}
