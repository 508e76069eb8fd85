//! End-to-end editing scenarios driven through `EditorSession`.

#![allow(clippy::float_cmp)]

use stageplan::camera::Point;
use stageplan::config::EditorConfig;
use stageplan::doc::{Connector, Element, ElementId, ElementKind, Label, LineStyle, PlacedObject, SceneData, Stroke, StrokeTool};
use stageplan::engine::{EditorSession, NoPrompt};
use stageplan::input::{Button, Modifiers};
use stageplan::persist::{LibraryItem, MemoryStore, Persistence, StoredDesign};
use stageplan::render::NullRenderer;

const EPSILON: f64 = 1e-6;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn item(width: f64, height: f64) -> LibraryItem {
    LibraryItem {
        id: 1,
        name: "Monitor".into(),
        category: "audio".into(),
        image_ref: "library://1".into(),
        default_width: width,
        default_height: height,
    }
}

fn drag(session: &mut EditorSession, from: Point, to: Point) {
    session.on_pointer_down(from, Button::Primary, Modifiers::default());
    session.on_pointer_move(to, Modifiers::default());
    session.on_pointer_up(to, Button::Primary, Modifiers::default());
}

fn object_at(session: &EditorSession, id: &ElementId) -> (f64, f64, f64, f64) {
    match session.element(id) {
        Some(Element::Object(o)) => (o.x, o.y, o.width, o.height),
        other => panic!("expected object, got {other:?}"),
    }
}

fn make_object(id: &str, x: f64, y: f64, width: f64, height: f64) -> PlacedObject {
    PlacedObject {
        id: ElementId::new(id),
        library_id: None,
        name: String::new(),
        image_data: String::new(),
        x,
        y,
        width,
        height,
        rotation: 0.0,
        label: None,
    }
}

// =============================================================================
// Drag then undo
// =============================================================================

#[test]
fn drag_then_undo_restores_position() {
    let mut session = EditorSession::default();
    // Centered drop: top-left lands on (100, 100).
    let id = session.place_object(&item(80.0, 60.0), pt(140.0, 130.0));
    assert_eq!(object_at(&session, &id), (100.0, 100.0, 80.0, 60.0));

    drag(&mut session, pt(140.0, 130.0), pt(160.0, 120.0));
    assert_eq!(object_at(&session, &id), (120.0, 90.0, 80.0, 60.0));

    assert!(session.undo());
    assert_eq!(object_at(&session, &id), (100.0, 100.0, 80.0, 60.0));
}

// =============================================================================
// Group resize
// =============================================================================

#[test]
fn group_resize_scales_by_distance_ratio() {
    let mut session = EditorSession::default();
    let data = SceneData {
        objects: vec![make_object("obj_1", 0.0, 0.0, 40.0, 20.0), make_object("obj_2", 60.0, 30.0, 40.0, 20.0)],
        ..SceneData::default()
    };
    session.load_template(data);
    session.select_all();
    let bounds = session.refresh_group_bounds().map(|b| (b.left, b.top, b.right, b.bottom));
    assert_eq!(bounds, Some((0.0, 0.0, 100.0, 50.0)));

    // The padded se handle sits 5 units out; the scale factor is measured
    // from the press point, so start there and end at 3x its offset.
    let center = pt(50.0, 25.0);
    let start = pt(105.0, 55.0);
    let end = pt(center.x + (start.x - center.x) * 3.0, center.y + (start.y - center.y) * 3.0);
    drag(&mut session, start, end);

    let (x1, y1, w1, h1) = object_at(&session, &ElementId::new("obj_1"));
    assert!(approx_eq(x1, 50.0 - 50.0 * 3.0));
    assert!(approx_eq(y1, 25.0 - 25.0 * 3.0));
    assert!(approx_eq(w1, 120.0));
    assert!(approx_eq(h1, 60.0));
    let (x2, y2, _, _) = object_at(&session, &ElementId::new("obj_2"));
    assert!(approx_eq(x2, 50.0 + 10.0 * 3.0));
    assert!(approx_eq(y2, 25.0 + 5.0 * 3.0));
}

#[test]
fn group_scale_preserves_relative_angles() {
    let mut session = EditorSession::default();
    session.load_template(SceneData {
        objects: vec![make_object("obj_1", 0.0, 0.0, 40.0, 20.0), make_object("obj_2", 60.0, 30.0, 40.0, 20.0)],
        ..SceneData::default()
    });
    session.select_all();
    drag(&mut session, pt(-5.0, -5.0), pt(-55.0, -30.0));

    let (x1, y1, _, _) = object_at(&session, &ElementId::new("obj_1"));
    let (x2, y2, _, _) = object_at(&session, &ElementId::new("obj_2"));
    let before = 30.0_f64.atan2(60.0);
    let after = (y2 - y1).atan2(x2 - x1);
    assert!(approx_eq(before, after));
}

// =============================================================================
// Coordinate mapping
// =============================================================================

#[test]
fn zoomed_and_panned_click_maps_to_logical() {
    let mut session = EditorSession::default();
    session.set_zoom(2.0);
    session.camera.pan_x = 10.0;
    session.camera.pan_y = 10.0;
    assert_eq!(session.camera.screen_to_logical(pt(210.0, 210.0)), pt(95.0, 95.0));

    // A 20x20 object spanning (90..110) is hit by that click.
    let id = session.place_object(&item(20.0, 20.0), pt(100.0, 100.0));
    session.on_pointer_down(pt(210.0, 210.0), Button::Primary, Modifiers::default());
    session.on_pointer_up(pt(210.0, 210.0), Button::Primary, Modifiers::default());
    assert!(session.selection.is_selected(&id));
}

// =============================================================================
// History
// =============================================================================

#[test]
fn n_undos_then_n_redos_round_trip() {
    let mut session = EditorSession::default();
    let a = session.place_object(&item(80.0, 60.0), pt(100.0, 100.0));
    session.place_object(&item(80.0, 60.0), pt(300.0, 100.0));
    drag(&mut session, pt(100.0, 100.0), pt(100.0, 200.0));
    let before = session.document();

    for _ in 0..3 {
        assert!(session.undo());
    }
    assert!(session.scene.is_empty());
    for _ in 0..3 {
        assert!(session.redo());
    }
    assert_eq!(session.document(), before);
    assert_eq!(object_at(&session, &a).1, 170.0);
}

#[test]
fn history_cap_bounds_undo_depth() {
    let config = EditorConfig { history_cap: 5, ..EditorConfig::default() };
    let mut session = EditorSession::new(config, Box::new(NullRenderer), Box::new(NoPrompt));
    for i in 0..10 {
        session.place_object(&item(40.0, 40.0), pt(50.0 * f64::from(i), 50.0));
    }
    assert_eq!(session.history.len(), 5);
    let mut undos = 0;
    while session.undo() {
        undos += 1;
    }
    assert_eq!(undos, 4);
    assert_eq!(session.scene.len(), 6);
}

#[test]
fn new_edit_after_undo_discards_redo() {
    let mut session = EditorSession::default();
    session.place_object(&item(80.0, 60.0), pt(100.0, 100.0));
    session.place_object(&item(80.0, 60.0), pt(300.0, 100.0));
    session.undo();
    session.place_object(&item(80.0, 60.0), pt(500.0, 100.0));
    assert!(!session.redo());
    assert_eq!(session.scene.len(), 2);
}

// =============================================================================
// Marquee threshold and resize floor
// =============================================================================

#[test]
fn marquee_threshold() {
    let mut session = EditorSession::default();
    let id = session.place_object(&item(20.0, 20.0), pt(10.0, 10.0));
    // 4x4 rectangle over the object's corner: too small to count.
    drag(&mut session, pt(-2.0, -2.0), pt(2.0, 2.0));
    assert!(session.selection.is_empty());
    // 6-wide, zero-height rectangle crossing the object edge: counts.
    drag(&mut session, pt(-3.0, 10.0), pt(3.0, 10.0));
    assert!(session.selection.is_selected(&id));
}

#[test]
fn resize_never_goes_below_floor() {
    let mut session = EditorSession::default();
    let id = session.place_object(&item(80.0, 60.0), pt(100.0, 100.0));
    session.select_ids(std::slice::from_ref(&id));
    // se handle at (140, 130); drag far past the opposite corner.
    drag(&mut session, pt(140.0, 130.0), pt(-500.0, -500.0));
    let (_, _, width, height) = object_at(&session, &id);
    assert_eq!((width, height), (20.0, 20.0));
}

// =============================================================================
// Persistence round trip
// =============================================================================

fn every_kind() -> SceneData {
    SceneData {
        objects: vec![make_object("obj_4", 10.0, 10.0, 80.0, 60.0)],
        lines: vec![Connector {
            id: ElementId::new("line_1_aa"),
            x1: 0.0,
            y1: 0.0,
            x2: 50.0,
            y2: 50.0,
            color: "#000000".into(),
            width: 2.0,
            style: LineStyle::Dashed,
        }],
        labels: vec![Label {
            id: ElementId::new("label_1_bb"),
            text: "Stage".into(),
            x: 5.0,
            y: 40.0,
            font_size: 18.0,
            color: "#111111".into(),
            bold: true,
        }],
        drawings: vec![Stroke {
            id: ElementId::new("drawing_1_cc"),
            points: vec![pt(0.0, 0.0), pt(5.0, 5.0)],
            color: "#222222".into(),
            width: 3.0,
            tool: StrokeTool::Pen,
        }],
    }
}

#[test]
fn replace_all_round_trips_serialized_document() {
    let data = every_kind();
    let json = data.to_json().unwrap();
    let mut session = EditorSession::default();
    session.load_template(SceneData::from_json(&json).unwrap());
    assert_eq!(session.document(), data);
    assert_eq!(session.scene.next_object_id(), 5);
    for kind in ElementKind::ALL {
        assert_eq!(session.scene.all(kind).len(), 1);
    }
}

#[tokio::test]
async fn save_and_reload_through_store() {
    let store = MemoryStore::new();
    let mut session = EditorSession::default();
    session.load_template(every_kind());
    session.place_object(&item(80.0, 60.0), pt(300.0, 300.0));

    let id = store.save_document(None, "Main stage", &session.document(), None).await.unwrap();
    session.set_design(id, "Main stage");

    let mut reopened = EditorSession::default();
    reopened.load_document(store.load_document(id).await.unwrap());
    assert_eq!(reopened.document(), session.document());
    assert_eq!(reopened.design().map(|d| d.id), Some(id));
    assert_eq!(
        store.load_document(id).await.unwrap(),
        StoredDesign { id, name: "Main stage".into(), elements: session.document() }
    );
}
