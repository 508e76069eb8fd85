#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::doc::{Connector, Label, LineStyle, Stroke, StrokeTool};

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn make_object(x: f64, y: f64, w: f64, h: f64, rotation: f64) -> Element {
    Element::Object(PlacedObject {
        id: ElementId::default(),
        library_id: None,
        name: String::new(),
        image_data: String::new(),
        x,
        y,
        width: w,
        height: h,
        rotation,
        label: None,
    })
}

fn make_line(x1: f64, y1: f64, x2: f64, y2: f64) -> Element {
    Element::Line(Connector {
        id: ElementId::default(),
        x1,
        y1,
        x2,
        y2,
        color: "#000".into(),
        width: 2.0,
        style: LineStyle::Solid,
    })
}

fn make_label(x: f64, y: f64) -> Element {
    Element::Label(Label {
        id: ElementId::default(),
        text: "Drums".into(),
        x,
        y,
        font_size: 20.0,
        color: "#000".into(),
        bold: false,
    })
}

fn selected(scene: &Scene, ids: &[&ElementId]) -> Selection {
    let mut sel = Selection::new();
    for id in ids {
        let kind = scene.get(id).map(Element::kind).unwrap();
        sel.select((*id).clone(), kind);
    }
    sel
}

// =============================================================
// Corner
// =============================================================

#[test]
fn corner_edge_flags() {
    assert!(Corner::Nw.north() && Corner::Nw.west());
    assert!(Corner::Se.south() && Corner::Se.east());
    assert!(!Corner::Ne.west() && !Corner::Ne.south());
    assert!(!Corner::Sw.east() && !Corner::Sw.north());
}

// =============================================================
// Geometry helpers
// =============================================================

#[test]
fn dist_to_segment_interior_and_ends() {
    let a = pt(0.0, 0.0);
    let b = pt(10.0, 0.0);
    assert!((dist_to_segment(pt(5.0, 3.0), a, b) - 3.0).abs() < 1e-9);
    assert!((dist_to_segment(pt(-3.0, 4.0), a, b) - 5.0).abs() < 1e-9);
    assert!((dist_to_segment(pt(1.0, 1.0), a, a) - 2f64.sqrt()).abs() < 1e-9);
}

#[test]
fn rotate_about_quarter_turn_is_clockwise() {
    let p = rotate_about(pt(10.0, 0.0), pt(0.0, 0.0), 90.0);
    assert!(p.x.abs() < 1e-9);
    assert!((p.y - 10.0).abs() < 1e-9);
}

// =============================================================
// Group box
// =============================================================

#[test]
fn group_corner_within_radius() {
    let bounds = Bounds::from_edges(0.0, 0.0, 100.0, 50.0);
    let cam = Camera::default();
    assert_eq!(hit_group(pt(100.0, 50.0), &bounds, &cam), Some(GroupHit::Corner(Corner::Se)));
    assert_eq!(hit_group(pt(-3.0, -3.0), &bounds, &cam), Some(GroupHit::Corner(Corner::Nw)));
}

#[test]
fn group_corner_radius_scales_with_zoom() {
    let bounds = Bounds::from_edges(0.0, 0.0, 100.0, 50.0);
    // Padded corner is (105, 55); point is 10 logical units away.
    let p = pt(113.0, 61.0);
    assert!(hit_group(p, &bounds, &Camera::default()).is_some());
    let zoomed = Camera { zoom: 3.0, ..Camera::default() };
    assert!(hit_group(p, &bounds, &zoomed).is_none());
}

#[test]
fn group_interior_is_body() {
    let bounds = Bounds::from_edges(0.0, 0.0, 100.0, 50.0);
    assert_eq!(hit_group(pt(50.0, 25.0), &bounds, &Camera::default()), Some(GroupHit::Body));
    assert_eq!(hit_group(pt(300.0, 25.0), &bounds, &Camera::default()), None);
}

// =============================================================
// Handles
// =============================================================

#[test]
fn object_corner_is_resize_handle() {
    let obj = make_object(100.0, 100.0, 80.0, 60.0, 0.0);
    let cam = Camera::default();
    assert_eq!(hit_handles(pt(181.0, 161.0), &obj, &cam), Some(HitPart::ResizeHandle(Corner::Se)));
    assert_eq!(hit_handles(pt(100.0, 160.0), &obj, &cam), Some(HitPart::ResizeHandle(Corner::Sw)));
    assert_eq!(hit_handles(pt(140.0, 130.0), &obj, &cam), None);
}

#[test]
fn object_rotate_handle_above_top_center() {
    let obj = make_object(100.0, 100.0, 80.0, 60.0, 0.0);
    assert_eq!(hit_handles(pt(140.0, 76.0), &obj, &Camera::default()), Some(HitPart::RotateHandle));
}

#[test]
fn rotated_object_handles_follow_rotation() {
    // 180 degrees: the rotate handle ends up below the object.
    let obj = make_object(100.0, 100.0, 80.0, 60.0, 180.0);
    let cam = Camera::default();
    assert_eq!(hit_handles(pt(140.0, 184.0), &obj, &cam), Some(HitPart::RotateHandle));
    assert_eq!(hit_handles(pt(140.0, 76.0), &obj, &cam), None);
}

#[test]
fn line_endpoints_are_handles() {
    let line = make_line(0.0, 0.0, 100.0, 0.0);
    let cam = Camera::default();
    assert_eq!(hit_handles(pt(2.0, 2.0), &line, &cam), Some(HitPart::LineEndpoint(LineEnd::Start)));
    assert_eq!(hit_handles(pt(98.0, 0.0), &line, &cam), Some(HitPart::LineEndpoint(LineEnd::End)));
    assert_eq!(hit_handles(pt(50.0, 0.0), &line, &cam), None);
}

#[test]
fn label_corners_are_font_handles() {
    let label = make_label(10.0, 50.0);
    assert_eq!(hit_handles(pt(10.0, 30.0), &label, &Camera::default()), Some(HitPart::FontHandle));
}

// =============================================================
// Bodies
// =============================================================

#[test]
fn rotated_object_body_uses_local_space() {
    // 40x20 centred at (50, 50), rotated 90 degrees: occupies x 40..60, y 30..70.
    let obj = make_object(30.0, 40.0, 40.0, 20.0, 90.0);
    let cam = Camera::default();
    assert!(hit_body(pt(50.0, 68.0), &obj, &cam));
    assert!(!hit_body(pt(32.0, 50.0), &obj, &cam));
}

#[test]
fn line_body_uses_tolerance() {
    let line = make_line(0.0, 0.0, 100.0, 0.0);
    let cam = Camera::default();
    assert!(hit_body(pt(50.0, 7.0), &line, &cam));
    assert!(!hit_body(pt(50.0, 12.0), &line, &cam));
}

#[test]
fn stroke_body_checks_each_segment() {
    let stroke = Element::Drawing(Stroke {
        id: ElementId::default(),
        points: vec![pt(0.0, 0.0), pt(50.0, 0.0), pt(50.0, 50.0)],
        color: "#000".into(),
        width: 3.0,
        tool: StrokeTool::Pen,
    });
    let cam = Camera::default();
    assert!(hit_body(pt(52.0, 30.0), &stroke, &cam));
    assert!(!hit_body(pt(20.0, 30.0), &stroke, &cam));
}

// =============================================================
// hit_test
// =============================================================

#[test]
fn empty_space_hits_nothing() {
    let mut scene = Scene::new();
    scene.add(make_object(0.0, 0.0, 40.0, 40.0, 0.0));
    assert!(hit_test(pt(500.0, 500.0), &scene, &Camera::default(), &Selection::new()).is_none());
}

#[test]
fn newest_object_wins() {
    let mut scene = Scene::new();
    scene.add(make_object(0.0, 0.0, 40.0, 40.0, 0.0));
    let top = scene.add(make_object(20.0, 20.0, 40.0, 40.0, 0.0));
    let hit = hit_test(pt(30.0, 30.0), &scene, &Camera::default(), &Selection::new()).unwrap();
    assert_eq!(hit.id, top);
    assert_eq!(hit.part, HitPart::Body);
}

#[test]
fn label_above_object() {
    let mut scene = Scene::new();
    scene.add(make_object(0.0, 0.0, 200.0, 200.0, 0.0));
    let label = scene.add(make_label(50.0, 100.0));
    let hit = hit_test(pt(60.0, 95.0), &scene, &Camera::default(), &Selection::new()).unwrap();
    assert_eq!(hit.id, label);
    assert_eq!(hit.kind, ElementKind::Label);
}

#[test]
fn unselected_object_corner_is_body() {
    let mut scene = Scene::new();
    let id = scene.add(make_object(0.0, 0.0, 40.0, 40.0, 0.0));
    let hit = hit_test(pt(39.0, 39.0), &scene, &Camera::default(), &Selection::new()).unwrap();
    assert_eq!(hit, Hit { id, kind: ElementKind::Object, part: HitPart::Body });
}

#[test]
fn selected_object_handles_take_priority() {
    let mut scene = Scene::new();
    let id = scene.add(make_object(0.0, 0.0, 40.0, 40.0, 0.0));
    let sel = selected(&scene, &[&id]);
    let hit = hit_test(pt(39.0, 39.0), &scene, &Camera::default(), &sel).unwrap();
    assert_eq!(hit.part, HitPart::ResizeHandle(Corner::Se));
}

#[test]
fn stale_selection_entry_is_skipped() {
    let mut scene = Scene::new();
    let gone = scene.add(make_object(0.0, 0.0, 40.0, 40.0, 0.0));
    let sel = selected(&scene, &[&gone]);
    scene.remove(&[gone]);
    assert!(hit_test(pt(39.0, 39.0), &scene, &Camera::default(), &sel).is_none());
}
