#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::doc::{Connector, ElementId, Label, LineStyle, PlacedObject, Stroke, StrokeTool};

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn make_object(x: f64, y: f64, w: f64, h: f64) -> Element {
    Element::Object(PlacedObject {
        id: ElementId::new("obj_1"),
        library_id: None,
        name: String::new(),
        image_data: String::new(),
        x,
        y,
        width: w,
        height: h,
        rotation: 0.0,
        label: None,
    })
}

// =============================================================
// Bounds constructors
// =============================================================

#[test]
fn from_edges_normalizes_reversed_edges() {
    let b = Bounds::from_edges(10.0, 20.0, 0.0, 5.0);
    assert_eq!(b.left, 0.0);
    assert_eq!(b.top, 5.0);
    assert_eq!(b.right, 10.0);
    assert_eq!(b.bottom, 20.0);
    assert_eq!(b.width, 10.0);
    assert_eq!(b.height, 15.0);
}

#[test]
fn from_rect_sets_size() {
    let b = Bounds::from_rect(5.0, 6.0, 80.0, 60.0);
    assert_eq!(b.right, 85.0);
    assert_eq!(b.bottom, 66.0);
}

#[test]
fn from_points_empty_is_none() {
    assert!(Bounds::from_points(std::iter::empty()).is_none());
}

#[test]
fn from_points_single_point_is_degenerate() {
    let b = Bounds::from_points([pt(3.0, 4.0)]).unwrap();
    assert_eq!(b.width, 0.0);
    assert_eq!(b.height, 0.0);
    assert_eq!(b.left, 3.0);
}

#[test]
fn from_points_covers_all() {
    let b = Bounds::from_points([pt(3.0, 4.0), pt(-1.0, 10.0), pt(7.0, 0.0)]).unwrap();
    assert_eq!(b, Bounds::from_edges(-1.0, 0.0, 7.0, 10.0));
}

// =============================================================
// Bounds operations
// =============================================================

#[test]
fn union_covers_both() {
    let a = Bounds::from_rect(0.0, 0.0, 10.0, 10.0);
    let b = Bounds::from_rect(50.0, 20.0, 50.0, 30.0);
    assert_eq!(a.union(b), Bounds::from_edges(0.0, 0.0, 100.0, 50.0));
}

#[test]
fn expand_grows_every_edge() {
    let b = Bounds::from_rect(10.0, 10.0, 0.0, 0.0).expand(5.0);
    assert_eq!(b, Bounds::from_edges(5.0, 5.0, 15.0, 15.0));
}

#[test]
fn touching_edges_intersect() {
    let a = Bounds::from_rect(0.0, 0.0, 10.0, 10.0);
    let b = Bounds::from_rect(10.0, 0.0, 10.0, 10.0);
    assert!(a.intersects(&b));
    assert!(b.intersects(&a));
}

#[test]
fn separated_rects_do_not_intersect() {
    let a = Bounds::from_rect(0.0, 0.0, 10.0, 10.0);
    assert!(!a.intersects(&Bounds::from_rect(10.5, 0.0, 5.0, 5.0)));
    assert!(!a.intersects(&Bounds::from_rect(0.0, -20.0, 5.0, 5.0)));
}

#[test]
fn contained_rect_intersects() {
    let outer = Bounds::from_rect(0.0, 0.0, 100.0, 100.0);
    assert!(outer.intersects(&Bounds::from_rect(40.0, 40.0, 2.0, 2.0)));
}

#[test]
fn contains_is_inclusive() {
    let b = Bounds::from_rect(0.0, 0.0, 10.0, 10.0);
    assert!(b.contains(pt(10.0, 10.0)));
    assert!(b.contains(pt(0.0, 5.0)));
    assert!(!b.contains(pt(10.01, 5.0)));
}

#[test]
fn center_and_corners() {
    let b = Bounds::from_edges(0.0, 0.0, 100.0, 50.0);
    assert_eq!(b.center(), pt(50.0, 25.0));
    let [nw, ne, sw, se] = b.corners();
    assert_eq!(nw, pt(0.0, 0.0));
    assert_eq!(ne, pt(100.0, 0.0));
    assert_eq!(sw, pt(0.0, 50.0));
    assert_eq!(se, pt(100.0, 50.0));
}

// =============================================================
// bounds_of
// =============================================================

#[test]
fn bounds_of_empty_set_is_none() {
    let none: Vec<Element> = Vec::new();
    assert!(bounds_of(&none).is_none());
}

#[test]
fn bounds_of_mixed_kinds() {
    let elements = vec![
        make_object(0.0, 0.0, 40.0, 20.0),
        Element::Line(Connector {
            id: ElementId::new("line_1"),
            x1: 100.0,
            y1: 50.0,
            x2: 60.0,
            y2: 10.0,
            color: "#000".into(),
            width: 2.0,
            style: LineStyle::Solid,
        }),
        Element::Drawing(Stroke {
            id: ElementId::new("drawing_1"),
            points: vec![pt(-5.0, 30.0), pt(10.0, 70.0)],
            color: "#000".into(),
            width: 3.0,
            tool: StrokeTool::Pen,
        }),
    ];
    assert_eq!(bounds_of(&elements), Some(Bounds::from_edges(-5.0, 0.0, 100.0, 70.0)));
}

#[test]
fn bounds_of_label_uses_text_width() {
    let label = Element::Label(Label {
        id: ElementId::new("label_1"),
        text: "abcd".into(),
        x: 10.0,
        y: 50.0,
        font_size: 10.0,
        color: "#000".into(),
        bold: false,
    });
    let b = bounds_of([&label]).unwrap();
    assert_eq!(b.top, 40.0);
    assert_eq!(b.bottom, 50.0);
    assert!((b.width - 24.0).abs() < 1e-9);
}
