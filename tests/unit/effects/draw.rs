use super::*;

fn shape(doc: &mut Document, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let el = doc.create_element(tag);
    for (k, v) in attrs {
        doc.set_attr(el, k, *v);
    }
    doc.append_child(doc.body(), el).unwrap();
    el
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 0.01
}

#[test]
fn straight_shapes_measure_exactly() {
    let mut doc = Document::new();
    let line = shape(&mut doc, "line", &[("x1", "0"), ("y1", "0"), ("x2", "30"), ("y2", "40")]);
    assert!(close(stroke_length(&doc, line), 50.0));

    let rect = shape(&mut doc, "rect", &[("width", "10"), ("height", "20")]);
    assert!(close(stroke_length(&doc, rect), 60.0));

    let open = shape(&mut doc, "polyline", &[("points", "0,0 10,0 10,10")]);
    assert!(close(stroke_length(&doc, open), 20.0));

    let closed = shape(&mut doc, "polygon", &[("points", "0 0, 10 0, 10 10")]);
    let expected = 20.0 + 200.0_f64.sqrt();
    assert!(close(stroke_length(&doc, closed), expected));
}

#[test]
fn curves_use_arc_length() {
    let mut doc = Document::new();
    let circle = shape(&mut doc, "circle", &[("cx", "5"), ("cy", "5"), ("r", "10")]);
    assert!(close(stroke_length(&doc, circle), 2.0 * std::f64::consts::PI * 10.0));

    let path = shape(&mut doc, "path", &[("d", "M0,0 L100,0 L100,50")]);
    assert!(close(stroke_length(&doc, path), 150.0));
}

#[test]
fn degenerate_or_unknown_shapes_have_no_length() {
    let mut doc = Document::new();
    let bad_path = shape(&mut doc, "path", &[("d", "not a path")]);
    let no_radius = shape(&mut doc, "circle", &[("cx", "5")]);
    let div = shape(&mut doc, "div", &[]);
    assert_eq!(stroke_length(&doc, bad_path), 0.0);
    assert_eq!(stroke_length(&doc, no_radius), 0.0);
    assert_eq!(stroke_length(&doc, div), 0.0);
}
