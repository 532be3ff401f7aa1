use super::*;

fn para(doc: &mut Document, width: f64, text: &str) -> NodeId {
    let p = doc.create_element("p");
    doc.set_frame(p, Some(Rect::new(10.0, 100.0, 10.0 + width, 200.0)));
    let t = doc.create_text(text);
    doc.append_child(p, t).unwrap();
    doc.append_child(doc.body(), p).unwrap();
    p
}

fn wrap_words(doc: &mut Document, p: NodeId) -> Vec<NodeId> {
    let t = doc.children(p)[0];
    let text = doc.text(t).unwrap().to_owned();
    let mut nodes = Vec::new();
    let mut words = Vec::new();
    for (i, w) in text.split(' ').enumerate() {
        if i > 0 {
            nodes.push(doc.create_text(" "));
        }
        let s = doc.create_element("span");
        let wt = doc.create_text(w);
        doc.append_child(s, wt).unwrap();
        nodes.push(s);
        words.push(s);
    }
    doc.replace_with(t, &nodes).unwrap();
    words
}

#[test]
fn framed_elements_report_their_frame() {
    let mut doc = Document::new();
    let p = para(&mut doc, 80.0, "hi");
    let layout = FlowLayout::default();
    assert_eq!(layout.rect(&doc, p), Rect::new(10.0, 100.0, 90.0, 200.0));
}

#[test]
fn words_wrap_greedily_inside_the_frame() {
    let mut doc = Document::new();
    let p = para(&mut doc, 80.0, "hello world again");
    let words = wrap_words(&mut doc, p);
    let layout = FlowLayout::default();
    let tops: Vec<f64> = layout
        .rects(&doc, &words)
        .iter()
        .map(|r| r.y0)
        .collect();
    assert_eq!(tops, vec![100.0, 120.0, 140.0]);
    assert_eq!(layout.rect(&doc, words[0]).x0, 10.0);
    assert_eq!(layout.rect(&doc, words[0]).width(), 40.0);
}

#[test]
fn wide_frames_keep_words_on_one_line() {
    let mut doc = Document::new();
    let p = para(&mut doc, 1000.0, "hello world again");
    let words = wrap_words(&mut doc, p);
    let layout = FlowLayout::default();
    let rects = layout.rects(&doc, &words);
    assert!(rects.iter().all(|r| r.y0 == 100.0));
    assert_eq!(rects[1].x0, 10.0 + 48.0);
}

#[test]
fn br_forces_a_new_line() {
    let mut doc = Document::new();
    let p = para(&mut doc, 1000.0, "one");
    let br = doc.create_element("br");
    let two = doc.create_element("span");
    let t = doc.create_text("two");
    doc.append_child(two, t).unwrap();
    doc.append_child(p, br).unwrap();
    doc.append_child(p, two).unwrap();
    let layout = FlowLayout::default();
    assert_eq!(layout.rect(&doc, two).y0, 120.0);
}

#[test]
fn unframed_orphans_are_unrendered() {
    let mut doc = Document::new();
    let s = doc.create_element("span");
    assert_eq!(FlowLayout::default().rect(&doc, s), Rect::ZERO);
}
