use super::*;
use crate::dom::FlowLayout;
use crate::foundation::core::Rect;

fn para(doc: &mut Document, width: f64) -> NodeId {
    let p = doc.create_element("p");
    doc.set_frame(p, Some(Rect::new(0.0, 0.0, width, 400.0)));
    doc.append_child(doc.body(), p).unwrap();
    p
}

fn text(doc: &mut Document, parent: NodeId, s: &str) {
    let t = doc.create_text(s);
    doc.append_child(parent, t).unwrap();
}

fn inline(doc: &mut Document, parent: NodeId, tag: &str, s: &str) -> NodeId {
    let e = doc.create_element(tag);
    text(doc, e, s);
    doc.append_child(parent, e).unwrap();
    e
}

fn split(doc: &mut Document, el: NodeId, kind: SegmentKind) -> Split {
    segment(doc, &FlowLayout::default(), el, kind, 4.0).unwrap()
}

fn texts(s: &Split) -> Vec<&str> {
    s.segments.iter().map(|s| s.text.as_str()).collect()
}

#[test]
fn words_keep_whitespace_verbatim() {
    let mut doc = Document::new();
    let p = para(&mut doc, 400.0);
    text(&mut doc, p, " Hello  brave\nnew world ");
    let original = doc.text_content(p);
    let out = split(&mut doc, p, SegmentKind::Words);
    assert_eq!(texts(&out), vec!["Hello", "brave", "new", "world"]);
    assert_eq!(doc.text_content(p), original);
    assert_eq!(doc.attr(p, "aria-label"), Some(original.as_str()));
    assert!(!out.inline_markup);
    for s in &out.segments {
        assert!(doc.has_class(s.node, WORD_CLASS));
        assert_eq!(doc.style(s.node, "display"), Some("inline-block"));
    }
    assert_eq!(out.segments[2].index, 2);
}

#[test]
fn chars_split_graphemes_inside_nowrap_words() {
    let mut doc = Document::new();
    let p = para(&mut doc, 400.0);
    text(&mut doc, p, "Cafe\u{301} ok");
    let original = doc.text_content(p);
    let out = split(&mut doc, p, SegmentKind::Chars);
    assert_eq!(texts(&out), vec!["C", "a", "f", "e\u{301}", "o", "k"]);
    assert_eq!(doc.text_content(p), original);
    let word = doc.parent(out.segments[0].node).unwrap();
    assert_eq!(doc.style(word, "white-space"), Some("nowrap"));
    assert_eq!(doc.parent(out.segments[3].node), Some(word));
    assert_ne!(doc.parent(out.segments[4].node), Some(word));
}

#[test]
fn explicit_breaks_define_lines() {
    let mut doc = Document::new();
    let p = para(&mut doc, 400.0);
    text(&mut doc, p, "One");
    let br = doc.create_element("br");
    doc.append_child(p, br).unwrap();
    text(&mut doc, p, "Two");
    for _ in 0..2 {
        let br = doc.create_element("br");
        doc.append_child(p, br).unwrap();
    }
    text(&mut doc, p, "  Three");
    let original = doc.text_content(p);
    let out = split(&mut doc, p, SegmentKind::Lines);
    assert_eq!(texts(&out), vec!["One", "Two", "  Three"]);
    assert_eq!(doc.text_content(p), original);
    assert!(!doc.contains(br));
    for s in &out.segments {
        let outer = doc.parent(s.node).unwrap();
        assert_eq!(doc.style(outer, "overflow"), Some("hidden"));
        assert_eq!(doc.parent(outer), Some(p));
    }
}

#[test]
fn whitespace_only_break_groups_stay_plain_text() {
    let mut doc = Document::new();
    let p = para(&mut doc, 400.0);
    text(&mut doc, p, "A");
    let br = doc.create_element("br");
    doc.append_child(p, br).unwrap();
    text(&mut doc, p, "\n  ");
    let br = doc.create_element("br");
    doc.append_child(p, br).unwrap();
    text(&mut doc, p, "B");
    let out = split(&mut doc, p, SegmentKind::Lines);
    assert_eq!(texts(&out), vec!["A", "B"]);
    assert_eq!(doc.text_content(p), "A\n  B");
    let middle = doc.children(p)[1];
    assert_eq!(doc.text(middle), Some("\n  "));
}

#[test]
fn lines_are_discovered_from_geometry() {
    let mut doc = Document::new();
    // Ten glyphs per line.
    let p = para(&mut doc, 80.0);
    text(&mut doc, p, "aaaa bbbb cccc dddd");
    let out = split(&mut doc, p, SegmentKind::Lines);
    assert_eq!(texts(&out), vec!["aaaa bbbb ", "cccc dddd"]);
    assert_eq!(doc.text_content(p), "aaaa bbbb cccc dddd");
    assert!(
        doc.descendants(p)
            .iter()
            .all(|n| !doc.has_class(*n, MEASURE_CLASS))
    );
}

#[test]
fn formatting_is_cloned_onto_every_line_it_spans() {
    let mut doc = Document::new();
    let p = para(&mut doc, 80.0);
    text(&mut doc, p, "aaaa ");
    inline(&mut doc, p, "em", "bbbb cccc");
    text(&mut doc, p, " dddd");
    let out = split(&mut doc, p, SegmentKind::Lines);
    assert!(out.inline_markup);
    assert_eq!(texts(&out), vec!["aaaa bbbb ", "cccc dddd"]);
    for s in &out.segments {
        let ems: Vec<NodeId> = doc
            .descendants(s.node)
            .into_iter()
            .filter(|n| doc.tag(*n) == Some("em"))
            .collect();
        assert_eq!(ems.len(), 1);
    }
    let first_em = doc
        .descendants(out.segments[0].node)
        .into_iter()
        .find(|n| doc.tag(*n) == Some("em"))
        .unwrap();
    assert_eq!(doc.text_content(first_em), "bbbb ");
}

struct Tops;

impl Layout for Tops {
    fn rect(&self, doc: &Document, node: NodeId) -> Rect {
        let top = match doc.text_content(node).as_str() {
            "foo" => 0.0,
            "bar" => 50.0,
            "baz" => 52.0,
            _ => 0.0,
        };
        Rect::new(0.0, top, 10.0, top + 20.0)
    }
}

#[test]
fn glued_tokens_never_split_across_lines() {
    let mut doc = Document::new();
    let p = para(&mut doc, 400.0);
    text(&mut doc, p, "foo");
    inline(&mut doc, p, "b", "bar");
    text(&mut doc, p, " baz");
    let out = segment(&mut doc, &Tops, p, SegmentKind::Lines, 4.0).unwrap();
    assert_eq!(texts(&out), vec!["foobar ", "baz"]);
    assert_eq!(doc.text_content(p), "foobar baz");
}

#[test]
fn empty_targets_produce_no_segments() {
    let mut doc = Document::new();
    let p = para(&mut doc, 80.0);
    text(&mut doc, p, "   ");
    let out = split(&mut doc, p, SegmentKind::Lines);
    assert!(out.segments.is_empty());
    assert_eq!(doc.text_content(p), "   ");
}
