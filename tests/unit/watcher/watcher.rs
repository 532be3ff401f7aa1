use super::*;
use crate::config::MotionConfig;
use crate::dom::{Document, NodeId};
use crate::engine::HeadlessEngine;
use crate::foundation::core::Rect;
use crate::harness::{Harness, block};
use crate::loader;
use crate::page::MediaPrefs;
use crate::registry::ElementState;
use crate::style::VISIBLE;

fn insert(h: &Harness, effect: &str, y: f64, text: &str) -> NodeId {
    let mut doc = h.page.doc_mut();
    let el = doc.create_element("p");
    doc.set_attr(el, "data-hm-animate", effect);
    doc.set_frame(el, Some(Rect::new(0.0, y, 600.0, y + 60.0)));
    let t = doc.create_text(text);
    doc.append_child(el, t).unwrap();
    let body = doc.body();
    doc.append_child(body, el).unwrap();
    el
}

fn state(h: &Harness, el: NodeId) -> Option<ElementState> {
    h.inner.ctx.borrow().registry.state(el)
}

fn loaded_harness() -> Harness {
    let h = Harness::with(
        Document::new(),
        HeadlessEngine::preloaded(),
        MotionConfig::default(),
        MediaPrefs::default(),
    );
    futures::executor::block_on(loader::ensure_loaded(&h.inner)).unwrap();
    h
}

#[test]
fn insertions_are_classified_after_the_debounce() {
    let mut h = Harness::new(Document::new());
    start(&h.inner);
    let el = insert(&h, "fade-up", 100.0, "late");

    h.advance_ms(150);
    assert_eq!(state(&h, el), None);
    h.advance_ms(60);
    assert_eq!(state(&h, el), Some(ElementState::CssActive));
    assert!(h.page.doc().has_class(el, VISIBLE));
}

#[test]
fn bursts_restart_the_window() {
    let mut h = Harness::new(Document::new());
    start(&h.inner);
    let first = insert(&h, "fade-up", 100.0, "one");
    h.advance_ms(150);
    let second = insert(&h, "fade-up", 200.0, "two");
    h.advance_ms(150);
    assert_eq!(state(&h, first), None);

    h.advance_ms(60);
    assert_eq!(state(&h, first), Some(ElementState::CssActive));
    assert_eq!(state(&h, second), Some(ElementState::CssActive));
    assert!(h.inner.ctx.borrow().debounce_timer.is_none());
}

#[test]
fn engine_work_is_dispatched_and_triggers_refreshed() {
    let mut h = loaded_harness();
    start(&h.inner);
    let el = insert(&h, "split-words", 2000.0, "fresh words here");
    h.advance_ms(250);

    assert_eq!(state(&h, el), Some(ElementState::Done));
    assert_eq!(h.engine.borrow().animations_of(el).len(), 1);
    assert_eq!(h.engine.borrow().refresh_count(), 1);
}

#[test]
fn rescan_ignores_known_and_plain_elements() {
    let mut doc = Document::new();
    let known = block(&mut doc, "div", &[("data-hm-animate", "fade-up")], 0.0, 50.0, None);
    block(&mut doc, "div", &[], 100.0, 50.0, None);
    let h = Harness::new(doc);
    crate::dispatcher::classify(&h.inner, &[known]);

    rescan(&h.inner);
    assert_eq!(h.inner.ctx.borrow().registry.len(), 1);
    assert_eq!(h.inner.ctx.borrow().resource_counts().tasks, 0);
}
