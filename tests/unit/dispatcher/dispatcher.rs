use super::*;
use crate::config::MotionConfig;
use crate::dom::Document;
use crate::engine::{FetchBehaviour, HeadlessEngine};
use crate::harness::{Harness, block};
use crate::page::MediaPrefs;
use crate::style::{ARMED, VISIBLE};

fn state(h: &Harness, el: NodeId) -> Option<ElementState> {
    h.inner.ctx.borrow().registry.state(el)
}

fn warned(h: &Harness, kind: DiagnosticKind) -> usize {
    h.inner.ctx.borrow().diagnostics.count(kind)
}

#[test]
fn elements_are_routed_by_tier() {
    let mut doc = Document::new();
    let on_screen = block(&mut doc, "div", &[("data-hm-animate", "fade-up")], 100.0, 100.0, None);
    let below = block(&mut doc, "div", &[("data-hm-animate", "scale-in")], 2000.0, 100.0, None);
    let words = block(
        &mut doc,
        "p",
        &[("data-hm-animate", "split-words")],
        300.0,
        100.0,
        Some("a few words"),
    );
    let both = block(
        &mut doc,
        "a",
        &[("data-hm-animate", "fade-in"), ("data-hm-btn", "magnetic")],
        400.0,
        40.0,
        None,
    );
    let h = Harness::new(doc);
    let pending = classify(&h.inner, &[on_screen, below, words, both]);

    assert_eq!(pending, vec![words, both]);
    assert_eq!(state(&h, on_screen), Some(ElementState::CssActive));
    assert_eq!(state(&h, below), Some(ElementState::CssActive));
    assert_eq!(state(&h, words), Some(ElementState::AwaitingEngine));
    let doc = h.page.doc();
    assert!(doc.has_class(on_screen, VISIBLE));
    assert!(doc.has_class(below, ARMED));
    assert_eq!(h.inner.ctx.borrow().snapshots.len(), 4);
}

#[test]
fn classification_happens_once_per_element() {
    let mut doc = Document::new();
    let el = block(
        &mut doc,
        "p",
        &[("data-hm-animate", "split-chars")],
        300.0,
        100.0,
        Some("hi"),
    );
    let h = Harness::new(doc);
    assert_eq!(classify(&h.inner, &[el, el]), vec![el]);
    assert!(classify(&h.inner, &[el]).is_empty());
    assert_eq!(h.inner.ctx.borrow().registry.len(), 1);
    assert_eq!(h.inner.ctx.borrow().snapshots.len(), 1);
}

#[test]
fn malformed_directives_are_reported_and_finished() {
    let mut doc = Document::new();
    let unknown = block(&mut doc, "div", &[("data-hm-animate", "wobble")], 0.0, 50.0, None);
    let conflicted = block(
        &mut doc,
        "div",
        &[("data-hm-animate", "fade-up"), ("data-w-id", "abc-123")],
        100.0,
        50.0,
        None,
    );
    let h = Harness::new(doc);
    assert!(classify(&h.inner, &[unknown, conflicted]).is_empty());
    assert_eq!(state(&h, unknown), Some(ElementState::Done));
    assert_eq!(state(&h, conflicted), Some(ElementState::CssActive));
    assert_eq!(warned(&h, DiagnosticKind::UnknownDirective), 1);
    assert_eq!(warned(&h, DiagnosticKind::AttributeConflict), 1);
}

#[test]
fn reduced_motion_shows_content_statically_unless_essential() {
    let mut doc = Document::new();
    let plain = block(&mut doc, "div", &[("data-hm-animate", "counter")], 0.0, 50.0, Some("42"));
    let essential = block(
        &mut doc,
        "div",
        &[("data-hm-animate", "counter"), ("data-hm-motion", "essential")],
        100.0,
        50.0,
        Some("42"),
    );
    let h = Harness::with(
        doc,
        HeadlessEngine::new(),
        MotionConfig::default(),
        MediaPrefs {
            reduced_motion: true,
            ..MediaPrefs::default()
        },
    );
    assert_eq!(classify(&h.inner, &[plain, essential]), vec![essential]);
    assert_eq!(state(&h, plain), Some(ElementState::Done));
    let doc = h.page.doc();
    assert_eq!(doc.style(plain, "opacity"), Some("1"));
    assert_eq!(doc.style(plain, "transform"), Some("none"));
    assert_eq!(doc.style(essential, "opacity"), None);
}

#[test]
fn css_tier_goes_through_the_engine_once_loaded() {
    let mut doc = Document::new();
    let el = block(&mut doc, "div", &[("data-hm-animate", "fade-up")], 2000.0, 50.0, None);
    let h = Harness::with(
        doc,
        HeadlessEngine::preloaded(),
        MotionConfig::default(),
        MediaPrefs::default(),
    );
    futures::executor::block_on(loader::ensure_loaded(&h.inner)).unwrap();
    assert_eq!(classify(&h.inner, &[el]), vec![el]);
}

#[test]
fn engine_pass_dispatches_one_batch_per_frame() {
    let mut doc = Document::new();
    let els: Vec<NodeId> = (0..10)
        .map(|i| {
            block(
                &mut doc,
                "p",
                &[("data-hm-animate", "split-words")],
                1000.0 + 100.0 * f64::from(i),
                80.0,
                Some("two words"),
            )
        })
        .collect();
    let mut h = Harness::with(
        doc,
        HeadlessEngine::preloaded(),
        MotionConfig::default(),
        MediaPrefs::default(),
    );
    let pending = classify(&h.inner, &els);
    assert_eq!(pending.len(), 10);

    h.rt.handle().spawn(engine_pass(h.inner.clone(), pending));
    h.rt.run_until_stalled();
    let done = |h: &Harness| {
        h.inner
            .ctx
            .borrow()
            .registry
            .in_state(ElementState::Done)
            .len()
    };
    assert_eq!(done(&h), 8);
    assert_eq!(state(&h, els[9]), Some(ElementState::AwaitingEngine));

    h.rt.frame();
    assert_eq!(done(&h), 10);
    assert_eq!(h.engine.borrow().live_count(), 10);
}

#[test]
fn failed_load_finishes_pending_elements_without_animating() {
    let mut doc = Document::new();
    let el = block(
        &mut doc,
        "p",
        &[("data-hm-animate", "split-lines")],
        1000.0,
        80.0,
        Some("text"),
    );
    let mut h = Harness::new(doc);
    h.net.set_behaviour(
        &h.inner.cfg.engine_core_url(),
        FetchBehaviour::Fail("offline".to_owned()),
    );
    let pending = classify(&h.inner, &[el]);
    h.rt.handle().spawn(engine_pass(h.inner.clone(), pending));
    h.advance_ms(200);

    assert_eq!(state(&h, el), Some(ElementState::Done));
    assert_eq!(h.engine.borrow().live_count(), 0);
    assert_eq!(warned(&h, DiagnosticKind::EngineLoadFailed), 1);
}

#[test]
fn elements_removed_before_dispatch_are_skipped() {
    let mut doc = Document::new();
    let el = block(
        &mut doc,
        "span",
        &[("data-hm-animate", "counter")],
        1000.0,
        40.0,
        Some("99%"),
    );
    let mut h = Harness::new(doc);
    let pending = classify(&h.inner, &[el]);
    h.rt.handle().spawn(engine_pass(h.inner.clone(), pending));
    h.page.doc_mut().remove(el);
    h.advance_ms(200);

    assert_eq!(state(&h, el), Some(ElementState::Done));
    assert_eq!(h.engine.borrow().live_count(), 0);
}

#[test]
fn buttons_install_next_to_effects() {
    let mut doc = Document::new();
    let el = block(
        &mut doc,
        "a",
        &[("data-hm-animate", "fade-up"), ("data-hm-btn", "fill")],
        1000.0,
        40.0,
        Some("Go"),
    );
    let mut h = Harness::new(doc);
    let pending = classify(&h.inner, &[el]);
    h.rt.handle().spawn(engine_pass(h.inner.clone(), pending));
    h.advance_ms(200);

    assert_eq!(h.engine.borrow().animations_of(el).len(), 1);
    let ctx = h.inner.ctx.borrow();
    assert_eq!(ctx.resources.listeners.len(), 2);
    let doc = h.page.doc();
    assert!(doc.has_class(doc.children(el)[0], crate::effects::button::FILL_CLASS));
}
