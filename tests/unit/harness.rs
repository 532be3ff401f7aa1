//! Shared fixtures for the unit tests.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::config::MotionConfig;
use crate::context::Inner;
use crate::dom::{Document, NodeId};
use crate::engine::{HeadlessEngine, SimulatedNetwork};
use crate::foundation::core::{Rect, Viewport};
use crate::page::{MediaPrefs, Page};
use crate::runtime::Runtime;

pub(crate) const LATENCY: Duration = Duration::from_millis(50);

pub(crate) struct Harness {
    pub rt: Runtime,
    pub page: Rc<Page>,
    pub engine: Rc<RefCell<HeadlessEngine>>,
    pub net: Rc<SimulatedNetwork>,
    pub inner: Rc<Inner>,
}

impl Harness {
    /// 1280x800 viewport, default config, engine fetched over a 50 ms network.
    pub fn new(doc: Document) -> Self {
        Self::with(
            doc,
            HeadlessEngine::new(),
            MotionConfig::default(),
            MediaPrefs::default(),
        )
    }

    pub fn with(
        doc: Document,
        engine: HeadlessEngine,
        cfg: MotionConfig,
        prefs: MediaPrefs,
    ) -> Self {
        let rt = Runtime::new();
        let page = Rc::new(Page::new(doc, Viewport::new(1280.0, 800.0)).with_prefs(prefs));
        let engine = Rc::new(RefCell::new(engine));
        let net = Rc::new(SimulatedNetwork::for_config(
            rt.handle(),
            engine.clone(),
            LATENCY,
            &cfg,
        ));
        let inner = Inner::new(
            page.clone(),
            engine.clone(),
            net.clone(),
            rt.handle(),
            cfg,
        );
        {
            let mut ctx = inner.ctx.borrow_mut();
            ctx.reduced_motion = prefs.reduced_motion;
            ctx.touch = prefs.touch;
        }
        Self {
            rt,
            page,
            engine,
            net,
            inner,
        }
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.rt.advance(Duration::from_millis(ms));
    }
}

/// Framed block under `body` at `(0, y)`, 600 wide and `h` tall, with `attrs` and an optional
/// text child.
pub(crate) fn block(
    doc: &mut Document,
    tag: &str,
    attrs: &[(&str, &str)],
    y: f64,
    h: f64,
    text: Option<&str>,
) -> NodeId {
    let el = doc.create_element(tag);
    for (k, v) in attrs {
        doc.set_attr(el, k, *v);
    }
    doc.set_frame(el, Some(Rect::new(0.0, y, 600.0, y + h)));
    if let Some(t) = text {
        let node = doc.create_text(t);
        doc.append_child(el, node).unwrap();
    }
    doc.append_child(doc.body(), el).unwrap();
    el
}
