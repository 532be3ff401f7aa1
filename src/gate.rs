//! Viewport gate for CSS-tier elements.
//!
//! Elements on screen at admission are marked visible and never animate. The rest are armed in
//! their start state and watched; they enter once enough of their box intersects the viewport
//! grown by the configured root margin.

use std::rc::Rc;

use futures::StreamExt as _;

use crate::context::{Inner, Watch};
use crate::directive::Directive;
use crate::dom::NodeId;
use crate::foundation::core::{Margin, intersection_ratio};
use crate::style::{self, ARMED, ENTERED, VISIBLE};

/// Admit one CSS-tier element.
pub(crate) fn admit(inner: &Inner, el: NodeId, directive: &Directive) {
    let rect = inner.page.rect(el);
    let viewport = inner.page.viewport();
    {
        let mut doc = inner.page.doc_mut();
        if viewport.shows(rect) {
            doc.add_class(el, VISIBLE);
            tracing::trace!(?el, "above the fold");
            return;
        }
        doc.add_class(el, ARMED);
        style::apply_css_overrides(&mut doc, el, directive);
    }
    inner.ctx.borrow_mut().watched.insert(
        el,
        Watch {
            once: directive.options.once,
            inside: false,
        },
    );
    evaluate(inner);
}

/// Re-test every watched element against the current viewport.
pub(crate) fn evaluate(inner: &Inner) {
    let margin = inner.cfg.margin().unwrap_or(Margin::ZERO);
    let root = margin.expand(inner.page.viewport().page_rect());
    let threshold = inner.cfg.observer_threshold;

    let watched: Vec<(NodeId, Watch)> = inner
        .ctx
        .borrow()
        .watched
        .iter()
        .map(|(n, w)| (*n, *w))
        .collect();
    // NodeId order, not document order. Each element is tested on its own, so the walk
    // order never changes which elements enter or leave.
    for (el, watch) in watched {
        if !inner.page.doc().contains(el) {
            inner.ctx.borrow_mut().watched.remove(&el);
            continue;
        }
        let ratio = intersection_ratio(inner.page.rect(el), root);
        let intersecting = ratio > 0.0 && ratio >= threshold;
        match (watch.inside, intersecting) {
            (false, true) => {
                {
                    let mut doc = inner.page.doc_mut();
                    doc.remove_class(el, ARMED);
                    doc.add_class(el, ENTERED);
                }
                let mut ctx = inner.ctx.borrow_mut();
                if watch.once {
                    ctx.watched.remove(&el);
                } else if let Some(w) = ctx.watched.get_mut(&el) {
                    w.inside = true;
                }
                tracing::trace!(?el, ratio, "entered");
            }
            (true, false) => {
                {
                    let mut doc = inner.page.doc_mut();
                    doc.remove_class(el, ENTERED);
                    doc.add_class(el, ARMED);
                }
                if let Some(w) = inner.ctx.borrow_mut().watched.get_mut(&el) {
                    w.inside = false;
                }
                tracing::trace!(?el, "left, re-armed");
            }
            _ => {}
        }
    }
}

/// Re-evaluate the gate on every scroll and resize.
pub(crate) fn start(inner: &Rc<Inner>) {
    let (sub, mut changes) = inner.page.subscribe_viewport();
    let weak = Rc::downgrade(inner);
    let task = inner.rt.spawn(async move {
        while changes.next().await.is_some() {
            let Some(inner) = weak.upgrade() else {
                break;
            };
            evaluate(&inner);
        }
    });
    let mut ctx = inner.ctx.borrow_mut();
    ctx.resources.subscriptions.push(sub);
    ctx.track_task(task);
}

#[cfg(test)]
#[path = "../tests/unit/gate/gate.rs"]
mod tests;
