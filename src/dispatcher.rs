//! Element classification and engine dispatch.
//!
//! Classification is synchronous: every annotated element is marked, snapshotted and routed to
//! one of three outcomes (short-circuited, CSS tier, or waiting for the engine). The engine pass
//! then runs handlers in frame-sized batches once the loader resolves.

use std::rc::Rc;

use crate::context::{EffectCx, Inner, Snapshot};
use crate::diagnostics::DiagnosticKind;
use crate::directive::{
    self, ButtonDirective, ButtonKind, Directive, EffectKind, Tier, has_foreign_binding,
};
use crate::dom::NodeId;
use crate::effects::{self, button};
use crate::loader;
use crate::registry::ElementState;

/// Effects that rewrite or restyle descendants need the children in their snapshot.
fn touches_descendants(directive: Option<&Directive>, button: Option<&ButtonDirective>) -> bool {
    let effect = directive.is_some_and(|d| {
        matches!(
            d.kind,
            EffectKind::SplitLines
                | EffectKind::SplitWords
                | EffectKind::SplitChars
                | EffectKind::HeroText
                | EffectKind::Counter
                | EffectKind::StaggerChildren
                | EffectKind::DrawLine
        )
    });
    let button = button.is_some_and(|b| matches!(b.kind, ButtonKind::Fill | ButtonKind::TextSlide));
    effect || button
}

/// Register and route `elements`. Returns the ones that wait for the engine, in input order.
pub(crate) fn classify(inner: &Rc<Inner>, elements: &[NodeId]) -> Vec<NodeId> {
    let mut pending = Vec::new();
    for &el in elements {
        if !inner.ctx.borrow_mut().registry.mark_processed(el) {
            continue;
        }
        let (directive, button) = read(inner, el);
        let outcome = route(inner, el, directive.as_ref(), button.as_ref());
        inner.ctx.borrow_mut().registry.set_state(el, outcome);
        match outcome {
            ElementState::AwaitingEngine => pending.push(el),
            ElementState::CssActive => {
                if let Some(d) = &directive {
                    crate::gate::admit(inner, el, d);
                }
            }
            _ => {}
        }
    }
    tracing::debug!(
        classified = elements.len(),
        pending = pending.len(),
        "classification pass"
    );
    pending
}

/// Snapshot `el` and read both directives, reporting anything malformed.
fn read(inner: &Inner, el: NodeId) -> (Option<Directive>, Option<ButtonDirective>) {
    let mut doc = inner.page.doc_mut();
    let mut ctx = inner.ctx.borrow_mut();

    let directive = match Directive::read(&doc, el, &inner.res, &inner.cfg) {
        Ok(d) => d,
        Err(err) => {
            ctx.warn(DiagnosticKind::UnknownDirective, el, err.to_string());
            None
        }
    };
    let button = match ButtonDirective::read(&doc, el, &inner.res) {
        Ok(b) => b,
        Err(err) => {
            ctx.warn(DiagnosticKind::UnknownDirective, el, err.to_string());
            None
        }
    };
    if has_foreign_binding(&doc, el) {
        ctx.warn(
            DiagnosticKind::AttributeConflict,
            el,
            "element also carries a foreign interaction binding; transforms may conflict",
        );
    }

    let with_children = touches_descendants(directive.as_ref(), button.as_ref());
    match Snapshot::take(&mut doc, el, with_children) {
        Ok(snapshot) => ctx.snapshots.push(snapshot),
        Err(err) => tracing::warn!(?el, %err, "snapshot failed"),
    }
    (directive, button)
}

fn route(
    inner: &Inner,
    el: NodeId,
    directive: Option<&Directive>,
    button: Option<&ButtonDirective>,
) -> ElementState {
    if directive.is_none() && button.is_none() {
        return ElementState::Done;
    }
    let reduced = inner.ctx.borrow().reduced_motion;
    if reduced && !directive::is_essential(&inner.page.doc(), el, &inner.res) {
        let mut doc = inner.page.doc_mut();
        doc.set_style(el, "opacity", "1");
        doc.set_style(el, "transform", "none");
        doc.set_style(el, "clip-path", "none");
        tracing::trace!(?el, "reduced motion, shown statically");
        return ElementState::Done;
    }
    let css_only = directive.is_some_and(|d| d.tier() == Tier::Css) && button.is_none();
    if css_only && !inner.is_loaded() {
        return ElementState::CssActive;
    }
    ElementState::AwaitingEngine
}

/// Wait for the engine, then run handlers for `pending` in batches, one batch per frame.
pub(crate) async fn engine_pass(inner: Rc<Inner>, pending: Vec<NodeId>) {
    if pending.is_empty() {
        return;
    }
    if let Err(err) = loader::ensure_loaded(&inner).await {
        tracing::warn!(%err, "engine unavailable, content left visible");
        let mut ctx = inner.ctx.borrow_mut();
        for el in &pending {
            ctx.registry.set_state(*el, ElementState::Done);
        }
        return;
    }

    let batch = inner.cfg.dispatch_batch_size.max(1);
    for (i, chunk) in pending.chunks(batch).enumerate() {
        if i > 0 {
            inner.rt.next_frame().await;
        }
        for &el in chunk {
            dispatch_one(&inner, el);
        }
    }
}

fn dispatch_one(inner: &Inner, el: NodeId) {
    let viewport = inner.page.viewport();
    let layout = inner.page.layout();
    let mut doc = inner.page.doc_mut();
    let mut engine = inner.engine.borrow_mut();
    let mut ctx = inner.ctx.borrow_mut();

    if !doc.is_connected(el) {
        ctx.registry.set_state(el, ElementState::Done);
        return;
    }
    ctx.registry.set_state(el, ElementState::EngineActive);

    let directive = Directive::read(&doc, el, &inner.res, &inner.cfg)
        .ok()
        .flatten();
    let button = ButtonDirective::read(&doc, el, &inner.res).ok().flatten();

    let mut cx = EffectCx {
        doc: &mut *doc,
        layout,
        engine: &mut *engine,
        cfg: &inner.cfg,
        res: &inner.res,
        viewport,
        ctx: &mut *ctx,
    };
    if let Some(d) = &directive {
        match effects::run(&mut cx, el, d) {
            Ok(ran) => tracing::trace!(?el, kind = d.kind.name(), ran, "effect dispatched"),
            Err(err) => tracing::warn!(?el, kind = d.kind.name(), %err, "effect failed"),
        }
    }
    if let Some(b) = &button {
        match button::install(&mut cx, el, b) {
            Ok(ran) => tracing::trace!(?el, kind = b.kind.name(), ran, "button installed"),
            Err(err) => tracing::warn!(?el, kind = b.kind.name(), %err, "button failed"),
        }
    }
    ctx.registry.set_state(el, ElementState::Done);
}

#[cfg(test)]
#[path = "../tests/unit/dispatcher/dispatcher.rs"]
mod tests;
