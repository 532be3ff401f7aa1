//! Pre-hide and forced-reveal safety net.
//!
//! Annotated content is hidden while the orchestrator starts so it never flashes in unanimated. If
//! ready is not reached within the configured timeout everything is forced visible instead.

use std::rc::Rc;

use crate::context::Inner;
use crate::diagnostics::DiagnosticKind;
use crate::foundation::error::MotionResult;
use crate::style::{self, FALLBACK, LOADING, SAFETY_STYLE_ID};

/// Inject the safety sheet, pre-hide annotated content and start the timeout.
pub(crate) fn arm(inner: &Rc<Inner>) -> MotionResult<()> {
    {
        let mut doc = inner.page.doc_mut();
        style::inject(&mut doc, SAFETY_STYLE_ID, &style::safety_css(&inner.res))?;
        let root = doc.root();
        doc.add_class(root, LOADING);
    }
    let weak = Rc::downgrade(inner);
    let timeout = inner.cfg.fallback_timeout();
    let timer = inner.rt.set_timeout(timeout, move || {
        if let Some(inner) = weak.upgrade() {
            expire(&inner);
        }
    });
    inner.ctx.borrow_mut().safety_timer = Some(timer);
    tracing::debug!(?timeout, "safety net armed");
    Ok(())
}

fn expire(inner: &Inner) {
    let ready = {
        let mut ctx = inner.ctx.borrow_mut();
        ctx.safety_timer = None;
        ctx.ready
    };
    if ready {
        return;
    }
    force_visible(inner);
    inner.ctx.borrow_mut().note(
        DiagnosticKind::InitTimeout,
        format!(
            "not ready after {} ms, forcing content visible",
            inner.cfg.fallback_timeout_ms
        ),
    );
}

/// Reveal every annotated element now and lift the pre-hide so it cannot mask the override.
pub(crate) fn force_visible(inner: &Inner) {
    let mut doc = inner.page.doc_mut();
    let root = doc.root();
    doc.add_class(root, FALLBACK);
    doc.remove_class(root, LOADING);
}

/// Success path: stop the timer and lift the pre-hide.
pub(crate) fn release(inner: &Inner) {
    if let Some(timer) = inner.ctx.borrow_mut().safety_timer.take() {
        inner.rt.clear_timeout(timer);
    }
    let mut doc = inner.page.doc_mut();
    let root = doc.root();
    doc.remove_class(root, LOADING);
}
