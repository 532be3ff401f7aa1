//! Pick up annotated elements inserted after initialization.
//!
//! Mutation records are coalesced by a debounce timer; a rescan then classifies whatever is new
//! and hands engine work to a fresh dispatch task.

use std::rc::{Rc, Weak};

use futures::StreamExt as _;

use crate::context::Inner;
use crate::directive;
use crate::dispatcher;

/// Observe child-list mutations for the rest of the orchestrator's life.
pub(crate) fn start(inner: &Rc<Inner>) {
    let (observer, mut records) = inner.page.doc_mut().subscribe_mutations();
    let weak = Rc::downgrade(inner);
    let task = inner.rt.spawn(async move {
        while let Some(record) = records.next().await {
            if record.added.is_empty() {
                continue;
            }
            let Some(inner) = weak.upgrade() else {
                break;
            };
            schedule(&inner);
        }
    });
    let mut ctx = inner.ctx.borrow_mut();
    ctx.resources.observers.push(observer);
    ctx.track_task(task);
    tracing::debug!("mutation watcher started");
}

/// Restart the debounce window.
fn schedule(inner: &Rc<Inner>) {
    if let Some(timer) = inner.ctx.borrow_mut().debounce_timer.take() {
        inner.rt.clear_timeout(timer);
    }
    let weak: Weak<Inner> = Rc::downgrade(inner);
    let timer = inner.rt.set_timeout(inner.cfg.mutation_debounce(), move || {
        if let Some(inner) = weak.upgrade() {
            rescan(&inner);
        }
    });
    inner.ctx.borrow_mut().debounce_timer = Some(timer);
}

/// Classify every annotated element not yet registered.
pub(crate) fn rescan(inner: &Rc<Inner>) {
    let fresh: Vec<_> = {
        let mut ctx = inner.ctx.borrow_mut();
        ctx.debounce_timer = None;
        let doc = inner.page.doc();
        ctx.registry.prune(&doc);
        directive::annotated(&doc, &inner.res)
            .into_iter()
            .filter(|el| !ctx.registry.has_processed(*el))
            .collect()
    };
    if fresh.is_empty() {
        return;
    }
    tracing::debug!(count = fresh.len(), "new annotated elements");

    let pending = dispatcher::classify(inner, &fresh);
    if pending.is_empty() {
        return;
    }
    let task_inner = inner.clone();
    let task = inner.rt.spawn(async move {
        dispatcher::engine_pass(task_inner.clone(), pending).await;
        if task_inner.is_loaded() {
            let doc = task_inner.page.doc();
            task_inner.engine.borrow_mut().refresh(&doc);
        }
    });
    inner.ctx.borrow_mut().track_task(task);
}

#[cfg(test)]
#[path = "../tests/unit/watcher/watcher.rs"]
mod tests;
