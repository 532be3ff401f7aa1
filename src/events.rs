//! Routing of page events to registered listeners.

use std::rc::Rc;

use futures::StreamExt as _;

use crate::context::{EffectCx, Inner, ListenerAction};
use crate::dom::NodeId;
use crate::effects::button;
use crate::page::Event;

/// Deliver page events to the orchestrator's listeners until teardown.
pub(crate) fn start(inner: &Rc<Inner>) {
    let (sub, mut events) = inner.page.subscribe_events();
    let weak = Rc::downgrade(inner);
    let task = inner.rt.spawn(async move {
        while let Some((target, event)) = events.next().await {
            let Some(inner) = weak.upgrade() else {
                break;
            };
            deliver(&inner, target, event);
        }
    });
    let mut ctx = inner.ctx.borrow_mut();
    ctx.resources.subscriptions.push(sub);
    ctx.track_task(task);
}

fn deliver(inner: &Inner, target: NodeId, event: Event) {
    let actions: Vec<ListenerAction> = {
        let doc = inner.page.doc();
        let ctx = inner.ctx.borrow();
        doc.listeners_for(target, event.kind())
            .iter()
            .filter_map(|id| ctx.resources.listeners.get(id).cloned())
            .collect()
    };
    for action in actions {
        match action {
            ListenerAction::Refresh => {
                if inner.is_loaded() {
                    let doc = inner.page.doc();
                    inner.engine.borrow_mut().refresh(&doc);
                    tracing::debug!("trigger positions refreshed after load");
                }
            }
            ListenerAction::ReducedMotion => {
                if let Event::ReducedMotionChange(on) = event {
                    inner.ctx.borrow_mut().reduced_motion = on;
                    tracing::debug!(on, "reduced-motion preference changed");
                }
            }
            ListenerAction::Button(binding) => {
                let viewport = inner.page.viewport();
                let mut doc = inner.page.doc_mut();
                let mut engine = inner.engine.borrow_mut();
                let mut ctx = inner.ctx.borrow_mut();
                let mut cx = EffectCx {
                    doc: &mut *doc,
                    layout: inner.page.layout(),
                    engine: &mut *engine,
                    cfg: &inner.cfg,
                    res: &inner.res,
                    viewport,
                    ctx: &mut *ctx,
                };
                button::handle(&mut cx, &binding, event);
            }
        }
    }
}
