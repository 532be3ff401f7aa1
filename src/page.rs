//! The host page: document, viewport, layout and media preferences.

use std::cell::{Cell, Ref, RefCell, RefMut};

use futures::channel::mpsc;

use crate::dom::{Document, EventKind, FlowLayout, Layout, NodeId};
use crate::foundation::core::{Point, Rect, Viewport};

/// Client media preferences.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaPrefs {
    /// `prefers-reduced-motion: reduce`.
    pub reduced_motion: bool,
    /// Touch-capable device.
    pub touch: bool,
}

/// Input delivered by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// Pointer entered the target.
    PointerEnter,
    /// Pointer left the target.
    PointerLeave,
    /// Pointer moved over the target, in client coordinates.
    PointerMove(Point),
    /// Every subresource finished loading.
    Load,
    /// Reduced-motion preference changed to the carried value.
    ReducedMotionChange(bool),
}

impl Event {
    /// Listener kind this event is delivered to.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PointerEnter => EventKind::PointerEnter,
            Self::PointerLeave => EventKind::PointerLeave,
            Self::PointerMove(_) => EventKind::PointerMove,
            Self::Load => EventKind::Load,
            Self::ReducedMotionChange(_) => EventKind::ReducedMotionChange,
        }
    }
}

/// Handle for a page-level subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscribers<T> {
    senders: Vec<(SubscriptionId, mpsc::UnboundedSender<T>)>,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            senders: Vec::new(),
        }
    }
}

impl<T: Clone> Subscribers<T> {
    fn subscribe(&mut self, id: SubscriptionId) -> mpsc::UnboundedReceiver<T> {
        let (tx, rx) = mpsc::unbounded();
        self.senders.push((id, tx));
        rx
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.senders.len();
        self.senders.retain(|(sid, _)| *sid != id);
        self.senders.len() != before
    }

    fn publish(&mut self, value: T) {
        self.senders
            .retain(|(_, tx)| tx.unbounded_send(value.clone()).is_ok());
    }
}

/// A loaded page as the orchestrator sees it.
///
/// All state sits behind cells so a shared `Rc<Page>` can be read and mutated from tasks on the
/// single-threaded runtime. Borrows must never be held across an `.await`.
pub struct Page {
    doc: RefCell<Document>,
    viewport: Cell<Viewport>,
    prefs: Cell<MediaPrefs>,
    layout: Box<dyn Layout>,
    next_sub: Cell<u64>,
    viewport_subs: RefCell<Subscribers<Viewport>>,
    event_subs: RefCell<Subscribers<(NodeId, Event)>>,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("viewport", &self.viewport.get())
            .field("prefs", &self.prefs.get())
            .finish_non_exhaustive()
    }
}

impl Page {
    /// Page over `doc` laid out with the default [`FlowLayout`].
    pub fn new(doc: Document, viewport: Viewport) -> Self {
        Self::with_layout(doc, viewport, Box::new(FlowLayout::default()))
    }

    /// Page with a custom layout.
    pub fn with_layout(doc: Document, viewport: Viewport, layout: Box<dyn Layout>) -> Self {
        Self {
            doc: RefCell::new(doc),
            viewport: Cell::new(viewport),
            prefs: Cell::new(MediaPrefs::default()),
            layout,
            next_sub: Cell::new(0),
            viewport_subs: RefCell::new(Subscribers::default()),
            event_subs: RefCell::new(Subscribers::default()),
        }
    }

    /// Set media preferences before anything subscribes.
    pub fn with_prefs(self, prefs: MediaPrefs) -> Self {
        self.prefs.set(prefs);
        self
    }

    /// Shared borrow of the document.
    pub fn doc(&self) -> Ref<'_, Document> {
        self.doc.borrow()
    }

    /// Exclusive borrow of the document.
    pub fn doc_mut(&self) -> RefMut<'_, Document> {
        self.doc.borrow_mut()
    }

    /// Current viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    /// Current media preferences.
    pub fn prefs(&self) -> MediaPrefs {
        self.prefs.get()
    }

    /// Geometry provider.
    pub fn layout(&self) -> &dyn Layout {
        self.layout.as_ref()
    }

    /// Page-space box of `node` in the current document state.
    pub fn rect(&self, node: NodeId) -> Rect {
        self.layout.rect(&self.doc.borrow(), node)
    }

    /// Scroll vertically to `y` and notify viewport subscribers.
    pub fn scroll_to(&self, y: f64) {
        let vp = Viewport {
            scroll_y: y.max(0.0),
            ..self.viewport.get()
        };
        self.set_viewport(vp);
    }

    /// Resize the viewport and notify viewport subscribers.
    pub fn resize(&self, width: f64, height: f64) {
        let vp = Viewport {
            width,
            height,
            ..self.viewport.get()
        };
        self.set_viewport(vp);
    }

    fn set_viewport(&self, vp: Viewport) {
        self.viewport.set(vp);
        self.viewport_subs.borrow_mut().publish(vp);
    }

    /// Deliver `event` to `target`. Preference events also update [`Page::prefs`].
    pub fn dispatch(&self, target: NodeId, event: Event) {
        if let Event::ReducedMotionChange(on) = event {
            let prefs = MediaPrefs {
                reduced_motion: on,
                ..self.prefs.get()
            };
            self.prefs.set(prefs);
        }
        self.event_subs.borrow_mut().publish((target, event));
    }

    /// Deliver [`Event::Load`] to the document root.
    pub fn fire_load(&self) {
        let root = self.doc.borrow().root();
        self.dispatch(root, Event::Load);
    }

    /// Toggle the reduced-motion preference, notifying listeners on the root.
    pub fn set_reduced_motion(&self, on: bool) {
        let root = self.doc.borrow().root();
        self.dispatch(root, Event::ReducedMotionChange(on));
    }

    fn next_id(&self) -> SubscriptionId {
        let id = self.next_sub.get();
        self.next_sub.set(id + 1);
        SubscriptionId(id)
    }

    /// Receive every viewport change.
    pub fn subscribe_viewport(&self) -> (SubscriptionId, mpsc::UnboundedReceiver<Viewport>) {
        let id = self.next_id();
        (id, self.viewport_subs.borrow_mut().subscribe(id))
    }

    /// Receive every dispatched event.
    pub fn subscribe_events(&self) -> (SubscriptionId, mpsc::UnboundedReceiver<(NodeId, Event)>) {
        let id = self.next_id();
        (id, self.event_subs.borrow_mut().subscribe(id))
    }

    /// Drop a subscription; its receiver sees end-of-stream.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        if !self.viewport_subs.borrow_mut().unsubscribe(id) {
            self.event_subs.borrow_mut().unsubscribe(id);
        }
    }

    /// Live viewport and event subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.viewport_subs.borrow().senders.len() + self.event_subs.borrow().senders.len()
    }
}

#[cfg(test)]
#[path = "../tests/unit/page/page.rs"]
mod tests;
