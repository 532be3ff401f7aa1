//! Arena document model.
//!
//! Nodes live in a slot arena addressed by generational [`NodeId`]s. Holding a `NodeId` never keeps
//! a node alive: once a subtree is disposed its slots are recycled with a bumped generation, and
//! every stale id simply stops resolving.

pub(crate) mod layout;
pub(crate) mod select;

use std::collections::BTreeMap;

use futures::channel::mpsc;

use crate::foundation::core::Rect;
use crate::foundation::error::{MotionError, MotionResult};

pub use layout::{FlowLayout, Layout};
pub use select::Selector;

/// Generational handle to a node in a [`Document`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Arena slot index (stable only while the node is alive).
    pub fn index(self) -> u32 {
        self.index
    }
}

/// Payload of an element node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementData {
    /// Lower-case tag name.
    pub tag: String,
    /// Attributes by name.
    pub attrs: BTreeMap<String, String>,
    /// Class list in insertion order.
    pub classes: Vec<String>,
    /// Inline style properties.
    pub style: BTreeMap<String, String>,
    /// Page-space box for block-level elements; inline content is measured by [`Layout`].
    pub frame: Option<Rect>,
}

/// Element or text payload.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Element node.
    Element(ElementData),
    /// Text node.
    Text(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<NodeData>,
}

/// One child-list change, delivered to mutation subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationRecord {
    /// Parent whose child list changed.
    pub target: NodeId,
    /// Nodes inserted under `target`.
    pub added: Vec<NodeId>,
    /// Nodes removed from `target`.
    pub removed: Vec<NodeId>,
}

/// Handle for a mutation subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverId(u64);

/// Handle for a registered event listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Event kinds a listener can be registered for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    /// Pointer entered the element.
    PointerEnter,
    /// Pointer left the element.
    PointerLeave,
    /// Pointer moved over the element.
    PointerMove,
    /// Page finished loading all subresources.
    Load,
    /// Reduced-motion media preference changed.
    ReducedMotionChange,
}

#[derive(Clone, Copy, Debug)]
struct Listener {
    node: NodeId,
    kind: EventKind,
}

/// Arena-backed document tree with `html`, `head` and `body` created up front.
#[derive(Debug)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    subscribers: Vec<(ObserverId, mpsc::UnboundedSender<MutationRecord>)>,
    next_observer: u64,
    listeners: BTreeMap<ListenerId, Listener>,
    next_listener: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty `html > (head, body)` document.
    pub fn new() -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            head: NodeId {
                index: 0,
                generation: 0,
            },
            body: NodeId {
                index: 0,
                generation: 0,
            },
            subscribers: Vec::new(),
            next_observer: 0,
            listeners: BTreeMap::new(),
            next_listener: 0,
        };
        let root = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.link(root, head, None);
        doc.link(root, body, None);
        doc.root = root;
        doc.head = head;
        doc.body = body;
        doc
    }

    /// The `html` element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `head` element.
    pub fn head(&self) -> NodeId {
        self.head
    }

    /// The `body` element.
    pub fn body(&self) -> NodeId {
        self.body
    }

    fn data(&self, id: NodeId) -> Option<&NodeData> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn data_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.data(id)?.kind {
            NodeKind::Element(e) => Some(e),
            NodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.data_mut(id)?.kind {
            NodeKind::Element(e) => Some(e),
            NodeKind::Text(_) => None,
        }
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let data = NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(data);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            node: Some(data),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// `true` while `id` refers to a live node (attached or detached).
    pub fn contains(&self, id: NodeId) -> bool {
        self.data(id).is_some()
    }

    /// `true` when `id` is reachable from the root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if n == self.root {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            ..ElementData::default()
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    /// Node payload.
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.data(id).map(|d| &d.kind)
    }

    /// Tag name of an element.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    /// `true` when `id` is a live element.
    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    /// Data of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.data(id)?.kind {
            NodeKind::Text(t) => Some(t),
            NodeKind::Element(_) => None,
        }
    }

    /// Parent node, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id)?.parent
    }

    /// Children in order; empty for dead ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.data(id).map_or(&[], |d| d.children.as_slice())
    }

    /// Element children in order.
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    fn unlink(&mut self, child: NodeId) -> Option<NodeId> {
        let parent = self.data(child)?.parent?;
        if let Some(p) = self.data_mut(parent) {
            p.children.retain(|c| *c != child);
        }
        if let Some(c) = self.data_mut(child) {
            c.parent = None;
        }
        Some(parent)
    }

    fn link(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) {
        if let Some(p) = self.data_mut(parent) {
            let at = before
                .and_then(|b| p.children.iter().position(|c| *c == b))
                .unwrap_or(p.children.len());
            p.children.insert(at, child);
        }
        if let Some(c) = self.data_mut(child) {
            c.parent = Some(parent);
        }
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> MotionResult<()> {
        if !self.is_element(parent) {
            return Err(MotionError::dom("insertion parent must be a live element"));
        }
        if !self.contains(child) {
            return Err(MotionError::dom("inserted node is not alive"));
        }
        let mut cur = Some(parent);
        while let Some(n) = cur {
            if n == child {
                return Err(MotionError::dom("cannot insert a node into its own subtree"));
            }
            cur = self.parent(n);
        }
        Ok(())
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> MotionResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or at the end when `None`).
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> MotionResult<()> {
        self.check_insert(parent, child)?;
        if let Some(r) = reference
            && self.parent(r) != Some(parent)
        {
            return Err(MotionError::dom("reference node is not a child of parent"));
        }
        if let Some(old) = self.unlink(child) {
            self.record(old, Vec::new(), vec![child]);
        }
        self.link(parent, child, reference);
        self.record(parent, vec![child], Vec::new());
        Ok(())
    }

    /// Detach `child` from its parent. Detached nodes stay alive until disposed.
    pub fn remove(&mut self, child: NodeId) {
        if let Some(parent) = self.unlink(child) {
            self.record(parent, Vec::new(), vec![child]);
        }
    }

    /// Replace `old` with `nodes`, in order, at the same position.
    pub fn replace_with(&mut self, old: NodeId, nodes: &[NodeId]) -> MotionResult<()> {
        let parent = self
            .parent(old)
            .ok_or_else(|| MotionError::dom("replaced node has no parent"))?;
        for n in nodes {
            self.check_insert(parent, *n)?;
        }
        for n in nodes {
            if let Some(prev) = self.unlink(*n) {
                self.record(prev, Vec::new(), vec![*n]);
            }
            self.link(parent, *n, Some(old));
        }
        self.unlink(old);
        self.record(parent, nodes.to_vec(), vec![old]);
        Ok(())
    }

    /// Detach every child of `parent` and attach `nodes` instead. Returns the removed children.
    pub fn replace_children(
        &mut self,
        parent: NodeId,
        nodes: &[NodeId],
    ) -> MotionResult<Vec<NodeId>> {
        for n in nodes {
            self.check_insert(parent, *n)?;
        }
        let removed = self.children(parent).to_vec();
        for c in &removed {
            self.unlink(*c);
        }
        for n in nodes {
            if let Some(prev) = self.unlink(*n) {
                self.record(prev, Vec::new(), vec![*n]);
            }
            self.link(parent, *n, None);
        }
        self.record(parent, nodes.to_vec(), removed.clone());
        Ok(removed)
    }

    /// Free `id` and its whole subtree. Ids into the subtree become stale.
    pub fn dispose(&mut self, id: NodeId) {
        if !self.contains(id) {
            return;
        }
        self.remove(id);
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            let Some(slot) = self.slots.get_mut(n.index as usize) else {
                continue;
            };
            if slot.generation != n.generation {
                continue;
            }
            if let Some(data) = slot.node.take() {
                stack.extend(data.children);
            }
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(n.index);
            self.listeners.retain(|_, l| l.node != n);
        }
    }

    /// Deep-copy `id` into a new detached subtree. Listeners are not copied.
    pub fn deep_clone(&mut self, id: NodeId) -> MotionResult<NodeId> {
        let kind = self
            .kind(id)
            .cloned()
            .ok_or_else(|| MotionError::dom("cannot clone a dead node"))?;
        let copy = self.alloc(kind);
        for c in self.children(id).to_vec() {
            let cc = self.deep_clone(c)?;
            self.link(copy, cc, None);
        }
        Ok(copy)
    }

    /// Shallow copy of an element (tag, attributes, classes, style) without children.
    pub fn shallow_clone(&mut self, id: NodeId) -> MotionResult<NodeId> {
        let kind = self
            .kind(id)
            .cloned()
            .ok_or_else(|| MotionError::dom("cannot clone a dead node"))?;
        Ok(self.alloc(kind))
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(t) = self.text(id) {
            out.push_str(t);
            return out;
        }
        for n in self.descendants(id) {
            if let Some(t) = self.text(n) {
                out.push_str(t);
            }
        }
        out
    }

    /// Replace the children of `id` with a single text node.
    ///
    /// A lone existing text child is updated in place, which does not count as a child-list
    /// mutation.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> MotionResult<()> {
        let lone_text = match self.children(id) {
            [only] if self.text(*only).is_some() => Some(*only),
            _ => None,
        };
        if let Some(t) = lone_text {
            self.set_text(t, text);
            return Ok(());
        }
        let node = self.create_text(text);
        let removed = self.replace_children(id, &[node])?;
        for r in removed {
            self.dispose(r);
        }
        Ok(())
    }

    /// Replace the data of a text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if let Some(NodeData {
            kind: NodeKind::Text(t),
            ..
        }) = self.data_mut(id)
        {
            *t = text.to_owned();
        }
    }

    /// Attribute value.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attrs.get(name).map(String::as_str)
    }

    /// `true` when the attribute is present (even if empty).
    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Set an attribute.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(e) = self.element_mut(id) {
            e.attrs.insert(name.to_owned(), value.into());
        }
    }

    /// Remove an attribute.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(e) = self.element_mut(id) {
            e.attrs.remove(name);
        }
    }

    /// `true` when the element's class list contains `class`.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    /// Add a class if missing.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(e) = self.element_mut(id)
            && !e.classes.iter().any(|c| c == class)
        {
            e.classes.push(class.to_owned());
        }
    }

    /// Remove a class if present.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(e) = self.element_mut(id) {
            e.classes.retain(|c| c != class);
        }
    }

    /// Class list of an element.
    pub fn classes(&self, id: NodeId) -> &[String] {
        self.element(id).map_or(&[], |e| e.classes.as_slice())
    }

    /// Replace the whole class list.
    pub fn set_classes(&mut self, id: NodeId, classes: Vec<String>) {
        if let Some(e) = self.element_mut(id) {
            e.classes = classes;
        }
    }

    /// Inline style property.
    pub fn style(&self, id: NodeId, prop: &str) -> Option<&str> {
        self.element(id)?.style.get(prop).map(String::as_str)
    }

    /// Set an inline style property.
    pub fn set_style(&mut self, id: NodeId, prop: &str, value: impl Into<String>) {
        if let Some(e) = self.element_mut(id) {
            e.style.insert(prop.to_owned(), value.into());
        }
    }

    /// Remove an inline style property.
    pub fn remove_style(&mut self, id: NodeId, prop: &str) {
        if let Some(e) = self.element_mut(id) {
            e.style.remove(prop);
        }
    }

    /// Full inline style map.
    pub fn inline_style(&self, id: NodeId) -> Option<&BTreeMap<String, String>> {
        self.element(id).map(|e| &e.style)
    }

    /// Replace the full inline style map.
    pub fn set_inline_style(&mut self, id: NodeId, style: BTreeMap<String, String>) {
        if let Some(e) = self.element_mut(id) {
            e.style = style;
        }
    }

    /// Page-space frame of a block element.
    pub fn frame(&self, id: NodeId) -> Option<Rect> {
        self.element(id)?.frame
    }

    /// Set the page-space frame of a block element.
    pub fn set_frame(&mut self, id: NodeId, frame: Option<Rect>) {
        if let Some(e) = self.element_mut(id) {
            e.frame = frame;
        }
    }

    /// Descendants of `id` in document (pre-)order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    /// Descendant text nodes in document order.
    pub fn text_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|n| self.text(*n).is_some())
            .collect()
    }

    /// Descendant elements of `scope` matching `selector`, in document order.
    pub fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|n| selector.matches(self, *n))
            .collect()
    }

    /// First descendant of `scope` matching `selector`.
    pub fn query(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|n| selector.matches(self, *n))
    }

    fn record(&mut self, target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
        if self.subscribers.is_empty() || (added.is_empty() && removed.is_empty()) {
            return;
        }
        let rec = MutationRecord {
            target,
            added,
            removed,
        };
        self.subscribers
            .retain(|(_, tx)| tx.unbounded_send(rec.clone()).is_ok());
    }

    /// Subscribe to child-list mutations anywhere in the document.
    pub fn subscribe_mutations(&mut self) -> (ObserverId, mpsc::UnboundedReceiver<MutationRecord>) {
        let (tx, rx) = mpsc::unbounded();
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.subscribers.push((id, tx));
        (id, rx)
    }

    /// Drop a mutation subscription; its receiver sees end-of-stream.
    pub fn unsubscribe_mutations(&mut self, id: ObserverId) {
        self.subscribers.retain(|(sid, _)| *sid != id);
    }

    /// Number of live mutation subscriptions.
    pub fn mutation_subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Register a listener for `kind` on `node`.
    pub fn add_listener(&mut self, node: NodeId, kind: EventKind) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, Listener { node, kind });
        id
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }

    /// Listeners registered for `kind` on `node`, in registration order.
    pub fn listeners_for(&self, node: NodeId, kind: EventKind) -> Vec<ListenerId> {
        self.listeners
            .iter()
            .filter(|(_, l)| l.node == node && l.kind == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dom/document.rs"]
mod tests;
