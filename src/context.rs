//! Orchestrator state shared by every task.
//!
//! All mutable state lives in one [`MotionContext`] owned by the orchestrator, so teardown is a
//! reset of a single value instead of cleanup scattered over components.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use futures::future::AbortHandle;

use crate::config::MotionConfig;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::directive::AttrResolver;
use crate::dom::{Document, Layout, ListenerId, NodeId, ObserverId};
use crate::effects::button::ButtonBinding;
use crate::engine::{AnimationEngine, AnimationHandle, AnimationSpec, ScriptFetcher, VisualProps};
use crate::foundation::core::Viewport;
use crate::foundation::error::MotionResult;
use crate::loader::LoadState;
use crate::page::{Page, SubscriptionId};
use crate::registry::ElementRegistry;
use crate::runtime::{RuntimeHandle, TimerId};

/// What a registered listener does when its event arrives.
#[derive(Clone, Debug)]
pub(crate) enum ListenerAction {
    /// Ask the engine to recompute trigger positions.
    Refresh,
    /// Track the reduced-motion preference.
    ReducedMotion,
    /// Drive a button interaction.
    Button(ButtonBinding),
}

/// Resources created on behalf of annotated elements, released by teardown.
#[derive(Debug, Default)]
pub(crate) struct Tracked {
    pub tasks: Vec<AbortHandle>,
    pub observers: Vec<ObserverId>,
    pub subscriptions: Vec<SubscriptionId>,
    pub listeners: BTreeMap<ListenerId, ListenerAction>,
    pub animations: Vec<AnimationHandle>,
}

/// Live resource counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ResourceCounts {
    /// Spawned tasks.
    pub tasks: usize,
    /// Mutation observers.
    pub observers: usize,
    /// Viewport and event subscriptions.
    pub subscriptions: usize,
    /// Event listeners.
    pub listeners: usize,
    /// Engine-side animation handles.
    pub animations: usize,
    /// Pending orchestrator timers.
    pub timers: usize,
}

impl ResourceCounts {
    /// Sum over every category.
    pub fn total(&self) -> usize {
        self.tasks
            + self.observers
            + self.subscriptions
            + self.listeners
            + self.animations
            + self.timers
    }
}

/// Pre-registration state of one element.
#[derive(Debug)]
pub(crate) struct Snapshot {
    pub node: NodeId,
    pub classes: Vec<String>,
    pub style: BTreeMap<String, String>,
    pub aria_label: Option<String>,
    /// Detached copies of the original children, kept only for effects that rewrite them.
    pub children: Option<Vec<NodeId>>,
}

impl Snapshot {
    pub fn take(doc: &mut Document, node: NodeId, with_children: bool) -> MotionResult<Self> {
        let children = if with_children {
            let mut copies = Vec::new();
            for c in doc.children(node).to_vec() {
                copies.push(doc.deep_clone(c)?);
            }
            Some(copies)
        } else {
            None
        };
        Ok(Self {
            node,
            classes: doc.classes(node).to_vec(),
            style: doc.inline_style(node).cloned().unwrap_or_default(),
            aria_label: doc.attr(node, "aria-label").map(str::to_owned),
            children,
        })
    }

    pub fn restore(self, doc: &mut Document) -> MotionResult<()> {
        if !doc.contains(self.node) {
            for c in self.children.into_iter().flatten() {
                doc.dispose(c);
            }
            return Ok(());
        }
        doc.set_classes(self.node, self.classes);
        doc.set_inline_style(self.node, self.style);
        match self.aria_label {
            Some(label) => doc.set_attr(self.node, "aria-label", label),
            None => doc.remove_attr(self.node, "aria-label"),
        }
        if let Some(children) = self.children {
            for old in doc.replace_children(self.node, &children)? {
                doc.dispose(old);
            }
        }
        Ok(())
    }
}

/// Visibility-watch record of one CSS-tier element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Watch {
    pub once: bool,
    pub inside: bool,
}

/// Everything the orchestrator mutates.
#[derive(Default)]
pub(crate) struct MotionContext {
    pub initialized: bool,
    pub ready: bool,
    pub reduced_motion: bool,
    pub touch: bool,
    pub registry: ElementRegistry,
    pub load: LoadState,
    pub diagnostics: Diagnostics,
    pub resources: Tracked,
    pub snapshots: Vec<Snapshot>,
    pub watched: BTreeMap<NodeId, Watch>,
    pub safety_timer: Option<TimerId>,
    pub debounce_timer: Option<TimerId>,
    /// Latest pointer-driven tween per target; a new one replaces it.
    pub interactions: HashMap<NodeId, AnimationHandle>,
}

impl MotionContext {
    pub fn warn(&mut self, kind: DiagnosticKind, node: NodeId, message: impl Into<String>) {
        self.diagnostics.emit(kind, Some(node), message);
    }

    pub fn note(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.diagnostics.emit(kind, None, message);
    }

    pub fn track_task(&mut self, handle: AbortHandle) {
        self.resources.tasks.retain(|h| !h.is_aborted());
        self.resources.tasks.push(handle);
    }

    pub fn resource_counts(&self) -> ResourceCounts {
        let r = &self.resources;
        ResourceCounts {
            tasks: r.tasks.iter().filter(|h| !h.is_aborted()).count(),
            observers: r.observers.len(),
            subscriptions: r.subscriptions.len(),
            listeners: r.listeners.len(),
            animations: r.animations.len(),
            timers: usize::from(self.safety_timer.is_some())
                + usize::from(self.debounce_timer.is_some()),
        }
    }
}

/// Collaborators plus state, shared by the orchestrator and its tasks.
///
/// Borrows of `ctx`, the document and the engine are taken per step and never held across an
/// `.await`.
pub(crate) struct Inner {
    pub page: Rc<Page>,
    pub engine: Rc<RefCell<dyn AnimationEngine>>,
    pub fetcher: Rc<dyn ScriptFetcher>,
    pub cfg: MotionConfig,
    pub res: AttrResolver,
    pub rt: RuntimeHandle,
    pub ctx: RefCell<MotionContext>,
}

impl Inner {
    pub fn new(
        page: Rc<Page>,
        engine: Rc<RefCell<dyn AnimationEngine>>,
        fetcher: Rc<dyn ScriptFetcher>,
        rt: RuntimeHandle,
        cfg: MotionConfig,
    ) -> Rc<Self> {
        let res = AttrResolver::new(cfg.attribute_namespace.as_str());
        Rc::new(Self {
            page,
            engine,
            fetcher,
            cfg,
            res,
            rt,
            ctx: RefCell::new(MotionContext::default()),
        })
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.ctx.borrow().load, LoadState::Loaded)
    }
}

/// Everything an effect handler may touch, borrowed for the duration of one dispatch.
pub(crate) struct EffectCx<'a> {
    pub doc: &'a mut Document,
    pub layout: &'a dyn Layout,
    pub engine: &'a mut dyn AnimationEngine,
    pub cfg: &'a MotionConfig,
    pub res: &'a AttrResolver,
    pub viewport: Viewport,
    pub ctx: &'a mut MotionContext,
}

impl EffectCx<'_> {
    /// Start an animation and track its handle.
    pub fn play(&mut self, spec: AnimationSpec) -> AnimationHandle {
        let handle = self.engine.animate(self.doc, spec);
        self.ctx.resources.animations.push(handle);
        handle
    }

    /// Start a pointer-driven tween on `target`, killing the one it supersedes.
    pub fn play_interaction(&mut self, target: NodeId, spec: AnimationSpec) -> AnimationHandle {
        if let Some(prev) = self.ctx.interactions.remove(&target) {
            self.engine.kill(prev);
            self.ctx.resources.animations.retain(|h| *h != prev);
        }
        let handle = self.play(spec);
        self.ctx.interactions.insert(target, handle);
        handle
    }

    /// Apply an instant state.
    pub fn set(&mut self, targets: &[NodeId], props: &VisualProps) {
        self.engine.set(self.doc, targets, props);
    }
}
