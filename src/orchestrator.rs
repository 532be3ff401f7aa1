//! Public entry point: initialization, teardown and refresh.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::MotionConfig;
use crate::context::{Inner, ListenerAction, MotionContext, ResourceCounts};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::directive::{self, BUTTON_OPTION, EFFECT_OPTION};
use crate::dispatcher;
use crate::dom::{EventKind, NodeId};
use crate::engine::{AnimationEngine, ScriptFetcher};
use crate::events;
use crate::foundation::error::MotionResult;
use crate::gate;
use crate::loader::{LoadPhase, LoadState};
use crate::page::Page;
use crate::registry::ElementState;
use crate::runtime::RuntimeHandle;
use crate::safety;
use crate::style::{self, CSS_TIER_STYLE_ID, FALLBACK, LOADING, READY, Visual};
use crate::watcher;

/// State of one annotated element, as reported to hosts.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ElementReport {
    /// Element handle.
    pub node: NodeId,
    /// Tag name.
    pub tag: String,
    /// Raw effect attribute.
    pub effect: Option<String>,
    /// Raw button attribute.
    pub button: Option<String>,
    /// Dispatch state; `None` when never registered.
    pub state: Option<ElementState>,
    /// Resolved visual state.
    pub visual: Visual,
}

/// Serializable summary of an orchestrator and its page.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct MotionReport {
    /// `init` ran and no teardown followed.
    pub initialized: bool,
    /// Initialization finished.
    pub ready: bool,
    /// Engine load phase.
    pub load: LoadPhase,
    /// The forced-visible override is active.
    pub fallback: bool,
    /// Live tracked resources.
    pub resources: ResourceCounts,
    /// Every annotated element in document order.
    pub elements: Vec<ElementReport>,
    /// Every diagnostic emitted so far.
    pub diagnostics: Vec<Diagnostic>,
}

/// Animation orchestrator for one page.
///
/// Cloning is cheap and yields another handle to the same orchestrator.
#[derive(Clone)]
pub struct Motion {
    inner: Rc<Inner>,
}

impl std::fmt::Debug for Motion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Motion")
            .field("initialized", &self.is_initialized())
            .field("ready", &self.is_ready())
            .field("load", &self.load_phase())
            .finish_non_exhaustive()
    }
}

impl Motion {
    /// Orchestrator over `page`. Nothing happens until [`Motion::init`].
    pub fn new(
        page: Rc<Page>,
        engine: Rc<RefCell<dyn AnimationEngine>>,
        fetcher: Rc<dyn ScriptFetcher>,
        rt: RuntimeHandle,
        cfg: MotionConfig,
    ) -> MotionResult<Self> {
        cfg.validate()?;
        Ok(Self {
            inner: Inner::new(page, engine, fetcher, rt, cfg),
        })
    }

    /// Scan the page and start every effect. A no-op when already initialized.
    ///
    /// CSS-tier elements are admitted before this returns; engine-tier work continues on the
    /// runtime once the engine has loaded.
    pub fn init(&self) -> MotionResult<()> {
        let inner = &self.inner;
        {
            let mut ctx = inner.ctx.borrow_mut();
            if ctx.initialized {
                tracing::debug!("init skipped, already initialized");
                return Ok(());
            }
            ctx.initialized = true;
            let prefs = inner.page.prefs();
            ctx.reduced_motion = prefs.reduced_motion;
            ctx.touch = prefs.touch;
        }

        safety::arm(inner)?;
        {
            let mut doc = inner.page.doc_mut();
            let css = style::css_tier_css(&inner.cfg, &inner.res);
            style::inject(&mut doc, CSS_TIER_STYLE_ID, &css)?;
            let root = doc.root();
            let id = doc.add_listener(root, EventKind::ReducedMotionChange);
            inner
                .ctx
                .borrow_mut()
                .resources
                .listeners
                .insert(id, ListenerAction::ReducedMotion);
        }
        gate::start(inner);
        events::start(inner);

        let elements = directive::annotated(&inner.page.doc(), &inner.res);
        let pending = dispatcher::classify(inner, &elements);
        if pending.is_empty() {
            inner
                .ctx
                .borrow_mut()
                .note(DiagnosticKind::CssOnly, "no element needs the animation engine");
            finish(inner);
            return Ok(());
        }

        let task_inner = inner.clone();
        let task = inner.rt.spawn(async move {
            dispatcher::engine_pass(task_inner.clone(), pending).await;
            finish(&task_inner);
        });
        inner.ctx.borrow_mut().track_task(task);
        Ok(())
    }

    /// Release every tracked resource and restore the page to its pre-init markup.
    pub fn destroy(&self) {
        let inner = &self.inner;
        if !inner.ctx.borrow().initialized {
            return;
        }
        let (resources, snapshots, timers, loaded) = {
            let mut ctx = inner.ctx.borrow_mut();
            (
                std::mem::take(&mut ctx.resources),
                std::mem::take(&mut ctx.snapshots),
                [ctx.safety_timer.take(), ctx.debounce_timer.take()],
                matches!(ctx.load, LoadState::Loaded),
            )
        };

        for task in &resources.tasks {
            task.abort();
        }
        for timer in timers.into_iter().flatten() {
            inner.rt.clear_timeout(timer);
        }
        {
            let mut engine = inner.engine.borrow_mut();
            for handle in &resources.animations {
                engine.kill(*handle);
            }
            if loaded {
                engine.kill_all();
            }
        }
        for sub in &resources.subscriptions {
            inner.page.unsubscribe(*sub);
        }
        {
            let mut doc = inner.page.doc_mut();
            for observer in &resources.observers {
                doc.unsubscribe_mutations(*observer);
            }
            for id in resources.listeners.keys() {
                doc.remove_listener(*id);
            }
            for snapshot in snapshots.into_iter().rev() {
                if let Err(err) = snapshot.restore(&mut doc) {
                    tracing::warn!(%err, "could not restore element");
                }
            }
            style::remove_injected(&mut doc);
            let root = doc.root();
            for class in [LOADING, READY, FALLBACK] {
                doc.remove_class(root, class);
            }
        }

        let mut ctx = inner.ctx.borrow_mut();
        let diagnostics = std::mem::take(&mut ctx.diagnostics);
        *ctx = MotionContext {
            diagnostics,
            ..MotionContext::default()
        };
        ctx.note(
            DiagnosticKind::Destroyed,
            format!(
                "teardown released {} animations and {} listeners",
                resources.animations.len(),
                resources.listeners.len()
            ),
        );
    }

    /// Tear down, then initialize from a clean slate.
    pub fn reinit(&self) -> MotionResult<()> {
        self.destroy();
        self.init()
    }

    /// Ask the engine to recompute trigger positions. Ignored until the engine has loaded.
    pub fn refresh(&self) {
        let inner = &self.inner;
        if !inner.is_loaded() {
            tracing::debug!("refresh skipped, engine not loaded");
            return;
        }
        {
            let doc = inner.page.doc();
            inner.engine.borrow_mut().refresh(&doc);
        }
        inner
            .ctx
            .borrow_mut()
            .note(DiagnosticKind::Refreshed, "trigger positions recomputed");
    }

    /// `init` ran and no teardown followed.
    pub fn is_initialized(&self) -> bool {
        self.inner.ctx.borrow().initialized
    }

    /// Initialization finished.
    pub fn is_ready(&self) -> bool {
        self.inner.ctx.borrow().ready
    }

    /// Engine load phase.
    pub fn load_phase(&self) -> LoadPhase {
        self.inner.ctx.borrow().load.phase()
    }

    /// Dispatch state of `el`.
    pub fn element_state(&self, el: NodeId) -> Option<ElementState> {
        self.inner.ctx.borrow().registry.state(el)
    }

    /// Number of processing records.
    pub fn registered(&self) -> usize {
        self.inner.ctx.borrow().registry.len()
    }

    /// Diagnostics emitted so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.inner.ctx.borrow().diagnostics.entries().to_vec()
    }

    /// Number of diagnostics of `kind`.
    pub fn diagnostic_count(&self, kind: DiagnosticKind) -> usize {
        self.inner.ctx.borrow().diagnostics.count(kind)
    }

    /// Live tracked resources.
    pub fn resources(&self) -> ResourceCounts {
        self.inner.ctx.borrow().resource_counts()
    }

    /// Configuration in use.
    pub fn config(&self) -> &MotionConfig {
        &self.inner.cfg
    }

    /// Snapshot of everything a host may want to inspect.
    pub fn report(&self) -> MotionReport {
        let inner = &self.inner;
        let doc = inner.page.doc();
        let ctx = inner.ctx.borrow();
        let elements = directive::annotated(&doc, &inner.res)
            .into_iter()
            .map(|el| ElementReport {
                node: el,
                tag: doc.tag(el).unwrap_or_default().to_owned(),
                effect: inner.res.raw(&doc, el, EFFECT_OPTION).map(str::to_owned),
                button: inner.res.raw(&doc, el, BUTTON_OPTION).map(str::to_owned),
                state: ctx.registry.state(el),
                visual: style::computed_visual(&doc, el, &inner.cfg),
            })
            .collect();
        MotionReport {
            initialized: ctx.initialized,
            ready: ctx.ready,
            load: ctx.load.phase(),
            fallback: doc.has_class(doc.root(), FALLBACK),
            resources: ctx.resource_counts(),
            elements,
            diagnostics: ctx.diagnostics.entries().to_vec(),
        }
    }
}

/// Reach ready: lift the pre-hide and hand over to the mutation watcher.
fn finish(inner: &Rc<Inner>) {
    {
        let mut ctx = inner.ctx.borrow_mut();
        if !ctx.initialized || ctx.ready {
            return;
        }
        ctx.ready = true;
    }
    safety::release(inner);
    let loaded = inner.is_loaded();
    let (animations, buttons) = {
        let mut doc = inner.page.doc_mut();
        let root = doc.root();
        doc.add_class(root, READY);
        if loaded {
            let id = doc.add_listener(root, EventKind::Load);
            inner
                .ctx
                .borrow_mut()
                .resources
                .listeners
                .insert(id, ListenerAction::Refresh);
        }
        let annotated = directive::annotated(&doc, &inner.res);
        let animations = annotated
            .iter()
            .filter(|el| directive::effect_kind(&doc, **el, &inner.res).is_some())
            .count();
        let buttons = annotated
            .iter()
            .filter(|el| inner.res.has(&doc, **el, BUTTON_OPTION))
            .count();
        (animations, buttons)
    };
    watcher::start(inner);
    inner.ctx.borrow_mut().note(
        DiagnosticKind::Ready,
        format!("initialized: {animations} animations, {buttons} button interactions"),
    );
}

#[cfg(test)]
#[path = "../tests/unit/orchestrator/orchestrator.rs"]
mod tests;
