use std::collections::{BTreeMap, HashMap};

use crate::dom::{Document, NodeId};
use crate::engine::{
    AnimationEngine, AnimationHandle, AnimationSpec, Length, ScrollTrigger, TweenKind,
    VisualProps, css_number, require_core,
};
use crate::foundation::error::MotionResult;
use crate::page::Page;

/// Record of one call made against a [`HeadlessEngine`].
#[derive(Clone, Debug, PartialEq)]
pub enum EngineCall {
    /// Extension registered.
    Register,
    /// Instant state applied.
    Set(Vec<NodeId>),
    /// Animation started.
    Animate {
        /// Returned handle.
        handle: AnimationHandle,
        /// Every target of the animation.
        targets: Vec<NodeId>,
        /// Gated on a scroll trigger.
        triggered: bool,
    },
    /// One animation killed.
    Kill(AnimationHandle),
    /// Everything killed.
    KillAll,
    /// Trigger positions recomputed.
    Refresh,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TransformState {
    x: Length,
    y: Length,
    scale: f64,
    scale_x: f64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            x: Length::Px(0.0),
            y: Length::Px(0.0),
            scale: 1.0,
            scale_x: 1.0,
        }
    }
}

impl TransformState {
    fn css(&self) -> Option<String> {
        let mut parts = Vec::new();
        if !self.x.is_zero() || !self.y.is_zero() {
            parts.push(format!("translate({}, {})", self.x, self.y));
        }
        if self.scale != 1.0 {
            parts.push(format!("scale({})", css_number(self.scale)));
        }
        if self.scale_x != 1.0 {
            parts.push(format!("scaleX({})", css_number(self.scale_x)));
        }
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

#[derive(Clone, Debug)]
enum StepEnd {
    Props(Vec<(NodeId, VisualProps)>),
    Text(NodeId, String),
}

#[derive(Clone, Debug)]
struct LiveAnimation {
    spec: AnimationSpec,
    ends: Vec<StepEnd>,
    finished: bool,
}

/// In-process engine that renders start and end states into inline styles.
///
/// It does not interpolate. Animations sit at their start state until [`HeadlessEngine::settle`]
/// jumps the due ones to their end state, which is all a headless host can observe anyway.
#[derive(Debug, Default)]
pub struct HeadlessEngine {
    core: bool,
    extension: bool,
    registered: bool,
    next_handle: u64,
    live: BTreeMap<AnimationHandle, LiveAnimation>,
    transforms: HashMap<NodeId, TransformState>,
    calls: Vec<EngineCall>,
}

impl HeadlessEngine {
    /// Engine whose scripts still have to be fetched.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine whose core and extension scripts are already on the page.
    pub fn preloaded() -> Self {
        Self {
            core: true,
            extension: true,
            ..Self::default()
        }
    }

    /// Core script evaluated.
    pub fn install_core(&mut self) {
        self.core = true;
    }

    /// Extension script evaluated.
    pub fn install_extension(&mut self) {
        self.extension = true;
    }

    /// Extension registered with the core.
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Calls made so far.
    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    /// Number of [`EngineCall::Refresh`] calls.
    pub fn refresh_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, EngineCall::Refresh))
            .count()
    }

    /// Animations not yet killed.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Description of a live animation.
    pub fn animation(&self, handle: AnimationHandle) -> Option<&AnimationSpec> {
        self.live.get(&handle).map(|a| &a.spec)
    }

    /// Live animations that have `node` among their targets.
    pub fn animations_of(&self, node: NodeId) -> Vec<AnimationHandle> {
        self.live
            .iter()
            .filter(|(_, a)| a.spec.targets().contains(&node))
            .map(|(h, _)| *h)
            .collect()
    }

    /// Jump every unfinished animation whose trigger is due to its end state. Untriggered
    /// animations are always due. Returns how many were settled.
    pub fn settle(
        &mut self,
        doc: &mut Document,
        due: impl Fn(&Document, &ScrollTrigger) -> bool,
    ) -> usize {
        let view: &Document = doc;
        let ready: Vec<AnimationHandle> = self
            .live
            .iter()
            .filter(|(_, a)| {
                !a.finished && a.spec.trigger.as_ref().is_none_or(|t| due(view, t))
            })
            .map(|(h, _)| *h)
            .collect();
        for h in &ready {
            let Some(anim) = self.live.get_mut(h) else {
                continue;
            };
            anim.finished = true;
            let ends = anim.ends.clone();
            for end in ends {
                match end {
                    StepEnd::Props(per_target) => {
                        for (node, props) in per_target {
                            self.apply(doc, node, &props);
                        }
                    }
                    StepEnd::Text(node, text) => {
                        if let Err(err) = doc.set_text_content(node, &text) {
                            tracing::debug!(%err, "counter target vanished");
                        }
                    }
                }
            }
        }
        ready.len()
    }

    /// [`HeadlessEngine::settle`] against the page's current scroll position and layout.
    pub fn settle_on(&mut self, page: &Page) -> usize {
        let viewport = page.viewport();
        let layout = page.layout();
        let mut doc = page.doc_mut();
        self.settle(&mut doc, |doc, t| {
            t.reached(layout.rect(doc, t.trigger), &viewport)
        })
    }

    fn current(&self, doc: &Document, node: NodeId, like: &VisualProps) -> VisualProps {
        let tf = self.transforms.get(&node).copied().unwrap_or_default();
        let num = |prop: &str, dflt: f64| {
            doc.style(node, prop)
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(dflt)
        };
        VisualProps {
            opacity: like.opacity.map(|_| num("opacity", 1.0)),
            x: like.x.map(|_| tf.x),
            y: like.y.map(|_| tf.y),
            scale: like.scale.map(|_| tf.scale),
            scale_x: like.scale_x.map(|_| tf.scale_x),
            clip_path: like.clip_path.as_ref().map(|_| {
                doc.style(node, "clip-path")
                    .map_or_else(|| "none".to_owned(), str::to_owned)
            }),
            stroke_dasharray: like.stroke_dasharray.map(|_| num("stroke-dasharray", 0.0)),
            stroke_dashoffset: like.stroke_dashoffset.map(|_| num("stroke-dashoffset", 0.0)),
        }
    }

    fn apply(&mut self, doc: &mut Document, node: NodeId, props: &VisualProps) {
        if !doc.contains(node) {
            return;
        }
        if let Some(o) = props.opacity {
            doc.set_style(node, "opacity", css_number(o));
        }
        if props.x.is_some() || props.y.is_some() || props.scale.is_some() || props.scale_x.is_some()
        {
            let tf = self.transforms.entry(node).or_default();
            if let Some(x) = props.x {
                tf.x = x;
            }
            if let Some(y) = props.y {
                tf.y = y;
            }
            if let Some(s) = props.scale {
                tf.scale = s;
            }
            if let Some(s) = props.scale_x {
                tf.scale_x = s;
            }
            match tf.css() {
                Some(css) => doc.set_style(node, "transform", css),
                None => doc.remove_style(node, "transform"),
            }
        }
        match props.clip_path.as_deref() {
            Some("none") => doc.remove_style(node, "clip-path"),
            Some(clip) => doc.set_style(node, "clip-path", clip),
            None => {}
        }
        if let Some(v) = props.stroke_dasharray {
            doc.set_style(node, "stroke-dasharray", css_number(v));
        }
        if let Some(v) = props.stroke_dashoffset {
            doc.set_style(node, "stroke-dashoffset", css_number(v));
        }
    }
}

impl AnimationEngine for HeadlessEngine {
    fn core_present(&self) -> bool {
        self.core
    }

    fn extension_present(&self) -> bool {
        self.extension
    }

    fn register_extension(&mut self) -> MotionResult<()> {
        require_core(&*self)?;
        self.registered = true;
        self.calls.push(EngineCall::Register);
        Ok(())
    }

    fn set(&mut self, doc: &mut Document, targets: &[NodeId], props: &VisualProps) {
        for t in targets {
            self.apply(doc, *t, props);
        }
        self.calls.push(EngineCall::Set(targets.to_vec()));
    }

    fn animate(&mut self, doc: &mut Document, spec: AnimationSpec) -> AnimationHandle {
        let handle = AnimationHandle(self.next_handle);
        self.next_handle += 1;

        // Later steps start from the values earlier steps end on.
        let mut ends = Vec::with_capacity(spec.tweens.len());
        for tween in &spec.tweens {
            match &tween.kind {
                TweenKind::From(from) => {
                    let mut per_target = Vec::with_capacity(tween.targets.len());
                    for t in &tween.targets {
                        per_target.push((*t, self.current(doc, *t, from)));
                        self.apply(doc, *t, from);
                    }
                    ends.push(StepEnd::Props(per_target));
                }
                TweenKind::To(to) => {
                    ends.push(StepEnd::Props(
                        tween.targets.iter().map(|t| (*t, to.clone())).collect(),
                    ));
                }
                TweenKind::Count(format) => {
                    for t in &tween.targets {
                        ends.push(StepEnd::Text(*t, format.render(format.target)));
                    }
                }
            }
        }

        self.calls.push(EngineCall::Animate {
            handle,
            targets: spec.targets(),
            triggered: spec.trigger.is_some(),
        });
        self.live.insert(
            handle,
            LiveAnimation {
                spec,
                ends,
                finished: false,
            },
        );
        handle
    }

    fn kill(&mut self, handle: AnimationHandle) {
        if self.live.remove(&handle).is_some() {
            self.calls.push(EngineCall::Kill(handle));
        }
    }

    fn kill_all(&mut self) {
        self.live.clear();
        self.transforms.clear();
        self.calls.push(EngineCall::KillAll);
    }

    fn active_triggers(&self) -> Vec<AnimationHandle> {
        self.live
            .iter()
            .filter(|(_, a)| a.spec.trigger.is_some())
            .map(|(h, _)| *h)
            .collect()
    }

    fn refresh(&mut self, _doc: &Document) {
        self.calls.push(EngineCall::Refresh);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/headless.rs"]
mod tests;
