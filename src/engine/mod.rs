//! Animation engine collaborator.
//!
//! The orchestrator never interpolates anything itself. It describes tweens, timelines and scroll
//! triggers with the types here and hands them to an [`AnimationEngine`]; the engine's scripts
//! are fetched through a [`ScriptFetcher`].

pub(crate) mod headless;
pub(crate) mod network;

use std::fmt;

use futures::future::LocalBoxFuture;

use crate::dom::{Document, NodeId};
use crate::effects::counter::CounterFormat;
use crate::foundation::core::{Rect, Viewport};
use crate::foundation::error::{MotionError, MotionResult};

pub use headless::{EngineCall, HeadlessEngine};
pub use network::{FetchBehaviour, Script, SimulatedNetwork};

/// CSS length used by translate properties.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum Length {
    /// Absolute pixels.
    Px(f64),
    /// Percentage of the element's own box.
    Percent(f64),
}

impl Length {
    /// `true` for a zero offset in either unit.
    pub fn is_zero(self) -> bool {
        match self {
            Self::Px(v) | Self::Percent(v) => v == 0.0,
        }
    }
}

impl Default for Length {
    fn default() -> Self {
        Self::Px(0.0)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(v) => write!(f, "{}px", css_number(*v)),
            Self::Percent(v) => write!(f, "{}%", css_number(*v)),
        }
    }
}

/// Format a number the way style values are written: no trailing zeros.
pub fn css_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        return format!("{v:.0}");
    }
    let s = format!("{v:.4}");
    s.trim_end_matches('0').trim_end_matches('.').to_owned()
}

/// Animatable visual properties. `None` leaves a property untouched.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct VisualProps {
    /// Opacity in `[0, 1]`.
    pub opacity: Option<f64>,
    /// Horizontal translation.
    pub x: Option<Length>,
    /// Vertical translation.
    pub y: Option<Length>,
    /// Uniform scale.
    pub scale: Option<f64>,
    /// Horizontal scale.
    pub scale_x: Option<f64>,
    /// Clip-path value; `"none"` clears it.
    pub clip_path: Option<String>,
    /// Stroke dash pattern length.
    pub stroke_dasharray: Option<f64>,
    /// Stroke dash offset.
    pub stroke_dashoffset: Option<f64>,
}

impl VisualProps {
    /// Fully transparent.
    pub fn hidden() -> Self {
        Self {
            opacity: Some(0.0),
            ..Self::default()
        }
    }

    /// `true` when no property is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Timing shared by every target of a tween.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Timing {
    /// Seconds per target.
    pub duration: f64,
    /// Seconds before the first target starts.
    pub delay: f64,
    /// Engine ease name.
    pub ease: String,
    /// Seconds between consecutive targets.
    pub stagger: f64,
}

impl Timing {
    /// Timing without delay or stagger.
    pub fn new(duration: f64, ease: impl Into<String>) -> Self {
        Self {
            duration,
            delay: 0.0,
            ease: ease.into(),
            stagger: 0.0,
        }
    }
}

/// What a tween interpolates.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum TweenKind {
    /// Jump to these values, then animate back to the values present before the tween.
    From(VisualProps),
    /// Animate from the present values to these.
    To(VisualProps),
    /// Count a number up from zero, rewriting the target's text on every update.
    Count(CounterFormat),
}

/// Where a timeline step starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub enum Position {
    /// After everything before it has finished.
    #[default]
    Append,
    /// This many seconds after the previous step started.
    WithPrevious(f64),
}

/// One tween: a set of targets, what changes, and when.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Tween {
    /// Elements animated, in stagger order.
    pub targets: Vec<NodeId>,
    /// Interpolated values.
    pub kind: TweenKind,
    /// Duration, ease, stagger.
    pub timing: Timing,
    /// Placement inside a timeline.
    pub position: Position,
}

impl Tween {
    /// Seconds from the tween's start to its last target finishing.
    pub fn span(&self) -> f64 {
        let extra = self.targets.len().saturating_sub(1) as f64 * self.timing.stagger;
        self.timing.delay + self.timing.duration + extra
    }
}

/// Trigger policy when the trigger element scrolls back out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToggleActions {
    /// `play none none none`.
    PlayOnce,
    /// `play none none reverse`.
    PlayReverse,
}

impl ToggleActions {
    /// From the directive's once flag.
    pub fn from_once(once: bool) -> Self {
        if once { Self::PlayOnce } else { Self::PlayReverse }
    }

    /// Engine spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlayOnce => "play none none none",
            Self::PlayReverse => "play none none reverse",
        }
    }
}

/// Scroll-linked start condition.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ScrollTrigger {
    /// Element whose position is tested.
    pub trigger: NodeId,
    /// `"<element edge> <viewport edge>"`.
    pub start: String,
    /// Scrub end position.
    pub end: Option<String>,
    /// Scrub smoothing in seconds; `None` plays on entry instead of following the scrollbar.
    pub scrub: Option<f64>,
    /// Behaviour on leaving back.
    pub toggle: ToggleActions,
}

impl ScrollTrigger {
    /// Trigger that plays when `trigger` reaches `start`.
    pub fn new(trigger: NodeId, start: impl Into<String>, once: bool) -> Self {
        Self {
            trigger,
            start: start.into(),
            end: None,
            scrub: None,
            toggle: ToggleActions::from_once(once),
        }
    }

    /// `true` once the start position has been scrolled past for a trigger box `rect`.
    ///
    /// Unparseable positions are treated as `top bottom`.
    pub fn reached(&self, rect: Rect, viewport: &Viewport) -> bool {
        let (edge, at) = parse_position(&self.start).unwrap_or((Edge::Top, Edge::Bottom.into()));
        let element_y = match edge {
            Edge::Top => rect.y0,
            Edge::Center => (rect.y0 + rect.y1) / 2.0,
            Edge::Bottom => rect.y1,
        };
        let viewport_y = viewport.scroll_y + at.resolve(viewport.height);
        element_y <= viewport_y
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Edge {
    Top,
    Center,
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Offset {
    Fraction(f64),
    Px(f64),
}

impl From<Edge> for Offset {
    fn from(e: Edge) -> Self {
        match e {
            Edge::Top => Self::Fraction(0.0),
            Edge::Center => Self::Fraction(0.5),
            Edge::Bottom => Self::Fraction(1.0),
        }
    }
}

impl Offset {
    fn resolve(self, extent: f64) -> f64 {
        match self {
            Self::Fraction(f) => f * extent,
            Self::Px(p) => p,
        }
    }
}

fn parse_edge(s: &str) -> Option<Edge> {
    match s {
        "top" => Some(Edge::Top),
        "center" => Some(Edge::Center),
        "bottom" => Some(Edge::Bottom),
        _ => None,
    }
}

fn parse_position(s: &str) -> Option<(Edge, Offset)> {
    let mut parts = s.split_whitespace();
    let edge = parse_edge(parts.next()?)?;
    let at = parts.next().unwrap_or("top");
    let offset = if let Some(e) = parse_edge(at) {
        e.into()
    } else if let Some(p) = at.strip_suffix('%') {
        Offset::Fraction(p.parse::<f64>().ok()? / 100.0)
    } else {
        Offset::Px(at.strip_suffix("px").unwrap_or(at).parse().ok()?)
    };
    Some((edge, offset))
}

/// A tween or timeline, optionally gated on a scroll trigger.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct AnimationSpec {
    /// Steps in timeline order; a single tween is a one-step timeline.
    pub tweens: Vec<Tween>,
    /// Start condition; `None` plays immediately.
    pub trigger: Option<ScrollTrigger>,
    /// Seconds before the first step.
    pub delay: f64,
}

impl AnimationSpec {
    /// A lone tween.
    pub fn tween(tween: Tween) -> Self {
        Self {
            tweens: vec![tween],
            trigger: None,
            delay: 0.0,
        }
    }

    /// A sequence of steps.
    pub fn timeline(tweens: Vec<Tween>) -> Self {
        Self {
            tweens,
            trigger: None,
            delay: 0.0,
        }
    }

    /// Gate on `trigger`.
    pub fn with_trigger(mut self, trigger: ScrollTrigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Delay the whole timeline.
    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    /// Every target of every step, deduplicated in first-seen order.
    pub fn targets(&self) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = Vec::new();
        for t in self.tweens.iter().flat_map(|tw| tw.targets.iter()) {
            if !out.contains(t) {
                out.push(*t);
            }
        }
        out
    }

    /// Seconds from start to the last step finishing.
    pub fn total_duration(&self) -> f64 {
        let mut end: f64 = 0.0;
        let mut prev_start = 0.0;
        for t in &self.tweens {
            let start = match t.position {
                Position::Append => end,
                Position::WithPrevious(offset) => prev_start + offset,
            };
            end = end.max(start + t.span());
            prev_start = start;
        }
        self.delay + end
    }
}

/// Handle of one engine-side animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct AnimationHandle(pub u64);

/// External tween and scroll-trigger engine.
pub trait AnimationEngine {
    /// The core tween library is available.
    fn core_present(&self) -> bool;

    /// The scroll-trigger extension script has been evaluated.
    fn extension_present(&self) -> bool;

    /// Register the scroll-trigger extension with the core.
    fn register_extension(&mut self) -> MotionResult<()>;

    /// Apply `props` to `targets` instantly.
    fn set(&mut self, doc: &mut Document, targets: &[NodeId], props: &VisualProps);

    /// Start an animation. From-tweens render their start state immediately.
    fn animate(&mut self, doc: &mut Document, spec: AnimationSpec) -> AnimationHandle;

    /// Stop one animation where it is. Unknown handles are ignored.
    fn kill(&mut self, handle: AnimationHandle);

    /// Stop every animation and trigger.
    fn kill_all(&mut self);

    /// Animations gated on a scroll trigger that are still alive.
    fn active_triggers(&self) -> Vec<AnimationHandle>;

    /// Recompute trigger positions after layout changed.
    fn refresh(&mut self, doc: &Document);
}

/// Loads one engine script.
pub trait ScriptFetcher {
    /// Resolve once the script at `url` has been fetched and evaluated.
    fn fetch(&self, url: &str) -> LocalBoxFuture<'static, Result<(), String>>;
}

/// Refuse to register an extension before its core.
pub(crate) fn require_core(engine: &dyn AnimationEngine) -> MotionResult<()> {
    if engine.core_present() {
        Ok(())
    } else {
        Err(MotionError::validation("engine core is not present"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/spec.rs"]
mod tests;
