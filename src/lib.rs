//! Hypemotion is a declarative animation orchestrator for content-driven pages.
//!
//! Authors annotate elements with attributes (`data-hm-animate="fade-up"`,
//! `data-hm-btn="magnetic"`, ...) and [`Motion`] decides how, when and with which backing
//! technology each effect runs.
//!
//! # Pipeline overview
//!
//! 1. **Pre-hide**: annotated content is hidden and a bounded safety timer starts.
//! 2. **Classify**: every annotated element is registered exactly once and routed to the CSS tier,
//!    the engine tier, or straight to a static visible state under reduced motion.
//! 3. **Admit**: CSS-tier elements already on screen are marked visible; the rest wait for the
//!    viewport gate.
//! 4. **Load and dispatch**: the external [`AnimationEngine`] is loaded on demand (one shared load
//!    for every requester), then engine-tier handlers run in frame-sized batches.
//! 5. **Ready**: the pre-hide is lifted and a mutation watcher picks up later insertions.
//!
//! The host is modelled explicitly: a [`Document`] arena, a [`Layout`], a [`Page`] with viewport
//! and media preferences, and a single-threaded [`Runtime`] with a virtual clock. Nothing here
//! is fatal to the page; content visibility never depends on any single step succeeding.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod diagnostics;
mod directive;
mod dispatcher;
mod dom;
mod effects;
mod engine;
mod events;
mod fixture;
mod foundation;
mod gate;
mod loader;
mod orchestrator;
mod page;
mod registry;
mod runtime;
mod safety;
mod segment;
mod style;
mod watcher;

pub use config::MotionConfig;
pub use context::ResourceCounts;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use directive::{
    AttrResolver, AttrValue, BUTTON_OPTION, ButtonDirective, ButtonKind, Directive,
    DirectiveOptions, EFFECT_OPTION, EffectKind, FOREIGN_BINDING_ATTR, RevealDirection, Tier,
    annotated, coerce, effect_kind, has_foreign_binding, is_essential,
};
pub use dom::{
    Document, ElementData, EventKind, FlowLayout, Layout, ListenerId, MutationRecord, NodeId,
    NodeKind, ObserverId, Selector,
};
pub use effects::button::{CLONE_CLASS, FILL_CLASS};
pub use effects::draw::stroke_length;
pub use effects::{CounterFormat, Preset, preset, reveal_clips};
pub use engine::{
    AnimationEngine, AnimationHandle, AnimationSpec, EngineCall, FetchBehaviour, HeadlessEngine,
    Length, Position, Script, ScriptFetcher, ScrollTrigger, SimulatedNetwork, Timing, Tween,
    TweenKind, VisualProps,
};
pub use fixture::{ElementDef, FrameDef, LayoutDef, NodeDef, PageDef};
pub use foundation::core::{Margin, Point, Rect, Viewport, intersection_ratio};
pub use foundation::error::{LoadError, MotionError, MotionResult};
pub use loader::LoadPhase;
pub use orchestrator::{ElementReport, Motion, MotionReport};
pub use page::{Event, MediaPrefs, Page, SubscriptionId};
pub use registry::{ElementRegistry, ElementState};
pub use runtime::{Runtime, RuntimeHandle, TimerId};
pub use segment::{
    CHAR_CLASS, LINE_CLASS, MEASURE_CLASS, Segment, SegmentKind, Split, WORD_CLASS, segment,
};
pub use style::{
    ARMED, ENTERED, FALLBACK, LOADING, READY, VISIBLE, Visual, computed_visual, safety_css,
};

#[cfg(test)]
#[path = "../tests/unit/harness.rs"]
pub(crate) mod harness;
