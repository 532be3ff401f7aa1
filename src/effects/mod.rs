//! Engine-tier effect handlers.
//!
//! Every [`EffectKind`] has exactly one handler, selected by an exhaustive match. Handlers only
//! describe animations; interpolation is the engine's business.

pub(crate) mod button;
pub(crate) mod counter;
pub(crate) mod draw;

use crate::config::MotionConfig;
use crate::context::EffectCx;
use crate::diagnostics::DiagnosticKind;
use crate::directive::{Directive, DirectiveOptions, EffectKind, RevealDirection};
use crate::dom::{NodeId, Selector};
use crate::engine::{
    AnimationSpec, Length, Position, ScrollTrigger, Timing, Tween, TweenKind, VisualProps,
};
use crate::foundation::error::MotionResult;
use crate::segment::{self, SegmentKind};

pub use counter::CounterFormat;

/// Default timing of one effect kind before per-element overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Preset {
    /// Seconds per target.
    pub duration: f64,
    /// Engine ease name.
    pub ease: String,
    /// Seconds between targets.
    pub stagger: f64,
    /// Seconds before start.
    pub delay: f64,
}

/// Default timing table.
pub fn preset(kind: EffectKind, cfg: &MotionConfig) -> Preset {
    let fixed = |duration: f64, ease: &str, stagger: f64| Preset {
        duration,
        ease: ease.to_owned(),
        stagger,
        delay: cfg.delay,
    };
    match kind {
        EffectKind::FadeUp
        | EffectKind::FadeDown
        | EffectKind::FadeLeft
        | EffectKind::FadeRight
        | EffectKind::FadeIn
        | EffectKind::ScaleIn
        | EffectKind::Parallax => fixed(cfg.duration, &cfg.ease, 0.0),
        EffectKind::StaggerChildren => fixed(cfg.duration, &cfg.ease, cfg.stagger),
        EffectKind::RevealUp | EffectKind::ImgReveal => fixed(1.0, "power4.inOut", 0.0),
        EffectKind::SplitLines => fixed(0.9, "power3.out", 0.12),
        EffectKind::SplitWords => fixed(0.6, "power2.out", 0.04),
        EffectKind::SplitChars => fixed(0.5, "power2.out", 0.02),
        EffectKind::Counter => fixed(2.0, "power2.out", 0.0),
        EffectKind::DrawLine => fixed(1.5, "power2.inOut", 0.0),
        EffectKind::HeroText => Preset {
            delay: 0.3,
            ..fixed(1.0, "power4.out", 0.15)
        },
        EffectKind::HeroImage => Preset {
            delay: 0.2,
            ..fixed(1.4, "power3.out", 0.0)
        },
    }
}

fn timing(kind: EffectKind, o: &DirectiveOptions, cfg: &MotionConfig) -> Timing {
    let p = preset(kind, cfg);
    Timing {
        duration: o.duration.unwrap_or(p.duration),
        delay: o.delay.unwrap_or(p.delay),
        ease: o.ease.clone().unwrap_or(p.ease),
        stagger: o.stagger.unwrap_or(p.stagger),
    }
}

fn trigger(el: NodeId, o: &DirectiveOptions) -> ScrollTrigger {
    ScrollTrigger::new(el, o.scroll_start.clone(), o.once)
}

fn from(targets: Vec<NodeId>, props: VisualProps, timing: Timing) -> Tween {
    Tween {
        targets,
        kind: TweenKind::From(props),
        timing,
        position: Position::Append,
    }
}

/// Image wipe start and end clips.
pub fn reveal_clips(direction: RevealDirection) -> (&'static str, &'static str) {
    match direction {
        RevealDirection::Left => ("inset(0 100% 0 0)", "inset(0 0% 0 0)"),
        RevealDirection::Right => ("inset(0 0 0 100%)", "inset(0 0 0 0%)"),
        RevealDirection::Top => ("inset(0 0 100% 0)", "inset(0 0 0% 0)"),
        RevealDirection::Bottom => ("inset(100% 0 0 0)", "inset(0% 0 0 0)"),
    }
}

/// Run the handler for `directive` on `el`. Returns `false` when the element was skipped.
pub(crate) fn run(cx: &mut EffectCx<'_>, el: NodeId, directive: &Directive) -> MotionResult<bool> {
    let o = &directive.options;
    let kind = directive.kind;
    let t = timing(kind, o, cx.cfg);
    let distance = o.distance.unwrap_or(cx.cfg.distance);
    let fade = |x: Option<f64>, y: Option<f64>| VisualProps {
        opacity: Some(0.0),
        x: x.map(Length::Px),
        y: y.map(Length::Px),
        ..VisualProps::default()
    };

    match kind {
        EffectKind::FadeUp => fade_in(cx, el, fade(None, Some(distance)), t, o),
        EffectKind::FadeDown => fade_in(cx, el, fade(None, Some(-distance)), t, o),
        EffectKind::FadeLeft => fade_in(cx, el, fade(Some(-distance), None), t, o),
        EffectKind::FadeRight => fade_in(cx, el, fade(Some(distance), None), t, o),
        EffectKind::FadeIn => fade_in(cx, el, VisualProps::hidden(), t, o),
        EffectKind::ScaleIn => {
            let props = VisualProps {
                scale: Some(0.9),
                ..VisualProps::hidden()
            };
            fade_in(cx, el, props, t, o)
        }
        EffectKind::RevealUp => {
            let props = VisualProps {
                clip_path: Some("inset(100% 0% 0% 0%)".to_owned()),
                ..VisualProps::default()
            };
            fade_in(cx, el, props, t, o)
        }
        EffectKind::SplitLines => {
            let props = VisualProps {
                y: Some(Length::Percent(110.0)),
                ..VisualProps::hidden()
            };
            split(cx, el, SegmentKind::Lines, props, t, Some(o))
        }
        EffectKind::SplitWords => {
            let props = VisualProps {
                y: Some(Length::Px(20.0)),
                ..VisualProps::hidden()
            };
            split(cx, el, SegmentKind::Words, props, t, Some(o))
        }
        EffectKind::SplitChars => {
            let props = VisualProps {
                y: Some(Length::Px(15.0)),
                ..VisualProps::hidden()
            };
            split(cx, el, SegmentKind::Chars, props, t, Some(o))
        }
        EffectKind::ImgReveal => img_reveal(cx, el, t, o),
        EffectKind::StaggerChildren => stagger_children(cx, el, t, o),
        EffectKind::Counter => count_up(cx, el, t, o),
        EffectKind::DrawLine => draw_line(cx, el, t, o),
        EffectKind::Parallax => parallax(cx, el, o),
        EffectKind::HeroText => {
            let props = VisualProps {
                y: Some(Length::Percent(110.0)),
                ..VisualProps::default()
            };
            split(cx, el, SegmentKind::Lines, props, t, None)
        }
        EffectKind::HeroImage => {
            let props = VisualProps {
                scale: Some(1.05),
                ..VisualProps::hidden()
            };
            cx.play(AnimationSpec::tween(from(vec![el], props, t)));
            Ok(true)
        }
    }
}

fn fade_in(
    cx: &mut EffectCx<'_>,
    el: NodeId,
    props: VisualProps,
    t: Timing,
    o: &DirectiveOptions,
) -> MotionResult<bool> {
    let spec = AnimationSpec::tween(from(vec![el], props, t)).with_trigger(trigger(el, o));
    cx.play(spec);
    Ok(true)
}

/// Split text and animate the segments. `o` is `None` for load-time effects, which play without
/// a scroll trigger.
fn split(
    cx: &mut EffectCx<'_>,
    el: NodeId,
    kind: SegmentKind,
    props: VisualProps,
    t: Timing,
    o: Option<&DirectiveOptions>,
) -> MotionResult<bool> {
    let out = segment::segment(cx.doc, cx.layout, el, kind, cx.cfg.line_tolerance_px)?;
    if out.inline_markup {
        cx.ctx.warn(
            DiagnosticKind::InlineMarkupInSplit,
            el,
            "split target contains inline markup; segment boundaries may look different",
        );
    }
    if out.segments.is_empty() {
        return Ok(false);
    }
    let mut spec = AnimationSpec::tween(from(out.nodes(), props, t));
    if let Some(o) = o {
        spec = spec.with_trigger(trigger(el, o));
    }
    cx.play(spec);
    Ok(true)
}

fn img_reveal(
    cx: &mut EffectCx<'_>,
    el: NodeId,
    t: Timing,
    o: &DirectiveOptions,
) -> MotionResult<bool> {
    let (clip_from, clip_to) = reveal_clips(o.direction);
    cx.set(
        &[el],
        &VisualProps {
            clip_path: Some(clip_from.to_owned()),
            scale: Some(1.15),
            ..VisualProps::default()
        },
    );
    let delay = t.delay;
    let wipe = Tween {
        targets: vec![el],
        kind: TweenKind::To(VisualProps {
            clip_path: Some(clip_to.to_owned()),
            ..VisualProps::default()
        }),
        timing: Timing { delay: 0.0, ..t },
        position: Position::Append,
    };
    let settle = Tween {
        targets: vec![el],
        kind: TweenKind::To(VisualProps {
            scale: Some(1.0),
            ..VisualProps::default()
        }),
        timing: Timing::new(1.2, "power2.out"),
        position: Position::WithPrevious(0.3),
    };
    let spec = AnimationSpec::timeline(vec![wipe, settle])
        .with_trigger(trigger(el, o))
        .with_delay(delay);
    cx.play(spec);
    Ok(true)
}

fn stagger_children(
    cx: &mut EffectCx<'_>,
    el: NodeId,
    t: Timing,
    o: &DirectiveOptions,
) -> MotionResult<bool> {
    let children = match o.selector.as_deref().map(Selector::parse) {
        Some(Ok(sel)) => cx.doc.query_all(el, &sel),
        Some(Err(err)) => {
            cx.ctx.warn(
                DiagnosticKind::InvalidSelector,
                el,
                format!("{err}; staggering direct children instead"),
            );
            cx.doc.element_children(el)
        }
        None => cx.doc.element_children(el),
    };
    if children.is_empty() {
        return Ok(false);
    }
    let props = VisualProps {
        y: Some(Length::Px(o.distance.unwrap_or(30.0))),
        ..VisualProps::hidden()
    };
    let spec = AnimationSpec::tween(from(children, props, t)).with_trigger(trigger(el, o));
    cx.play(spec);
    Ok(true)
}

fn count_up(
    cx: &mut EffectCx<'_>,
    el: NodeId,
    t: Timing,
    o: &DirectiveOptions,
) -> MotionResult<bool> {
    let raw = cx.doc.text_content(el);
    let Some(format) = CounterFormat::parse(&raw) else {
        cx.ctx.warn(
            DiagnosticKind::UnparseableCounter,
            el,
            format!("counter: could not parse a number from {:?}", raw.trim()),
        );
        return Ok(false);
    };
    cx.doc.set_text_content(el, &format.initial_text())?;
    let tween = Tween {
        targets: vec![el],
        kind: TweenKind::Count(format),
        timing: t,
        position: Position::Append,
    };
    cx.play(AnimationSpec::tween(tween).with_trigger(trigger(el, o)));
    Ok(true)
}

fn draw_line(
    cx: &mut EffectCx<'_>,
    el: NodeId,
    t: Timing,
    o: &DirectiveOptions,
) -> MotionResult<bool> {
    let shapes = cx.doc.query_all(el, &Selector::tags(&draw::SHAPE_TAGS));
    let mut any = false;
    for shape in shapes {
        let len = draw::stroke_length(cx.doc, shape);
        if len <= 0.0 {
            continue;
        }
        cx.set(
            &[shape],
            &VisualProps {
                stroke_dasharray: Some(len),
                stroke_dashoffset: Some(len),
                ..VisualProps::default()
            },
        );
        let tween = Tween {
            targets: vec![shape],
            kind: TweenKind::To(VisualProps {
                stroke_dashoffset: Some(0.0),
                ..VisualProps::default()
            }),
            timing: t.clone(),
            position: Position::Append,
        };
        cx.play(AnimationSpec::tween(tween).with_trigger(trigger(el, o)));
        any = true;
    }
    Ok(any)
}

fn parallax(cx: &mut EffectCx<'_>, el: NodeId, o: &DirectiveOptions) -> MotionResult<bool> {
    if cx.viewport.width < cx.cfg.parallax_min_width && !o.parallax_mobile {
        tracing::debug!(?el, width = cx.viewport.width, "parallax skipped on narrow viewport");
        return Ok(false);
    }
    let tween = Tween {
        targets: vec![el],
        kind: TweenKind::To(VisualProps {
            y: Some(Length::Px(o.parallax_speed * 100.0)),
            ..VisualProps::default()
        }),
        timing: Timing::new(cx.cfg.duration, "none"),
        position: Position::Append,
    };
    let trigger = ScrollTrigger {
        end: Some("bottom top".to_owned()),
        scrub: Some(1.0),
        ..ScrollTrigger::new(el, "top bottom", o.once)
    };
    cx.play(AnimationSpec::tween(tween).with_trigger(trigger));
    Ok(true)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/effects.rs"]
mod tests;
